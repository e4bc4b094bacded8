//! Category handlers.

use actix_web::{HttpResponse, web};

use folio_core::domain::Category;
use folio_core::service::ListQuery;
use folio_shared::dto::{CategoryRequest, CategoryResponse, MessageResponse};

use super::{page_response, parse_id};
use crate::middleware::error::AppResult;
use crate::state::AppState;

fn category_response(category: Category) -> CategoryResponse {
    CategoryResponse {
        id: category.id,
        name: category.name,
        created_at: category.created_at,
    }
}

/// GET /api/categories
pub async fn list_categories(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let categories = state.categories.list().await?;
    let body: Vec<CategoryResponse> = categories.into_iter().map(category_response).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/admin/categories?term&sort&page&view
pub async fn list_page(
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let page = state.categories.list_page(&query).await?;
    Ok(HttpResponse::Ok().json(page_response(page, &query, category_response)))
}

/// POST /api/admin/categories
pub async fn create_category(
    state: web::Data<AppState>,
    body: web::Json<CategoryRequest>,
) -> AppResult<HttpResponse> {
    let category = state.categories.create(&body.name).await?;
    Ok(HttpResponse::Created().json(category_response(category)))
}

/// DELETE /api/admin/categories/{id}
///
/// Refused with 409 while any post still references the category.
pub async fn delete_category(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path, "Category")?;
    state.categories.delete(id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Category deleted")))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use folio_core::service::PostInput;
    use serde_json::{Value, json};

    use super::super::memory_state;

    #[actix_web::test]
    async fn create_then_list() {
        let app = test_app!(memory_state());

        for name in ["Rust", "Async"] {
            let req = test::TestRequest::post()
                .uri("/api/admin/categories")
                .set_json(json!({ "name": name }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::CREATED);
        }

        let req = test::TestRequest::get().uri("/api/categories").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.as_array().unwrap().len(), 2);
        assert!(body[0]["createdAt"].is_string());

        let req = test::TestRequest::get()
            .uri("/api/admin/categories?sort=title")
            .to_request();
        let page: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(page["items"][0]["name"], "Async");
        assert_eq!(page["items"][1]["name"], "Rust");
        assert_eq!(page["view"], "list");
    }

    #[actix_web::test]
    async fn blank_name_is_a_bad_request() {
        let app = test_app!(memory_state());

        let req = test::TestRequest::post()
            .uri("/api/admin/categories")
            .set_json(json!({ "name": "" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn category_in_use_cannot_be_deleted() {
        let state = memory_state();
        let category = state.categories.create("Pinned").await.unwrap();
        let post = state
            .posts
            .create(PostInput {
                title: "Uses it".into(),
                content: String::new(),
                cover_image_url: None,
                category_ids: vec![category.id],
                ..PostInput::default()
            })
            .await
            .unwrap();
        let app = test_app!(state.clone());

        let uri = format!("/api/admin/categories/{}", category.id);
        let req = test::TestRequest::delete().uri(&uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        state.posts.delete(post.post.id).await.unwrap();

        let req = test::TestRequest::delete().uri(&uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::delete().uri(&uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
