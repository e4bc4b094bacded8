//! Administrative post handlers: listing, create, edit, delete.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use folio_core::domain::{Post, PostWithCategories};
use folio_core::service::{ListQuery, PostInput};
use folio_shared::dto::{
    AdminPostResponse, MessageResponse, PostListItem, PostRequest, PostSummaryResponse,
};

use super::posts::category_refs;
use super::{page_response, parse_id};
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// Convert a request body into service input.
///
/// Ids that are not UUIDs cannot name a stored category; the service reports
/// them together with the well-formed ids that do not resolve.
fn post_input(req: PostRequest) -> PostInput {
    let mut category_ids = Vec::with_capacity(req.category_ids.len());
    let mut malformed_category_ids = Vec::new();
    for raw in req.category_ids {
        match Uuid::parse_str(&raw) {
            Ok(id) => category_ids.push(id),
            Err(_) => malformed_category_ids.push(raw),
        }
    }

    PostInput {
        title: req.title,
        content: req.content,
        cover_image_url: req.cover_image_url,
        category_ids,
        malformed_category_ids,
    }
}

fn admin_post(found: PostWithCategories) -> AdminPostResponse {
    let PostWithCategories { post, categories } = found;
    AdminPostResponse {
        id: post.id,
        title: post.title,
        content: post.content,
        cover_image_url: post.cover_image_url,
        categories: category_refs(categories),
    }
}

fn summary(post: Post) -> PostSummaryResponse {
    PostSummaryResponse {
        id: post.id,
        title: post.title,
        content: post.content,
        cover_image_url: post.cover_image_url,
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

/// GET /api/admin/posts?term&sort&page&view
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let page = state.posts.list_page(&query).await?;

    Ok(HttpResponse::Ok().json(page_response(page, &query, |found| PostListItem {
        id: found.post.id,
        title: found.post.title,
        created_at: found.post.created_at,
        categories: category_refs(found.categories),
    })))
}

/// POST /api/admin/posts
pub async fn create_post(
    state: web::Data<AppState>,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let input = post_input(body.into_inner());
    let created = state.posts.create(input).await?;
    Ok(HttpResponse::Created().json(admin_post(created)))
}

/// GET /api/admin/posts/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path, "Post")?;
    let post = state.posts.get(id).await?;
    Ok(HttpResponse::Ok().json(admin_post(post)))
}

/// PUT /api/admin/posts/{id}
///
/// Replaces every field and the whole category set, or nothing at all.
pub async fn update_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path, "Post")?;
    let input = post_input(body.into_inner());
    let post = state.posts.update(id, input).await?;
    Ok(HttpResponse::Ok().json(summary(post)))
}

/// DELETE /api/admin/posts/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path, "Post")?;
    state.posts.delete(id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Post deleted")))
}
