//! Public post handlers.

use actix_web::{HttpResponse, web};

use folio_core::domain::{CategoryRef, PostWithCategories};
use folio_shared::dto::{
    COVER_HEIGHT, COVER_WIDTH, CategoryRefResponse, CoverImage, PublicPostResponse,
};

use super::parse_id;
use crate::middleware::error::AppResult;
use crate::state::AppState;

pub(super) fn category_refs(refs: Vec<CategoryRef>) -> Vec<CategoryRefResponse> {
    refs.into_iter()
        .map(|category| CategoryRefResponse {
            id: category.id,
            name: category.name,
        })
        .collect()
}

fn public_post(found: PostWithCategories) -> PublicPostResponse {
    let PostWithCategories { post, categories } = found;
    PublicPostResponse {
        id: post.id,
        title: post.title,
        content: post.content,
        cover_image: CoverImage {
            url: post.cover_image_url,
            width: COVER_WIDTH,
            height: COVER_HEIGHT,
        },
        categories: category_refs(categories),
    }
}

/// GET /api/posts/{id}
pub async fn get_post(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let id = parse_id(&path, "Post")?;
    let post = state.posts.get(id).await?;
    Ok(HttpResponse::Ok().json(public_post(post)))
}
