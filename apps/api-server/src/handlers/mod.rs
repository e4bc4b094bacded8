//! HTTP handlers and route configuration.

/// Build an actix test service over the given `AppState`.
#[cfg(test)]
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($state))
                .configure(crate::handlers::configure_routes),
        )
        .await
    };
}

mod admin_posts;
mod categories;
mod health;
mod posts;

use actix_web::web;
use folio_core::service::{ListQuery, Page, ViewMode};
use folio_shared::dto::PageResponse;
use uuid::Uuid;

use crate::middleware::error::{AppError, json_error_handler, query_error_handler};

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .service(
            web::scope("/api")
                // Public routes
                .route("/health", web::get().to(health::health_check))
                .route("/posts/{id}", web::get().to(posts::get_post))
                .route("/categories", web::get().to(categories::list_categories))
                // Admin routes
                .service(
                    web::scope("/admin")
                        .route("/posts", web::get().to(admin_posts::list_posts))
                        .route("/posts", web::post().to(admin_posts::create_post))
                        .route("/posts/{id}", web::get().to(admin_posts::get_post))
                        .route("/posts/{id}", web::put().to(admin_posts::update_post))
                        .route("/posts/{id}", web::delete().to(admin_posts::delete_post))
                        .route("/categories", web::get().to(categories::list_page))
                        .route("/categories", web::post().to(categories::create_category))
                        .route(
                            "/categories/{id}",
                            web::delete().to(categories::delete_category),
                        ),
                ),
        );
}

/// A path segment that is not a UUID cannot name a stored resource.
fn parse_id(raw: &str, entity: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("{} {} not found", entity, raw)))
}

/// Render a listing page, echoing the view the operator asked for.
fn page_response<T, U>(page: Page<T>, query: &ListQuery, f: impl FnMut(T) -> U) -> PageResponse<U> {
    let page = page.map(f);
    PageResponse {
        items: page.items,
        page: page.page,
        total_pages: page.total_pages,
        total_items: page.total_items,
        view: match query.view {
            ViewMode::List => "list",
            ViewMode::Grid => "grid",
        }
        .to_string(),
    }
}

#[cfg(test)]
fn memory_state() -> crate::state::AppState {
    crate::state::AppState::in_memory(folio_core::service::QueryService::new(8))
}
