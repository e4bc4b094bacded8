use std::collections::BTreeSet;
use std::sync::Arc;

use folio_core::domain::Category;
use folio_core::error::{DomainError, ValidationError};
use folio_core::ports::{CategoryRepository, PostRepository};
use folio_core::service::{CategoryService, ListQuery, PostInput, PostService, QueryService, SortKey};
use folio_infra::InMemoryStore;
use uuid::Uuid;

struct Fixture {
    store: Arc<InMemoryStore>,
    posts: PostService,
    categories: CategoryService,
}

fn fixture() -> Fixture {
    let store = Arc::new(InMemoryStore::new());
    let post_repo: Arc<dyn PostRepository> = store.clone();
    let category_repo: Arc<dyn CategoryRepository> = store.clone();
    Fixture {
        posts: PostService::new(post_repo, category_repo.clone(), QueryService::default()),
        categories: CategoryService::new(category_repo, QueryService::default()),
        store,
    }
}

fn input(title: &str, category_ids: Vec<Uuid>) -> PostInput {
    PostInput {
        title: title.to_string(),
        content: format!("{title} body"),
        cover_image_url: None,
        category_ids,
        ..PostInput::default()
    }
}

async fn category(fx: &Fixture, name: &str) -> Category {
    fx.categories.create(name).await.unwrap()
}

async fn category_set(fx: &Fixture, post_id: Uuid) -> BTreeSet<Uuid> {
    fx.posts
        .get(post_id)
        .await
        .unwrap()
        .category_ids()
        .into_iter()
        .collect()
}

#[tokio::test]
async fn update_swaps_a_b_for_b_c() {
    let fx = fixture();
    let a = category(&fx, "A").await;
    let b = category(&fx, "B").await;
    let c = category(&fx, "C").await;
    let post = fx.posts.create(input("P", vec![a.id, b.id])).await.unwrap();

    fx.posts
        .update(post.post.id, input("P", vec![b.id, c.id]))
        .await
        .unwrap();

    assert_eq!(
        category_set(&fx, post.post.id).await,
        BTreeSet::from([b.id, c.id])
    );
    assert_eq!(fx.store.link_count().await, 2);
}

#[tokio::test]
async fn unknown_category_leaves_prior_set_and_fields() {
    let fx = fixture();
    let a = category(&fx, "A").await;
    let b = category(&fx, "B").await;
    let post = fx.posts.create(input("P", vec![a.id, b.id])).await.unwrap();

    let missing = Uuid::new_v4();
    let err = fx
        .posts
        .update(post.post.id, input("Renamed", vec![a.id, missing]))
        .await
        .unwrap_err();

    match err {
        DomainError::Validation(ValidationError::UnknownCategory { ids }) => {
            assert_eq!(ids, vec![missing.to_string()]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    let after = fx.posts.get(post.post.id).await.unwrap();
    assert_eq!(after.post.title, "P");
    assert_eq!(category_set(&fx, post.post.id).await, BTreeSet::from([a.id, b.id]));
}

#[tokio::test]
async fn replacing_is_a_round_trip_from_any_prior_set() {
    let fx = fixture();
    let ids: Vec<Uuid> = create_categories(&fx, &["w", "x", "y", "z"]).await;
    let post = fx.posts.create(input("P", vec![ids[0], ids[1]])).await.unwrap();

    for desired in [vec![ids[2]], vec![], vec![ids[0], ids[3], ids[3]], ids.clone()] {
        fx.posts
            .replace_categories(post.post.id, &desired)
            .await
            .unwrap();
        let expected: BTreeSet<Uuid> = desired.into_iter().collect();
        assert_eq!(category_set(&fx, post.post.id).await, expected);
    }
}

async fn create_categories(fx: &Fixture, names: &[&str]) -> Vec<Uuid> {
    let mut ids = Vec::new();
    for name in names {
        ids.push(category(fx, name).await.id);
    }
    ids
}

#[tokio::test]
async fn replacing_twice_matches_replacing_once() {
    let fx = fixture();
    let a = category(&fx, "A").await;
    let b = category(&fx, "B").await;
    let post = fx.posts.create(input("P", vec![a.id])).await.unwrap();

    fx.posts
        .replace_categories(post.post.id, &[b.id])
        .await
        .unwrap();
    let once = fx.posts.get(post.post.id).await.unwrap().categories;
    fx.posts
        .replace_categories(post.post.id, &[b.id])
        .await
        .unwrap();
    let twice = fx.posts.get(post.post.id).await.unwrap().categories;

    assert_eq!(once, twice);
    assert_eq!(fx.store.link_count().await, 1);
}

#[tokio::test]
async fn duplicate_ids_are_stored_once() {
    let fx = fixture();
    let a = category(&fx, "A").await;
    let post = fx
        .posts
        .create(input("P", vec![a.id, a.id, a.id]))
        .await
        .unwrap();

    assert_eq!(post.categories.len(), 1);
    assert_eq!(fx.store.link_count().await, 1);
}

#[tokio::test]
async fn updating_a_missing_post_is_not_found() {
    let fx = fixture();
    let id = Uuid::new_v4();

    let err = fx.posts.update(id, input("P", vec![])).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { entity_type: "Post", id: got } if got == id));
}

#[tokio::test]
async fn blank_title_is_rejected_before_any_write() {
    let fx = fixture();
    let err = fx.posts.create(input("   ", vec![])).await.unwrap_err();

    assert!(matches!(
        err,
        DomainError::Validation(ValidationError::EmptyTitle)
    ));
    assert!(fx.posts.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_post_frees_its_categories() {
    let fx = fixture();
    let a = category(&fx, "A").await;
    let post = fx.posts.create(input("P", vec![a.id])).await.unwrap();

    let err = fx.categories.delete(a.id).await.unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));

    fx.posts.delete(post.post.id).await.unwrap();
    assert!(matches!(
        fx.posts.get(post.post.id).await,
        Err(DomainError::NotFound { .. })
    ));
    fx.categories.delete(a.id).await.unwrap();
    assert!(fx.categories.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn seventeen_posts_paginate_into_three_pages() {
    let fx = fixture();
    for i in 0..17 {
        fx.posts
            .create(input(&format!("Post {i:02}"), vec![]))
            .await
            .unwrap();
    }

    let first = fx.posts.list_page(&ListQuery::default()).await.unwrap();
    assert_eq!(first.items.len(), 8);
    assert_eq!(first.total_pages, 3);

    let third = fx
        .posts
        .list_page(&ListQuery::default().with_page(3))
        .await
        .unwrap();
    assert_eq!(third.items.len(), 1);

    let beyond = fx
        .posts
        .list_page(&ListQuery::default().with_page(4))
        .await
        .unwrap();
    assert!(beyond.items.is_empty());
}

#[tokio::test]
async fn search_and_title_sort_over_posts() {
    let fx = fixture();
    for title in ["rust tips", "Go notes", "Rust async", "Trusting"] {
        fx.posts.create(input(title, vec![])).await.unwrap();
    }

    let query = ListQuery::default()
        .with_sort(SortKey::Title)
        .with_term("RUST");
    let page = fx.posts.list_page(&query).await.unwrap();
    let titles: Vec<_> = page.items.iter().map(|p| p.post.title.as_str()).collect();

    assert_eq!(titles, vec!["Rust async", "rust tips", "Trusting"]);
}

#[tokio::test]
async fn category_listing_filters_by_name() {
    let fx = fixture();
    for name in ["Backend", "Frontend", "DevOps"] {
        category(&fx, name).await;
    }

    let page = fx
        .categories
        .list_page(&ListQuery::default().with_term("end"))
        .await
        .unwrap();

    assert_eq!(page.total_items, 2);
    assert!(page.items.iter().all(|c| c.name.to_lowercase().contains("end")));
}
