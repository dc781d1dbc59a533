//! Product and category endpoints, caching and uploads.

#![allow(clippy::unwrap_used)]

use axum::extract::{Multipart, Path};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde_json::json;

use shopapp_client::api::{ApiError, ProductDto, ProductQuery, UploadFile};
use shopapp_client::views::ProductBrowser;
use shopapp_core::{CategoryId, Price, ProductId};
use shopapp_integration_tests::{StubBackend, fresh_jwt, product_json};

fn catalog_routes() -> Router {
    Router::new()
        .route(
            "/products",
            get(|| async {
                Json(json!({
                    "products": [product_json(1, "Phone", 199.5), product_json(2, "Case", 9.0)],
                    "totalPages": 8
                }))
            })
            .post(|| async { Json(product_json(3, "Charger", 15.0)) }),
        )
        .route(
            "/products/{id}",
            get(|Path(id): Path<i32>| async move {
                if id == 404 {
                    return Err(StatusCode::NOT_FOUND);
                }
                Ok(Json(product_json(id, "Phone", 199.5)))
            }),
        )
        .route(
            "/products/by-ids",
            get(|| async {
                Json(json!([product_json(1, "Phone", 199.5), product_json(2, "Case", 9.0)]))
            }),
        )
        .route(
            "/categories",
            get(|| async {
                Json(json!([{ "id": 1, "name": "Phones" }, { "id": 2, "name": "Cases" }]))
            }),
        )
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_paged_listing_and_query_string() {
    let backend = StubBackend::start(catalog_routes()).await;
    let storefront = backend.storefront();

    let query = ProductQuery {
        keyword: "phone case".to_string(),
        category_id: Some(CategoryId::new(2)),
        page: 1,
        limit: 12,
    };
    let page = storefront.api().get_products(&query).await.unwrap();

    assert_eq!(page.total_pages, Some(8));
    assert_eq!(page.products.len(), 2);
    assert_eq!(page.products[0].price, Price::new(Decimal::new(1995, 1)));

    let request = &backend.requests_to("/products")[0];
    assert_eq!(
        request.query.as_deref(),
        Some("keyword=phone+case&category_id=2&page=1&limit=12")
    );
    assert_eq!(request.header("authorization"), None);
}

#[tokio::test]
async fn test_bare_listing_has_no_page_count() {
    let backend = StubBackend::start(Router::new().route(
        "/products",
        get(|| async { Json(json!([product_json(5, "Lamp", 20.0)])) }),
    ))
    .await;
    let storefront = backend.storefront();

    let page = storefront
        .api()
        .get_products(&ProductQuery::default())
        .await
        .unwrap();

    assert_eq!(page.total_pages, None);
    assert_eq!(page.products[0].id, ProductId::new(5));
    // No category filter is sent as 0
    assert!(
        backend.requests_to("/products")[0]
            .query
            .as_deref()
            .unwrap()
            .contains("category_id=0")
    );
}

#[tokio::test]
async fn test_image_urls_are_resolved_against_base() {
    let backend = StubBackend::start(catalog_routes()).await;
    let storefront = backend.storefront();

    let product = storefront.api().get_product(ProductId::new(1)).await.unwrap();

    let base = backend.base_url();
    assert_eq!(product.url, Some(format!("{base}/products/images/1.png")));
    assert_eq!(
        product.product_images[0].image_url,
        format!("{base}/products/images/1-a.png")
    );
}

#[tokio::test]
async fn test_browser_loads_current_page() {
    let backend = StubBackend::start(catalog_routes()).await;
    let storefront = backend.storefront();

    let mut browser = storefront.product_browser();
    browser.go_to_page(6).unwrap();
    browser.load(storefront.api()).await.unwrap();
    browser.load_categories(storefront.api()).await.unwrap();

    assert_eq!(browser.total_pages(), 8);
    assert_eq!(browser.visible_pages(), vec![4, 5, 6, 7, 8]);
    assert_eq!(browser.categories().len(), 2);

    let categories = &backend.requests_to("/categories")[0];
    assert_eq!(categories.query.as_deref(), Some("page=0&limit=100"));

    // A new browser on the same store resumes at the persisted page
    let resumed = ProductBrowser::new(storefront.store().clone());
    assert_eq!(resumed.page(), 6);
}

#[tokio::test]
async fn test_browser_clears_listing_on_failure() {
    let backend = StubBackend::start(Router::new().route(
        "/products",
        get(|| async { (StatusCode::BAD_REQUEST, r#"{"message":"bad page"}"#) }),
    ))
    .await;
    let storefront = backend.storefront();

    let mut browser = storefront.product_browser();
    let err = browser.load(storefront.api()).await.unwrap_err();

    assert_eq!(err.to_string(), "Status code: 400, Message: bad page");
    assert!(browser.products().is_empty());
    assert_eq!(browser.total_pages(), 0);
}

// ============================================================================
// Lookups
// ============================================================================

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let backend = StubBackend::start(catalog_routes()).await;
    let storefront = backend.storefront();

    let err = storefront
        .api()
        .get_product(ProductId::new(404))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound));
}

#[tokio::test]
async fn test_products_by_ids() {
    let backend = StubBackend::start(catalog_routes()).await;
    let storefront = backend.storefront();

    let products = storefront
        .api()
        .get_products_by_ids(&[ProductId::new(1), ProductId::new(2)])
        .await
        .unwrap();

    assert_eq!(products.len(), 2);
    assert_eq!(
        backend.requests_to("/products/by-ids")[0].query.as_deref(),
        Some("ids=1%2C2")
    );

    let none = storefront.api().get_products_by_ids(&[]).await.unwrap();
    assert!(none.is_empty());
    assert_eq!(backend.requests_to("/products/by-ids").len(), 1);
}

// ============================================================================
// Caching
// ============================================================================

#[tokio::test]
async fn test_reads_are_cached() {
    let backend = StubBackend::start(catalog_routes()).await;
    let storefront = backend.storefront();
    let api = storefront.api();

    api.get_product(ProductId::new(1)).await.unwrap();
    api.get_product(ProductId::new(1)).await.unwrap();
    api.get_categories(0, 100).await.unwrap();
    api.get_categories(0, 100).await.unwrap();
    api.get_categories(1, 100).await.unwrap();

    assert_eq!(backend.requests_to("/products/1").len(), 1);
    assert_eq!(backend.requests_to("/categories").len(), 2);
}

#[tokio::test]
async fn test_product_write_invalidates_cache_and_sends_token() {
    let backend = StubBackend::start(catalog_routes()).await;
    let storefront = backend.storefront();
    let token = fresh_jwt(1);
    storefront.tokens().set(&token).unwrap();

    let api = storefront.api();
    api.get_products(&ProductQuery::default()).await.unwrap();
    api.get_categories(0, 100).await.unwrap();

    let dto = ProductDto {
        name: "Charger".to_string(),
        price: Price::new(Decimal::new(15, 0)),
        description: String::new(),
        category_id: CategoryId::new(1),
    };
    api.insert_product(&dto).await.unwrap();

    api.get_products(&ProductQuery::default()).await.unwrap();
    api.get_categories(0, 100).await.unwrap();

    let listings: Vec<_> = backend
        .requests_to("/products")
        .into_iter()
        .filter(|r| r.method == "GET")
        .collect();
    assert_eq!(listings.len(), 2);
    assert_eq!(backend.requests_to("/categories").len(), 1);

    let insert = backend
        .requests_to("/products")
        .into_iter()
        .find(|r| r.method == "POST")
        .unwrap();
    let expected = format!("Bearer {token}");
    assert_eq!(insert.header("authorization"), Some(expected.as_str()));
    assert_eq!(insert.json()["name"], "Charger");
}

// ============================================================================
// Uploads
// ============================================================================

#[tokio::test]
async fn test_upload_sends_one_part_per_file() {
    let backend = StubBackend::start(Router::new().route(
        "/products/uploads/{id}",
        post(|mut multipart: Multipart| async move {
            let mut names = Vec::new();
            while let Ok(Some(field)) = multipart.next_field().await {
                if field.name() == Some("files") {
                    names.push(field.file_name().unwrap_or_default().to_string());
                }
            }
            format!("Uploaded {}", names.join(","))
        }),
    ))
    .await;
    let storefront = backend.storefront();
    storefront.tokens().set(&fresh_jwt(1)).unwrap();

    let files = vec![
        UploadFile {
            file_name: "a.png".to_string(),
            mime_type: "image/png".to_string(),
            bytes: vec![1, 2, 3],
        },
        UploadFile {
            file_name: "b.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
            bytes: vec![4, 5],
        },
    ];
    let response = storefront
        .api()
        .upload_images(ProductId::new(3), files)
        .await
        .unwrap();

    assert_eq!(response.message, "Uploaded a.png,b.jpg");

    let request = &backend.requests_to("/products/uploads/3")[0];
    assert!(
        request
            .header("content-type")
            .unwrap()
            .starts_with("multipart/form-data; boundary=")
    );
    assert!(request.header("authorization").unwrap().starts_with("Bearer "));
}
