//! The authentication gate, exercised through the full middleware stack.
use actix_web::{http::StatusCode, test::TestRequest, web};
use market_engine::ProductApi;

use super::{helpers::*, mocks::MockProductManager};
use crate::routes::{health, ProductsRoute};

const UNAUTHORIZED: &str = r#"{"error":"Unauthorized"}"#;

/// A product backend that fails the test if it is ever reached.
fn unreachable_backend() -> MockProductManager {
    let mut db = MockProductManager::new();
    db.expect_fetch_all_products().never();
    db
}

fn configure_products(db: MockProductManager) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(ProductApi::new(db)))
            .service(ProductsRoute::<MockProductManager>::new())
            .service(health);
    }
}

#[actix_web::test]
async fn public_routes_ignore_the_authorization_header() {
    let _ = env_logger::try_init().ok();
    let cases = [None, Some("Bearer garbage".to_string()), Some(format!("Bearer {}", expired_token("ana@example.com")))];
    for header in cases {
        let mut req = TestRequest::get().uri("/health");
        if let Some(header) = header {
            req = req.insert_header(("Authorization", header));
        }
        let res = send(req, configure_products(unreachable_backend())).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body, "👍️\n");
    }
}

#[actix_web::test]
async fn missing_token() {
    let _ = env_logger::try_init().ok();
    let res = send(TestRequest::get().uri("/products"), configure_products(unreachable_backend())).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body, UNAUTHORIZED);
    assert_eq!(res.header("WWW-Authenticate"), Some("Bearer"));
}

#[actix_web::test]
async fn expired_token_gets_no_product_list() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/products").insert_header(bearer(&expired_token("ana@example.com")));
    let res = send(req, configure_products(unreachable_backend())).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body, UNAUTHORIZED);
}

#[actix_web::test]
async fn every_rejection_looks_the_same() {
    let _ = env_logger::try_init().ok();
    let headers = [
        format!("Bearer {}", forged_token("ana@example.com")),
        format!("Bearer {}", expired_token("ana@example.com")),
        "Bearer not.a.jwt".to_string(),
        "Bearer ".to_string(),
        format!("Basic {}", issue_token("ana@example.com")),
        issue_token("ana@example.com"),
    ];
    for header in headers {
        let req = TestRequest::get().uri("/products").insert_header(("Authorization", header.clone()));
        let res = send(req, configure_products(unreachable_backend())).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED, "{header}");
        assert_eq!(res.body, UNAUTHORIZED, "{header}");
    }
}

#[actix_web::test]
async fn valid_token_reaches_the_handler() {
    let _ = env_logger::try_init().ok();
    let mut db = MockProductManager::new();
    db.expect_fetch_all_products().times(1).returning(|| Ok(vec![product(1, "Leche", 20), product(2, "Pan", 3)]));
    let req = TestRequest::get().uri("/products").insert_header(bearer(&issue_token("ana@example.com")));
    let res = send(req, configure_products(db)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains(r#""name":"Leche""#));
    assert!(res.body.contains(r#""productId":2"#));
}

#[actix_web::test]
async fn the_same_token_works_repeatedly() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("ana@example.com");
    for _ in 0..2 {
        let mut db = MockProductManager::new();
        db.expect_fetch_all_products().times(1).returning(|| Ok(vec![]));
        let req = TestRequest::get().uri("/products").insert_header(bearer(&token));
        let res = send(req, configure_products(db)).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body, "[]");
    }
}

#[actix_web::test]
async fn unknown_paths_require_authentication() {
    let _ = env_logger::try_init().ok();
    let res = send(TestRequest::get().uri("/unknown/42"), configure_products(unreachable_backend())).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let req = TestRequest::get().uri("/unknown/42").insert_header(bearer(&issue_token("ana@example.com")));
    let res = send(req, configure_products(unreachable_backend())).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn public_prefixes_do_not_leak() {
    let _ = env_logger::try_init().ok();
    let res = send(TestRequest::get().uri("/auth/../products"), configure_products(unreachable_backend())).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    let res = send(TestRequest::get().uri("/authority"), configure_products(unreachable_backend())).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}
