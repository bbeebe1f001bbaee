use actix_web::{http::StatusCode, test::TestRequest, web};
use market_engine::{traits::CustomerApiError, CustomerApi};
use serde_json::json;

use super::{helpers::*, mocks::MockCustomerManager};
use crate::{
    auth::{hash_password, verify_password, TokenIssuer, TokenValidator},
    config::ServerOptions,
    data_objects::TokenResponse,
    routes::{check_token, LoginRoute, RegisterRoute},
};

fn configure_auth(db: MockCustomerManager) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(CustomerApi::new(db)))
            .app_data(web::Data::new(TokenIssuer::new(&auth_config())))
            .app_data(web::Data::new(ServerOptions::default()))
            .service(RegisterRoute::<MockCustomerManager>::new())
            .service(LoginRoute::<MockCustomerManager>::new())
            .service(check_token);
    }
}

fn login_request(email: &str, password: &str) -> TestRequest {
    TestRequest::post().uri("/auth/login").set_json(json!({ "email": email, "password": password }))
}

#[actix_web::test]
async fn login_issues_a_token_for_the_customer() {
    let _ = env_logger::try_init().ok();
    let hash = hash_password("s3cret-pass").unwrap();
    let mut db = MockCustomerManager::new();
    db.expect_fetch_customer_by_email()
        .times(1)
        .returning(move |_| Ok(Some(customer("ana@example.com", &hash))));
    let res = send(login_request("Ana@Example.com", "s3cret-pass"), configure_auth(db)).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    let token: TokenResponse = serde_json::from_str(&res.body).unwrap();
    assert_eq!(token.token_type, "Bearer");
    assert_eq!(token.expires_in, 3600);
    let identity = TokenValidator::new(&auth_config()).validate(&token.token).unwrap();
    assert_eq!(identity.subject(), "ana@example.com");
}

#[actix_web::test]
async fn login_ignores_stale_credentials() {
    let _ = env_logger::try_init().ok();
    let hash = hash_password("s3cret-pass").unwrap();
    let mut db = MockCustomerManager::new();
    db.expect_fetch_customer_by_email().returning(move |_| Ok(Some(customer("ana@example.com", &hash))));
    // The login route is public, so an expired token must not get in the way
    let req = login_request("ana@example.com", "s3cret-pass").insert_header(bearer(&expired_token("x@example.com")));
    let res = send(req, configure_auth(db)).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
}

#[actix_web::test]
async fn wrong_password_and_unknown_email_look_the_same() {
    let _ = env_logger::try_init().ok();
    let hash = hash_password("s3cret-pass").unwrap();
    let mut db = MockCustomerManager::new();
    db.expect_fetch_customer_by_email().times(1).returning(move |_| Ok(Some(customer("ana@example.com", &hash))));
    let wrong_password = send(login_request("ana@example.com", "guess"), configure_auth(db)).await;

    let mut db = MockCustomerManager::new();
    db.expect_fetch_customer_by_email().times(1).returning(|_| Ok(None));
    let unknown = send(login_request("nobody@example.com", "guess"), configure_auth(db)).await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body, r#"{"error":"Unauthorized"}"#);
    assert_eq!(unknown.body, wrong_password.body);
    assert_eq!(unknown.header("WWW-Authenticate"), Some("Bearer"));
}

#[actix_web::test]
async fn register_stores_a_hash() {
    let _ = env_logger::try_init().ok();
    let mut db = MockCustomerManager::new();
    db.expect_insert_customer()
        .times(1)
        .withf(|c| {
            c.email == "ana@example.com" &&
                c.password_hash.starts_with("$argon2id$") &&
                verify_password("s3cret-pass", &c.password_hash).unwrap_or(false)
        })
        .returning(|c| Ok(customer(&c.email, &c.password_hash)));
    let req = TestRequest::post().uri("/auth/register").set_json(json!({
        "id": "CLI001",
        "first_name": "Ana",
        "last_name": "Ruiz",
        "phone": "3001234567",
        "email": "Ana@Example.com",
        "password": "s3cret-pass"
    }));
    let res = send(req, configure_auth(db)).await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
    assert!(res.body.contains(r#""email":"ana@example.com""#));
    assert!(!res.body.contains("argon2"));
    assert!(!res.body.contains("s3cret-pass"));
}

#[actix_web::test]
async fn register_duplicate() {
    let _ = env_logger::try_init().ok();
    let mut db = MockCustomerManager::new();
    db.expect_insert_customer().times(1).returning(|_| Err(CustomerApiError::CustomerAlreadyExists));
    let req = TestRequest::post().uri("/auth/register").set_json(json!({
        "id": "CLI001",
        "firstName": "Ana",
        "lastName": "Ruiz",
        "email": "ana@example.com",
        "password": "s3cret-pass"
    }));
    let res = send(req, configure_auth(db)).await;
    assert_eq!(res.status, StatusCode::CONFLICT);
}

#[actix_web::test]
async fn register_requires_a_password() {
    let _ = env_logger::try_init().ok();
    let mut db = MockCustomerManager::new();
    db.expect_insert_customer().never();
    let req = TestRequest::post().uri("/auth/register").set_json(json!({
        "id": "CLI001",
        "first_name": "Ana",
        "last_name": "Ruiz",
        "email": "ana@example.com",
        "password": ""
    }));
    let res = send(req, configure_auth(db)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn malformed_login_body() {
    let _ = env_logger::try_init().ok();
    let mut db = MockCustomerManager::new();
    db.expect_fetch_customer_by_email().never();
    let req = TestRequest::post().uri("/auth/login").insert_header(("Content-Type", "application/json")).set_payload("{");
    let res = send(req, configure_auth(db)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body.starts_with(r#"{"error":"Could not read request body"#), "{}", res.body);
}

#[actix_web::test]
async fn check_token_returns_the_subject() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/check_token").insert_header(bearer(&issue_token("ana@example.com")));
    let res = send(req, configure_auth(MockCustomerManager::new())).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, r#"{"subject":"ana@example.com"}"#);
}

#[actix_web::test]
async fn check_token_without_a_token() {
    let _ = env_logger::try_init().ok();
    let res = send(TestRequest::get().uri("/check_token"), configure_auth(MockCustomerManager::new())).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}
