use actix_web::{http::StatusCode, test::TestRequest, web};
use market_engine::{db_types::Purchase, traits::PurchaseApiError, PurchaseApi};
use serde_json::json;

use super::{helpers::*, mocks::MockPurchaseManager};
use crate::routes::{CreatePurchaseRoute, PurchasesForClientRoute, PurchasesRoute};

fn configure_purchases(db: MockPurchaseManager) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(PurchaseApi::new(db)))
            .service(PurchasesRoute::<MockPurchaseManager>::new())
            .service(PurchasesForClientRoute::<MockPurchaseManager>::new())
            .service(CreatePurchaseRoute::<MockPurchaseManager>::new());
    }
}

fn authorized(req: TestRequest) -> TestRequest {
    req.insert_header(bearer(&issue_token("ana@example.com")))
}

fn new_purchase_json() -> serde_json::Value {
    json!({
        "clientId": "CLI001",
        "date": "2025-07-21T10:30:00",
        "paymentMethod": "Tarjeta de crédito",
        "comment": "Compra mensual",
        "state": "Completada",
        "items": [
            { "productId": 1, "quantity": 2, "total": 25.0 },
            { "productId": 2, "quantity": 1, "total": 15.75 }
        ]
    })
}

#[actix_web::test]
async fn all_purchases() {
    let _ = env_logger::try_init().ok();
    let mut db = MockPurchaseManager::new();
    db.expect_fetch_all_purchases().times(1).returning(|| Ok(vec![purchase(1, "CLI001"), purchase(2, "CLI002")]));
    let res = send(authorized(TestRequest::get().uri("/purchases")), configure_purchases(db)).await;
    assert_eq!(res.status, StatusCode::OK);
    let purchases: Vec<Purchase> = serde_json::from_str(&res.body).unwrap();
    assert_eq!(purchases.len(), 2);
    assert_eq!(purchases[0].items.len(), 1);
}

#[actix_web::test]
async fn purchases_for_client() {
    let _ = env_logger::try_init().ok();
    let mut db = MockPurchaseManager::new();
    db.expect_fetch_purchases_for_client().times(1).returning(|_| Ok(vec![purchase(1, "CLI001")]));
    let res = send(authorized(TestRequest::get().uri("/purchases/client/CLI001")), configure_purchases(db)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains(r#""clientId":"CLI001""#));

    let mut db = MockPurchaseManager::new();
    db.expect_fetch_purchases_for_client().times(1).returning(|_| Ok(vec![]));
    let res = send(authorized(TestRequest::get().uri("/purchases/client/CLI404")), configure_purchases(db)).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn create_purchase() {
    let _ = env_logger::try_init().ok();
    let mut db = MockPurchaseManager::new();
    db.expect_insert_purchase()
        .withf(|p| p.client_id == "CLI001" && p.items.len() == 2 && p.items.iter().all(|i| i.active))
        .times(1)
        .returning(|p| {
            Ok(Purchase {
                purchase_id: 7,
                client_id: p.client_id,
                date: p.date,
                payment_method: p.payment_method,
                comment: p.comment,
                state: p.state,
                items: p.items,
            })
        });
    let req = TestRequest::post().uri("/purchases").set_json(new_purchase_json());
    let res = send(authorized(req), configure_purchases(db)).await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
    let saved: Purchase = serde_json::from_str(&res.body).unwrap();
    assert_eq!(saved.purchase_id, 7);
    assert_eq!(saved.items.len(), 2);
}

#[actix_web::test]
async fn create_purchase_requires_a_token() {
    let _ = env_logger::try_init().ok();
    let mut db = MockPurchaseManager::new();
    db.expect_insert_purchase().never();
    let req = TestRequest::post().uri("/purchases").set_json(new_purchase_json());
    let res = send(req, configure_purchases(db)).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn invalid_purchases_are_bad_requests() {
    let _ = env_logger::try_init().ok();
    let mut db = MockPurchaseManager::new();
    db.expect_insert_purchase().never();
    let mut body = new_purchase_json();
    body["items"][0]["quantity"] = json!(0);
    let req = TestRequest::post().uri("/purchases").set_json(body);
    let res = send(authorized(req), configure_purchases(db)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let mut db = MockPurchaseManager::new();
    db.expect_insert_purchase()
        .times(1)
        .returning(|_| Err(PurchaseApiError::InvalidPurchase("The client or one of the products does not exist".into())));
    let req = TestRequest::post().uri("/purchases").set_json(new_purchase_json());
    let res = send(authorized(req), configure_purchases(db)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body.contains("does not exist"));
}
