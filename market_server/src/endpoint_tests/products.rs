use actix_web::{http::StatusCode, test::TestRequest, web};
use market_engine::{db_types::Product, traits::ProductApiError, ProductApi};
use serde_json::json;

use super::{helpers::*, mocks::MockProductManager};
use crate::routes::{
    CreateProductRoute,
    DeleteProductRoute,
    ProductByIdRoute,
    ProductsByCategoryRoute,
    ProductsRoute,
    ScarceProductsRoute,
};

fn configure_products(db: MockProductManager) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(ProductApi::new(db)))
            .service(ProductsRoute::<MockProductManager>::new())
            .service(ProductByIdRoute::<MockProductManager>::new())
            .service(ProductsByCategoryRoute::<MockProductManager>::new())
            .service(ScarceProductsRoute::<MockProductManager>::new())
            .service(CreateProductRoute::<MockProductManager>::new())
            .service(DeleteProductRoute::<MockProductManager>::new());
    }
}

fn authorized(req: TestRequest) -> TestRequest {
    req.insert_header(bearer(&issue_token("ana@example.com")))
}

#[actix_web::test]
async fn fetch_product_by_id() {
    let _ = env_logger::try_init().ok();
    let mut db = MockProductManager::new();
    db.expect_fetch_product().withf(|id| *id == 2).times(1).returning(|id| Ok(Some(product(id, "Pan", 3))));
    let res = send(authorized(TestRequest::get().uri("/products/2")), configure_products(db)).await;
    assert_eq!(res.status, StatusCode::OK);
    let p: Product = serde_json::from_str(&res.body).unwrap();
    assert_eq!(p, product(2, "Pan", 3));
}

#[actix_web::test]
async fn missing_product() {
    let _ = env_logger::try_init().ok();
    let mut db = MockProductManager::new();
    db.expect_fetch_product().times(1).returning(|_| Ok(None));
    let res = send(authorized(TestRequest::get().uri("/products/99")), configure_products(db)).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body, r#"{"error":"The data was not found. Product 99"}"#);
}

#[actix_web::test]
async fn empty_category_is_not_found() {
    let _ = env_logger::try_init().ok();
    let mut db = MockProductManager::new();
    db.expect_fetch_products_by_category().withf(|id| *id == 5).times(1).returning(|_| Ok(vec![]));
    let res = send(authorized(TestRequest::get().uri("/products/category/5")), configure_products(db)).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn category_listing() {
    let _ = env_logger::try_init().ok();
    let mut db = MockProductManager::new();
    db.expect_fetch_products_by_category().times(1).returning(|_| Ok(vec![product(1, "Leche", 20)]));
    let res = send(authorized(TestRequest::get().uri("/products/category/1")), configure_products(db)).await;
    assert_eq!(res.status, StatusCode::OK);
    let products: Vec<Product> = serde_json::from_str(&res.body).unwrap();
    assert_eq!(products.len(), 1);
}

#[actix_web::test]
async fn scarce_products() {
    let _ = env_logger::try_init().ok();
    let mut db = MockProductManager::new();
    db.expect_fetch_scarce_products().withf(|q| *q == 10).times(1).returning(|_| Ok(vec![product(2, "Pan", 3)]));
    let res = send(authorized(TestRequest::get().uri("/products/scarce/10")), configure_products(db)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains(r#""stock":3"#));

    let mut db = MockProductManager::new();
    db.expect_fetch_scarce_products().times(1).returning(|_| Ok(vec![]));
    let res = send(authorized(TestRequest::get().uri("/products/scarce/1")), configure_products(db)).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn create_product() {
    let _ = env_logger::try_init().ok();
    let mut db = MockProductManager::new();
    db.expect_insert_product()
        .withf(|p| p.name == "Arroz" && p.active && p.barcode.is_none())
        .times(1)
        .returning(|p| Ok(Product { product_id: 10, name: p.name, category_id: p.category_id, barcode: None, price: p.price, stock: p.stock, active: p.active }));
    let req = TestRequest::post().uri("/products").set_json(json!({
        "name": "Arroz",
        "categoryId": 3,
        "price": 4.5,
        "stock": 40
    }));
    let res = send(authorized(req), configure_products(db)).await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
    assert!(res.body.contains(r#""productId":10"#));
}

#[actix_web::test]
async fn invalid_product_is_a_bad_request() {
    let _ = env_logger::try_init().ok();
    let mut db = MockProductManager::new();
    db.expect_insert_product().never();
    let req = TestRequest::post().uri("/products").set_json(json!({ "name": " ", "categoryId": 3, "price": 4.5 }));
    let res = send(authorized(req), configure_products(db)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn backend_failure_on_create() {
    let _ = env_logger::try_init().ok();
    let mut db = MockProductManager::new();
    db.expect_insert_product().times(1).returning(|_| Err(ProductApiError::DatabaseError("disk full".into())));
    let req = TestRequest::post().uri("/products").set_json(json!({ "name": "Arroz", "categoryId": 3, "price": 4.5 }));
    let res = send(authorized(req), configure_products(db)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body.contains("disk full"));
}

#[actix_web::test]
async fn delete_product() {
    let _ = env_logger::try_init().ok();
    let mut db = MockProductManager::new();
    db.expect_delete_product().withf(|id| *id == 2).times(1).returning(|_| Ok(true));
    let res = send(authorized(TestRequest::delete().uri("/products/2")), configure_products(db)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, r#"{"success":true,"message":"Product 2 deleted"}"#);

    let mut db = MockProductManager::new();
    db.expect_delete_product().times(1).returning(|_| Ok(false));
    let res = send(authorized(TestRequest::delete().uri("/products/2")), configure_products(db)).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let mut db = MockProductManager::new();
    db.expect_delete_product().times(1).returning(|id| Err(ProductApiError::ProductInUse(id)));
    let res = send(authorized(TestRequest::delete().uri("/products/2")), configure_products(db)).await;
    assert_eq!(res.status, StatusCode::CONFLICT);
}
