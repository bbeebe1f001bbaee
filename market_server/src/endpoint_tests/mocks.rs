use market_engine::{
    db_types::{Customer, NewCustomer, NewProduct, NewPurchase, Product, Purchase},
    traits::{
        CustomerApiError,
        CustomerManagement,
        ProductApiError,
        ProductManagement,
        PurchaseApiError,
        PurchaseManagement,
    },
};
use mockall::mock;

mock! {
    pub ProductManager {}
    impl ProductManagement for ProductManager {
        async fn fetch_all_products(&self) -> Result<Vec<Product>, ProductApiError>;
        async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, ProductApiError>;
        async fn fetch_products_by_category(&self, category_id: i64) -> Result<Vec<Product>, ProductApiError>;
        async fn fetch_scarce_products(&self, quantity: i64) -> Result<Vec<Product>, ProductApiError>;
        async fn insert_product(&self, product: NewProduct) -> Result<Product, ProductApiError>;
        async fn delete_product(&self, product_id: i64) -> Result<bool, ProductApiError>;
    }
}

mock! {
    pub PurchaseManager {}
    impl PurchaseManagement for PurchaseManager {
        async fn fetch_all_purchases(&self) -> Result<Vec<Purchase>, PurchaseApiError>;
        async fn fetch_purchases_for_client(&self, client_id: &str) -> Result<Vec<Purchase>, PurchaseApiError>;
        async fn insert_purchase(&self, purchase: NewPurchase) -> Result<Purchase, PurchaseApiError>;
    }
}

mock! {
    pub CustomerManager {}
    impl CustomerManagement for CustomerManager {
        async fn fetch_customer_by_email(&self, email: &str) -> Result<Option<Customer>, CustomerApiError>;
        async fn insert_customer(&self, customer: NewCustomer) -> Result<Customer, CustomerApiError>;
    }
}
