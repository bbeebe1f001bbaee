//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! None of the handlers here check credentials. The [`AuthGateFactory`](crate::middleware::AuthGateFactory) middleware
//! has already decided whether a request may reach them. Handlers that need to know *who* is calling take an
//! [`AuthenticatedIdentity`] argument.
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Password hashing is CPU-heavy, so it runs on the blocking thread
//! pool via `web::block`.
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use log::*;
use market_engine::{
    db_types::{NewProduct, NewPurchase},
    traits::{CustomerManagement, ProductApiError, ProductManagement, PurchaseManagement},
    CustomerApi,
    ProductApi,
    PurchaseApi,
};
use serde_json::json;

use crate::{
    auth::{hash_password, verify_password, AuthenticatedIdentity, TokenIssuer},
    config::ServerOptions,
    data_objects::{JsonResponse, LoginRequest, RegisterRequest, TokenResponse},
    errors::{AuthError, ServerError},
    helpers::get_remote_ip,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Auth  ----------------------------------------------------
route!(register => Post "/auth/register" impl CustomerManagement);
/// Registers a new customer. The password is stored as an Argon2id hash.
pub async fn register<B: CustomerManagement>(
    body: web::Json<RegisterRequest>,
    api: web::Data<CustomerApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    trace!("💻️ Received registration request for {}", request.id);
    if request.email.trim().is_empty() || request.password.reveal().is_empty() {
        return Err(ServerError::InvalidInput("Both an email address and a password are required".into()));
    }
    let password = request.password.clone();
    let password_hash = web::block(move || hash_password(password.reveal()))
        .await
        .map_err(|e| ServerError::Unspecified(e.to_string()))??;
    let customer = api.register(request.into_new_customer(password_hash)).await?;
    info!("💻️ Customer {} registered", customer.id);
    Ok(HttpResponse::Created().json(customer))
}

route!(login => Post "/auth/login" impl CustomerManagement);
/// Exchanges an e-mail address and password for a bearer token.
///
/// An unknown e-mail address and a wrong password produce the same response.
pub async fn login<B: CustomerManagement>(
    req: HttpRequest,
    body: web::Json<LoginRequest>,
    api: web::Data<CustomerApi<B>>,
    issuer: web::Data<TokenIssuer>,
    options: web::Data<ServerOptions>,
) -> Result<HttpResponse, ServerError> {
    let LoginRequest { email, password } = body.into_inner();
    trace!("💻️ Received login request for {email}");
    let remote_ip = || {
        get_remote_ip(&req, options.use_x_forwarded_for, options.use_forwarded)
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| "unknown".into())
    };
    let Some(customer) = api.customer_by_email(&email).await? else {
        info!("💻️ Login failed for unknown account {email} from {}", remote_ip());
        return Err(AuthError::InvalidCredentials.into());
    };
    let hash = customer.password_hash.clone();
    let verified = web::block(move || verify_password(password.reveal(), &hash))
        .await
        .map_err(|e| ServerError::Unspecified(e.to_string()))??;
    if !verified {
        info!("💻️ Login failed for {} from {}. Wrong password.", customer.email, remote_ip());
        return Err(AuthError::InvalidCredentials.into());
    }
    let token = issuer.issue_token(&customer.email)?;
    debug!("💻️ Issued access token for {}", customer.email);
    Ok(HttpResponse::Ok().json(TokenResponse::bearer(token, issuer.lifetime_secs())))
}

/// Echoes the identity carried by the caller's token.
#[get("/check_token")]
pub async fn check_token(identity: AuthenticatedIdentity) -> impl Responder {
    trace!("💻️ Token check for {}", identity.subject());
    HttpResponse::Ok().json(json!({ "subject": identity.subject() }))
}

//----------------------------------------------   Products  ----------------------------------------------------
route!(products => Get "/products" impl ProductManagement);
pub async fn products<B: ProductManagement>(api: web::Data<ProductApi<B>>) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Received request for all products");
    let products = api.products().await?;
    Ok(HttpResponse::Ok().json(products))
}

route!(product_by_id => Get "/products/{id}" impl ProductManagement);
pub async fn product_by_id<B: ProductManagement>(
    path: web::Path<i64>,
    api: web::Data<ProductApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let product_id = path.into_inner();
    trace!("💻️ Received request for product {product_id}");
    let product =
        api.product(product_id).await?.ok_or_else(|| ServerError::NoRecordFound(format!("Product {product_id}")))?;
    Ok(HttpResponse::Ok().json(product))
}

route!(products_by_category => Get "/products/category/{category_id}" impl ProductManagement);
pub async fn products_by_category<B: ProductManagement>(
    path: web::Path<i64>,
    api: web::Data<ProductApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let category_id = path.into_inner();
    trace!("💻️ Received request for products in category {category_id}");
    let products = api
        .products_by_category(category_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("No products in category {category_id}")))?;
    Ok(HttpResponse::Ok().json(products))
}

route!(scarce_products => Get "/products/scarce/{quantity}" impl ProductManagement);
pub async fn scarce_products<B: ProductManagement>(
    path: web::Path<i64>,
    api: web::Data<ProductApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let quantity = path.into_inner();
    trace!("💻️ Received request for products with at most {quantity} in stock");
    let products = api
        .scarce_products(quantity)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("No products with at most {quantity} in stock")))?;
    Ok(HttpResponse::Ok().json(products))
}

route!(create_product => Post "/products" impl ProductManagement);
pub async fn create_product<B: ProductManagement>(
    identity: AuthenticatedIdentity,
    body: web::Json<NewProduct>,
    api: web::Data<ProductApi<B>>,
) -> Result<HttpResponse, ServerError> {
    // A failed insert is reported as a bad request
    let product = api.create_product(body.into_inner()).await.map_err(|e| match e {
        ProductApiError::DatabaseError(s) => ServerError::InvalidInput(s),
        e => e.into(),
    })?;
    info!("💻️ Product {} ({}) created by {}", product.product_id, product.name, identity.subject());
    Ok(HttpResponse::Created().json(product))
}

route!(delete_product => Delete "/products/{id}" impl ProductManagement);
pub async fn delete_product<B: ProductManagement>(
    identity: AuthenticatedIdentity,
    path: web::Path<i64>,
    api: web::Data<ProductApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let product_id = path.into_inner();
    if !api.delete_product(product_id).await? {
        return Err(ServerError::NoRecordFound(format!("Product {product_id}")));
    }
    info!("💻️ Product {product_id} deleted by {}", identity.subject());
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Product {product_id} deleted"))))
}

//----------------------------------------------   Purchases  ----------------------------------------------------
route!(purchases => Get "/purchases" impl PurchaseManagement);
pub async fn purchases<B: PurchaseManagement>(api: web::Data<PurchaseApi<B>>) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Received request for all purchases");
    let purchases = api.purchases().await?;
    Ok(HttpResponse::Ok().json(purchases))
}

route!(purchases_for_client => Get "/purchases/client/{client_id}" impl PurchaseManagement);
pub async fn purchases_for_client<B: PurchaseManagement>(
    path: web::Path<String>,
    api: web::Data<PurchaseApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let client_id = path.into_inner();
    trace!("💻️ Received request for purchases of client {client_id}");
    let purchases = api
        .purchases_for_client(&client_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("No purchases for client {client_id}")))?;
    Ok(HttpResponse::Ok().json(purchases))
}

route!(create_purchase => Post "/purchases" impl PurchaseManagement);
pub async fn create_purchase<B: PurchaseManagement>(
    identity: AuthenticatedIdentity,
    body: web::Json<NewPurchase>,
    api: web::Data<PurchaseApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let purchase = api.create_purchase(body.into_inner()).await?;
    info!(
        "💻️ Purchase {} for client {} recorded by {}",
        purchase.purchase_id,
        purchase.client_id,
        identity.subject()
    );
    Ok(HttpResponse::Created().json(purchase))
}
