//! Order handlers driven through the router with in-memory repositories.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::middleware::{self, Next};
use axum::{Router, response::Response};
use axum_helpers::Principal;
use domain_cart::{CartRepository, InMemoryCartRepository};
use domain_catalog::{CreateProduct, InMemoryProductRepository, Product};
use domain_orders::*;
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::collections::BTreeSet;
use std::sync::Arc;
use tower::ServiceExt;

async fn json_body<T: serde::de::DeserializeOwned>(response: Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn principal(user_id: &str, roles: &[&str]) -> Principal {
    Principal {
        user_id: user_id.to_string(),
        email: None,
        name: None,
        roles: roles.iter().map(|r| r.to_string()).collect::<BTreeSet<_>>(),
        email_verified: true,
    }
}

struct Fixture {
    carts: InMemoryCartRepository,
    catalog: Arc<InMemoryProductRepository>,
    orders: InMemoryOrderRepository,
}

impl Fixture {
    fn new() -> Self {
        let carts = InMemoryCartRepository::new();
        let catalog = Arc::new(InMemoryProductRepository::new());
        let orders = InMemoryOrderRepository::new(carts.clone(), catalog.clone());
        Self {
            carts,
            catalog,
            orders,
        }
    }

    async fn product(&self, name: &str, cents: i64, in_stock: bool) -> Product {
        let product = Product::new(CreateProduct {
            name: name.to_string(),
            slug: name.to_lowercase(),
            sku: format!("SKU-{name}"),
            description: None,
            price: Decimal::new(cents, 2),
            sale_price: None,
            stock_quantity: 1,
            in_stock,
            category_id: None,
            brand_id: None,
            attributes: json!({}),
            specifications: json!({}),
            tags: Vec::new(),
            featured_image: None,
        });
        self.catalog.insert(product.clone()).await;
        product
    }

    fn app(&self, who: Option<Principal>) -> Router {
        handlers::router(OrderService::new(self.orders.clone(), "USD")).layer(middleware::from_fn(
            move |mut request: axum::extract::Request, next: Next| {
                let who = who.clone();
                async move {
                    if let Some(p) = who {
                        request.extensions_mut().insert(p);
                    }
                    next.run(request).await
                }
            },
        ))
    }
}

fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

#[tokio::test]
async fn test_checkout_and_history() {
    let fixture = Fixture::new();
    let widget = fixture.product("Widget", 1250, true).await;
    fixture
        .carts
        .add_item("u1", widget.id, 2, widget.price)
        .await
        .unwrap();
    let app = fixture.app(Some(principal("u1", &[])));

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/checkout",
            Some(json!({"metadata": {"manufacturing_order": "mfg-7"}})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let detail: OrderDetail = json_body(response).await;
    assert_eq!(detail.order.status, OrderStatus::Pending);
    assert_eq!(detail.order.total_amount, Decimal::new(2500, 2));
    assert_eq!(detail.order.metadata["manufacturing_order"], "mfg-7");
    assert_eq!(detail.items[0].product_name, "Widget");

    // The cart was consumed.
    let response = app
        .clone()
        .oneshot(request("POST", "/checkout", Some(json!({}))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.clone().oneshot(request("GET", "/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let orders: Vec<Order> = json_body(response).await;
    assert_eq!(orders.len(), 1);

    let response = app
        .clone()
        .oneshot(request("GET", &format!("/{}", detail.order.id), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_checkout_out_of_stock_is_conflict() {
    let fixture = Fixture::new();
    let gone = fixture.product("Gone", 100, false).await;
    fixture.carts.add_item("u1", gone.id, 1, gone.price).await.unwrap();

    let response = fixture
        .app(Some(principal("u1", &[])))
        .oneshot(request("POST", "/checkout", Some(json!({}))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_other_users_order_is_hidden() {
    let fixture = Fixture::new();
    let widget = fixture.product("Widget", 100, true).await;
    fixture.carts.add_item("owner", widget.id, 1, widget.price).await.unwrap();

    let response = fixture
        .app(Some(principal("owner", &[])))
        .oneshot(request("POST", "/checkout", Some(json!({}))))
        .await
        .unwrap();
    let detail: OrderDetail = json_body(response).await;

    let response = fixture
        .app(Some(principal("intruder", &[])))
        .oneshot(request("GET", &format!("/{}", detail.order.id), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_status_changes_are_admin_only() {
    let fixture = Fixture::new();
    let widget = fixture.product("Widget", 100, true).await;
    fixture.carts.add_item("u1", widget.id, 1, widget.price).await.unwrap();

    let shopper = fixture.app(Some(principal("u1", &[])));
    let response = shopper
        .clone()
        .oneshot(request("POST", "/checkout", Some(json!({}))))
        .await
        .unwrap();
    let detail: OrderDetail = json_body(response).await;
    let uri = format!("/{}/status", detail.order.id);

    let response = shopper
        .oneshot(request("PATCH", &uri, Some(json!({"status": "paid"}))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let admin = fixture.app(Some(principal("ops", &["admin"])));
    let response = admin
        .clone()
        .oneshot(request("PATCH", &uri, Some(json!({"status": "fulfilled"}))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = admin
        .clone()
        .oneshot(request("PATCH", &uri, Some(json!({"status": "paid"}))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let order: Order = json_body(response).await;
    assert_eq!(order.status, OrderStatus::Paid);

    let response = admin
        .oneshot(request("PATCH", &uri, Some(json!({"status": "fulfilled"}))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_anonymous_is_unauthorized() {
    let fixture = Fixture::new();
    let response = fixture
        .app(None)
        .oneshot(request("GET", "/", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
