//! Integration tests for the DevMart storefront client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p devmart-integration-tests
//! ```
//!
//! # Stub Backend
//!
//! [`StubBackend`] serves the DevMart REST API from memory on an ephemeral
//! port. It speaks the same dialect as the real backend, including the
//! legacy order field names (`estado`, `cantidad`, `precio_unitario`), the
//! `{"msg": ...}` bodies of the JWT layer and the wrapped mutation responses.
//!
//! Seed data:
//!
//! | user | password | role |
//! |---|---|---|
//! | `admin@devmart.test` | `adminpass` | admin |
//! | `ana@devmart.test` | `secret1` | user |
//!
//! | product | price | stock | category |
//! |---|---|---|---|
//! | 1 Mechanical Keyboard | 49.90 | 5 | 1 |
//! | 2 Wireless Mouse | 19.99 | 2 | 1 |
//! | 3 The Rust Book | 39.00 | 0 | 2 |
//! | 4 USB-C Cable | 5.00 | 50 | 1 |
//!
//! Categories: 1 Peripherals (`peripherals`), 2 Books (`books`).

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{Value, json};

use devmart_storefront::config::{ApiConfig, StorefrontConfig};
use devmart_storefront::state::AppState;
use devmart_storefront::storage::{MemoryStorage, Storage};

const CREATED_AT: &str = "2025-03-01T09:30:00.123456";

// =============================================================================
// Data
// =============================================================================

#[derive(Debug, Clone)]
struct StubUser {
    id: i64,
    username: String,
    email: String,
    password: String,
    role: &'static str,
}

#[derive(Debug, Clone)]
struct StubProduct {
    id: i64,
    name: String,
    description: Option<String>,
    price: f64,
    stock: i64,
    image_url: Option<String>,
    category_id: Option<i64>,
}

#[derive(Debug, Clone)]
struct StubCategory {
    id: i64,
    name: String,
    description: Option<String>,
    slug: String,
}

#[derive(Debug, Clone)]
struct StubItem {
    id: i64,
    product_id: i64,
    quantity: i64,
    unit_price: f64,
}

#[derive(Debug, Clone)]
struct StubOrder {
    id: i64,
    user_id: i64,
    status: String,
    items: Vec<StubItem>,
}

impl StubOrder {
    fn total(&self) -> f64 {
        self.items
            .iter()
            .map(|i| i.unit_price * i.quantity as f64)
            .sum()
    }
}

#[derive(Debug, Default)]
struct Db {
    users: Vec<StubUser>,
    tokens: HashMap<String, i64>,
    products: Vec<StubProduct>,
    categories: Vec<StubCategory>,
    orders: Vec<StubOrder>,
    next_id: i64,
    hits: Vec<String>,
    me_failures: usize,
    order_delay_ms: u64,
    order_body: Option<String>,
}

impl Db {
    fn seeded() -> Self {
        let mut db = Self {
            next_id: 100,
            ..Self::default()
        };
        db.users = vec![
            StubUser {
                id: 1,
                username: "admin".into(),
                email: "admin@devmart.test".into(),
                password: "adminpass".into(),
                role: "admin",
            },
            StubUser {
                id: 2,
                username: "ana".into(),
                email: "ana@devmart.test".into(),
                password: "secret1".into(),
                role: "user",
            },
        ];
        db.categories = vec![
            StubCategory {
                id: 1,
                name: "Peripherals".into(),
                description: Some("Keyboards, mice and more".into()),
                slug: "peripherals".into(),
            },
            StubCategory {
                id: 2,
                name: "Books".into(),
                description: None,
                slug: "books".into(),
            },
        ];
        let product = |id, name: &str, price, stock, category_id| StubProduct {
            id,
            name: name.into(),
            description: None,
            price,
            stock,
            image_url: None,
            category_id: Some(category_id),
        };
        db.products = vec![
            product(1, "Mechanical Keyboard", 49.90, 5, 1),
            product(2, "Wireless Mouse", 19.99, 2, 1),
            product(3, "The Rust Book", 39.00, 0, 2),
            product(4, "USB-C Cable", 5.00, 50, 1),
        ];
        db
    }

    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn issue_token(&mut self, user_id: i64) -> String {
        let token = format!("token-{user_id}-{}", self.next_id());
        self.tokens.insert(token.clone(), user_id);
        token
    }

    fn user_for(&self, headers: &HeaderMap) -> Result<StubUser, Response> {
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| msg(StatusCode::UNAUTHORIZED, "Missing Authorization Header"))?;
        let user_id = self
            .tokens
            .get(token)
            .ok_or_else(|| msg(StatusCode::UNAUTHORIZED, "Token has expired"))?;
        self.users
            .iter()
            .find(|u| u.id == *user_id)
            .cloned()
            .ok_or_else(|| error(StatusCode::NOT_FOUND, "User not found"))
    }

    fn admin_for(&self, headers: &HeaderMap) -> Result<StubUser, Response> {
        let user = self.user_for(headers)?;
        if user.role == "admin" {
            Ok(user)
        } else {
            Err(error(StatusCode::FORBIDDEN, "Admin access required"))
        }
    }
}

// =============================================================================
// JSON
// =============================================================================

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn msg(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "msg": message }))).into_response()
}

fn user_json(user: &StubUser) -> Value {
    json!({
        "id": user.id,
        "username": user.username,
        "email": user.email,
        "role": user.role,
        "created_at": CREATED_AT,
    })
}

fn product_json(p: &StubProduct) -> Value {
    json!({
        "id": p.id,
        "name": p.name,
        "description": p.description,
        "price": p.price,
        "stock": p.stock,
        "image_url": p.image_url,
        "category_id": p.category_id,
        "created_at": CREATED_AT,
    })
}

fn category_json(c: &StubCategory) -> Value {
    json!({
        "id": c.id,
        "name": c.name,
        "description": c.description,
        "slug": c.slug,
    })
}

fn legacy_status(status: &str) -> &'static str {
    match status {
        "processing" => "procesando",
        "shipped" => "enviado",
        "delivered" => "entregado",
        "cancelled" => "cancelado",
        _ => "pendiente",
    }
}

fn order_json(o: &StubOrder) -> Value {
    json!({
        "id": o.id,
        "user_id": o.user_id,
        "estado": legacy_status(&o.status),
        "total": o.total(),
        "created_at": CREATED_AT,
        "items": o.items.iter().map(|i| json!({
            "id": i.id,
            "order_id": o.id,
            "product_id": i.product_id,
            "cantidad": i.quantity,
            "precio_unitario": i.unit_price,
            "subtotal": i.unit_price * i.quantity as f64,
        })).collect::<Vec<_>>(),
    })
}

fn str_field(body: &Value, field: &str) -> Option<String> {
    body.get(field).and_then(Value::as_str).map(String::from)
}

// =============================================================================
// Stub Backend
// =============================================================================

#[derive(Clone)]
struct Stub {
    db: Arc<Mutex<Db>>,
}

impl Stub {
    fn lock(&self) -> MutexGuard<'_, Db> {
        self.db.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// In-memory DevMart backend listening on `127.0.0.1`.
pub struct StubBackend {
    addr: SocketAddr,
    stub: Stub,
}

impl StubBackend {
    /// Start a seeded backend on an ephemeral port.
    pub async fn start() -> Self {
        let stub = Stub {
            db: Arc::new(Mutex::new(Db::seeded())),
        };
        let app = router(stub.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind listener");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move { axum::serve(listener, app).await.expect("serve stub") });
        Self { addr, stub }
    }

    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// A storefront wired to this backend over `storage`.
    #[must_use]
    pub fn storefront_with(&self, storage: Arc<dyn Storage>) -> AppState {
        let config = StorefrontConfig {
            api: ApiConfig::new(&self.base_url()).expect("stub url"),
            state_dir: std::path::PathBuf::from("unused"),
            sentry_dsn: None,
            sentry_environment: None,
        };
        AppState::with_storage(config, storage).expect("app state")
    }

    /// A storefront with fresh in-memory storage.
    #[must_use]
    pub fn storefront(&self) -> AppState {
        self.storefront_with(Arc::new(MemoryStorage::new()))
    }

    /// How many requests matched `"METHOD /path"`.
    #[must_use]
    pub fn hits(&self, route: &str) -> usize {
        self.stub.lock().hits.iter().filter(|h| *h == route).count()
    }

    /// Make the next `n` `GET /auth/me` calls fail with a 500.
    pub fn fail_me(&self, n: usize) {
        self.stub.lock().me_failures = n;
    }

    /// Delay order creation, to observe in-flight behavior.
    pub fn delay_orders(&self, ms: u64) {
        self.stub.lock().order_delay_ms = ms;
    }

    /// Answer successful order creation with `body` instead of the full
    /// order. `{id}` is replaced by the new order's ID.
    pub fn order_response(&self, body: &str) {
        self.stub.lock().order_body = Some(body.to_string());
    }

    /// Expire every issued token.
    pub fn revoke_tokens(&self) {
        self.stub.lock().tokens.clear();
    }

    /// Remove a user while leaving their tokens in place.
    pub fn delete_user(&self, email: &str) {
        self.stub.lock().users.retain(|u| u.email != email);
    }

    /// Current stock of a product.
    #[must_use]
    pub fn stock(&self, product_id: i64) -> Option<i64> {
        self.stub
            .lock()
            .products
            .iter()
            .find(|p| p.id == product_id)
            .map(|p| p.stock)
    }

    /// Change stock behind the client's back.
    pub fn set_stock(&self, product_id: i64, stock: i64) {
        if let Some(p) = self
            .stub
            .lock()
            .products
            .iter_mut()
            .find(|p| p.id == product_id)
        {
            p.stock = stock;
        }
    }

    #[must_use]
    pub fn order_count(&self) -> usize {
        self.stub.lock().orders.len()
    }
}

fn router(stub: Stub) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/me", get(me))
        .route("/products/", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/categories/", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            get(get_category)
                .put(update_category)
                .delete(delete_category),
        )
        .route("/categories/slug/{slug}", get(get_category_by_slug))
        .route("/categories/{id}/products", get(get_category_products))
        .route("/orders/", get(list_orders).post(create_order))
        .route("/orders/{id}", get(get_order).delete(cancel_order))
        .route("/orders/{id}/status", put(update_order_status))
        .layer(middleware::from_fn_with_state(stub.clone(), record))
        .with_state(stub)
}

async fn record(State(stub): State<Stub>, request: Request, next: Next) -> Response {
    let key = format!("{} {}", request.method(), request.uri().path());
    stub.lock().hits.push(key);
    next.run(request).await
}

// =============================================================================
// Auth
// =============================================================================

async fn login(State(stub): State<Stub>, Json(body): Json<Value>) -> Response {
    let mut db = stub.lock();
    let email = str_field(&body, "email").unwrap_or_default();
    let password = str_field(&body, "password").unwrap_or_default();
    let Some(user) = db
        .users
        .iter()
        .find(|u| u.email == email && u.password == password)
        .cloned()
    else {
        return error(StatusCode::UNAUTHORIZED, "Invalid credentials");
    };
    let token = db.issue_token(user.id);
    Json(json!({
        "message": "Login successful",
        "access_token": token,
        "user": user_json(&user),
    }))
    .into_response()
}

async fn register(State(stub): State<Stub>, Json(body): Json<Value>) -> Response {
    let mut db = stub.lock();
    let username = str_field(&body, "username").unwrap_or_default();
    let email = str_field(&body, "email").unwrap_or_default();
    let password = str_field(&body, "password").unwrap_or_default();
    if db.users.iter().any(|u| u.email == email) {
        return error(StatusCode::CONFLICT, "Email already registered");
    }
    if db.users.iter().any(|u| u.username == username) {
        return error(StatusCode::CONFLICT, "Username already taken");
    }
    let user = StubUser {
        id: db.next_id(),
        username,
        email,
        password,
        role: "user",
    };
    db.users.push(user.clone());
    let token = db.issue_token(user.id);
    (
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "access_token": token,
            "user": user_json(&user),
        })),
    )
        .into_response()
}

async fn me(State(stub): State<Stub>, headers: HeaderMap) -> Response {
    let mut db = stub.lock();
    if db.me_failures > 0 {
        db.me_failures -= 1;
        return error(StatusCode::INTERNAL_SERVER_ERROR, "database unavailable");
    }
    match db.user_for(&headers) {
        Ok(user) => Json(user_json(&user)).into_response(),
        Err(response) => response,
    }
}

// =============================================================================
// Products
// =============================================================================

async fn list_products(State(stub): State<Stub>) -> Response {
    let db = stub.lock();
    Json(db.products.iter().map(product_json).collect::<Vec<_>>()).into_response()
}

async fn get_product(State(stub): State<Stub>, Path(id): Path<i64>) -> Response {
    let db = stub.lock();
    db.products.iter().find(|p| p.id == id).map_or_else(
        || error(StatusCode::NOT_FOUND, "Product not found"),
        |p| Json(product_json(p)).into_response(),
    )
}

fn apply_product_fields(product: &mut StubProduct, body: &Value) {
    if let Some(name) = str_field(body, "name") {
        product.name = name;
    }
    product.description = str_field(body, "description");
    if let Some(price) = body.get("price").and_then(Value::as_f64) {
        product.price = price;
    }
    if let Some(stock) = body.get("stock").and_then(Value::as_i64) {
        product.stock = stock;
    }
    product.image_url = str_field(body, "image_url");
    product.category_id = body.get("category_id").and_then(Value::as_i64);
}

async fn create_product(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut db = stub.lock();
    if let Err(response) = db.admin_for(&headers) {
        return response;
    }
    let mut product = StubProduct {
        id: db.next_id(),
        name: String::new(),
        description: None,
        price: 0.0,
        stock: 0,
        image_url: None,
        category_id: None,
    };
    apply_product_fields(&mut product, &body);
    if product.name.is_empty() {
        return error(StatusCode::BAD_REQUEST, "Name is required");
    }
    db.products.push(product.clone());
    (
        StatusCode::CREATED,
        Json(json!({ "message": "Product created", "product": product_json(&product) })),
    )
        .into_response()
}

async fn update_product(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut db = stub.lock();
    if let Err(response) = db.admin_for(&headers) {
        return response;
    }
    let Some(product) = db.products.iter_mut().find(|p| p.id == id) else {
        return error(StatusCode::NOT_FOUND, "Product not found");
    };
    apply_product_fields(product, &body);
    Json(json!({ "message": "Product updated", "product": product_json(product) }))
        .into_response()
}

async fn delete_product(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let mut db = stub.lock();
    if let Err(response) = db.admin_for(&headers) {
        return response;
    }
    let before = db.products.len();
    db.products.retain(|p| p.id != id);
    if db.products.len() == before {
        return error(StatusCode::NOT_FOUND, "Product not found");
    }
    Json(json!({ "message": "Product deleted" })).into_response()
}

// =============================================================================
// Categories
// =============================================================================

async fn list_categories(State(stub): State<Stub>) -> Response {
    let db = stub.lock();
    Json(db.categories.iter().map(category_json).collect::<Vec<_>>()).into_response()
}

async fn get_category(State(stub): State<Stub>, Path(id): Path<i64>) -> Response {
    let db = stub.lock();
    db.categories.iter().find(|c| c.id == id).map_or_else(
        || error(StatusCode::NOT_FOUND, "Category not found"),
        |c| Json(category_json(c)).into_response(),
    )
}

async fn get_category_by_slug(State(stub): State<Stub>, Path(slug): Path<String>) -> Response {
    let db = stub.lock();
    db.categories.iter().find(|c| c.slug == slug).map_or_else(
        || error(StatusCode::NOT_FOUND, "Category not found"),
        |c| Json(category_json(c)).into_response(),
    )
}

async fn get_category_products(State(stub): State<Stub>, Path(id): Path<i64>) -> Response {
    let db = stub.lock();
    let Some(category) = db.categories.iter().find(|c| c.id == id) else {
        return error(StatusCode::NOT_FOUND, "Category not found");
    };
    let products: Vec<Value> = db
        .products
        .iter()
        .filter(|p| p.category_id == Some(id))
        .map(product_json)
        .collect();
    Json(json!({ "category": category_json(category), "products": products })).into_response()
}

fn slugify(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

async fn create_category(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut db = stub.lock();
    if let Err(response) = db.admin_for(&headers) {
        return response;
    }
    let name = str_field(&body, "name").unwrap_or_default();
    if db.categories.iter().any(|c| c.name == name) {
        return error(StatusCode::CONFLICT, "Category already exists");
    }
    let category = StubCategory {
        id: db.next_id(),
        slug: slugify(&name),
        name,
        description: str_field(&body, "description"),
    };
    db.categories.push(category.clone());
    (
        StatusCode::CREATED,
        Json(json!({ "message": "Category created", "category": category_json(&category) })),
    )
        .into_response()
}

async fn update_category(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut db = stub.lock();
    if let Err(response) = db.admin_for(&headers) {
        return response;
    }
    let Some(category) = db.categories.iter_mut().find(|c| c.id == id) else {
        return error(StatusCode::NOT_FOUND, "Category not found");
    };
    if let Some(name) = str_field(&body, "name") {
        category.slug = slugify(&name);
        category.name = name;
    }
    category.description = str_field(&body, "description");
    Json(json!({ "message": "Category updated", "category": category_json(category) }))
        .into_response()
}

async fn delete_category(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let mut db = stub.lock();
    if let Err(response) = db.admin_for(&headers) {
        return response;
    }
    if db.products.iter().any(|p| p.category_id == Some(id)) {
        return error(StatusCode::BAD_REQUEST, "Category still has products");
    }
    let before = db.categories.len();
    db.categories.retain(|c| c.id != id);
    if db.categories.len() == before {
        return error(StatusCode::NOT_FOUND, "Category not found");
    }
    Json(json!({ "message": "Category deleted" })).into_response()
}

// =============================================================================
// Orders
// =============================================================================

async fn list_orders(State(stub): State<Stub>, headers: HeaderMap) -> Response {
    let db = stub.lock();
    let user = match db.user_for(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let orders: Vec<Value> = db
        .orders
        .iter()
        .filter(|o| user.role == "admin" || o.user_id == user.id)
        .map(order_json)
        .collect();
    Json(orders).into_response()
}

async fn get_order(State(stub): State<Stub>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    let db = stub.lock();
    let user = match db.user_for(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    match db.orders.iter().find(|o| o.id == id) {
        None => error(StatusCode::NOT_FOUND, "Order not found"),
        Some(o) if o.user_id != user.id && user.role != "admin" => {
            error(StatusCode::FORBIDDEN, "Access denied")
        }
        Some(o) => Json(order_json(o)).into_response(),
    }
}

async fn create_order(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let delay = stub.lock().order_delay_ms;
    if delay > 0 {
        tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
    }

    let mut db = stub.lock();
    let user = match db.user_for(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let lines: Vec<(i64, i64)> = body
        .get("items")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|i| {
                    (
                        i.get("product_id").and_then(Value::as_i64).unwrap_or(0),
                        i.get("quantity").and_then(Value::as_i64).unwrap_or(0),
                    )
                })
                .collect()
        })
        .unwrap_or_default();
    if lines.is_empty() {
        return error(StatusCode::BAD_REQUEST, "Order must contain at least one item");
    }

    for (product_id, quantity) in &lines {
        let Some(product) = db.products.iter().find(|p| p.id == *product_id) else {
            return error(StatusCode::NOT_FOUND, &format!("Product {product_id} not found"));
        };
        if product.stock < *quantity {
            return error(
                StatusCode::BAD_REQUEST,
                &format!("Insufficient stock for {}", product.name),
            );
        }
    }

    let order_id = db.next_id();
    let mut items = Vec::new();
    for (product_id, quantity) in lines {
        let item_id = db.next_id();
        if let Some(product) = db.products.iter_mut().find(|p| p.id == product_id) {
            product.stock -= quantity;
            items.push(StubItem {
                id: item_id,
                product_id,
                quantity,
                unit_price: product.price,
            });
        }
    }
    let order = StubOrder {
        id: order_id,
        user_id: user.id,
        status: "pending".into(),
        items,
    };
    db.orders.push(order.clone());
    if let Some(body) = &db.order_body {
        return (StatusCode::CREATED, body.replace("{id}", &order.id.to_string())).into_response();
    }
    (
        StatusCode::CREATED,
        Json(json!({ "message": "Order created", "order": order_json(&order) })),
    )
        .into_response()
}

async fn update_order_status(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut db = stub.lock();
    if let Err(response) = db.admin_for(&headers) {
        return response;
    }
    let status = str_field(&body, "status").unwrap_or_default();
    if !["pending", "processing", "shipped", "delivered", "cancelled"].contains(&status.as_str()) {
        return error(StatusCode::BAD_REQUEST, "Invalid status");
    }
    let Some(order) = db.orders.iter_mut().find(|o| o.id == id) else {
        return error(StatusCode::NOT_FOUND, "Order not found");
    };
    order.status = status;
    Json(json!({ "message": "Order status updated", "order": order_json(order) }))
        .into_response()
}

async fn cancel_order(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let mut db = stub.lock();
    let user = match db.user_for(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let Some(order) = db.orders.iter().find(|o| o.id == id).cloned() else {
        return error(StatusCode::NOT_FOUND, "Order not found");
    };
    if order.user_id != user.id && user.role != "admin" {
        return error(StatusCode::FORBIDDEN, "Access denied");
    }
    if order.status != "pending" {
        return error(StatusCode::BAD_REQUEST, "Only pending orders can be cancelled");
    }
    for item in &order.items {
        if let Some(product) = db.products.iter_mut().find(|p| p.id == item.product_id) {
            product.stock += item.quantity;
        }
    }
    if let Some(o) = db.orders.iter_mut().find(|o| o.id == id) {
        o.status = "cancelled".into();
    }
    Json(json!({ "message": "Order cancelled" })).into_response()
}

/// Sign `state` in with the given credentials.
pub async fn sign_in(state: &AppState, email: &str, password: &str) {
    let form = devmart_storefront::validation::LoginForm {
        email: email.to_string(),
        password: secrecy::SecretString::from(password),
    };
    state.session().login(&form).await.expect("sign in");
}
