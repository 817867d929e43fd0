use std::sync::Arc;

use async_trait::async_trait;
use elamigo_pos::api::{self, AppState};
use elamigo_pos::repository::Stores;
use elamigo_pos::seed::seed_demo_data;
use elamigo_pos::session::FileSessionStore;
use elamigo_pos::suggest::{OrderSuggester, SuggestError, SuggestionModel, UnconfiguredModel};
use elamigo_pos::Ledger;
use reqwest::StatusCode;
use serde_json::{json, Value};

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        Self::spawn_with(OrderSuggester::new(UnconfiguredModel)).await
    }

    async fn spawn_with(suggester: OrderSuggester) -> Self {
        Self::serve(seeded_ledger(), suggester).await
    }

    async fn serve(ledger: Ledger, suggester: OrderSuggester) -> Self {
        let app = api::router(AppState::new(ledger, suggester));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("failed to bind ephemeral port");
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { base_url, client: reqwest::Client::new(), handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let res = self.client.get(self.url(path)).send().await.unwrap();
        read(res).await
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self.client.post(self.url(path)).json(&body).send().await.unwrap();
        read(res).await
    }

    async fn put(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self.client.put(self.url(path)).json(&body).send().await.unwrap();
        read(res).await
    }

    async fn delete(&self, path: &str) -> (StatusCode, Value) {
        let res = self.client.delete(self.url(path)).send().await.unwrap();
        read(res).await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn seeded_ledger() -> Ledger {
    let stores = Stores::in_memory();
    seed_demo_data(&stores);
    Ledger::new(stores)
}

async fn read(res: reqwest::Response) -> (StatusCode, Value) {
    let status = res.status();
    let bytes = res.bytes().await.unwrap();
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
    (status, body)
}

#[tokio::test]
async fn health_and_seeded_catalog() {
    let server = TestServer::spawn().await;
    let (status, body) = server.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, page) = server.get("/api/v1/products?page=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 20);
    assert_eq!(page["perPage"], 8);
    assert_eq!(page["totalPages"], 3);
    assert_eq!(page["data"][0]["id"], "prod-009");

    let (_, low) = server.get("/api/v1/products?lowStock=true&category=Equipos").await;
    assert_eq!(low["total"], 0);

    let (status, beyond) = server.get(&format!("/api/v1/products?page={}", usize::MAX)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(beyond["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn create_product_assigns_next_id_and_validates() {
    let server = TestServer::spawn().await;
    let (status, created) = server
        .post("/api/v1/products", json!({ "name": "COLLAR ANTIPULGAS", "category": "Accesorios para mascotas", "stock": 12, "salePrice": 25.5 }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], "prod-021");
    assert_eq!(created["purchasePrice"], 0.0);
    assert_eq!(created["imageUrl"], "https://placehold.co/100x100.png");

    let (status, err) = server.post("/api/v1/products", json!({ "name": "ab", "category": "Vitaminas" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"], "validation_failed");
    assert!(err["fields"]["name"].is_array());

    let (status, _) = server.get("/api/v1/products/prod-999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn checkout_records_sales_without_touching_stock() {
    let server = TestServer::spawn().await;
    let (_, before) = server.get("/api/v1/products/prod-018").await;
    assert_eq!(before["stock"], 10);

    let (status, receipt) = server
        .post(
            "/api/v1/checkout",
            json!({
                "items": [{ "productId": "prod-018", "quantity": 3 }, { "productId": "prod-007", "quantity": 9 }],
                "employee": "alex",
                "paymentMethod": "transferencia"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(receipt["employee"], "Alex");
    assert_eq!(receipt["sales"].as_array().unwrap().len(), 2);
    assert_eq!(receipt["sales"][1]["quantity"], 3);
    assert_eq!(receipt["warnings"][0]["available"], 3);
    assert_eq!(receipt["bankAccounts"].as_array().unwrap().len(), 2);
    assert_eq!(receipt["total"], 46.5);

    let (_, after) = server.get("/api/v1/products/prod-018").await;
    assert_eq!(after["stock"], 10);

    let (_, sales) = server.get("/api/v1/sales").await;
    assert_eq!(sales[0]["productId"], "prod-018");

    let (status, err) = server.post("/api/v1/checkout", json!({ "items": [], "employee": "Alex", "paymentMethod": "efectivo" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"], "empty_cart");
}

#[tokio::test]
async fn cart_preview_clamps_and_scans() {
    let server = TestServer::spawn().await;
    let (status, preview) = server.post("/api/v1/cart/preview", json!({ "items": [{ "productId": "prod-014", "quantity": 50 }] })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(preview["lines"][0]["quantity"], 6);
    assert_eq!(preview["warnings"][0]["requested"], 50);

    let (status, _) = server.post("/api/v1/cart/preview", json!({ "items": [{ "productId": "prod-005", "quantity": 1 }] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, err) = server.post("/api/v1/cart/preview", json!({ "scan": "0000000" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["error"], "barcode_not_found");
}

#[tokio::test]
async fn order_template_round_trip() {
    let server = TestServer::spawn().await;
    let (status, order) = server
        .post("/api/v1/orders", json!({ "supplier": "Agrovet SAC", "items": [{ "productId": "prod-008", "quantity": 10 }, { "productId": "prod-012", "quantity": 4 }] }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["id"], "ord-001");
    assert_eq!(order["status"], "Pendiente");
    let id = order["id"].as_str().unwrap();

    let (_, template) = server.get(&format!("/api/v1/orders/{id}/template")).await;
    let mut rows = template.as_array().unwrap().clone();
    assert_eq!(rows[0]["Subtotal"], "=C2*D2");
    rows[0]["Precio Compra Unit."] = json!(3.0);
    rows[1]["Precio Compra Unit."] = json!("pendiente");

    let (status, summary) = server.post(&format!("/api/v1/orders/{id}/complete"), Value::Array(rows)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["order"]["status"], "Completado");
    assert_eq!(summary["applied"], 1);
    assert_eq!(summary["ignored"], 1);

    let (_, plate) = server.get("/api/v1/products/prod-008").await;
    assert_eq!(plate["stock"], 11);
    assert_eq!(plate["purchasePrice"], 3.0);
    let (_, evitane) = server.get("/api/v1/products/prod-012").await;
    assert_eq!(evitane["stock"], 1);

    let (status, err) = server.post(&format!("/api/v1/orders/{id}/complete"), json!([])).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["error"], "invalid_transition");

    let (status, _) = server.post("/api/v1/orders/ord-404/complete", json!([])).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, err) = server.post("/api/v1/orders", json!({ "items": [{ "productId": "prod-008", "quantity": 0 }] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"], "validation_failed");
}

#[tokio::test]
async fn catalog_import_skips_unknown_rows() {
    let server = TestServer::spawn().await;
    let (status, summary) = server
        .post(
            "/api/v1/products/import",
            json!([
                { "ID": "prod-001", "Código de Barras": "7750001", "Stock": 40, "Fecha de Vencimiento": "Dic-25" },
                { "ID": "prod-777", "Producto": "Fantasma", "Stock": 1 }
            ]),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["updated"], 1);
    assert_eq!(summary["skipped"], 1);

    let (_, p) = server.get("/api/v1/products/barcode/7750001").await;
    assert_eq!(p["id"], "prod-001");
    assert_eq!(p["stock"], 40);
    assert_eq!(p["expiryDate"], "2025-12-31");
    let (_, page) = server.get("/api/v1/products").await;
    assert_eq!(page["total"], 20);

    server.post("/api/v1/products/import", json!([{ "ID": "prod-001", "Código de Barras": "N/A" }])).await;
    let (_, p) = server.get("/api/v1/products/prod-001").await;
    assert!(p["barcode"].is_null());

    let (status, err) = server.post("/api/v1/products/import", json!({ "ID": "prod-001" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"], "invalid_sheet");
}

#[tokio::test]
async fn session_lifecycle() {
    let server = TestServer::spawn().await;
    let (status, err) = server.post("/api/v1/session", json!({ "email": "diana@admin.com", "password": "zaru2025" })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(err["error"], "invalid_credentials");
    let (_, nobody) = server.get("/api/v1/session").await;
    assert!(nobody.is_null());

    let (status, user) = server.post("/api/v1/session", json!({ "email": "DIANA@ADMIN.COM", "password": "Zaru2025" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["id"], "user-admin");
    assert!(user.get("password").is_none());
    let (_, current) = server.get("/api/v1/session").await;
    assert_eq!(current["name"], "Diana");

    let (status, _) = server.delete("/api/v1/session").await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, nobody) = server.get("/api/v1/session").await;
    assert!(nobody.is_null());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn session_survives_in_file() {
    let path = std::env::temp_dir().join(format!("elamigo-session-{}.json", uuid::Uuid::new_v4()));
    let ledger = seeded_ledger().with_sessions(Arc::new(FileSessionStore::new(&path)));
    let server = TestServer::serve(ledger, OrderSuggester::new(UnconfiguredModel)).await;

    let (status, _) = server.post("/api/v1/session", json!({ "email": "jane@vetstock.com", "password": "123" })).await;
    assert_eq!(status, StatusCode::OK);
    assert!(std::fs::read_to_string(&path).unwrap().contains("user-004"));
    let (_, current) = server.get("/api/v1/session").await;
    assert_eq!(current["name"], "Jane");

    let (status, _) = server.delete("/api/v1/session").await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(!std::fs::read_to_string(&path).unwrap().contains("user-004"));
    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn user_directory_rules() {
    let server = TestServer::spawn().await;
    let (status, err) = server.put("/api/v1/users/user-admin", json!({ "name": "Diana", "email": "diana@admin.com", "role": "Empleado" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(err["error"], "protected_account");
    let (status, _) = server.put("/api/v1/users/user-admin", json!({ "name": "Diana", "email": "DIANA@ADMIN.COM", "role": "Admin" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = server.delete("/api/v1/users/user-admin").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (_, users) = server.get("/api/v1/users").await;
    assert_eq!(users[0]["email"], "diana@admin.com");

    let new_user = json!({ "name": "Rosa", "email": "rosa@vetstock.com", "role": "Empleado", "password": "secreto", "confirmPassword": "secreto" });
    let (status, created) = server.post("/api/v1/users", new_user.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], "user-006");
    let (status, err) = server.post("/api/v1/users", new_user).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["error"], "email_taken");

    let (status, _) = server.delete("/api/v1/users/user-006").await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, users) = server.get("/api/v1/users").await;
    assert_eq!(users.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn bank_accounts_and_calendar() {
    let server = TestServer::spawn().await;
    let (status, acc) = server
        .post("/api/v1/bank-accounts", json!({ "bankName": "BBVA", "accountHolder": "El Amigo E.I.R.L.", "accountNumber": "0011-0222-33" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(acc["id"].as_str().unwrap().starts_with("acc-"));
    let (status, _) = server.post("/api/v1/bank-accounts", json!({ "bankName": "B", "accountHolder": "x", "accountNumber": "1" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, event) = server
        .post("/api/v1/calendar", json!({ "date": "2024-07-25", "title": "Entrega Agrovet", "description": "Pedido ord-001", "type": "pedido" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, day) = server.get("/api/v1/calendar?date=2024-07-25").await;
    assert_eq!(day[0]["id"], event["id"]);
    let (_, rows) = server.get("/api/v1/calendar/export").await;
    assert_eq!(rows[0]["Tipo"], "pedido");
    let (status, _) = server.delete(&format!("/api/v1/calendar/{}", event["id"].as_str().unwrap())).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn reports_reflect_sales() {
    let server = TestServer::spawn().await;
    server
        .post("/api/v1/checkout", json!({ "items": [{ "productId": "prod-003", "quantity": 1 }], "employee": "Jane", "paymentMethod": "yape" }))
        .await;
    let (status, summary) = server.get("/api/v1/reports/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["totalIncome"], 53.0);
    assert_eq!(summary["totalExpenses"], 0.0);
    let (_, top) = server.get("/api/v1/reports/top-products").await;
    assert_eq!(top[0]["productId"], "prod-003");
    let (_, dashboard) = server.get("/api/v1/dashboard").await;
    assert_eq!(dashboard["productCount"], 20);
    assert_eq!(dashboard["recentSales"].as_array().unwrap().len(), 1);
}

struct FixedModel;

#[async_trait]
impl SuggestionModel for FixedModel {
    async fn generate(&self, prompt: &str, _schema: &Value) -> Result<Value, SuggestError> {
        assert!(prompt.contains("prod-003"));
        Ok(json!({ "suggestedOrderQuantity": 7.4, "reasoning": "Stock bajo." }))
    }
}

#[tokio::test]
async fn order_suggestions() {
    let server = TestServer::spawn_with(OrderSuggester::new(FixedModel)).await;
    let (status, s) = server.post("/api/v1/products/prod-003/suggestion", json!({ "seasonalTrends": "{\"12\": 1.4}" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(s["suggestedOrderQuantity"], 7);
    let (status, _) = server.post("/api/v1/products/prod-404/suggestion", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let offline = TestServer::spawn().await;
    let (status, err) = offline.post("/api/v1/products/prod-003/suggestion", json!({})).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(err["error"], "suggestion_unavailable");
}
