//! JSON HTTP API over the ledger.

pub mod dto;
mod error;

pub use error::ApiError;

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::Value;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use validator::Validate;

use crate::domain::aggregates::{BankAccount, CalendarEvent, Product, PurchaseOrder, Sale, User};
use crate::services::{CartPreview, CompletionSummary, Dashboard, FinancialSummary, ImportSummary, Ledger, Receipt, TopProduct, WeeklySales};
use crate::session::SessionError;
use crate::sheet::Row;
use crate::suggest::{OrderSuggester, SuggestError, Suggestion, SuggestionRequest};
use crate::LedgerError;
use dto::*;

type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Ledger>,
    pub suggester: Arc<OrderSuggester>,
}

impl AppState {
    pub fn new(ledger: Ledger, suggester: OrderSuggester) -> Self {
        Self { ledger: Arc::new(ledger), suggester: Arc::new(suggester) }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "elamigo-pos"})) }))
        .route("/api/v1/products", get(list_products).post(create_product))
        .route("/api/v1/products/export", get(export_products))
        .route("/api/v1/products/import", post(import_products))
        .route("/api/v1/products/barcode/:code", get(product_by_barcode))
        .route("/api/v1/products/:id", get(get_product).put(update_product))
        .route("/api/v1/products/:id/suggestion", post(suggest_order))
        .route("/api/v1/cart/preview", post(preview_cart))
        .route("/api/v1/checkout", post(checkout))
        .route("/api/v1/sales", get(list_sales))
        .route("/api/v1/sales/export", get(export_sales))
        .route("/api/v1/orders", get(list_orders).post(create_order))
        .route("/api/v1/orders/export", get(export_orders))
        .route("/api/v1/orders/:id", get(get_order))
        .route("/api/v1/orders/:id/template", get(order_template))
        .route("/api/v1/orders/:id/complete", post(complete_order))
        .route("/api/v1/session", get(current_session).post(login).delete(logout))
        .route("/api/v1/users", get(list_users).post(create_user))
        .route("/api/v1/users/:id", put(update_user).delete(delete_user))
        .route("/api/v1/bank-accounts", get(list_accounts).post(create_account))
        .route("/api/v1/bank-accounts/:id", put(update_account).delete(delete_account))
        .route("/api/v1/calendar", get(list_events).post(create_event))
        .route("/api/v1/calendar/export", get(export_calendar))
        .route("/api/v1/calendar/:id", put(update_event).delete(delete_event))
        .route("/api/v1/reports/summary", get(financial_summary))
        .route("/api/v1/reports/top-products", get(top_products))
        .route("/api/v1/reports/weekly-sales", get(weekly_sales))
        .route("/api/v1/dashboard", get(dashboard))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()))
        .with_state(state)
}

// ---- catalog

async fn list_products(State(s): State<AppState>, Query(q): Query<CatalogQuery>) -> ApiResult<Json<Page<Product>>> {
    let products = s.ledger.products(&q.filter()?);
    Ok(Json(Page::of(products, q.page, q.per_page)))
}

async fn get_product(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Product>> {
    s.ledger.product(&id).map(Json).ok_or_else(|| LedgerError::ProductNotFound(id).into())
}

async fn product_by_barcode(State(s): State<AppState>, Path(code): Path<String>) -> ApiResult<Json<Product>> {
    s.ledger.find_by_barcode(&code).map(Json).ok_or_else(|| LedgerError::BarcodeNotFound(code).into())
}

async fn create_product(State(s): State<AppState>, Json(r): Json<ProductRequest>) -> ApiResult<(StatusCode, Json<Product>)> {
    r.validate()?;
    let p = s.ledger.create_product(r.into_draft()?).await?;
    Ok((StatusCode::CREATED, Json(p)))
}

async fn update_product(State(s): State<AppState>, Path(id): Path<String>, Json(r): Json<ProductRequest>) -> ApiResult<Json<Product>> {
    r.validate()?;
    Ok(Json(s.ledger.update_product(&id, r.into_draft()?).await?))
}

async fn export_products(State(s): State<AppState>, Query(q): Query<CatalogQuery>) -> ApiResult<Json<Vec<Row>>> {
    Ok(Json(s.ledger.export_catalog(&q.filter()?)))
}

async fn import_products(State(s): State<AppState>, Json(table): Json<Value>) -> ApiResult<Json<ImportSummary>> {
    Ok(Json(s.ledger.bulk_import(&table).await?))
}

async fn suggest_order(State(s): State<AppState>, Path(id): Path<String>, body: Option<Json<SuggestionBody>>) -> ApiResult<Json<Suggestion>> {
    let product = s.ledger.product(&id).ok_or_else(|| LedgerError::ProductNotFound(id.clone()))?;
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let request = SuggestionRequest::for_product(&product, body.seasonal_trends);
    match s.suggester.suggest(&request).await {
        Ok(suggestion) => Ok(Json(suggestion)),
        Err(SuggestError::InvalidInput(msg)) => Err(LedgerError::InvalidInput(msg).into()),
        Err(e) => {
            tracing::warn!(product_id = %id, error = %e, "order suggestion failed");
            Err(LedgerError::SuggestionUnavailable.into())
        }
    }
}

// ---- register

async fn preview_cart(State(s): State<AppState>, Json(r): Json<CartRequest>) -> ApiResult<Json<CartPreview>> {
    let (mut cart, mut warnings) = s.ledger.build_cart(&r.items)?;
    if let Some(code) = r.scan.as_deref().filter(|c| !c.trim().is_empty()) {
        warnings.extend(s.ledger.scan_into_cart(&mut cart, code)?);
    }
    Ok(Json(CartPreview::of(&cart, warnings)))
}

async fn checkout(State(s): State<AppState>, Json(r): Json<CheckoutRequest>) -> ApiResult<(StatusCode, Json<Receipt>)> {
    let (cart, warnings) = s.ledger.build_cart(&r.items)?;
    let mut receipt = s.ledger.record_sale(&cart, &r.employee, r.payment_method).await?;
    receipt.warnings = warnings;
    Ok((StatusCode::CREATED, Json(receipt)))
}

async fn list_sales(State(s): State<AppState>, Query(q): Query<RangeQuery>) -> Json<Vec<Sale>> {
    if q.from.is_none() && q.to.is_none() {
        return Json(s.ledger.sales());
    }
    let range = q.range();
    Json(s.ledger.sales_between(range.from, range.to))
}

async fn export_sales(State(s): State<AppState>) -> Json<Vec<Row>> {
    Json(s.ledger.export_sales())
}

// ---- orders

async fn list_orders(State(s): State<AppState>) -> Json<Vec<PurchaseOrder>> {
    Json(s.ledger.orders())
}

async fn get_order(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<PurchaseOrder>> {
    s.ledger.order(&id).map(Json).ok_or_else(|| LedgerError::OrderNotFound(id).into())
}

async fn create_order(State(s): State<AppState>, Json(r): Json<OrderRequest>) -> ApiResult<(StatusCode, Json<PurchaseOrder>)> {
    r.check()?;
    let order = s.ledger.create_order(r.supplier.clone(), &r.lines()?).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn order_template(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Vec<Row>>> {
    Ok(Json(s.ledger.order_template(&id)?))
}

/// Body is the filled-in supplier template.
async fn complete_order(State(s): State<AppState>, Path(id): Path<String>, Json(table): Json<Value>) -> ApiResult<Json<CompletionSummary>> {
    Ok(Json(s.ledger.import_order_prices(&id, &table).await?))
}

async fn export_orders(State(s): State<AppState>) -> Json<Vec<Row>> {
    Json(s.ledger.export_orders())
}

// ---- session & users

/// Session calls may hit the session file, so they run on the blocking pool.
async fn with_session_store<T, F>(ledger: &Arc<Ledger>, f: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&Ledger) -> crate::Result<T> + Send + 'static,
{
    let ledger = Arc::clone(ledger);
    match tokio::task::spawn_blocking(move || f(&ledger)).await {
        Ok(result) => Ok(result?),
        Err(e) => Err(LedgerError::Session(SessionError::Worker(e.to_string())).into()),
    }
}

async fn login(State(s): State<AppState>, Json(r): Json<LoginRequest>) -> ApiResult<Json<User>> {
    let user = with_session_store(&s.ledger, move |l| l.login(&r.email, &r.password)).await?;
    user.map(Json).ok_or_else(|| LedgerError::InvalidCredentials.into())
}

async fn logout(State(s): State<AppState>) -> ApiResult<StatusCode> {
    with_session_store(&s.ledger, |l| l.logout()).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn current_session(State(s): State<AppState>) -> ApiResult<Json<Option<User>>> {
    Ok(Json(with_session_store(&s.ledger, |l| l.current_user()).await?))
}

async fn list_users(State(s): State<AppState>) -> Json<Vec<User>> {
    Json(s.ledger.users())
}

async fn create_user(State(s): State<AppState>, Json(r): Json<CreateUserRequest>) -> ApiResult<(StatusCode, Json<User>)> {
    r.validate()?;
    Ok((StatusCode::CREATED, Json(s.ledger.create_user(r.into()).await?)))
}

async fn update_user(State(s): State<AppState>, Path(id): Path<String>, Json(r): Json<UpdateUserRequest>) -> ApiResult<Json<User>> {
    r.validate()?;
    Ok(Json(s.ledger.update_user(&id, r.into()).await?))
}

async fn delete_user(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    s.ledger.delete_user(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- bank accounts & calendar

async fn list_accounts(State(s): State<AppState>) -> Json<Vec<BankAccount>> {
    Json(s.ledger.bank_accounts())
}

async fn create_account(State(s): State<AppState>, Json(r): Json<BankAccountRequest>) -> ApiResult<(StatusCode, Json<BankAccount>)> {
    r.validate()?;
    Ok((StatusCode::CREATED, Json(s.ledger.create_account(r.into()).await?)))
}

async fn update_account(State(s): State<AppState>, Path(id): Path<String>, Json(r): Json<BankAccountRequest>) -> ApiResult<Json<BankAccount>> {
    r.validate()?;
    Ok(Json(s.ledger.update_account(&id, r.into()).await?))
}

async fn delete_account(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    s.ledger.delete_account(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_events(State(s): State<AppState>, Query(q): Query<DayQuery>) -> Json<Vec<CalendarEvent>> {
    Json(match q.date {
        Some(day) => s.ledger.events_on(day),
        None => s.ledger.calendar(),
    })
}

async fn create_event(State(s): State<AppState>, Json(r): Json<CalendarEventRequest>) -> ApiResult<(StatusCode, Json<CalendarEvent>)> {
    r.validate()?;
    Ok((StatusCode::CREATED, Json(s.ledger.create_event(r.into()).await?)))
}

async fn update_event(State(s): State<AppState>, Path(id): Path<String>, Json(r): Json<CalendarEventRequest>) -> ApiResult<Json<CalendarEvent>> {
    r.validate()?;
    Ok(Json(s.ledger.update_event(&id, r.into()).await?))
}

async fn delete_event(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    s.ledger.delete_event(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn export_calendar(State(s): State<AppState>) -> Json<Vec<Row>> {
    Json(s.ledger.export_calendar())
}

// ---- reports

async fn financial_summary(State(s): State<AppState>, Query(q): Query<RangeQuery>) -> Json<FinancialSummary> {
    Json(s.ledger.financial_summary(q.range()))
}

async fn top_products(State(s): State<AppState>, Query(q): Query<RangeQuery>) -> Json<Vec<TopProduct>> {
    Json(s.ledger.top_products(q.range()))
}

async fn weekly_sales(State(s): State<AppState>, Query(q): Query<RangeQuery>) -> Json<Vec<WeeklySales>> {
    Json(s.ledger.weekly_sales(q.range()))
}

async fn dashboard(State(s): State<AppState>) -> Json<Dashboard> {
    Json(s.ledger.dashboard(Utc::now().date_naive()))
}
