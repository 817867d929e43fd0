//! Request and response bodies.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::aggregates::{Category, EventKind, ProductDraft, Role};
use crate::domain::value_objects::{Barcode, Money};
use crate::services::{
    BankAccountDraft, CalendarEventDraft, CartRequestLine, CatalogFilter, DateRange, NewUser, PaymentMethod, UserEdit,
};
use crate::sheet::parse_date;
use crate::{LedgerError, Result};

pub const DEFAULT_PAGE_SIZE: usize = 8;
pub const MAX_PAGE_SIZE: usize = 100;
pub const DEFAULT_REPORT_DAYS: i64 = 30;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    #[validate(length(min = 3))]
    pub name: String,
    #[serde(default)]
    pub barcode: Option<String>,
    pub category: Category,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub stock: i64,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub purchase_price: f64,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub sale_price: f64,
    #[serde(default)]
    pub expiry_date: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl ProductRequest {
    pub fn into_draft(self) -> Result<ProductDraft> {
        let money = |field: &str, v: f64| Money::from_f64(v).map_err(|e| LedgerError::InvalidInput(format!("{field}: {e}")));
        let expiry_date = match self.expiry_date.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => None,
            Some(raw) => Some(parse_date(raw).ok_or_else(|| LedgerError::InvalidInput(format!("expiryDate: cannot read '{raw}' as a date")))?),
        };
        Ok(ProductDraft {
            barcode: self.barcode.and_then(Barcode::parse),
            category: self.category,
            stock: u32::try_from(self.stock).map_err(|_| LedgerError::InvalidInput("stock is out of range".into()))?,
            purchase_price: money("purchasePrice", self.purchase_price)?,
            sale_price: money("salePrice", self.sale_price)?,
            expiry_date,
            image_url: self.image_url.filter(|u| !u.trim().is_empty()),
            name: self.name,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub low_stock: Option<bool>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

impl CatalogQuery {
    pub fn filter(&self) -> Result<CatalogFilter> {
        let category = match self.category.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(c) if c.eq_ignore_ascii_case("todos") || c.eq_ignore_ascii_case("all") => None,
            Some(c) => Some(Category::from_label(c).ok_or_else(|| LedgerError::InvalidInput(format!("unknown category '{c}'")))?),
        };
        Ok(CatalogFilter { search: self.search.clone(), category, low_stock: self.low_stock.unwrap_or(false) })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn of(items: Vec<T>, page: Option<usize>, per_page: Option<usize>) -> Self {
        let per_page = per_page.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let page = page.unwrap_or(1).max(1);
        let total = items.len();
        let data = items.into_iter().skip((page - 1).saturating_mul(per_page)).take(per_page).collect();
        Self { data, total, page, per_page, total_pages: total.div_ceil(per_page) }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    #[serde(default)]
    pub supplier: Option<String>,
    #[validate(length(min = 1))]
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    #[validate(length(min = 1))]
    pub product_id: String,
    #[validate(range(min = 1))]
    pub quantity: i64,
}

impl OrderRequest {
    /// Validates the order and each of its lines.
    pub fn check(&self) -> Result<()> {
        self.validate()?;
        for item in &self.items {
            item.validate()?;
        }
        Ok(())
    }

    pub fn lines(&self) -> Result<Vec<(String, u32)>> {
        self.items
            .iter()
            .map(|i| {
                let qty = u32::try_from(i.quantity).map_err(|_| LedgerError::InvalidInput(format!("quantity out of range for {}", i.product_id)))?;
                Ok((i.product_id.trim().to_string(), qty))
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartRequest {
    #[serde(default)]
    pub items: Vec<CartRequestLine>,
    /// Barcode read by the scanner, applied after the listed lines.
    #[serde(default)]
    pub scan: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default)]
    pub items: Vec<CartRequestLine>,
    #[serde(default)]
    pub employee: String,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(length(min = 2))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub role: Role,
    #[validate(length(min = 6))]
    pub password: String,
    #[validate(must_match = "password")]
    pub confirm_password: String,
}

impl From<CreateUserRequest> for NewUser {
    fn from(r: CreateUserRequest) -> Self {
        NewUser { name: r.name, email: r.email, role: r.role, password: r.password }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 2))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub role: Role,
}

impl From<UpdateUserRequest> for UserEdit {
    fn from(r: UpdateUserRequest) -> Self {
        UserEdit { name: r.name, email: r.email, role: r.role }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BankAccountRequest {
    #[validate(length(min = 2))]
    pub bank_name: String,
    #[validate(length(min = 3))]
    pub account_holder: String,
    #[validate(length(min = 5))]
    pub account_number: String,
    #[serde(default)]
    pub cci: Option<String>,
}

impl From<BankAccountRequest> for BankAccountDraft {
    fn from(r: BankAccountRequest) -> Self {
        BankAccountDraft { bank_name: r.bank_name, account_holder: r.account_holder, account_number: r.account_number, cci: r.cci }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CalendarEventRequest {
    pub date: NaiveDate,
    #[validate(length(min = 3))]
    pub title: String,
    #[validate(length(min = 3))]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: EventKind,
}

impl From<CalendarEventRequest> for CalendarEventDraft {
    fn from(r: CalendarEventRequest) -> Self {
        CalendarEventDraft { date: r.date, title: r.title, description: r.description, kind: r.kind }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DayQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl RangeQuery {
    /// Missing bounds default to the trailing 30 days ending today.
    pub fn range(&self) -> DateRange {
        let today = Utc::now().date_naive();
        let to = self.to.unwrap_or(today);
        let from = self.from.unwrap_or_else(|| DateRange::trailing(to, DEFAULT_REPORT_DAYS).from);
        DateRange::new(from, to)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionBody {
    #[serde(default)]
    pub seasonal_trends: Option<String>,
}
