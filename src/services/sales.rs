//! Sales register: cart assembly, checkout, sales history.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::Ledger;
use crate::domain::aggregates::{BankAccount, Cart, CartLine, Sale, StockWarning};
use crate::domain::aggregates::sale::UNKNOWN_EMPLOYEE;
use crate::domain::value_objects::Money;
use crate::sheet::{self, Row};
use crate::{LedgerError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Efectivo,
    Transferencia,
    Yape,
    Plin,
}

impl PaymentMethod {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Efectivo => "Efectivo",
            Self::Transferencia => "Transferencia Bancaria",
            Self::Yape => "Yape",
            Self::Plin => "Plin",
        }
    }
}

/// One register line as submitted: a product (or none yet) and the quantity typed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartRequestLine {
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default = "one")]
    pub quantity: i64,
}

fn one() -> i64 {
    1
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartPreview {
    pub lines: Vec<PreviewLine>,
    pub total: Money,
    pub warnings: Vec<StockWarning>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewLine {
    pub product_id: Option<String>,
    pub name: String,
    pub image_url: String,
    pub quantity: u32,
    pub price: Money,
    pub stock: u32,
    pub line_total: Money,
}

impl From<&CartLine> for PreviewLine {
    fn from(l: &CartLine) -> Self {
        Self {
            product_id: l.product_id.clone(), name: l.name.clone(), image_url: l.image_url.clone(),
            quantity: l.quantity, price: l.price, stock: l.stock, line_total: l.line_total(),
        }
    }
}

impl CartPreview {
    pub fn of(cart: &Cart, warnings: Vec<StockWarning>) -> Self {
        Self { lines: cart.lines().iter().map(PreviewLine::from).collect(), total: cart.total(), warnings }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub sales: Vec<Sale>,
    pub total: Money,
    pub employee: String,
    pub payment_method: PaymentMethod,
    pub payment_label: &'static str,
    /// Only filled for transfers, so the customer knows where to pay.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bank_accounts: Vec<BankAccount>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<StockWarning>,
}

impl Ledger {
    /// Rebuilds a register cart from submitted lines, clamping each quantity to
    /// the product's stock. Clamps come back as warnings, not errors.
    pub fn build_cart(&self, lines: &[CartRequestLine]) -> Result<(Cart, Vec<StockWarning>)> {
        let mut cart = Cart::new();
        let mut warnings = vec![];
        for line in lines {
            let line_id = cart.add_blank_line();
            let Some(product_id) = line.product_id.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
                continue;
            };
            let product = self.product(product_id).ok_or_else(|| LedgerError::ProductNotFound(product_id.to_string()))?;
            cart.select_product(&line_id, &product)?;
            if let Some(w) = cart.set_quantity(&line_id, line.quantity)? {
                tracing::warn!(product_id = %w.product_id, requested = w.requested, available = w.available, "cart quantity clamped to stock");
                warnings.push(w);
            }
        }
        Ok((cart, warnings))
    }

    /// Adds the product carrying `barcode` to the cart, or bumps its line.
    pub fn scan_into_cart(&self, cart: &mut Cart, barcode: &str) -> Result<Option<StockWarning>> {
        let product = self.find_by_barcode(barcode).ok_or_else(|| LedgerError::BarcodeNotFound(barcode.trim().to_string()))?;
        let warning = cart.add_product(&product)?;
        if let Some(w) = &warning {
            tracing::warn!(product_id = %w.product_id, available = w.available, "scan exceeds stock");
        }
        Ok(warning)
    }

    /// Records one sale per cart line. Catalog stock is left as it is.
    #[tracing::instrument(skip(self, cart), fields(lines = cart.lines().len()))]
    pub async fn record_sale(&self, cart: &Cart, employee: &str, payment: PaymentMethod) -> Result<Receipt> {
        let lines = cart.checkout_lines()?;
        let _guard = self.write.lock().await;
        for line in lines {
            let id = line.product_id.as_deref().unwrap_or_default();
            if !self.stores.products.contains(id) {
                return Err(LedgerError::ProductNotFound(id.to_string()));
            }
        }

        let employee = self.resolve_employee(employee);
        let now = Utc::now();
        let sales: Vec<Sale> = lines.iter().filter_map(|l| Sale::from_line(l, employee.clone(), now)).collect();
        for sale in sales.iter().rev() {
            self.stores.sales.prepend(sale.clone());
        }

        let total: Money = sales.iter().map(Sale::total_price).sum();
        tracing::info!(count = sales.len(), %total, employee = %employee, payment = payment.display_name(), "sale recorded");
        self.publish(sales.iter().map(Sale::recorded_event).collect()).await;

        let bank_accounts = if payment == PaymentMethod::Transferencia { self.bank_accounts() } else { vec![] };
        Ok(Receipt {
            sales, total, employee, payment_method: payment, payment_label: payment.display_name(), bank_accounts, warnings: vec![],
        })
    }

    /// Directory spelling of `name`, or "Desconocido" when nobody matches.
    pub fn resolve_employee(&self, name: &str) -> String {
        let name = name.trim();
        self.stores
            .users
            .list()
            .into_iter()
            .find(|u| u.name().to_lowercase() == name.to_lowercase())
            .map(|u| u.name().to_string())
            .unwrap_or_else(|| UNKNOWN_EMPLOYEE.to_string())
    }

    /// Most recent first.
    pub fn sales(&self) -> Vec<Sale> {
        self.stores.sales.list()
    }

    pub fn sales_between(&self, from: NaiveDate, to: NaiveDate) -> Vec<Sale> {
        self.sales().into_iter().filter(|s| (from..=to).contains(&s.date().date_naive())).collect()
    }

    pub fn export_sales(&self) -> Vec<Row> {
        sheet::sale_rows(&self.sales())
    }
}
