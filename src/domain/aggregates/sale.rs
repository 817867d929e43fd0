//! Sale record
//!
//! One record per cart line. Product name and image are a point-in-time
//! snapshot. Sales are never edited once recorded.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;
use crate::domain::aggregates::cart::CartLine;
use crate::domain::value_objects::Money;
use crate::domain::events::{DomainEvent, SaleEvent};

pub const UNKNOWN_EMPLOYEE: &str = "Desconocido";

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    id: String,
    product_id: String,
    product_name: String,
    product_image: String,
    quantity: u32,
    total_price: Money,
    date: DateTime<Utc>,
    employee: String,
}

impl Sale {
    /// Returns `None` for a line with no product selected.
    pub fn from_line(line: &CartLine, employee: impl Into<String>, date: DateTime<Utc>) -> Option<Self> {
        let product_id = line.product_id.clone()?;
        Some(Self {
            id: Self::next_id(), product_id, product_name: line.name.clone(), product_image: line.image_url.clone(),
            quantity: line.quantity, total_price: line.line_total(), date, employee: employee.into(),
        })
    }

    fn next_id() -> String {
        let hex = Uuid::new_v4().simple().to_string();
        format!("sale-{}", &hex[..8])
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn product_id(&self) -> &str { &self.product_id }
    pub fn product_name(&self) -> &str { &self.product_name }
    pub fn product_image(&self) -> &str { &self.product_image }
    pub fn quantity(&self) -> u32 { self.quantity }
    pub fn total_price(&self) -> Money { self.total_price }
    pub fn date(&self) -> DateTime<Utc> { self.date }
    pub fn employee(&self) -> &str { &self.employee }

    pub fn recorded_event(&self) -> DomainEvent {
        DomainEvent::Sale(SaleEvent::Recorded {
            sale_id: self.id.clone(), product_id: self.product_id.clone(), quantity: self.quantity, total: self.total_price,
        })
    }
}
