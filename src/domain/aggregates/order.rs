//! Purchase Order Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::domain::value_objects::Money;
use crate::domain::events::{DomainEvent, OrderEvent};

pub const UNKNOWN_PRODUCT_NAME: &str = "Producto Desconocido";

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrder {
    id: String,
    date: DateTime<Utc>,
    status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    supplier: Option<String>,
    items: Vec<OrderItem>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

/// Line of a purchase order. Name and price are copied from the catalog when
/// the order is placed and are not kept in sync with it afterwards.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem { pub product_id: String, pub name: String, pub quantity: u32, pub purchase_price: Money }

impl OrderItem {
    pub fn subtotal(&self) -> Money { self.purchase_price.multiply(self.quantity) }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    #[serde(rename = "Pendiente")] Pending,
    #[serde(rename = "Completado")] Completed,
    /// Declared by the store's workflow but no operation moves an order here yet.
    #[serde(rename = "Cancelado")] Cancelled,
}

impl OrderStatus {
    pub fn label(&self) -> &'static str {
        match self { Self::Pending => "Pendiente", Self::Completed => "Completado", Self::Cancelled => "Cancelado" }
    }
    pub fn is_terminal(&self) -> bool { !matches!(self, Self::Pending) }
}

impl PurchaseOrder {
    pub fn create(id: impl Into<String>, supplier: Option<String>, items: Vec<OrderItem>) -> Result<Self, OrderError> {
        if items.is_empty() { return Err(OrderError::NoItems); }
        if items.iter().any(|i| i.quantity == 0) { return Err(OrderError::ZeroQuantity); }
        let id = id.into();
        let supplier = supplier.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        let mut order = Self { id: id.clone(), date: Utc::now(), status: OrderStatus::Pending, supplier: supplier.clone(), items, events: vec![] };
        order.raise_event(DomainEvent::Order(OrderEvent::Created { order_id: id, supplier }));
        Ok(order)
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn date(&self) -> DateTime<Utc> { self.date }
    pub fn status(&self) -> OrderStatus { self.status }
    pub fn supplier(&self) -> Option<&str> { self.supplier.as_deref() }
    pub fn items(&self) -> &[OrderItem] { &self.items }
    pub fn total(&self) -> Money { self.items.iter().map(OrderItem::subtotal).sum() }

    pub fn ensure_pending(&self) -> Result<(), OrderError> {
        if self.status.is_terminal() { return Err(OrderError::NotPending(self.status)); }
        Ok(())
    }

    /// Sets the supplier's unit price on the line for `product_id` and returns
    /// that line's ordered quantity, or `None` when the product is not on the order.
    pub fn price_item(&mut self, product_id: &str, unit_price: Money) -> Option<u32> {
        let item = self.items.iter_mut().find(|i| i.product_id == product_id)?;
        item.purchase_price = unit_price;
        Some(item.quantity)
    }

    pub fn complete(&mut self) -> Result<(), OrderError> {
        self.ensure_pending()?;
        self.status = OrderStatus::Completed;
        self.raise_event(DomainEvent::Order(OrderEvent::Completed { order_id: self.id.clone(), total: self.total() }));
        Ok(())
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum OrderError { NoItems, ZeroQuantity, NotPending(OrderStatus) }
impl std::error::Error for OrderError {}
impl std::fmt::Display for OrderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoItems => write!(f, "No items"),
            Self::ZeroQuantity => write!(f, "Item quantity must be at least 1"),
            Self::NotPending(s) => write!(f, "Order is {}", s.label()),
        }
    }
}
