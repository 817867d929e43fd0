//! Domain events
use serde::Serialize;

use crate::domain::value_objects::Money;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "aggregate", content = "event", rename_all = "snake_case")]
pub enum DomainEvent {
    Product(ProductEvent),
    Order(OrderEvent),
    Sale(SaleEvent),
    User(UserEvent),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProductEvent {
    Created { product_id: String, name: String },
    Updated { product_id: String },
    StockReceived { product_id: String, quantity: u32, purchase_price: Money },
    Imported { updated: usize },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderEvent {
    Created { order_id: String, supplier: Option<String> },
    Completed { order_id: String, total: Money },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SaleEvent {
    Recorded { sale_id: String, product_id: String, quantity: u32, total: Money },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UserEvent {
    Created { user_id: String },
    Updated { user_id: String },
    Deleted { user_id: String },
}

impl DomainEvent {
    /// Messaging subject, e.g. `elamigo.order.completed`.
    pub fn subject(&self) -> String {
        let (aggregate, name) = match self {
            DomainEvent::Product(e) => ("product", match e {
                ProductEvent::Created { .. } => "created",
                ProductEvent::Updated { .. } => "updated",
                ProductEvent::StockReceived { .. } => "stock_received",
                ProductEvent::Imported { .. } => "imported",
            }),
            DomainEvent::Order(e) => ("order", match e {
                OrderEvent::Created { .. } => "created",
                OrderEvent::Completed { .. } => "completed",
            }),
            DomainEvent::Sale(SaleEvent::Recorded { .. }) => ("sale", "recorded"),
            DomainEvent::User(e) => ("user", match e {
                UserEvent::Created { .. } => "created",
                UserEvent::Updated { .. } => "updated",
                UserEvent::Deleted { .. } => "deleted",
            }),
        };
        format!("elamigo.{aggregate}.{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_subject_names() {
        let e = DomainEvent::Order(OrderEvent::Completed { order_id: "ord-001".into(), total: Money::ZERO });
        assert_eq!(e.subject(), "elamigo.order.completed");
        let e = DomainEvent::Product(ProductEvent::StockReceived { product_id: "prod-001".into(), quantity: 2, purchase_price: Money::ZERO });
        assert_eq!(e.subject(), "elamigo.product.stock_received");
    }
}
