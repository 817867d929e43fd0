//! Order ledger: purchase orders, supplier templates, completion.

use serde::Serialize;
use serde_json::Value;

use super::Ledger;
use crate::domain::aggregates::order::UNKNOWN_PRODUCT_NAME;
use crate::domain::aggregates::{OrderItem, PurchaseOrder};
use crate::domain::value_objects::Money;
use crate::repository::sequential_id;
use crate::sheet::{self, PriceRow, Row};
use crate::{LedgerError, Result};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionSummary {
    pub order: PurchaseOrder,
    /// Price rows that matched an order line.
    pub applied: usize,
    /// Price rows left out: not on the order, or with no usable price.
    pub ignored: usize,
}

impl Ledger {
    /// Places an order. Item names and purchase prices are copied from the
    /// catalog as they stand now.
    #[tracing::instrument(skip(self, items), fields(items = items.len()))]
    pub async fn create_order(&self, supplier: Option<String>, items: &[(String, u32)]) -> Result<PurchaseOrder> {
        let _guard = self.write.lock().await;
        let items = items
            .iter()
            .map(|(product_id, quantity)| match self.stores.products.get(product_id) {
                Some(p) => OrderItem { product_id: product_id.clone(), name: p.name().to_string(), quantity: *quantity, purchase_price: p.purchase_price() },
                None => {
                    tracing::warn!(%product_id, "ordering a product missing from the catalog");
                    OrderItem { product_id: product_id.clone(), name: UNKNOWN_PRODUCT_NAME.to_string(), quantity: *quantity, purchase_price: Money::ZERO }
                }
            })
            .collect();

        let orders = &self.stores.orders;
        let id = sequential_id("ord", orders.count(), |id| orders.contains(id));
        let mut order = PurchaseOrder::create(id, supplier, items)?;
        let events = order.take_events();
        orders.prepend(order.clone());
        tracing::info!(order_id = %order.id(), "order created");
        self.publish(events).await;
        Ok(order)
    }

    pub fn order(&self, order_id: &str) -> Option<PurchaseOrder> {
        self.stores.orders.get(order_id)
    }

    /// Most recent first.
    pub fn orders(&self) -> Vec<PurchaseOrder> {
        self.stores.orders.list()
    }

    /// Applies supplier prices and receives the goods. Each usable row sets the
    /// line's price, adds the ordered quantity to the product's stock and makes
    /// the price its new purchase price. Other rows are skipped one by one.
    #[tracing::instrument(skip(self, rows), fields(rows = rows.len()))]
    pub async fn complete_order(&self, order_id: &str, rows: &[PriceRow]) -> Result<CompletionSummary> {
        let _guard = self.write.lock().await;
        let mut order = self.stores.orders.get(order_id).ok_or_else(|| LedgerError::OrderNotFound(order_id.to_string()))?;
        order.ensure_pending()?;

        let (mut applied, mut ignored) = (0, 0);
        let mut events = vec![];
        for row in rows {
            let Some(price) = row.unit_price else {
                tracing::debug!(product_id = %row.product_id, "price row has no usable price");
                ignored += 1;
                continue;
            };
            let Some(quantity) = order.price_item(&row.product_id, price) else {
                tracing::debug!(product_id = %row.product_id, "price row is not on this order");
                ignored += 1;
                continue;
            };
            applied += 1;
            match self.stores.products.get(&row.product_id) {
                Some(mut product) => {
                    product.receive_stock(quantity, price);
                    events.extend(product.take_events());
                    self.stores.products.replace(product);
                }
                None => tracing::warn!(product_id = %row.product_id, "received goods for a product missing from the catalog"),
            }
        }

        order.complete()?;
        events.extend(order.take_events());
        self.stores.orders.replace(order.clone());
        if ignored > 0 {
            tracing::warn!(ignored, "order completion skipped price rows");
        }
        tracing::info!(applied, total = %order.total(), "order completed");
        self.publish(events).await;
        Ok(CompletionSummary { order, applied, ignored })
    }

    /// Completes an order from the filled-in supplier template.
    pub async fn import_order_prices(&self, order_id: &str, table: &Value) -> Result<CompletionSummary> {
        let rows = sheet::parse_price_rows(table)?;
        self.complete_order(order_id, &rows).await
    }

    pub fn order_template(&self, order_id: &str) -> Result<Vec<Row>> {
        let order = self.order(order_id).ok_or_else(|| LedgerError::OrderNotFound(order_id.to_string()))?;
        Ok(sheet::order_template_rows(&order))
    }

    pub fn export_orders(&self) -> Vec<Row> {
        sheet::order_rows(&self.orders())
    }
}
