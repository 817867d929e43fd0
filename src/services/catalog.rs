//! Catalog store: create, edit, query, spreadsheet import/export.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use super::Ledger;
use crate::domain::aggregates::{Category, Product, ProductDraft};
use crate::domain::events::{DomainEvent, ProductEvent};
use crate::repository::sequential_id;
use crate::sheet::{self, Row};
use crate::{LedgerError, Result};

/// Catalog list view filters. Every set field must match.
#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
    /// Case-insensitive name substring, or barcode substring.
    pub search: Option<String>,
    pub category: Option<Category>,
    pub low_stock: bool,
}

impl CatalogFilter {
    pub fn matches(&self, product: &Product) -> bool {
        let search_ok = match self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => true,
            Some(term) => {
                product.name().to_lowercase().contains(&term.to_lowercase())
                    || product.barcode().is_some_and(|b| b.as_str().contains(term))
            }
        };
        search_ok
            && self.category.map_or(true, |c| product.category() == c)
            && (!self.low_stock || product.is_low_stock())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub updated: usize,
    pub skipped: usize,
}

impl Ledger {
    #[tracing::instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create_product(&self, draft: ProductDraft) -> Result<Product> {
        let _guard = self.write.lock().await;
        let products = &self.stores.products;
        let id = sequential_id("prod", products.count(), |id| products.contains(id));
        let mut product = Product::create(id, draft)?;
        let events = product.take_events();
        products.prepend(product.clone());
        tracing::info!(product_id = %product.id(), "product created");
        self.publish(events).await;
        Ok(product)
    }

    #[tracing::instrument(skip(self, draft))]
    pub async fn update_product(&self, product_id: &str, draft: ProductDraft) -> Result<Product> {
        let _guard = self.write.lock().await;
        let mut product = self.stores.products.get(product_id).ok_or_else(|| LedgerError::ProductNotFound(product_id.to_string()))?;
        product.update(draft)?;
        let events = product.take_events();
        self.stores.products.replace(product.clone());
        tracing::info!("product updated");
        self.publish(events).await;
        Ok(product)
    }

    pub fn product(&self, product_id: &str) -> Option<Product> {
        self.stores.products.get(product_id)
    }

    pub fn find_by_barcode(&self, code: &str) -> Option<Product> {
        let code = code.trim();
        self.stores.products.list().into_iter().find(|p| p.barcode().is_some_and(|b| b.as_str() == code))
    }

    pub fn products(&self, filter: &CatalogFilter) -> Vec<Product> {
        self.stores.products.list().into_iter().filter(|p| filter.matches(p)).collect()
    }

    pub fn low_stock_products(&self) -> Vec<Product> {
        self.products(&CatalogFilter { low_stock: true, ..Default::default() })
    }

    pub fn expiring_products(&self, today: NaiveDate) -> Vec<Product> {
        self.stores.products.list().into_iter().filter(|p| p.is_expiring_soon(today)).collect()
    }

    /// Rows for the catalog spreadsheet, following the current filter.
    pub fn export_catalog(&self, filter: &CatalogFilter) -> Vec<Row> {
        sheet::catalog_rows(&self.products(filter))
    }

    /// Overwrites matching products column by column. The whole table is parsed
    /// before anything is written; rows whose id is missing or unknown are skipped.
    #[tracing::instrument(skip(self, table))]
    pub async fn bulk_import(&self, table: &Value) -> Result<ImportSummary> {
        let rows = sheet::parse_catalog_rows(table)?;
        let _guard = self.write.lock().await;
        let mut summary = ImportSummary { updated: 0, skipped: 0 };
        for row in rows {
            let Some(mut product) = row.product_id.as_deref().and_then(|id| self.stores.products.get(id)) else {
                tracing::debug!(product_id = ?row.product_id, "import row matches no product, skipped");
                summary.skipped += 1;
                continue;
            };
            product.apply_patch(&row.patch);
            self.stores.products.replace(product);
            summary.updated += 1;
        }
        if summary.skipped > 0 {
            tracing::warn!(skipped = summary.skipped, "catalog import skipped unmatched rows");
        }
        tracing::info!(updated = summary.updated, "catalog imported");
        self.publish(vec![DomainEvent::Product(ProductEvent::Imported { updated: summary.updated })]).await;
        Ok(summary)
    }
}
