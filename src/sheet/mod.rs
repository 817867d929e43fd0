//! Spreadsheet row contract.
//!
//! Workbook encoding happens outside this crate. What crosses the boundary is
//! a list of rows keyed by column header, exactly as a sheet-to-JSON reader
//! produces them, so the header strings below are the wire format. Exports and
//! imports share them, which is what lets a supplier fill in an exported order
//! template and hand it straight back.

mod dates;

pub use dates::{format_date, parse_date};

use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::domain::aggregates::{CalendarEvent, CatalogPatch, Category, Product, PurchaseOrder, Sale};
use crate::domain::value_objects::{Barcode, Money};

pub type Row = Map<String, Value>;

pub mod columns {
    pub const ID: &str = "ID";
    pub const BARCODE: &str = "Código de Barras";
    pub const PRODUCT: &str = "Producto";
    pub const CATEGORY: &str = "Categoría";
    pub const STATUS: &str = "Estado";
    pub const STOCK: &str = "Stock";
    pub const PURCHASE_PRICE: &str = "Precio Compra";
    pub const SALE_PRICE: &str = "Precio Venta";
    pub const EXPIRY_DATE: &str = "Fecha de Vencimiento";

    pub const ORDER_ID: &str = "ID Pedido";
    pub const SUPPLIER: &str = "Proveedor";
    pub const DATE: &str = "Fecha";
    pub const PRODUCT_ID: &str = "ID Producto";
    pub const QUANTITY: &str = "Cantidad";
    pub const UNIT_PRICE: &str = "Precio Compra Unit.";
    pub const SUBTOTAL: &str = "Subtotal";

    pub const SALE_ID: &str = "ID Venta";
    pub const TOTAL_PRICE: &str = "Precio Total";
    pub const EMPLOYEE: &str = "Empleado";

    pub const TITLE: &str = "Titulo";
    pub const DESCRIPTION: &str = "Descripcion";
    pub const KIND: &str = "Tipo";
}

const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Error, PartialEq)]
pub enum SheetError {
    #[error("expected a list of rows")]
    NotATable,
    #[error("row {row}: column '{column}' {reason}")]
    InvalidCell { row: usize, column: &'static str, reason: String },
}

/// One parsed catalog import row. Rows without an id can never match a product.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRow {
    pub product_id: Option<String>,
    pub patch: CatalogPatch,
}

/// One parsed line of a filled-in order template. `unit_price` is `None` when
/// the cell is empty, not a number, or negative.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRow {
    pub product_id: String,
    pub unit_price: Option<Money>,
}

pub fn catalog_rows(products: &[Product]) -> Vec<Row> {
    products
        .iter()
        .map(|p| {
            let status = if p.is_low_stock() { format!("Bajo Stock ({})", p.stock()) } else { "En Stock".to_string() };
            row([
                (columns::ID, json!(p.id())),
                (columns::BARCODE, json!(p.barcode().map_or(NOT_AVAILABLE, |b| b.as_str()))),
                (columns::PRODUCT, json!(p.name())),
                (columns::CATEGORY, json!(p.category().label())),
                (columns::STATUS, json!(status)),
                (columns::STOCK, json!(p.stock())),
                (columns::PURCHASE_PRICE, json!(p.purchase_price())),
                (columns::SALE_PRICE, json!(p.sale_price())),
                (columns::EXPIRY_DATE, json!(p.expiry_date().map_or_else(|| NOT_AVAILABLE.to_string(), format_date))),
            ])
        })
        .collect()
}

pub fn parse_catalog_rows(table: &Value) -> Result<Vec<CatalogRow>, SheetError> {
    rows_of(table)?
        .iter()
        .enumerate()
        .map(|(i, r)| parse_catalog_row(i + 1, r))
        .collect()
}

fn parse_catalog_row(n: usize, r: &Row) -> Result<CatalogRow, SheetError> {
    let product_id = r.get(columns::ID).and_then(text);
    let mut patch = CatalogPatch { name: r.get(columns::PRODUCT).and_then(text), ..Default::default() };

    if let Some(cell) = r.get(columns::BARCODE) {
        patch.barcode = Some(text(cell).and_then(Barcode::parse));
    }

    if let Some(cell) = present(r, columns::CATEGORY) {
        let label = text(cell).unwrap_or_default();
        let category = Category::from_label(&label)
            .ok_or_else(|| invalid(n, columns::CATEGORY, format!("has unknown category '{label}'")))?;
        patch.category = Some(category);
    }

    if let Some(cell) = present(r, columns::STOCK) {
        let stock = number(cell)
            .filter(|v| *v >= 0.0 && v.fract() == 0.0 && *v <= f64::from(u32::MAX))
            .ok_or_else(|| invalid(n, columns::STOCK, "must be a whole number of units".into()))?;
        patch.stock = Some(stock as u32);
    }

    patch.purchase_price = price_cell(n, r, columns::PURCHASE_PRICE)?;
    patch.sale_price = price_cell(n, r, columns::SALE_PRICE)?;

    if let Some(cell) = r.get(columns::EXPIRY_DATE) {
        match text(cell) {
            None => patch.expiry_date = Some(None),
            Some(s) if s == NOT_AVAILABLE => patch.expiry_date = Some(None),
            // an unreadable date leaves the stored one alone
            Some(s) => patch.expiry_date = parse_date(&s).map(Some),
        }
    }

    Ok(CatalogRow { product_id, patch })
}

fn price_cell(n: usize, r: &Row, column: &'static str) -> Result<Option<Money>, SheetError> {
    let Some(cell) = present(r, column) else {
        return Ok(None);
    };
    let money = number(cell)
        .and_then(|v| Money::from_f64(v).ok())
        .ok_or_else(|| invalid(n, column, "must be a non-negative amount".into()))?;
    Ok(Some(money))
}

/// Supplier template for one order: the unit price column is left empty and the
/// subtotal column holds a per-row formula over quantity and unit price.
pub fn order_template_rows(order: &PurchaseOrder) -> Vec<Row> {
    order
        .items()
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let line = i + 2;
            row([
                (columns::PRODUCT_ID, json!(item.product_id)),
                (columns::PRODUCT, json!(item.name)),
                (columns::QUANTITY, json!(item.quantity)),
                (columns::UNIT_PRICE, Value::Null),
                (columns::SUBTOTAL, json!(format!("=C{line}*D{line}"))),
            ])
        })
        .collect()
}

pub fn parse_price_rows(table: &Value) -> Result<Vec<PriceRow>, SheetError> {
    Ok(rows_of(table)?
        .iter()
        .filter_map(|r| {
            let product_id = r.get(columns::PRODUCT_ID).and_then(text)?;
            let unit_price = r
                .get(columns::UNIT_PRICE)
                .and_then(Value::as_f64)
                .and_then(|v| Money::from_f64(v).ok());
            Some(PriceRow { product_id, unit_price })
        })
        .collect())
}

pub fn order_rows(orders: &[PurchaseOrder]) -> Vec<Row> {
    orders
        .iter()
        .flat_map(|o| {
            o.items().iter().map(move |item| {
                row([
                    (columns::ORDER_ID, json!(o.id())),
                    (columns::SUPPLIER, json!(o.supplier().unwrap_or(NOT_AVAILABLE))),
                    (columns::STATUS, json!(o.status().label())),
                    (columns::DATE, json!(format_date(o.date().date_naive()))),
                    (columns::PRODUCT_ID, json!(item.product_id)),
                    (columns::PRODUCT, json!(item.name)),
                    (columns::QUANTITY, json!(item.quantity)),
                    (columns::PURCHASE_PRICE, json!(item.purchase_price)),
                    (columns::SUBTOTAL, json!(item.subtotal())),
                ])
            })
        })
        .collect()
}

pub fn sale_rows(sales: &[Sale]) -> Vec<Row> {
    sales
        .iter()
        .map(|s| {
            row([
                (columns::SALE_ID, json!(s.id())),
                (columns::DATE, json!(s.date().format("%Y-%m-%d %H:%M").to_string())),
                (columns::PRODUCT, json!(s.product_name())),
                (columns::QUANTITY, json!(s.quantity())),
                (columns::TOTAL_PRICE, json!(s.total_price())),
                (columns::EMPLOYEE, json!(s.employee())),
            ])
        })
        .collect()
}

pub fn calendar_rows(events: &[CalendarEvent]) -> Vec<Row> {
    events
        .iter()
        .map(|e| {
            row([
                (columns::DATE, json!(e.date)),
                (columns::TITLE, json!(e.title)),
                (columns::DESCRIPTION, json!(e.description)),
                (columns::KIND, json!(e.kind.label())),
            ])
        })
        .collect()
}

fn row<const N: usize>(cells: [(&str, Value); N]) -> Row {
    cells.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

fn rows_of(table: &Value) -> Result<Vec<Row>, SheetError> {
    let Value::Array(items) = table else {
        return Err(SheetError::NotATable);
    };
    items
        .iter()
        .map(|item| match item {
            Value::Object(r) => Ok(r.clone()),
            _ => Err(SheetError::NotATable),
        })
        .collect()
}

/// A cell that exists and is not blank.
fn present<'a>(r: &'a Row, column: &str) -> Option<&'a Value> {
    r.get(column).filter(|v| !v.is_null())
}

/// Non-empty text content of a cell; numbers are rendered as text.
fn text(cell: &Value) -> Option<String> {
    let s = match cell {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!s.is_empty()).then_some(s)
}

fn number(cell: &Value) -> Option<f64> {
    match cell {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn invalid(row: usize, column: &'static str, reason: String) -> SheetError {
    SheetError::InvalidCell { row, column, reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::{OrderItem, ProductDraft};
    use chrono::NaiveDate;

    fn product() -> Product {
        Product::create("prod-001", ProductDraft {
            name: "SURFAC 820 500ML".into(), barcode: None, category: Category::Disinfectants, stock: 2,
            purchase_price: Money::from_f64(10.0).unwrap(), sale_price: Money::from_f64(14.0).unwrap(),
            expiry_date: NaiveDate::from_ymd_opt(2023, 8, 5), image_url: None,
        })
        .unwrap()
    }

    #[test]
    fn catalog_export_columns() {
        let rows = catalog_rows(&[product()]);
        let keys: Vec<_> = rows[0].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["ID", "Código de Barras", "Producto", "Categoría", "Estado", "Stock", "Precio Compra", "Precio Venta", "Fecha de Vencimiento"]);
        assert_eq!(rows[0]["Código de Barras"], "N/A");
        assert_eq!(rows[0]["Estado"], "Bajo Stock (2)");
        assert_eq!(rows[0]["Fecha de Vencimiento"], "5/8/2023");
    }

    #[test]
    fn catalog_export_reimports_cleanly() {
        let table = Value::Array(catalog_rows(&[product()]).into_iter().map(Value::Object).collect());
        let parsed = parse_catalog_rows(&table).unwrap();
        assert_eq!(parsed[0].product_id.as_deref(), Some("prod-001"));
        assert_eq!(parsed[0].patch.barcode, Some(None));
        assert_eq!(parsed[0].patch.category, Some(Category::Disinfectants));
        assert_eq!(parsed[0].patch.expiry_date, Some(NaiveDate::from_ymd_opt(2023, 8, 5)));
    }

    #[test]
    fn catalog_import_reads_only_present_columns() {
        let table = json!([{ "ID": "prod-003", "Stock": 7, "Código de Barras": 7750123 }]);
        let parsed = parse_catalog_rows(&table).unwrap();
        let patch = &parsed[0].patch;
        assert_eq!(patch.stock, Some(7));
        assert_eq!(patch.barcode, Some(Barcode::parse("7750123")));
        assert_eq!(patch.name, None);
        assert_eq!(patch.purchase_price, None);
        assert_eq!(patch.expiry_date, None);
    }

    #[test]
    fn catalog_import_rejects_bad_cells() {
        assert_eq!(parse_catalog_rows(&json!({"ID": "x"})), Err(SheetError::NotATable));
        assert!(matches!(
            parse_catalog_rows(&json!([{ "ID": "prod-001", "Stock": -3 }])),
            Err(SheetError::InvalidCell { row: 1, column: "Stock", .. })
        ));
        assert!(matches!(
            parse_catalog_rows(&json!([{ "ID": "prod-001" }, { "ID": "prod-002", "Categoría": "Juguetes" }])),
            Err(SheetError::InvalidCell { row: 2, column: "Categoría", .. })
        ));
    }

    #[test]
    fn unreadable_expiry_keeps_existing() {
        let parsed = parse_catalog_rows(&json!([{ "ID": "prod-001", "Fecha de Vencimiento": "pronto" }])).unwrap();
        assert_eq!(parsed[0].patch.expiry_date, None);
        let parsed = parse_catalog_rows(&json!([{ "ID": "prod-001", "Fecha de Vencimiento": "N/A" }])).unwrap();
        assert_eq!(parsed[0].patch.expiry_date, Some(None));
    }

    #[test]
    fn order_template_layout() {
        let order = PurchaseOrder::create("ord-001", None, vec![
            OrderItem { product_id: "prod-001".into(), name: "A".into(), quantity: 2, purchase_price: Money::ZERO },
            OrderItem { product_id: "prod-002".into(), name: "B".into(), quantity: 5, purchase_price: Money::ZERO },
        ])
        .unwrap();
        let rows = order_template_rows(&order);
        let keys: Vec<_> = rows[0].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["ID Producto", "Producto", "Cantidad", "Precio Compra Unit.", "Subtotal"]);
        assert!(rows[0]["Precio Compra Unit."].is_null());
        assert_eq!(rows[0]["Subtotal"], "=C2*D2");
        assert_eq!(rows[1]["Subtotal"], "=C3*D3");
    }

    #[test]
    fn price_rows_keep_only_numeric_non_negative() {
        let rows = parse_price_rows(&json!([
            { "ID Producto": "prod-001", "Precio Compra Unit.": 4.5 },
            { "ID Producto": "prod-002", "Precio Compra Unit.": "4.5" },
            { "ID Producto": "prod-003", "Precio Compra Unit.": -1 },
            { "Producto": "sin id", "Precio Compra Unit.": 2 },
        ]))
        .unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].unit_price, Some(Money::from_f64(4.5).unwrap()));
        assert_eq!(rows[1].unit_price, None);
        assert_eq!(rows[2].unit_price, None);
    }
}
