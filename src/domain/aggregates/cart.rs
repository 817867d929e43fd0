//! Cart Aggregate
//!
//! The register's working cart. Lines carry a snapshot of the product taken
//! when it was selected; quantities are kept within `[1, stock]`.

use serde::Serialize;
use uuid::Uuid;
use crate::domain::aggregates::product::Product;
use crate::domain::value_objects::Money;

#[derive(Clone, Debug, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CartLine {
    pub id: String,
    pub product_id: Option<String>,
    pub name: String,
    pub image_url: String,
    pub quantity: u32,
    pub price: Money,
    pub stock: u32,
}

impl CartLine {
    pub fn line_total(&self) -> Money { self.price.multiply(self.quantity) }
}

/// Raised instead of an error when a requested quantity exceeds the stock on hand.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockWarning {
    pub product_id: String,
    pub product_name: String,
    pub requested: u32,
    pub available: u32,
}

impl std::fmt::Display for StockWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} solo tiene {} unidades en stock.", self.product_name, self.available)
    }
}

impl Cart {
    pub fn new() -> Self { Self::default() }

    pub fn lines(&self) -> &[CartLine] { &self.lines }
    pub fn is_empty(&self) -> bool { self.lines.is_empty() }
    pub fn total(&self) -> Money { self.lines.iter().map(CartLine::line_total).sum() }

    /// Adds a line with no product chosen yet and returns its id.
    pub fn add_blank_line(&mut self) -> String {
        let id = Uuid::new_v4().to_string();
        self.lines.push(CartLine { id: id.clone(), product_id: None, name: String::new(), image_url: String::new(), quantity: 1, price: Money::ZERO, stock: 0 });
        id
    }

    /// Points an existing line at `product`, resetting its quantity to 1.
    pub fn select_product(&mut self, line_id: &str, product: &Product) -> Result<(), CartError> {
        if !product.is_in_stock() { return Err(CartError::OutOfStock(product.id().to_string())); }
        let line = self.lines.iter_mut().find(|l| l.id == line_id).ok_or(CartError::LineNotFound)?;
        *line = CartLine {
            id: line.id.clone(), product_id: Some(product.id().to_string()), name: product.name().to_string(),
            image_url: product.image_url().to_string(), quantity: 1, price: product.sale_price(), stock: product.stock(),
        };
        Ok(())
    }

    /// Scanner path: increments the product's line if present, otherwise adds one.
    pub fn add_product(&mut self, product: &Product) -> Result<Option<StockWarning>, CartError> {
        if let Some(line) = self.lines.iter().find(|l| l.product_id.as_deref() == Some(product.id())) {
            let (id, next) = (line.id.clone(), i64::from(line.quantity) + 1);
            return self.set_quantity(&id, next);
        }
        let id = self.add_blank_line();
        if let Err(e) = self.select_product(&id, product) {
            self.lines.retain(|l| l.id != id);
            return Err(e);
        }
        Ok(None)
    }

    /// Sets a line's quantity, clamping into `[1, stock]`. Over-stock requests are
    /// clamped to the stock on hand and reported through the returned warning.
    pub fn set_quantity(&mut self, line_id: &str, requested: i64) -> Result<Option<StockWarning>, CartError> {
        let line = self.lines.iter_mut().find(|l| l.id == line_id).ok_or(CartError::LineNotFound)?;
        let mut warning = None;
        if requested > i64::from(line.stock) {
            warning = Some(StockWarning {
                product_id: line.product_id.clone().unwrap_or_default(), product_name: line.name.clone(),
                requested: u32::try_from(requested).unwrap_or(u32::MAX), available: line.stock,
            });
            line.quantity = line.stock;
        } else {
            line.quantity = u32::try_from(requested.max(1)).unwrap_or(1);
        }
        Ok(warning)
    }

    /// Lines ready to be recorded as sales.
    pub fn checkout_lines(&self) -> Result<&[CartLine], CartError> {
        if self.lines.is_empty() { return Err(CartError::Empty); }
        if self.lines.iter().any(|l| l.product_id.is_none()) { return Err(CartError::IncompleteLine); }
        Ok(&self.lines)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum CartError { LineNotFound, OutOfStock(String), Empty, IncompleteLine }
impl std::error::Error for CartError {}
impl std::fmt::Display for CartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LineNotFound => write!(f, "Cart line not found"),
            Self::OutOfStock(id) => write!(f, "Product {id} is out of stock"),
            Self::Empty => write!(f, "Cart is empty"),
            Self::IncompleteLine => write!(f, "Cart has a line without a product"),
        }
    }
}
