//! Product Aggregate

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use crate::domain::value_objects::{Barcode, Money, Quantity};
use crate::domain::events::{DomainEvent, ProductEvent};

pub const DEFAULT_IMAGE_URL: &str = "https://placehold.co/100x100.png";
/// Products below this stock level are flagged as low stock.
pub const LOW_STOCK_THRESHOLD: u32 = 5;
pub const EXPIRY_WARNING_DAYS: i64 = 30;
pub const MIN_NAME_LEN: usize = 3;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    id: String,
    barcode: Option<Barcode>,
    name: String,
    category: Category,
    stock: Quantity,
    purchase_price: Money,
    sale_price: Money,
    image_url: String,
    sales_history: BTreeMap<String, u32>,
    expiry_date: Option<NaiveDate>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Desinfectantes")] Disinfectants,
    #[serde(rename = "Probióticos")] Probiotics,
    #[serde(rename = "Antiparasitarios")] Antiparasitics,
    #[serde(rename = "Accesorios para mascotas")] PetAccessories,
    #[serde(rename = "Fertilizantes")] Fertilizers,
    #[serde(rename = "Vitaminas")] Vitamins,
    #[serde(rename = "Medicamentos")] Medicines,
    #[serde(rename = "Equipos")] Equipment,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Disinfectants, Category::Probiotics, Category::Antiparasitics, Category::PetAccessories,
        Category::Fertilizers, Category::Vitamins, Category::Medicines, Category::Equipment,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Disinfectants => "Desinfectantes",
            Category::Probiotics => "Probióticos",
            Category::Antiparasitics => "Antiparasitarios",
            Category::PetAccessories => "Accesorios para mascotas",
            Category::Fertilizers => "Fertilizantes",
            Category::Vitamins => "Vitaminas",
            Category::Medicines => "Medicamentos",
            Category::Equipment => "Equipos",
        }
    }

    /// Case-insensitive lookup by display label.
    pub fn from_label(label: &str) -> Option<Category> {
        let label = label.trim().to_lowercase();
        Self::ALL.into_iter().find(|c| c.label().to_lowercase() == label)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

/// Fields supplied by the catalog create and edit forms.
#[derive(Clone, Debug)]
pub struct ProductDraft {
    pub name: String,
    pub barcode: Option<Barcode>,
    pub category: Category,
    pub stock: u32,
    pub purchase_price: Money,
    pub sale_price: Money,
    pub expiry_date: Option<NaiveDate>,
    pub image_url: Option<String>,
}

/// Column-wise overwrite from a catalog import row. `None` leaves a field alone;
/// the nested options on barcode and expiry date distinguish "clear" from "keep".
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CatalogPatch {
    pub name: Option<String>,
    pub barcode: Option<Option<Barcode>>,
    pub category: Option<Category>,
    pub stock: Option<u32>,
    pub purchase_price: Option<Money>,
    pub sale_price: Option<Money>,
    pub expiry_date: Option<Option<NaiveDate>>,
}

impl Product {
    pub fn create(id: impl Into<String>, draft: ProductDraft) -> Result<Self, ProductError> {
        Self::check_name(&draft.name)?;
        let id = id.into();
        let mut product = Self {
            id: id.clone(), barcode: draft.barcode, name: draft.name.trim().to_string(), category: draft.category,
            stock: Quantity::new(draft.stock), purchase_price: draft.purchase_price, sale_price: draft.sale_price,
            image_url: draft.image_url.unwrap_or_else(|| DEFAULT_IMAGE_URL.to_string()),
            sales_history: BTreeMap::new(), expiry_date: draft.expiry_date, events: vec![],
        };
        product.raise_event(DomainEvent::Product(ProductEvent::Created { product_id: id, name: product.name.clone() }));
        Ok(product)
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn barcode(&self) -> Option<&Barcode> { self.barcode.as_ref() }
    pub fn name(&self) -> &str { &self.name }
    pub fn category(&self) -> Category { self.category }
    pub fn stock(&self) -> u32 { self.stock.value() }
    pub fn purchase_price(&self) -> Money { self.purchase_price }
    pub fn sale_price(&self) -> Money { self.sale_price }
    pub fn image_url(&self) -> &str { &self.image_url }
    pub fn sales_history(&self) -> &BTreeMap<String, u32> { &self.sales_history }
    pub fn expiry_date(&self) -> Option<NaiveDate> { self.expiry_date }
    pub fn is_in_stock(&self) -> bool { !self.stock.is_zero() }
    pub fn is_low_stock(&self) -> bool { self.stock.value() < LOW_STOCK_THRESHOLD }

    pub fn is_expiring_soon(&self, today: NaiveDate) -> bool {
        self.expiry_date.is_some_and(|d| d < today + Duration::days(EXPIRY_WARNING_DAYS))
    }

    /// Replaces every editable field, image included.
    pub fn update(&mut self, draft: ProductDraft) -> Result<(), ProductError> {
        Self::check_name(&draft.name)?;
        self.name = draft.name.trim().to_string();
        self.barcode = draft.barcode;
        self.category = draft.category;
        self.stock = Quantity::new(draft.stock);
        self.purchase_price = draft.purchase_price;
        self.sale_price = draft.sale_price;
        self.expiry_date = draft.expiry_date;
        self.image_url = draft.image_url.unwrap_or_else(|| DEFAULT_IMAGE_URL.to_string());
        self.raise_event(DomainEvent::Product(ProductEvent::Updated { product_id: self.id.clone() }));
        Ok(())
    }

    pub fn apply_patch(&mut self, patch: &CatalogPatch) {
        if let Some(name) = &patch.name { self.name = name.clone(); }
        if let Some(barcode) = &patch.barcode { self.barcode = barcode.clone(); }
        if let Some(category) = patch.category { self.category = category; }
        if let Some(stock) = patch.stock { self.stock = Quantity::new(stock); }
        if let Some(price) = patch.purchase_price { self.purchase_price = price; }
        if let Some(price) = patch.sale_price { self.sale_price = price; }
        if let Some(expiry) = patch.expiry_date { self.expiry_date = expiry; }
    }

    /// Goods arrived from a supplier at `unit_price` each.
    pub fn receive_stock(&mut self, qty: u32, unit_price: Money) {
        self.stock = self.stock.add(qty);
        self.purchase_price = unit_price;
        self.raise_event(DomainEvent::Product(ProductEvent::StockReceived {
            product_id: self.id.clone(), quantity: qty, purchase_price: unit_price,
        }));
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }

    fn check_name(name: &str) -> Result<(), ProductError> {
        if name.trim().chars().count() < MIN_NAME_LEN { return Err(ProductError::NameTooShort); }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum ProductError { NameTooShort }
impl std::error::Error for ProductError {}
impl fmt::Display for ProductError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self { Self::NameTooShort => write!(f, "product name must have at least {MIN_NAME_LEN} characters") }
    }
}
