//! Aggregates module
pub mod product;
pub mod order;
pub mod cart;
pub mod sale;
pub mod user;
pub mod bank_account;
pub mod calendar_event;

pub use product::{CatalogPatch, Category, Product, ProductDraft, ProductError};
pub use order::{OrderError, OrderItem, OrderStatus, PurchaseOrder};
pub use cart::{Cart, CartError, CartLine, StockWarning};
pub use sale::Sale;
pub use user::{Role, User, UserError, DEFAULT_ADMIN_ID};
pub use bank_account::BankAccount;
pub use calendar_event::{CalendarEvent, EventKind};
