//! El Amigo POS
//!
//! Point-of-sale and inventory ledger for a veterinary and pet-supply store.
//!
//! ## Features
//! - Product catalog with spreadsheet import/export
//! - Sales register
//! - Purchase orders with supplier price templates
//! - User directory and sessions
//! - Bank accounts and calendar
//! - Reorder suggestions from a generative model

pub mod api;
pub mod config;
pub mod domain;
pub mod publish;
pub mod repository;
pub mod seed;
pub mod services;
pub mod session;
pub mod sheet;
pub mod suggest;

use thiserror::Error;

use crate::domain::aggregates::{CartError, OrderError, ProductError, UserError};
use crate::session::SessionError;
use crate::sheet::SheetError;

pub use crate::services::Ledger;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("No product with barcode {0}")]
    BarcodeNotFound(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Bank account not found: {0}")]
    AccountNotFound(String),

    #[error("Calendar event not found: {0}")]
    EventNotFound(String),

    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Every cart line needs a product")]
    IncompleteCartLine,

    #[error("Product {0} is out of stock")]
    OutOfStock(String),

    #[error("Email already registered: {0}")]
    EmailTaken(String),

    #[error("The default administrator account is protected")]
    ProtectedAccount,

    #[error("Order is {from} and cannot become {to}")]
    InvalidTransition { from: &'static str, to: &'static str },

    #[error("Spreadsheet error: {0}")]
    Sheet(#[from] SheetError),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Order suggestion unavailable")]
    SuggestionUnavailable,

    #[error("Session storage error: {0}")]
    Session(#[from] SessionError),
}

impl From<ProductError> for LedgerError {
    fn from(e: ProductError) -> Self {
        LedgerError::InvalidInput(e.to_string())
    }
}

impl From<OrderError> for LedgerError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::NotPending(status) => LedgerError::InvalidTransition { from: status.label(), to: "Completado" },
            other => LedgerError::InvalidInput(other.to_string()),
        }
    }
}

impl From<CartError> for LedgerError {
    fn from(e: CartError) -> Self {
        match e {
            CartError::Empty => LedgerError::EmptyCart,
            CartError::IncompleteLine => LedgerError::IncompleteCartLine,
            CartError::OutOfStock(id) => LedgerError::OutOfStock(id),
            CartError::LineNotFound => LedgerError::InvalidInput("cart line not found".into()),
        }
    }
}

impl From<UserError> for LedgerError {
    fn from(_: UserError) -> Self {
        LedgerError::ProtectedAccount
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
