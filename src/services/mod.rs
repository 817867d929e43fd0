//! The retail ledger.
//!
//! `Ledger` owns the collections and keeps them consistent as sales are rung
//! up, orders placed and completed, and the catalog edited. Each component
//! lives in its own file as an `impl Ledger` block.
//!
//! Multi-step mutations (order completion, checkout, imports) run under a
//! single write lock so one aggregate change is never interleaved with another.

mod banking;
mod calendar;
mod catalog;
mod directory;
mod orders;
mod reports;
mod sales;

pub use banking::BankAccountDraft;
pub use calendar::CalendarEventDraft;
pub use catalog::{CatalogFilter, ImportSummary};
pub use directory::{NewUser, UserEdit};
pub use orders::CompletionSummary;
pub use reports::{Dashboard, DateRange, FinancialSummary, TopProduct, WeeklySales};
pub use sales::{CartRequestLine, CartPreview, PaymentMethod, Receipt};

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::events::DomainEvent;
use crate::publish::{EventSink, NullEventSink};
use crate::repository::Stores;
use crate::session::{CredentialVerifier, InMemorySessionStore, PlaintextVerifier, SessionStore};

pub struct Ledger {
    stores: Stores,
    sessions: Arc<dyn SessionStore>,
    verifier: Arc<dyn CredentialVerifier>,
    events: Arc<dyn EventSink>,
    write: Mutex<()>,
}

impl Ledger {
    pub fn new(stores: Stores) -> Self {
        Self {
            stores,
            sessions: Arc::new(InMemorySessionStore::new()),
            verifier: Arc::new(PlaintextVerifier),
            events: Arc::new(NullEventSink),
            write: Mutex::new(()),
        }
    }

    pub fn with_sessions(mut self, sessions: Arc<dyn SessionStore>) -> Self {
        self.sessions = sessions;
        self
    }

    pub fn with_verifier(mut self, verifier: Arc<dyn CredentialVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    async fn publish(&self, events: Vec<DomainEvent>) {
        for event in events {
            if let Err(e) = self.events.publish(&event).await {
                tracing::warn!(subject = %event.subject(), error = %e, "failed to publish domain event");
            }
        }
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(Stores::in_memory())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::domain::aggregates::{Category, Product, ProductDraft};
    use crate::domain::value_objects::{Barcode, Money};

    pub fn draft(name: &str, stock: u32, purchase: f64, sale: f64) -> ProductDraft {
        ProductDraft {
            name: name.into(),
            barcode: None,
            category: Category::Medicines,
            stock,
            purchase_price: Money::from_f64(purchase).unwrap(),
            sale_price: Money::from_f64(sale).unwrap(),
            expiry_date: None,
            image_url: None,
        }
    }

    pub fn with_barcode(mut draft: ProductDraft, code: &str) -> ProductDraft {
        draft.barcode = Barcode::parse(code);
        draft
    }

    pub async fn stocked(ledger: &super::Ledger, name: &str, stock: u32) -> Product {
        ledger.create_product(draft(name, stock, 5.0, 8.0)).await.unwrap()
    }
}
