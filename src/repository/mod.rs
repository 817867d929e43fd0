//! Storage seam for the ledger's collections.
//!
//! Every collection is an ordered list: the register and the order ledger show
//! most-recent-first, so backends must preserve insertion position rather than
//! key order.

mod memory;

pub use memory::InMemoryRepository;

use std::sync::Arc;

use crate::domain::aggregates::{BankAccount, CalendarEvent, Product, PurchaseOrder, Sale, User};

/// Anything stored in a repository is addressed by a string id.
pub trait Entity: Clone + Send + Sync + 'static {
    fn entity_id(&self) -> &str;
}

/// Ordered collection of entities.
pub trait Repository<T: Entity>: Send + Sync {
    fn list(&self) -> Vec<T>;
    fn get(&self, id: &str) -> Option<T>;
    fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }
    fn count(&self) -> usize;
    /// Insert at the front (newest first).
    fn prepend(&self, item: T);
    fn append(&self, item: T);
    /// Replace the entity with the same id in place. Returns `false` when absent.
    fn replace(&self, item: T) -> bool;
    fn remove(&self, id: &str) -> Option<T>;
}

impl<T, S> Repository<T> for Arc<S>
where
    T: Entity,
    S: Repository<T> + ?Sized,
{
    fn list(&self) -> Vec<T> {
        (**self).list()
    }

    fn get(&self, id: &str) -> Option<T> {
        (**self).get(id)
    }

    fn count(&self) -> usize {
        (**self).count()
    }

    fn prepend(&self, item: T) {
        (**self).prepend(item)
    }

    fn append(&self, item: T) {
        (**self).append(item)
    }

    fn replace(&self, item: T) -> bool {
        (**self).replace(item)
    }

    fn remove(&self, id: &str) -> Option<T> {
        (**self).remove(id)
    }
}

macro_rules! impl_entity {
    ($($t:ty => $field:ident),* $(,)?) => {
        $(impl Entity for $t {
            fn entity_id(&self) -> &str {
                self.$field()
            }
        })*
    };
}

impl_entity!(Product => id, PurchaseOrder => id, Sale => id, User => id);

impl Entity for BankAccount {
    fn entity_id(&self) -> &str {
        &self.id
    }
}

impl Entity for CalendarEvent {
    fn entity_id(&self) -> &str {
        &self.id
    }
}

/// The full set of collections the ledger works against.
#[derive(Clone)]
pub struct Stores {
    pub products: Arc<dyn Repository<Product>>,
    pub sales: Arc<dyn Repository<Sale>>,
    pub orders: Arc<dyn Repository<PurchaseOrder>>,
    pub users: Arc<dyn Repository<User>>,
    pub bank_accounts: Arc<dyn Repository<BankAccount>>,
    pub calendar: Arc<dyn Repository<CalendarEvent>>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            products: Arc::new(InMemoryRepository::new()),
            sales: Arc::new(InMemoryRepository::new()),
            orders: Arc::new(InMemoryRepository::new()),
            users: Arc::new(InMemoryRepository::new()),
            bank_accounts: Arc::new(InMemoryRepository::new()),
            calendar: Arc::new(InMemoryRepository::new()),
        }
    }
}

impl Default for Stores {
    fn default() -> Self {
        Self::in_memory()
    }
}

/// First `{prefix}-{nnn}` id at or after `count + 1` that `taken` does not report.
pub fn sequential_id(prefix: &str, count: usize, taken: impl Fn(&str) -> bool) -> String {
    let mut n = count + 1;
    loop {
        let id = format!("{prefix}-{n:03}");
        if !taken(&id) {
            return id;
        }
        n += 1;
    }
}
