use std::sync::RwLock;

use super::{Entity, Repository};

/// In-memory ordered store. Contents live for the life of the process.
#[derive(Debug)]
pub struct InMemoryRepository<T> {
    inner: RwLock<Vec<T>>,
}

impl<T> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Vec::new()),
        }
    }

    #[cfg(test)]
    pub fn with_items(items: Vec<T>) -> Self {
        Self {
            inner: RwLock::new(items),
        }
    }
}

impl<T> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> Repository<T> for InMemoryRepository<T> {
    fn list(&self) -> Vec<T> {
        match self.inner.read() {
            Ok(items) => items.clone(),
            Err(_) => vec![],
        }
    }

    fn get(&self, id: &str) -> Option<T> {
        let items = self.inner.read().ok()?;
        items.iter().find(|i| i.entity_id() == id).cloned()
    }

    fn count(&self) -> usize {
        self.inner.read().map(|items| items.len()).unwrap_or(0)
    }

    fn prepend(&self, item: T) {
        if let Ok(mut items) = self.inner.write() {
            items.insert(0, item);
        }
    }

    fn append(&self, item: T) {
        if let Ok(mut items) = self.inner.write() {
            items.push(item);
        }
    }

    fn replace(&self, item: T) -> bool {
        let Ok(mut items) = self.inner.write() else {
            return false;
        };
        match items.iter_mut().find(|i| i.entity_id() == item.entity_id()) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    fn remove(&self, id: &str) -> Option<T> {
        let mut items = self.inner.write().ok()?;
        let index = items.iter().position(|i| i.entity_id() == id)?;
        Some(items.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::BankAccount;

    fn account(id: &str) -> BankAccount {
        BankAccount::new(id, "Interbank", "El Amigo E.I.R.L.", "098-7654321000", None)
    }

    #[test]
    fn prepend_keeps_newest_first() {
        let repo = InMemoryRepository::new();
        repo.append(account("acc-1"));
        repo.prepend(account("acc-2"));
        let ids: Vec<_> = repo.list().into_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["acc-2", "acc-1"]);
        assert_eq!(repo.count(), 2);
    }

    #[test]
    fn replace_and_remove() {
        let repo = InMemoryRepository::with_items(vec![account("acc-1")]);
        let mut updated = account("acc-1");
        updated.bank_name = "BCP".into();
        assert!(repo.replace(updated));
        assert_eq!(repo.get("acc-1").unwrap().bank_name, "BCP");
        assert!(!repo.replace(account("acc-9")));
        assert!(repo.remove("acc-1").is_some());
        assert!(repo.remove("acc-1").is_none());
        assert!(!repo.contains("acc-1"));
    }
}
