//! Users and the signed-in session.

use super::Ledger;
use crate::domain::aggregates::{Role, User};
use crate::domain::events::{DomainEvent, UserEvent};
use crate::domain::value_objects::Email;
use crate::repository::sequential_id;
use crate::session::SESSION_KEY;
use crate::{LedgerError, Result};

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct UserEdit {
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl Ledger {
    /// Signs in when the email matches (any case) and the password matches exactly.
    /// A failed attempt leaves any existing session untouched.
    #[tracing::instrument(skip(self, password))]
    pub fn login(&self, email: &str, password: &str) -> Result<Option<User>> {
        let user = self
            .stores
            .users
            .list()
            .into_iter()
            .find(|u| u.email().matches(email) && self.verifier.verify(u, password));
        match &user {
            Some(u) => {
                self.sessions.set(SESSION_KEY, u.id())?;
                tracing::info!(user_id = %u.id(), "signed in");
            }
            None => tracing::warn!("rejected sign-in"),
        }
        Ok(user)
    }

    pub fn logout(&self) -> Result<()> {
        self.sessions.remove(SESSION_KEY)?;
        tracing::info!("signed out");
        Ok(())
    }

    /// The signed-in user, or `None` when nobody is, or the stored id no longer resolves.
    pub fn current_user(&self) -> Result<Option<User>> {
        let Some(id) = self.sessions.get(SESSION_KEY)? else {
            return Ok(None);
        };
        Ok(self.stores.users.get(&id))
    }

    pub fn users(&self) -> Vec<User> {
        self.stores.users.list()
    }

    #[tracing::instrument(skip(self, new), fields(email = %new.email))]
    pub async fn create_user(&self, new: NewUser) -> Result<User> {
        let _guard = self.write.lock().await;
        self.ensure_email_free(&new.email, None)?;
        let users = &self.stores.users;
        let id = sequential_id("user", users.count(), |id| users.contains(id));
        let mut user = User::new(id, new.name.trim(), Email::new(new.email), new.role, new.password);
        let events = user.take_events();
        users.append(user.clone());
        tracing::info!(user_id = %user.id(), "user created");
        self.publish(events).await;
        Ok(user)
    }

    #[tracing::instrument(skip(self, edit))]
    pub async fn update_user(&self, user_id: &str, edit: UserEdit) -> Result<User> {
        let _guard = self.write.lock().await;
        let mut user = self.stores.users.get(user_id).ok_or_else(|| LedgerError::UserNotFound(user_id.to_string()))?;
        self.ensure_email_free(&edit.email, Some(user_id))?;
        user.edit(edit.name.trim(), Email::new(edit.email), edit.role)?;
        let events = user.take_events();
        self.stores.users.replace(user.clone());
        tracing::info!("user updated");
        self.publish(events).await;
        Ok(user)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_user(&self, user_id: &str) -> Result<()> {
        let _guard = self.write.lock().await;
        let user = self.stores.users.get(user_id).ok_or_else(|| LedgerError::UserNotFound(user_id.to_string()))?;
        user.ensure_deletable()?;
        self.stores.users.remove(user_id);
        tracing::info!("user deleted");
        self.publish(vec![DomainEvent::User(UserEvent::Deleted { user_id: user_id.to_string() })]).await;
        Ok(())
    }

    fn ensure_email_free(&self, email: &str, except: Option<&str>) -> Result<()> {
        let taken = self
            .stores
            .users
            .list()
            .iter()
            .any(|u| Some(u.id()) != except && u.email().matches(email));
        if taken {
            return Err(LedgerError::EmailTaken(email.trim().to_string()));
        }
        Ok(())
    }
}
