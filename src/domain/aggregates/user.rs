//! User directory entry

use serde::{Deserialize, Serialize};
use crate::domain::value_objects::Email;
use crate::domain::events::{DomainEvent, UserEvent};

/// Id of the built-in administrator. Its email and role are fixed and it
/// cannot be removed from the directory.
pub const DEFAULT_ADMIN_ID: &str = "user-admin";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role { Admin, #[serde(rename = "Empleado")] Employee }

#[derive(Clone, Debug, Serialize)]
pub struct User {
    id: String,
    name: String,
    email: Email,
    role: Role,
    #[serde(skip_serializing)]
    password: String,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: Email, role: Role, password: impl Into<String>) -> Self {
        let id = id.into();
        Self { id: id.clone(), name: name.into(), email, role, password: password.into(), events: vec![DomainEvent::User(UserEvent::Created { user_id: id })] }
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn name(&self) -> &str { &self.name }
    pub fn email(&self) -> &Email { &self.email }
    pub fn role(&self) -> Role { self.role }
    pub fn password(&self) -> &str { &self.password }
    pub fn is_admin(&self) -> bool { self.role == Role::Admin }
    pub fn is_default_admin(&self) -> bool { self.id == DEFAULT_ADMIN_ID }

    pub fn edit(&mut self, name: impl Into<String>, email: Email, role: Role) -> Result<(), UserError> {
        if self.is_default_admin() && (email.as_str() != self.email.as_str() || role != self.role) {
            return Err(UserError::Protected);
        }
        self.name = name.into();
        self.email = email;
        self.role = role;
        self.events.push(DomainEvent::User(UserEvent::Updated { user_id: self.id.clone() }));
        Ok(())
    }

    pub fn ensure_deletable(&self) -> Result<(), UserError> {
        if self.is_default_admin() { return Err(UserError::Protected); }
        Ok(())
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum UserError { Protected }
impl std::error::Error for UserError {}
impl std::fmt::Display for UserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "The default administrator account is protected") }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> User { User::new(DEFAULT_ADMIN_ID, "Diana", Email::new("diana@admin.com"), Role::Admin, "secret1") }

    #[test]
    fn test_default_admin_locked_fields() {
        let mut u = admin();
        assert_eq!(u.edit("Diana", Email::new("other@admin.com"), Role::Admin), Err(UserError::Protected));
        assert_eq!(u.edit("Diana", Email::new("diana@admin.com"), Role::Employee), Err(UserError::Protected));
        assert_eq!(u.email().as_str(), "diana@admin.com");
        assert_eq!(u.role(), Role::Admin);
        assert_eq!(u.edit("Diana", Email::new("DIANA@ADMIN.COM"), Role::Admin), Err(UserError::Protected));
        assert_eq!(u.email().as_str(), "diana@admin.com");
        u.edit("Diana P.", Email::new("diana@admin.com"), Role::Admin).unwrap();
        assert_eq!(u.name(), "Diana P.");
        assert_eq!(u.ensure_deletable(), Err(UserError::Protected));
    }
    #[test]
    fn test_password_not_serialized() {
        let v = serde_json::to_value(admin()).unwrap();
        assert!(v.get("password").is_none());
        assert_eq!(v["role"], "Admin");
        let e = User::new("user-001", "Donato", Email::new("donato@gmail.com"), Role::Employee, "123456");
        assert_eq!(serde_json::to_value(e).unwrap()["role"], "Empleado");
    }
}
