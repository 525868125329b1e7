//! In-memory user directory store
//!
//! Concurrent chip -> user map with case-insensitive uniqueness indexes on
//! alias and email. Registrations are serialized by a single mutex so two
//! racing registrations can never both claim the same alias, email, or chip.

use dashmap::DashMap;
use std::sync::{Mutex, RwLock};
use tracing::info;

use super::{NewUser, Role, User};
use crate::types::{FloorError, Result};

/// Uniqueness field accepted by the advisory pre-check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Alias,
    Email,
}

impl UniqueField {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "alias" => Some(UniqueField::Alias),
            "email" => Some(UniqueField::Email),
            _ => None,
        }
    }
}

/// User directory with concurrent access
pub struct UserDirectory {
    /// chip ID -> user
    users: DashMap<String, User>,
    /// lowercased alias -> chip ID
    aliases: DashMap<String, String>,
    /// lowercased email -> chip ID
    emails: DashMap<String, String>,
    /// Chip IDs in registration order, for ordered search and aggregation
    order: RwLock<Vec<String>>,
    /// Serializes register() so the three maps stay consistent under races
    register_lock: Mutex<()>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            aliases: DashMap::new(),
            emails: DashMap::new(),
            order: RwLock::new(Vec::new()),
            register_lock: Mutex::new(()),
        }
    }

    /// Register a new user, binding their chip.
    ///
    /// A chip already bound to a user is rejected with a conflict; so is a
    /// taken alias or email. Re-registering a chip is an error rather than
    /// an overwrite or a silent second row.
    pub fn register(&self, new_user: NewUser) -> Result<User> {
        if new_user.chip_id.trim().is_empty() {
            return Err(FloorError::InvalidRequest("chipId is required".into()));
        }
        if new_user.alias.trim().is_empty() {
            return Err(FloorError::InvalidRequest("alias is required".into()));
        }
        if new_user.full_name.trim().is_empty() {
            return Err(FloorError::InvalidRequest("fullName is required".into()));
        }
        if new_user.email.trim().is_empty() || !new_user.email.contains('@') {
            return Err(FloorError::InvalidRequest("a valid email is required".into()));
        }

        let _guard = self.register_lock.lock().expect("register lock poisoned");

        if self.users.contains_key(&new_user.chip_id) {
            return Err(FloorError::Conflict(format!(
                "chip {} is already registered",
                new_user.chip_id
            )));
        }

        let alias_key = new_user.alias.trim().to_lowercase();
        if self.aliases.contains_key(&alias_key) {
            return Err(FloorError::Conflict(format!(
                "alias '{}' is taken",
                new_user.alias.trim()
            )));
        }

        let email_key = new_user.email.trim().to_lowercase();
        if self.emails.contains_key(&email_key) {
            return Err(FloorError::Conflict(format!(
                "email '{}' is already registered",
                new_user.email.trim()
            )));
        }

        let user = new_user.into_user(chrono::Utc::now());
        let chip_id = user.chip_id.clone();

        self.aliases.insert(alias_key, chip_id.clone());
        self.emails.insert(email_key, chip_id.clone());
        self.users.insert(chip_id.clone(), user.clone());
        self.order
            .write()
            .expect("order lock poisoned")
            .push(chip_id.clone());

        info!(chip = %chip_id, alias = %user.alias, "Registered new dancer");
        Ok(user)
    }

    /// Look up a user by chip ID
    pub fn get(&self, chip_id: &str) -> Option<User> {
        self.users.get(chip_id).map(|u| u.clone())
    }

    /// Whether a chip is bound to a registered user
    pub fn is_registered(&self, chip_id: &str) -> bool {
        self.users.contains_key(chip_id)
    }

    /// Display alias for a chip, if registered
    pub fn alias_of(&self, chip_id: &str) -> Option<String> {
        self.users.get(chip_id).map(|u| u.alias.clone())
    }

    /// Role of a chip's user, if registered
    pub fn role_of(&self, chip_id: &str) -> Option<Role> {
        self.users.get(chip_id).map(|u| u.role)
    }

    /// Case-insensitive existence check for alias or email
    pub fn exists(&self, field: UniqueField, value: &str) -> bool {
        let key = value.trim().to_lowercase();
        match field {
            UniqueField::Alias => self.aliases.contains_key(&key),
            UniqueField::Email => self.emails.contains_key(&key),
        }
    }

    /// Total registered users
    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Count of users with the Leader role
    pub fn leader_count(&self) -> usize {
        self.users
            .iter()
            .filter(|u| u.role == Role::Leader)
            .count()
    }

    /// Case-insensitive substring search on alias and full name.
    ///
    /// Returns the first match in registration order.
    pub fn search(&self, query: &str) -> Option<User> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        let order = self.order.read().expect("order lock poisoned");
        for chip_id in order.iter() {
            if let Some(user) = self.users.get(chip_id) {
                if user.alias.to_lowercase().contains(&needle)
                    || user.full_name.to_lowercase().contains(&needle)
                {
                    return Some(user.clone());
                }
            }
        }
        None
    }
}

impl Default for UserDirectory {
    fn default() -> Self {
        Self::new()
    }
}
