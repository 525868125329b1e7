//! User directory
//!
//! Maps NFC chip IDs to registered attendees. Registration binds a chip to
//! exactly one user; a chip is never reassigned and users are never deleted.
//! Alias and email uniqueness is enforced authoritatively here - the
//! advisory `/api/unique` pre-check is a UX convenience, not the gate.

pub mod store;

pub use store::{UniqueField, UserDirectory};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Dance role of an attendee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Leader,
    Follower,
}

/// A registered attendee, keyed by chip ID
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Opaque chip identifier from the NFC tag URL payload
    pub chip_id: String,
    /// Opaque recovery secret handed to the client at registration
    pub user_key: String,
    /// Unique display name
    pub alias: String,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    /// Instagram handle without the leading '@'
    #[serde(default)]
    pub ig_handle: String,
    pub consent: bool,
    pub created_at: DateTime<Utc>,
}

/// Registration payload accepted from the client
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub chip_id: String,
    pub user_key: String,
    pub alias: String,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub ig_handle: String,
    pub consent: bool,
}

impl NewUser {
    /// Build the stored user record, stamping the registration time
    pub fn into_user(self, now: DateTime<Utc>) -> User {
        User {
            chip_id: self.chip_id,
            user_key: self.user_key,
            alias: self.alias,
            full_name: self.full_name,
            email: self.email,
            role: self.role,
            ig_handle: self.ig_handle.trim_start_matches('@').to_string(),
            consent: self.consent,
            created_at: now,
        }
    }
}
