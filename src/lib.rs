//! Floorpulse - NFC tap dance tracker backend
//!
//! Attendees at a social dance carry NFC chips. Tapping a chip against a
//! phone opens the web client, which talks to this service: registration
//! binds a chip to a user, and two mutual taps within the handshake window
//! reconcile into one confirmed dance.
//!
//! ## Services
//!
//! - **Directory**: chip -> user registry with alias/email uniqueness
//! - **Dance log**: append-only interaction log and the tap reconciler
//! - **Feedback**: survey template and per-user answers
//! - **Stats**: per-dancer highlights and the organizer dashboard

pub mod config;
pub mod dance;
pub mod directory;
pub mod feedback;
pub mod routes;
pub mod server;
pub mod stats;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{FloorError, Result};
