//! Wire types exchanged with the Cat
//!
//! The service speaks snake_case JSON. Unknown response fields are ignored and
//! missing collections decode as empty.
pub mod admin;
pub mod memory;
pub mod message;
pub mod plugin;
pub mod settings;
