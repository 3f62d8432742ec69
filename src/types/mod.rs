//! Gateway Types
//!
//! Request, profile and identity-record types shared across the gateway.

pub mod exchange;
pub mod profile;
pub mod user;

pub use exchange::*;
pub use profile::*;
pub use user::*;
