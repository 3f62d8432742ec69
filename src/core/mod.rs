//! Gateway Core Components
//!
//! Outbound HTTP plumbing shared by the exchange proxy, profile adapters and
//! identity platform clients.

pub mod form;
pub mod transport;

pub use form::*;
pub use transport::*;
