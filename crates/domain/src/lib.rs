//! Surgical Quote Domain Models

/// Quote aggregate
pub mod quotes;

/// Medical team, material, procedure and supplier registries
pub mod catalog;

/// Dashboard counters
pub mod dashboards;

/// Caller identity
pub mod session;

/// Field validation schemas
pub mod validation;

/// Environment configuration
pub mod config;

/// Domain errors
pub mod errors;

/// Domain events wrapper
pub mod event;

pub use errors::Error;
pub use event::DomainEvent;
pub use session::Session;
