//! Business rules on top of the credential store and the cache: sign-in and
//! session issuance, event metadata, and entitlement-gated hotel browsing.

pub mod auth;
pub mod error;
pub mod events;
pub mod hotels;

pub use error::ServiceError;
