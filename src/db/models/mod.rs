//! Database models split into domain-specific modules.

pub mod enrollment;
pub mod event;
pub mod hotel;
pub mod user;

pub use enrollment::*;
pub use event::*;
pub use hotel::*;
pub use user::*;
