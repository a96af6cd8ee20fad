//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - Plain-struct DTOs for the writes its repository accepts

pub mod device_binding;
pub mod session;
pub mod user;
pub mod violation;
