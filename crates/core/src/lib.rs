//! Devicegate domain core.
//!
//! Pure domain logic for the device security engine: fingerprint
//! derivation, violation taxonomy and severity policy, access decisions,
//! and shared types. No I/O -- everything here is callable from the
//! repository layer, the API layer, and tests alike.

pub mod access;
pub mod error;
pub mod fingerprint;
pub mod hashing;
pub mod roles;
pub mod types;
pub mod violation;
