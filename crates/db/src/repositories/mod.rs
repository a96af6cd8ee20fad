//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod device_binding_repo;
pub mod role_repo;
pub mod session_repo;
pub mod user_repo;
pub mod violation_repo;

pub use device_binding_repo::DeviceBindingRepo;
pub use role_repo::RoleRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
pub use violation_repo::ViolationRepo;
