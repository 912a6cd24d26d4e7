//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! `&PgPool` as the first argument.

pub mod catalog_repo;
pub mod lookup_repo;
pub mod polish_repo;

pub use catalog_repo::CatalogRepo;
pub use lookup_repo::LookupRepo;
pub use polish_repo::PolishRepo;
