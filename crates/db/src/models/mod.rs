//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` DTOs for writes where the API accepts them

pub mod lookup;
pub mod polish;
