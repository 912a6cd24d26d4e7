//! Domain logic for the lacquer inventory.
//!
//! Everything here is storage-agnostic: the catalog filter model, the query
//! compiler, the URL codec, the result assembler, and the contracts the
//! storage and image layers implement.

pub mod catalog;
pub mod error;
pub mod image;
pub mod polish;
pub mod rating;
pub mod types;
