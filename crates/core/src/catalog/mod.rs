//! Catalog browsing: filter state, query compilation, URL codec and result
//! assembly.
//!
//! ```text
//! URL params --url::decode--> FilterState --query::compile--> QueryDescriptor
//!                                                                  |
//!                                                           storage executes
//!                                                                  |
//! CatalogPage <--assemble::assemble-- rows + distinct count <------+
//! ```

pub mod assemble;
pub mod filter;
pub mod matcher;
pub mod query;
pub mod url;

pub use assemble::{assemble, CatalogPage, CatalogRow, PolishView};
pub use filter::{CatalogSort, Facet, FilterState, ImagePresence, SortDirection, SortField};
pub use query::{compile, PageSize, Predicate, QueryDescriptor};
pub use url::{decode, encode};
