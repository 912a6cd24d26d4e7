pub mod catalog;
pub mod image;
pub mod lookup;
pub mod polish;
