//! Domain types shared by the search core and the HTTP layer.

pub mod course;
pub mod query;
pub mod search;
pub mod types;
