//! DTOs returned by the JSON API.

pub mod search;
