use serde::Serialize;

use crate::domain::course::Course;
use crate::pagination::Paginated;

/// Body of `GET /api/search`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// Total number of courses matching the filters.
    pub total: usize,
    /// Courses of the requested page, in engine order.
    pub courses: Vec<Course>,
    pub page: usize,
    pub size: usize,
    pub total_pages: usize,
}

impl From<Paginated<Course>> for SearchResponse {
    fn from(page: Paginated<Course>) -> Self {
        Self {
            total: page.total,
            courses: page.items,
            page: page.page,
            size: page.size,
            total_pages: page.total_pages,
        }
    }
}

/// Body returned with every 4xx/5xx response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
