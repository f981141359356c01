use std::future::Future;

use crate::{
    domain::{
        course::Course,
        query::{EngineQuery, SortDirective},
        search::SortOrder,
    },
    repository::errors::RepositoryResult,
};

#[cfg(feature = "server")]
pub mod elasticsearch;
pub mod errors;
pub mod memory;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Pagination {
    /// Number of hits to skip, or `None` when it does not fit in `usize`.
    pub fn offset(&self) -> Option<usize> {
        self.page.checked_mul(self.per_page)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CourseSearchQuery {
    pub query: EngineQuery,
    pub sort: SortDirective,
    pub pagination: Option<Pagination>,
}

impl CourseSearchQuery {
    pub fn new(query: EngineQuery) -> Self {
        Self {
            query,
            sort: SortOrder::Upcoming.directive(),
            pagination: None,
        }
    }

    pub fn sort(mut self, sort: SortDirective) -> Self {
        self.sort = sort;
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

/// Read side of the search engine.
pub trait CourseReader {
    /// Executes the query and returns the total match count with the requested page of hits.
    fn search_courses(
        &self,
        query: &CourseSearchQuery,
    ) -> impl Future<Output = RepositoryResult<(usize, Vec<Course>)>> + Send;

    /// Returns up to `limit` courses whose title has a term starting with `prefix`.
    fn suggest_courses(
        &self,
        prefix: &str,
        limit: usize,
    ) -> impl Future<Output = RepositoryResult<Vec<Course>>> + Send;
}

/// Write side of the search engine, used by index seeding.
pub trait CourseWriter {
    fn delete_all(&self) -> impl Future<Output = RepositoryResult<()>> + Send;

    fn bulk_index(&self, courses: &[Course]) -> impl Future<Output = RepositoryResult<usize>> + Send;
}
