use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("page size must be greater than zero")]
    ZeroPageSize,
}

/// One page of engine hits plus the numbers needed to navigate the rest.
#[derive(Debug)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    /// Matches across all pages.
    pub total: usize,
    /// Zero-based page index.
    pub page: usize,
    pub size: usize,
    pub total_pages: usize,
}

impl<T> Paginated<T> {
    pub fn new(
        items: Vec<T>,
        total: usize,
        page: usize,
        size: usize,
    ) -> Result<Self, PaginationError> {
        if size == 0 {
            return Err(PaginationError::ZeroPageSize);
        }

        Ok(Self {
            items,
            total,
            page,
            size,
            total_pages: total.div_ceil(size),
        })
    }
}

/// Wraps raw hits, kept in engine order, into a page.
pub fn paginate<T>(
    hits: Vec<T>,
    total: usize,
    page: usize,
    size: usize,
) -> Result<Paginated<T>, PaginationError> {
    Paginated::new(hits, total, page, size)
}
