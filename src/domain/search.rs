use chrono::{DateTime, Utc};

use crate::domain::course::CourseType;
use crate::domain::query::{CourseField, SortDirection, SortDirective};

/// Page size used when the caller does not provide one.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Result ordering requested by the caller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Soonest `nextSessionDate` first.
    #[default]
    Upcoming,
    PriceAsc,
    PriceDesc,
}

impl SortOrder {
    /// Maps the `sort` query parameter by exact name; anything else means `Upcoming`.
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("priceAsc") => SortOrder::PriceAsc,
            Some("priceDesc") => SortOrder::PriceDesc,
            _ => SortOrder::Upcoming,
        }
    }

    pub const fn directive(self) -> SortDirective {
        match self {
            SortOrder::Upcoming => SortDirective {
                field: CourseField::NextSessionDate,
                direction: SortDirection::Asc,
            },
            SortOrder::PriceAsc => SortDirective {
                field: CourseField::Price,
                direction: SortDirection::Asc,
            },
            SortOrder::PriceDesc => SortDirective {
                field: CourseField::Price,
                direction: SortDirection::Desc,
            },
        }
    }
}

/// Structured course search input. Absent filters are `None`.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchRequest {
    pub keyword: Option<String>,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub category: Option<String>,
    pub course_type: Option<CourseType>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub start_date: Option<DateTime<Utc>>,
    pub sort: SortOrder,
    pub page: usize,
    pub size: usize,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            keyword: None,
            min_age: None,
            max_age: None,
            category: None,
            course_type: None,
            min_price: None,
            max_price: None,
            start_date: None,
            sort: SortOrder::Upcoming,
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}
