use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::domain::course::CourseType;
use crate::domain::search::{DEFAULT_PAGE_SIZE, SearchRequest, SortOrder};
use crate::forms::{empty_as_none, optional_amount, optional_date_time};

/// Query string of `GET /api/search`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SearchForm {
    pub q: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub min_age: Option<i32>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub max_age: Option<i32>,
    pub category: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "empty_as_none")]
    pub course_type: Option<CourseType>,
    #[serde(default, deserialize_with = "optional_amount")]
    pub min_price: Option<f64>,
    #[serde(default, deserialize_with = "optional_amount")]
    pub max_price: Option<f64>,
    #[serde(default, deserialize_with = "optional_date_time")]
    pub start_date: Option<DateTime<Utc>>,
    pub sort: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<usize>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(range(min = 1))]
    pub size: Option<usize>,
}

impl From<SearchForm> for SearchRequest {
    fn from(form: SearchForm) -> Self {
        Self {
            keyword: form.q,
            min_age: form.min_age,
            max_age: form.max_age,
            category: form.category,
            course_type: form.course_type,
            min_price: form.min_price,
            max_price: form.max_price,
            start_date: form.start_date,
            sort: SortOrder::from_param(form.sort.as_deref()),
            page: form.page.unwrap_or(0),
            size: form.size.unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }
}

/// Query string of `GET /api/search/suggest`.
#[derive(Debug, Deserialize)]
pub struct SuggestForm {
    pub q: String,
}

#[cfg(test)]
mod tests {
    use actix_web::error::QueryPayloadError;
    use actix_web::web;
    use chrono::TimeZone;

    use super::*;

    fn parse(query: &str) -> Result<SearchForm, QueryPayloadError> {
        web::Query::<SearchForm>::from_query(query).map(web::Query::into_inner)
    }

    #[test]
    fn defaults_when_nothing_is_given() {
        let request = SearchRequest::from(parse("").unwrap());
        assert_eq!(request, SearchRequest::default());
    }

    #[test]
    fn reads_every_parameter() {
        let form = parse(
            "q=math&minAge=6&maxAge=9&category=Math&type=COURSE&minPrice=50&maxPrice=80.5\
             &startDate=2025-06-10T10:00:00&sort=priceDesc&page=2&size=5",
        )
        .unwrap();
        assert!(form.validate().is_ok());

        let request = SearchRequest::from(form);
        assert_eq!(request.keyword.as_deref(), Some("math"));
        assert_eq!(request.min_age, Some(6));
        assert_eq!(request.max_age, Some(9));
        assert_eq!(request.category.as_deref(), Some("Math"));
        assert_eq!(request.course_type, Some(CourseType::Course));
        assert_eq!(request.min_price, Some(50.0));
        assert_eq!(request.max_price, Some(80.5));
        assert_eq!(
            request.start_date,
            Some(Utc.with_ymd_and_hms(2025, 6, 10, 10, 0, 0).unwrap())
        );
        assert_eq!(request.sort, SortOrder::PriceDesc);
        assert_eq!(request.page, 2);
        assert_eq!(request.size, 5);
    }

    #[test]
    fn empty_values_are_absent() {
        let request = SearchRequest::from(parse("minAge=&type=&startDate=&size=").unwrap());
        assert_eq!(request.min_age, None);
        assert_eq!(request.course_type, None);
        assert_eq!(request.start_date, None);
        assert_eq!(request.size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert!(parse("minAge=six").is_err());
        assert!(parse("maxPrice=cheap").is_err());
        assert!(parse("startDate=tomorrow").is_err());
        assert!(parse("type=LECTURE").is_err());
        assert!(parse("page=-1").is_err());
    }

    #[test]
    fn non_finite_prices_are_rejected() {
        assert!(parse("minPrice=NaN").is_err());
        assert!(parse("maxPrice=inf").is_err());
        assert!(parse("maxPrice=-infinity").is_err());
        assert_eq!(parse("minPrice=0").unwrap().min_price, Some(0.0));
    }

    #[test]
    fn zero_size_fails_validation() {
        assert!(parse("size=0").unwrap().validate().is_err());
    }
}
