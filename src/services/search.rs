use std::collections::HashSet;

use crate::domain::course::Course;
use crate::domain::query::{BoostedField, Clause, CourseField, EngineQuery, Fuzziness, RangeValue};
use crate::domain::search::SearchRequest;
use crate::pagination::{Paginated, paginate};
use crate::repository::{CourseReader, CourseSearchQuery, Pagination};
use crate::services::{ServiceError, ServiceResult};

/// Raw hits requested from the engine for one autocomplete call.
pub const SUGGESTION_LIMIT: usize = 10;

const TITLE_BOOST: f32 = 2.0;
const FUZZY_PREFIX_LENGTH: usize = 1;
const FUZZY_MAX_EXPANSIONS: usize = 10;

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Builds the engine query for a search request.
///
/// The keyword becomes a scoring clause; every other criterion is a
/// non-scoring filter. With nothing to match on, every course matches.
pub fn translate(request: &SearchRequest) -> EngineQuery {
    let mut must = Vec::new();
    let mut filter = Vec::new();

    if let Some(keyword) = non_blank(request.keyword.as_deref()) {
        must.push(Clause::MultiMatch {
            query: keyword.to_string(),
            fields: vec![
                BoostedField {
                    field: CourseField::Title,
                    boost: TITLE_BOOST,
                },
                BoostedField {
                    field: CourseField::Description,
                    boost: 1.0,
                },
            ],
            fuzziness: Fuzziness::Auto,
            prefix_length: FUZZY_PREFIX_LENGTH,
            max_expansions: FUZZY_MAX_EXPANSIONS,
        });
    }

    if let Some(category) = non_blank(request.category.as_deref()) {
        filter.push(Clause::Term {
            field: CourseField::Category,
            value: category.to_string(),
        });
    }

    if let Some(course_type) = request.course_type {
        filter.push(Clause::Term {
            field: CourseField::CourseType,
            value: course_type.as_str().to_string(),
        });
    }

    // Overlap, not containment: the course band only has to touch the requested band.
    if let Some(min_age) = request.min_age {
        filter.push(Clause::Range {
            field: CourseField::MaxAge,
            gte: Some(RangeValue::Int(min_age)),
            lte: None,
        });
    }
    if let Some(max_age) = request.max_age {
        filter.push(Clause::Range {
            field: CourseField::MinAge,
            gte: None,
            lte: Some(RangeValue::Int(max_age)),
        });
    }

    if request.min_price.is_some() || request.max_price.is_some() {
        filter.push(Clause::Range {
            field: CourseField::Price,
            gte: request.min_price.map(RangeValue::Float),
            lte: request.max_price.map(RangeValue::Float),
        });
    }

    if let Some(start_date) = request.start_date {
        filter.push(Clause::Range {
            field: CourseField::NextSessionDate,
            gte: Some(RangeValue::Date(start_date)),
            lte: None,
        });
    }

    if must.is_empty() && filter.is_empty() {
        EngineQuery::MatchAll
    } else {
        EngineQuery::Bool { must, filter }
    }
}

/// Runs a filtered, sorted and paginated course search.
pub async fn search_courses<R>(repo: &R, request: SearchRequest) -> ServiceResult<Paginated<Course>>
where
    R: CourseReader,
{
    log::info!("Searching courses with request: {request:?}");

    let pagination = Pagination {
        page: request.page,
        per_page: request.size,
    };
    if pagination.per_page == 0 {
        return Err(ServiceError::InvalidInput(
            "page size must be greater than zero".to_string(),
        ));
    }
    if pagination.offset().is_none() {
        return Err(ServiceError::InvalidInput(format!(
            "page {} is out of range",
            request.page
        )));
    }

    let query = CourseSearchQuery::new(translate(&request))
        .sort(request.sort.directive())
        .paginate(pagination.page, pagination.per_page);

    let (total, courses) = repo.search_courses(&query).await.map_err(|err| {
        log::error!("Course search failed: {err}");
        ServiceError::from(err)
    })?;

    Ok(paginate(courses, total, request.page, request.size)?)
}

/// Returns distinct course titles starting with `partial`, in engine order.
pub async fn suggest_titles<R>(repo: &R, partial: &str) -> ServiceResult<Vec<String>>
where
    R: CourseReader,
{
    log::info!("Getting autocomplete suggestions for: {partial}");

    let partial = partial.trim();
    if partial.is_empty() {
        return Ok(Vec::new());
    }

    let courses = repo
        .suggest_courses(partial, SUGGESTION_LIMIT)
        .await
        .map_err(|err| {
            log::error!("Autocomplete lookup failed: {err}");
            ServiceError::from(err)
        })?;

    let mut seen = HashSet::new();
    Ok(courses
        .into_iter()
        .map(|course| course.title)
        .filter(|title| seen.insert(title.clone()))
        .collect())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::domain::course::CourseType;

    fn filters(query: &EngineQuery) -> &[Clause] {
        match query {
            EngineQuery::Bool { filter, .. } => filter,
            EngineQuery::MatchAll => &[],
        }
    }

    #[test]
    fn empty_request_matches_everything() {
        assert_eq!(translate(&SearchRequest::default()), EngineQuery::MatchAll);
    }

    #[test]
    fn blank_keyword_and_category_are_absent() {
        let request = SearchRequest {
            keyword: Some("   ".to_string()),
            category: Some("\t".to_string()),
            ..SearchRequest::default()
        };
        assert_eq!(translate(&request), EngineQuery::MatchAll);
    }

    #[test]
    fn keyword_is_a_fuzzy_must_clause() {
        let request = SearchRequest {
            keyword: Some("  math ".to_string()),
            ..SearchRequest::default()
        };

        let EngineQuery::Bool { must, filter } = translate(&request) else {
            panic!("expected bool query");
        };
        assert!(filter.is_empty());
        assert_eq!(
            must,
            vec![Clause::MultiMatch {
                query: "math".to_string(),
                fields: vec![
                    BoostedField {
                        field: CourseField::Title,
                        boost: 2.0,
                    },
                    BoostedField {
                        field: CourseField::Description,
                        boost: 1.0,
                    },
                ],
                fuzziness: Fuzziness::Auto,
                prefix_length: 1,
                max_expansions: 10,
            }]
        );
    }

    #[test]
    fn age_bounds_cross_over_for_overlap() {
        let request = SearchRequest {
            min_age: Some(8),
            max_age: Some(10),
            ..SearchRequest::default()
        };

        let query = translate(&request);
        assert_eq!(
            filters(&query),
            &[
                Clause::Range {
                    field: CourseField::MaxAge,
                    gte: Some(RangeValue::Int(8)),
                    lte: None,
                },
                Clause::Range {
                    field: CourseField::MinAge,
                    gte: None,
                    lte: Some(RangeValue::Int(10)),
                },
            ]
        );
    }

    #[test]
    fn price_range_is_a_single_clause_with_optional_bounds() {
        let request = SearchRequest {
            max_price: Some(80.0),
            ..SearchRequest::default()
        };

        let query = translate(&request);
        assert_eq!(
            filters(&query),
            &[Clause::Range {
                field: CourseField::Price,
                gte: None,
                lte: Some(RangeValue::Float(80.0)),
            }]
        );
    }

    #[test]
    fn category_type_and_date_filters() {
        let start = Utc.with_ymd_and_hms(2025, 6, 10, 0, 0, 0).unwrap();
        let request = SearchRequest {
            category: Some(" Science ".to_string()),
            course_type: Some(CourseType::Workshop),
            start_date: Some(start),
            ..SearchRequest::default()
        };

        let query = translate(&request);
        assert_eq!(
            filters(&query),
            &[
                Clause::Term {
                    field: CourseField::Category,
                    value: "Science".to_string(),
                },
                Clause::Term {
                    field: CourseField::CourseType,
                    value: "WORKSHOP".to_string(),
                },
                Clause::Range {
                    field: CourseField::NextSessionDate,
                    gte: Some(RangeValue::Date(start)),
                    lte: None,
                },
            ]
        );
    }
}
