//! In-process search engine evaluating [`EngineQuery`] values directly.
//!
//! Mirrors the subset of engine behaviour the service relies on: fuzzy
//! multi-field matching, keyword terms, inclusive ranges, sorting and
//! title prefix lookups. Tests inject it in place of Elasticsearch.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};
use std::future::{Future, ready};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use levenshtein_automata::{Distance, LevenshteinAutomatonBuilder};

use crate::domain::course::Course;
use crate::domain::query::{
    BoostedField, Clause, CourseField, EngineQuery, RangeValue, SortDirection, SortDirective,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{CourseReader, CourseSearchQuery, CourseWriter};

/// Hits returned when a query carries no pagination.
const DEFAULT_HITS: usize = 10;
/// Largest edit distance AUTO fuzziness ever allows.
const MAX_FUZZY_EDITS: u8 = 2;

#[derive(Debug, Default)]
pub struct InMemoryCourseRepository {
    courses: RwLock<Vec<Course>>,
}

impl InMemoryCourseRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_courses(courses: Vec<Course>) -> Self {
        Self {
            courses: RwLock::new(courses),
        }
    }

    fn read(&self) -> RepositoryResult<RwLockReadGuard<'_, Vec<Course>>> {
        self.courses
            .read()
            .map_err(|e| RepositoryError::Unexpected(format!("Index lock poisoned: {e}")))
    }

    fn write(&self) -> RepositoryResult<RwLockWriteGuard<'_, Vec<Course>>> {
        self.courses
            .write()
            .map_err(|e| RepositoryError::Unexpected(format!("Index lock poisoned: {e}")))
    }

    fn execute(&self, query: &CourseSearchQuery) -> RepositoryResult<(usize, Vec<Course>)> {
        let courses = self.read()?;
        let matcher = QueryMatcher::compile(&query.query, &courses);

        let mut hits: Vec<&Course> = courses.iter().filter(|c| matcher.matches(c)).collect();
        // Stable sort keeps insertion order for equal keys.
        hits.sort_by(|a, b| compare_by(a, b, query.sort));

        let total = hits.len();
        let (offset, limit) = match query.pagination {
            Some(pagination) => (
                pagination.offset().ok_or_else(|| {
                    RepositoryError::Unexpected("Pagination offset overflow".to_string())
                })?,
                pagination.per_page,
            ),
            None => (0, DEFAULT_HITS),
        };

        let page = hits
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        Ok((total, page))
    }

    fn prefix_lookup(&self, prefix: &str, limit: usize) -> RepositoryResult<Vec<Course>> {
        let prefix = prefix.to_lowercase();
        let courses = self.read()?;

        Ok(courses
            .iter()
            .filter(|c| analyze(&c.title).any(|term| term.starts_with(&prefix)))
            .take(limit)
            .cloned()
            .collect())
    }

    fn clear(&self) -> RepositoryResult<()> {
        self.write()?.clear();
        Ok(())
    }

    fn upsert(&self, new_courses: &[Course]) -> RepositoryResult<usize> {
        let mut courses = self.write()?;
        for course in new_courses {
            match courses.iter_mut().find(|c| c.id == course.id) {
                Some(existing) => *existing = course.clone(),
                None => courses.push(course.clone()),
            }
        }
        Ok(new_courses.len())
    }
}

impl CourseReader for InMemoryCourseRepository {
    fn search_courses(
        &self,
        query: &CourseSearchQuery,
    ) -> impl Future<Output = RepositoryResult<(usize, Vec<Course>)>> + Send {
        ready(self.execute(query))
    }

    fn suggest_courses(
        &self,
        prefix: &str,
        limit: usize,
    ) -> impl Future<Output = RepositoryResult<Vec<Course>>> + Send {
        ready(self.prefix_lookup(prefix, limit))
    }
}

impl CourseWriter for InMemoryCourseRepository {
    fn delete_all(&self) -> impl Future<Output = RepositoryResult<()>> + Send {
        ready(self.clear())
    }

    fn bulk_index(&self, courses: &[Course]) -> impl Future<Output = RepositoryResult<usize>> + Send {
        ready(self.upsert(courses))
    }
}

/// Lowercased alphanumeric tokens, the same split the engine's standard analyzer makes.
fn analyze(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
}

fn text_of(course: &Course, field: CourseField) -> Option<&str> {
    match field {
        CourseField::Title => Some(&course.title),
        CourseField::Description => Some(&course.description),
        _ => None,
    }
}

fn range_value(course: &Course, field: CourseField) -> Option<RangeValue> {
    match field {
        CourseField::MinAge => Some(RangeValue::Int(course.min_age)),
        CourseField::MaxAge => Some(RangeValue::Int(course.max_age)),
        CourseField::Price => Some(RangeValue::Float(course.price)),
        CourseField::NextSessionDate => Some(RangeValue::Date(course.next_session_date)),
        _ => None,
    }
}

fn compare_values(left: RangeValue, right: RangeValue) -> Option<Ordering> {
    match (left, right) {
        (RangeValue::Int(l), RangeValue::Int(r)) => Some(l.cmp(&r)),
        (RangeValue::Float(l), RangeValue::Float(r)) => l.partial_cmp(&r),
        (RangeValue::Int(l), RangeValue::Float(r)) => f64::from(l).partial_cmp(&r),
        (RangeValue::Float(l), RangeValue::Int(r)) => l.partial_cmp(&f64::from(r)),
        (RangeValue::Date(l), RangeValue::Date(r)) => Some(l.cmp(&r)),
        _ => None,
    }
}

fn compare_by(a: &Course, b: &Course, sort: SortDirective) -> Ordering {
    let ordering = match (range_value(a, sort.field), range_value(b, sort.field)) {
        (Some(left), Some(right)) => compare_values(left, right).unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    };

    match sort.direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

fn term_matches(course: &Course, field: CourseField, value: &str) -> bool {
    match field {
        CourseField::Category => course.category == value,
        CourseField::CourseType => course.course_type.as_str() == value,
        CourseField::Title | CourseField::Description => text_of(course, field)
            .is_some_and(|text| analyze(text).any(|token| token == value)),
        _ => false,
    }
}

fn range_matches(
    course: &Course,
    field: CourseField,
    gte: Option<RangeValue>,
    lte: Option<RangeValue>,
) -> bool {
    let Some(actual) = range_value(course, field) else {
        return false;
    };

    let lower_ok = gte.is_none_or(|bound| {
        matches!(
            compare_values(actual, bound),
            Some(Ordering::Greater | Ordering::Equal)
        )
    });
    let upper_ok = lte.is_none_or(|bound| {
        matches!(
            compare_values(actual, bound),
            Some(Ordering::Less | Ordering::Equal)
        )
    });

    lower_ok && upper_ok
}

/// A full-text clause resolved against the index vocabulary.
struct ExpandedText<'q> {
    fields: &'q [BoostedField],
    /// Accepted index terms, one set per query term.
    expansions: Vec<HashSet<String>>,
}

impl ExpandedText<'_> {
    fn matches(&self, course: &Course) -> bool {
        self.fields.iter().any(|boosted| {
            text_of(course, boosted.field).is_some_and(|text| {
                analyze(text).any(|token| self.expansions.iter().any(|set| set.contains(&token)))
            })
        })
    }
}

enum CompiledClause<'q> {
    Text(ExpandedText<'q>),
    Plain(&'q Clause),
}

enum QueryMatcher<'q> {
    All,
    Clauses(Vec<CompiledClause<'q>>),
}

impl<'q> QueryMatcher<'q> {
    fn compile(query: &'q EngineQuery, courses: &[Course]) -> Self {
        match query {
            EngineQuery::MatchAll => QueryMatcher::All,
            EngineQuery::Bool { must, filter } => QueryMatcher::Clauses(
                must.iter()
                    .chain(filter.iter())
                    .map(|clause| compile_clause(clause, courses))
                    .collect(),
            ),
        }
    }

    fn matches(&self, course: &Course) -> bool {
        match self {
            QueryMatcher::All => true,
            QueryMatcher::Clauses(clauses) => clauses.iter().all(|clause| match clause {
                CompiledClause::Text(text) => text.matches(course),
                CompiledClause::Plain(Clause::Term { field, value }) => {
                    term_matches(course, *field, value)
                }
                CompiledClause::Plain(Clause::Range { field, gte, lte }) => {
                    range_matches(course, *field, *gte, *lte)
                }
                CompiledClause::Plain(Clause::MultiMatch { .. }) => false,
            }),
        }
    }
}

fn compile_clause<'q>(clause: &'q Clause, courses: &[Course]) -> CompiledClause<'q> {
    let Clause::MultiMatch {
        query,
        fields,
        fuzziness,
        prefix_length,
        max_expansions,
    } = clause
    else {
        return CompiledClause::Plain(clause);
    };

    let vocabulary: BTreeSet<String> = courses
        .iter()
        .flat_map(|course| {
            fields
                .iter()
                .filter_map(|boosted| text_of(course, boosted.field))
                .flat_map(analyze)
        })
        .collect();

    // Transpositions cost one edit, as with the engine's `fuzzy_transpositions` default.
    let builders: Vec<LevenshteinAutomatonBuilder> = (0..=MAX_FUZZY_EDITS)
        .map(|distance| LevenshteinAutomatonBuilder::new(distance, true))
        .collect();

    let expansions: Vec<HashSet<String>> = analyze(query)
        .map(|term| {
            let max_edits = fuzziness.max_edits(term.chars().count()).min(MAX_FUZZY_EDITS);
            let dfa = builders[usize::from(max_edits)].build_dfa(&term);
            let prefix: String = term.chars().take(*prefix_length).collect();

            let mut candidates: Vec<(u8, &String)> = vocabulary
                .iter()
                .filter(|candidate| candidate.starts_with(prefix.as_str()))
                .filter_map(|candidate| match dfa.eval(candidate) {
                    Distance::Exact(distance) => Some((distance, candidate)),
                    Distance::AtLeast(_) => None,
                })
                .collect();
            candidates.sort();
            candidates.truncate(*max_expansions);

            candidates
                .into_iter()
                .map(|(_, candidate)| candidate.clone())
                .collect()
        })
        .collect();

    CompiledClause::Text(ExpandedText { fields, expansions })
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::domain::course::CourseType;
    use crate::domain::query::Fuzziness;
    use crate::domain::search::SortOrder;

    fn course(id: &str, title: &str, price: f64) -> Course {
        Course {
            id: id.to_string(),
            title: title.to_string(),
            description: format!("About {title}"),
            category: "Math".to_string(),
            course_type: CourseType::Course,
            grade_range: "1st-3rd".to_string(),
            min_age: 6,
            max_age: 9,
            price,
            next_session_date: Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn fuzzy(query: &str) -> EngineQuery {
        EngineQuery::Bool {
            must: vec![Clause::MultiMatch {
                query: query.to_string(),
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
            }],
            filter: vec![],
        }
    }

    #[test]
    fn fuzzy_match_tolerates_typo_but_keeps_prefix() {
        let repo = InMemoryCourseRepository::with_courses(vec![
            course("1", "Math Basics", 100.0),
            course("2", "Science Fun", 75.0),
        ]);

        let (total, hits) = repo.execute(&CourseSearchQuery::new(fuzzy("matg"))).unwrap();
        assert_eq!(total, 1);
        assert_eq!(hits[0].id, "1");

        // First character must agree.
        let (total, _) = repo.execute(&CourseSearchQuery::new(fuzzy("nath"))).unwrap();
        assert_eq!(total, 0);
    }

    #[test]
    fn swapped_letters_count_as_one_edit() {
        let repo = InMemoryCourseRepository::with_courses(vec![
            course("1", "Math Basics", 100.0),
            course("2", "Science Fun", 75.0),
        ]);

        let (total, hits) = repo.execute(&CourseSearchQuery::new(fuzzy("mtah"))).unwrap();
        assert_eq!(total, 1);
        assert_eq!(hits[0].id, "1");

        // Two swaps are beyond the single edit allowed for four letters.
        let (total, _) = repo.execute(&CourseSearchQuery::new(fuzzy("mtha"))).unwrap();
        assert_eq!(total, 0);
    }

    #[test]
    fn longer_terms_allow_two_edits() {
        let repo = InMemoryCourseRepository::with_courses(vec![course("1", "Science Fun", 1.0)]);
        let (total, _) = repo.execute(&CourseSearchQuery::new(fuzzy("scinece"))).unwrap();
        assert_eq!(total, 1);
        let (total, _) = repo.execute(&CourseSearchQuery::new(fuzzy("sxyzence"))).unwrap();
        assert_eq!(total, 0);
    }

    #[test]
    fn short_terms_require_exact_match() {
        let repo = InMemoryCourseRepository::with_courses(vec![course("1", "Go Club", 10.0)]);
        let (total, _) = repo.execute(&CourseSearchQuery::new(fuzzy("ga"))).unwrap();
        assert_eq!(total, 0);
        let (total, _) = repo.execute(&CourseSearchQuery::new(fuzzy("go"))).unwrap();
        assert_eq!(total, 1);
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let item = course("1", "Math", 75.0);
        assert!(range_matches(
            &item,
            CourseField::Price,
            Some(RangeValue::Float(75.0)),
            Some(RangeValue::Float(75.0)),
        ));
        assert!(!range_matches(
            &item,
            CourseField::Price,
            Some(RangeValue::Float(75.01)),
            None,
        ));
        assert!(range_matches(
            &item,
            CourseField::MaxAge,
            Some(RangeValue::Int(9)),
            None,
        ));
    }

    #[test]
    fn sorts_and_pages() {
        let repo = InMemoryCourseRepository::with_courses(vec![
            course("1", "A", 30.0),
            course("2", "B", 10.0),
            course("3", "C", 20.0),
        ]);

        let query = CourseSearchQuery::new(EngineQuery::MatchAll)
            .sort(SortOrder::PriceAsc.directive())
            .paginate(1, 2);
        let (total, hits) = repo.execute(&query).unwrap();

        assert_eq!(total, 3);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "1");
    }

    #[test]
    fn prefix_lookup_is_case_insensitive_per_term() {
        let repo = InMemoryCourseRepository::with_courses(vec![
            course("1", "Math Basics", 1.0),
            course("2", "Science Fun", 1.0),
            course("3", "Applied Mathematics", 1.0),
        ]);

        let titles: Vec<String> = repo
            .prefix_lookup("Ma", 10)
            .unwrap()
            .into_iter()
            .map(|c| c.title)
            .collect();
        assert_eq!(titles, vec!["Math Basics", "Applied Mathematics"]);

        assert_eq!(repo.prefix_lookup("ma", 1).unwrap().len(), 1);
    }

    #[test]
    fn bulk_index_replaces_by_id() {
        let repo = InMemoryCourseRepository::new();
        repo.upsert(&[course("1", "Old", 1.0), course("2", "Other", 1.0)])
            .unwrap();
        repo.upsert(&[course("1", "New", 1.0)]).unwrap();

        let (total, hits) = repo.execute(&CourseSearchQuery::new(EngineQuery::MatchAll)).unwrap();
        assert_eq!(total, 2);
        assert!(hits.iter().any(|c| c.title == "New"));

        repo.clear().unwrap();
        assert_eq!(repo.execute(&CourseSearchQuery::new(EngineQuery::MatchAll)).unwrap().0, 0);
    }
}
