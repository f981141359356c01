//! Engine-agnostic boolean query representation.
//!
//! The translator produces these values and every engine adapter compiles them
//! into its own wire format, so query construction can be tested without a
//! running search engine.

use chrono::{DateTime, Utc};

/// Indexed course fields that queries and sorts may reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CourseField {
    Title,
    Description,
    Category,
    CourseType,
    MinAge,
    MaxAge,
    Price,
    NextSessionDate,
}

impl CourseField {
    /// Field name inside the indexed document.
    pub const fn as_str(self) -> &'static str {
        match self {
            CourseField::Title => "title",
            CourseField::Description => "description",
            CourseField::Category => "category",
            CourseField::CourseType => "type",
            CourseField::MinAge => "minAge",
            CourseField::MaxAge => "maxAge",
            CourseField::Price => "price",
            CourseField::NextSessionDate => "nextSessionDate",
        }
    }
}

/// How far a fuzzy term may drift from the query term.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fuzziness {
    /// Edit distance derived from term length: 0 up to 2 chars, 1 up to 5, 2 beyond.
    Auto,
}

impl Fuzziness {
    /// Maximum allowed edit distance for a term of `term_len` characters.
    pub fn max_edits(self, term_len: usize) -> u8 {
        match self {
            Fuzziness::Auto => match term_len {
                0..=2 => 0,
                3..=5 => 1,
                _ => 2,
            },
        }
    }
}

/// A field targeted by a full-text clause together with its score boost.
#[derive(Clone, Debug, PartialEq)]
pub struct BoostedField {
    pub field: CourseField,
    pub boost: f32,
}

/// Bound value of a range clause.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RangeValue {
    Int(i32),
    Float(f64),
    Date(DateTime<Utc>),
}

/// Single query clause.
#[derive(Clone, Debug, PartialEq)]
pub enum Clause {
    /// Full-text fuzzy match over several fields.
    MultiMatch {
        query: String,
        fields: Vec<BoostedField>,
        fuzziness: Fuzziness,
        prefix_length: usize,
        max_expansions: usize,
    },
    /// Exact keyword match.
    Term { field: CourseField, value: String },
    /// Inclusive range, either bound optional.
    Range {
        field: CourseField,
        gte: Option<RangeValue>,
        lte: Option<RangeValue>,
    },
}

/// Composite query handed to the search engine.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineQuery {
    /// Every document matches.
    MatchAll,
    /// Conjunction of scoring (`must`) and non-scoring (`filter`) clauses.
    Bool {
        must: Vec<Clause>,
        filter: Vec<Clause>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Ordering applied by the engine before pagination.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortDirective {
    pub field: CourseField,
    pub direction: SortDirection,
}
