use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::types::TypeConstraintError;

/// Format used for `nextSessionDate` in documents and responses.
pub const SESSION_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Kind of course offering.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CourseType {
    OneTime,
    Course,
    Club,
    Workshop,
}

impl CourseType {
    /// Name stored in the `type` keyword field.
    pub const fn as_str(self) -> &'static str {
        match self {
            CourseType::OneTime => "ONE_TIME",
            CourseType::Course => "COURSE",
            CourseType::Club => "CLUB",
            CourseType::Workshop => "WORKSHOP",
        }
    }
}

impl Display for CourseType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CourseType {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ONE_TIME" => Ok(CourseType::OneTime),
            "COURSE" => Ok(CourseType::Course),
            "CLUB" => Ok(CourseType::Club),
            "WORKSHOP" => Ok(CourseType::Workshop),
            other => Err(TypeConstraintError::UnknownCourseType(other.to_string())),
        }
    }
}

/// A course document as stored in the search index.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(rename = "type")]
    pub course_type: CourseType,
    #[serde(default)]
    pub grade_range: String,
    pub min_age: i32,
    pub max_age: i32,
    pub price: f64,
    #[serde(with = "session_date")]
    pub next_session_date: DateTime<Utc>,
}

/// Parses an RFC 3339 timestamp, or a zone-less ISO-8601 date-time taken as UTC.
pub fn parse_date_time(value: &str) -> Result<DateTime<Utc>, TypeConstraintError> {
    let value = value.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Ok(date.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| TypeConstraintError::InvalidDateTime(value.to_string()))
}

/// Sample data files carry numeric ids; the index keys documents by string.
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(id) => id,
        RawId::Number(id) => id.to_string(),
    })
}

pub(crate) mod session_date {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{SESSION_DATE_FORMAT, parse_date_time};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&date.format(SESSION_DATE_FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_date_time(&raw).map_err(serde::de::Error::custom)
    }
}
