//! Elasticsearch adapter for the course index.
//!
//! Queries are compiled from [`EngineQuery`] into the Elasticsearch query DSL
//! and sent over plain HTTP. Compilation is kept in free functions so the
//! produced JSON can be checked without a running cluster.

use std::time::Duration;

use chrono::SecondsFormat;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::domain::course::Course;
use crate::domain::query::{BoostedField, Clause, EngineQuery, Fuzziness, RangeValue};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{CourseReader, CourseSearchQuery, CourseWriter};

/// Date format used to read range bounds on date fields.
const RANGE_DATE_FORMAT: &str = "strict_date_optional_time";

/// Elasticsearch-backed implementation of [`CourseReader`] and [`CourseWriter`].
#[derive(Clone, Debug)]
pub struct ElasticsearchRepository {
    client: Client,
    base_url: String,
    index: String,
}

impl ElasticsearchRepository {
    /// Builds a client for `base_url` (e.g. `http://localhost:9200`) targeting `index`.
    pub fn new(base_url: &str, index: &str, timeout: Duration) -> RepositoryResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            index: index.to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.index, path)
    }

    async fn send(&self, request: RequestBuilder) -> RepositoryResult<(StatusCode, String)> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok((status, body))
    }

    async fn send_expecting_success(&self, request: RequestBuilder) -> RepositoryResult<String> {
        let (status, body) = self.send(request).await?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(RepositoryError::EngineError(format!("{status}: {body}")))
        }
    }

    async fn run_search(&self, body: &Value) -> RepositoryResult<(usize, Vec<Course>)> {
        log::debug!("Elasticsearch request on {}: {body}", self.index);
        let request = self.client.post(self.endpoint("_search")).json(body);
        let response = self.send_expecting_success(request).await?;
        parse_search_response(&response)
    }
}

impl CourseReader for ElasticsearchRepository {
    async fn search_courses(
        &self,
        query: &CourseSearchQuery,
    ) -> RepositoryResult<(usize, Vec<Course>)> {
        let body = search_body(query)?;
        self.run_search(&body).await
    }

    async fn suggest_courses(&self, prefix: &str, limit: usize) -> RepositoryResult<Vec<Course>> {
        let body = suggest_body(prefix, limit);
        let (_, courses) = self.run_search(&body).await?;
        Ok(courses)
    }
}

impl CourseWriter for ElasticsearchRepository {
    async fn delete_all(&self) -> RepositoryResult<()> {
        let request = self
            .client
            .post(self.endpoint("_delete_by_query?refresh=true&conflicts=proceed"))
            .json(&json!({ "query": { "match_all": {} } }));

        match self.send(request).await? {
            (status, _) if status.is_success() => Ok(()),
            // Nothing to delete yet.
            (status, _) if status == StatusCode::NOT_FOUND => Ok(()),
            (status, body) => Err(RepositoryError::EngineError(format!("{status}: {body}"))),
        }
    }

    async fn bulk_index(&self, courses: &[Course]) -> RepositoryResult<usize> {
        if courses.is_empty() {
            return Ok(0);
        }

        let payload = bulk_payload(courses)?;
        let request = self
            .client
            .post(self.endpoint("_bulk?refresh=true"))
            .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
            .body(payload);
        let response = self.send_expecting_success(request).await?;

        let summary: BulkResponse = serde_json::from_str(&response)?;
        if summary.errors {
            let failed = summary
                .items
                .iter()
                .filter(|item| item.index.as_ref().is_some_and(|r| r.error.is_some()))
                .count();
            return Err(RepositoryError::EngineError(format!(
                "{failed} of {} documents failed to index",
                courses.len()
            )));
        }

        Ok(courses.len())
    }
}

#[derive(Deserialize)]
struct SearchResponseBody {
    hits: HitsBody,
}

#[derive(Deserialize)]
struct HitsBody {
    total: Option<TotalHits>,
    hits: Vec<Hit>,
}

#[derive(Deserialize)]
struct TotalHits {
    value: usize,
}

#[derive(Deserialize)]
struct Hit {
    #[serde(rename = "_source")]
    source: Course,
}

#[derive(Deserialize)]
struct BulkResponse {
    errors: bool,
    #[serde(default)]
    items: Vec<BulkItem>,
}

#[derive(Deserialize)]
struct BulkItem {
    index: Option<BulkItemResult>,
}

#[derive(Deserialize)]
struct BulkItemResult {
    error: Option<Value>,
}

/// Extracts the total hit count and the `_source` documents, in engine order.
pub fn parse_search_response(body: &str) -> RepositoryResult<(usize, Vec<Course>)> {
    let parsed: SearchResponseBody = serde_json::from_str(body)?;
    let courses: Vec<Course> = parsed.hits.hits.into_iter().map(|hit| hit.source).collect();
    let total = parsed
        .hits
        .total
        .map_or(courses.len(), |total| total.value);
    Ok((total, courses))
}

/// Full `_search` request body: query, sort, paging and exact hit counting.
pub fn search_body(query: &CourseSearchQuery) -> RepositoryResult<Value> {
    let mut body = Map::new();
    body.insert("query".to_string(), compile_query(&query.query));
    body.insert(
        "sort".to_string(),
        json!([{ query.sort.field.as_str(): { "order": query.sort.direction.as_str() } }]),
    );
    body.insert("track_total_hits".to_string(), Value::Bool(true));

    if let Some(pagination) = query.pagination {
        let from = pagination.offset().ok_or_else(|| {
            RepositoryError::Unexpected("Pagination offset overflow".to_string())
        })?;
        body.insert("from".to_string(), json!(from));
        body.insert("size".to_string(), json!(pagination.per_page));
    }

    Ok(Value::Object(body))
}

/// Prefix lookup on `title`, matched case-insensitively against analyzed terms.
pub fn suggest_body(prefix: &str, limit: usize) -> Value {
    json!({
        "query": {
            "prefix": {
                "title": {
                    "value": prefix.to_lowercase(),
                    "case_insensitive": true
                }
            }
        },
        "size": limit
    })
}

pub fn compile_query(query: &EngineQuery) -> Value {
    match query {
        EngineQuery::MatchAll => json!({ "match_all": {} }),
        EngineQuery::Bool { must, filter } => {
            let mut bool_query = Map::new();
            if !must.is_empty() {
                bool_query.insert(
                    "must".to_string(),
                    Value::Array(must.iter().map(compile_clause).collect()),
                );
            }
            if !filter.is_empty() {
                bool_query.insert(
                    "filter".to_string(),
                    Value::Array(filter.iter().map(compile_clause).collect()),
                );
            }
            json!({ "bool": bool_query })
        }
    }
}

fn compile_clause(clause: &Clause) -> Value {
    match clause {
        Clause::MultiMatch {
            query,
            fields,
            fuzziness,
            prefix_length,
            max_expansions,
        } => json!({
            "multi_match": {
                "query": query,
                "fields": fields.iter().map(boosted_field).collect::<Vec<_>>(),
                "fuzziness": fuzziness_param(*fuzziness),
                "prefix_length": prefix_length,
                "max_expansions": max_expansions
            }
        }),
        Clause::Term { field, value } => json!({
            "term": { field.as_str(): { "value": value } }
        }),
        Clause::Range { field, gte, lte } => {
            let mut bounds = Map::new();
            if let Some(gte) = gte {
                bounds.insert("gte".to_string(), range_value(*gte));
            }
            if let Some(lte) = lte {
                bounds.insert("lte".to_string(), range_value(*lte));
            }
            // Bounds carry milliseconds; the field mapping only knows whole seconds.
            if [gte, lte]
                .into_iter()
                .flatten()
                .any(|bound| matches!(bound, RangeValue::Date(_)))
            {
                bounds.insert("format".to_string(), json!(RANGE_DATE_FORMAT));
            }
            json!({ "range": { field.as_str(): bounds } })
        }
    }
}

fn boosted_field(boosted: &BoostedField) -> String {
    if (boosted.boost - 1.0).abs() < f32::EPSILON {
        boosted.field.as_str().to_string()
    } else {
        format!("{}^{}", boosted.field.as_str(), boosted.boost)
    }
}

fn fuzziness_param(fuzziness: Fuzziness) -> &'static str {
    match fuzziness {
        Fuzziness::Auto => "AUTO",
    }
}

fn range_value(value: RangeValue) -> Value {
    match value {
        RangeValue::Int(v) => json!(v),
        RangeValue::Float(v) => json!(v),
        RangeValue::Date(v) => json!(v.to_rfc3339_opts(SecondsFormat::Millis, true)),
    }
}

fn bulk_payload(courses: &[Course]) -> RepositoryResult<String> {
    let mut payload = String::new();
    for course in courses {
        let action = json!({ "index": { "_id": course.id } });
        payload.push_str(&serde_json::to_string(&action)?);
        payload.push('\n');
        payload.push_str(&serde_json::to_string(course)?);
        payload.push('\n');
    }
    Ok(payload)
}
