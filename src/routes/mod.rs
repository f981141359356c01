//! HTTP routes of the course search API.

use actix_web::error::InternalError;
use actix_web::{HttpResponse, web};

use crate::dto::search::ErrorResponse;
use crate::repository::CourseReader;
use crate::services::ServiceError;

pub mod search;

/// Registers the `/api` scope for a search engine of type `R`.
///
/// The engine itself must be registered as `web::Data<R>` app data.
pub fn configure<R>(cfg: &mut web::ServiceConfig)
where
    R: CourseReader + 'static,
{
    let query_config = web::QueryConfig::default().error_handler(|err, req| {
        let message = err.to_string();
        log::warn!("Rejected query string for {}: {message}", req.path());
        InternalError::from_response(err, HttpResponse::BadRequest().json(ErrorResponse::new(message)))
            .into()
    });

    cfg.service(
        web::scope("/api")
            .app_data(query_config)
            .route("/search", web::get().to(search::search_courses::<R>))
            .route("/search/suggest", web::get().to(search::suggest::<R>)),
    );
}

/// Maps a service failure onto the HTTP status the caller sees.
pub fn error_response(err: &ServiceError) -> HttpResponse {
    let body = ErrorResponse::new(err.to_string());
    match err {
        ServiceError::InvalidInput(_) => HttpResponse::BadRequest().json(body),
        ServiceError::Unavailable(_) => HttpResponse::ServiceUnavailable().json(body),
        ServiceError::Internal(_) => HttpResponse::InternalServerError().json(body),
    }
}
