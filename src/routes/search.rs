use actix_web::{HttpResponse, Responder, web};
use log::{error, warn};
use validator::Validate;

use crate::dto::search::{ErrorResponse, SearchResponse};
use crate::forms::search::{SearchForm, SuggestForm};
use crate::repository::CourseReader;
use crate::routes::error_response;
use crate::services::search as search_service;

/// `GET /api/search`
pub async fn search_courses<R>(params: web::Query<SearchForm>, repo: web::Data<R>) -> impl Responder
where
    R: CourseReader + 'static,
{
    let form = params.into_inner();

    if let Err(e) = form.validate() {
        warn!("Rejected search parameters: {e}");
        return HttpResponse::BadRequest().json(ErrorResponse::new(e.to_string()));
    }

    match search_service::search_courses(repo.get_ref(), form.into()).await {
        Ok(page) => HttpResponse::Ok().json(SearchResponse::from(page)),
        Err(e) => {
            error!("Failed to search courses: {e}");
            error_response(&e)
        }
    }
}

/// `GET /api/search/suggest`
pub async fn suggest<R>(params: web::Query<SuggestForm>, repo: web::Data<R>) -> impl Responder
where
    R: CourseReader + 'static,
{
    match search_service::suggest_titles(repo.get_ref(), &params.q).await {
        Ok(titles) => HttpResponse::Ok().json(titles),
        Err(e) => {
            error!("Failed to load suggestions: {e}");
            error_response(&e)
        }
    }
}
