// src/handlers/routes.rs
// DOCUMENTATION: HTTP handlers for walk routes
// PURPOSE: Summarize recorded walks for the presentation layer

use crate::errors::PlacesError;
use crate::models::RouteSummaryRequest;
use crate::services::WalkSession;
use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

/// POST /routes/summary
/// Length, duration and polyline of a recorded walk
pub async fn route_summary(
    req: web::Json<RouteSummaryRequest>,
) -> Result<impl Responder, PlacesError> {
    if let Err(e) = req.validate() {
        return Err(PlacesError::ValidationError(e.to_string()));
    }

    let walk = WalkSession::from(req.into_inner().points);
    Ok(HttpResponse::Ok().json(walk.summary()))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/routes").route("/summary", web::post().to(route_summary)));
}
