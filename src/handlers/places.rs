// src/handlers/places.rs
// DOCUMENTATION: HTTP handlers for nearby place discovery
// PURPOSE: Parse requests, call the geo-query cache, return responses

use crate::errors::PlacesError;
use crate::models::{NearbyPlaceResponse, NearbyQuery, NearbyResponse, PlaceDetailsResponse};
use crate::services::{available_interests, GeoQueryCache};
use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

/// GET /places/nearby
/// Places around a position, served from the wide-radius cache
pub async fn nearby_places(
    cache: web::Data<Arc<GeoQueryCache>>,
    query: web::Query<NearbyQuery>,
) -> Result<impl Responder, PlacesError> {
    if let Err(e) = query.validate() {
        return Err(PlacesError::ValidationError(e.to_string()));
    }

    let position = query.position();
    let records = cache
        .get_places(position, query.view_radius(), &query.interest_set())
        .await?;
    let state = cache.state_at(position).await;

    let places: Vec<NearbyPlaceResponse> = records.into_iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(NearbyResponse {
        count: places.len(),
        places,
        state: state.as_str().to_string(),
    }))
}

/// GET /places/{place_id}
pub async fn place_details(
    cache: web::Data<Arc<GeoQueryCache>>,
    path: web::Path<String>,
) -> Result<impl Responder, PlacesError> {
    let details = cache.place_details(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(PlaceDetailsResponse::from(details)))
}

/// GET /places/interests
/// Interests offered in the picker
pub async fn list_interests() -> impl Responder {
    HttpResponse::Ok().json(available_interests())
}

/// GET /places/cache/stats
pub async fn cache_stats(cache: web::Data<Arc<GeoQueryCache>>) -> impl Responder {
    HttpResponse::Ok().json(cache.stats().await)
}

/// Configuration for place routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/places")
            .route("/nearby", web::get().to(nearby_places))
            .route("/interests", web::get().to(list_interests))
            .route("/cache/stats", web::get().to(cache_stats))
            .route("/{place_id}", web::get().to(place_details)),
    );
}
