use actix_web::{HttpResponse, Result, web};
use sqlx::PgPool;
use validator::Validate;

use auth_services::middleware::AuthenticatedUser;
use auth_services::types::Role;
use listing_services::service::ListingService;
use listing_services::types::*;

/// Searches active properties with the query's filters. Public.
pub async fn search_properties(
    pool: web::Data<PgPool>,
    params: web::Query<SearchParams>,
) -> Result<HttpResponse, ListingError> {
    let listing_service = ListingService::new(pool.get_ref().clone());
    let response = listing_service.search(&params).await?;

    Ok(HttpResponse::Ok().json(response))
}

/// Creates a property owned by the authenticated host.
pub async fn create_property(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    request: web::Json<CreatePropertyRequest>,
) -> Result<HttpResponse, ListingError> {
    // Validate the request
    request
        .validate()
        .map_err(|e| ListingError::Validation(format!("Validation error: {}", e)))?;

    if user.0.role == Role::Guest {
        return Err(ListingError::Forbidden);
    }

    let listing_service = ListingService::new(pool.get_ref().clone());
    let property = listing_service.create_property(&user.0.id, &request).await?;

    Ok(HttpResponse::Created().json(property))
}

/// Fetches a property by id. Public; inactive properties stay addressable.
pub async fn get_property(
    pool: web::Data<PgPool>,
    path: web::Path<uuid::Uuid>,
) -> Result<HttpResponse, ListingError> {
    let property_id = path.into_inner();
    let listing_service = ListingService::new(pool.get_ref().clone());
    let property = listing_service.get_property(&property_id).await?;

    Ok(HttpResponse::Ok().json(property))
}

/// Applies a typed patch to a property. Owner or admin only.
pub async fn update_property(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<uuid::Uuid>,
    request: web::Json<PropertyPatch>,
) -> Result<HttpResponse, ListingError> {
    // Validate the request
    request
        .validate()
        .map_err(|e| ListingError::Validation(format!("Validation error: {}", e)))?;

    let property_id = path.into_inner();
    let listing_service = ListingService::new(pool.get_ref().clone());
    let property = listing_service
        .patch_property(&user.0.id, user.0.is_admin(), &property_id, &request)
        .await?;

    Ok(HttpResponse::Ok().json(property))
}

/// Soft-deletes a property. Owner or admin only.
pub async fn delete_property(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<uuid::Uuid>,
) -> Result<HttpResponse, ListingError> {
    let property_id = path.into_inner();
    let listing_service = ListingService::new(pool.get_ref().clone());
    listing_service
        .deactivate_property(&user.0.id, user.0.is_admin(), &property_id)
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Reads the availability ledger for a date range. Public.
pub async fn get_availability(
    pool: web::Data<PgPool>,
    path: web::Path<uuid::Uuid>,
    params: web::Query<AvailabilityRangeParams>,
) -> Result<HttpResponse, ListingError> {
    let property_id = path.into_inner();
    let listing_service = ListingService::new(pool.get_ref().clone());
    let records = listing_service
        .query_availability(&property_id, params.from, params.to)
        .await?;

    Ok(HttpResponse::Ok().json(records))
}

/// Writes availability records for a property. Owner or admin only;
/// last write wins per (property, date).
pub async fn put_availability(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<uuid::Uuid>,
    request: web::Json<UpsertAvailabilityRequest>,
) -> Result<HttpResponse, ListingError> {
    // Validate the request
    request
        .validate()
        .map_err(|e| ListingError::Validation(format!("Validation error: {}", e)))?;

    let property_id = path.into_inner();
    let listing_service = ListingService::new(pool.get_ref().clone());
    let records = listing_service
        .upsert_availability(&user.0.id, user.0.is_admin(), &property_id, &request.entries)
        .await?;

    Ok(HttpResponse::Ok().json(records))
}
