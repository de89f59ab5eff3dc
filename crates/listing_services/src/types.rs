use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Cancellation policy attached to a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CancellationPolicy {
    /// Full refund up to a day before check-in.
    Flexible,
    /// Full refund up to five days before check-in.
    Moderate,
    /// Half refund up to a week before check-in.
    Strict,
}

impl CancellationPolicy {
    /// Parses a policy from its database representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "flexible" => Some(CancellationPolicy::Flexible),
            "moderate" => Some(CancellationPolicy::Moderate),
            "strict" => Some(CancellationPolicy::Strict),
            _ => None,
        }
    }

    /// Database representation of the policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            CancellationPolicy::Flexible => "flexible",
            CancellationPolicy::Moderate => "moderate",
            CancellationPolicy::Strict => "strict",
        }
    }
}

/// Property model representing the database schema
#[derive(Debug, Clone, Serialize)]
pub struct Property {
    /// Unique identifier for the property
    pub id: Uuid,
    /// User who owns the property
    pub host_id: Uuid,
    /// Listing title
    pub title: String,
    /// Listing description
    pub description: String,
    /// Street address
    pub address: String,
    /// City
    pub city: String,
    /// Country
    pub country: String,
    /// Kind of property, e.g. "apartment", "house", "cabin"
    pub property_type: String,
    /// Maximum number of guests
    pub max_guests: i32,
    /// Nightly base price
    pub price_per_night: BigDecimal,
    /// ISO 4217 currency code
    pub currency: String,
    /// Cancellation policy
    pub cancellation_policy: CancellationPolicy,
    /// Soft-delete flag; inactive properties are hidden from search
    pub is_active: bool,
    /// When the property was created
    pub created_at: DateTime<Utc>,
    /// When the property was last updated
    pub updated_at: DateTime<Utc>,
}

/// Request structure for creating a property
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePropertyRequest {
    /// Listing title
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: String,

    /// Listing description
    #[serde(default)]
    pub description: String,

    /// Street address
    #[serde(default)]
    pub address: String,

    /// City
    #[validate(length(min = 1, max = 255, message = "City is required"))]
    pub city: String,

    /// Country
    #[validate(length(min = 1, max = 255, message = "Country is required"))]
    pub country: String,

    /// Kind of property
    #[validate(length(min = 1, max = 64, message = "Property type is required"))]
    pub property_type: String,

    /// Maximum number of guests
    #[validate(range(min = 1, max = 64, message = "Max guests must be between 1 and 64"))]
    pub max_guests: i32,

    /// Nightly base price
    pub price_per_night: BigDecimal,

    /// ISO 4217 currency code
    #[validate(length(equal = 3, message = "Currency must be a 3-letter code"))]
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Cancellation policy
    #[serde(default = "default_policy")]
    pub cancellation_policy: CancellationPolicy,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_policy() -> CancellationPolicy {
    CancellationPolicy::Moderate
}

/// Typed patch for a property: every field optional, absent fields keep
/// their current values. Applied through a single parameterized update.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct PropertyPatch {
    /// Listing title
    #[validate(length(min = 1, max = 255, message = "Title must not be empty"))]
    pub title: Option<String>,
    /// Listing description
    pub description: Option<String>,
    /// Street address
    pub address: Option<String>,
    /// City
    #[validate(length(min = 1, max = 255, message = "City must not be empty"))]
    pub city: Option<String>,
    /// Country
    #[validate(length(min = 1, max = 255, message = "Country must not be empty"))]
    pub country: Option<String>,
    /// Kind of property
    pub property_type: Option<String>,
    /// Maximum number of guests
    #[validate(range(min = 1, max = 64, message = "Max guests must be between 1 and 64"))]
    pub max_guests: Option<i32>,
    /// Nightly base price
    pub price_per_night: Option<BigDecimal>,
    /// ISO 4217 currency code
    #[validate(length(equal = 3, message = "Currency must be a 3-letter code"))]
    pub currency: Option<String>,
    /// Cancellation policy
    pub cancellation_policy: Option<CancellationPolicy>,
}

/// Query parameters for property search
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    /// Case-insensitive substring match on city or country
    pub location: Option<String>,
    /// Desired check-in date; with `check_out`, filters on availability
    pub check_in: Option<NaiveDate>,
    /// Desired check-out date
    pub check_out: Option<NaiveDate>,
    /// Minimum guest capacity
    pub guests: Option<i32>,
    /// Lower bound on nightly price
    pub price_min: Option<BigDecimal>,
    /// Upper bound on nightly price
    pub price_max: Option<BigDecimal>,
    /// Exact property type
    pub property_type: Option<String>,
    /// One of `price_asc`, `price_desc`, `newest`
    pub sort_by: Option<String>,
    /// Page size, clamped to 1..=100 (default 20)
    pub limit: Option<i64>,
    /// Page offset (default 0)
    pub offset: Option<i64>,
}

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 100;

impl SearchParams {
    /// Effective page size.
    pub fn effective_limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    /// Effective page offset.
    pub fn effective_offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    /// The ORDER BY clause for the requested sort, a fixed literal so no
    /// request data ever reaches the query text.
    pub fn order_clause(&self) -> &'static str {
        match self.sort_by.as_deref() {
            Some("price_asc") => "price_per_night ASC, created_at DESC",
            Some("price_desc") => "price_per_night DESC, created_at DESC",
            _ => "created_at DESC",
        }
    }
}

/// Response structure for property search
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    /// The page of matching properties
    pub properties: Vec<Property>,
    /// Total number of matches across all pages
    pub total_count: i64,
}

/// One availability-ledger record: an exception for a single date.
#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityRecord {
    /// The property the record belongs to
    pub property_id: Uuid,
    /// The calendar date
    pub day: NaiveDate,
    /// Whether the date can be booked
    pub is_available: bool,
    /// Nightly price override for this date, if any
    pub price_override: Option<BigDecimal>,
}

/// One entry of an availability upsert request.
#[derive(Debug, Serialize, Deserialize)]
pub struct AvailabilityEntry {
    /// The calendar date
    pub day: NaiveDate,
    /// Whether the date can be booked
    pub is_available: bool,
    /// Nightly price override for this date
    pub price_override: Option<BigDecimal>,
}

/// Request structure for writing availability records
#[derive(Debug, Deserialize, Validate)]
pub struct UpsertAvailabilityRequest {
    /// Records to write; last write wins per (property, date)
    #[validate(length(min = 1, max = 366, message = "Between 1 and 366 entries required"))]
    pub entries: Vec<AvailabilityEntry>,
}

/// Query parameters for reading availability
#[derive(Debug, Deserialize)]
pub struct AvailabilityRangeParams {
    /// Start of the range (inclusive)
    pub from: NaiveDate,
    /// End of the range (exclusive)
    pub to: NaiveDate,
}

/// Custom error type for listing operations
#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Property not found
    #[error("Property not found")]
    NotFound,

    /// Actor is not the owning host or an admin
    #[error("Forbidden")]
    Forbidden,

    /// Invalid date range
    #[error("Invalid date range: check-out date must be after check-in date")]
    InvalidDateRange,
}

impl actix_web::ResponseError for ListingError {
    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::HttpResponse;

        match self {
            ListingError::Validation(msg) => {
                HttpResponse::BadRequest().json(envelope("VALIDATION_ERROR", msg))
            }
            ListingError::NotFound => {
                HttpResponse::NotFound().json(envelope("NOT_FOUND", "Property not found"))
            }
            ListingError::Forbidden => HttpResponse::Forbidden().json(envelope(
                "FORBIDDEN",
                "You are not allowed to modify this property",
            )),
            ListingError::InvalidDateRange => HttpResponse::BadRequest().json(envelope(
                "VALIDATION_ERROR",
                "Check-out date must be after check-in date",
            )),
            _ => HttpResponse::InternalServerError().json(envelope(
                "INTERNAL_ERROR",
                "An internal error occurred",
            )),
        }
    }
}

fn envelope(error_code: &str, message: &str) -> serde_json::Value {
    serde_json::json!({
        "success": false,
        "error_code": error_code,
        "message": message,
        "timestamp": Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_is_clamped_to_the_allowed_page_size() {
        let mut params = SearchParams::default();
        assert_eq!(params.effective_limit(), 20);

        params.limit = Some(10_000);
        assert_eq!(params.effective_limit(), 100);

        params.limit = Some(0);
        assert_eq!(params.effective_limit(), 1);
    }

    #[test]
    fn negative_offset_is_ignored() {
        let params = SearchParams {
            offset: Some(-5),
            ..Default::default()
        };
        assert_eq!(params.effective_offset(), 0);
    }

    #[test]
    fn unknown_sort_falls_back_to_newest() {
        let params = SearchParams {
            sort_by: Some("cheapest; DROP TABLE properties".to_string()),
            ..Default::default()
        };
        assert_eq!(params.order_clause(), "created_at DESC");
    }

    #[test]
    fn cancellation_policy_round_trips() {
        for policy in [
            CancellationPolicy::Flexible,
            CancellationPolicy::Moderate,
            CancellationPolicy::Strict,
        ] {
            assert_eq!(CancellationPolicy::parse(policy.as_str()), Some(policy));
        }
        assert_eq!(CancellationPolicy::parse("lenient"), None);
    }
}
