use std::collections::HashMap;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::types::{
    AvailabilityEntry, AvailabilityRecord, CancellationPolicy, CreatePropertyRequest,
    ListingError, Property, PropertyPatch, SearchParams, SearchResponse,
};

const PROPERTY_COLUMNS: &str = r#"
    id, host_id, title, description, address, city, country, property_type,
    max_guests, price_per_night, currency, cancellation_policy, is_active,
    created_at, updated_at
"#;

// Shared filter for the search page and its total count. Absent filters are
// bound as NULL so the clause collapses to true.
const SEARCH_FILTER: &str = r#"
    is_active = true
    AND ($1::text IS NULL OR city ILIKE '%' || $1 || '%' OR country ILIKE '%' || $1 || '%')
    AND ($2::int IS NULL OR max_guests >= $2)
    AND ($3::numeric IS NULL OR price_per_night >= $3)
    AND ($4::numeric IS NULL OR price_per_night <= $4)
    AND ($5::text IS NULL OR property_type = $5)
    AND ($6::date IS NULL OR NOT EXISTS (
        SELECT 1 FROM property_availability a
        WHERE a.property_id = properties.id
          AND a.day >= $6 AND a.day < $7
          AND a.is_available = false
    ))
"#;

/// Service for property CRUD, search, and the availability ledger.
pub struct ListingService {
    pool: PgPool,
}

impl ListingService {
    /// Creates a new instance of `ListingService` with the provided database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a property owned by the given host.
    pub async fn create_property(
        &self,
        host_id: &Uuid,
        request: &CreatePropertyRequest,
    ) -> Result<Property, ListingError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO properties (
                host_id, title, description, address, city, country,
                property_type, max_guests, price_per_night, currency, cancellation_policy
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {PROPERTY_COLUMNS}
            "#
        ))
        .bind(host_id)
        .bind(request.title.trim())
        .bind(&request.description)
        .bind(&request.address)
        .bind(request.city.trim())
        .bind(request.country.trim())
        .bind(&request.property_type)
        .bind(request.max_guests)
        .bind(&request.price_per_night)
        .bind(request.currency.to_uppercase())
        .bind(request.cancellation_policy.as_str())
        .fetch_one(&self.pool)
        .await?;

        map_property(&row)
    }

    /// Fetches a property by id. Inactive properties stay addressable here
    /// even though search never returns them.
    pub async fn get_property(&self, property_id: &Uuid) -> Result<Property, ListingError> {
        let row = sqlx::query(&format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties WHERE id = $1"
        ))
        .bind(property_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ListingError::NotFound)?;

        map_property(&row)
    }

    /// Searches active properties with the given filters and pagination.
    pub async fn search(&self, params: &SearchParams) -> Result<SearchResponse, ListingError> {
        let (check_in, check_out) = match (params.check_in, params.check_out) {
            (Some(check_in), Some(check_out)) => {
                if check_out <= check_in {
                    return Err(ListingError::InvalidDateRange);
                }
                (Some(check_in), Some(check_out))
            }
            (None, None) => (None, None),
            _ => {
                return Err(ListingError::Validation(
                    "Both check_in and check_out are required to filter by dates".to_string(),
                ));
            }
        };

        let total_count: i64 =
            sqlx::query(&format!("SELECT COUNT(*) AS total FROM properties WHERE {SEARCH_FILTER}"))
                .bind(params.location.as_deref())
                .bind(params.guests)
                .bind(params.price_min.as_ref())
                .bind(params.price_max.as_ref())
                .bind(params.property_type.as_deref())
                .bind(check_in)
                .bind(check_out)
                .fetch_one(&self.pool)
                .await?
                .get("total");

        let rows = sqlx::query(&format!(
            r#"
            SELECT {PROPERTY_COLUMNS} FROM properties
            WHERE {SEARCH_FILTER}
            ORDER BY {order}
            LIMIT $8 OFFSET $9
            "#,
            order = params.order_clause()
        ))
        .bind(params.location.as_deref())
        .bind(params.guests)
        .bind(params.price_min.as_ref())
        .bind(params.price_max.as_ref())
        .bind(params.property_type.as_deref())
        .bind(check_in)
        .bind(check_out)
        .bind(params.effective_limit())
        .bind(params.effective_offset())
        .fetch_all(&self.pool)
        .await?;

        let properties = rows
            .iter()
            .map(map_property)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SearchResponse {
            properties,
            total_count,
        })
    }

    /// Applies a typed patch to a property. Only the owning host or an admin
    /// may modify it; absent fields keep their current values.
    pub async fn patch_property(
        &self,
        actor_id: &Uuid,
        is_admin: bool,
        property_id: &Uuid,
        patch: &PropertyPatch,
    ) -> Result<Property, ListingError> {
        self.require_owner(actor_id, is_admin, property_id).await?;

        let row = sqlx::query(&format!(
            r#"
            UPDATE properties
            SET title = COALESCE($1, title),
                description = COALESCE($2, description),
                address = COALESCE($3, address),
                city = COALESCE($4, city),
                country = COALESCE($5, country),
                property_type = COALESCE($6, property_type),
                max_guests = COALESCE($7, max_guests),
                price_per_night = COALESCE($8, price_per_night),
                currency = COALESCE($9, currency),
                cancellation_policy = COALESCE($10, cancellation_policy),
                updated_at = NOW()
            WHERE id = $11
            RETURNING {PROPERTY_COLUMNS}
            "#
        ))
        .bind(patch.title.as_deref().map(str::trim))
        .bind(patch.description.as_deref())
        .bind(patch.address.as_deref())
        .bind(patch.city.as_deref().map(str::trim))
        .bind(patch.country.as_deref().map(str::trim))
        .bind(patch.property_type.as_deref())
        .bind(patch.max_guests)
        .bind(patch.price_per_night.as_ref())
        .bind(patch.currency.as_ref().map(|c| c.to_uppercase()))
        .bind(patch.cancellation_policy.map(|p| p.as_str()))
        .bind(property_id)
        .fetch_one(&self.pool)
        .await?;

        map_property(&row)
    }

    /// Soft-deletes a property: it disappears from search but stays
    /// addressable by id.
    pub async fn deactivate_property(
        &self,
        actor_id: &Uuid,
        is_admin: bool,
        property_id: &Uuid,
    ) -> Result<(), ListingError> {
        self.require_owner(actor_id, is_admin, property_id).await?;

        sqlx::query("UPDATE properties SET is_active = false, updated_at = NOW() WHERE id = $1")
            .bind(property_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Writes availability records for a property, last write wins per date.
    pub async fn upsert_availability(
        &self,
        actor_id: &Uuid,
        is_admin: bool,
        property_id: &Uuid,
        entries: &[AvailabilityEntry],
    ) -> Result<Vec<AvailabilityRecord>, ListingError> {
        self.require_owner(actor_id, is_admin, property_id).await?;

        let mut records = Vec::with_capacity(entries.len());
        for entry in entries {
            let row = sqlx::query(
                r#"
                INSERT INTO property_availability (property_id, day, is_available, price_override)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (property_id, day) DO UPDATE SET
                    is_available = EXCLUDED.is_available,
                    price_override = EXCLUDED.price_override
                RETURNING property_id, day, is_available, price_override
                "#,
            )
            .bind(property_id)
            .bind(entry.day)
            .bind(entry.is_available)
            .bind(entry.price_override.as_ref())
            .fetch_one(&self.pool)
            .await?;

            records.push(map_availability(&row));
        }

        Ok(records)
    }

    /// Returns all ledger records overlapping the range, ascending by date.
    pub async fn query_availability(
        &self,
        property_id: &Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AvailabilityRecord>, ListingError> {
        if to <= from {
            return Err(ListingError::InvalidDateRange);
        }

        let rows = sqlx::query(
            r#"
            SELECT property_id, day, is_available, price_override
            FROM property_availability
            WHERE property_id = $1 AND day >= $2 AND day < $3
            ORDER BY day ASC
            "#,
        )
        .bind(property_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_availability).collect())
    }

    /// Whether every date in `[check_in, check_out)` can be booked. A date
    /// with no ledger record counts as available; only an explicit
    /// `is_available = false` record blocks it.
    pub async fn is_property_available(
        &self,
        property_id: &Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<bool, ListingError> {
        if check_out <= check_in {
            return Err(ListingError::InvalidDateRange);
        }

        let row = sqlx::query(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM property_availability
                WHERE property_id = $1 AND day >= $2 AND day < $3 AND is_available = false
            ) AS blocked
            "#,
        )
        .bind(property_id)
        .bind(check_in)
        .bind(check_out)
        .fetch_one(&self.pool)
        .await?;

        let blocked: bool = row.get("blocked");
        Ok(!blocked)
    }

    /// Sums the nightly price over `[check_in, check_out)`: the ledger
    /// override where one exists, the property's base price otherwise.
    pub async fn stay_subtotal(
        &self,
        property: &Property,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<BigDecimal, ListingError> {
        if check_out <= check_in {
            return Err(ListingError::InvalidDateRange);
        }

        let rows = sqlx::query(
            r#"
            SELECT day, price_override
            FROM property_availability
            WHERE property_id = $1 AND day >= $2 AND day < $3 AND price_override IS NOT NULL
            "#,
        )
        .bind(property.id)
        .bind(check_in)
        .bind(check_out)
        .fetch_all(&self.pool)
        .await?;

        let overrides: HashMap<NaiveDate, BigDecimal> = rows
            .iter()
            .map(|row| (row.get("day"), row.get("price_override")))
            .collect();

        let mut total = BigDecimal::from(0);
        let mut day = check_in;
        while day < check_out {
            total += overrides
                .get(&day)
                .cloned()
                .unwrap_or_else(|| property.price_per_night.clone());
            day = day.succ_opt().ok_or(ListingError::InvalidDateRange)?;
        }

        Ok(total)
    }

    async fn require_owner(
        &self,
        actor_id: &Uuid,
        is_admin: bool,
        property_id: &Uuid,
    ) -> Result<Property, ListingError> {
        let property = self.get_property(property_id).await?;
        if property.host_id != *actor_id && !is_admin {
            return Err(ListingError::Forbidden);
        }
        Ok(property)
    }
}

fn map_property(row: &PgRow) -> Result<Property, ListingError> {
    let policy: String = row.get("cancellation_policy");
    let cancellation_policy = CancellationPolicy::parse(&policy).ok_or_else(|| {
        ListingError::Validation(format!("Unknown cancellation policy in database: {}", policy))
    })?;

    Ok(Property {
        id: row.get("id"),
        host_id: row.get("host_id"),
        title: row.get("title"),
        description: row.get("description"),
        address: row.get("address"),
        city: row.get("city"),
        country: row.get("country"),
        property_type: row.get("property_type"),
        max_guests: row.get("max_guests"),
        price_per_night: row.get("price_per_night"),
        currency: row.get("currency"),
        cancellation_policy,
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn map_availability(row: &PgRow) -> AvailabilityRecord {
    AvailabilityRecord {
        property_id: row.get("property_id"),
        day: row.get("day"),
        is_available: row.get("is_available"),
        price_override: row.get("price_override"),
    }
}
