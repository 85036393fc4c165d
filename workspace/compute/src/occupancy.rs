use common::{PortfolioSummary, PropertyOccupancy};
use model::entities::{property, tenancy, unit};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
};
use tracing::instrument;

use crate::error::Result;

/// Percentage of units occupied, rounded to the nearest whole number.
/// Defined as 0 when the property declares no units.
pub fn occupancy_rate(occupied_units: i64, total_units: i64) -> u32 {
    if total_units <= 0 {
        return 0;
    }
    let occupied = occupied_units.clamp(0, total_units);
    ((occupied as f64 / total_units as f64) * 100.0).round() as u32
}

/// Occupancy snapshot for a property, read from the cached row counts.
pub fn property_occupancy(property: &property::Model) -> PropertyOccupancy {
    PropertyOccupancy {
        property_id: property.id,
        total_units: property.total_units,
        occupied_units: property.occupied_units,
        occupancy_rate: occupancy_rate(property.occupied_units as i64, property.total_units as i64),
    }
}

/// Authoritative occupied-unit count for a property: the number of its
/// units whose status is `occupied`. The cached `occupied_units` column
/// is derived from this inside the same transaction as every workflow
/// write.
pub async fn recount_occupied_units<C>(conn: &C, property_id: i32) -> Result<i32>
where
    C: ConnectionTrait,
{
    let count = unit::Entity::find()
        .filter(unit::Column::PropertyId.eq(property_id))
        .filter(unit::Column::Status.eq(unit::UnitStatus::Occupied))
        .count(conn)
        .await?;
    Ok(count as i32)
}

/// Recount a property's occupied units and write the cached column if it
/// drifted. Returns the fresh count and whether the row was corrected.
pub async fn refresh_occupied_units<C>(conn: &C, property: property::Model) -> Result<(i32, bool)>
where
    C: ConnectionTrait,
{
    use sea_orm::{ActiveModelTrait, Set};

    let count = recount_occupied_units(conn, property.id).await?;
    if property.occupied_units == count {
        return Ok((count, false));
    }

    let mut active: property::ActiveModel = property.into();
    active.occupied_units = Set(count);
    active.update(conn).await?;
    Ok((count, true))
}

/// Dashboard reduction over all properties, optionally scoped to one
/// landlord. Recomputed per request; nothing here is cached.
#[instrument(skip(db))]
pub async fn portfolio_summary(
    db: &DatabaseConnection,
    landlord_id: Option<i32>,
) -> Result<PortfolioSummary> {
    let mut property_query = property::Entity::find();
    if let Some(landlord_id) = landlord_id {
        property_query = property_query.filter(property::Column::LandlordId.eq(landlord_id));
    }
    let properties = property_query.all(db).await?;

    let total_units: i64 = properties.iter().map(|p| p.total_units as i64).sum();
    let occupied_units: i64 = properties.iter().map(|p| p.occupied_units as i64).sum();

    let property_ids: Vec<i32> = properties.iter().map(|p| p.id).collect();
    let active_tenancies = if property_ids.is_empty() {
        Vec::new()
    } else {
        tenancy::Entity::find()
            .filter(tenancy::Column::PropertyId.is_in(property_ids))
            .filter(tenancy::Column::Status.eq(tenancy::TenancyStatus::Active))
            .all(db)
            .await?
    };

    let monthly_rent_roll: Decimal = active_tenancies.iter().map(|t| t.monthly_rent).sum();

    Ok(PortfolioSummary {
        total_properties: properties.len() as u64,
        total_units,
        occupied_units,
        vacant_units: total_units - occupied_units,
        active_tenancies: active_tenancies.len() as u64,
        occupancy_rate: occupancy_rate(occupied_units, total_units),
        monthly_rent_roll,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_is_zero_for_empty_property() {
        assert_eq!(occupancy_rate(0, 0), 0);
        assert_eq!(occupancy_rate(5, 0), 0);
        assert_eq!(occupancy_rate(0, -1), 0);
    }

    #[test]
    fn test_rate_rounds_to_nearest_percent() {
        assert_eq!(occupancy_rate(0, 10), 0);
        assert_eq!(occupancy_rate(3, 10), 30);
        assert_eq!(occupancy_rate(10, 10), 100);
        // 1/3 = 33.33... rounds down, 2/3 = 66.67... rounds up
        assert_eq!(occupancy_rate(1, 3), 33);
        assert_eq!(occupancy_rate(2, 3), 67);
        // exact halves round up, matching the dashboard display
        assert_eq!(occupancy_rate(1, 8), 13);
    }

    #[test]
    fn test_rate_clamps_drifted_counts() {
        // A cached count can momentarily exceed the declared capacity if
        // the row was edited by hand; the rate never reports over 100.
        assert_eq!(occupancy_rate(12, 10), 100);
        assert_eq!(occupancy_rate(-3, 10), 0);
    }
}
