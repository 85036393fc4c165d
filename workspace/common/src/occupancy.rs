use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Occupancy snapshot for a single property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PropertyOccupancy {
    pub property_id: i32,
    pub total_units: i32,
    pub occupied_units: i32,
    /// Percentage of units occupied, rounded to the nearest whole number.
    /// 0 when the property declares no units.
    pub occupancy_rate: u32,
}

/// Dashboard reduction over every property of a landlord (or the whole
/// portfolio when no landlord filter is given).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PortfolioSummary {
    pub total_properties: u64,
    pub total_units: i64,
    pub occupied_units: i64,
    pub vacant_units: i64,
    pub active_tenancies: u64,
    /// Portfolio-wide occupancy percentage, rounded.
    pub occupancy_rate: u32,
    /// Sum of agreed rents over active tenancies.
    pub monthly_rent_roll: Decimal,
}

/// Outcome of a reconciliation pass over unit statuses and cached
/// occupied-unit counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReconcileReport {
    /// Units flipped to occupied because an active tenancy references them.
    pub units_marked_occupied: u64,
    /// Units flipped to vacant because no active tenancy references them.
    pub units_marked_vacant: u64,
    /// Properties whose cached occupied_units was corrected.
    pub properties_recounted: u64,
}

impl ReconcileReport {
    /// True when the pass found nothing to repair.
    pub fn is_clean(&self) -> bool {
        self.units_marked_occupied == 0
            && self.units_marked_vacant == 0
            && self.properties_recounted == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_occupancy_roundtrip() {
        let occupancy = PropertyOccupancy {
            property_id: 7,
            total_units: 10,
            occupied_units: 3,
            occupancy_rate: 30,
        };

        let json = serde_json::to_string(&occupancy).unwrap();
        let back: PropertyOccupancy = serde_json::from_str(&json).unwrap();
        assert_eq!(back, occupancy);
    }

    #[test]
    fn test_reconcile_report_is_clean() {
        let clean = ReconcileReport {
            units_marked_occupied: 0,
            units_marked_vacant: 0,
            properties_recounted: 0,
        };
        assert!(clean.is_clean());

        let dirty = ReconcileReport {
            units_marked_occupied: 1,
            ..clean.clone()
        };
        assert!(!dirty.is_clean());
    }
}
