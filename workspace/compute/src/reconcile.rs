use std::collections::HashSet;

use common::ReconcileReport;
use model::entities::{property, tenancy, unit};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use tracing::{info, instrument, warn};

use crate::error::Result;
use crate::occupancy::refresh_occupied_units;

/// Repair pass for stores that were written outside the tenancy workflow.
///
/// An active tenancy must be matched by a unit with status `occupied`, and
/// an occupied unit must be matched by an active tenancy. Units in
/// `maintenance` with no active tenancy are left alone. After the unit
/// rows agree with the tenancies, every property's cached occupied-unit
/// count is recomputed.
#[instrument(skip(db))]
pub async fn repair_unit_statuses(db: &DatabaseConnection) -> Result<ReconcileReport> {
    let active_unit_ids: HashSet<i32> = tenancy::Entity::find()
        .filter(tenancy::Column::Status.eq(tenancy::TenancyStatus::Active))
        .all(db)
        .await?
        .into_iter()
        .map(|t| t.unit_id)
        .collect();

    let units = unit::Entity::find().all(db).await?;

    let mut marked_occupied = 0u64;
    let mut marked_vacant = 0u64;

    for unit_model in units {
        let has_active_tenancy = active_unit_ids.contains(&unit_model.id);

        match (has_active_tenancy, unit_model.status) {
            (true, unit::UnitStatus::Occupied) => {}
            (true, _) => {
                warn!(
                    unit_id = unit_model.id,
                    "unit carries an active tenancy but is not marked occupied"
                );
                let mut active: unit::ActiveModel = unit_model.into();
                active.status = Set(unit::UnitStatus::Occupied);
                active.update(db).await?;
                marked_occupied += 1;
            }
            (false, unit::UnitStatus::Occupied) => {
                warn!(
                    unit_id = unit_model.id,
                    "unit is marked occupied but no active tenancy references it"
                );
                let mut active: unit::ActiveModel = unit_model.into();
                active.status = Set(unit::UnitStatus::Vacant);
                active.update(db).await?;
                marked_vacant += 1;
            }
            (false, _) => {}
        }
    }

    let mut recounted = 0u64;
    for property_model in property::Entity::find().all(db).await? {
        let (_, changed) = refresh_occupied_units(db, property_model).await?;
        if changed {
            recounted += 1;
        }
    }

    let report = ReconcileReport {
        units_marked_occupied: marked_occupied,
        units_marked_vacant: marked_vacant,
        properties_recounted: recounted,
    };

    if report.is_clean() {
        info!("reconciliation found nothing to repair");
    } else {
        info!(?report, "reconciliation repaired inconsistent rows");
    }

    Ok(report)
}
