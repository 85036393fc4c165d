use anyhow::Result;
use sea_orm::Database;
use tracing::{error, info};

/// Run the repair pass that re-aligns unit statuses and cached
/// occupied-unit counts with the active tenancies.
pub async fn reconcile(database_url: &str) -> Result<()> {
    info!("Reconciling unit statuses");

    let db = match Database::connect(database_url).await {
        Ok(connection) => connection,
        Err(e) => {
            error!("Failed to connect to database '{}': {}", database_url, e);
            return Err(e.into());
        }
    };

    let report = compute::reconcile::repair_unit_statuses(&db).await?;

    if report.is_clean() {
        info!("Nothing to repair; units and tenancies agree");
    } else {
        info!(
            "Repaired {} units to occupied, {} units to vacant, recounted {} properties",
            report.units_marked_occupied, report.units_marked_vacant, report.properties_recounted
        );
    }

    Ok(())
}
