//! The tenancy workflow: the one multi-step operation in the system.
//!
//! Assigning a tenant inserts a tenancy row, flips the unit to occupied and
//! refreshes the property's cached occupied-unit count. The three writes
//! run in a single database transaction so callers observe them atomically,
//! and the active-tenancy precondition is checked inside that transaction,
//! which also serializes two concurrent assignments to the same unit.

use chrono::{NaiveDate, Utc};
use model::entities::{property, tenancy, unit, user};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, Set, TransactionError, TransactionTrait,
};
use thiserror::Error;
use tracing::{info, instrument};

/// Failures of the tenancy workflow, mapped to HTTP codes by the handlers.
#[derive(Error, Debug)]
pub enum TenancyError {
    #[error("Unit with id {0} does not exist")]
    UnitNotFound(i32),

    #[error("Tenant with id {0} does not exist")]
    TenantNotFound(i32),

    #[error("User with id {0} is not a tenant")]
    NotATenant(i32),

    #[error("Unit {0} already has an active tenancy")]
    UnitOccupied(i32),

    #[error("Monthly rent must be at least 1, got {0}")]
    InvalidRent(Decimal),

    #[error("Deposit amount must not be negative, got {0}")]
    InvalidDeposit(Decimal),

    #[error("Tenancy with id {0} does not exist")]
    TenancyNotFound(i32),

    #[error("Tenancy {0} has already ended")]
    AlreadyEnded(i32),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<TransactionError<TenancyError>> for TenancyError {
    fn from(err: TransactionError<TenancyError>) -> Self {
        match err {
            TransactionError::Connection(db_err) => TenancyError::Database(db_err),
            TransactionError::Transaction(err) => err,
        }
    }
}

/// Input for assigning a tenant to a unit.
#[derive(Debug, Clone, Copy)]
pub struct AssignTenant {
    pub unit_id: i32,
    pub tenant_id: i32,
    pub move_in_date: NaiveDate,
    pub monthly_rent: Decimal,
    pub deposit_amount: Decimal,
}

/// Assign a tenant to a unit.
///
/// Preconditions: the unit exists and carries no active tenancy, the tenant
/// exists and is a tenant-typed user, and the agreed rent is at least 1.
/// On success the unit is occupied and exactly one active tenancy
/// references it.
#[instrument(skip(db))]
pub async fn assign_tenant(
    db: &DatabaseConnection,
    input: AssignTenant,
) -> Result<tenancy::Model, TenancyError> {
    // Client-detectable validation runs before any database call
    if input.monthly_rent < Decimal::ONE {
        return Err(TenancyError::InvalidRent(input.monthly_rent));
    }
    if input.deposit_amount < Decimal::ZERO {
        return Err(TenancyError::InvalidDeposit(input.deposit_amount));
    }

    let created = db
        .transaction::<_, tenancy::Model, TenancyError>(move |txn| {
            Box::pin(async move {
                let unit_model = unit::Entity::find_by_id(input.unit_id)
                    .one(txn)
                    .await?
                    .ok_or(TenancyError::UnitNotFound(input.unit_id))?;

                let tenant = user::Entity::find_by_id(input.tenant_id)
                    .one(txn)
                    .await?
                    .ok_or(TenancyError::TenantNotFound(input.tenant_id))?;
                if tenant.user_type != user::UserType::Tenant {
                    return Err(TenancyError::NotATenant(tenant.id));
                }

                // Checked inside the transaction that performs the insert,
                // so two concurrent assignments cannot both pass.
                let active = tenancy::Entity::find()
                    .filter(tenancy::Column::UnitId.eq(unit_model.id))
                    .filter(tenancy::Column::Status.eq(tenancy::TenancyStatus::Active))
                    .count(txn)
                    .await?;
                if active > 0 {
                    return Err(TenancyError::UnitOccupied(unit_model.id));
                }

                let property_id = unit_model.property_id;

                let created = tenancy::ActiveModel {
                    property_id: Set(property_id),
                    unit_id: Set(unit_model.id),
                    tenant_id: Set(tenant.id),
                    move_in_date: Set(input.move_in_date),
                    move_out_date: Set(None),
                    monthly_rent: Set(input.monthly_rent),
                    deposit_amount: Set(input.deposit_amount),
                    status: Set(tenancy::TenancyStatus::Active),
                    ..Default::default()
                }
                .insert(txn)
                .await?;

                let mut unit_active: unit::ActiveModel = unit_model.into();
                unit_active.status = Set(unit::UnitStatus::Occupied);
                unit_active.update(txn).await?;

                refresh_property_count(txn, property_id).await?;

                Ok(created)
            })
        })
        .await?;

    info!(
        tenancy_id = created.id,
        unit_id = created.unit_id,
        tenant_id = created.tenant_id,
        "tenant assigned"
    );
    Ok(created)
}

/// End a tenancy: stamp the move-out date, free the unit and refresh the
/// property count, all in one transaction. Ending an already-ended
/// tenancy is an error.
#[instrument(skip(db))]
pub async fn end_tenancy(
    db: &DatabaseConnection,
    tenancy_id: i32,
) -> Result<tenancy::Model, TenancyError> {
    let ended = db
        .transaction::<_, tenancy::Model, TenancyError>(move |txn| {
            Box::pin(async move {
                let tenancy_model = tenancy::Entity::find_by_id(tenancy_id)
                    .one(txn)
                    .await?
                    .ok_or(TenancyError::TenancyNotFound(tenancy_id))?;
                if tenancy_model.status == tenancy::TenancyStatus::Ended {
                    return Err(TenancyError::AlreadyEnded(tenancy_id));
                }

                let unit_id = tenancy_model.unit_id;
                let property_id = tenancy_model.property_id;

                let mut active: tenancy::ActiveModel = tenancy_model.into();
                active.status = Set(tenancy::TenancyStatus::Ended);
                active.move_out_date = Set(Some(Utc::now().date_naive()));
                let ended = active.update(txn).await?;

                // At most one active tenancy exists per unit, so ending it
                // frees the unit. Units parked in maintenance stay there.
                if let Some(unit_model) = unit::Entity::find_by_id(unit_id).one(txn).await? {
                    if unit_model.status == unit::UnitStatus::Occupied {
                        let mut unit_active: unit::ActiveModel = unit_model.into();
                        unit_active.status = Set(unit::UnitStatus::Vacant);
                        unit_active.update(txn).await?;
                    }
                }

                refresh_property_count(txn, property_id).await?;

                Ok(ended)
            })
        })
        .await?;

    info!(tenancy_id = ended.id, unit_id = ended.unit_id, "tenancy ended");
    Ok(ended)
}

/// Re-derive a property's cached occupied-unit count from its unit rows.
async fn refresh_property_count<C>(conn: &C, property_id: i32) -> Result<(), TenancyError>
where
    C: ConnectionTrait,
{
    let property_model = property::Entity::find_by_id(property_id)
        .one(conn)
        .await?
        .ok_or_else(|| {
            TenancyError::Database(DbErr::RecordNotFound(format!(
                "property {property_id} referenced by unit is missing"
            )))
        })?;

    compute::occupancy::refresh_occupied_units(conn, property_model)
        .await
        .map_err(|err| match err {
            compute::ComputeError::Database(db_err) => TenancyError::Database(db_err),
            compute::ComputeError::NotFound(msg) => {
                TenancyError::Database(DbErr::RecordNotFound(msg))
            }
        })?;

    Ok(())
}
