use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

use super::{property, unit, user};

/// Lifecycle state of a tenancy. At most one `active` tenancy may exist
/// per unit at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum TenancyStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "ended")]
    Ended,
}

/// Time-bounded assignment of a tenant to a unit with agreed rent and
/// deposit. Created only by the tenancy workflow; it is the sole mechanism
/// that moves a unit between vacant and occupied.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tenancies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub property_id: i32,
    pub unit_id: i32,
    pub tenant_id: i32,
    pub move_in_date: NaiveDate,
    /// Stamped when the tenancy ends; null while active.
    pub move_out_date: Option<NaiveDate>,
    /// Agreed rent; invariant: monthly_rent >= 1.
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub monthly_rent: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub deposit_amount: Decimal,
    pub status: TenancyStatus,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "property::Entity",
        from = "Column::PropertyId",
        to = "property::Column::Id",
        on_delete = "Cascade"
    )]
    Property,
    #[sea_orm(
        belongs_to = "unit::Entity",
        from = "Column::UnitId",
        to = "unit::Column::Id",
        on_delete = "Cascade"
    )]
    Unit,
    #[sea_orm(
        belongs_to = "user::Entity",
        from = "Column::TenantId",
        to = "user::Column::Id",
        on_delete = "Cascade"
    )]
    Tenant,
}

impl Related<property::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Property.def()
    }
}

impl Related<unit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Unit.def()
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tenant.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
