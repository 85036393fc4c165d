use sea_orm::entity::prelude::*;

use super::user;

/// Whether a property is currently managed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum PropertyStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
}

/// A building or plot owned by a landlord, subdivided into rentable units.
///
/// `occupied_units` is a cached count; the authoritative value is the number
/// of this property's units with status `occupied`. The tenancy workflow
/// recomputes it inside the same transaction as every status change.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "properties")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub location: String,
    /// Land registry identifier, unique per landlord.
    pub plot_id: String,
    /// The landlord who owns this property.
    pub landlord_id: i32,
    /// Declared capacity; invariant: 1 <= total_units.
    pub total_units: i32,
    #[sea_orm(default_value = "0")]
    pub occupied_units: i32,
    pub status: PropertyStatus,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A property belongs to one landlord.
    #[sea_orm(
        belongs_to = "user::Entity",
        from = "Column::LandlordId",
        to = "user::Column::Id",
        on_delete = "Cascade"
    )]
    Landlord,
    #[sea_orm(has_many = "super::unit::Entity")]
    Unit,
    #[sea_orm(has_many = "super::tenancy::Entity")]
    Tenancy,
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Landlord.def()
    }
}

impl Related<super::unit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Unit.def()
    }
}

impl Related<super::tenancy::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tenancy.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
