use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

use super::property;

/// Occupancy state of a unit. Only the tenancy workflow moves a unit
/// between `vacant` and `occupied`; `maintenance` is set by the landlord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum UnitStatus {
    #[sea_orm(string_value = "vacant")]
    Vacant,
    #[sea_orm(string_value = "occupied")]
    Occupied,
    #[sea_orm(string_value = "maintenance")]
    Maintenance,
}

/// Category of a rentable unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum UnitType {
    #[sea_orm(string_value = "bedsitter")]
    Bedsitter,
    #[sea_orm(string_value = "1BR")]
    OneBedroom,
    #[sea_orm(string_value = "2BR")]
    TwoBedroom,
    #[sea_orm(string_value = "3BR")]
    ThreeBedroom,
    #[sea_orm(string_value = "4BR")]
    FourBedroom,
    #[sea_orm(string_value = "shop")]
    Shop,
    #[sea_orm(string_value = "office")]
    Office,
    #[sea_orm(string_value = "warehouse")]
    Warehouse,
}

/// A rentable sub-space within a property.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "units")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// The property this unit belongs to.
    pub property_id: i32,
    /// Door number or label, unique within the property.
    pub unit_number: String,
    pub unit_type: UnitType,
    /// Asking rent for the unit. The agreed rent lives on the tenancy.
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub monthly_rent: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub deposit_amount: Decimal,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub status: UnitStatus,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A unit belongs to one property.
    #[sea_orm(
        belongs_to = "property::Entity",
        from = "Column::PropertyId",
        to = "property::Column::Id",
        on_delete = "Cascade"
    )]
    Property,
    #[sea_orm(has_many = "super::tenancy::Entity")]
    Tenancy,
}

impl Related<property::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Property.def()
    }
}

impl Related<super::tenancy::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tenancy.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
