use sea_orm::entity::prelude::*;

/// Role of a user within the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum UserType {
    #[sea_orm(string_value = "landlord")]
    Landlord,
    #[sea_orm(string_value = "tenant")]
    Tenant,
}

/// Represents a person known to the system: a landlord who owns properties
/// or a tenant who can be assigned to a unit. Landlord rows are provisioned
/// by the external identity provider; tenants are managed through the API.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub email: String,
    pub phone: String,
    pub first_name: String,
    pub last_name: String,
    pub user_type: UserType,
    pub occupation: Option<String>,
    /// Kind of identity document (national id, passport, ...).
    pub id_type: Option<String>,
    pub id_number: Option<String>,
    #[sea_orm(default_value = "false")]
    pub is_verified: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Properties owned by this user (landlords only).
    #[sea_orm(has_many = "super::property::Entity")]
    Property,
    /// Tenancies held by this user (tenants only).
    #[sea_orm(has_many = "super::tenancy::Entity")]
    Tenancy,
}

impl Related<super::property::Entity> for Entity {
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
