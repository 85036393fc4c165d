//! This file serves as the root for all SeaORM entity modules.
//! We define the data models for the property management application here:
//! users (landlords and tenants), properties, units, and tenancies.

pub mod property;
pub mod tenancy;
pub mod unit;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::property::Entity as Property;
    pub use super::tenancy::Entity as Tenancy;
    pub use super::unit::Entity as Unit;
    pub use super::user::Entity as User;
}
