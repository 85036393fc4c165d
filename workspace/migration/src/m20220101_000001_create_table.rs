use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string(Users::Email).unique_key())
                    .col(string(Users::Phone))
                    .col(string(Users::FirstName))
                    .col(string(Users::LastName))
                    .col(string(Users::UserType))
                    .col(string_null(Users::Occupation))
                    .col(string_null(Users::IdType))
                    .col(string_null(Users::IdNumber))
                    .col(boolean(Users::IsVerified).default(false))
                    .to_owned(),
            )
            .await?;

        // Create properties table
        manager
            .create_table(
                Table::create()
                    .table(Properties::Table)
                    .if_not_exists()
                    .col(pk_auto(Properties::Id))
                    .col(string(Properties::Name))
                    .col(string(Properties::Location))
                    .col(string(Properties::PlotId))
                    .col(integer(Properties::LandlordId))
                    .col(integer(Properties::TotalUnits))
                    .col(integer(Properties::OccupiedUnits).default(0))
                    .col(string(Properties::Status))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_property_landlord")
                            .from(Properties::Table, Properties::LandlordId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // A plot id identifies a property uniquely within one landlord's holdings
        manager
            .create_index(
                Index::create()
                    .name("idx_properties_landlord_plot")
                    .table(Properties::Table)
                    .col(Properties::LandlordId)
                    .col(Properties::PlotId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create units table
        manager
            .create_table(
                Table::create()
                    .table(Units::Table)
                    .if_not_exists()
                    .col(pk_auto(Units::Id))
                    .col(integer(Units::PropertyId))
                    .col(string(Units::UnitNumber))
                    .col(string(Units::UnitType))
                    .col(decimal(Units::MonthlyRent).decimal_len(12, 2))
                    .col(decimal(Units::DepositAmount).decimal_len(12, 2))
                    .col(integer(Units::Bedrooms))
                    .col(integer(Units::Bathrooms))
                    .col(string(Units::Status))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_unit_property")
                            .from(Units::Table, Units::PropertyId)
                            .to(Properties::Table, Properties::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unit numbers repeat across properties but not within one
        manager
            .create_index(
                Index::create()
                    .name("idx_units_property_number")
                    .table(Units::Table)
                    .col(Units::PropertyId)
                    .col(Units::UnitNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create tenancies table
        manager
            .create_table(
                Table::create()
                    .table(Tenancies::Table)
                    .if_not_exists()
                    .col(pk_auto(Tenancies::Id))
                    .col(integer(Tenancies::PropertyId))
                    .col(integer(Tenancies::UnitId))
                    .col(integer(Tenancies::TenantId))
                    .col(date(Tenancies::MoveInDate))
                    .col(date_null(Tenancies::MoveOutDate))
                    .col(decimal(Tenancies::MonthlyRent).decimal_len(12, 2))
                    .col(decimal(Tenancies::DepositAmount).decimal_len(12, 2))
                    .col(string(Tenancies::Status))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tenancy_property")
                            .from(Tenancies::Table, Tenancies::PropertyId)
                            .to(Properties::Table, Properties::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tenancy_unit")
                            .from(Tenancies::Table, Tenancies::UnitId)
                            .to(Units::Table, Units::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tenancy_tenant")
                            .from(Tenancies::Table, Tenancies::TenantId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // The workflow looks tenancies up by (unit, status) on every assign
        manager
            .create_index(
                Index::create()
                    .name("idx_tenancies_unit_status")
                    .table(Tenancies::Table)
                    .col(Tenancies::UnitId)
                    .col(Tenancies::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Tenancies::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Units::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Properties::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    Phone,
    FirstName,
    LastName,
    UserType,
    Occupation,
    IdType,
    IdNumber,
    IsVerified,
}

#[derive(DeriveIden)]
enum Properties {
    Table,
    Id,
    Name,
    Location,
    PlotId,
    LandlordId,
    TotalUnits,
    OccupiedUnits,
    Status,
}

#[derive(DeriveIden)]
enum Units {
    Table,
    Id,
    PropertyId,
    UnitNumber,
    UnitType,
    MonthlyRent,
    DepositAmount,
    Bedrooms,
    Bathrooms,
    Status,
}

#[derive(DeriveIden)]
enum Tenancies {
    Table,
    Id,
    PropertyId,
    UnitId,
    TenantId,
    MoveInDate,
    MoveOutDate,
    MonthlyRent,
    DepositAmount,
    Status,
}
