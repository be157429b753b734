//! Baseline schema DDL for the Tally point of sale database.
//!
//! Column identifiers are `sea_query` [`Iden`] enums so that both the
//! creation script and the versioned migrations in `tally-migrations` build
//! their statements from the same definitions. The creation script is the
//! full current-model table set; the version ledger table and the baseline
//! performance indexes are applied separately as idempotent patches.

use sea_query::{
    ColumnDef, Iden, Index, PostgresQueryBuilder, SchemaStatementBuilder, SqliteQueryBuilder,
    Table,
};

use crate::backend::BackendKind;

/// Column identifiers for the `tickets` table.
#[derive(Iden, Clone, Copy)]
pub enum Tickets {
    Table,
    Id,
    TicketNumber,
    Date,
    LastPaymentDate,
    RemainingAmount,
    TotalAmount,
    DepartmentId,
    IsClosed,
}

/// Column identifiers for the `entity_state_values` table.
#[derive(Iden, Clone, Copy)]
pub enum EntityStateValues {
    Table,
    Id,
    EntityId,
    EntityStates,
}

/// Column identifiers for the `users` table.
///
/// An empty `users` table after Ready is the standard signal that seed data
/// has not been generated yet.
#[derive(Iden, Clone, Copy)]
pub enum Users {
    Table,
    Id,
    Name,
    PinCode,
    UserRoleId,
}

/// Column identifiers for the `payment_type_maps` table.
///
/// The two legacy display columns dropped by the pre-v18 fix are not part of
/// the current model and deliberately have no identifiers here.
#[derive(Iden, Clone, Copy)]
pub enum PaymentTypeMaps {
    Table,
    Id,
    PaymentTypeId,
    TerminalId,
    DepartmentId,
    UserRoleId,
    Enabled,
}

/// Column identifiers for the `version_info` ledger table.
#[derive(Iden, Clone, Copy)]
pub enum VersionInfo {
    Table,
    Version,
}

/// Name of the ticket last-payment-date index patch target.
pub const IDX_TICKETS_LAST_PAYMENT_DATE: &str = "idx_tickets_last_payment_date";

/// Name of the unique entity-state-value index patch target.
pub const IDX_ENTITY_STATE_VALUES_ENTITY_ID: &str = "idx_entity_state_values_entity_id";

fn build(kind: BackendKind, statement: impl SchemaStatementBuilder) -> String {
    match kind {
        BackendKind::Sqlite => statement.to_string(SqliteQueryBuilder),
        BackendKind::Postgres => statement.to_string(PostgresQueryBuilder),
    }
}

/// The full baseline creation script, one statement per table, joined with
/// `;\n`. Safe to re-issue: every statement carries `IF NOT EXISTS`.
pub fn creation_script(kind: BackendKind) -> String {
    let tickets = Table::create()
        .table(Tickets::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Tickets::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(
            ColumnDef::new(Tickets::TicketNumber)
                .string()
                .string_len(20),
        )
        .col(ColumnDef::new(Tickets::Date).big_integer().not_null())
        .col(ColumnDef::new(Tickets::LastPaymentDate).big_integer())
        .col(
            ColumnDef::new(Tickets::RemainingAmount)
                .decimal()
                .not_null()
                .default(0),
        )
        .col(
            ColumnDef::new(Tickets::TotalAmount)
                .decimal()
                .not_null()
                .default(0),
        )
        .col(ColumnDef::new(Tickets::DepartmentId).integer())
        .col(
            ColumnDef::new(Tickets::IsClosed)
                .boolean()
                .not_null()
                .default(false),
        )
        .to_owned();

    let entity_state_values = Table::create()
        .table(EntityStateValues::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(EntityStateValues::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(
            ColumnDef::new(EntityStateValues::EntityId)
                .integer()
                .not_null(),
        )
        .col(ColumnDef::new(EntityStateValues::EntityStates).text())
        .to_owned();

    let users = Table::create()
        .table(Users::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Users::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(
            ColumnDef::new(Users::Name)
                .string()
                .string_len(50)
                .not_null(),
        )
        .col(ColumnDef::new(Users::PinCode).string().string_len(20))
        .col(ColumnDef::new(Users::UserRoleId).integer())
        .to_owned();

    let payment_type_maps = Table::create()
        .table(PaymentTypeMaps::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(PaymentTypeMaps::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(
            ColumnDef::new(PaymentTypeMaps::PaymentTypeId)
                .integer()
                .not_null(),
        )
        .col(ColumnDef::new(PaymentTypeMaps::TerminalId).integer())
        .col(ColumnDef::new(PaymentTypeMaps::DepartmentId).integer())
        .col(ColumnDef::new(PaymentTypeMaps::UserRoleId).integer())
        .col(
            ColumnDef::new(PaymentTypeMaps::Enabled)
                .boolean()
                .not_null()
                .default(true),
        )
        .to_owned();

    [
        build(kind, tickets),
        build(kind, entity_state_values),
        build(kind, users),
        build(kind, payment_type_maps),
    ]
    .join(";\n")
}

/// DDL for the version ledger table, applied only when the table is absent.
pub fn version_table_ddl(kind: BackendKind) -> String {
    let statement = Table::create()
        .table(VersionInfo::Table)
        .col(
            ColumnDef::new(VersionInfo::Version)
                .big_integer()
                .not_null(),
        )
        .to_owned();

    build(kind, statement)
}

/// DDL for the ticket payment-date index, applied only when the index is
/// absent and the `tickets` table exists.
pub fn tickets_last_payment_idx_ddl(kind: BackendKind) -> String {
    let statement = Index::create()
        .name(IDX_TICKETS_LAST_PAYMENT_DATE)
        .table(Tickets::Table)
        .col(Tickets::LastPaymentDate)
        .to_owned();

    build(kind, statement)
}

/// DDL for the unique entity-state index, applied only when the index is
/// absent and the `entity_state_values` table exists.
pub fn entity_state_values_entity_idx_ddl(kind: BackendKind) -> String {
    let statement = Index::create()
        .name(IDX_ENTITY_STATE_VALUES_ENTITY_ID)
        .table(EntityStateValues::Table)
        .unique()
        .col(EntityStateValues::EntityId)
        .to_owned();

    build(kind, statement)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creation_script_covers_all_baseline_tables() {
        let script = creation_script(BackendKind::Sqlite);

        for table in [
            "tickets",
            "entity_state_values",
            "users",
            "payment_type_maps",
        ] {
            assert!(script.contains(table), "missing table `{table}`");
        }
        assert!(!script.contains("version_info"));
        assert_eq!(script.matches("IF NOT EXISTS").count(), 4);
    }

    #[test]
    fn ledger_table_ddl_is_not_guarded_inline() {
        let ddl = version_table_ddl(BackendKind::Sqlite);
        assert!(ddl.contains("version_info"));
        assert!(!ddl.contains("IF NOT EXISTS"));
    }
}
