//! Migration introducing per-order state tracking.

mod order_states;

use sqlx_migrator::vec_box;

/// Migration that creates the `order_states` table and its ticket index.
///
/// ## Changes
///
/// - Creates the `order_states` table (order state transitions per ticket)
/// - Creates `idx_order_states_ticket_id` on `order_states(ticket_id)`
pub struct M0001;

#[cfg(feature = "sqlite")]
sqlx_migrator::sqlite_migration!(
    M0001,
    "tally",
    "m0001",
    vec_box![],
    vec_box![
        order_states::create_table::Operation,
        order_states::create_ticket_idx::Operation,
    ]
);

#[cfg(feature = "postgres")]
sqlx_migrator::postgres_migration!(
    M0001,
    "tally",
    "m0001",
    vec_box![],
    vec_box![
        order_states::create_table::Operation,
        order_states::create_ticket_idx::Operation,
    ]
);
