//! Migration extending tickets and payment type maps.

mod payment_type_maps;
mod tickets;

use sqlx_migrator::vec_box;

/// Migration that adds the ticket note column and the payment type index.
///
/// ## Changes
///
/// - Adds the nullable `note` column to `tickets`
/// - Creates `idx_payment_type_maps_payment_type_id` on
///   `payment_type_maps(payment_type_id)`
///
/// ## Dependencies
///
/// This migration depends on [`M0001`](crate::M0001).
pub struct M0002;

#[cfg(feature = "sqlite")]
sqlx_migrator::sqlite_migration!(
    M0002,
    "tally",
    "m0002",
    vec_box![crate::M0001],
    vec_box![
        tickets::add_note_column::Operation,
        payment_type_maps::create_payment_type_idx::Operation,
    ]
);

#[cfg(feature = "postgres")]
sqlx_migrator::postgres_migration!(
    M0002,
    "tally",
    "m0002",
    vec_box![crate::M0001],
    vec_box![
        tickets::add_note_column::Operation,
        payment_type_maps::create_payment_type_idx::Operation,
    ]
);
