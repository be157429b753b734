pub mod create_table;
pub mod create_ticket_idx;
