pub mod create_payment_type_idx;
