pub mod account_id;
pub mod account_kind;
pub mod email;
pub mod token_id;
