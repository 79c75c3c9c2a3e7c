pub mod alert;
pub mod quote;
pub mod record;
pub mod table;
