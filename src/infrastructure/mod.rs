pub mod blocks;
pub mod exchange;
pub mod lake;
pub mod notify;
