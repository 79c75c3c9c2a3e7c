pub mod price_lake;
