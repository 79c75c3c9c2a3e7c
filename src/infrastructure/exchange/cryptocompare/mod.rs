pub mod client;
pub mod parsers;

pub use client::CryptoCompareClient;
pub use parsers::CryptoCompareParser;
