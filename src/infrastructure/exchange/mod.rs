pub mod cryptocompare;
