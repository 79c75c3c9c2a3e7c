pub mod config_loader;
pub mod domain;
pub mod flows;
pub mod infrastructure;

pub use domain::constants::*;
pub use domain::errors::*;
pub use domain::model::alert::*;
pub use domain::model::quote::*;
pub use domain::model::record::*;
pub use domain::model::table::*;
pub use domain::traits::*;
pub use flows::price_lake::*;
