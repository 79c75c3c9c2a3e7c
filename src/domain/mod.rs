pub mod constants;
pub mod errors;
pub mod model;
pub mod traits;
