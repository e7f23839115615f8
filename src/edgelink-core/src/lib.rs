pub mod models;

pub use models::listing::*;
pub use models::member::*;
pub use models::service::*;
