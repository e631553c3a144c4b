// Order intake and lifecycle
//
// The checkout pipeline lives in service.rs; pricing math stays in
// price_calculator.rs and status transitions in status_machine.rs.

pub mod error;
pub mod handlers;
pub mod models;
pub mod price_calculator;
pub mod repository;
pub mod service;
pub mod status_machine;

pub use error::*;
pub use handlers::*;
pub use models::*;
pub use price_calculator::*;
pub use repository::*;
pub use service::*;
pub use status_machine::*;
