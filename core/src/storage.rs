pub mod error;
pub mod problem;
pub mod repository;

pub use error::*;
pub use problem::*;
pub use repository::*;
