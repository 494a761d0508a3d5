pub mod api_client;
pub mod config;
pub mod dom;
pub mod errors;
pub mod layout;
pub mod storage;

pub use errors::{AppError, AppResult};
