pub mod client;
pub mod config;
pub mod endpoints;
pub mod errors;
pub mod exchange;
pub mod http;
pub mod models;
pub mod transport;

pub use client::CatClient;
pub use config::CatConfig;
pub use errors::{CatError, CatResult};
pub use models::message::{Message, Response};
