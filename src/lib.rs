pub mod backends;
pub mod cache;
pub mod config;
pub mod error;
pub mod prompt;
pub mod router;
pub mod routing;

pub use config::Config;
pub use error::GatewayError;
pub use router::{QueryRequest, QueryResponse, Router};
