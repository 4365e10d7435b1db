// Shared framework for data-synchronization connectors

// Error taxonomy and HTTP rendering
pub mod error;

// Server settings (defaults, TOML file, environment)
pub mod config;

// Result envelope, request and metadata types
pub mod synchronizer;

// Connector descriptor (`GET /`)
pub mod descriptor;

// Connector trait implemented by each vendor crate
pub mod connector;

// Generic router and middleware
pub mod api;

// Bounded pool of in-flight vendor calls
pub mod limiter;

pub mod shutdown;
pub mod telemetry;

pub use config::ServerConfig;
pub use connector::{Connector, ResourceStream, ValidatedAccount};
pub use error::{AppError, Result};
pub use limiter::ConcurrencyLimiter;
pub use synchronizer::{
    synchronization_type, DataQuery, Pagination, SynchronizationType, SynchronizerData,
};
