//! service-core: error type, config loading, tracing setup and request-id
//! middleware shared by the bookkeeping binaries.
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;
