pub mod affiliate;
pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod offer;
pub mod pipeline;
pub mod rate_limiter;
pub mod scheduler;
pub mod sources;
pub mod telegram;
