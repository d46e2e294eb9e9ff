mod kv;
pub mod metrics;

// Re-export the factory functions for easy access
pub use kv::{create_memory_store, create_redis_store};
pub use metrics::{create_noop_metrics, create_prom_metrics};
