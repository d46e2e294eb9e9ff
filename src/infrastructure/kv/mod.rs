mod memory_store;
mod redis_store;

// Re-export the factory functions for easy access
pub use memory_store::create_memory_store;
pub use redis_store::create_redis_store;
