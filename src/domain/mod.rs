mod error;
mod kv;
mod metrics;
mod progress;
mod room;
mod session;
mod user;

// Publicly expose the error taxonomy
pub use error::{DomainError, DomainResult};

// Publicly expose the key-value and metrics abstractions
pub use kv::{KvPtr, KvStore};
pub use metrics::{Metrics, MetricsPtr};

// Publicly expose the persisted record types and their update shapes
pub use progress::{NewProgress, Progress, ProgressChanges, ProgressEdit, ProgressUpdate};
pub use room::{AdminTransferRule, NewRoom, Room, RoomStatus, RoomUpdate, ScoringType};
pub use session::Session;
pub use user::{NewUser, User, UserSettings, UserUpdate, UserView};
