pub mod app;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod photos;
pub mod schema;
pub mod state;
pub mod stats;
pub mod storage;
pub mod store;

pub use app::router;
pub use config::Config;
pub use schema::RecordName;
pub use state::AppState;
pub use storage::{FileStorage, KeyValuePersistence, MemoryStorage};
pub use store::ProgressStore;
