pub mod config;
pub mod error;
pub mod load;
pub mod logging;
pub mod schema;
pub mod store;

pub use config::{AppConfig, LoaderConfig, StoreConfig};
pub use error::LoadError;
pub use load::{ensure_loaded, LoadOutcome};
pub use schema::{ColumnSpec, StorageType, TypeTable};
pub use store::{ensure_store, open_store, rebuild_store};
