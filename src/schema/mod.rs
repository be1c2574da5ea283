pub mod classify;
pub mod derive;
pub mod sanitize;
pub mod types;

pub use classify::TypeTable;
pub use derive::{create_table_sql, derive_columns, insert_sql, quote_ident};
pub use sanitize::{is_valid_identifier, resolve_identifiers, sanitize_identifier};
pub use types::{ColumnSpec, StorageType};
