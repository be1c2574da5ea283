// src/schema/types.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage class of a destination column.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    Real,
    Integer,
    Text,
}

impl StorageType {
    /// SQL type name used in the `CREATE TABLE` statement.
    pub fn as_sql(&self) -> &'static str {
        match self {
            StorageType::Real => "REAL",
            StorageType::Integer => "INTEGER",
            StorageType::Text => "TEXT",
        }
    }

    pub fn from_sql(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "REAL" => Some(StorageType::Real),
            "INTEGER" => Some(StorageType::Integer),
            "TEXT" => Some(StorageType::Text),
            _ => None,
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A single destination column derived from one source header.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Eq, Hash)]
pub struct ColumnSpec {
    /// Header text exactly as it appeared in the file.
    pub original_header: String,
    /// Unique, store-safe identifier.
    pub sanitized_name: String,
    pub storage_type: StorageType,
}
