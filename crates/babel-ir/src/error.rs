//! Errors raised while building or walking the IR.

use std::path::PathBuf;

use crate::data_type::TypeId;

/// Error that can occur while building or traversing the IR.
#[derive(Debug, thiserror::Error)]
pub enum IrError {
    #[error(
        "invalid API version {0:?}: expected MAJOR.MINOR[.PATCH][a|bN] with each number below 2^64"
    )]
    InvalidVersion(String),

    #[error("type arena is full: slot {0} does not fit a 32-bit type id")]
    ArenaFull(usize),

    #[error("malformed IR: {0}")]
    Malformed(String),

    #[error("unknown data type {0}")]
    UnknownDataType(TypeId),

    #[error("data type {0} has no name and cannot be registered in a namespace")]
    UnnamedDataType(String),

    #[error("data type {0} is not a composite type")]
    NotComposite(String),

    #[error("duplicate route {name:?} in namespace {namespace:?}")]
    DuplicateRoute { namespace: String, name: String },

    #[error("duplicate data type {name:?} in namespace {namespace:?}")]
    DuplicateDataType { namespace: String, name: String },

    #[error("cyclic type dependency: {}", chain.join(" -> "))]
    CyclicDependency { chain: Vec<String> },

    #[error("failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}
