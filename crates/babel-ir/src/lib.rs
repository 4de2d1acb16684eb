//! In-memory IR for the babel API definition compiler.
//!
//! An [`Api`] is a set of [`Namespace`]s. Each namespace holds [`Route`]s
//! (endpoints) and the data types they exchange. Loaders build the IR;
//! code generators read it back in an order that lets them emit every
//! declaration in one top-to-bottom pass.
//!
//! # Architecture
//!
//! ```text
//! Loader                      IR                         Generators
//! ──────────────        ─────────────────────        ──────────────────
//! parsed spec ──> TypeArena (ids) ──┐
//!                 Route ────────────┼─> Namespace ──> linearize_data_types
//!                 ApiVersion ───────┘      │      └─> distinct_route_io_data_types
//!                                          └── Api::ensure_namespace
//! ```
//!
//! # Example
//!
//! ```
//! use babel_ir::{Api, CompositeType, Route, TypeId};
//!
//! let mut api = Api::new("1.0").unwrap();
//! let types = api.types_mut();
//! let a = types.composite(CompositeType::structure("A")).unwrap();
//! let b = types.composite(CompositeType::structure("B").extends(a)).unwrap();
//!
//! api.add_data_type("files", a).unwrap();
//! api.add_data_type("files", b).unwrap();
//! api.add_route("files", Route::new("r", TypeId::EMPTY, b, TypeId::EMPTY)).unwrap();
//!
//! let ns = api.namespace("files").unwrap();
//! assert_eq!(ns.linearize_data_types(api.types()).unwrap(), vec![TypeId::EMPTY, a, b]);
//! assert!(ns.distinct_route_io_data_types(api.types()).unwrap().contains(&b));
//! ```

mod api;
mod config;
mod data_type;
mod doc;
mod error;
mod namespace;
mod route;
mod version;

pub use api::Api;
pub use config::{DuplicatePolicy, IrConfig, NamespaceConfig};
pub use data_type::{
    CompositeKind, CompositeType, DataType, DependencyLink, Field, ListType, PrimitiveType,
    TypeArena, TypeId,
};
pub use doc::doc_unwrap;
pub use error::IrError;
pub use namespace::Namespace;
pub use route::{AttrValue, Route, SourceSpan};
pub use version::{ApiVersion, PreRelease, PreReleaseStage};
