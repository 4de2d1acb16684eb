//! API endpoints.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data_type::TypeId;
use crate::doc::doc_unwrap;

/// A route attribute value as written in the specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Float(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::String(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::String(value)
    }
}

/// Where a route was defined. Kept for diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub path: Option<String>,
    pub line: u32,
    pub column: u32,
}

/// A single API endpoint.
///
/// The three data type slots hold ids that the loader has already resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub name: String,
    /// Documentation as written, including hard wraps.
    pub raw_doc: Option<String>,
    /// Documentation with soft line breaks unwrapped.
    pub doc: Option<String>,
    pub request_data_type: TypeId,
    pub response_data_type: TypeId,
    pub error_data_type: TypeId,
    pub attrs: BTreeMap<String, AttrValue>,
    pub source: Option<SourceSpan>,
}

impl Route {
    pub fn new(
        name: impl Into<String>,
        request_data_type: TypeId,
        response_data_type: TypeId,
        error_data_type: TypeId,
    ) -> Self {
        Self {
            name: name.into(),
            raw_doc: None,
            doc: None,
            request_data_type,
            response_data_type,
            error_data_type,
            attrs: BTreeMap::new(),
            source: None,
        }
    }

    pub fn with_doc(mut self, raw_doc: impl Into<String>) -> Self {
        let raw_doc = raw_doc.into();
        self.doc = doc_unwrap(Some(&raw_doc));
        self.raw_doc = Some(raw_doc);
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn with_source(mut self, source: SourceSpan) -> Self {
        self.source = Some(source);
        self
    }

    /// Request, response and error types, in that order.
    pub fn io_data_types(&self) -> [TypeId; 3] {
        [
            self.request_data_type,
            self.response_data_type,
            self.error_data_type,
        ]
    }

    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attrs.get(key)
    }
}
