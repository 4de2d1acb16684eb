//! Data type definitions and the arena that owns them.
//!
//! Every data type in an API lives in a [`TypeArena`] and is referred to by
//! its [`TypeId`]. Routes and composite types never own the types they
//! reference; they store ids. The id is also the identity used by the
//! namespace algorithms when de-duplicating.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::IrError;

/// Stable index of a data type inside a [`TypeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(u32);

impl TypeId {
    /// The "no payload" marker. Every arena reserves slot 0 for it.
    pub const EMPTY: TypeId = TypeId(0);

    /// Id for an arena slot. Ids are `u32`, so an arena holds at most
    /// `u32::MAX + 1` types.
    pub fn from_index(index: usize) -> Result<Self, IrError> {
        u32::try_from(index)
            .map(TypeId)
            .map_err(|_| IrError::ArenaFull(index))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn is_empty(self) -> bool {
        self == Self::EMPTY
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A data type that a route or field can reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DataType {
    /// No payload. There is exactly one, at [`TypeId::EMPTY`].
    Empty,
    Primitive(PrimitiveType),
    /// User-defined struct or union.
    Composite(CompositeType),
    /// A sequence of another data type. Never named, never declared on its own.
    List(ListType),
}

impl DataType {
    /// Declared name. Only composite types have one.
    pub fn name(&self) -> Option<&str> {
        match self {
            DataType::Composite(composite) => Some(&composite.name),
            _ => None,
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, DataType::Composite(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, DataType::List(_))
    }

    pub fn as_composite(&self) -> Option<&CompositeType> {
        match self {
            DataType::Composite(composite) => Some(composite),
            _ => None,
        }
    }

    /// The type this one must be declared after, if any.
    pub fn dependency(&self) -> Option<TypeId> {
        self.as_composite().and_then(|c| c.link.target())
    }

    /// Every id this type refers to directly.
    fn references(&self) -> Vec<TypeId> {
        match self {
            DataType::Empty | DataType::Primitive(_) => Vec::new(),
            DataType::List(list) => vec![list.data_type],
            DataType::Composite(composite) => composite
                .fields
                .iter()
                .map(|f| f.data_type)
                .chain(composite.link.target())
                .collect(),
        }
    }
}

/// Built-in atomic types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PrimitiveType {
    Binary,
    Boolean,
    Float32,
    Float64,
    Int32,
    Int64,
    #[serde(rename = "uint32")]
    UInt32,
    #[serde(rename = "uint64")]
    UInt64,
    String,
    /// Timestamp with its strftime-style wire format.
    Timestamp { format: String },
}

impl PrimitiveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveType::Binary => "Binary",
            PrimitiveType::Boolean => "Boolean",
            PrimitiveType::Float32 => "Float32",
            PrimitiveType::Float64 => "Float64",
            PrimitiveType::Int32 => "Int32",
            PrimitiveType::Int64 => "Int64",
            PrimitiveType::UInt32 => "UInt32",
            PrimitiveType::UInt64 => "UInt64",
            PrimitiveType::String => "String",
            PrimitiveType::Timestamp { .. } => "Timestamp",
        }
    }
}

/// Struct or union.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompositeKind {
    Struct,
    Union,
}

/// The single inheritance edge a composite type may carry.
///
/// The linearizer places the link target before the type itself. A
/// supertype link means "parent before child"; a subtype link means "this
/// child before me". A type never carries both, so the walk from any type is
/// a simple path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "link", content = "target", rename_all = "snake_case")]
pub enum DependencyLink {
    #[default]
    None,
    /// The type this one extends.
    Supertype(TypeId),
    /// A type that extends this one.
    Subtype(TypeId),
}

impl DependencyLink {
    pub fn target(&self) -> Option<TypeId> {
        match self {
            DependencyLink::None => None,
            DependencyLink::Supertype(id) | DependencyLink::Subtype(id) => Some(*id),
        }
    }
}

/// A user-defined struct or union.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeType {
    pub name: String,
    pub kind: CompositeKind,
    pub doc: Option<String>,
    pub fields: Vec<Field>,
    pub link: DependencyLink,
}

impl CompositeType {
    pub fn structure(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: CompositeKind::Struct,
            doc: None,
            fields: Vec::new(),
            link: DependencyLink::None,
        }
    }

    pub fn union(name: impl Into<String>) -> Self {
        Self {
            kind: CompositeKind::Union,
            ..Self::structure(name)
        }
    }

    pub fn extends(mut self, supertype: TypeId) -> Self {
        self.link = DependencyLink::Supertype(supertype);
        self
    }

    pub fn extended_by(mut self, subtype: TypeId) -> Self {
        self.link = DependencyLink::Subtype(subtype);
        self
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn supertype(&self) -> Option<TypeId> {
        match self.link {
            DependencyLink::Supertype(id) => Some(id),
            _ => None,
        }
    }

    pub fn subtype(&self) -> Option<TypeId> {
        match self.link {
            DependencyLink::Subtype(id) => Some(id),
            _ => None,
        }
    }
}

/// A field of a composite type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub data_type: TypeId,
    pub doc: Option<String>,
    pub optional: bool,
}

impl Field {
    pub fn required(name: impl Into<String>, data_type: TypeId) -> Self {
        Self {
            name: name.into(),
            data_type,
            doc: None,
            optional: false,
        }
    }

    pub fn optional(name: impl Into<String>, data_type: TypeId) -> Self {
        Self {
            optional: true,
            ..Self::required(name, data_type)
        }
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }
}

/// A list of another data type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListType {
    pub data_type: TypeId,
    pub min_items: Option<u32>,
    pub max_items: Option<u32>,
}

impl ListType {
    pub fn of(data_type: TypeId) -> Self {
        Self {
            data_type,
            min_items: None,
            max_items: None,
        }
    }
}

/// Append-only storage for every data type of an API.
///
/// Slot 0 always holds [`DataType::Empty`]. Primitive types are interned so
/// equal primitives share an id. Serialized as the slot list alone; the
/// primitive index is rebuilt on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "TypeArenaData")]
pub struct TypeArena {
    types: Vec<DataType>,
    #[serde(skip)]
    primitives: HashMap<PrimitiveType, TypeId>,
}

#[derive(Deserialize)]
struct TypeArenaData {
    types: Vec<DataType>,
}

impl TryFrom<TypeArenaData> for TypeArena {
    type Error = IrError;

    fn try_from(data: TypeArenaData) -> Result<Self, Self::Error> {
        if data.types.first() != Some(&DataType::Empty) {
            return Err(IrError::Malformed(
                "type arena slot 0 must hold Empty".into(),
            ));
        }
        let len = data.types.len();
        TypeId::from_index(len - 1)?;

        let mut primitives = HashMap::new();
        for (index, data_type) in data.types.iter().enumerate().skip(1) {
            let id = TypeId::from_index(index)?;
            let dangling = data_type.references().into_iter().find(|r| r.index() >= len);
            if let Some(dangling) = dangling {
                return Err(IrError::UnknownDataType(dangling));
            }
            match data_type {
                DataType::Empty => {
                    return Err(IrError::Malformed(format!("Empty stored again at {id}")));
                }
                DataType::Primitive(primitive) => {
                    if primitives.insert(primitive.clone(), id).is_some() {
                        return Err(IrError::Malformed(format!(
                            "primitive {} stored twice",
                            primitive.as_str()
                        )));
                    }
                }
                _ => {}
            }
        }

        Ok(Self {
            types: data.types,
            primitives,
        })
    }
}

impl Default for TypeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeArena {
    pub fn new() -> Self {
        Self {
            types: vec![DataType::Empty],
            primitives: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// True when nothing beyond the reserved `Empty` slot has been added.
    pub fn is_empty(&self) -> bool {
        self.types.len() == 1
    }

    /// Add a data type and return its id.
    ///
    /// Every id the type references must already be in the arena. Adding
    /// `Empty` returns [`TypeId::EMPTY`]; adding a primitive that is already
    /// present returns the existing id.
    pub fn insert(&mut self, data_type: DataType) -> Result<TypeId, IrError> {
        match data_type {
            DataType::Empty => Ok(TypeId::EMPTY),
            DataType::Primitive(primitive) => self.primitive(primitive),
            data_type => {
                for referenced in data_type.references() {
                    self.get(referenced)?;
                }
                self.push(data_type)
            }
        }
    }

    /// Id of a primitive type, interning it on first use.
    pub fn primitive(&mut self, primitive: PrimitiveType) -> Result<TypeId, IrError> {
        if let Some(id) = self.primitives.get(&primitive) {
            return Ok(*id);
        }
        let id = self.push(DataType::Primitive(primitive.clone()))?;
        self.primitives.insert(primitive, id);
        Ok(id)
    }

    pub fn composite(&mut self, composite: CompositeType) -> Result<TypeId, IrError> {
        self.insert(DataType::Composite(composite))
    }

    pub fn list(&mut self, list: ListType) -> Result<TypeId, IrError> {
        self.insert(DataType::List(list))
    }

    /// Wrap a type in a list with no size bounds.
    pub fn list_of(&mut self, data_type: TypeId) -> Result<TypeId, IrError> {
        self.list(ListType::of(data_type))
    }

    /// Resolve an inheritance edge after both types exist.
    ///
    /// Loaders allocate types before resolving `extends` clauses that point
    /// forward, so links can be set late. Both ends must be composite. The
    /// arena does not reject cycles formed this way; the linearizer does.
    pub fn set_link(&mut self, id: TypeId, link: DependencyLink) -> Result<(), IrError> {
        if let Some(target) = link.target() {
            if !self.get(target)?.is_composite() {
                return Err(IrError::NotComposite(self.display_name(target)));
            }
        }
        let display = self.display_name(id);
        match self.types.get_mut(id.index()) {
            Some(DataType::Composite(composite)) => {
                composite.link = link;
                Ok(())
            }
            Some(_) => Err(IrError::NotComposite(display)),
            None => Err(IrError::UnknownDataType(id)),
        }
    }

    pub fn get(&self, id: TypeId) -> Result<&DataType, IrError> {
        self.types
            .get(id.index())
            .ok_or(IrError::UnknownDataType(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &DataType)> {
        // push and deserialization keep every index within u32.
        self.types
            .iter()
            .enumerate()
            .map(|(i, data_type)| (TypeId(i as u32), data_type))
    }

    /// Follow list wrappers down to the element type.
    pub fn unwrap_lists(&self, mut id: TypeId) -> Result<TypeId, IrError> {
        while let DataType::List(list) = self.get(id)? {
            id = list.data_type;
        }
        Ok(id)
    }

    /// Human-readable name used in logs and errors, e.g. `List(String)`.
    pub fn display_name(&self, id: TypeId) -> String {
        match self.types.get(id.index()) {
            None => id.to_string(),
            Some(DataType::Empty) => "Empty".to_string(),
            Some(DataType::Primitive(primitive)) => primitive.as_str().to_string(),
            Some(DataType::Composite(composite)) => composite.name.clone(),
            Some(DataType::List(list)) => format!("List({})", self.display_name(list.data_type)),
        }
    }

    fn push(&mut self, data_type: DataType) -> Result<TypeId, IrError> {
        let id = TypeId::from_index(self.types.len())?;
        self.types.push(data_type);
        Ok(id)
    }
}
