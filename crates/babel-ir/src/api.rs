//! The top-level API description.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::IrConfig;
use crate::data_type::{TypeArena, TypeId};
use crate::error::IrError;
use crate::namespace::Namespace;
use crate::route::Route;
use crate::version::ApiVersion;

/// A full description of an API: its version, namespaces, and the arena
/// holding every data type the namespaces refer to.
///
/// Serializes as version, config, arena and the namespace list. Loading
/// rebuilds the namespace index and checks that every id a namespace uses
/// exists in the arena.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ApiData")]
pub struct Api {
    version: ApiVersion,
    config: IrConfig,
    types: TypeArena,
    namespaces: Vec<Namespace>,
    #[serde(skip)]
    namespace_index: HashMap<String, usize>,
}

#[derive(Deserialize)]
struct ApiData {
    version: ApiVersion,
    #[serde(default)]
    config: IrConfig,
    types: TypeArena,
    namespaces: Vec<Namespace>,
}

impl TryFrom<ApiData> for Api {
    type Error = IrError;

    fn try_from(data: ApiData) -> Result<Self, Self::Error> {
        let mut namespace_index = HashMap::with_capacity(data.namespaces.len());
        for (index, namespace) in data.namespaces.iter().enumerate() {
            if namespace_index
                .insert(namespace.name().to_string(), index)
                .is_some()
            {
                return Err(IrError::Malformed(format!(
                    "namespace {:?} appears twice",
                    namespace.name()
                )));
            }
            let route_ids = namespace.routes().iter().flat_map(Route::io_data_types);
            for id in namespace.data_types().iter().copied().chain(route_ids) {
                data.types.get(id)?;
            }
        }

        Ok(Self {
            version: data.version,
            config: data.config,
            types: data.types,
            namespaces: data.namespaces,
            namespace_index,
        })
    }
}

impl Api {
    pub fn new(version: &str) -> Result<Self, IrError> {
        Self::with_config(version, IrConfig::default())
    }

    pub fn with_config(version: &str, config: IrConfig) -> Result<Self, IrError> {
        Ok(Self {
            version: version.parse()?,
            config,
            types: TypeArena::new(),
            namespaces: Vec::new(),
            namespace_index: HashMap::new(),
        })
    }

    pub fn version(&self) -> ApiVersion {
        self.version
    }

    pub fn config(&self) -> &IrConfig {
        &self.config
    }

    pub fn types(&self) -> &TypeArena {
        &self.types
    }

    pub fn types_mut(&mut self) -> &mut TypeArena {
        &mut self.types
    }

    /// Return the namespace called `name`, creating it on first use.
    pub fn ensure_namespace(&mut self, name: &str) -> &mut Namespace {
        let index = self.namespace_slot(name);
        &mut self.namespaces[index]
    }

    pub fn namespace(&self, name: &str) -> Option<&Namespace> {
        self.namespace_index
            .get(name)
            .map(|&index| &self.namespaces[index])
    }

    /// Namespaces in creation order.
    pub fn namespaces(&self) -> impl Iterator<Item = &Namespace> {
        self.namespaces.iter()
    }

    pub fn namespace_count(&self) -> usize {
        self.namespaces.len()
    }

    /// Register a route in `namespace`, creating the namespace if needed.
    pub fn add_route(&mut self, namespace: &str, route: Route) -> Result<(), IrError> {
        self.ensure_namespace(namespace).add_route(route)
    }

    /// Register a data type from this API's arena in `namespace`, creating
    /// the namespace if needed.
    pub fn add_data_type(&mut self, namespace: &str, id: TypeId) -> Result<(), IrError> {
        let index = self.namespace_slot(namespace);
        self.namespaces[index].add_data_type(&self.types, id)
    }

    fn namespace_slot(&mut self, name: &str) -> usize {
        if let Some(&index) = self.namespace_index.get(name) {
            return index;
        }
        debug!(namespace = name, "creating namespace");
        let index = self.namespaces.len();
        self.namespaces.push(Namespace::with_policy(
            name,
            self.config.namespace.duplicates,
        ));
        self.namespace_index.insert(name.to_string(), index);
        index
    }
}
