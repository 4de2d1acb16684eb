//! Namespaces: the routes and data types of one category of endpoints.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::DuplicatePolicy;
use crate::data_type::{TypeArena, TypeId};
use crate::error::IrError;
use crate::route::Route;

/// A named group of routes and the data types they use.
///
/// Routes and data types are kept in registration order alongside a name
/// lookup. Under [`DuplicatePolicy::LastWriteWins`] a repeated name appends
/// a second entry to the ordered list while the lookup moves to the newest
/// one.
///
/// The serialized form keeps the data type lookup, since names live in the
/// arena, and drops the route lookup, which is rebuilt from the route list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "NamespaceData")]
pub struct Namespace {
    name: String,
    policy: DuplicatePolicy,
    routes: Vec<Route>,
    #[serde(skip)]
    route_by_name: HashMap<String, usize>,
    data_types: Vec<TypeId>,
    data_type_by_name: BTreeMap<String, TypeId>,
}

#[derive(Deserialize)]
struct NamespaceData {
    name: String,
    #[serde(default)]
    policy: DuplicatePolicy,
    routes: Vec<Route>,
    data_types: Vec<TypeId>,
    data_type_by_name: BTreeMap<String, TypeId>,
}

impl TryFrom<NamespaceData> for Namespace {
    type Error = IrError;

    fn try_from(data: NamespaceData) -> Result<Self, Self::Error> {
        if let Some((name, id)) = data
            .data_type_by_name
            .iter()
            .find(|(_, id)| !data.data_types.contains(*id))
        {
            return Err(IrError::Malformed(format!(
                "namespace {:?} looks up {name:?} as {id}, which is not registered",
                data.name
            )));
        }

        // Later routes win, as they did when the lookup was first built.
        let route_by_name = data
            .routes
            .iter()
            .enumerate()
            .map(|(index, route)| (route.name.clone(), index))
            .collect();

        Ok(Self {
            name: data.name,
            policy: data.policy,
            routes: data.routes,
            route_by_name,
            data_types: data.data_types,
            data_type_by_name: data.data_type_by_name,
        })
    }
}

impl Namespace {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_policy(name, DuplicatePolicy::default())
    }

    pub fn with_policy(name: impl Into<String>, policy: DuplicatePolicy) -> Self {
        Self {
            name: name.into(),
            policy,
            routes: Vec::new(),
            route_by_name: HashMap::new(),
            data_types: Vec::new(),
            data_type_by_name: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn route(&self, name: &str) -> Option<&Route> {
        self.route_by_name.get(name).map(|&i| &self.routes[i])
    }

    pub fn data_types(&self) -> &[TypeId] {
        &self.data_types
    }

    pub fn data_type(&self, name: &str) -> Option<TypeId> {
        self.data_type_by_name.get(name).copied()
    }

    pub fn add_route(&mut self, route: Route) -> Result<(), IrError> {
        if self.route_by_name.contains_key(&route.name) {
            if self.policy == DuplicatePolicy::Reject {
                return Err(IrError::DuplicateRoute {
                    namespace: self.name.clone(),
                    name: route.name,
                });
            }
            debug!(namespace = %self.name, route = %route.name, "route redefined, lookup now points at the latest definition");
        }

        self.route_by_name
            .insert(route.name.clone(), self.routes.len());
        self.routes.push(route);
        Ok(())
    }

    /// Register a named data type. Only composite types have names.
    pub fn add_data_type(&mut self, types: &TypeArena, id: TypeId) -> Result<(), IrError> {
        let Some(name) = types.get(id)?.name() else {
            return Err(IrError::UnnamedDataType(types.display_name(id)));
        };

        if self.data_type_by_name.contains_key(name) {
            if self.policy == DuplicatePolicy::Reject {
                return Err(IrError::DuplicateDataType {
                    namespace: self.name.clone(),
                    name: name.to_string(),
                });
            }
            debug!(namespace = %self.name, data_type = name, "data type redefined, lookup now points at the latest definition");
        }

        self.data_type_by_name.insert(name.to_string(), id);
        self.data_types.push(id);
        Ok(())
    }

    /// Order the namespace's data types for declaration.
    ///
    /// Every registered type appears once, and each type comes after the
    /// target of its [`DependencyLink`](crate::DependencyLink): its
    /// supertype, or for a type without one, its linked subtype. If any route
    /// uses [`TypeId::EMPTY`] it is emitted first, exactly once. Linked types
    /// that were never registered here are still emitted ahead of the types
    /// that need them.
    ///
    /// A link chain that loops back on itself fails with
    /// [`IrError::CyclicDependency`].
    pub fn linearize_data_types(&self, types: &TypeArena) -> Result<Vec<TypeId>, IrError> {
        let mut order = Vec::with_capacity(self.data_types.len() + 1);
        let mut seen = HashSet::new();

        let uses_empty = self
            .routes
            .iter()
            .any(|route| route.io_data_types().contains(&TypeId::EMPTY));
        if uses_empty {
            order.push(TypeId::EMPTY);
            seen.insert(TypeId::EMPTY);
        }

        for &id in &self.data_types {
            place_with_dependencies(types, id, &mut seen, &mut order)?;
        }

        debug!(
            namespace = %self.name,
            registered = self.data_types.len(),
            emitted = order.len(),
            "linearized data types"
        );
        Ok(order)
    }

    /// Composite types referenced by any route's request, response or error
    /// slot, looking through list wrappers. Empty, primitives and the lists
    /// themselves are never included.
    pub fn distinct_route_io_data_types(
        &self,
        types: &TypeArena,
    ) -> Result<BTreeSet<TypeId>, IrError> {
        let mut distinct = BTreeSet::new();
        for route in &self.routes {
            for id in route.io_data_types() {
                let element = types.unwrap_lists(id)?;
                if types.get(element)?.is_composite() {
                    distinct.insert(element);
                }
            }
        }
        Ok(distinct)
    }
}

/// Emit `root` after everything on its link chain that is not yet placed.
///
/// Each type has at most one link, so the unplaced prerequisites form a
/// single path. It is collected on an explicit stack and emitted deepest
/// first.
fn place_with_dependencies(
    types: &TypeArena,
    root: TypeId,
    seen: &mut HashSet<TypeId>,
    order: &mut Vec<TypeId>,
) -> Result<(), IrError> {
    if seen.contains(&root) {
        return Ok(());
    }

    let mut chain = vec![root];
    let mut on_chain = HashSet::from([root]);
    let mut current = root;

    while let Some(next) = types.get(current)?.dependency() {
        if seen.contains(&next) {
            break;
        }
        if !on_chain.insert(next) {
            let mut names: Vec<String> = chain.iter().map(|&id| types.display_name(id)).collect();
            names.push(types.display_name(next));
            return Err(IrError::CyclicDependency { chain: names });
        }
        trace!(from = %types.display_name(current), to = %types.display_name(next), "following dependency link");
        chain.push(next);
        current = next;
    }

    for id in chain.into_iter().rev() {
        seen.insert(id);
        order.push(id);
    }
    Ok(())
}
