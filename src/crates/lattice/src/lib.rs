//! Named type lattice used to decide which produced values may feed which inputs.
//!
//! Every lattice starts with a single root type (`Object`). Each further type lists the parents
//! it extends; the root is always injected as the first parent. A value of type `A` may be used
//! wherever `B` is required iff `A == B` or `B` is reachable from `A` through parent links.
//! Narrowing (ancestor to descendant) is never implicit: it requires a [`Downcast`] step to be
//! registered as a function.

use std::collections::{HashMap, HashSet};
use std::fmt;

use thiserror::Error;

/// Name given to the root of every lattice.
pub const ROOT_NAME: &str = "Object";

/// Handle to a type registered in a [`TypeLattice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DataTypeId(pub(crate) u32);

impl DataTypeId {
    /// The root type of any lattice.
    pub const ROOT: DataTypeId = DataTypeId(0);

    pub fn from_raw(value: u32) -> Self {
        Self(value)
    }

    pub fn raw(&self) -> u32 {
        self.0
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for DataTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type({})", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LatticeError {
    #[error("a type named '{0}' already exists")]
    DuplicateTypeName(String),
    #[error("type '{0}' lists the root type as an explicit parent")]
    InvalidParent(String),
    #[error("parent {0} is not registered in this lattice")]
    UnknownParent(DataTypeId),
}

/// A named node of the lattice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataType {
    id: DataTypeId,
    name: String,
    // root first, then declared parents in declaration order
    parents: Vec<DataTypeId>,
}

impl DataType {
    pub fn id(&self) -> DataTypeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parents of this type, the root included. Empty only for the root itself.
    pub fn parents(&self) -> &[DataTypeId] {
        &self.parents
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataType({})", self.name)
    }
}

/// A narrowing edge: a passthrough step from `parent` to `child`.
///
/// The lattice only describes the edge. It takes effect once it is wrapped as a function and
/// registered with an environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Downcast {
    pub parent: DataTypeId,
    pub child: DataTypeId,
}

/// Owns every [`DataType`] and answers compatibility queries.
///
/// Types are only ever appended, and a type may only name parents that already exist, so the
/// parent relation is a DAG rooted at [`DataTypeId::ROOT`] by construction.
#[derive(Debug, Clone)]
pub struct TypeLattice {
    types: Vec<DataType>,
    by_name: HashMap<String, DataTypeId>,
}

impl Default for TypeLattice {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeLattice {
    /// Create a lattice holding only the root type.
    pub fn new() -> Self {
        let root = DataType {
            id: DataTypeId::ROOT,
            name: ROOT_NAME.to_string(),
            parents: Vec::new(),
        };
        let mut by_name = HashMap::new();
        by_name.insert(ROOT_NAME.to_string(), DataTypeId::ROOT);
        Self {
            types: vec![root],
            by_name,
        }
    }

    /// Register a new type extending `parents`. The root is added as a parent automatically and
    /// must not be listed.
    pub fn add_type(
        &mut self,
        name: impl Into<String>,
        parents: &[DataTypeId],
    ) -> Result<DataTypeId, LatticeError> {
        let name = name.into();
        if parents.contains(&DataTypeId::ROOT) {
            return Err(LatticeError::InvalidParent(name));
        }
        if self.by_name.contains_key(&name) {
            return Err(LatticeError::DuplicateTypeName(name));
        }
        if let Some(unknown) = parents.iter().find(|p| !self.contains(**p)) {
            return Err(LatticeError::UnknownParent(*unknown));
        }

        let id = DataTypeId(self.types.len() as u32);
        let mut all_parents = Vec::with_capacity(parents.len() + 1);
        all_parents.push(DataTypeId::ROOT);
        for parent in parents {
            // listing the same parent twice adds nothing
            if !all_parents.contains(parent) {
                all_parents.push(*parent);
            }
        }

        log::trace!("lattice: {} = {} extends {:?}", id, name, all_parents);
        self.by_name.insert(name.clone(), id);
        self.types.push(DataType {
            id,
            name,
            parents: all_parents,
        });
        Ok(id)
    }

    pub fn root(&self) -> &DataType {
        &self.types[0]
    }

    pub fn get(&self, id: DataTypeId) -> Option<&DataType> {
        self.types.get(id.index())
    }

    /// Look a type up by its name.
    pub fn find(&self, name: &str) -> Option<DataTypeId> {
        self.by_name.get(name).copied()
    }

    /// Name of `id`, or `"?"` for ids from another lattice.
    pub fn name(&self, id: DataTypeId) -> &str {
        self.get(id).map(DataType::name).unwrap_or("?")
    }

    pub fn contains(&self, id: DataTypeId) -> bool {
        id.index() < self.types.len()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Never true: the root is always present.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DataType> {
        self.types.iter()
    }

    /// Whether a value of type `source` may be used where `target` is required.
    ///
    /// Reflexive and transitive along parent links, not symmetric.
    pub fn can_connect_to(&self, source: DataTypeId, target: DataTypeId) -> bool {
        if source == target {
            return true;
        }
        if !self.contains(source) || !self.contains(target) {
            return false;
        }

        let mut visited = HashSet::new();
        let mut stack = vec![source];
        while let Some(cur) = stack.pop() {
            if cur == target {
                return true;
            }
            if !visited.insert(cur) {
                continue;
            }
            stack.extend(self.types[cur.index()].parents.iter().copied());
        }
        false
    }

    /// Every strict ancestor of `id`, breadth-first, each listed once.
    pub fn ancestors(&self, id: DataTypeId) -> Vec<DataTypeId> {
        let mut out = Vec::new();
        let Some(ty) = self.get(id) else {
            return out;
        };
        let mut queue: std::collections::VecDeque<DataTypeId> =
            ty.parents.iter().rev().copied().collect();
        let mut seen = HashSet::new();
        while let Some(cur) = queue.pop_front() {
            if !seen.insert(cur) {
                continue;
            }
            out.push(cur);
            queue.extend(self.types[cur.index()].parents.iter().rev().copied());
        }
        out
    }

    /// One narrowing edge per declared `(child, parent)` pair, the implicit root edges included.
    pub fn generate_downcasts(&self) -> Vec<Downcast> {
        let downcasts: Vec<Downcast> = self
            .types
            .iter()
            .flat_map(|ty| {
                ty.parents.iter().map(move |parent| Downcast {
                    parent: *parent,
                    child: ty.id,
                })
            })
            .collect();
        log::debug!("lattice: generated {} downcast edges", downcasts.len());
        downcasts
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn number_lattice() -> (TypeLattice, DataTypeId, DataTypeId) {
        let mut lattice = TypeLattice::new();
        let number = lattice.add_type("Number", &[]).unwrap();
        let integer = lattice.add_type("Integer", &[number]).unwrap();
        (lattice, number, integer)
    }

    #[test]
    fn test_root_is_only_parentless_type() {
        let (lattice, number, integer) = number_lattice();
        assert!(lattice.root().is_root());
        assert_eq!(lattice.root().name(), ROOT_NAME);
        assert_eq!(lattice.get(number).unwrap().parents(), &[DataTypeId::ROOT]);
        assert_eq!(
            lattice.get(integer).unwrap().parents(),
            &[DataTypeId::ROOT, number]
        );
        assert_eq!(lattice.iter().filter(|t| t.is_root()).count(), 1);
    }

    #[test]
    fn test_upcast_but_not_downcast() {
        let (lattice, number, integer) = number_lattice();
        let root = DataTypeId::ROOT;

        assert!(lattice.can_connect_to(integer, root));
        assert!(lattice.can_connect_to(integer, number));
        assert!(lattice.can_connect_to(number, root));
        assert!(!lattice.can_connect_to(root, integer));
        assert!(!lattice.can_connect_to(number, integer));
    }

    #[test]
    fn test_siblings_do_not_connect() {
        let mut lattice = TypeLattice::new();
        let shape = lattice.add_type("Shape", &[]).unwrap();
        let circle = lattice.add_type("Circle", &[shape]).unwrap();
        let square = lattice.add_type("Square", &[shape]).unwrap();

        assert!(!lattice.can_connect_to(circle, square));
        assert!(!lattice.can_connect_to(square, circle));
        assert!(lattice.can_connect_to(circle, shape));
    }

    #[test]
    fn test_multiple_parents() {
        let mut lattice = TypeLattice::new();
        let named = lattice.add_type("Named", &[]).unwrap();
        let sized = lattice.add_type("Sized", &[]).unwrap();
        let file = lattice.add_type("File", &[named, sized]).unwrap();

        assert!(lattice.can_connect_to(file, named));
        assert!(lattice.can_connect_to(file, sized));
        assert!(!lattice.can_connect_to(named, sized));
        assert_eq!(
            lattice.ancestors(file),
            vec![sized, named, DataTypeId::ROOT]
        );
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let (mut lattice, number, _) = number_lattice();
        assert_eq!(
            lattice.add_type("Number", &[]),
            Err(LatticeError::DuplicateTypeName("Number".into()))
        );
        assert_eq!(
            lattice.add_type(ROOT_NAME, &[number]),
            Err(LatticeError::DuplicateTypeName(ROOT_NAME.into()))
        );
    }

    #[test]
    fn test_explicit_root_parent_rejected() {
        let (mut lattice, number, _) = number_lattice();
        assert_eq!(
            lattice.add_type("Real", &[number, DataTypeId::ROOT]),
            Err(LatticeError::InvalidParent("Real".into()))
        );
        assert!(lattice.find("Real").is_none());
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let (mut lattice, _, _) = number_lattice();
        let bogus = DataTypeId::from_raw(42);
        assert_eq!(
            lattice.add_type("Real", &[bogus]),
            Err(LatticeError::UnknownParent(bogus))
        );
    }

    #[test]
    fn test_find_by_name() {
        let (lattice, number, integer) = number_lattice();
        assert_eq!(lattice.find("Number"), Some(number));
        assert_eq!(lattice.find("Integer"), Some(integer));
        assert_eq!(lattice.find(ROOT_NAME), Some(DataTypeId::ROOT));
        assert_eq!(lattice.find("Text"), None);
        assert_eq!(lattice.get(integer).unwrap().to_string(), "DataType(Integer)");
    }

    #[test]
    fn test_one_downcast_per_parent_edge() {
        let (lattice, number, integer) = number_lattice();
        let downcasts = lattice.generate_downcasts();

        // Number <- Root, Integer <- Root, Integer <- Number
        assert_eq!(downcasts.len(), 3);
        assert!(downcasts.contains(&Downcast {
            parent: DataTypeId::ROOT,
            child: number
        }));
        assert!(downcasts.contains(&Downcast {
            parent: DataTypeId::ROOT,
            child: integer
        }));
        assert!(downcasts.contains(&Downcast {
            parent: number,
            child: integer
        }));
    }

    fn arb_lattice() -> impl Strategy<Value = TypeLattice> {
        // each new type picks its parents among the types that already exist
        prop::collection::vec(prop::collection::vec(any::<prop::sample::Index>(), 0..3), 1..12)
            .prop_map(|picks| {
                let mut lattice = TypeLattice::new();
                for (i, parents) in picks.into_iter().enumerate() {
                    let existing = lattice.len();
                    let parents: Vec<DataTypeId> = parents
                        .iter()
                        .map(|p| DataTypeId(p.index(existing) as u32))
                        .filter(|p| *p != DataTypeId::ROOT)
                        .collect();
                    lattice.add_type(format!("T{i}"), &parents).unwrap();
                }
                lattice
            })
    }

    proptest! {
        #[test]
        fn prop_reflexive(lattice in arb_lattice()) {
            for ty in lattice.iter() {
                prop_assert!(lattice.can_connect_to(ty.id(), ty.id()));
            }
        }

        #[test]
        fn prop_transitive(lattice in arb_lattice()) {
            let ids: Vec<DataTypeId> = lattice.iter().map(DataType::id).collect();
            for &a in &ids {
                for &b in &ids {
                    for &c in &ids {
                        if lattice.can_connect_to(a, b) && lattice.can_connect_to(b, c) {
                            prop_assert!(lattice.can_connect_to(a, c));
                        }
                    }
                }
            }
        }

        #[test]
        fn prop_everything_reaches_root(lattice in arb_lattice()) {
            for ty in lattice.iter() {
                prop_assert!(lattice.can_connect_to(ty.id(), DataTypeId::ROOT));
                prop_assert_eq!(
                    lattice.ancestors(ty.id()).len(),
                    ids_connecting_from(&lattice, ty.id()) - 1
                );
            }
        }
    }

    fn ids_connecting_from(lattice: &TypeLattice, source: DataTypeId) -> usize {
        lattice
            .iter()
            .filter(|t| lattice.can_connect_to(source, t.id()))
            .count()
    }
}
