//! forcedata fixture factory
//!
//! A registry of fixture builders that memoizes one canonical value per
//! identifier and records how fixtures are composed:
//!
//! ```text
//!   register(id, builder) ──► fresh execution ──► memoized value (get)
//!                                   │
//!                     ┌─────────────┴─────────────┐
//!                     ▼                           ▼
//!          ctx.fetch_as_parent(base)    ctx.fetch_as_child(part)
//!          "inherits from" edge         "contains" edge
//!                     │                           │
//!                     └──────► fresh execution ◄──┘
//!                              (nested frame)
//! ```
//!
//! Every execution re-runs the builder from scratch, so two fixtures that
//! embed the same child each own an independent copy, and a variant that
//! clones its base can be mutated freely without touching the base's
//! memoized value. The only reused value is the one `get` returns.
//!
//! Builders receive an explicit [`BuildContext`] instead of reaching for a
//! global. The factory itself is an ordinary value: construct it, register
//! fixtures in dependency order, read values and graph records, drop it.

pub mod error;
pub mod node;

#[cfg(test)]
mod tests;

pub use error::{BuildChain, FactoryError};
pub use node::{DataId, GraphRecord, NodeStore};

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

pub type Result<T, E = FactoryError> = std::result::Result<T, E>;

/// A fixture builder. It may call back into the factory through the context.
pub type Builder<V> = dyn Fn(&mut BuildContext<'_, V>) -> Result<V>;

/// What `register` does when the identifier already has a builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Replace the builder and rebuild the memoized value.
    #[default]
    Overwrite,
    /// Fail with [`FactoryError::AlreadyRegistered`].
    Reject,
}

#[derive(Debug, Clone, Default)]
pub struct FactoryOptions {
    pub on_duplicate: DuplicatePolicy,
}

/// Registry/executor for fixtures of type `V`.
///
/// Single-threaded by construction: builders are held in `Rc`.
pub struct Factory<V> {
    options: FactoryOptions,
    builders: HashMap<DataId, Rc<Builder<V>>>,
    cache: HashMap<DataId, V>,
    nodes: NodeStore,
    /// Frames of the executions currently running, innermost last.
    stack: Vec<GraphRecord>,
    /// Records completed during the current registration, committed on success.
    staged: Vec<GraphRecord>,
}

impl<V> Default for Factory<V> {
    fn default() -> Self {
        Self::with_options(FactoryOptions::default())
    }
}

impl<V> fmt::Debug for Factory<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("options", &self.options)
            .field("registered", &self.builders.len())
            .field("records", &self.nodes.len())
            .finish()
    }
}

impl<V> Factory<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: FactoryOptions) -> Self {
        Self {
            options,
            builders: HashMap::new(),
            cache: HashMap::new(),
            nodes: NodeStore::new(),
            stack: Vec::new(),
            staged: Vec::new(),
        }
    }

    pub fn options(&self) -> &FactoryOptions {
        &self.options
    }

    /// Bind `builder` to `id`, run it once and memoize the result.
    ///
    /// Graph records for `id` and for everything built underneath it are
    /// replaced. If the builder fails, the previous binding is restored and
    /// no record from this pass is kept.
    pub fn register<F>(&mut self, id: impl Into<DataId>, builder: F) -> Result<()>
    where
        F: Fn(&mut BuildContext<'_, V>) -> Result<V> + 'static,
    {
        let id = id.into();
        if id.is_empty() {
            return Err(FactoryError::InvalidId);
        }
        if self.builders.contains_key(&id) {
            match self.options.on_duplicate {
                DuplicatePolicy::Reject => return Err(FactoryError::AlreadyRegistered { id }),
                DuplicatePolicy::Overwrite => {
                    tracing::debug!(data_id = %id, "replacing registered builder");
                }
            }
        }

        let previous = self.builders.insert(id.clone(), Rc::new(builder));
        match self.resolve(&id).and_then(|builder| self.run(&id, builder)) {
            Ok(value) => {
                let committed = self.staged.len();
                for record in self.staged.drain(..) {
                    self.nodes.insert(record);
                }
                self.cache.insert(id.clone(), value);
                tracing::debug!(data_id = %id, records = committed, "registered fixture");
                Ok(())
            }
            Err(err) => {
                self.staged.clear();
                self.stack.clear();
                match previous {
                    Some(builder) => {
                        self.builders.insert(id, builder);
                    }
                    None => {
                        self.builders.remove(&id);
                    }
                }
                Err(err)
            }
        }
    }

    /// The value memoized when `id` was registered.
    pub fn get(&self, id: &str) -> Result<&V> {
        self.cache
            .get(id)
            .ok_or_else(|| FactoryError::NotRegistered {
                id: DataId::from(id),
                chain: BuildChain::default(),
            })
    }

    /// Clone the memoized value for `id` and convert it to `T`.
    pub fn get_as<T>(&self, id: &str) -> Result<T>
    where
        V: Clone,
        T: TryFrom<V>,
    {
        let value = self.get(id)?.clone();
        self.convert(DataId::from(id), value)
    }

    /// Build `id` afresh and record a containment edge on the running frame.
    ///
    /// Outside a builder there is no frame to attach the edge to and this
    /// fails with [`FactoryError::NoActiveFrame`]. The edge is only recorded
    /// once `id` has been built, so a failed fetch leaves the frame untouched
    /// even when the calling builder discards the error.
    pub fn fetch_as_child(&mut self, id: impl Into<DataId>) -> Result<V> {
        let id = id.into();
        if self.stack.is_empty() {
            return Err(FactoryError::NoActiveFrame { id });
        }
        let builder = self.resolve(&id)?;
        let value = self.run(&id, builder)?;
        if let Some(frame) = self.stack.last_mut() {
            if frame.add_property(id.clone()) {
                tracing::trace!(data_id = %frame.data_id, child = %id, "contains");
            }
        }
        Ok(value)
    }

    /// Build `id` afresh and record it as the running frame's parent.
    ///
    /// The returned value is owned by the caller and meant to be modified.
    /// Like [`Factory::fetch_as_child`], nothing is recorded if the fetch fails.
    pub fn fetch_as_parent(&mut self, id: impl Into<DataId>) -> Result<V> {
        let id = id.into();
        if self.stack.is_empty() {
            return Err(FactoryError::NoActiveFrame { id });
        }
        let builder = self.resolve(&id)?;
        let value = self.run(&id, builder)?;
        if let Some(frame) = self.stack.last_mut() {
            tracing::trace!(data_id = %frame.data_id, parent = %id, "inherits");
            frame.set_inherit(id.clone());
        }
        Ok(value)
    }

    pub fn graph_records(&self) -> &NodeStore {
        &self.nodes
    }

    /// All graph records, ordered by identifier.
    pub fn list_graph_records(&self) -> Vec<GraphRecord> {
        self.nodes.to_vec()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.builders.contains_key(id)
    }

    /// Registered identifiers, sorted.
    pub fn ids(&self) -> Vec<&DataId> {
        let mut ids: Vec<&DataId> = self.builders.keys().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.builders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }

    /// Number of builders currently running.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn chain(&self) -> BuildChain {
        BuildChain::new(self.stack.iter().map(|frame| frame.data_id.clone()).collect())
    }

    fn convert<T>(&self, id: DataId, value: V) -> Result<T>
    where
        T: TryFrom<V>,
    {
        T::try_from(value).map_err(|_| FactoryError::TypeMismatch {
            id,
            expected: std::any::type_name::<T>(),
            chain: self.chain(),
        })
    }

    /// Look up the builder for `id` and refuse to re-enter a running one.
    fn resolve(&self, id: &DataId) -> Result<Rc<Builder<V>>> {
        let Some(builder) = self.builders.get(id) else {
            return Err(FactoryError::NotRegistered {
                id: id.clone(),
                chain: self.chain(),
            });
        };
        if self.stack.iter().any(|frame| &frame.data_id == id) {
            return Err(FactoryError::Cycle {
                id: id.clone(),
                chain: self.chain(),
            });
        }
        Ok(Rc::clone(builder))
    }

    /// Run `builder` for `id` under a new frame, staging its record on success.
    fn run(&mut self, id: &DataId, builder: Rc<Builder<V>>) -> Result<V> {
        tracing::trace!(data_id = %id, depth = self.stack.len(), "executing builder");
        self.stack.push(GraphRecord::new(id.clone()));
        let result = builder(&mut BuildContext {
            factory: self,
            data_id: id.clone(),
        });
        let frame = self.stack.pop();

        if let (Ok(_), Some(record)) = (&result, frame) {
            self.staged.push(record);
        }
        result
    }
}

/// Handle passed to a running builder.
pub struct BuildContext<'f, V> {
    factory: &'f mut Factory<V>,
    data_id: DataId,
}

impl<V> BuildContext<'_, V> {
    /// The identifier being built.
    pub fn data_id(&self) -> &DataId {
        &self.data_id
    }

    /// Nesting depth of this execution (1 for a top-level registration).
    pub fn depth(&self) -> usize {
        self.factory.depth()
    }

    /// Embed a freshly built `id`, recording a containment edge.
    pub fn fetch_as_child(&mut self, id: impl Into<DataId>) -> Result<V> {
        self.factory.fetch_as_child(id)
    }

    /// Clone-and-modify base: a fresh build of `id`, recording the
    /// inheritance edge.
    pub fn fetch_as_parent(&mut self, id: impl Into<DataId>) -> Result<V> {
        self.factory.fetch_as_parent(id)
    }

    /// [`fetch_as_child`](Self::fetch_as_child) converted to a concrete type.
    pub fn child<T>(&mut self, id: impl Into<DataId>) -> Result<T>
    where
        T: TryFrom<V>,
    {
        let id = id.into();
        let value = self.factory.fetch_as_child(&id)?;
        self.factory.convert(id, value)
    }

    /// [`fetch_as_parent`](Self::fetch_as_parent) converted to a concrete type.
    pub fn parent<T>(&mut self, id: impl Into<DataId>) -> Result<T>
    where
        T: TryFrom<V>,
    {
        let id = id.into();
        let value = self.factory.fetch_as_parent(&id)?;
        self.factory.convert(id, value)
    }

    /// Memoized value of an already registered fixture. Records no edge.
    pub fn get(&self, id: &str) -> Result<&V> {
        self.factory.get(id)
    }
}
