use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::node::Node;
use crate::*;

/// Storage that [Graph::resolve] can fill with a value of the graph.
///
/// Implemented by `Option<P>` for all described types.
pub trait Slot {
    /// Descriptor of the requested type
    fn descriptor(&self) -> Descriptor;

    /// Store the value, return false if it does not have the requested type
    fn fill(&mut self, instance: &Instance) -> bool;
}

impl<P: Describe> Slot for Option<P> {
    fn descriptor(&self) -> Descriptor {
        P::descriptor()
    }

    fn fill(&mut self, instance: &Instance) -> bool {
        match P::restore(instance) {
            Some(value) => {
                *self = Some(value);
                true
            }
            None => false,
        }
    }
}

/// Typed access to the values of a graph
pub trait Inject<T> {
    /// Resolve `T` and return it directly instead of filling a [Slot].
    fn inject(&self) -> Result<T, WiringError>;
}

/// Dependency injection graph.
///
/// Maps each registered type to the node producing it. A single lock guards the whole graph:
/// registrations and resolutions are fully serialized, including the constructor calls they
/// trigger. Constructors must not use the graph which is resolving them.
#[derive(Default)]
pub struct Graph {
    nodes: Mutex<NodeMap>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an instance or a constructor to the graph.
    ///
    /// A previous registration for the same type is replaced. Constructors are rejected if they
    /// close a dependency cycle, in which case the graph is left as it was.
    pub fn register(&self, candidate: Candidate) -> Result<(), WiringError> {
        let (key, node) = candidate.into_node()?;
        let check_cycle = node.is_constructor();

        let mut nodes = self.nodes.lock();
        let previous = nodes.0.insert(key, node);
        if check_cycle {
            if let Some(found) = nodes.find_cycle(&key) {
                match previous {
                    Some(previous) => nodes.0.insert(key, previous),
                    None => nodes.0.remove(&key),
                };
                debug!(%key, at = %found, "registration rolled back");
                return Err(WiringError::register(key, WiringError::Cycle(found)));
            }
        }
        debug!(%key, replaced = previous.is_some(), "registered");
        Ok(())
    }

    /// Register candidates in order, stopping at the first error.
    ///
    /// Registrations done before the error are kept.
    pub fn register_all<I>(&self, candidates: I) -> Result<(), WiringError>
    where
        I: IntoIterator<Item = Candidate>,
    {
        candidates
            .into_iter()
            .try_for_each(|candidate| self.register(candidate))
    }

    /// Fill the target with the value registered for its type.
    ///
    /// Dependencies are resolved recursively and constructed values are cached.
    /// The target is left untouched on error.
    ///
    /// A panicking constructor is reported as [WiringError::Panic]. The panic hook still runs
    /// before the panic is caught, so the default hook prints the message to stderr; install a
    /// custom hook with [std::panic::set_hook] to silence it.
    pub fn resolve<S: Slot + ?Sized>(&self, target: &mut S) -> Result<(), WiringError> {
        let descriptor = target.descriptor();
        let key = descriptor.key;
        if !descriptor.is_reference() {
            return Err(WiringError::NonPointerTarget(key));
        }

        let instance = self.produce(&key)?;
        if !target.fill(&instance) {
            return Err(WiringError::resolve(key, WiringError::TypeMismatch(key)));
        }
        Ok(())
    }

    /// Resolve targets in order, stopping at the first error.
    ///
    /// Targets resolved before the error keep their value.
    pub fn resolve_all(&self, targets: &mut [&mut dyn Slot]) -> Result<(), WiringError> {
        targets
            .iter_mut()
            .try_for_each(|target| self.resolve(&mut **target))
    }

    /// Register or panic
    pub fn must_register(&self, candidate: Candidate) {
        if let Err(e) = self.register(candidate) {
            panic!("{e}");
        }
    }

    /// Inject or panic
    pub fn must_inject<P: Describe>(&self) -> P {
        match self.inject() {
            Ok(value) => value,
            Err(e) => panic!("{e}"),
        }
    }

    pub fn contains<P: Describe>(&self) -> bool {
        self.nodes.lock().0.contains_key(&TypeKey::of::<P>())
    }

    pub fn len(&self) -> usize {
        self.nodes.lock().0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.lock().0.is_empty()
    }

    /// Discard all nodes
    pub fn reset(&self) {
        let mut nodes = self.nodes.lock();
        debug!(discarded = nodes.0.len(), "graph reset");
        nodes.0.clear();
    }

    /// Human-readable listing of the registered types, for diagnostics only.
    pub fn debug_dump(&self) -> String {
        let nodes = self.nodes.lock();
        let mut keys: Vec<&TypeKey> = nodes.0.keys().collect();
        keys.sort();

        let mut dump = format!("graph with {} node(s)\n", keys.len());
        for key in keys {
            if let Some(node) = nodes.0.get(key) {
                dump.push_str(&format!("  `{key}`: {node}\n"));
            }
        }
        dump
    }

    /// Produce the value for a key, holding the lock for the whole resolution.
    fn produce(&self, key: &TypeKey) -> Result<Instance, WiringError> {
        let mut nodes = self.nodes.lock();
        if !nodes.0.contains_key(key) {
            return Err(WiringError::NotRegistered(*key));
        }

        match panic::catch_unwind(AssertUnwindSafe(|| nodes.value_of(key))) {
            Ok(result) => result.map_err(|e| WiringError::resolve(*key, e)),
            Err(payload) => Err(WiringError::Panic(panic_detail(payload.as_ref()))),
        }
    }
}

impl<P: Describe> Inject<P> for Graph {
    fn inject(&self) -> Result<P, WiringError> {
        let mut slot: Option<P> = None;
        self.resolve(&mut slot)?;
        slot.ok_or_else(|| WiringError::NotRegistered(TypeKey::of::<P>()))
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph").field("nodes", &self.len()).finish()
    }
}

fn panic_detail(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Nodes of a graph, indexed by the type they produce
#[derive(Default)]
struct NodeMap(HashMap<TypeKey, Node>);

impl NodeMap {
    /// Obtain the value of a node, resolving its dependencies first.
    ///
    /// Dependencies are resolved one at a time, in argument order.
    fn value_of(&mut self, key: &TypeKey) -> Result<Instance, WiringError> {
        let node = self.0.get(key).ok_or(WiringError::NotRegistered(*key))?;
        if let Some(ready) = node.ready() {
            trace!(%key, "cached");
            return Ok(ready.clone());
        }

        let dependencies = node.dependencies().to_vec();
        let mut args = Vec::with_capacity(dependencies.len());
        for dependency in dependencies {
            if !self.0.contains_key(&dependency) {
                return Err(WiringError::DependencyNotRegistered {
                    constructor: *key,
                    dependency,
                });
            }
            let value = self
                .value_of(&dependency)
                .map_err(|e| WiringError::resolve(dependency, e))?;
            args.push(value);
        }

        match self.0.get_mut(key) {
            Some(Node::Constructor(node)) => {
                debug!(%key, "calling constructor");
                node.construct(&args)
            }
            Some(Node::Value(instance)) => Ok(instance.clone()),
            None => Err(WiringError::NotRegistered(*key)),
        }
    }

    /// Search a cycle reachable from a newly inserted constructor.
    ///
    /// The walk shares a single visited set: reaching the same constructor through two paths
    /// (a diamond) is reported as a cycle too. Prebuilt values have no dependencies and are
    /// never part of a cycle, they are skipped.
    /// Returns the key at which the walk came back to a visited node.
    fn find_cycle(&self, start: &TypeKey) -> Option<TypeKey> {
        let mut visited = HashSet::new();
        self.visit(start, &mut visited)
    }

    fn visit(&self, key: &TypeKey, visited: &mut HashSet<TypeKey>) -> Option<TypeKey> {
        let node = self.0.get(key).filter(|node| node.is_constructor())?;
        if !visited.insert(*key) {
            return Some(*key);
        }
        node.dependencies()
            .iter()
            .find_map(|dependency| self.visit(dependency, visited))
    }
}
