//! Entries of the graph and the candidates they are built from.

use std::fmt;

use crate::{Constructor, Describe, Descriptor, Instance, Output, TypeKey, WiringError};

type Factory = Box<dyn Fn(&[Instance]) -> Result<Instance, WiringError> + Send + Sync>;

/// Something that can be registered in a [crate::Graph].
///
/// Build it with [instance] or [constructor]. Nothing is checked until registration.
pub struct Candidate {
    kind: CandidateKind,
}

enum CandidateKind {
    Instance {
        descriptor: Descriptor,
        instance: Instance,
    },
    Constructor {
        signature: TypeKey,
        returns: Vec<Descriptor>,
        parameters: Vec<Descriptor>,
        factory: Factory,
    },
}

/// Register an already built value.
pub fn instance<P: Describe>(value: P) -> Candidate {
    Candidate {
        kind: CandidateKind::Instance {
            descriptor: P::descriptor(),
            instance: value.erase(),
        },
    }
}

/// Register a function building the value from its arguments.
///
/// Each argument is resolved from the graph before calling the function. The function runs at
/// most once successfully: its result is cached and shared by all later resolutions.
pub fn constructor<F, Args, Ret>(function: F) -> Candidate
where
    F: Constructor<Args, Ret>,
    Args: 'static,
    Ret: Output + 'static,
{
    let signature = TypeKey::of::<F>();
    let factory = move |args: &[Instance]| -> Result<Instance, WiringError> {
        let values = function
            .construct(args)?
            .into_values()
            .map_err(WiringError::Constructor)?;
        let found = values.len();
        values
            .into_iter()
            .next()
            .ok_or(WiringError::WrongReturnCount {
                constructor: signature,
                found,
            })
    };
    Candidate {
        kind: CandidateKind::Constructor {
            signature,
            returns: Ret::returns(),
            parameters: F::parameters(),
            factory: Box::new(factory),
        },
    }
}

impl Candidate {
    /// Check the shape of the candidate and build the matching node.
    pub(crate) fn into_node(self) -> Result<(TypeKey, Node), WiringError> {
        match self.kind {
            CandidateKind::Instance {
                descriptor,
                instance,
            } => {
                if !descriptor.is_reference() {
                    return Err(WiringError::NotPointerOrFunction(descriptor.key));
                }
                Ok((descriptor.key, Node::Value(instance)))
            }
            CandidateKind::Constructor {
                signature,
                returns,
                parameters,
                factory,
            } => {
                let [produced] = returns.as_slice() else {
                    return Err(WiringError::WrongReturnCount {
                        constructor: signature,
                        found: returns.len(),
                    });
                };
                if !produced.is_reference() {
                    return Err(WiringError::NonReferenceReturn(produced.key));
                }
                if let Some((index, argument)) = parameters
                    .iter()
                    .enumerate()
                    .find(|(_, p)| !p.is_reference())
                {
                    return Err(WiringError::NonReferenceArgument {
                        constructor: produced.key,
                        index,
                        argument: argument.key,
                    });
                }
                let node = ConstructorNode {
                    factory,
                    dependencies: parameters.iter().map(|p| p.key).collect(),
                    cached: None,
                };
                Ok((produced.key, Node::Constructor(node)))
            }
        }
    }
}

/// Entry of the graph
pub(crate) enum Node {
    /// Prebuilt instance, always resolved
    Value(Instance),
    Constructor(ConstructorNode),
}

pub(crate) struct ConstructorNode {
    factory: Factory,
    dependencies: Vec<TypeKey>,
    cached: Option<Instance>,
}

impl Node {
    /// Keys this node needs before producing its value, in argument order
    pub(crate) fn dependencies(&self) -> &[TypeKey] {
        match self {
            Node::Value(_) => &[],
            Node::Constructor(node) => &node.dependencies,
        }
    }

    pub(crate) fn is_constructor(&self) -> bool {
        matches!(self, Node::Constructor(_))
    }

    /// The value of the node if it is available without calling anything
    pub(crate) fn ready(&self) -> Option<&Instance> {
        match self {
            Node::Value(instance) => Some(instance),
            Node::Constructor(node) => node.cached.as_ref(),
        }
    }
}

impl ConstructorNode {
    /// Call the constructor and cache its value.
    ///
    /// A cached value is never replaced, errors are not cached.
    pub(crate) fn construct(&mut self, args: &[Instance]) -> Result<Instance, WiringError> {
        if let Some(cached) = &self.cached {
            return Ok(cached.clone());
        }
        let value = (self.factory)(args)?;
        self.cached = Some(value.clone());
        Ok(value)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Value(_) => write!(f, "value"),
            Node::Constructor(node) => {
                let state = if node.cached.is_some() {
                    "cached"
                } else {
                    "pending"
                };
                write!(f, "constructor ({state})")?;
                if !node.dependencies.is_empty() {
                    let dependencies: Vec<String> = node
                        .dependencies
                        .iter()
                        .map(|key| format!("`{key}`"))
                        .collect();
                    write!(f, " <- {}", dependencies.join(", "))?;
                }
                Ok(())
            }
        }
    }
}
