use thiserror::Error;

use crate::{BoxError, TypeKey};

/// Errors triggered while wiring or resolving the graph
#[derive(Error, Debug)]
pub enum WiringError {
    #[error("not a pointer or function: `{0}`")]
    NotPointerOrFunction(TypeKey),
    #[error("constructor `{constructor}` must return exactly one value, found {found}")]
    WrongReturnCount { constructor: TypeKey, found: usize },
    #[error("return type `{0}` must be a pointer or interface")]
    NonReferenceReturn(TypeKey),
    #[error("arguments must be pointers or interfaces: argument {index} of `{constructor}` is `{argument}`")]
    NonReferenceArgument {
        constructor: TypeKey,
        index: usize,
        argument: TypeKey,
    },
    #[error("cycle dependencies detected at `{0}`")]
    Cycle(TypeKey),
    #[error("unable to register `{key}`: {source}")]
    Register {
        key: TypeKey,
        #[source]
        source: Box<WiringError>,
    },

    #[error("cannot resolve non-pointer object `{0}`")]
    NonPointerTarget(TypeKey),
    #[error("type `{0}` is not registered")]
    NotRegistered(TypeKey),
    #[error("dependency `{dependency}` of `{constructor}` is not registered")]
    DependencyNotRegistered {
        constructor: TypeKey,
        dependency: TypeKey,
    },
    #[error("unable to resolve `{key}`: {source}")]
    Resolve {
        key: TypeKey,
        #[source]
        source: Box<WiringError>,
    },
    #[error("{0}")]
    Constructor(#[source] BoxError),
    #[error("panic during Resolve: `{0}`")]
    Panic(String),
    #[error("stored value is not a `{0}`")]
    TypeMismatch(TypeKey),
}

impl WiringError {
    pub(crate) fn register(key: TypeKey, source: WiringError) -> Self {
        Self::Register {
            key,
            source: Box::new(source),
        }
    }

    pub(crate) fn resolve(key: TypeKey, source: WiringError) -> Self {
        Self::Resolve {
            key,
            source: Box::new(source),
        }
    }

    /// Innermost error, skipping the registration and resolution context
    pub fn root_cause(&self) -> &WiringError {
        match self {
            Self::Register { source, .. } | Self::Resolve { source, .. } => source.root_cause(),
            _ => self,
        }
    }
}
