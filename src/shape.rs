//! Runtime descriptions of the types that flow through the graph.
//!
//! Only reference-like types can be registered or injected: in practice [Arc] of a concrete
//! type or of a trait object. Other types can still be described (see [value_type]) so that
//! registrations using them are rejected with a meaningful [crate::WiringError] instead of
//! silently accepted.
//!
//! * The [Describe] trait gives the [Descriptor] of a type and moves values in and out of the
//!   type-erased [Instance] stored by the graph.
//! * The [Output] trait describes what a constructor returns: how many values, and whether an
//!   error return is attached.

use std::any::Any;
use std::error::Error;
use std::sync::Arc;

use crate::TypeKey;

/// Type-erased value stored in the graph
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Error reported by a constructor
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Structural shape of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Shared pointer or trait object, can be registered and injected
    Reference,
    /// Plain value, rejected by the graph
    Value,
}

/// Identity and shape of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    pub key: TypeKey,
    pub shape: Shape,
}

impl Descriptor {
    pub fn of<D: Describe>() -> Self {
        Self {
            key: TypeKey::of::<D>(),
            shape: D::SHAPE,
        }
    }

    pub fn is_reference(&self) -> bool {
        self.shape == Shape::Reference
    }
}

/// A type with a known [Shape] that can be stored in an [Instance]
pub trait Describe: Clone + Send + Sync + 'static {
    const SHAPE: Shape;

    fn descriptor() -> Descriptor {
        Descriptor::of::<Self>()
    }

    fn erase(self) -> Instance {
        Arc::new(self)
    }

    fn restore(instance: &Instance) -> Option<Self> {
        instance.downcast_ref::<Self>().cloned()
    }
}

impl<T: ?Sized + Send + Sync + 'static> Describe for Arc<T> {
    const SHAPE: Shape = Shape::Reference;
}

/// Mark types as plain values.
///
/// Values can be described but never registered: passing one as an instance, as a constructor
/// argument or as a constructor return type is reported as a wiring error.
#[macro_export]
macro_rules! value_type {
    ($($Type:ty),+ $(,)?) => {
        $(
        impl $crate::Describe for $Type {
            const SHAPE: $crate::Shape = $crate::Shape::Value;
        }
        )+
    };
}

value_type!(bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
value_type!(f32, f64, String, &'static str);

/// Values returned by a constructor.
///
/// A valid constructor returns exactly one reference, optionally wrapped in a [Result].
/// Other return shapes are described too, so that they can be rejected at registration.
pub trait Output {
    /// Descriptors of the returned values, the error return excluded
    fn returns() -> Vec<Descriptor>;

    /// Split into the returned values or the error reported by the constructor
    fn into_values(self) -> Result<Vec<Instance>, BoxError>;
}

impl<P: Describe> Output for P {
    fn returns() -> Vec<Descriptor> {
        vec![P::descriptor()]
    }

    fn into_values(self) -> Result<Vec<Instance>, BoxError> {
        Ok(vec![self.erase()])
    }
}

impl<P: Describe, E: Into<BoxError>> Output for Result<P, E> {
    fn returns() -> Vec<Descriptor> {
        vec![P::descriptor()]
    }

    fn into_values(self) -> Result<Vec<Instance>, BoxError> {
        self.map(|value| vec![value.erase()]).map_err(Into::into)
    }
}

impl Output for () {
    fn returns() -> Vec<Descriptor> {
        Vec::new()
    }

    fn into_values(self) -> Result<Vec<Instance>, BoxError> {
        Ok(Vec::new())
    }
}

impl<E: Into<BoxError>> Output for Result<(), E> {
    fn returns() -> Vec<Descriptor> {
        Vec::new()
    }

    fn into_values(self) -> Result<Vec<Instance>, BoxError> {
        self.map(|_| Vec::new()).map_err(Into::into)
    }
}

macro_rules! output_tuple ({ $($value:ident)+ } => {
    impl<$($value: Describe,)+> Output for ($($value,)+) {
        fn returns() -> Vec<Descriptor> {
            vec![$($value::descriptor(),)+]
        }

        #[allow(non_snake_case)]
        fn into_values(self) -> Result<Vec<Instance>, BoxError> {
            let ($($value,)+) = self;
            Ok(vec![$($value.erase(),)+])
        }
    }
});

output_tuple! { A B }
output_tuple! { A B C }
