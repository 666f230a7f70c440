use crate::{Describe, Descriptor, Instance, Output, WiringError};

/*
 * Any function of up to 10 described arguments can be registered as a constructor.
 * Inspired by https://nickbryan.co.uk/software/using-a-type-map-for-dependency-injection-in-rust/
 */

/// A function building a value from already resolved dependencies.
///
/// This trait is implemented for all functions with up to 10 arguments, using a tuple to
/// capture the argument types in a single generic parameter.
pub trait Constructor<Args, Ret>: Send + Sync + 'static {
    /// Descriptors of the arguments, in declaration order
    fn parameters() -> Vec<Descriptor>;

    /// Call the function with type-erased arguments, in declaration order
    fn construct(&self, args: &[Instance]) -> Result<Ret, WiringError>;
}

macro_rules! constructor_tuple ({ $($param:ident)* } => {
    impl<Func, Ret, $($param,)*> Constructor<($($param,)*), Ret> for Func
    where
        Func: Fn($($param),*) -> Ret + Send + Sync + 'static,
        Ret: Output,
        $($param: Describe,)*
    {
        fn parameters() -> Vec<Descriptor> {
            vec![$($param::descriptor(),)*]
        }

        #[inline]
        #[allow(non_snake_case, unused_mut, unused_variables)]
        fn construct(&self, args: &[Instance]) -> Result<Ret, WiringError> {
            let mut args = args.iter();
            $(
            let $param = args
                .next()
                .and_then($param::restore)
                .ok_or_else(|| WiringError::TypeMismatch($param::descriptor().key))?;
            )*
            Ok((self)($($param,)*))
        }
    }
});

constructor_tuple! {}
constructor_tuple! { A }
constructor_tuple! { A B }
constructor_tuple! { A B C }
constructor_tuple! { A B C D }
constructor_tuple! { A B C D E }
constructor_tuple! { A B C D E F }
constructor_tuple! { A B C D E F G }
constructor_tuple! { A B C D E F G H }
constructor_tuple! { A B C D E F G H I }
constructor_tuple! { A B C D E F G H I J }
