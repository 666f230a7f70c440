//! Dependency injection graph keyed by the type of the injected values.
//!
//! # Simple use case
//!
//! ```
//! # use std::sync::Arc;
//! # use wiregraph::*;
//! // Define traits and implementors
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! struct Config {
//!     name: String,
//! }
//!
//! struct GreeterImpl {
//!     config: Arc<Config>,
//! }
//!
//! impl Greeter for GreeterImpl {
//!     fn greet(&self) -> String {
//!         format!("Hello {}", self.config.name)
//!     }
//! }
//!
//! # fn main() -> Result<(), WiringError> {
//! // Register a prebuilt instance and a constructor using it
//! let graph = Graph::new();
//! graph.register(instance(Arc::new(Config { name: "world".into() })))?;
//! graph.register(constructor(|config: Arc<Config>| -> Arc<dyn Greeter> {
//!     Arc::new(GreeterImpl { config })
//! }))?;
//!
//! // Obtain a fully wired value
//! let greeter: Arc<dyn Greeter> = graph.inject()?;
//! assert_eq!(greeter.greet(), "Hello world");
//! # Ok(())
//! # }
//! ```
//!
//! # Mechanism
//!
//! The graph combines a type map based on the [std::any::Any] trait for runtime reflection
//! with specialised traits describing the registered types, so that the shape of most
//! registrations is checked at compile time.
//!
//! * Each registered type is identified by a [TypeKey]. Only reference-like types, i.e. [Arc]
//!   of a struct or of a trait object, can be registered. Other types are described with
//!   the [value_type] macro and rejected at registration with a [WiringError].
//! * A registration is a [Candidate]: either a prebuilt [instance] or a [constructor]
//!   function. The arguments of a constructor are its dependencies, its return type
//!   (optionally wrapped in a [Result]) is the registered type.
//! * A constructor is called the first time its type is resolved, after its dependencies.
//!   The value is cached: later resolutions share the same instance.
//! * Dependency cycles are detected when a constructor is registered, the registration
//!   is then rejected and rolled back.
//!
//! A process-wide graph is available in the [global] module for applications which do
//! not want to carry their own [Graph] around.

mod constructor;
mod error;
mod graph;
mod key;
mod node;
mod shape;

pub mod global;

pub use constructor::Constructor;
pub use error::WiringError;
pub use graph::{Graph, Inject, Slot};
pub use key::TypeKey;
pub use node::{constructor, instance, Candidate};
pub use shape::{BoxError, Describe, Descriptor, Instance, Output, Shape};

#[cfg(test)]
mod tests;
