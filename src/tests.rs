use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::*;

trait TestTrait: Send + Sync {
    fn cheers(&self) -> &'static str;
}

#[derive(Default)]
struct SecretImpl {}
impl TestTrait for SecretImpl {
    fn cheers(&self) -> &'static str {
        "here is the secret ingredient"
    }
}

struct Actionable {
    helper: Arc<dyn TestTrait>,
}

struct Child;
struct Parent {
    child: Arc<Child>,
}

fn make_child() -> Result<Arc<Child>, String> {
    Err("child is not ready".to_string())
}

fn make_parent(child: Arc<Child>) -> Arc<Parent> {
    Arc::new(Parent { child })
}

struct CycleA;
struct CycleB;
struct CycleC;

// Trait object arcs are compared by data address on purpose
#[allow(clippy::vtable_address_comparisons)]
#[test]
fn instance_is_a_singleton() -> Result<(), WiringError> {
    let graph = Graph::new();
    let secret: Arc<dyn TestTrait> = Arc::new(SecretImpl::default());
    graph.register(instance(secret.clone()))?;

    let v1: Arc<dyn TestTrait> = graph.inject()?;
    let v2: Arc<dyn TestTrait> = graph.inject()?;

    assert_eq!(v1.cheers(), "here is the secret ingredient");
    assert!(Arc::ptr_eq(&v1, &v2));
    assert!(Arc::ptr_eq(&v1, &secret));
    Ok(())
}

#[allow(clippy::vtable_address_comparisons)]
#[test]
fn constructor_runs_once() -> Result<(), WiringError> {
    let graph = Graph::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    graph.register(constructor(|| -> Arc<dyn TestTrait> {
        Arc::new(SecretImpl::default())
    }))?;
    graph.register(constructor(move |helper: Arc<dyn TestTrait>| {
        counter.fetch_add(1, Ordering::SeqCst);
        Arc::new(Actionable { helper })
    }))?;

    let a1: Arc<Actionable> = graph.inject()?;
    let a2: Arc<Actionable> = graph.inject()?;
    assert!(Arc::ptr_eq(&a1, &a2));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let helper: Arc<dyn TestTrait> = graph.inject()?;
    assert!(Arc::ptr_eq(&helper, &a1.helper));
    Ok(())
}

#[test]
fn unregistered_type_is_reported() {
    let graph = Graph::new();
    let mut target: Option<Arc<Child>> = None;

    let err = graph.resolve(&mut target).unwrap_err();
    assert!(matches!(err, WiringError::NotRegistered(key) if key == TypeKey::of::<Arc<Child>>()));
    assert_eq!(err.to_string(), "type `Arc<Child>` is not registered");
    assert!(target.is_none());
}

#[test]
fn missing_dependency_is_reported() {
    let graph = Graph::new();
    graph.must_register(constructor(make_parent));

    let mut target: Option<Arc<Parent>> = None;
    let err = graph.resolve(&mut target).unwrap_err();
    assert!(matches!(
        err.root_cause(),
        WiringError::DependencyNotRegistered { constructor, dependency }
            if *constructor == TypeKey::of::<Arc<Parent>>()
                && *dependency == TypeKey::of::<Arc<Child>>()
    ));
    assert!(target.is_none());
}

#[test]
fn constructor_errors_keep_context() {
    let graph = Graph::new();
    graph.must_register(constructor(make_child));
    graph.must_register(constructor(make_parent));

    let err = Inject::<Arc<Parent>>::inject(&graph)
        .err()
        .expect("child constructor fails");
    let message = err.to_string();
    assert!(message.contains("unable to resolve `Arc<Parent>`"), "{message}");
    assert!(message.contains("unable to resolve `Arc<Child>`"), "{message}");
    assert!(message.contains("child is not ready"), "{message}");
    assert!(matches!(err.root_cause(), WiringError::Constructor(_)));
}

#[test]
fn failed_constructor_is_retried() -> Result<(), WiringError> {
    let graph = Graph::new();
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();

    graph.register(constructor(move || {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            Err("first attempt fails")
        } else {
            Ok(Arc::new(Child))
        }
    }))?;

    assert!(Inject::<Arc<Child>>::inject(&graph).is_err());
    let _child: Arc<Child> = graph.inject()?;
    let _again: Arc<Child> = graph.inject()?;
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    Ok(())
}

#[test]
fn self_cycle_is_rejected() {
    let graph = Graph::new();
    let err = graph
        .register(constructor(|_: Arc<CycleA>| Arc::new(CycleA)))
        .unwrap_err();

    assert!(matches!(err.root_cause(), WiringError::Cycle(_)));
    assert!(err.to_string().starts_with("unable to register `Arc<CycleA>`"));
    assert!(err.to_string().contains("cycle dependencies detected"));
    assert!(!graph.contains::<Arc<CycleA>>());
    assert!(graph.is_empty());
}

#[test]
fn indirect_cycle_is_rejected() -> Result<(), WiringError> {
    let graph = Graph::new();
    graph.register(constructor(|_: Arc<CycleB>| Arc::new(CycleA)))?;
    graph.register(constructor(|_: Arc<CycleC>| Arc::new(CycleB)))?;

    let err = graph
        .register(constructor(|_: Arc<CycleA>| Arc::new(CycleC)))
        .unwrap_err();
    assert!(matches!(
        err.root_cause(),
        WiringError::Cycle(key) if *key == TypeKey::of::<Arc<CycleC>>()
    ));
    assert!(!graph.contains::<Arc<CycleC>>());
    assert_eq!(graph.len(), 2);
    Ok(())
}

#[test]
fn rollback_restores_replaced_node() -> Result<(), WiringError> {
    let graph = Graph::new();
    let original = Arc::new(CycleB);
    graph.register(constructor(|_: Arc<CycleB>| Arc::new(CycleA)))?;
    graph.register(instance(original.clone()))?;

    // replacing the value with a constructor depending on `CycleA` would close a cycle
    assert!(graph
        .register(constructor(|_: Arc<CycleA>| Arc::new(CycleB)))
        .is_err());

    let restored: Arc<CycleB> = graph.inject()?;
    assert!(Arc::ptr_eq(&restored, &original));
    Ok(())
}

#[test]
fn diamonds_are_reported_as_cycles() -> Result<(), WiringError> {
    struct Top;
    struct Left;
    struct Right;
    struct Bottom;

    let graph = Graph::new();
    graph.register(constructor(|| Arc::new(Bottom)))?;
    graph.register(constructor(|_: Arc<Bottom>| Arc::new(Left)))?;
    graph.register(constructor(|_: Arc<Bottom>| Arc::new(Right)))?;

    let err = graph
        .register(constructor(|_: Arc<Left>, _: Arc<Right>| Arc::new(Top)))
        .unwrap_err();
    assert!(matches!(
        err.root_cause(),
        WiringError::Cycle(key) if *key == TypeKey::of::<Arc<Bottom>>()
    ));
    Ok(())
}

#[test]
fn shared_instances_are_not_cycles() -> Result<(), WiringError> {
    struct Top;
    struct Left;

    let graph = Graph::new();
    graph.register(instance(Arc::new(Child)))?;
    graph.register(constructor(|_: Arc<Child>| Arc::new(Left)))?;
    graph.register(constructor(|_: Arc<Left>, _: Arc<Child>| Arc::new(Top)))?;
    let _top: Arc<Top> = graph.inject()?;

    // the same instance twice in one argument list
    graph.register(constructor(|a: Arc<Child>, b: Arc<Child>| {
        assert!(Arc::ptr_eq(&a, &b));
        Arc::new(Left)
    }))?;
    let _left: Arc<Left> = graph.inject()?;
    Ok(())
}

#[test]
fn reregistration_replaces_node() -> Result<(), WiringError> {
    let graph = Graph::new();
    let first = Arc::new(Child);
    let second = Arc::new(Child);

    graph.register(instance(first))?;
    graph.register(instance(second.clone()))?;

    let resolved: Arc<Child> = graph.inject()?;
    assert!(Arc::ptr_eq(&resolved, &second));
    assert_eq!(graph.len(), 1);
    Ok(())
}

#[test]
fn reset_clears_everything() -> Result<(), WiringError> {
    let graph = Graph::new();
    graph.register(instance(Arc::new(Child)))?;
    graph.register(constructor(make_parent))?;
    let _parent: Arc<Parent> = graph.inject()?;

    graph.reset();
    assert!(graph.is_empty());
    assert!(matches!(
        Inject::<Arc<Parent>>::inject(&graph),
        Err(WiringError::NotRegistered(_))
    ));
    assert!(matches!(
        Inject::<Arc<Child>>::inject(&graph),
        Err(WiringError::NotRegistered(_))
    ));
    Ok(())
}

#[test]
fn shapes_are_validated() {
    let graph = Graph::new();

    let err = graph.register(instance(42u32)).unwrap_err();
    assert!(matches!(err, WiringError::NotPointerOrFunction(_)));

    let err = graph.register(constructor(|| {})).unwrap_err();
    assert!(matches!(err, WiringError::WrongReturnCount { found: 0, .. }));

    let err = graph
        .register(constructor(|| (Arc::new(Child), Arc::new(CycleA))))
        .unwrap_err();
    assert!(matches!(err, WiringError::WrongReturnCount { found: 2, .. }));

    let err = graph.register(constructor(|| 7u64)).unwrap_err();
    assert!(matches!(err, WiringError::NonReferenceReturn(key) if key == TypeKey::of::<u64>()));

    let err = graph
        .register(constructor(|_: Arc<Child>, _: String| Arc::new(Parent {
            child: Arc::new(Child),
        })))
        .unwrap_err();
    assert!(matches!(
        err,
        WiringError::NonReferenceArgument { index: 1, argument, .. }
            if argument == TypeKey::of::<String>()
    ));

    assert!(graph.is_empty());
}

#[test]
fn value_targets_are_rejected() {
    let graph = Graph::new();
    let mut target: Option<u32> = None;
    let err = graph.resolve(&mut target).unwrap_err();
    assert!(matches!(err, WiringError::NonPointerTarget(_)));
    assert!(target.is_none());
}

#[test]
fn panics_become_errors() -> Result<(), WiringError> {
    let graph = Graph::new();
    graph.register(constructor(|| -> Arc<Child> { panic!("faulty constructor") }))?;

    let err = Inject::<Arc<Child>>::inject(&graph)
        .err()
        .expect("constructor panics");
    assert!(matches!(err, WiringError::Panic(_)));
    assert_eq!(err.to_string(), "panic during Resolve: `faulty constructor`");

    // the graph is still usable
    graph.register(instance(Arc::new(Child)))?;
    let _child: Arc<Child> = graph.inject()?;
    Ok(())
}

#[test]
fn debug_dump_lists_nodes() -> Result<(), WiringError> {
    let graph = Graph::new();
    graph.register(instance(Arc::new(Child)))?;
    graph.register(constructor(make_parent))?;

    let dump = graph.debug_dump();
    assert!(dump.starts_with("graph with 2 node(s)"), "{dump}");
    assert!(dump.contains("`Arc<Child>`: value"), "{dump}");
    assert!(dump.contains("`Arc<Parent>`: constructor (pending) <- `Arc<Child>`"), "{dump}");

    let parent: Arc<Parent> = graph.inject()?;
    let _ = &parent.child;
    assert!(graph.debug_dump().contains("constructor (cached)"));
    Ok(())
}
