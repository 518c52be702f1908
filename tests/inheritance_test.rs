//! 父容器回退的集成测试

use nestdi::{Container, ContainerError, Identifier};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn address_of(container: &Container) -> usize {
    container as *const Container as usize
}

#[test]
fn test_parent_get_set() {
    let container = Container::new();
    assert!(container.parent().is_none());

    let parent = Arc::new(Container::new());
    container.set_parent(Some(Arc::clone(&parent))).unwrap();
    assert!(Arc::ptr_eq(&container.parent().unwrap(), &parent));

    container.set_parent(None).unwrap();
    assert!(container.parent().is_none());
}

#[test]
fn test_constructed_child_knows_parent() {
    let parent = Arc::new(Container::new());
    let child = Container::with_parent(Arc::clone(&parent));
    let other = parent.child();

    assert!(Arc::ptr_eq(&child.parent().unwrap(), &parent));
    assert!(Arc::ptr_eq(&other.parent().unwrap(), &parent));
}

#[test]
fn test_self_parent_is_rejected() {
    let container = Arc::new(Container::new());

    let err = container.set_parent(Some(Arc::clone(&container))).unwrap_err();

    assert!(err.is_invalid_operation());
    assert!(container.parent().is_none());
}

#[test]
fn test_descendant_parent_is_rejected() {
    let root = Arc::new(Container::new());
    let child = Arc::new(root.child());
    let grandchild = Arc::new(child.child());

    let err = root.set_parent(Some(Arc::clone(&grandchild))).unwrap_err();
    assert!(err.is_invalid_operation());
    assert!(root.parent().is_none());

    // 兄弟容器不是后代
    let sibling = Arc::new(Container::new());
    assert!(root.set_parent(Some(sibling)).is_ok());
}

#[test]
fn test_resolves_from_parent() {
    let parent = Arc::new(Container::new());
    let child = parent.child();
    let id = Identifier::new("identifier");

    parent.bind_constant(&id, 0);

    assert_eq!(*child.resolve(&id).unwrap(), 0);
    assert_eq!(child.stats().parent_fallbacks, 1);
}

#[test]
fn test_resolves_from_grandparent() {
    let root = Arc::new(Container::new());
    let middle = Arc::new(root.child());
    let leaf = middle.child();
    let id = Identifier::new("identifier");

    root.bind_constant(&id, "deep");

    assert_eq!(*leaf.resolve(&id).unwrap(), "deep");
}

#[test]
fn test_resolves_through_long_parent_chain() {
    let root = Arc::new(Container::new());
    let id = Identifier::new("v");
    root.bind_constant(&id, 7);

    let mut leaf = Arc::clone(&root);
    for _ in 0..300 {
        leaf = Arc::new(leaf.child());
    }

    assert_eq!(*leaf.resolve(&id).unwrap(), 7);
    assert_eq!(leaf.stats().parent_fallbacks, 1);
}

#[test]
fn test_child_keeps_parent_alive() {
    let parent = Arc::new(Container::new());
    let id = Identifier::new("kept");
    parent.bind_constant(&id, "alive");

    let child = parent.child();
    drop(parent);

    assert_eq!(*child.resolve(&id).unwrap(), "alive");
}

#[test]
fn test_local_binding_shadows_parent() {
    let parent = Arc::new(Container::new());
    let child = parent.child();
    let id = Identifier::new("level");

    parent.bind_constant(&id, "parent");
    child.bind_constant(&id, "child");

    assert_eq!(*child.resolve(&id).unwrap(), "child");
    assert_eq!(*parent.resolve(&id).unwrap(), "parent");

    child.unbind(&id);
    assert_eq!(*child.resolve(&id).unwrap(), "parent");
}

#[test]
fn test_is_bound_ignores_parent() {
    let parent = Arc::new(Container::new());
    let child = parent.child();
    let id = Identifier::new("identifier");

    parent.bind_constant(&id, 0);

    assert!(parent.is_bound(&id));
    assert!(!child.is_bound(&id));
    assert!(child.resolve(&id).is_ok());
}

#[test]
fn test_alias_to_parent_binding() {
    let parent = Arc::new(Container::new());
    let child = parent.child();
    let real = Identifier::new("real");
    let alias = Identifier::new("alias");

    parent.bind_constant(&real, 7);
    child.alias(&alias, &real).unwrap();

    assert_eq!(*child.resolve(&alias).unwrap(), 7);
    assert!(parent.resolve(&alias).unwrap_err().is_not_found());
}

#[test]
fn test_missing_everywhere_is_not_found() {
    let parent = Arc::new(Container::new());
    let child = parent.child();
    let id = Identifier::<u8>::new("nowhere");

    match child.resolve(&id).unwrap_err() {
        ContainerError::NotFound { name, .. } => assert_eq!(name, "nowhere"),
        other => panic!("Expected NotFound, got {:?}", other),
    }
}

#[test]
fn test_not_found_lists_names_along_chain() {
    let parent = Arc::new(Container::new());
    let child = parent.child();
    parent.bind_constant(&Identifier::new("database"), ());
    child.bind_constant(&Identifier::new("cache"), ());

    match child.resolve(&Identifier::<()>::new("Database")).unwrap_err() {
        ContainerError::NotFound {
            available,
            suggestion,
            ..
        } => {
            assert_eq!(available, vec!["cache", "database"]);
            assert_eq!(suggestion.as_deref(), Some("database"));
        }
        other => panic!("Expected NotFound, got {:?}", other),
    }
}

#[test]
fn test_parent_factory_receives_parent_container() {
    let parent = Arc::new(Container::new());
    let child = parent.child();
    let id = Identifier::new("owner");
    let caller = Arc::new(AtomicUsize::new(0));

    let caller_clone = Arc::clone(&caller);
    parent.bind_dynamic(&id, move |c| {
        caller_clone.store(address_of(c), Ordering::SeqCst);
    });

    child.resolve(&id).unwrap();

    assert_eq!(caller.load(Ordering::SeqCst), address_of(&parent));
    assert_ne!(caller.load(Ordering::SeqCst), address_of(&child));
}

#[test]
fn test_parent_memoized_value_shared_by_children() {
    let parent = Arc::new(Container::new());
    let first = parent.child();
    let second = parent.child();
    let id = Identifier::new("pool");
    let calls = Arc::new(AtomicUsize::new(0));

    let calls_clone = Arc::clone(&calls);
    parent.bind_memoized(&id, move |_| calls_clone.fetch_add(1, Ordering::SeqCst));

    let a = first.resolve(&id).unwrap();
    let b = second.resolve(&id).unwrap();

    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_reparenting_changes_future_lookups() {
    let first = Arc::new(Container::new());
    let second = Arc::new(Container::new());
    let child = first.child();
    let id = Identifier::new("source");

    first.bind_constant(&id, "first");
    second.bind_constant(&id, "second");

    assert_eq!(*child.resolve(&id).unwrap(), "first");
    child.set_parent(Some(second)).unwrap();
    assert_eq!(*child.resolve(&id).unwrap(), "second");
}

#[test]
fn test_child_inherits_parent_config() {
    let parent = Arc::new(Container::with_config(nestdi::ContainerConfig {
        max_depth: 8,
        ..Default::default()
    }));
    let child = parent.child();

    assert_eq!(child.config().max_depth, 8);
}
