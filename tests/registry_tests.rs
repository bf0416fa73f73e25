//! Registry lifecycle and broadcast behavior

use std::sync::Arc;

use serial_test::serial;

use index_hooks::{
    HookGroup, HookRegistry, Index, ModelHandle, Target, global_registry,
};

struct Fixture {
    registry: HookRegistry,
    orders: Arc<HookGroup>,
    billing: Arc<HookGroup>,
    model: ModelHandle,
}

fn setup() -> Fixture {
    let orders = Index::new("orders_index", ["order"]);
    let model = ModelHandle::with_repositories("Order", orders.repositories().to_vec());

    let registry = HookRegistry::new();
    let orders_group = registry.create("orders_sync");
    let billing_group = registry.create("billing_sync");
    orders_group.register_model(&model).unwrap();
    billing_group.register_model(&model).unwrap();

    Fixture {
        registry,
        orders: orders_group,
        billing: billing_group,
        model,
    }
}

#[test]
fn test_create_and_lookup() {
    let fx = setup();
    assert_eq!(fx.registry.len(), 2);
    assert_eq!(fx.registry.store_keys(), ["orders_sync", "billing_sync"]);
    assert!(
        fx.registry
            .get("orders_sync")
            .is_some_and(|group| Arc::ptr_eq(&group, &fx.orders))
    );
    assert!(fx.registry.get("missing").is_none());
}

#[test]
fn test_duplicate_store_key_overwrites_in_place() {
    let fx = setup();
    let replacement = fx.registry.create("orders_sync");

    assert_eq!(fx.registry.len(), 2);
    // Same position, new group.
    assert_eq!(fx.registry.store_keys(), ["orders_sync", "billing_sync"]);
    assert!(
        fx.registry
            .get("orders_sync")
            .is_some_and(|group| Arc::ptr_eq(&group, &replacement))
    );
    assert!(replacement.models().is_empty());
}

#[test]
fn test_register_prebuilt_group() {
    let registry = HookRegistry::new();
    let group = registry.register(HookGroup::new("custom"));
    assert_eq!(group.store_key(), "custom");
    assert_eq!(registry.store_keys(), ["custom"]);
}

#[test]
fn test_reset_drops_all_groups() {
    let fx = setup();
    fx.registry.reset();
    assert!(fx.registry.is_empty());
    assert!(fx.registry.get("orders_sync").is_none());
}

#[test]
fn test_broadcast_disable_and_enable() {
    let fx = setup();
    fx.registry.disable_all(&[]).unwrap();
    assert!(!fx.orders.enabled(&[]).unwrap());
    assert!(!fx.billing.enabled(&[]).unwrap());
    assert!(fx.registry.all_disabled().unwrap());
    assert!(!fx.registry.all_enabled().unwrap());

    fx.registry.enable_all(&[]).unwrap();
    assert!(fx.registry.all_enabled().unwrap());
    assert!(!fx.registry.all_disabled().unwrap());
}

#[test]
fn test_broadcasts_on_empty_registry() {
    let registry = HookRegistry::new();
    registry.enable_all(&[]).unwrap();
    registry.disable_all(&[]).unwrap();
    assert!(registry.all_enabled().unwrap());
    assert!(registry.all_disabled().unwrap());
    let ran = registry.with_indexing_all(&[], || true).unwrap();
    assert!(ran);
}

#[test]
fn test_scoped_broadcast_covers_every_group() {
    let fx = setup();
    fx.registry.disable_all(&[]).unwrap();

    fx.registry
        .with_indexing_all(&[], || {
            assert!(fx.orders.enabled(&[]).unwrap());
            assert!(fx.billing.enabled(&[]).unwrap());
        })
        .unwrap();

    // Both groups return to their prior disabled state, innermost scope
    // restored first.
    assert!(!fx.orders.enabled(&[]).unwrap());
    assert!(!fx.billing.enabled(&[]).unwrap());
}

#[test]
fn test_scoped_broadcast_without_indexing() {
    let fx = setup();

    fx.registry
        .without_indexing_all(&[], || {
            assert!(fx.orders.disabled(&[]).unwrap());
            assert!(fx.billing.disabled(&[]).unwrap());
        })
        .unwrap();

    assert!(fx.orders.enabled(&[]).unwrap());
    assert!(fx.billing.enabled(&[]).unwrap());
}

#[test]
fn test_scoped_model_broadcast() {
    let fx = setup();

    fx.registry
        .without_indexing_for_model_all(&fx.model, &[], || {
            assert!(!fx.orders.enabled_for_model(&fx.model, &[]).unwrap());
            assert!(!fx.billing.enabled_for_model(&fx.model, &[]).unwrap());
        })
        .unwrap();

    assert!(fx.orders.enabled_for_model(&fx.model, &[]).unwrap());
    assert!(fx.billing.enabled_for_model(&fx.model, &[]).unwrap());
}

#[test]
fn test_scoped_model_broadcast_requires_model_everywhere() {
    let fx = setup();
    let stranger = ModelHandle::with_repositories(
        "Stranger",
        Index::new("strangers_index", ["stranger"]).repositories().to_vec(),
    );

    let mut ran = false;
    let result = fx.registry.with_indexing_for_model_all(&stranger, &[], || {
        ran = true;
    });
    assert!(result.is_err());
    assert!(!ran);
}

#[test]
fn test_scoped_broadcast_restores_after_partial_failure() {
    let orders = Index::new("orders_index", ["order"]);
    let model = ModelHandle::with_repositories("Order", orders.repositories().to_vec());

    let registry = HookRegistry::new();
    let first = registry.create("first");
    first.register_model(&model).unwrap();
    // Second group never learns about the model, so the broadcast fails
    // after the first group's scope is already open.
    registry.create("second");

    first.disable_for_model(&model, &[]).unwrap();
    let result = registry.with_indexing_for_model_all(&model, &[], || ());
    assert!(result.is_err());

    // The first group's scope was unwound.
    assert!(!first.enabled_for_model(&model, &[]).unwrap());
}

#[test]
fn test_targeted_broadcast() {
    let orders = Index::new("orders_index", ["order"]);
    let refunds = Index::new("refunds_index", ["refund"]);
    let model = ModelHandle::with_repositories(
        "Order",
        orders
            .repositories()
            .iter()
            .chain(refunds.repositories())
            .cloned()
            .collect::<Vec<_>>(),
    );

    let registry = HookRegistry::new();
    let group = registry.create("orders_sync");
    group.register_model(&model).unwrap();

    registry.disable_all(&[Target::from(&refunds)]).unwrap();
    assert!(group.enabled(&[Target::from(&orders)]).unwrap());
    assert!(group.disabled(&[Target::from(&refunds)]).unwrap());
}

#[test]
#[serial]
fn test_global_registry_lifecycle() {
    let registry = global_registry();
    registry.reset();

    let group = registry.create("global_sync");
    assert!(
        registry
            .get("global_sync")
            .is_some_and(|found| Arc::ptr_eq(&found, &group))
    );

    registry.reset();
    assert!(registry.is_empty());
}

#[test]
#[serial]
fn test_global_registry_is_shared() {
    global_registry().reset();
    global_registry().create("shared_sync");
    assert_eq!(global_registry().store_keys(), ["shared_sync"]);
    global_registry().reset();
}
