//! Unit tests for the factory: memoization, fresh execution and edges.

use super::*;
use serde_json::{json, Value};
use std::cell::Cell;

fn ids(list: &[&str]) -> Vec<DataId> {
    list.iter().map(|s| DataId::from(*s)).collect()
}

fn record<'a>(factory: &'a Factory<Value>, id: &str) -> &'a GraphRecord {
    factory
        .graph_records()
        .get(id)
        .unwrap_or_else(|| panic!("missing graph record for {id}"))
}

#[test]
fn test_base_and_variant_scenario() {
    let mut f: Factory<Value> = Factory::new();
    f.register("base", |_| Ok(json!({"active": true, "tags": [1, 2, 3]})))
        .unwrap();
    f.register("variant", |ctx| {
        let mut data = ctx.fetch_as_parent("base")?;
        data["active"] = json!(false);
        data["tags"] = json!([1, 2, 3, 4]);
        Ok(data)
    })
    .unwrap();

    assert_eq!(f.get("base").unwrap()["active"], json!(true));
    assert_eq!(f.get("base").unwrap()["tags"], json!([1, 2, 3]));
    assert_eq!(f.get("variant").unwrap()["active"], json!(false));
    assert_eq!(f.get("variant").unwrap()["tags"], json!([1, 2, 3, 4]));

    let variant = record(&f, "variant");
    assert_eq!(variant.inherit_data_id, Some(DataId::from("base")));
    assert!(variant.properties.is_empty());
    assert_eq!(record(&f, "base").inherit_data_id, None);
}

#[test]
fn test_get_returns_registration_time_value() {
    let runs = Rc::new(Cell::new(0));
    let counter = Rc::clone(&runs);

    let mut f: Factory<Value> = Factory::new();
    f.register("counted", move |_| {
        counter.set(counter.get() + 1);
        Ok(json!({ "run": counter.get() }))
    })
    .unwrap();
    f.register("user", |ctx| {
        let a = ctx.fetch_as_child("counted")?;
        let b = ctx.fetch_as_child("counted")?;
        Ok(json!([a, b]))
    })
    .unwrap();

    // Registration ran it once, the two child fetches ran it again.
    assert_eq!(runs.get(), 3);
    assert_eq!(f.get("counted").unwrap(), &json!({"run": 1}));
    assert_eq!(f.get("counted").unwrap(), f.get("counted").unwrap());
    assert_eq!(f.get("user").unwrap(), &json!([{"run": 2}, {"run": 3}]));
}

#[test]
fn test_sibling_embeddings_are_independent() {
    let mut f: Factory<Value> = Factory::new();
    f.register("child", |_| Ok(json!({"name": "c"}))).unwrap();
    f.register("parent", |ctx| {
        let mut left = ctx.fetch_as_child("child")?;
        let right = ctx.fetch_as_child("child")?;
        left["name"] = json!("changed");
        Ok(json!({"left": left, "right": right}))
    })
    .unwrap();

    let parent = f.get("parent").unwrap();
    assert_eq!(parent["left"]["name"], json!("changed"));
    assert_eq!(parent["right"]["name"], json!("c"));
    assert_eq!(f.get("child").unwrap()["name"], json!("c"));
}

#[test]
fn test_inheritance_does_not_touch_memoized_base() {
    let mut f: Factory<Value> = Factory::new();
    f.register("a", |_| Ok(json!({"list": [1], "flag": true})))
        .unwrap();
    f.register("b", |ctx| {
        let mut data = ctx.fetch_as_parent("a")?;
        if let Some(list) = data["list"].as_array_mut() {
            list.push(json!(2));
        }
        data["flag"] = json!(false);
        Ok(data)
    })
    .unwrap();

    assert_eq!(f.get("a").unwrap(), &json!({"list": [1], "flag": true}));
    assert_eq!(f.get("b").unwrap(), &json!({"list": [1, 2], "flag": false}));
}

#[test]
fn test_containment_is_deduplicated_in_first_seen_order() {
    let mut f: Factory<Value> = Factory::new();
    f.register("x", |_| Ok(json!("x"))).unwrap();
    f.register("y", |_| Ok(json!("y"))).unwrap();
    f.register("p", |ctx| {
        let mut out = Vec::new();
        out.push(ctx.fetch_as_child("x")?);
        out.push(ctx.fetch_as_child("x")?);
        out.push(ctx.fetch_as_child("y")?);
        out.push(ctx.fetch_as_child("x")?);
        Ok(Value::Array(out))
    })
    .unwrap();

    assert_eq!(record(&f, "p").properties, ids(&["x", "y"]));
    assert_eq!(f.get("p").unwrap(), &json!(["x", "x", "y", "x"]));
}

#[test]
fn test_last_inherit_call_wins() {
    let mut f: Factory<Value> = Factory::new();
    f.register("a", |_| Ok(json!(1))).unwrap();
    f.register("b", |_| Ok(json!(2))).unwrap();
    f.register("c", |ctx| {
        ctx.fetch_as_parent("a")?;
        ctx.fetch_as_parent("b")
    })
    .unwrap();

    assert_eq!(record(&f, "c").inherit_data_id, Some(DataId::from("b")));
    assert_eq!(f.get("c").unwrap(), &json!(2));
}

#[test]
fn test_reregistration_replaces_graph_record() {
    let mut f: Factory<Value> = Factory::new();
    f.register("x", |_| Ok(json!("x"))).unwrap();
    f.register("y", |_| Ok(json!("y"))).unwrap();
    f.register("z", |ctx| ctx.fetch_as_child("x")).unwrap();
    assert_eq!(record(&f, "z").properties, ids(&["x"]));

    f.register("z", |ctx| ctx.fetch_as_parent("y")).unwrap();
    let z = record(&f, "z");
    assert!(z.properties.is_empty());
    assert_eq!(z.inherit_data_id, Some(DataId::from("y")));
    assert_eq!(f.get("z").unwrap(), &json!("y"));
    assert_eq!(f.len(), 3);
}

#[test]
fn test_reexecution_through_fetch_replaces_graph_record() {
    let toggle = Rc::new(Cell::new(false));
    let seen = Rc::clone(&toggle);

    let mut f: Factory<Value> = Factory::new();
    f.register("a", |_| Ok(json!("a"))).unwrap();
    f.register("b", |_| Ok(json!("b"))).unwrap();
    f.register("z", move |ctx| {
        if seen.get() {
            ctx.fetch_as_child("b")
        } else {
            ctx.fetch_as_child("a")
        }
    })
    .unwrap();
    assert_eq!(record(&f, "z").properties, ids(&["a"]));

    toggle.set(true);
    f.register("outer", |ctx| ctx.fetch_as_child("z")).unwrap();

    // The memoized value still comes from registration time.
    assert_eq!(f.get("z").unwrap(), &json!("a"));
    assert_eq!(record(&f, "z").properties, ids(&["b"]));
    assert_eq!(f.get("outer").unwrap(), &json!("b"));
}

#[test]
fn test_get_unknown_id_fails() {
    let f: Factory<Value> = Factory::new();
    let err = f.get("nonexistent").unwrap_err();
    assert_eq!(
        err,
        FactoryError::NotRegistered {
            id: DataId::from("nonexistent"),
            chain: BuildChain::default(),
        }
    );
    assert_eq!(err.to_string(), "`nonexistent` is not registered");
}

#[test]
fn test_unknown_child_aborts_without_graph_mutation() {
    let mut f: Factory<Value> = Factory::new();
    f.register("leaf", |_| Ok(json!("leaf"))).unwrap();
    f.register("mid", |ctx| ctx.fetch_as_child("leaf")).unwrap();
    let before = f.list_graph_records();

    let err = f
        .register("broken", |ctx| {
            let ok = ctx.fetch_as_child("mid")?;
            let missing = ctx.fetch_as_child("nonexistent")?;
            Ok(json!([ok, missing]))
        })
        .unwrap_err();

    match &err {
        FactoryError::NotRegistered { id, chain } => {
            assert_eq!(id, "nonexistent");
            assert_eq!(chain.ids(), ids(&["broken"]).as_slice());
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(
        err.to_string(),
        "`nonexistent` is not registered (while building broken)"
    );
    assert_eq!(f.list_graph_records(), before);
    assert!(!f.contains("broken"));
    assert!(f.get("broken").is_err());
    assert_eq!(f.depth(), 0);
}

#[test]
fn test_failed_reregistration_keeps_previous_builder() {
    let mut f: Factory<Value> = Factory::new();
    f.register("x", |_| Ok(json!(1))).unwrap();
    f.register("x", |ctx| ctx.fetch_as_child("missing"))
        .unwrap_err();

    assert_eq!(f.get("x").unwrap(), &json!(1));
    f.register("user", |ctx| ctx.fetch_as_child("x")).unwrap();
    assert_eq!(f.get("user").unwrap(), &json!(1));
}

#[test]
fn test_fetch_outside_builder_fails() {
    let mut f: Factory<Value> = Factory::new();
    f.register("x", |_| Ok(json!(1))).unwrap();

    assert_eq!(
        f.fetch_as_child("x").unwrap_err(),
        FactoryError::NoActiveFrame { id: DataId::from("x") }
    );
    assert_eq!(
        f.fetch_as_parent("x").unwrap_err(),
        FactoryError::NoActiveFrame { id: DataId::from("x") }
    );
    assert!(record(&f, "x").properties.is_empty());
}

#[test]
fn test_reject_policy_refuses_duplicates() {
    let mut f: Factory<Value> = Factory::with_options(FactoryOptions {
        on_duplicate: DuplicatePolicy::Reject,
    });
    f.register("x", |_| Ok(json!(1))).unwrap();
    let err = f.register("x", |_| Ok(json!(2))).unwrap_err();

    assert_eq!(err, FactoryError::AlreadyRegistered { id: DataId::from("x") });
    assert_eq!(f.get("x").unwrap(), &json!(1));
}

#[test]
fn test_empty_id_is_rejected() {
    let mut f: Factory<Value> = Factory::new();
    assert_eq!(
        f.register("", |_| Ok(Value::Null)).unwrap_err(),
        FactoryError::InvalidId
    );
    assert!(f.is_empty());
}

#[test]
fn test_self_reference_is_a_cycle() {
    let mut f: Factory<Value> = Factory::new();
    f.register("a", |_| Ok(json!(0))).unwrap();
    f.register("loop", |ctx| ctx.fetch_as_child("a")).unwrap();

    // Overwriting `loop` with a builder that refers back to it.
    let err = f
        .register("loop", |ctx| {
            let inner = ctx.fetch_as_parent("loop")?;
            Ok(inner)
        })
        .unwrap_err();

    assert_eq!(
        err,
        FactoryError::Cycle {
            id: DataId::from("loop"),
            chain: BuildChain::new(ids(&["loop"])),
        }
    );
    assert_eq!(f.depth(), 0);
    assert_eq!(record(&f, "loop").properties, ids(&["a"]));
}

#[test]
fn test_swallowed_fetch_error_leaves_no_dangling_edge() {
    let mut f: Factory<Value> = Factory::new();
    f.register("base", |_| Ok(json!({"kind": "base"}))).unwrap();
    f.register("variant", |ctx| {
        let value = ctx.fetch_as_parent("base")?;
        ctx.fetch_as_child("nonexistent").ok();
        ctx.fetch_as_parent("typo").ok();
        Ok(value)
    })
    .unwrap();

    let variant = record(&f, "variant");
    assert_eq!(variant.inherit_data_id, Some(DataId::from("base")));
    assert!(variant.properties.is_empty());
    assert!(f.graph_records().get("nonexistent").is_none());
    assert!(f.graph_records().get("typo").is_none());
    assert_eq!(f.get("variant").unwrap(), &json!({"kind": "base"}));
}

#[test]
fn test_swallowed_cycle_leaves_no_edge() {
    let mut f: Factory<Value> = Factory::new();
    f.register("leaf", |_| Ok(json!("leaf"))).unwrap();
    f.register("node", |ctx| {
        let leaf = ctx.fetch_as_child("leaf")?;
        let err = ctx.fetch_as_child("node").unwrap_err();
        assert!(matches!(err, FactoryError::Cycle { .. }));
        ctx.fetch_as_parent("node").ok();
        Ok(leaf)
    })
    .unwrap();

    let node = record(&f, "node");
    assert_eq!(node.properties, ids(&["leaf"]));
    assert_eq!(node.inherit_data_id, None);
    assert_eq!(f.depth(), 0);
}

#[test]
fn test_failing_child_builder_is_not_recorded_as_edge() {
    let mut f: Factory<Value> = Factory::new();
    f.register("leaf", |_| Ok(json!("leaf"))).unwrap();
    f.register("mid", |ctx| ctx.fetch_as_child("leaf")).unwrap();
    // Builds fine at top level, fails whenever it is nested.
    f.register("broken_on_rerun", |ctx| {
        if ctx.depth() > 1 {
            ctx.fetch_as_child("missing")
        } else {
            Ok(json!("top"))
        }
    })
    .unwrap();
    f.register("holder", |ctx| {
        ctx.fetch_as_child("broken_on_rerun").ok();
        ctx.fetch_as_child("mid")
    })
    .unwrap();

    assert_eq!(record(&f, "holder").properties, ids(&["mid"]));
    assert_eq!(record(&f, "broken_on_rerun").properties, Vec::<DataId>::new());
}

#[test]
fn test_nested_frames_attribute_edges_to_innermost_builder() {
    let mut f: Factory<Value> = Factory::new();
    f.register("leaf", |_| Ok(json!("leaf"))).unwrap();
    f.register("mid", |ctx| {
        let leaf = ctx.fetch_as_child("leaf")?;
        Ok(json!({"leaf": leaf}))
    })
    .unwrap();
    f.register("top", |ctx| {
        assert_eq!(ctx.data_id(), "top");
        assert_eq!(ctx.depth(), 1);
        let mid = ctx.fetch_as_child("mid")?;
        let leaf = ctx.fetch_as_child("leaf")?;
        Ok(json!({"mid": mid, "leaf": leaf}))
    })
    .unwrap();

    assert_eq!(record(&f, "top").properties, ids(&["mid", "leaf"]));
    assert_eq!(record(&f, "mid").properties, ids(&["leaf"]));
    assert!(record(&f, "leaf").properties.is_empty());
    assert_eq!(f.depth(), 0);
}

#[test]
fn test_depth_tracks_nesting() {
    let depths = Rc::new(std::cell::RefCell::new(Vec::new()));
    let (d1, d2) = (Rc::clone(&depths), Rc::clone(&depths));

    let mut f: Factory<Value> = Factory::new();
    f.register("inner", move |ctx| {
        d1.borrow_mut().push(ctx.depth());
        Ok(Value::Null)
    })
    .unwrap();
    f.register("outer", move |ctx| {
        d2.borrow_mut().push(ctx.depth());
        ctx.fetch_as_child("inner")
    })
    .unwrap();

    assert_eq!(*depths.borrow(), vec![1, 1, 2]);
}

#[derive(Debug, Clone, PartialEq)]
enum Shape {
    Circle(u32),
    Square(u32),
}

#[derive(Debug, PartialEq)]
struct Circle(u32);

impl TryFrom<Shape> for Circle {
    type Error = Shape;

    fn try_from(shape: Shape) -> std::result::Result<Self, Shape> {
        match shape {
            Shape::Circle(r) => Ok(Circle(r)),
            other => Err(other),
        }
    }
}

#[test]
fn test_typed_fetch_converts_and_reports_mismatch() {
    let mut f: Factory<Shape> = Factory::new();
    f.register("c", |_| Ok(Shape::Circle(3))).unwrap();
    f.register("s", |_| Ok(Shape::Square(2))).unwrap();
    f.register("bigger", |ctx| {
        let Circle(r) = ctx.parent::<Circle>("c")?;
        Ok(Shape::Circle(r * 2))
    })
    .unwrap();

    assert_eq!(f.get_as::<Circle>("bigger").unwrap(), Circle(6));
    assert!(matches!(
        f.get_as::<Circle>("s"),
        Err(FactoryError::TypeMismatch { .. })
    ));

    let err = f
        .register("wrong", |ctx| {
            let Circle(r) = ctx.child::<Circle>("s")?;
            Ok(Shape::Circle(r))
        })
        .unwrap_err();
    match err {
        FactoryError::TypeMismatch { id, chain, .. } => {
            assert_eq!(id, "s");
            assert_eq!(chain.ids(), ids(&["wrong"]).as_slice());
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_graph_record_json_shape() {
    let mut with_parent = GraphRecord::new(DataId::from("Test02Base1"));
    with_parent.set_inherit(DataId::from("Test01Base1"));
    with_parent.add_property(DataId::from("Test02Friends2"));
    let plain = GraphRecord::new(DataId::from("Test06Base1"));

    assert_eq!(
        serde_json::to_value(&with_parent).unwrap(),
        json!({
            "dataId": "Test02Base1",
            "inheritDataId": "Test01Base1",
            "properties": ["Test02Friends2"]
        })
    );
    assert_eq!(
        serde_json::to_value(&plain).unwrap(),
        json!({"dataId": "Test06Base1", "properties": []})
    );

    let legacy: GraphRecord = serde_json::from_value(json!({
        "dataId": "Test06Base1",
        "inheritDataId": "",
        "properties": []
    }))
    .unwrap();
    assert_eq!(legacy, plain);
}

#[test]
fn test_records_are_listed_in_id_order() {
    let mut f: Factory<Value> = Factory::new();
    for id in ["m", "b", "z", "a"] {
        f.register(id, |_| Ok(Value::Null)).unwrap();
    }
    let listed: Vec<String> = f
        .list_graph_records()
        .into_iter()
        .map(|r| r.data_id.to_string())
        .collect();
    assert_eq!(listed, vec!["a", "b", "m", "z"]);
    assert_eq!(
        f.ids().into_iter().map(DataId::as_str).collect::<Vec<_>>(),
        vec!["a", "b", "m", "z"]
    );
}
