//! Edge case tests for fos-components
//!
//! Rollback, malformed input, custom collaborators and unusual declarations.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use fos_components::{
    content, value_map, Captured, ComponentError, ComponentRegistry, Config, Content, ElementId,
    ElementTree, Input, Read, RenderHost, Rule, Schema, SlotOptions, ValidationFailure,
    ValidationProvider, Value,
};

fn sized_list() -> Arc<Schema> {
    let mut list = Schema::base("list");
    list.slot_with("item", SlotOptions::repeated(), |item| {
        item.attribute_with_default("size", "md")?;
        item.validates("size", Rule::Length { min: None, max: Some(2) });
        Ok(())
    })
    .unwrap();
    list.build()
}

// ============================================================================
// Rollback
// ============================================================================

#[test]
fn test_failing_child_aborts_parent() {
    let schema = sized_list();
    let mut tree = ElementTree::new();

    let result = tree.create(
        &schema,
        Input::new(),
        Some(content(|tree, list| {
            tree.fill_slot(list, "item", Input::new().with("size", "sm"), None)?;
            tree.fill_slot(list, "item", Input::new().with("size", "huge"), None)?;
            Ok(Captured::default())
        })),
    );

    assert!(matches!(result, Err(ComponentError::Validation(_))));
    assert!(tree.is_empty());
}

#[test]
fn test_ignored_child_failure_leaves_no_reference() {
    let schema = sized_list();
    let mut tree = ElementTree::new();

    let list = tree
        .create(
            &schema,
            Input::new(),
            Some(content(|tree, list| {
                tree.fill_slot(list, "item", Input::new().with("size", "sm"), None)?;
                assert!(tree.fill_slot(list, "item", Input::new().with("size", "huge"), None).is_err());
                tree.fill_slot(list, "item", Input::new().with("size", "lg"), None)?;
                Ok(Captured::default())
            })),
        )
        .unwrap();

    let items = tree.element(list).unwrap().children("item").to_vec();
    assert_eq!(items.len(), 2);
    assert_eq!(tree.len(), 3);
    for id in items {
        assert!(tree.get(id).is_some());
    }
}

#[test]
fn test_after_init_error_discards_element() {
    let mut builder = Schema::base("picky");
    builder.after_init(|_, _| Err(ComponentError::UnknownAccessor("nope".into())));
    let schema = builder.build();

    let mut tree = ElementTree::new();
    assert!(tree.create(&schema, Input::new(), None).is_err());
    assert!(tree.is_empty());
}

// ============================================================================
// Input
// ============================================================================

#[test]
fn test_malformed_class_input() {
    let schema = Schema::base("box").build();
    let mut tree = ElementTree::new();

    let err = tree.create(&schema, Input::new().with("class", true), None).unwrap_err();
    assert_eq!(err.to_string(), "Invalid input for 'class': expected string or list, got bool");

    let err = tree
        .create(&schema, Input::new().with("class", value_map([("a", "b")])), None)
        .unwrap_err();
    assert!(matches!(err, ComponentError::InputShape { .. }));
}

#[test]
fn test_malformed_splat_input() {
    let schema = Schema::base("box").build();
    let mut tree = ElementTree::new();

    let err = tree.create(&schema, Input::new().with("splat", vec!["a"]), None).unwrap_err();
    assert_eq!(err.to_string(), "Invalid input for 'splat': expected map, got list");
}

#[test]
fn test_null_input_falls_back_to_default() {
    let mut builder = Schema::base("toggle");
    builder
        .attribute_with_default("label", "Toggle")
        .unwrap()
        .attribute_with_default("on", true)
        .unwrap();
    let schema = builder.build();

    let mut tree = ElementTree::new();
    let id = tree
        .create(&schema, Input::new().with("label", Value::Null).with("on", false), None)
        .unwrap();
    let element = tree.element(id).unwrap();

    assert_eq!(element.get("label"), Some(&Value::from("Toggle")));
    assert_eq!(element.get("on"), Some(&Value::from(false)));
}

#[test]
fn test_unknown_input_ignored_by_default() {
    let schema = Schema::base("box").build();
    let mut tree = ElementTree::new();
    let id = tree.create(&schema, Input::new().with("typo", "x"), None).unwrap();
    assert!(tree.element(id).unwrap().get("typo").is_none());
}

#[test]
fn test_unknown_input_rejected_when_configured() {
    let mut builder = Schema::base("box");
    builder.attribute("title").unwrap();
    let schema = builder.build();

    let mut tree = ElementTree::with_config(Config {
        reject_unknown_input: true,
        ..Config::default()
    });

    assert!(tree.create(&schema, Input::new().with("title", "ok").with("class", "a"), None).is_ok());
    let err = tree.create(&schema, Input::new().with("typo", "x"), None).unwrap_err();
    assert!(matches!(err, ComponentError::InputShape { ref key, .. } if key == "typo"));
}

#[test]
fn test_input_from_iterator() {
    let input: Input = [("a", 1), ("b", 2)].into_iter().collect();
    assert_eq!(input.get("b"), Some(&Value::from(2)));
    assert!(!input.is_empty());
}

// ============================================================================
// Dispatch
// ============================================================================

#[test]
fn test_unknown_accessor() {
    let schema = Schema::base("box").build();
    let mut tree = ElementTree::new();
    let id = tree.create(&schema, Input::new(), None).unwrap();

    let err = tree.call(id, "nothing", None, None).unwrap_err();
    assert_eq!(err.to_string(), "Undefined method 'nothing'");
}

#[test]
fn test_no_such_element() {
    let tree = ElementTree::new();
    let mut other = ElementTree::new();
    let id = other.create(&Schema::base("box").build(), Input::new(), None).unwrap();

    assert!(matches!(tree.element(id), Err(ComponentError::NoSuchElement(_))));
    assert!(tree.ancestors(id).is_empty());
    assert_eq!(tree.content(id), "");
}

#[test]
fn test_method_rejects_arguments() {
    let mut builder = Schema::base("box");
    builder.method("answer", |_, _| Value::from(42)).unwrap();
    let schema = builder.build();

    let mut tree = ElementTree::new();
    let id = tree.create(&schema, Input::new(), None).unwrap();
    assert!(matches!(
        tree.call(id, "answer", Some(Input::new()), None),
        Err(ComponentError::InputShape { .. })
    ));
    assert_eq!(tree.call(id, "answer", None, None).unwrap(), Read::Computed(Value::from(42)));
}

#[test]
fn test_uncountable_slot_has_single_accessor() {
    let mut builder = Schema::base("feed");
    builder.slot("news", SlotOptions::repeated()).unwrap();
    let schema = builder.build();

    assert_eq!(schema.accessor_names().collect::<Vec<_>>(), ["news"]);

    let mut tree = ElementTree::new();
    let feed = tree.create(&schema, Input::new(), None).unwrap();
    let item = tree.fill_slot(feed, "news", Input::new(), None).unwrap();
    assert_eq!(tree.call(feed, "news", None, None).unwrap(), Read::Children(&[item]));
}

#[test]
fn test_slot_content_without_input() {
    let mut builder = Schema::base("card");
    builder.slot("footer", SlotOptions::single()).unwrap();
    let schema = builder.build();

    let mut tree = ElementTree::new();
    let card = tree.create(&schema, Input::new(), None).unwrap();
    let footer = match tree
        .call(card, "footer", None, Some(content(|_, _| Ok("bye".into()))))
        .unwrap()
    {
        Read::Child(Some(id)) => id,
        other => panic!("expected child, got {:?}", other),
    };
    assert_eq!(tree.content(footer), "bye");
}

// ============================================================================
// Declarations
// ============================================================================

#[test]
fn test_slot_replaced_by_method_in_child() {
    let mut parent = Schema::base("parent");
    parent.slot("item", SlotOptions::repeated()).unwrap();
    let parent = parent.build();

    let mut child = Schema::extend(&parent, "child");
    child.method("item", |_, _| Value::from("computed")).unwrap();
    let child = child.build();

    assert!(child.slot("item").is_none());
    assert!(child.accessor("items").is_none());
    assert!(parent.accessor("items").is_some());
}

#[test]
fn test_named_delegate_unknown_component() {
    let registry = ComponentRegistry::new();
    let mut builder = Schema::base("card").with_registry(&registry);
    let err = builder
        .slot("header", SlotOptions::single().component("missing"))
        .unwrap_err();
    assert_eq!(err.to_string(), "Unknown component: missing");
}

#[test]
fn test_delegate_schema_is_extended_not_shared() {
    let mut header = Schema::base("header");
    header.attribute("title").unwrap();
    let header = header.build();

    let mut card = Schema::base("card");
    card.slot_with("header", SlotOptions::single().delegate(&header), |h| {
        h.attribute("subtitle")?;
        Ok(())
    })
    .unwrap();
    let card = card.build();

    let slot_schema = &card.slot("header").unwrap().schema;
    assert!(slot_schema.default_value("title").is_some());
    assert!(slot_schema.default_value("subtitle").is_some());
    assert!(header.default_value("subtitle").is_none());
}

#[test]
fn test_invalid_component_names() {
    let mut registry = ComponentRegistry::new();
    let err = registry.define("Bad Name", Schema::base("bad").build()).unwrap_err();
    assert!(matches!(err, ComponentError::InvalidComponentName(_)));
    assert!(registry.is_empty());
}

#[test]
fn test_schema_is_shareable_across_threads() {
    let mut builder = Schema::base("shared");
    builder.attribute_with_default("size", "md").unwrap();
    let schema = builder.build();

    let handle = {
        let schema = Arc::clone(&schema);
        std::thread::spawn(move || {
            let mut tree = ElementTree::new();
            let id = tree.create(&schema, Input::new(), None).unwrap();
            tree.element(id).unwrap().get("size").cloned()
        })
    };

    assert_eq!(handle.join().unwrap(), Some(Value::from("md")));
}

// ============================================================================
// Collaborators
// ============================================================================

#[derive(Default)]
struct RecordingHost {
    calls: Rc<RefCell<Vec<ElementId>>>,
}

impl RenderHost for RecordingHost {
    fn capture(&self, tree: &mut ElementTree, id: ElementId, content: Content<'_>) -> fos_components::Result<Captured> {
        self.calls.borrow_mut().push(id);
        let inner = content(tree, id)?;
        Ok(format!("[{}]", inner).into())
    }
}

#[test]
fn test_custom_host_wraps_capture() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let mut tree = ElementTree::new().host(RecordingHost {
        calls: Rc::clone(&calls),
    });

    let id = tree
        .create(&Schema::base("box").build(), Input::new(), Some(content(|_, _| Ok("x".into()))))
        .unwrap();

    assert_eq!(tree.content(id), "[x]");
    assert_eq!(*calls.borrow(), [id]);
}

struct RejectAll;

impl ValidationProvider for RejectAll {
    fn validate(&self, _tree: &ElementTree, _id: ElementId) -> Result<(), ValidationFailure> {
        let mut failure = ValidationFailure::new();
        failure.add("base", "is not allowed");
        Err(failure)
    }
}

#[test]
fn test_custom_validator() {
    let mut tree = ElementTree::new().validator(RejectAll);
    let err = tree.create(&Schema::base("box").build(), Input::new(), None).unwrap_err();
    assert_eq!(err.to_string(), "Validation failed: Base is not allowed");
    assert!(tree.is_empty());
}

#[test]
fn test_custom_rule_sees_children() {
    let mut builder = Schema::base("pair");
    builder.slot("item", SlotOptions::repeated()).unwrap();
    builder.validates(
        "item",
        Rule::custom("must come in pairs", |tree, id| {
            tree.get(id).is_some_and(|el| el.children("item").len() % 2 == 0)
        }),
    );
    let schema = builder.build();

    let mut tree = ElementTree::new();
    let err = tree
        .create(
            &schema,
            Input::new(),
            Some(content(|tree, pair| {
                tree.fill_slot(pair, "item", Input::new(), None)?;
                Ok(Captured::default())
            })),
        )
        .unwrap_err();
    assert_eq!(err.to_string(), "Validation failed: Item must come in pairs");
}

#[test]
fn test_custom_class_separator() {
    let mut builder = Schema::base("block");
    builder.base_class("block");
    let schema = builder.build();

    let mut tree = ElementTree::with_config(Config {
        class_separator: "__".to_string(),
        ..Config::default()
    });
    let id = tree.create(&schema, Input::new(), None).unwrap();
    assert_eq!(tree.join_class(id, "element").unwrap().as_deref(), Some("block__element"));

    let plain = tree.create(&Schema::base("plain").build(), Input::new(), None).unwrap();
    assert_eq!(tree.join_class(plain, "element").unwrap(), None);
}
