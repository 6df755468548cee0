//! Every construction path into a schema rejects invariant violations

use rftemplate::ir::{
    BoxNode, FrameNode, NodeKind, SchemaBuilder, TemplateNode, TemplateSchema, TextNode, TokenDef, Variant,
};
use rftemplate::{Canvas, Error};

fn text(id: &str) -> TemplateNode {
    TemplateNode::new(id, NodeKind::Text(TextNode::new(id))).at(0.0, 0.0)
}

fn canvas() -> Canvas {
    Canvas { width: 600, height: 400 }
}

fn frame(children: Vec<TemplateNode>) -> TemplateNode {
    TemplateNode::new(
        "frame-1",
        NodeKind::Frame(FrameNode {
            width: 600,
            height: 400,
            padding: Default::default(),
            background: None,
            children,
        }),
    )
}

#[test]
fn duplicate_ids_are_rejected_at_any_depth() {
    let err = SchemaBuilder::flat("s", canvas(), vec![text("a"), text("a")]).build().unwrap_err();
    assert!(matches!(err, Error::DuplicateNodeId(ref id) if id == "a"));

    let nested = TemplateNode::new(
        "box-2",
        NodeKind::Box(BoxNode {
            children: vec![text("a")],
            ..Default::default()
        }),
    );
    let err = SchemaBuilder::tree("s", canvas(), frame(vec![text("a"), nested])).build().unwrap_err();
    assert!(matches!(err, Error::DuplicateNodeId(_)));
    assert!(err.is_invariant_violation());
}

#[test]
fn variant_overrides_must_reference_existing_nodes() {
    let err = SchemaBuilder::flat("s", canvas(), vec![text("a")])
        .variant(Variant::new("v", "V").hide("a").hide("ghost"))
        .build()
        .unwrap_err();
    match err {
        Error::DanglingReference { node_id, referrer } => {
            assert_eq!(node_id, "ghost");
            assert!(referrer.contains("'v'"));
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn canvas_must_be_positive() {
    let err = SchemaBuilder::flat("s", Canvas { width: 0, height: 400 }, vec![text("a")])
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::InvalidCanvas { width: 0, height: 400 }));
}

#[test]
fn version_one_is_flat_and_version_two_is_rooted() {
    let container = TemplateNode::new("box-1", NodeKind::Box(BoxNode::default()));
    let err = SchemaBuilder::flat("s", canvas(), vec![text("a"), container]).build().unwrap_err();
    assert!(matches!(err, Error::StructureError(_)));

    let err = SchemaBuilder::tree("s", canvas(), text("a")).build().unwrap_err();
    assert!(matches!(err, Error::StructureError(_)));

    let ok = SchemaBuilder::tree("s", canvas(), frame(vec![text("a")])).build().unwrap();
    assert_eq!(ok.node_count(), 2);
    assert_eq!(ok.root().map(|r| r.id.as_str()), Some("frame-1"));
}

#[test]
fn token_derivations_must_be_acyclic_and_sourced() {
    let err = SchemaBuilder::flat("s", canvas(), vec![text("a")])
        .token("a", TokenDef::lighten("b", 10.0))
        .token("b", TokenDef::lighten("a", 10.0))
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::StructureError(_)));

    let err = SchemaBuilder::flat("s", canvas(), vec![text("a")])
        .token("secondary", TokenDef::lighten("primary", 25.0))
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::StructureError(ref msg) if msg.contains("primary")));
}

#[test]
fn persisted_schemas_pass_the_same_gate() {
    let duplicate = r#"{
        "id": "s", "canvas": {"width": 10, "height": 10}, "version": 1,
        "nodes": [
            {"id": "a", "type": "text", "content": "x"},
            {"id": "a", "type": "text", "content": "y"}
        ]
    }"#;
    assert!(TemplateSchema::from_json(duplicate).is_err());

    let dangling_index = r#"{
        "id": "s", "canvas": {"width": 10, "height": 10}, "version": 1,
        "nodes": [{"id": "a", "type": "text", "content": "x"}],
        "bindings": [{"nodeId": "gone", "field": "title", "kind": "text"}]
    }"#;
    let err = TemplateSchema::from_json(dangling_index).unwrap_err();
    assert!(err.to_string().contains("gone"));

    let bad_version = r#"{"id": "s", "canvas": {"width": 10, "height": 10}, "version": 3}"#;
    assert!(TemplateSchema::from_json(bad_version).is_err());
}

#[test]
fn binding_index_follows_the_tree() {
    let json = r#"{
        "id": "s", "canvas": {"width": 10, "height": 10}, "version": 1,
        "nodes": [
            {"id": "a", "type": "text", "content": "x", "binding": {"field": "people[1].name", "kind": "text"}},
            {"id": "b", "type": "image", "src": "logo", "binding": {"field": "logo", "kind": "image"}}
        ],
        "bindings": [{"nodeId": "a", "field": "stale", "kind": "text"}]
    }"#;
    let schema = TemplateSchema::from_json(json).unwrap();
    let fields: Vec<_> = schema.bindings().iter().map(|b| (b.node_id.as_str(), b.field.as_str())).collect();
    assert_eq!(fields, vec![("a", "people[1].name"), ("b", "logo")]);

    let reloaded = TemplateSchema::from_json(&schema.to_json().unwrap()).unwrap();
    assert_eq!(reloaded, schema);
}

#[test]
fn malformed_field_paths_are_rejected() {
    let json = r#"{
        "id": "s", "canvas": {"width": 10, "height": 10}, "version": 1,
        "nodes": [{"id": "a", "type": "text", "content": "x", "binding": {"field": "people[x", "kind": "text"}}]
    }"#;
    let err = TemplateSchema::from_json(json).unwrap_err();
    assert!(err.to_string().contains("people[x"));
}
