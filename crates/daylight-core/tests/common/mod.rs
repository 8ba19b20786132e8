use daylight_core::{persistence, ResourceGraph, ResourceKey, ResourceType, Schema};
use serde_json::json;

/// Schema with a three-level hierarchy:
/// widget -(children / parent)-> gadget -(grandchildren)-> part
#[allow(dead_code)]
pub fn schema() -> Schema {
    Schema::new()
        .with(
            ResourceType::new("widget")
                .attributes(["name", "owner_ref"])
                .has_many("children", "gadget")
                .belongs_to("parent", "gadget"),
        )
        .and_then(|s| {
            s.with(
                ResourceType::new("gadget")
                    .attribute("name")
                    .has_many("grandchildren", "part"),
            )
        })
        .and_then(|s| s.with(ResourceType::new("part").attribute("name")))
        .and_then(|s| s.with(ResourceType::new("user").attribute("name")))
        .expect("fixture schema is valid")
}

#[allow(dead_code)]
pub fn new_graph() -> ResourceGraph {
    ResourceGraph::new(schema())
}

/// Handles into a fully loaded widget graph
#[allow(dead_code)]
pub struct Loaded {
    pub widget: ResourceKey,
    pub parent: ResourceKey,
    pub children: Vec<ResourceKey>,
    pub grandchildren: Vec<ResourceKey>,
}

/// Load widget#1 with parent gadget#1, children gadget#1/#2 and two parts
/// under the first child, as a server would return it
#[allow(dead_code)]
pub fn load_widget(graph: &mut ResourceGraph) -> Loaded {
    let widget = persistence::load(
        graph,
        "widget",
        &json!({
            "id": 1,
            "name": "test",
            "parent": {"id": 1, "name": "test"},
            "children": [
                {
                    "id": 1,
                    "name": "test",
                    "grandchildren": [
                        {"id": 1, "name": "test"},
                        {"id": 2, "name": "test"}
                    ]
                },
                {"id": 2, "name": "test"}
            ]
        }),
    )
    .expect("fixture widget loads");

    let parent = graph
        .associated(widget, "parent")
        .unwrap()
        .expect("parent loaded");
    let children = graph.members(widget, "children").unwrap();
    let grandchildren = graph.members(children[0], "grandchildren").unwrap();

    Loaded {
        widget,
        parent,
        children,
        grandchildren,
    }
}

/// Load a standalone gadget, as if fetched with a separate request
#[allow(dead_code)]
pub fn find_gadget(graph: &mut ResourceGraph, id: i64) -> ResourceKey {
    persistence::load(graph, "gadget", &json!({"id": id, "name": "test"}))
        .expect("fixture gadget loads")
}
