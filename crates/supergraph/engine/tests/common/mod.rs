#![allow(dead_code)]

use serde_json::json;
use supergraph_types::{Content, Edge, Group, Port, Vertex};

/// Two vertices, each with one port, joined by `p1 -> p2`.
pub fn two_node_flow() -> Content {
    Content {
        vertices: vec![
            Vertex::new("n1").with_port("p1"),
            Vertex::new("n2").with_port("p2"),
        ],
        ports: vec![Port::new("p1"), Port::new("p2")],
        edges: vec![Edge::new("p1", "p2")],
        groups: vec![],
    }
}

/// A richer diagram exercising properties, meta and groups.
pub fn annotated_flow() -> Content {
    Content {
        vertices: vec![
            Vertex::new("source")
                .with_port("source:out")
                .with_property("name", "Source")
                .with_property("rate", 2.5)
                .with_meta(json!({"position": {"x": 10, "y": 20}})),
            Vertex::new("sink")
                .with_port("sink:in")
                .with_port("sink:aux")
                .with_property("tags", vec!["a".to_string(), "b".to_string()]),
        ],
        ports: vec![
            Port::new("source:out").with_property("primitiveID", "out"),
            Port::new("sink:in").with_meta(json!({"side": "left"})),
            Port::new("sink:aux"),
        ],
        edges: vec![Edge::new("source:out", "sink:in").with_meta(json!({"color": "red"}))],
        groups: vec![Group::new("g1").with_property("title", "pipeline")],
    }
}
