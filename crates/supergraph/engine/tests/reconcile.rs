//! Content reconciliation through the manager.

mod common;

use common::{annotated_flow, two_node_flow};
use serde_json::json;
use supergraph_engine::{Container, EngineError, GraphStats, Manager};
use supergraph_types::{
    ContainerKind, Content, ContentError, Edge, Port, PropertyValue, Uid, Vertex,
};

#[tokio::test]
async fn concrete_scenario_round_trips_and_drops_edges() {
    let manager = Manager::in_memory();
    let root = manager.containers().create_root("main").await.unwrap();

    manager.replace(&root, two_node_flow()).await.unwrap();
    let read = manager.read(&root).await.unwrap().sorted();
    assert_eq!(read.vertices.len(), 2);
    assert_eq!(read.ports.len(), 2);
    assert_eq!(read.edges.len(), 1);
    assert_eq!(read.groups.len(), 0);
    assert_eq!(read.edges[0].start, Uid::from("p1"));
    assert_eq!(read.edges[0].end, Uid::from("p2"));

    let mut without_edges = two_node_flow();
    without_edges.edges.clear();
    manager.replace(&root, without_edges).await.unwrap();
    let read = manager.read(&root).await.unwrap().sorted();
    assert_eq!(read.vertices.len(), 2);
    assert_eq!(read.ports.len(), 2);
    assert!(read.edges.is_empty());
    assert!(read.vertices[0].ports.contains("p1"));
    assert!(read.vertices[1].ports.contains("p2"));
}

#[tokio::test]
async fn read_returns_what_was_replaced() {
    let manager = Manager::in_memory();
    let root = manager.containers().create_root("main").await.unwrap();

    manager.replace(&root, annotated_flow()).await.unwrap();

    let read = manager.read(&root).await.unwrap();
    assert_eq!(read.sorted(), annotated_flow().sorted());
}

#[tokio::test]
async fn replacing_twice_creates_no_duplicates() {
    let manager = Manager::in_memory();
    let root = manager.containers().create_root("main").await.unwrap();

    manager.replace(&root, annotated_flow()).await.unwrap();
    let once = manager.stats().await.unwrap();
    manager.replace(&root, annotated_flow()).await.unwrap();
    let twice = manager.stats().await.unwrap();

    assert_eq!(once, twice);
    assert_eq!(twice.vertices, 2);
    assert_eq!(twice.ports, 3);
    assert_eq!(twice.edges, 1);
    assert_eq!(twice.groups, 1);
    assert_eq!(twice.port_links, 3);
    assert_eq!(twice.ownership_links, 3);
}

#[tokio::test]
async fn omitted_vertex_is_deleted_with_its_ports() {
    let manager = Manager::in_memory();
    let root = manager.containers().create_root("main").await.unwrap();
    manager.replace(&root, two_node_flow()).await.unwrap();

    let only_n2 = Content {
        vertices: vec![Vertex::new("n2").with_port("p2")],
        ports: vec![Port::new("p2")],
        edges: vec![],
        groups: vec![],
    };
    manager.replace(&root, only_n2.clone()).await.unwrap();

    let stats = manager.stats().await.unwrap();
    assert_eq!(stats.vertices, 1);
    assert_eq!(stats.ports, 1);
    assert_eq!(stats.edges, 0);
    assert_eq!(manager.read(&root).await.unwrap().sorted(), only_n2);
}

#[tokio::test]
async fn shared_vertex_survives_replace_in_one_owner() {
    let manager = Manager::in_memory();
    let a = manager.containers().create_root("a").await.unwrap();
    let b = manager.containers().create_root("b").await.unwrap();

    let shared = Content {
        vertices: vec![Vertex::new("v").with_port("pv"), Vertex::new("w").with_port("pw")],
        ports: vec![Port::new("pv"), Port::new("pw")],
        edges: vec![],
        groups: vec![],
    };
    manager.replace(&a, shared.clone()).await.unwrap();
    manager.reconnect(&b, &a).await.unwrap();

    let without_v = Content {
        vertices: vec![Vertex::new("w").with_port("pw")],
        ports: vec![Port::new("pw")],
        edges: vec![],
        groups: vec![],
    };
    manager.replace(&a, without_v.clone()).await.unwrap();

    assert_eq!(manager.read(&a).await.unwrap().sorted(), without_v);
    assert_eq!(manager.read(&b).await.unwrap().sorted(), shared);
    assert_eq!(manager.stats().await.unwrap().vertices, 2);
}

#[tokio::test]
async fn edge_to_a_shared_vertex_survives_in_the_other_owner() {
    let manager = Manager::in_memory();
    let a = manager.containers().create_root("a").await.unwrap();
    let b = manager.containers().create_root("b").await.unwrap();

    let shared = Content {
        vertices: vec![Vertex::new("v").with_port("pv"), Vertex::new("w").with_port("pw")],
        ports: vec![Port::new("pv"), Port::new("pw")],
        edges: vec![Edge::new("pv", "pw")],
        groups: vec![],
    };
    manager.replace(&a, shared.clone()).await.unwrap();
    manager.reconnect(&b, &a).await.unwrap();

    let without_v = Content {
        vertices: vec![Vertex::new("w").with_port("pw")],
        ports: vec![Port::new("pw")],
        edges: vec![],
        groups: vec![],
    };
    manager.replace(&a, without_v.clone()).await.unwrap();

    assert_eq!(manager.read(&a).await.unwrap().sorted(), without_v);
    assert_eq!(manager.read(&b).await.unwrap().sorted(), shared.sorted());
    assert_eq!(manager.stats().await.unwrap().edges, 1);
}

#[tokio::test]
async fn edge_removed_between_kept_shared_vertices_is_deleted() {
    let manager = Manager::in_memory();
    let a = manager.containers().create_root("a").await.unwrap();
    let b = manager.containers().create_root("b").await.unwrap();
    manager.replace(&a, two_node_flow()).await.unwrap();
    manager.reconnect(&b, &a).await.unwrap();

    let mut unwired = two_node_flow();
    unwired.edges.clear();
    manager.replace(&a, unwired.clone()).await.unwrap();

    assert_eq!(manager.read(&a).await.unwrap().sorted(), unwired.clone().sorted());
    assert_eq!(manager.read(&b).await.unwrap().sorted(), unwired.sorted());
}

#[tokio::test]
async fn edge_direction_is_preserved() {
    let manager = Manager::in_memory();
    let root = manager.containers().create_root("main").await.unwrap();

    let mut reversed = two_node_flow();
    reversed.edges = vec![Edge::new("p2", "p1")];
    manager.replace(&root, reversed).await.unwrap();

    let read = manager.read(&root).await.unwrap();
    assert_eq!(read.edges.len(), 1);
    assert_eq!(read.edges[0].start.as_str(), "p2");
    assert_eq!(read.edges[0].end.as_str(), "p1");
}

#[tokio::test]
async fn rewiring_replaces_the_stale_edge() {
    let manager = Manager::in_memory();
    let root = manager.containers().create_root("main").await.unwrap();
    manager.replace(&root, two_node_flow()).await.unwrap();

    let mut rewired = two_node_flow();
    rewired.edges = vec![Edge::new("p2", "p1")];
    manager.replace(&root, rewired).await.unwrap();

    let read = manager.read(&root).await.unwrap();
    assert_eq!(read.edges, vec![Edge::new("p2", "p1")]);
    let stats = manager.stats().await.unwrap();
    assert_eq!(stats.edges, 1);
    assert_eq!(stats.ports, 2);
}

#[tokio::test]
async fn stale_port_of_kept_vertex_is_deleted() {
    let manager = Manager::in_memory();
    let root = manager.containers().create_root("main").await.unwrap();

    let two_ports = Content {
        vertices: vec![Vertex::new("n1").with_port("a").with_port("b")],
        ports: vec![Port::new("a"), Port::new("b")],
        edges: vec![Edge::new("a", "b")],
        groups: vec![],
    };
    manager.replace(&root, two_ports).await.unwrap();

    let one_port = Content {
        vertices: vec![Vertex::new("n1").with_port("a")],
        ports: vec![Port::new("a")],
        edges: vec![],
        groups: vec![],
    };
    manager.replace(&root, one_port.clone()).await.unwrap();

    assert_eq!(manager.read(&root).await.unwrap().sorted(), one_port);
    let stats = manager.stats().await.unwrap();
    assert_eq!(stats.ports, 1);
    assert_eq!(stats.edges, 0);
}

#[tokio::test]
async fn port_moved_to_a_new_vertex_keeps_its_edges() {
    let manager = Manager::in_memory();
    let root = manager.containers().create_root("main").await.unwrap();
    manager.replace(&root, two_node_flow()).await.unwrap();

    let moved = Content {
        vertices: vec![Vertex::new("n2").with_port("p2"), Vertex::new("n3").with_port("p1")],
        ports: vec![Port::new("p1"), Port::new("p2")],
        edges: vec![Edge::new("p1", "p2")],
        groups: vec![],
    };
    manager.replace(&root, moved.clone()).await.unwrap();

    assert_eq!(manager.read(&root).await.unwrap().sorted(), moved);
    let stats = manager.stats().await.unwrap();
    assert_eq!(stats.vertices, 2);
    assert_eq!(stats.port_links, 2);
}

#[tokio::test]
async fn port_moved_between_surviving_vertices() {
    let manager = Manager::in_memory();
    let root = manager.containers().create_root("main").await.unwrap();
    let before = Content {
        vertices: vec![Vertex::new("v1").with_port("p1"), Vertex::new("v2").with_port("p2")],
        ports: vec![Port::new("p1"), Port::new("p2")],
        edges: vec![Edge::new("p1", "p2")],
        groups: vec![],
    };
    manager.replace(&root, before).await.unwrap();

    let moved = Content {
        vertices: vec![
            Vertex::new("v1"),
            Vertex::new("v2").with_port("p1").with_port("p2"),
        ],
        ports: vec![Port::new("p1"), Port::new("p2")],
        edges: vec![Edge::new("p1", "p2")],
        groups: vec![],
    };
    manager.replace(&root, moved.clone()).await.unwrap();

    let read = manager.read(&root).await.unwrap().sorted();
    assert_eq!(read, moved.sorted());
    assert!(read.vertices[0].ports.is_empty());
    let stats = manager.stats().await.unwrap();
    assert_eq!(stats.port_links, 2);
    assert_eq!(stats.ports, 2);
    assert_eq!(stats.edges, 1);
}

#[tokio::test]
async fn resubmitted_properties_and_meta_are_overwritten() {
    let manager = Manager::in_memory();
    let root = manager.containers().create_root("main").await.unwrap();

    let mut first = two_node_flow();
    first.vertices[0] = Vertex::new("n1")
        .with_port("p1")
        .with_property("x", 1_i64)
        .with_property("y", 2_i64);
    first.edges[0] = Edge::new("p1", "p2").with_meta(json!({"a": 1}));
    manager.replace(&root, first).await.unwrap();

    let mut second = two_node_flow();
    second.vertices[0] = Vertex::new("n1").with_port("p1").with_property("x", 3_i64);
    second.edges[0] = Edge::new("p1", "p2").with_meta(json!({"b": 2}));
    manager.replace(&root, second).await.unwrap();

    let read = manager.read(&root).await.unwrap().sorted();
    let n1 = &read.vertices[0];
    assert_eq!(n1.properties.len(), 1);
    assert_eq!(n1.properties["x"], PropertyValue::Int(3));
    assert_eq!(read.edges[0].meta, json!({"b": 2}));
}

#[tokio::test]
async fn dangling_reference_fails_before_any_write() {
    let manager = Manager::in_memory();
    let root = manager.containers().create_root("main").await.unwrap();
    let before = manager.stats().await.unwrap();

    let mut broken = two_node_flow();
    broken.edges.push(Edge::new("p2", "ghost"));
    let err = manager.replace(&root, broken).await.unwrap_err();

    assert!(matches!(
        err,
        EngineError::Integrity(ContentError::DanglingPort { ref port, .. }) if port.as_str() == "ghost"
    ));
    assert_eq!(manager.stats().await.unwrap(), before);
}

#[tokio::test]
async fn failed_replace_leaves_previous_content() {
    let manager = Manager::in_memory();
    let root = manager.containers().create_root("main").await.unwrap();
    manager.replace(&root, two_node_flow()).await.unwrap();

    let mut broken = Content::empty();
    broken.vertices.push(Vertex::new("n9").with_port("missing"));
    assert!(manager.replace(&root, broken).await.is_err());

    assert_eq!(
        manager.read(&root).await.unwrap().sorted(),
        two_node_flow().sorted()
    );
}

#[tokio::test]
async fn unbound_and_foreign_handles_are_rejected() {
    let manager = Manager::in_memory();
    let other = Manager::in_memory();

    let unbound = Container::unbound("scratch", ContainerKind::Root);
    assert!(matches!(
        manager.read(&unbound).await,
        Err(EngineError::Unbound(_))
    ));

    let foreign = other.containers().create_root("elsewhere").await.unwrap();
    assert!(matches!(
        manager.replace(&foreign, two_node_flow()).await,
        Err(EngineError::ForeignStore { .. })
    ));
    assert_eq!(manager.stats().await.unwrap().vertices, 0);
}

#[tokio::test]
async fn operations_on_deleted_container_report_not_found() {
    let manager = Manager::in_memory();
    let root = manager.containers().create_root("main").await.unwrap();
    manager.containers().delete(&root, true).await.unwrap();

    assert!(matches!(
        manager.read(&root).await,
        Err(EngineError::ContainerNotFound(id)) if id == root.id()
    ));
    assert!(matches!(
        manager.replace(&root, two_node_flow()).await,
        Err(EngineError::ContainerNotFound(_))
    ));
}

#[tokio::test]
async fn fragment_replace_is_mirrored_in_its_root() {
    let manager = Manager::in_memory();
    let containers = manager.containers();
    let root = containers.create_root("main").await.unwrap();
    let fragment = containers.create_fragment_in(&root, "part").await.unwrap();

    manager
        .replace_and_reconnect(&root, &fragment, two_node_flow())
        .await
        .unwrap();
    assert_eq!(
        manager.read(&root).await.unwrap().sorted(),
        two_node_flow().sorted()
    );

    let only_n2 = Content {
        vertices: vec![Vertex::new("n2").with_port("p2")],
        ports: vec![Port::new("p2")],
        edges: vec![],
        groups: vec![],
    };
    manager
        .replace_and_reconnect(&root, &fragment, only_n2.clone())
        .await
        .unwrap();

    assert_eq!(manager.read(&fragment).await.unwrap().sorted(), only_n2);
    assert_eq!(manager.read(&root).await.unwrap().sorted(), only_n2);
    assert_eq!(manager.stats().await.unwrap().vertices, 1);
}

#[tokio::test]
async fn vertex_dropped_from_a_fragment_leaves_its_root() {
    let manager = Manager::in_memory();
    let containers = manager.containers();
    let root = containers.create_root("main").await.unwrap();
    let fragment = containers.create_fragment_in(&root, "part").await.unwrap();
    manager.replace(&fragment, two_node_flow()).await.unwrap();
    manager.reconnect(&root, &fragment).await.unwrap();

    let only_n2 = Content {
        vertices: vec![Vertex::new("n2").with_port("p2")],
        ports: vec![Port::new("p2")],
        edges: vec![],
        groups: vec![],
    };
    // A root mirrors its fragment, so it is not an owner that keeps n1 alive.
    manager.replace(&fragment, only_n2.clone()).await.unwrap();

    assert_eq!(manager.read(&root).await.unwrap().sorted(), only_n2);
    let stats = manager.stats().await.unwrap();
    assert_eq!(stats.vertices, 1);
    assert_eq!(stats.ports, 1);
    assert_eq!(stats.edges, 0);
}

#[tokio::test]
async fn replace_and_reconnect_requires_membership() {
    let manager = Manager::in_memory();
    let containers = manager.containers();
    let root = containers.create_root("main").await.unwrap();
    let loose = containers.create_fragment("loose").await.unwrap();

    let err = manager
        .replace_and_reconnect(&root, &loose, two_node_flow())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::FragmentNotInRoot { .. }));
    assert_eq!(manager.stats().await.unwrap().vertices, 0);
}

#[tokio::test]
async fn clear_root_removes_fragments_and_content() {
    let manager = Manager::in_memory();
    let containers = manager.containers();
    let root = containers.create_root("main").await.unwrap();
    let fragment = containers.create_fragment_in(&root, "part").await.unwrap();
    manager
        .replace_and_reconnect(&root, &fragment, two_node_flow())
        .await
        .unwrap();

    manager.clear(&root, false).await.unwrap();

    let stats = manager.stats().await.unwrap();
    assert_eq!(stats.roots, 1);
    assert_eq!(stats.fragments, 0);
    assert_eq!(stats.vertices, 0);
    assert_eq!(stats.ports, 0);
    assert!(manager.read(&root).await.unwrap().is_empty());
}

#[tokio::test]
async fn clear_with_cascade_deletes_the_container() {
    let manager = Manager::in_memory();
    let root = manager.containers().create_root("main").await.unwrap();
    manager.replace(&root, two_node_flow()).await.unwrap();

    manager.clear(&root, true).await.unwrap();

    assert!(matches!(
        manager.containers().get(root.id()).await,
        Err(EngineError::ContainerNotFound(_))
    ));
    assert_eq!(manager.stats().await.unwrap(), GraphStats::default());
}

#[tokio::test]
async fn clear_content_keeps_fragments() {
    let manager = Manager::in_memory();
    let containers = manager.containers();
    let root = containers.create_root("main").await.unwrap();
    let fragment = containers.create_fragment_in(&root, "part").await.unwrap();

    manager
        .replace_and_reconnect(&root, &fragment, two_node_flow())
        .await
        .unwrap();
    manager.clear_content(&root).await.unwrap();

    assert!(manager.read(&root).await.unwrap().is_empty());
    assert_eq!(
        manager.read(&fragment).await.unwrap().sorted(),
        two_node_flow().sorted()
    );
    let fragments = containers.fragments(&root).await.unwrap();
    assert_eq!(
        fragments.iter().map(Container::id).collect::<Vec<_>>(),
        vec![fragment.id()]
    );
}
