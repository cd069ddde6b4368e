use std::sync::Arc;
use std::time::Duration;

use rdf_graph_explorer::model::{Edge, RDF_TYPE};
use rdf_graph_explorer::source::DatasetSource;
use rdf_graph_explorer::{
    Config, DataFeeder, Explorer, FetchRequest, NodeAttributes, NodeEntry, OutcomeStatus,
};

const DATASET: &str = r#"{
    "nodes": [
        {"identity": "http://example.org/alice", "primaryLabel": "Alice",
         "typeIdentity": "http://example.org/Person", "typeLabel": "Person"},
        {"identity": "http://example.org/Person", "primaryLabel": "Person"}
    ],
    "edges": [
        {"source": "http://example.org/alice", "label": "http://example.org/knows",
         "destination": "http://example.org/bob"},
        {"source": "http://example.org/alice", "label": "http://example.org/knows",
         "destination": "http://example.org/carol"},
        {"source": "http://example.org/bob", "label": "http://www.w3.org/1999/02/22-rdf-syntax-ns#type",
         "destination": "http://example.org/Person"}
    ]
}"#;

fn feeder() -> DataFeeder {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("people.json");
    std::fs::write(&path, DATASET).expect("write dataset");
    let source = DatasetSource::load(&path).expect("dataset loads");
    DataFeeder::new(Arc::new(source))
}

fn settle(explorer: &mut Explorer, feeder: &mut DataFeeder) -> Vec<OutcomeStatus> {
    let mut statuses = Vec::new();
    while !feeder.is_idle() {
        let Some(outcome) = feeder.wait(Duration::from_secs(5)) else {
            break;
        };
        statuses.push(explorer.apply_outcome(outcome));
    }
    statuses
}

#[test]
fn subject_session_expands_type_nodes() {
    let mut feeder = feeder();
    let mut explorer = Explorer::new(Config::default());

    let subject = NodeEntry::new("http://example.org/alice").with_attributes(
        NodeAttributes::default()
            .with_primary_label("Alice")
            .with_type("http://example.org/Person", Some("Person".to_owned())),
    );
    for request in explorer.start(Some(subject)) {
        feeder.dispatch(explorer.generation(), request);
    }
    let statuses = settle(&mut explorer, &mut feeder);

    assert!(matches!(statuses.as_slice(), [OutcomeStatus::Merged(_)]));
    assert!(explorer.model().contains_node("http://example.org/bob"));
    assert!(explorer.model().contains_node("http://example.org/carol"));
    assert!(explorer.model().is_type_like("http://example.org/Person"));

    explorer.advance(explorer.tick_interval());
    assert_eq!(explorer.simulator().body_count(), explorer.model().node_count());
    assert_eq!(explorer.simulator().constraint_count(), explorer.model().edge_count());

    assert_eq!(
        explorer.expand_request("http://example.org/Person"),
        FetchRequest::members("http://example.org/Person", 3)
    );
    let request = explorer.expand_request("http://example.org/Person");
    feeder.dispatch(explorer.generation(), request);
    settle(&mut explorer, &mut feeder);

    assert!(explorer.model().contains_edge(&Edge::new(
        "http://example.org/bob",
        RDF_TYPE,
        "http://example.org/Person",
    )));
}

#[test]
fn navigation_discards_results_from_the_old_session() {
    let mut feeder = feeder();
    let mut explorer = Explorer::new(Config::default());

    for request in explorer.start(None) {
        feeder.dispatch(explorer.generation(), request);
    }
    let old_generation = explorer.generation();
    feeder.dispatch(old_generation, FetchRequest::relations("http://example.org/alice", 20));

    explorer.navigate(Some(NodeEntry::new("http://example.org/bob")));
    assert_ne!(explorer.generation(), old_generation);

    let statuses = settle(&mut explorer, &mut feeder);
    assert_eq!(statuses, [OutcomeStatus::Stale, OutcomeStatus::Stale]);
    assert_eq!(explorer.model().node_count(), 1);
    assert_eq!(explorer.subject(), Some("http://example.org/bob"));
}

#[test]
fn failed_fetches_are_reported() {
    let mut feeder = feeder();
    let mut explorer = Explorer::new(Config::default());

    for request in explorer.start(Some(NodeEntry::new("http://example.org/nobody"))) {
        feeder.dispatch(explorer.generation(), request);
    }
    let statuses = settle(&mut explorer, &mut feeder);

    assert_eq!(statuses, [OutcomeStatus::Failed]);
    assert_eq!(explorer.model().node_count(), 1);
    assert!(
        explorer
            .last_error()
            .is_some_and(|error| error.contains("unknown subject"))
    );
}
