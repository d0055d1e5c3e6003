use flatgeographbuf::*;
use std::io::{Read, Seek, SeekFrom};
use tempfile::tempfile;

mod common;
use common::point_features;

#[test]
fn rejects_out_of_range_from_index() {
    let features = point_features(&[[0.0, 0.0], [1.0, 1.0]]);
    let graph = AdjacencyList::new(vec![Edge::new(5, 0)]);
    let err = serialize(&features, Some(&graph)).unwrap_err();
    assert!(matches!(err, Error::InvalidVertexIndex { which: "from", .. }));
    assert!(err.to_string().contains("Invalid 'from' index 5"));
}

#[test]
fn rejects_out_of_range_to_index() {
    let features = point_features(&[[0.0, 0.0], [1.0, 1.0]]);
    let graph = AdjacencyList::new(vec![Edge::new(0, 10)]);
    let err = serialize(&features, Some(&graph)).unwrap_err();
    assert!(matches!(err, Error::InvalidVertexIndex { which: "to", .. }));
    assert!(err.to_string().contains("Invalid 'to' index 10"));
}

#[test]
fn rejects_self_loops() {
    let features = point_features(&[[0.0, 0.0], [1.0, 1.0]]);
    let graph = AdjacencyList::new(vec![Edge::new(0, 0)]);
    let err = serialize(&features, Some(&graph)).unwrap_err();
    assert!(matches!(err, Error::SelfLoop(0)));
    assert!(err.to_string().contains("self-loops are not allowed"));
}

#[test]
fn writer_validates_edges_immediately() {
    let features = point_features(&[[0.0, 0.0], [1.0, 1.0]]);
    let mut writer = FggWriter::new(&features).unwrap();
    assert_eq!(writer.features_count(), 2);
    assert!(matches!(
        writer.add_edge(Edge::new(1, 1)),
        Err(Error::SelfLoop(1))
    ));
    assert!(matches!(
        writer.add_edge(Edge::new(2, 0)),
        Err(Error::InvalidVertexIndex { which: "from", .. })
    ));
    writer.add_edge(Edge::new(1, 0)).unwrap();
}

#[test]
fn no_adjacency_list_keeps_the_feature_bytes() {
    let features = point_features(&[[0.0, 0.0], [1.0, 1.0]]);
    let buf = serialize(&features, None).unwrap();
    assert_eq!(&buf[0..8], &[b'f', b'g', b'g', 1, b'f', b'g', b'g', 0]);
    assert_eq!(&buf[8..], &features[8..]);

    let contents = deserialize(&buf).unwrap();
    assert!(contents.adjacency_list.edges.is_empty());
    assert!(FggReader::open(&buf).unwrap().graph_meta().is_none());
}

#[test]
fn empty_adjacency_list_writes_an_empty_section() {
    let features = point_features(&[[0.0, 0.0], [1.0, 1.0]]);
    let graph = AdjacencyList::default();
    let buf = serialize(&features, Some(&graph)).unwrap();
    // header size, edgeCount=0, columnCount=0
    assert_eq!(&buf[features.len()..], &[6u8, 0, 0, 0, 0, 0, 0, 0, 0, 0][..]);

    let reader = FggReader::open(&buf).unwrap();
    let meta = reader.graph_meta().unwrap();
    assert_eq!(meta.edge_count, 0);
    assert!(meta.edge_columns.is_none());
    assert!(reader.adjacency_list().unwrap().edges.is_empty());
}

#[test]
fn schema_is_frozen_from_the_first_propertied_edge() {
    let features = point_features(&[[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]]);
    let mut properties = Properties::new();
    properties.insert("w", 1.0);
    let graph = AdjacencyList::new(vec![
        Edge::new(0, 1),
        Edge::with_properties(1, 2, properties),
    ]);
    let buf = serialize(&features, Some(&graph)).unwrap();

    let reader = FggReader::open(&buf).unwrap();
    assert_eq!(
        reader.graph_meta().unwrap().edge_columns,
        Some(vec![GraphColumn::new("w", ColumnType::Double)])
    );
    let edges = reader.adjacency_list().unwrap().edges;
    assert!(edges[0].properties.is_empty());
    assert_eq!(edges[1].properties.get("w"), Some(&EdgeValue::Double(1.0)));
}

#[test]
fn keys_outside_the_schema_are_dropped() {
    let features = point_features(&[[0.0, 0.0], [1.0, 1.0]]);
    let mut first = Properties::new();
    first.insert("a", 1.0);
    let mut second = Properties::new();
    second.insert("a", 2.0);
    second.insert("b", 9.0);
    let graph = AdjacencyList::new(vec![
        Edge::with_properties(0, 1, first),
        Edge::with_properties(1, 0, second),
    ]);
    let buf = serialize(&features, Some(&graph)).unwrap();

    let edges = deserialize(&buf).unwrap().adjacency_list.edges;
    assert_eq!(edges[1].properties.len(), 1);
    assert_eq!(edges[1].properties.get("a"), Some(&EdgeValue::Double(2.0)));
    assert!(edges[1].properties.get("b").is_none());
}

#[test]
fn mismatched_property_type_is_rejected() {
    let features = point_features(&[[0.0, 0.0], [1.0, 1.0]]);
    let mut first = Properties::new();
    first.insert("a", 1.0);
    let mut second = Properties::new();
    second.insert("a", "not a number");
    let graph = AdjacencyList::new(vec![
        Edge::with_properties(0, 1, first),
        Edge::with_properties(1, 0, second),
    ]);
    let err = serialize(&features, Some(&graph)).unwrap_err();
    assert!(matches!(
        err,
        Error::PropertyType {
            expected: ColumnType::Double,
            actual: ColumnType::String,
            ..
        }
    ));
}

#[test]
fn writer_streams_to_a_file() {
    let features = point_features(&[[0.0, 0.0], [1.0, 1.0]]);
    let mut writer = FggWriter::new(&features).unwrap();
    let mut properties = Properties::new();
    properties.insert("weight", 1.5);
    writer.add_edge(Edge::with_properties(0, 1, properties)).unwrap();

    let mut file = tempfile().unwrap();
    writer.write(&mut file).unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();
    let mut buf = Vec::new();
    file.read_to_end(&mut buf).unwrap();

    let contents = deserialize(&buf).unwrap();
    assert_eq!(contents.adjacency_list.edges.len(), 1);
}

#[test]
fn feature_stream_must_be_plain_flatgeobuf() {
    let features = point_features(&[[0.0, 0.0], [1.0, 1.0]]);
    let rebadged = serialize(&features, None).unwrap();
    assert!(matches!(FggWriter::new(&rebadged), Err(Error::Malformed(_))));
    assert!(matches!(
        serialize(&rebadged, None),
        Err(Error::Malformed(_))
    ));
}
