//! FlatGeoGraphBuf is a binary container for geospatial graphs: a
//! [FlatGeobuf](https://flatgeobuf.org/)-compatible feature stream carrying
//! the vertices, followed by an optional graph section carrying directed,
//! typed-property edges.
//!
//! The feature section stays opaque to this crate; it is produced and
//! consumed with the FlatGeobuf tooling. This crate locates the graph
//! section (its offset is implicit — the feature section is walked to find
//! it), encodes and decodes edge records, and streams edges without
//! materializing the whole section.
//!
//! ## Writing and reading a graph
//!
//! ```rust
//! use flatgeographbuf::*;
//! # fn point_features(points: &[[f64; 2]]) -> Vec<u8> {
//! #     let mut out = Vec::new();
//! #     out.extend_from_slice(&[b'f', b'g', b'b', 3, b'f', b'g', b'b', 0]);
//! #     let mut fbb = flatbuffers::FlatBufferBuilder::new();
//! #     let header_args = flatgeobuf::HeaderArgs {
//! #         name: Some(fbb.create_string("vertices")),
//! #         geometry_type: flatgeobuf::GeometryType::Point,
//! #         features_count: points.len() as u64,
//! #         index_node_size: 0,
//! #         ..Default::default()
//! #     };
//! #     let header = flatgeobuf::Header::create(&mut fbb, &header_args);
//! #     fbb.finish_size_prefixed(header, None);
//! #     out.extend_from_slice(fbb.finished_data());
//! #     for point in points {
//! #         let mut fbb = flatbuffers::FlatBufferBuilder::new();
//! #         let xy = fbb.create_vector(point);
//! #         let geometry = flatgeobuf::Geometry::create(
//! #             &mut fbb,
//! #             &flatgeobuf::GeometryArgs { xy: Some(xy), ..Default::default() },
//! #         );
//! #         let feature = flatgeobuf::Feature::create(
//! #             &mut fbb,
//! #             &flatgeobuf::FeatureArgs { geometry: Some(geometry), ..Default::default() },
//! #         );
//! #         fbb.finish_size_prefixed(feature, None);
//! #         out.extend_from_slice(fbb.finished_data());
//! #     }
//! #     out
//! # }
//! # fn example() -> Result<()> {
//! // The vertices, encoded with the FlatGeobuf tooling
//! let features = point_features(&[[0.0, 0.0], [1.0, 1.0]]);
//!
//! let mut writer = FggWriter::new(&features)?;
//! let mut properties = Properties::new();
//! properties.insert("weight", 1.5);
//! writer.add_edge(Edge::with_properties(0, 1, properties))?;
//! let buf = writer.to_bytes()?;
//!
//! // Batch read
//! let contents = deserialize(&buf)?;
//! assert_eq!(contents.features.len(), 2);
//! assert_eq!(contents.adjacency_list.edges.len(), 1);
//!
//! // Streaming read
//! let mut edges = deserialize_graph_edges(&buf)?;
//! while let Some(edge) = edges.next()? {
//!     assert_eq!((edge.from, edge.to), (0, 1));
//! }
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

mod columns;
mod error;
mod file_reader;
mod file_writer;
mod graph;
mod properties;
mod scan;

pub use columns::{ColumnType, GraphColumn};
pub use error::{Error, Result};
pub use file_reader::{
    deserialize, deserialize_graph_edges, deserialize_with_observer, FeatureIter, FeaturesMeta,
    FggContents, FggReader, FileMeta, GraphEdgeIter,
};
pub use file_writer::{serialize, FggWriter};
pub use graph::{AdjacencyList, Edge, GraphMeta};
pub use properties::{EdgeValue, Properties};

// Re-export the feature-section types produced by the FlatGeobuf codec
pub use flatgeobuf::{Feature, GeometryType, Header};

// Re-export used traits
pub use fallible_streaming_iterator::FallibleStreamingIterator;
pub use geozero::PropertyProcessor;

/// Graph container major version
pub const VERSION: u8 = 1;
pub(crate) const MAGIC_BYTES: [u8; 8] = [b'f', b'g', b'g', VERSION, b'f', b'g', b'g', 0];

/// Newest FlatGeobuf major accepted as a graph-less container
pub(crate) const FGB_VERSION: u8 = 3;
pub(crate) const FGB_MAGIC_BYTES: [u8; 8] = [b'f', b'g', b'b', FGB_VERSION, b'f', b'g', b'b', 0];

pub(crate) const HEADER_MAX_BUFFER_SIZE: usize = 1048576 * 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Container {
    /// FGG magic: feature section plus optional graph section
    Fgg,
    /// FGB magic: plain FlatGeobuf, never a graph section
    Fgb,
}

/// Check the leading magic. Byte 3 is the major version (breaking), byte 7
/// the patch version; any patch is accepted.
pub(crate) fn identify_magic(buf: &[u8]) -> Result<Container> {
    if buf.len() < MAGIC_BYTES.len() {
        return Err(Error::Truncated);
    }
    if buf[0..3] == MAGIC_BYTES[0..3] && buf[4..7] == MAGIC_BYTES[4..7] {
        if buf[3] > VERSION {
            return Err(Error::UnsupportedVersion(buf[3]));
        }
        Ok(Container::Fgg)
    } else if buf[0..3] == FGB_MAGIC_BYTES[0..3] && buf[4..7] == FGB_MAGIC_BYTES[4..7] {
        if buf[3] > FGB_VERSION {
            return Err(Error::UnsupportedVersion(buf[3]));
        }
        Ok(Container::Fgb)
    } else {
        Err(Error::MissingMagicBytes)
    }
}
