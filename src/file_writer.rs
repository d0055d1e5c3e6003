use crate::error::{Error, Result};
use crate::graph::{write_graph_section, AdjacencyList, Edge};
use crate::scan::Scan;
use crate::{identify_magic, Container, HEADER_MAX_BUFFER_SIZE, MAGIC_BYTES};
use flatgeobuf::size_prefixed_root_as_header;
use log::debug;
use std::io::Write;

/// FlatGeoGraphBuf writer.
///
/// Takes a complete FlatGeobuf stream (the encoded feature section) and an
/// edge set, and emits the combined container. Edges are validated as they
/// are added.
///
/// A writer always emits a graph section, even when it holds no edges; use
/// [`serialize`] with `None` to emit a file without one.
pub struct FggWriter<'a> {
    features: &'a [u8],
    features_count: u64,
    list: AdjacencyList,
}

impl<'a> FggWriter<'a> {
    /// `features` must be a FlatGeobuf byte stream as produced by a feature
    /// encoder such as `flatgeobuf::FgbWriter`.
    pub fn new(features: &'a [u8]) -> Result<FggWriter<'a>> {
        let features_count = feature_count_of(features)?;
        Ok(FggWriter {
            features,
            features_count,
            list: AdjacencyList::default(),
        })
    }

    pub fn features_count(&self) -> u64 {
        self.features_count
    }

    /// Add one directed edge. Fails immediately on an out-of-range endpoint
    /// or a self-loop.
    pub fn add_edge(&mut self, edge: Edge) -> Result<()> {
        edge.validate(self.features_count)?;
        self.list.edges.push(edge);
        Ok(())
    }

    /// Encode into a freshly allocated buffer of the exact final size.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serialize(self.features, Some(&self.list))
    }

    pub fn write<W: Write>(&self, out: &mut W) -> Result<()> {
        out.write_all(&self.to_bytes()?)?;
        Ok(())
    }
}

fn feature_count_of(features: &[u8]) -> Result<u64> {
    match identify_magic(features)? {
        Container::Fgb => {}
        Container::Fgg => {
            return Err(Error::Malformed(
                "feature stream already carries a graph container magic",
            ))
        }
    }
    let mut scan = Scan::new(features);
    scan.skip(MAGIC_BYTES.len())?;
    let header_start = scan.pos();
    let header_size = scan.read_u32()? as usize;
    if header_size > HEADER_MAX_BUFFER_SIZE || header_size < 8 {
        // minimum size check avoids panic in FlatBuffers header decoding
        return Err(Error::IllegalHeaderSize(header_size));
    }
    scan.skip(header_size)?;
    let header = size_prefixed_root_as_header(&features[header_start..scan.pos()])?;
    Ok(header.features_count())
}

/// Concatenate magic, feature section and (optionally) the graph section.
///
/// With `adjacency_list == None` the output is the input FlatGeobuf stream
/// re-badged with the graph container magic and nothing else; a reader finds
/// no graph section in it.
pub fn serialize(features: &[u8], adjacency_list: Option<&AdjacencyList>) -> Result<Vec<u8>> {
    let features_count = feature_count_of(features)?;
    let section = match adjacency_list {
        Some(list) => Some(write_graph_section(features_count, list)?),
        None => None,
    };
    let section_len = section.as_ref().map(|s| s.len()).unwrap_or(0);

    let mut out = Vec::with_capacity(features.len() + section_len);
    out.extend_from_slice(&MAGIC_BYTES);
    out.extend_from_slice(&features[MAGIC_BYTES.len()..]);
    if let Some(section) = section {
        out.extend_from_slice(&section);
    }
    debug!(
        "serialized {} feature bytes and {} graph bytes",
        features.len() - MAGIC_BYTES.len(),
        section_len
    );
    Ok(out)
}
