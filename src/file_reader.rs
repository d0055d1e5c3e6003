use crate::columns::{ColumnType, GraphColumn};
use crate::error::{Error, Result};
use crate::graph::{read_edge, read_graph_header, AdjacencyList, Edge, GraphMeta};
use crate::scan::Scan;
use crate::{identify_magic, Container, HEADER_MAX_BUFFER_SIZE, MAGIC_BYTES};
use fallible_streaming_iterator::FallibleStreamingIterator;
use flatgeobuf::packed_r_tree::PackedRTree;
use flatgeobuf::{
    size_prefixed_root_as_feature, size_prefixed_root_as_header,
    size_prefixed_root_as_header_unchecked, Feature, GeometryType, Header,
};
use log::debug;

/// Feature header metadata, surfaced before any feature is read.
#[derive(Debug, Clone, PartialEq)]
pub struct FeaturesMeta {
    pub features_count: u64,
    pub geometry_type: GeometryType,
    pub index_node_size: u16,
    /// Feature column schema; `None` when the header declares no columns.
    pub columns: Option<Vec<GraphColumn>>,
}

/// Everything both headers reveal about a file, passed to the deserialize
/// observer before features or edges are materialized.
#[derive(Debug, Clone, PartialEq)]
pub struct FileMeta {
    pub features: FeaturesMeta,
    /// `None` when the file carries no graph section.
    pub graph: Option<GraphMeta>,
}

/// Reader over a FlatGeoGraphBuf (or plain FlatGeobuf) byte buffer.
///
/// Opening parses the feature header, walks the feature section to locate
/// the graph section and parses the graph header. Features and edges are
/// read lazily from the borrowed buffer.
pub struct FggReader<'a> {
    buf: &'a [u8],
    /// Feature header including its size prefix, verified at open
    header_buf: &'a [u8],
    meta: FeaturesMeta,
    /// Offset of the first feature record
    feature_base: usize,
    graph: Option<GraphMeta>,
    /// Offset of the first edge record; `buf.len()` without a graph section
    edges_base: usize,
}

impl<'a> FggReader<'a> {
    pub fn open(buf: &'a [u8]) -> Result<FggReader<'a>> {
        let container = identify_magic(buf)?;
        let mut scan = Scan::new(buf);
        scan.skip(MAGIC_BYTES.len())?;

        let header_start = scan.pos();
        let header_size = scan.read_u32()? as usize;
        if header_size > HEADER_MAX_BUFFER_SIZE || header_size < 8 {
            return Err(Error::IllegalHeaderSize(header_size));
        }
        scan.skip(header_size)?;
        let header_buf = &buf[header_start..scan.pos()];
        let header = size_prefixed_root_as_header(header_buf)?;
        let meta = features_meta(&header)?;

        if meta.index_node_size > 0 && meta.features_count > 0 {
            let index_size =
                PackedRTree::index_size(meta.features_count as usize, meta.index_node_size);
            scan.skip(index_size)?;
        }
        let feature_base = scan.pos();

        let (graph, edges_base) = match container {
            Container::Fgb => (None, buf.len()),
            Container::Fgg => {
                for _ in 0..meta.features_count {
                    scan.take_size_prefixed()?;
                }
                if scan.remaining() == 0 {
                    (None, buf.len())
                } else {
                    debug!(
                        "graph section at offset {} of {} bytes",
                        scan.pos(),
                        buf.len()
                    );
                    let graph_header_size = scan.read_u32()? as usize;
                    let mut header_scan = Scan::new(scan.take(graph_header_size)?);
                    let graph = read_graph_header(&mut header_scan)?;
                    (Some(graph), scan.pos())
                }
            }
        };

        Ok(FggReader {
            buf,
            header_buf,
            meta,
            feature_base,
            graph,
            edges_base,
        })
    }

    /// Raw FlatGeobuf header access.
    pub fn header(&self) -> Header<'a> {
        // SAFETY: verified in open
        unsafe { size_prefixed_root_as_header_unchecked(self.header_buf) }
    }

    pub fn features_count(&self) -> u64 {
        self.meta.features_count
    }

    pub fn edge_count(&self) -> u32 {
        self.graph.as_ref().map(|g| g.edge_count).unwrap_or(0)
    }

    pub fn graph_meta(&self) -> Option<&GraphMeta> {
        self.graph.as_ref()
    }

    pub fn meta(&self) -> FileMeta {
        FileMeta {
            features: self.meta.clone(),
            graph: self.graph.clone(),
        }
    }

    /// Iterate the size-prefixed feature records.
    pub fn features(&self) -> FeatureIter<'a> {
        FeatureIter {
            scan: Scan::new(&self.buf[self.feature_base..]),
            remaining: self.meta.features_count,
        }
    }

    /// Stream the edges one at a time.
    pub fn edges(&self) -> GraphEdgeIter<'a> {
        GraphEdgeIter {
            scan: Scan::new(&self.buf[self.edges_base..]),
            columns: self
                .graph
                .as_ref()
                .and_then(|g| g.edge_columns.clone())
                .unwrap_or_default(),
            remaining: self.edge_count(),
            current: None,
        }
    }

    /// Read the whole edge set. Any malformed edge fails the batch.
    pub fn adjacency_list(&self) -> Result<AdjacencyList> {
        let Some(graph) = &self.graph else {
            return Ok(AdjacencyList::default());
        };
        let mut scan = Scan::new(&self.buf[self.edges_base..]);
        let mut edges = Vec::with_capacity(graph.edge_count as usize);
        for _ in 0..graph.edge_count {
            edges.push(read_edge(&mut scan, graph.columns())?);
        }
        Ok(AdjacencyList { edges })
    }
}

fn features_meta(header: &Header) -> Result<FeaturesMeta> {
    let columns = match header.columns() {
        None => None,
        Some(columns) => Some(
            columns
                .iter()
                .map(|c| Ok(GraphColumn::new(c.name(), ColumnType::from_u8(c.type_().0)?)))
                .collect::<Result<Vec<_>>>()?,
        ),
    };
    Ok(FeaturesMeta {
        features_count: header.features_count(),
        geometry_type: header.geometry_type(),
        index_node_size: header.index_node_size(),
        columns,
    })
}

/// Iterator over the verified feature tables of the feature section.
pub struct FeatureIter<'a> {
    scan: Scan<'a>,
    remaining: u64,
}

impl<'a> Iterator for FeatureIter<'a> {
    type Item = Result<Feature<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let feature = self
            .scan
            .take_size_prefixed()
            .and_then(|record| size_prefixed_root_as_feature(record).map_err(Error::from));
        Some(feature)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining as usize;
        (remaining, Some(remaining))
    }
}

/// Streaming edge reader.
///
/// Finite, single-pass and ordered: edges come out exactly as they were
/// written. The yielded edge lives in a reusable slot and is valid until the
/// next call to `advance`.
///
/// ```text
/// while let Some(edge) = edges.next()? {
///     println!("{} -> {}", edge.from, edge.to);
/// }
/// ```
pub struct GraphEdgeIter<'a> {
    scan: Scan<'a>,
    columns: Vec<GraphColumn>,
    remaining: u32,
    current: Option<Edge>,
}

impl FallibleStreamingIterator for GraphEdgeIter<'_> {
    type Item = Edge;
    type Error = Error;

    fn advance(&mut self) -> Result<()> {
        if self.remaining == 0 {
            self.current = None;
            return Ok(());
        }
        self.remaining -= 1;
        self.current = Some(read_edge(&mut self.scan, &self.columns)?);
        Ok(())
    }

    fn get(&self) -> Option<&Edge> {
        self.current.as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining as usize;
        (remaining, Some(remaining))
    }
}

/// The decoded contents of a file: verified feature views plus the owned
/// edge set.
pub struct FggContents<'a> {
    pub features: Vec<Feature<'a>>,
    /// Always present; `edges` is empty when the file has no graph section.
    pub adjacency_list: AdjacencyList,
}

/// Split a buffer into features and adjacency list.
pub fn deserialize(buf: &[u8]) -> Result<FggContents<'_>> {
    deserialize_with_observer(buf, |_| Ok(()))
}

/// Like [`deserialize`], but invokes `observer` with the combined header
/// metadata after both headers are parsed and before anything is
/// materialized. An observer error aborts the read.
pub fn deserialize_with_observer<'a, F>(buf: &'a [u8], observer: F) -> Result<FggContents<'a>>
where
    F: FnOnce(&FileMeta) -> Result<()>,
{
    let reader = FggReader::open(buf)?;
    observer(&reader.meta())?;
    let features = reader.features().collect::<Result<Vec<_>>>()?;
    let adjacency_list = reader.adjacency_list()?;
    Ok(FggContents {
        features,
        adjacency_list,
    })
}

/// Stream the edges of a buffer without materializing the features.
pub fn deserialize_graph_edges(buf: &[u8]) -> Result<GraphEdgeIter<'_>> {
    let reader = FggReader::open(buf)?;
    Ok(reader.edges())
}
