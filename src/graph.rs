use crate::columns::{read_column, write_column, GraphColumn};
use crate::error::{Error, Result};
use crate::properties::{infer_columns, read_properties, write_properties, EdgeValue, Properties};
use crate::scan::Scan;
use byteorder::{LittleEndian, WriteBytesExt};
use geozero::error::GeozeroError;
use geozero::{ColumnValue, PropertyProcessor};

/// A directed edge between two features of the same file.
///
/// `from` and `to` are positions in the feature section. Bidirectional
/// connections are expressed as two edges.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub from: u32,
    pub to: u32,
    pub properties: Properties,
}

impl Edge {
    pub fn new(from: u32, to: u32) -> Edge {
        Edge {
            from,
            to,
            properties: Properties::new(),
        }
    }

    pub fn with_properties(from: u32, to: u32, properties: Properties) -> Edge {
        Edge {
            from,
            to,
            properties,
        }
    }

    pub(crate) fn validate(&self, features_count: u64) -> Result<()> {
        if (self.from as u64) >= features_count {
            return Err(Error::InvalidVertexIndex {
                which: "from",
                index: self.from,
                features_count,
            });
        }
        if (self.to as u64) >= features_count {
            return Err(Error::InvalidVertexIndex {
                which: "to",
                index: self.to,
                features_count,
            });
        }
        if self.from == self.to {
            return Err(Error::SelfLoop(self.from));
        }
        Ok(())
    }

    /// Process the edge properties with a geozero `PropertyProcessor`.
    pub fn process_properties<P: PropertyProcessor>(
        &self,
        processor: &mut P,
    ) -> geozero::error::Result<bool> {
        let mut finish = false;
        for (i, (name, value)) in self.properties.iter().enumerate() {
            finish = match value {
                // nulls are not visible to readers
                EdgeValue::Null => continue,
                EdgeValue::Byte(v) => processor.property(i, name, &ColumnValue::Byte(*v))?,
                EdgeValue::UByte(v) => processor.property(i, name, &ColumnValue::UByte(*v))?,
                EdgeValue::Bool(v) => processor.property(i, name, &ColumnValue::Bool(*v))?,
                EdgeValue::Short(v) => processor.property(i, name, &ColumnValue::Short(*v))?,
                EdgeValue::UShort(v) => processor.property(i, name, &ColumnValue::UShort(*v))?,
                EdgeValue::Int(v) => processor.property(i, name, &ColumnValue::Int(*v))?,
                EdgeValue::UInt(v) => processor.property(i, name, &ColumnValue::UInt(*v))?,
                EdgeValue::Long(v) => processor.property(i, name, &ColumnValue::Long(*v))?,
                EdgeValue::ULong(v) => processor.property(i, name, &ColumnValue::ULong(*v))?,
                EdgeValue::Float(v) => processor.property(i, name, &ColumnValue::Float(*v))?,
                EdgeValue::Double(v) => processor.property(i, name, &ColumnValue::Double(*v))?,
                EdgeValue::String(v) => processor.property(i, name, &ColumnValue::String(v))?,
                EdgeValue::Json(v) => {
                    let text = serde_json::to_string(v)
                        .map_err(|e| GeozeroError::Property(e.to_string()))?;
                    processor.property(i, name, &ColumnValue::Json(&text))?
                }
                EdgeValue::DateTime(v) => {
                    processor.property(i, name, &ColumnValue::DateTime(v))?
                }
                EdgeValue::Binary(v) => processor.property(i, name, &ColumnValue::Binary(v))?,
            };
            if finish {
                break;
            }
        }
        Ok(finish)
    }
}

/// The complete edge set of a graph, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdjacencyList {
    pub edges: Vec<Edge>,
}

impl AdjacencyList {
    pub fn new(edges: Vec<Edge>) -> AdjacencyList {
        AdjacencyList { edges }
    }
}

impl From<Vec<Edge>> for AdjacencyList {
    fn from(edges: Vec<Edge>) -> Self {
        AdjacencyList { edges }
    }
}

/// Decoded graph header.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphMeta {
    pub edge_count: u32,
    /// `None` when the header declares zero columns.
    pub edge_columns: Option<Vec<GraphColumn>>,
}

impl GraphMeta {
    pub(crate) fn columns(&self) -> &[GraphColumn] {
        self.edge_columns.as_deref().unwrap_or(&[])
    }
}

/// Append the graph header: `[edgeCount u32][columnCount u16][columns…]`.
pub(crate) fn write_graph_header(
    out: &mut Vec<u8>,
    edge_count: u32,
    columns: Option<&[GraphColumn]>,
) -> Result<()> {
    let columns = columns.unwrap_or(&[]);
    if columns.len() > u16::MAX as usize {
        return Err(Error::Malformed("column count exceeds 65535"));
    }
    out.write_u32::<LittleEndian>(edge_count)?;
    out.write_u16::<LittleEndian>(columns.len() as u16)?;
    for column in columns {
        write_column(out, column)?;
    }
    Ok(())
}

pub(crate) fn read_graph_header(scan: &mut Scan) -> Result<GraphMeta> {
    let edge_count = scan.read_u32()?;
    let column_count = scan.read_u16()?;
    let edge_columns = if column_count == 0 {
        None
    } else {
        let columns = (0..column_count)
            .map(|_| read_column(scan))
            .collect::<Result<Vec<_>>>()?;
        Some(columns)
    };
    Ok(GraphMeta {
        edge_count,
        edge_columns,
    })
}

/// Append one edge record: `[size u32][from u32][to u32][properties]`.
/// `size` excludes its own four bytes.
pub(crate) fn write_edge(out: &mut Vec<u8>, columns: &[GraphColumn], edge: &Edge) -> Result<()> {
    let mut region = Vec::new();
    write_properties(&mut region, columns, &edge.properties)?;
    out.write_u32::<LittleEndian>((8 + region.len()) as u32)?;
    out.write_u32::<LittleEndian>(edge.from)?;
    out.write_u32::<LittleEndian>(edge.to)?;
    out.extend_from_slice(&region);
    Ok(())
}

/// Read one edge record. Endpoint indices are a writer-side invariant and
/// are not revalidated here.
pub(crate) fn read_edge(scan: &mut Scan, columns: &[GraphColumn]) -> Result<Edge> {
    let size = scan.read_u32()?;
    if size < 8 {
        return Err(Error::IllegalEdgeSize(size));
    }
    let mut body = Scan::new(scan.take(size as usize).map_err(|_| Error::IllegalEdgeSize(size))?);
    let from = body.read_u32()?;
    let to = body.read_u32()?;
    let properties = read_properties(body.rest(), columns)?;
    Ok(Edge {
        from,
        to,
        properties,
    })
}

/// Encode the whole graph section: `[len(H) u32][H][edge₀]…[edge_{n-1}]`.
///
/// The schema is inferred from the first propertied edge and every edge is
/// validated against `features_count` before it is framed.
pub(crate) fn write_graph_section(
    features_count: u64,
    list: &AdjacencyList,
) -> Result<Vec<u8>> {
    if list.edges.len() > u32::MAX as usize {
        return Err(Error::Malformed("edge count exceeds u32 range"));
    }
    let columns = infer_columns(list.edges.iter().map(|e| &e.properties));
    let mut header = Vec::new();
    write_graph_header(&mut header, list.edges.len() as u32, columns.as_deref())?;

    let mut out = Vec::with_capacity(4 + header.len());
    out.write_u32::<LittleEndian>(header.len() as u32)?;
    out.extend_from_slice(&header);
    let columns = columns.as_deref().unwrap_or(&[]);
    for edge in &list.edges {
        edge.validate(features_count)?;
        write_edge(&mut out, columns, edge)?;
    }
    Ok(out)
}
