use crate::columns::{ColumnType, GraphColumn};
use crate::error::{Error, Result};
use crate::scan::Scan;
use byteorder::{LittleEndian, WriteBytesExt};

/// An owned edge property value, tagged like the column that carries it.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeValue {
    /// An explicit null. Participates in schema inference as a String column
    /// but is never serialized; readers see the key as absent.
    Null,
    Byte(i8),
    UByte(u8),
    Bool(bool),
    Short(i16),
    UShort(u16),
    Int(i32),
    UInt(u32),
    Long(i64),
    ULong(u64),
    Float(f32),
    Double(f64),
    String(String),
    Json(serde_json::Value),
    DateTime(String),
    Binary(Vec<u8>),
}

impl EdgeValue {
    /// The column type this value is encoded as. An explicit null infers a
    /// String column.
    pub fn column_type(&self) -> ColumnType {
        match self {
            EdgeValue::Null => ColumnType::String,
            EdgeValue::Byte(_) => ColumnType::Byte,
            EdgeValue::UByte(_) => ColumnType::UByte,
            EdgeValue::Bool(_) => ColumnType::Bool,
            EdgeValue::Short(_) => ColumnType::Short,
            EdgeValue::UShort(_) => ColumnType::UShort,
            EdgeValue::Int(_) => ColumnType::Int,
            EdgeValue::UInt(_) => ColumnType::UInt,
            EdgeValue::Long(_) => ColumnType::Long,
            EdgeValue::ULong(_) => ColumnType::ULong,
            EdgeValue::Float(_) => ColumnType::Float,
            EdgeValue::Double(_) => ColumnType::Double,
            EdgeValue::String(_) => ColumnType::String,
            EdgeValue::Json(_) => ColumnType::Json,
            EdgeValue::DateTime(_) => ColumnType::DateTime,
            EdgeValue::Binary(_) => ColumnType::Binary,
        }
    }

    /// Convert a JSON value the way a schemaless writer would: booleans stay
    /// booleans, numbers become doubles, strings stay strings and anything
    /// structured is carried as a Json column. An explicit `null` becomes
    /// [`EdgeValue::Null`].
    pub fn from_json(value: serde_json::Value) -> EdgeValue {
        match value {
            serde_json::Value::Null => EdgeValue::Null,
            serde_json::Value::Bool(b) => EdgeValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(v) => EdgeValue::Double(v),
                None => EdgeValue::Null,
            },
            serde_json::Value::String(s) => EdgeValue::String(s),
            value => EdgeValue::Json(value),
        }
    }
}

impl From<bool> for EdgeValue {
    fn from(value: bool) -> Self {
        EdgeValue::Bool(value)
    }
}

impl From<i32> for EdgeValue {
    fn from(value: i32) -> Self {
        EdgeValue::Int(value)
    }
}

impl From<i64> for EdgeValue {
    fn from(value: i64) -> Self {
        EdgeValue::Long(value)
    }
}

impl From<f64> for EdgeValue {
    fn from(value: f64) -> Self {
        EdgeValue::Double(value)
    }
}

impl From<&str> for EdgeValue {
    fn from(value: &str) -> Self {
        EdgeValue::String(value.to_string())
    }
}

impl From<String> for EdgeValue {
    fn from(value: String) -> Self {
        EdgeValue::String(value)
    }
}

impl From<Vec<u8>> for EdgeValue {
    fn from(value: Vec<u8>) -> Self {
        EdgeValue::Binary(value)
    }
}

impl From<serde_json::Value> for EdgeValue {
    fn from(value: serde_json::Value) -> Self {
        EdgeValue::Json(value)
    }
}

/// Edge property map preserving insertion order.
///
/// The order matters: the schema is frozen from the first propertied edge's
/// key order, so the map keeps keys exactly as they were inserted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties(Vec<(String, EdgeValue)>);

impl Properties {
    pub fn new() -> Self {
        Properties(Vec::new())
    }

    /// Insert a value, replacing an existing entry in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<EdgeValue>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&EdgeValue> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EdgeValue)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Build a property map from a JSON object. `null` members are kept as
    /// [`EdgeValue::Null`] so they take part in schema inference, though
    /// their values are never serialized.
    pub fn from_json(object: serde_json::Map<String, serde_json::Value>) -> Properties {
        object
            .into_iter()
            .map(|(name, value)| (name, EdgeValue::from_json(value)))
            .collect()
    }
}

impl FromIterator<(String, EdgeValue)> for Properties {
    fn from_iter<I: IntoIterator<Item = (String, EdgeValue)>>(iter: I) -> Self {
        let mut properties = Properties::new();
        for (name, value) in iter {
            properties.insert(name, value);
        }
        properties
    }
}

impl IntoIterator for Properties {
    type Item = (String, EdgeValue);
    type IntoIter = std::vec::IntoIter<(String, EdgeValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Freeze the edge schema from the first edge carrying properties.
///
/// Column order is the key order of that edge's map; every later edge is
/// encoded against this list.
pub(crate) fn infer_columns<'a, I>(mut edges: I) -> Option<Vec<GraphColumn>>
where
    I: Iterator<Item = &'a Properties>,
{
    let properties = edges.find(|p| !p.is_empty())?;
    Some(
        properties
            .iter()
            .map(|(name, value)| GraphColumn::new(name, value.column_type()))
            .collect(),
    )
}

/// Encode one edge's property region against the frozen schema.
///
/// Columns whose value is absent or null are skipped; map keys outside the
/// schema are dropped.
pub(crate) fn write_properties(
    out: &mut Vec<u8>,
    columns: &[GraphColumn],
    properties: &Properties,
) -> Result<()> {
    for (ordinal, column) in columns.iter().enumerate() {
        let Some(value) = properties.get(&column.name) else {
            continue;
        };
        if matches!(value, EdgeValue::Null) {
            continue;
        }
        out.write_u16::<LittleEndian>(ordinal as u16)?;
        write_value(out, column, value)?;
    }
    Ok(())
}

fn write_len_prefixed(out: &mut Vec<u8>, bytes: &[u8]) -> Result<()> {
    out.write_u32::<LittleEndian>(bytes.len() as u32)?;
    out.extend_from_slice(bytes);
    Ok(())
}

fn write_value(out: &mut Vec<u8>, column: &GraphColumn, value: &EdgeValue) -> Result<()> {
    match (column.type_, value) {
        (ColumnType::Byte, EdgeValue::Byte(v)) => out.write_i8(*v)?,
        (ColumnType::UByte, EdgeValue::UByte(v)) => out.write_u8(*v)?,
        (ColumnType::Bool, EdgeValue::Bool(v)) => out.write_u8(*v as u8)?,
        (ColumnType::Short, EdgeValue::Short(v)) => out.write_i16::<LittleEndian>(*v)?,
        (ColumnType::UShort, EdgeValue::UShort(v)) => out.write_u16::<LittleEndian>(*v)?,
        (ColumnType::Int, EdgeValue::Int(v)) => out.write_i32::<LittleEndian>(*v)?,
        (ColumnType::UInt, EdgeValue::UInt(v)) => out.write_u32::<LittleEndian>(*v)?,
        (ColumnType::Long, EdgeValue::Long(v)) => out.write_i64::<LittleEndian>(*v)?,
        (ColumnType::ULong, EdgeValue::ULong(v)) => out.write_u64::<LittleEndian>(*v)?,
        (ColumnType::Float, EdgeValue::Float(v)) => out.write_f32::<LittleEndian>(*v)?,
        (ColumnType::Double, EdgeValue::Double(v)) => out.write_f64::<LittleEndian>(*v)?,
        (ColumnType::String, EdgeValue::String(v)) => write_len_prefixed(out, v.as_bytes())?,
        (ColumnType::Json, EdgeValue::Json(v)) => {
            let text = serde_json::to_string(v)?;
            write_len_prefixed(out, text.as_bytes())?;
        }
        (ColumnType::DateTime, EdgeValue::DateTime(v)) => write_len_prefixed(out, v.as_bytes())?,
        (ColumnType::Binary, EdgeValue::Binary(v)) => write_len_prefixed(out, v)?,
        (expected, value) => {
            return Err(Error::PropertyType {
                column: column.name.clone(),
                expected,
                actual: value.column_type(),
            })
        }
    }
    Ok(())
}

/// Decode one edge's property region.
///
/// An ordinal at or past the column count ends the walk for this edge; the
/// remaining bytes belong to columns this reader does not know about.
pub(crate) fn read_properties(region: &[u8], columns: &[GraphColumn]) -> Result<Properties> {
    let mut scan = Scan::new(region);
    let mut properties = Properties::new();
    while scan.remaining() > 0 {
        let ordinal = scan.read_u16()? as usize;
        let Some(column) = columns.get(ordinal) else {
            break;
        };
        let value = read_value(&mut scan, column)?;
        properties.insert(column.name.clone(), value);
    }
    Ok(properties)
}

fn read_value(scan: &mut Scan, column: &GraphColumn) -> Result<EdgeValue> {
    Ok(match column.type_ {
        ColumnType::Byte => EdgeValue::Byte(scan.read_i8()?),
        ColumnType::UByte => EdgeValue::UByte(scan.read_u8()?),
        ColumnType::Bool => EdgeValue::Bool(scan.read_u8()? != 0),
        ColumnType::Short => EdgeValue::Short(scan.read_i16()?),
        ColumnType::UShort => EdgeValue::UShort(scan.read_u16()?),
        ColumnType::Int => EdgeValue::Int(scan.read_i32()?),
        ColumnType::UInt => EdgeValue::UInt(scan.read_u32()?),
        ColumnType::Long => EdgeValue::Long(scan.read_i64()?),
        ColumnType::ULong => EdgeValue::ULong(scan.read_u64()?),
        ColumnType::Float => EdgeValue::Float(scan.read_f32()?),
        ColumnType::Double => EdgeValue::Double(scan.read_f64()?),
        ColumnType::String => EdgeValue::String(scan.read_str()?.to_string()),
        ColumnType::Json => EdgeValue::Json(serde_json::from_str(scan.read_str()?)?),
        ColumnType::DateTime => EdgeValue::DateTime(scan.read_str()?.to_string()),
        ColumnType::Binary => EdgeValue::Binary(scan.read_bytes()?.to_vec()),
    })
}
