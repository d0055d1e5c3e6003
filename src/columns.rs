use crate::error::{Error, Result};
use crate::scan::Scan;
use byteorder::{LittleEndian, WriteBytesExt};
use std::str;

/// Edge property column types.
///
/// The tag values match the FlatGeobuf column types, so a feature column and
/// an edge column with the same tag carry the same binary form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ColumnType {
    Byte = 0,
    UByte = 1,
    Bool = 2,
    Short = 3,
    UShort = 4,
    Int = 5,
    UInt = 6,
    Long = 7,
    ULong = 8,
    Float = 9,
    Double = 10,
    String = 11,
    Json = 12,
    DateTime = 13,
    Binary = 14,
}

impl ColumnType {
    pub fn from_u8(tag: u8) -> Result<ColumnType> {
        Ok(match tag {
            0 => ColumnType::Byte,
            1 => ColumnType::UByte,
            2 => ColumnType::Bool,
            3 => ColumnType::Short,
            4 => ColumnType::UShort,
            5 => ColumnType::Int,
            6 => ColumnType::UInt,
            7 => ColumnType::Long,
            8 => ColumnType::ULong,
            9 => ColumnType::Float,
            10 => ColumnType::Double,
            11 => ColumnType::String,
            12 => ColumnType::Json,
            13 => ColumnType::DateTime,
            14 => ColumnType::Binary,
            _ => return Err(Error::InvalidColumnType(tag)),
        })
    }
}

/// A named, typed slot in the edge schema. Edges reference columns by their
/// position in the graph header's column list.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphColumn {
    pub name: String,
    pub type_: ColumnType,
}

impl GraphColumn {
    pub fn new(name: impl Into<String>, type_: ColumnType) -> Self {
        GraphColumn {
            name: name.into(),
            type_,
        }
    }
}

/// Append a column descriptor: `[nameLen u16][name][type u8]`.
pub(crate) fn write_column(out: &mut Vec<u8>, column: &GraphColumn) -> Result<()> {
    let name = column.name.as_bytes();
    if name.is_empty() {
        return Err(Error::Malformed("column name must not be empty"));
    }
    if name.len() > u16::MAX as usize {
        return Err(Error::Malformed("column name exceeds 65535 bytes"));
    }
    out.write_u16::<LittleEndian>(name.len() as u16)?;
    out.extend_from_slice(name);
    out.write_u8(column.type_ as u8)?;
    Ok(())
}

pub(crate) fn read_column(scan: &mut Scan) -> Result<GraphColumn> {
    let len = scan.read_u16()? as usize;
    let name = str::from_utf8(scan.take(len)?)?.to_string();
    let type_ = ColumnType::from_u8(scan.read_u8()?)?;
    Ok(GraphColumn { name, type_ })
}
