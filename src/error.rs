use crate::columns::ColumnType;
use flatbuffers::InvalidFlatbuffer;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum Error {
    /// First 8 bytes are neither FGG nor FGB magic
    MissingMagicBytes,
    /// Magic carries a major version newer than this reader supports
    UnsupportedVersion(u8),
    /// A read would pass the end of the input buffer
    Truncated,
    /// Feature header size field outside the sane range
    IllegalHeaderSize(usize),
    /// Column type byte outside the known tag range
    InvalidColumnType(u8),
    /// Edge size field smaller than the fixed prefix or overrunning the buffer
    IllegalEdgeSize(u32),
    /// Edge endpoint outside the feature range (write-side)
    InvalidVertexIndex {
        which: &'static str,
        index: u32,
        features_count: u64,
    },
    /// Edge with identical endpoints (write-side)
    SelfLoop(u32),
    /// Property value does not match the column's declared type (write-side)
    PropertyType {
        column: String,
        expected: ColumnType,
        actual: ColumnType,
    },
    /// Json column payload is not valid JSON
    MalformedJson(serde_json::Error),
    Utf8(std::str::Utf8Error),
    InvalidFlatbuffer(InvalidFlatbuffer),
    Malformed(&'static str),
    IO(std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::MissingMagicBytes => f.write_str("Magic bytes don't match"),
            Error::UnsupportedVersion(major) => {
                write!(f, "Unsupported major version {major}")
            }
            Error::Truncated => f.write_str("Unexpected end of buffer"),
            Error::IllegalHeaderSize(size) => write!(f, "Illegal header size {size}"),
            Error::InvalidColumnType(tag) => write!(f, "Invalid column type {tag}"),
            Error::IllegalEdgeSize(size) => write!(f, "Illegal edge size {size}"),
            Error::InvalidVertexIndex {
                which,
                index,
                features_count,
            } => write!(
                f,
                "Invalid '{which}' index {index} (featuresCount {features_count})"
            ),
            Error::SelfLoop(index) => {
                write!(f, "self-loops are not allowed (from == to == {index})")
            }
            Error::PropertyType {
                column,
                expected,
                actual,
            } => write!(
                f,
                "Cannot encode property '{column}' declared as {expected:?} from a {actual:?} value"
            ),
            Error::MalformedJson(json) => json.fmt(f),
            Error::Utf8(utf8) => utf8.fmt(f),
            Error::InvalidFlatbuffer(invalid_flatbuffer) => invalid_flatbuffer.fmt(f),
            Error::Malformed(description) => description.fmt(f),
            Error::IO(io) => io.fmt(f),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::IO(value)
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(value: std::str::Utf8Error) -> Self {
        Error::Utf8(value)
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::MalformedJson(value)
    }
}

impl From<InvalidFlatbuffer> for Error {
    fn from(value: InvalidFlatbuffer) -> Self {
        Error::InvalidFlatbuffer(value)
    }
}
