//! Column data types.
//!
//! Types arrive as free text from the canvas or from external generators.
//! The text is stored and emitted exactly as written; [`DataType::kind`]
//! classifies it against the known SQL type names on demand.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Recognized SQL type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    // Integers
    Int,
    Integer,
    BigInt,
    SmallInt,
    TinyInt,
    Serial,
    BigSerial,
    // Decimals / floats
    Decimal,
    Numeric,
    Float,
    Double,
    Real,
    Money,
    // Strings
    Varchar,
    Char,
    Text,
    MediumText,
    LongText,
    // Date / time
    Date,
    DateTime,
    Timestamp,
    Time,
    Year,
    Interval,
    Boolean,
    // Binary
    Blob,
    Binary,
    VarBinary,
    Bytea,
    // Advanced
    Json,
    Jsonb,
    Uuid,
    Xml,
    Enum,
    Inet,
    Cidr,
    MacAddr,
    Bit,
    Geometry,
}

impl TypeKind {
    /// Classify a type name, ignoring case and surrounding whitespace.
    pub fn from_name(s: &str) -> Option<Self> {
        let kind = match s.trim().to_uppercase().as_str() {
            "INT" => Self::Int,
            "INTEGER" => Self::Integer,
            "BIGINT" => Self::BigInt,
            "SMALLINT" => Self::SmallInt,
            "TINYINT" => Self::TinyInt,
            "SERIAL" => Self::Serial,
            "BIGSERIAL" => Self::BigSerial,
            "DECIMAL" => Self::Decimal,
            "NUMERIC" => Self::Numeric,
            "FLOAT" => Self::Float,
            "DOUBLE" => Self::Double,
            "REAL" => Self::Real,
            "MONEY" => Self::Money,
            "VARCHAR" => Self::Varchar,
            "CHAR" => Self::Char,
            "TEXT" => Self::Text,
            "MEDIUMTEXT" => Self::MediumText,
            "LONGTEXT" => Self::LongText,
            "DATE" => Self::Date,
            "DATETIME" => Self::DateTime,
            "TIMESTAMP" => Self::Timestamp,
            "TIME" => Self::Time,
            "YEAR" => Self::Year,
            "INTERVAL" => Self::Interval,
            "BOOLEAN" | "BOOL" => Self::Boolean,
            "BLOB" => Self::Blob,
            "BINARY" => Self::Binary,
            "VARBINARY" => Self::VarBinary,
            "BYTEA" => Self::Bytea,
            "JSON" => Self::Json,
            "JSONB" => Self::Jsonb,
            "UUID" => Self::Uuid,
            "XML" => Self::Xml,
            "ENUM" => Self::Enum,
            "INET" => Self::Inet,
            "CIDR" => Self::Cidr,
            "MACADDR" => Self::MacAddr,
            "BIT" => Self::Bit,
            "GEOMETRY" => Self::Geometry,
            _ => return None,
        };
        Some(kind)
    }

    /// Canonical upper-case spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Int => "INT",
            Self::Integer => "INTEGER",
            Self::BigInt => "BIGINT",
            Self::SmallInt => "SMALLINT",
            Self::TinyInt => "TINYINT",
            Self::Serial => "SERIAL",
            Self::BigSerial => "BIGSERIAL",
            Self::Decimal => "DECIMAL",
            Self::Numeric => "NUMERIC",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::Real => "REAL",
            Self::Money => "MONEY",
            Self::Varchar => "VARCHAR",
            Self::Char => "CHAR",
            Self::Text => "TEXT",
            Self::MediumText => "MEDIUMTEXT",
            Self::LongText => "LONGTEXT",
            Self::Date => "DATE",
            Self::DateTime => "DATETIME",
            Self::Timestamp => "TIMESTAMP",
            Self::Time => "TIME",
            Self::Year => "YEAR",
            Self::Interval => "INTERVAL",
            Self::Boolean => "BOOLEAN",
            Self::Blob => "BLOB",
            Self::Binary => "BINARY",
            Self::VarBinary => "VARBINARY",
            Self::Bytea => "BYTEA",
            Self::Json => "JSON",
            Self::Jsonb => "JSONB",
            Self::Uuid => "UUID",
            Self::Xml => "XML",
            Self::Enum => "ENUM",
            Self::Inet => "INET",
            Self::Cidr => "CIDR",
            Self::MacAddr => "MACADDR",
            Self::Bit => "BIT",
            Self::Geometry => "GEOMETRY",
        }
    }
}

/// A column type as written by its producer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct DataType {
    raw: String,
}

impl DataType {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The recognized type, or `None` for names outside the known list.
    pub fn kind(&self) -> Option<TypeKind> {
        TypeKind::from_name(&self.raw)
    }

    pub fn is_known(&self) -> bool {
        self.kind().is_some()
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl Default for DataType {
    fn default() -> Self {
        TypeKind::Varchar.into()
    }
}

impl From<TypeKind> for DataType {
    fn from(kind: TypeKind) -> Self {
        Self::new(kind.as_str())
    }
}

impl From<String> for DataType {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for DataType {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<DataType> for String {
    fn from(t: DataType) -> Self {
        t.raw
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
