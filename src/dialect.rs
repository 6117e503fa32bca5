//! SQL dialects and referential actions.

use serde::{Deserialize, Deserializer, Serialize, de};
use std::fmt;

/// SQL dialect variants.
///
/// The compiler records the dialect in the script header only; column types
/// are not translated between dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Dialect {
    #[default]
    PostgreSQL,
    MySQL,
    SQLite,
    #[serde(rename = "SQL Server")]
    SqlServer,
}

impl Dialect {
    /// Parse dialect from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Some(Self::PostgreSQL),
            "mysql" => Some(Self::MySQL),
            "sqlite" => Some(Self::SQLite),
            "sql server" | "sqlserver" | "mssql" => Some(Self::SqlServer),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PostgreSQL => "PostgreSQL",
            Self::MySQL => "MySQL",
            Self::SQLite => "SQLite",
            Self::SqlServer => "SQL Server",
        }
    }
}

/// Accepts the display names and the common aliases (`postgres`, `mssql`).
impl<'de> Deserialize<'de> for Dialect {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::from_str(&raw).ok_or_else(|| de::Error::custom(format!("unknown dialect: {}", raw)))
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action taken on the child rows when the referenced parent row changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum ReferentialAction {
    #[default]
    #[serde(rename = "NO ACTION")]
    NoAction,
    #[serde(rename = "CASCADE")]
    Cascade,
    #[serde(rename = "SET NULL")]
    SetNull,
    #[serde(rename = "RESTRICT")]
    Restrict,
}

impl ReferentialAction {
    pub fn from_str(s: &str) -> Option<Self> {
        let normalized: Vec<String> = s.split_whitespace().map(|w| w.to_uppercase()).collect();
        match normalized.join(" ").as_str() {
            "NO ACTION" => Some(Self::NoAction),
            "CASCADE" => Some(Self::Cascade),
            "SET NULL" => Some(Self::SetNull),
            "RESTRICT" => Some(Self::Restrict),
            _ => None,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Self::NoAction => "NO ACTION",
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::Restrict => "RESTRICT",
        }
    }
}

/// Case and inner whitespace are ignored (`set  null`).
impl<'de> Deserialize<'de> for ReferentialAction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::from_str(&raw)
            .ok_or_else(|| de::Error::custom(format!("unknown referential action: {}", raw)))
    }
}
