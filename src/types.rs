use chrono::{DateTime, FixedOffset};

/// Values bound as statement parameters or decoded from result fields.
///
/// The same enum is used in both directions so callers can feed decoded values back into a
/// later statement:
/// ```rust
/// use sql_dataapi::prelude::*;
///
/// let params = NamedValue::ordinal_args(vec![
///     RowValues::Int(1),
///     RowValues::Text("alice".into()),
///     RowValues::Bool(true),
/// ]);
/// assert_eq!(params[2].ordinal, 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    /// Signed integer value (64-bit)
    Int(i64),
    /// Unsigned integer value (64-bit); produced by decoding only
    UnsignedInt(u64),
    /// Single precision float; produced by decoding only
    Float(f32),
    /// Double precision float
    Double(f64),
    /// Boolean value
    Bool(bool),
    /// Text/string value
    Text(String),
    /// Raw bytes (binary data, or character data decoded the way MySQL clients return it)
    Bytes(Vec<u8>),
    /// Calendar timestamp with the offset of the zone it was read or written in
    Timestamp(DateTime<FixedOffset>),
    /// NULL value
    Null,
}

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let RowValues::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_unsigned_int(&self) -> Option<u64> {
        if let RowValues::UnsignedInt(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RowValues::Text(value) => Some(value),
            RowValues::Bytes(bytes) => std::str::from_utf8(bytes).ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let RowValues::Bool(value) = self {
            return Some(value);
        } else if let Some(i) = self.as_int() {
            if *i == 1 {
                return Some(&true);
            } else if *i == 0 {
                return Some(&false);
            }
        }
        None
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<DateTime<FixedOffset>> {
        if let RowValues::Timestamp(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            RowValues::Double(value) => Some(*value),
            RowValues::Float(value) => Some(f64::from(*value)),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        if let RowValues::Bytes(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    /// Short name of the variant, used in error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            RowValues::Int(_) => "int64",
            RowValues::UnsignedInt(_) => "uint64",
            RowValues::Float(_) => "float32",
            RowValues::Double(_) => "float64",
            RowValues::Bool(_) => "bool",
            RowValues::Text(_) => "string",
            RowValues::Bytes(_) => "bytes",
            RowValues::Timestamp(_) => "timestamp",
            RowValues::Null => "null",
        }
    }
}

/// A parameter together with how it was addressed by the caller.
///
/// Ordinal parameters leave `name` empty and carry their 1-based position; named parameters
/// carry the name (with or without a leading `:`).
#[derive(Debug, Clone, PartialEq)]
pub struct NamedValue {
    pub name: Option<String>,
    pub ordinal: usize,
    pub value: RowValues,
}

impl NamedValue {
    #[must_use]
    pub fn ordinal(ordinal: usize, value: RowValues) -> Self {
        Self {
            name: None,
            ordinal,
            value,
        }
    }

    #[must_use]
    pub fn named(name: impl Into<String>, value: RowValues) -> Self {
        Self {
            name: Some(name.into()),
            ordinal: 0,
            value,
        }
    }

    /// Number plain values 1, 2, 3, ... in order.
    #[must_use]
    pub fn ordinal_args(values: Vec<RowValues>) -> Vec<NamedValue> {
        values
            .into_iter()
            .enumerate()
            .map(|(i, value)| NamedValue::ordinal(i + 1, value))
            .collect()
    }

    pub(crate) fn is_named(&self) -> bool {
        self.name.as_deref().is_some_and(|n| !n.is_empty())
    }
}

/// Backend SQL flavor behind the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialectKind {
    /// MySQL-compatible engines (MySQL, Aurora MySQL)
    Mysql,
    /// PostgreSQL-compatible engines (PostgreSQL, Aurora PostgreSQL)
    Postgres,
}

/// Transaction isolation levels a caller may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IsolationLevel {
    #[default]
    Default,
    ReadUncommitted,
    ReadCommitted,
    WriteCommitted,
    RepeatableRead,
    Snapshot,
    Serializable,
    Linearizable,
}

impl IsolationLevel {
    /// SQL spelling used in `SET TRANSACTION ISOLATION LEVEL ...`.
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            IsolationLevel::Default => "DEFAULT",
            IsolationLevel::ReadUncommitted => "READ UNCOMMITTED",
            IsolationLevel::ReadCommitted => "READ COMMITTED",
            IsolationLevel::WriteCommitted => "WRITE COMMITTED",
            IsolationLevel::RepeatableRead => "REPEATABLE READ",
            IsolationLevel::Snapshot => "SNAPSHOT",
            IsolationLevel::Serializable => "SERIALIZABLE",
            IsolationLevel::Linearizable => "LINEARIZABLE",
        }
    }
}

impl std::fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Options for [`Connection::begin`](crate::connection::Connection::begin).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TxOptions {
    pub isolation: IsolationLevel,
    pub read_only: bool,
}

impl TxOptions {
    #[must_use]
    pub fn with_isolation(mut self, isolation: IsolationLevel) -> Self {
        self.isolation = isolation;
        self
    }

    #[must_use]
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }
}
