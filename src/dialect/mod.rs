//! Backend SQL flavors: placeholder rewriting, parameter encoding and result decoding.

use std::time::Duration;

use chrono_tz::Tz;

use crate::error::SqlDataApiError;
use crate::translation::{PlaceholderStyle, rewrite_placeholders};
use crate::types::{DialectKind, IsolationLevel, NamedValue, RowValues};
use crate::wire::{Field, SqlParameter};

pub mod convert;
mod mysql;
mod params;
mod postgres;

pub use convert::{FieldConverter, Temporal};

use params::{ParamMode, classify, encode_value, wire_name};

/// Time handling shared by encoding and decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSettings {
    /// Zone timestamps are written in and MySQL temporal columns are read in.
    pub location: Tz,
    /// Decode MySQL `DATE`/`DATETIME`/`TIMESTAMP` as timestamps instead of bytes.
    pub parse_time: bool,
    /// Granularity timestamp parameters are truncated to before encoding.
    pub time_truncate: Option<Duration>,
}

impl Default for TimeSettings {
    fn default() -> Self {
        Self {
            location: Tz::UTC,
            parse_time: false,
            time_truncate: None,
        }
    }
}

/// SQL text and parameters ready to hand to the executor.
#[derive(Debug, Clone, PartialEq)]
pub struct RewrittenQuery {
    pub sql: String,
    pub parameters: Vec<SqlParameter>,
}

/// The backend flavor a connection talks to, fixed at detection time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialect {
    Mysql(TimeSettings),
    Postgres(TimeSettings),
}

impl Dialect {
    #[must_use]
    pub fn new(kind: DialectKind, settings: TimeSettings) -> Self {
        match kind {
            DialectKind::Mysql => Dialect::Mysql(settings),
            DialectKind::Postgres => Dialect::Postgres(settings),
        }
    }

    /// Classify a server version string; anything mentioning PostgreSQL is the Postgres family.
    #[must_use]
    pub fn from_version(version: &str, settings: TimeSettings) -> Self {
        if version.to_ascii_lowercase().contains("postgresql") {
            Dialect::Postgres(settings)
        } else {
            Dialect::Mysql(settings)
        }
    }

    #[must_use]
    pub fn kind(&self) -> DialectKind {
        match self {
            Dialect::Mysql(_) => DialectKind::Mysql,
            Dialect::Postgres(_) => DialectKind::Postgres,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &TimeSettings {
        match self {
            Dialect::Mysql(s) | Dialect::Postgres(s) => s,
        }
    }

    #[must_use]
    pub fn placeholder_style(&self) -> PlaceholderStyle {
        match self {
            Dialect::Mysql(_) => PlaceholderStyle::Mysql,
            Dialect::Postgres(_) => PlaceholderStyle::Postgres,
        }
    }

    /// Turn caller SQL and arguments into the named form the service accepts.
    ///
    /// Ordinal calls have their markers rewritten to `:N` and their parameters named `N`;
    /// named calls keep their text and drop any leading `:` from the names.
    ///
    /// # Errors
    /// `UnsupportedParameter` when named and ordinal arguments are mixed or a value cannot
    /// be encoded.
    pub fn rewrite_query(
        &self,
        sql: &str,
        args: &[NamedValue],
    ) -> Result<RewrittenQuery, SqlDataApiError> {
        let mode = classify(args)?;
        let sql = match mode {
            ParamMode::Ordinal => rewrite_placeholders(sql, self.placeholder_style()).into_owned(),
            ParamMode::Named => sql.to_string(),
        };

        let parameters = args
            .iter()
            .enumerate()
            .map(|(position, arg)| {
                self.encode_param(wire_name(arg, position, mode), &arg.value)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RewrittenQuery { sql, parameters })
    }

    /// Encode a single value under this dialect's rules.
    ///
    /// # Errors
    /// `UnsupportedParameter` for value kinds that only come out of decoding.
    pub fn encode_param(
        &self,
        name: impl Into<String>,
        value: &RowValues,
    ) -> Result<SqlParameter, SqlDataApiError> {
        encode_value(self.kind(), self.settings(), name.into(), value)
    }

    /// Isolation levels both families accept in `SET TRANSACTION`.
    #[must_use]
    pub fn is_isolation_level_supported(&self, level: IsolationLevel) -> bool {
        matches!(
            level,
            IsolationLevel::Default
                | IsolationLevel::ReadUncommitted
                | IsolationLevel::ReadCommitted
                | IsolationLevel::RepeatableRead
                | IsolationLevel::Serializable
        )
    }

    #[must_use]
    pub fn field_converter(&self, type_name: &str) -> FieldConverter {
        match self {
            Dialect::Mysql(settings) => mysql::field_converter(type_name, settings),
            Dialect::Postgres(_) => postgres::field_converter(type_name),
        }
    }

    /// Decode one field of a column with the given remote type name.
    ///
    /// # Errors
    /// `ProtocolDecode` when the wire tag does not fit the column type.
    pub fn decode_field(
        &self,
        type_name: &str,
        field: &Field,
    ) -> Result<RowValues, SqlDataApiError> {
        self.field_converter(type_name).convert(field)
    }
}
