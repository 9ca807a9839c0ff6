use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::SqlDataApiError;
use crate::types::RowValues;
use crate::wire::Field;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Which temporal shape a column carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Temporal {
    Date,
    DateTime,
}

/// Per-column decoder, resolved once from the column's remote type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldConverter {
    /// Fallback for MySQL columns: strings come back as bytes, booleans as 0/1.
    MysqlDefault,
    /// Fallback for Postgres columns: strings stay text, booleans stay booleans.
    PostgresDefault,
    /// `BIGINT UNSIGNED` sent as a signed long.
    UnsignedBigInt,
    /// `FLOAT` sent as a double.
    Float,
    /// Character data decoded as raw bytes.
    StringBytes,
    /// Binary data.
    BlobBytes,
    MysqlTemporal {
        kind: Temporal,
        location: Tz,
        parse_time: bool,
    },
    PostgresTemporal(Temporal),
}

impl FieldConverter {
    /// Decode one wire field. A null field is `Null` whatever the column type.
    ///
    /// # Errors
    /// Returns `ProtocolDecode` when the wire tag does not fit the column type, or when a
    /// temporal string cannot be parsed.
    pub fn convert(&self, field: &Field) -> Result<RowValues, SqlDataApiError> {
        if field.is_null() {
            return Ok(RowValues::Null);
        }

        match *self {
            FieldConverter::MysqlDefault => Ok(match field {
                Field::LongValue(v) => RowValues::Int(*v),
                Field::DoubleValue(v) => RowValues::Double(*v),
                Field::BooleanValue(v) => RowValues::Int(i64::from(*v)),
                Field::BlobValue(v) => RowValues::Bytes(v.clone()),
                Field::StringValue(v) => RowValues::Bytes(v.clone().into_bytes()),
                Field::IsNull(_) => RowValues::Null,
            }),
            FieldConverter::PostgresDefault => Ok(match field {
                Field::LongValue(v) => RowValues::Int(*v),
                Field::DoubleValue(v) => RowValues::Double(*v),
                Field::BooleanValue(v) => RowValues::Bool(*v),
                Field::BlobValue(v) => RowValues::Bytes(v.clone()),
                Field::StringValue(v) => RowValues::Text(v.clone()),
                Field::IsNull(_) => RowValues::Null,
            }),
            FieldConverter::UnsignedBigInt => match field {
                // the service sends the raw 64 bits as a signed long
                #[allow(clippy::cast_sign_loss)]
                Field::LongValue(v) => Ok(RowValues::UnsignedInt(*v as u64)),
                other => Err(mismatch("longValue", other)),
            },
            FieldConverter::Float => match field {
                #[allow(clippy::cast_possible_truncation)]
                Field::DoubleValue(v) => Ok(RowValues::Float(*v as f32)),
                other => Err(mismatch("doubleValue", other)),
            },
            FieldConverter::StringBytes => match field {
                Field::StringValue(v) => Ok(RowValues::Bytes(v.clone().into_bytes())),
                other => Err(mismatch("stringValue", other)),
            },
            FieldConverter::BlobBytes => match field {
                Field::BlobValue(v) => Ok(RowValues::Bytes(v.clone())),
                other => Err(mismatch("blobValue", other)),
            },
            FieldConverter::MysqlTemporal {
                kind,
                location,
                parse_time,
            } => match field {
                Field::StringValue(v) if parse_time => {
                    parse_mysql_temporal(v, kind, location).map(RowValues::Timestamp)
                }
                Field::StringValue(v) => Ok(RowValues::Bytes(v.clone().into_bytes())),
                other => Err(mismatch("stringValue", other)),
            },
            FieldConverter::PostgresTemporal(kind) => match field {
                Field::StringValue(v) => parse_postgres_temporal(v, kind).map(RowValues::Timestamp),
                other => Err(mismatch("stringValue", other)),
            },
        }
    }
}

fn mismatch(expected: &str, actual: &Field) -> SqlDataApiError {
    SqlDataApiError::decode(expected, actual.tag())
}

fn unparsable(kind: Temporal, value: &str) -> SqlDataApiError {
    let expected = match kind {
        Temporal::Date => "DATE string",
        Temporal::DateTime => "DATETIME string",
    };
    SqlDataApiError::decode(expected, format!("{value:?}"))
}

fn parse_naive(value: &str, kind: Temporal) -> Option<NaiveDateTime> {
    match kind {
        Temporal::Date => NaiveDate::parse_from_str(value, DATE_FORMAT)
            .ok()
            .map(|d| d.and_time(NaiveTime::MIN)),
        // some servers send a bare date for DATETIME columns, accept both
        Temporal::DateTime => NaiveDateTime::parse_from_str(value, DATETIME_FORMAT)
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(value, DATE_FORMAT)
                    .ok()
                    .map(|d| d.and_time(NaiveTime::MIN))
            }),
    }
}

/// `0001-01-01 00:00:00 UTC`, the value MySQL zero dates decode to.
fn zero_time() -> Option<DateTime<FixedOffset>> {
    NaiveDate::from_ymd_opt(1, 1, 1).map(|d| d.and_time(NaiveTime::MIN).and_utc().fixed_offset())
}

fn is_zero_date(value: &str) -> bool {
    value.starts_with("0000-00-00")
        && value[10..]
            .bytes()
            .all(|b| matches!(b, b'0' | b' ' | b':' | b'.'))
}

pub(crate) fn parse_mysql_temporal(
    value: &str,
    kind: Temporal,
    location: Tz,
) -> Result<DateTime<FixedOffset>, SqlDataApiError> {
    if is_zero_date(value) {
        return zero_time().ok_or_else(|| unparsable(kind, value));
    }

    let naive = parse_naive(value, kind).ok_or_else(|| unparsable(kind, value))?;
    location
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.fixed_offset())
        .ok_or_else(|| unparsable(kind, value))
}

pub(crate) fn parse_postgres_temporal(
    value: &str,
    kind: Temporal,
) -> Result<DateTime<FixedOffset>, SqlDataApiError> {
    if let Some(naive) = parse_naive(value, kind) {
        return Ok(naive.and_utc().fixed_offset());
    }
    // timestamptz may carry an explicit offset such as `+09` or `+05:30`
    DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f%#z")
        .map(|dt| dt.with_timezone(&Utc).fixed_offset())
        .map_err(|_| unparsable(kind, value))
}
