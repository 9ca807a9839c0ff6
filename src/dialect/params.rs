use chrono::{DateTime, DurationRound, FixedOffset, TimeDelta, Timelike, Utc};

use crate::error::SqlDataApiError;
use crate::types::{DialectKind, NamedValue, RowValues};
use crate::wire::{Field, SqlParameter, TypeHint};

use super::TimeSettings;

/// How the caller addressed the parameters of one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ParamMode {
    Ordinal,
    Named,
}

/// Decide whether a call is purely ordinal or purely named. An empty list is ordinal.
pub(super) fn classify(args: &[NamedValue]) -> Result<ParamMode, SqlDataApiError> {
    let named = args.iter().filter(|a| a.is_named()).count();
    if named == 0 {
        Ok(ParamMode::Ordinal)
    } else if named == args.len() {
        Ok(ParamMode::Named)
    } else {
        Err(SqlDataApiError::UnsupportedParameter(format!(
            "cannot mix named and ordinal parameters ({named} named, {} ordinal)",
            args.len() - named
        )))
    }
}

/// Wire name of a parameter: the bare name for named calls, the ordinal for ordinal calls.
pub(super) fn wire_name(arg: &NamedValue, position: usize, mode: ParamMode) -> String {
    match mode {
        ParamMode::Named => arg
            .name
            .as_deref()
            .map(|n| n.trim_start_matches(':').to_string())
            .unwrap_or_default(),
        ParamMode::Ordinal => {
            let ordinal = if arg.ordinal == 0 {
                position + 1
            } else {
                arg.ordinal
            };
            ordinal.to_string()
        }
    }
}

/// Encode one value into its wire parameter.
pub(super) fn encode_value(
    kind: DialectKind,
    settings: &TimeSettings,
    name: String,
    value: &RowValues,
) -> Result<SqlParameter, SqlDataApiError> {
    let (value, type_hint) = match value {
        RowValues::Int(i) => (Field::LongValue(*i), None),
        RowValues::Double(f) => (Field::DoubleValue(*f), None),
        RowValues::Bool(b) => match kind {
            // MySQL has no boolean type; TINYINT(1) holds 0 or 1.
            DialectKind::Mysql => (Field::LongValue(i64::from(*b)), None),
            DialectKind::Postgres => (Field::BooleanValue(*b), None),
        },
        RowValues::Bytes(bytes) => (Field::BlobValue(bytes.clone()), None),
        RowValues::Text(s) => (Field::StringValue(s.clone()), None),
        RowValues::Timestamp(ts) => (
            Field::StringValue(format_timestamp(ts, settings)?),
            Some(TypeHint::Timestamp),
        ),
        RowValues::Null => (Field::IsNull(true), None),
        RowValues::UnsignedInt(_) | RowValues::Float(_) => {
            return Err(SqlDataApiError::UnsupportedParameter(format!(
                "parameter `{name}` has unsupported type {}",
                value.kind()
            )));
        }
    };

    Ok(SqlParameter {
        name,
        value,
        type_hint,
    })
}

/// Format a timestamp as `YYYY-MM-DD HH:MM:SS[.fraction]` in the configured location,
/// after truncating it to the configured granularity.
pub(super) fn format_timestamp(
    ts: &DateTime<FixedOffset>,
    settings: &TimeSettings,
) -> Result<String, SqlDataApiError> {
    let mut utc = ts.with_timezone(&Utc);
    if let Some(granularity) = settings.time_truncate.filter(|d| !d.is_zero()) {
        let delta = TimeDelta::from_std(granularity).map_err(|e| {
            SqlDataApiError::UnsupportedParameter(format!("invalid time truncation: {e}"))
        })?;
        utc = utc.duration_trunc(delta).map_err(|e| {
            SqlDataApiError::UnsupportedParameter(format!("cannot truncate timestamp: {e}"))
        })?;
    }

    let local = utc.with_timezone(&settings.location);
    let mut out = local.format("%Y-%m-%d %H:%M:%S").to_string();
    push_fraction(&mut out, local.nanosecond() % 1_000_000_000);
    Ok(out)
}

fn push_fraction(out: &mut String, nanos: u32) {
    if nanos == 0 {
        return;
    }
    let digits = format!("{nanos:09}");
    out.push('.');
    out.push_str(digits.trim_end_matches('0'));
}
