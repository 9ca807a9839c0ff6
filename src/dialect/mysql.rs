use super::TimeSettings;
use super::convert::{FieldConverter, Temporal};

/// Resolve the decoder for a MySQL column from its remote type name.
pub(super) fn field_converter(type_name: &str, settings: &TimeSettings) -> FieldConverter {
    let lower = type_name.trim().to_ascii_lowercase();
    let (base, unsigned) = match lower.strip_suffix(" unsigned") {
        Some(base) => (base.trim_end(), true),
        None => (lower.as_str(), false),
    };

    let temporal = |kind| FieldConverter::MysqlTemporal {
        kind,
        location: settings.location,
        parse_time: settings.parse_time,
    };

    match base {
        "bigint" if unsigned => FieldConverter::UnsignedBigInt,
        "float" => FieldConverter::Float,
        "decimal" | "char" | "varchar" | "text" | "tinytext" | "mediumtext" | "longtext"
        | "enum" | "set" | "json" | "time" => FieldConverter::StringBytes,
        "binary" | "varbinary" | "blob" | "tinyblob" | "mediumblob" | "longblob" => {
            FieldConverter::BlobBytes
        }
        "date" => temporal(Temporal::Date),
        "datetime" | "timestamp" => temporal(Temporal::DateTime),
        _ => FieldConverter::MysqlDefault,
    }
}
