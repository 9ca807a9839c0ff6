use super::convert::{FieldConverter, Temporal};

/// Resolve the decoder for a Postgres column. Temporal columns decode to UTC wall-clock
/// timestamps; everything else follows the wire tag.
pub(super) fn field_converter(type_name: &str) -> FieldConverter {
    match type_name.trim().to_ascii_lowercase().as_str() {
        "timestamp" | "timestamptz" => FieldConverter::PostgresTemporal(Temporal::DateTime),
        "date" => FieldConverter::PostgresTemporal(Temporal::Date),
        _ => FieldConverter::PostgresDefault,
    }
}
