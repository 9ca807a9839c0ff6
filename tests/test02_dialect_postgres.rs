use chrono::{TimeZone, Utc};
use chrono_tz::Tz;
use sql_dataapi::dialect::{Dialect, TimeSettings};
use sql_dataapi::prelude::*;
use sql_dataapi::wire::Field;

fn postgres() -> Dialect {
    Dialect::Postgres(TimeSettings::default())
}

#[test]
fn keeps_literal_marker_numbers() -> Result<(), SqlDataApiError> {
    let q = postgres().rewrite_query(
        "SELECT $2, $1",
        &NamedValue::ordinal_args(vec![RowValues::Int(1), RowValues::Int(2)]),
    )?;
    assert_eq!(q.sql, "SELECT :2, :1");
    assert_eq!(q.parameters[0].name, "1");
    assert_eq!(q.parameters[1].name, "2");

    let q = postgres().rewrite_query(
        "UPDATE t SET a = $1 WHERE b = $1 OR c = $3",
        &NamedValue::ordinal_args(vec![RowValues::Int(1), RowValues::Int(2), RowValues::Int(3)]),
    )?;
    assert_eq!(q.sql, "UPDATE t SET a = :1 WHERE b = :1 OR c = :3");
    Ok(())
}

#[test]
fn booleans_stay_booleans() -> Result<(), SqlDataApiError> {
    let d = postgres();
    let param = d.encode_param("1", &RowValues::Bool(true))?;
    assert_eq!(param.value, Field::BooleanValue(true));
    assert_eq!(d.decode_field("bool", &param.value)?, RowValues::Bool(true));
    Ok(())
}

#[test]
fn default_decoding_follows_wire_tag() -> Result<(), SqlDataApiError> {
    let d = postgres();
    assert_eq!(d.decode_field("int8", &Field::LongValue(7))?, RowValues::Int(7));
    assert_eq!(
        d.decode_field("float8", &Field::DoubleValue(1.25))?,
        RowValues::Double(1.25)
    );
    assert_eq!(
        d.decode_field("text", &Field::StringValue("hi".into()))?,
        RowValues::Text("hi".into())
    );
    assert_eq!(
        d.decode_field("bytea", &Field::BlobValue(vec![9]))?,
        RowValues::Bytes(vec![9])
    );
    assert_eq!(d.decode_field("int4", &Field::IsNull(true))?, RowValues::Null);
    Ok(())
}

#[test]
fn temporal_columns_decode_as_utc() -> Result<(), SqlDataApiError> {
    // location only affects encoding and MySQL reads
    let d = Dialect::Postgres(TimeSettings {
        location: Tz::Asia__Tokyo,
        parse_time: false,
        time_truncate: None,
    });
    let ts = d.decode_field(
        "timestamptz",
        &Field::StringValue("2021-01-02 03:04:05.5".into()),
    )?;
    let expected = Utc.with_ymd_and_hms(2021, 1, 2, 3, 4, 5).unwrap().fixed_offset()
        + chrono::TimeDelta::milliseconds(500);
    assert_eq!(ts, RowValues::Timestamp(expected));

    let date = d.decode_field("date", &Field::StringValue("2021-01-02".into()))?;
    assert_eq!(
        date,
        RowValues::Timestamp(Utc.with_ymd_and_hms(2021, 1, 2, 0, 0, 0).unwrap().fixed_offset())
    );
    Ok(())
}

#[test]
fn encodes_timestamps_in_location() -> Result<(), SqlDataApiError> {
    let d = Dialect::Postgres(TimeSettings {
        location: Tz::Asia__Tokyo,
        ..TimeSettings::default()
    });
    let ts = Utc.with_ymd_and_hms(2021, 1, 2, 3, 4, 5).unwrap().fixed_offset();
    let param = d.encode_param("1", &RowValues::Timestamp(ts))?;
    assert_eq!(param.value, Field::StringValue("2021-01-02 12:04:05".into()));
    Ok(())
}
