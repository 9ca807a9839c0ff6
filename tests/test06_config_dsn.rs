use std::time::Duration;

use chrono_tz::Tz;
use sql_dataapi::prelude::*;

#[test]
fn parses_required_keys() -> Result<(), SqlDataApiError> {
    let cfg = Config::parse_dsn(
        "rdsdata://?resource_arn=resourceARN&secret_arn=secretARN&database=database&aws_region=region",
    )?;
    assert_eq!(cfg.resource_arn, "resourceARN");
    assert_eq!(cfg.secret_arn, "secretARN");
    assert_eq!(cfg.database, "database");
    assert_eq!(cfg.aws_region, "region");
    assert_eq!(cfg.location, None);
    assert_eq!(cfg.location(), Tz::UTC);
    assert!(!cfg.parse_time);
    assert_eq!(cfg.time_truncate, None);
    Ok(())
}

#[test]
fn formats_with_sorted_keys() {
    let cfg = Config::new("resourceARN", "SecretARN", "database").with_aws_region("region");
    assert_eq!(
        cfg.format_dsn(),
        "rdsdata://?aws_region=region&database=database&resource_arn=resourceARN&secret_arn=SecretARN"
    );
}

#[test]
fn optional_settings_round_trip() -> Result<(), SqlDataApiError> {
    let cfg = Config::new(
        "arn:aws:rds:us-east-1:123456789012:cluster:demo",
        "arn:aws:secretsmanager:us-east-1:123456789012:secret:demo",
        "app",
    )
    .with_aws_region("us-east-1")
    .with_location(Tz::Asia__Tokyo)
    .with_parse_time(true)
    .with_time_truncate(Duration::from_millis(1500));

    let dsn = cfg.format_dsn();
    let parsed = Config::parse_dsn(&dsn)?;
    assert_eq!(parsed, cfg);
    assert_eq!(parsed.format_dsn(), dsn);

    let settings = parsed.time_settings();
    assert_eq!(settings.location, Tz::Asia__Tokyo);
    assert!(settings.parse_time);
    assert_eq!(settings.time_truncate, Some(Duration::from_millis(1500)));
    Ok(())
}

#[test]
fn parses_option_values() -> Result<(), SqlDataApiError> {
    let cfg = Config::parse_dsn(
        "rdsdata://?resource_arn=r&secret_arn=s&location=America%2FNew_York&parse_time=true&time_truncate=1ms",
    )?;
    assert_eq!(cfg.location, Some(Tz::America__New_York));
    assert!(cfg.parse_time);
    assert_eq!(cfg.time_truncate, Some(Duration::from_millis(1)));
    Ok(())
}

#[test]
fn rejects_bad_dsns() {
    let bad = [
        "invalid://?resource_arn=resourceARN&secret_arn=secretARN",
        "rdsdata://?unknown=unknown",
        "rdsdata://",
        "not a url",
        "rdsdata://?location=Mars%2FOlympus",
        "rdsdata://?parse_time=maybe",
        "rdsdata://?time_truncate=soon",
        "rdsdata://?database=a&database=b",
    ];
    for dsn in bad {
        let err = Config::parse_dsn(dsn).unwrap_err();
        assert!(
            matches!(err, SqlDataApiError::ConfigError(_)),
            "{dsn} gave {err:?}"
        );
    }
}
