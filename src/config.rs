use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use chrono_tz::Tz;
use url::Url;
use url::form_urlencoded;

use crate::dialect::TimeSettings;
use crate::error::SqlDataApiError;

/// URI scheme of a data-API connection string.
pub const DSN_SCHEME: &str = "rdsdata";

const KEY_AWS_REGION: &str = "aws_region";
const KEY_DATABASE: &str = "database";
const KEY_LOCATION: &str = "location";
const KEY_PARSE_TIME: &str = "parse_time";
const KEY_RESOURCE_ARN: &str = "resource_arn";
const KEY_SECRET_ARN: &str = "secret_arn";
const KEY_TIME_TRUNCATE: &str = "time_truncate";

/// Where and how to reach the database behind the service.
///
/// Build it field by field or from a connection string:
/// ```rust
/// use sql_dataapi::config::Config;
///
/// let cfg = Config::parse_dsn(
///     "rdsdata://?aws_region=us-east-1&database=app&resource_arn=arn1&secret_arn=arn2",
/// )
/// .unwrap();
/// assert_eq!(cfg.database, "app");
/// assert_eq!(
///     cfg.format_dsn(),
///     "rdsdata://?aws_region=us-east-1&database=app&resource_arn=arn1&secret_arn=arn2"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Config {
    pub resource_arn: String,
    pub secret_arn: String,
    pub database: String,
    pub aws_region: String,
    /// Zone for timestamp parameters and parsed MySQL temporal columns; UTC when unset.
    pub location: Option<Tz>,
    pub parse_time: bool,
    pub time_truncate: Option<Duration>,
}

impl Config {
    #[must_use]
    pub fn new(
        resource_arn: impl Into<String>,
        secret_arn: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            resource_arn: resource_arn.into(),
            secret_arn: secret_arn.into(),
            database: database.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_aws_region(mut self, region: impl Into<String>) -> Self {
        self.aws_region = region.into();
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: Tz) -> Self {
        self.location = Some(location);
        self
    }

    #[must_use]
    pub fn with_parse_time(mut self, parse_time: bool) -> Self {
        self.parse_time = parse_time;
        self
    }

    #[must_use]
    pub fn with_time_truncate(mut self, granularity: Duration) -> Self {
        self.time_truncate = Some(granularity);
        self
    }

    #[must_use]
    pub fn location(&self) -> Tz {
        self.location.unwrap_or(Tz::UTC)
    }

    #[must_use]
    pub fn time_settings(&self) -> TimeSettings {
        TimeSettings {
            location: self.location(),
            parse_time: self.parse_time,
            time_truncate: self.time_truncate,
        }
    }

    /// Check the fields every remote call needs.
    ///
    /// # Errors
    /// Returns `SqlDataApiError::ConfigError` if the resource or secret identity is missing.
    pub fn validate(&self) -> Result<(), SqlDataApiError> {
        if self.resource_arn.is_empty() {
            return Err(SqlDataApiError::ConfigError(
                "resource_arn is required".to_string(),
            ));
        }
        if self.secret_arn.is_empty() {
            return Err(SqlDataApiError::ConfigError(
                "secret_arn is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse an `rdsdata://?key=value&...` connection string.
    ///
    /// # Errors
    /// Returns `SqlDataApiError::ConfigError` for a malformed string, a foreign scheme, a
    /// missing query, an unknown or repeated key, or an invalid option value.
    pub fn parse_dsn(dsn: &str) -> Result<Self, SqlDataApiError> {
        let url = Url::parse(dsn)
            .map_err(|e| SqlDataApiError::ConfigError(format!("invalid DSN: {e}")))?;
        if url.scheme() != DSN_SCHEME {
            return Err(SqlDataApiError::ConfigError(format!(
                "invalid DSN scheme `{}`, expected `{DSN_SCHEME}`",
                url.scheme()
            )));
        }
        let Some(query) = url.query() else {
            return Err(SqlDataApiError::ConfigError(
                "DSN has no query parameters".to_string(),
            ));
        };

        let mut cfg = Config::default();
        let mut seen = BTreeSet::new();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            if !seen.insert(key.to_string()) {
                return Err(SqlDataApiError::ConfigError(format!(
                    "DSN key `{key}` given more than once"
                )));
            }
            match key.as_ref() {
                KEY_AWS_REGION => cfg.aws_region = value.into_owned(),
                KEY_DATABASE => cfg.database = value.into_owned(),
                KEY_RESOURCE_ARN => cfg.resource_arn = value.into_owned(),
                KEY_SECRET_ARN => cfg.secret_arn = value.into_owned(),
                KEY_LOCATION => {
                    let tz = value.parse::<Tz>().map_err(|e| {
                        SqlDataApiError::ConfigError(format!("invalid location `{value}`: {e}"))
                    })?;
                    cfg.location = Some(tz);
                }
                KEY_PARSE_TIME => cfg.parse_time = parse_bool(&value)?,
                KEY_TIME_TRUNCATE => {
                    let granularity = humantime::parse_duration(&value).map_err(|e| {
                        SqlDataApiError::ConfigError(format!(
                            "invalid time_truncate `{value}`: {e}"
                        ))
                    })?;
                    cfg.time_truncate = Some(granularity);
                }
                other => {
                    return Err(SqlDataApiError::ConfigError(format!(
                        "unknown DSN key `{other}`"
                    )));
                }
            }
        }
        Ok(cfg)
    }

    /// Format as a connection string with keys in sorted order. Unset options are left out,
    /// so formatting a parsed string gives the same string back.
    #[must_use]
    pub fn format_dsn(&self) -> String {
        let mut pairs: BTreeMap<&str, String> = BTreeMap::new();
        if !self.aws_region.is_empty() {
            pairs.insert(KEY_AWS_REGION, self.aws_region.clone());
        }
        if !self.database.is_empty() {
            pairs.insert(KEY_DATABASE, self.database.clone());
        }
        if let Some(tz) = self.location {
            pairs.insert(KEY_LOCATION, tz.name().to_string());
        }
        if self.parse_time {
            pairs.insert(KEY_PARSE_TIME, "true".to_string());
        }
        if !self.resource_arn.is_empty() {
            pairs.insert(KEY_RESOURCE_ARN, self.resource_arn.clone());
        }
        if !self.secret_arn.is_empty() {
            pairs.insert(KEY_SECRET_ARN, self.secret_arn.clone());
        }
        if let Some(granularity) = self.time_truncate {
            pairs.insert(
                KEY_TIME_TRUNCATE,
                humantime::format_duration(granularity).to_string(),
            );
        }

        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        format!("{DSN_SCHEME}://?{query}")
    }
}

fn parse_bool(value: &str) -> Result<bool, SqlDataApiError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(SqlDataApiError::ConfigError(format!(
            "invalid parse_time `{value}`, expected true or false"
        ))),
    }
}
