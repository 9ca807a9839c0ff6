//! Request and response shapes exchanged with the statement-execution service.
//!
//! The structs serialize to the service's JSON spelling (camelCase keys, externally tagged
//! field values) so a transport can hand them to `serde_json` unchanged:
//! ```rust
//! use sql_dataapi::wire::Field;
//!
//! let json = serde_json::to_string(&Field::LongValue(42)).unwrap();
//! assert_eq!(json, r#"{"longValue":42}"#);
//! ```

use serde::{Deserialize, Serialize};

/// A single typed value on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    LongValue(i64),
    DoubleValue(f64),
    BooleanValue(bool),
    BlobValue(Vec<u8>),
    StringValue(String),
    IsNull(bool),
}

impl Field {
    /// Wire tag name, as used in decode error messages.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Field::LongValue(_) => "longValue",
            Field::DoubleValue(_) => "doubleValue",
            Field::BooleanValue(_) => "booleanValue",
            Field::BlobValue(_) => "blobValue",
            Field::StringValue(_) => "stringValue",
            Field::IsNull(_) => "isNull",
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Field::IsNull(_))
    }
}

/// Hint telling the service how to cast a string parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeHint {
    Timestamp,
    Date,
    Time,
    Decimal,
    Json,
    Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqlParameter {
    pub name: String,
    pub value: Field,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_hint: Option<TypeHint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMetadata {
    pub name: String,
    pub type_name: String,
}

impl ColumnMetadata {
    #[must_use]
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteStatementRequest {
    pub resource_arn: String,
    pub secret_arn: String,
    pub database: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    pub sql: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<SqlParameter>,
    pub include_result_metadata: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExecuteStatementResponse {
    pub column_metadata: Vec<ColumnMetadata>,
    pub records: Vec<Vec<Field>>,
    pub number_of_records_updated: i64,
    pub generated_fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeginTransactionRequest {
    pub resource_arn: String,
    pub secret_arn: String,
    pub database: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeginTransactionResponse {
    pub transaction_id: String,
}

/// Body of both commit and rollback calls.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndTransactionRequest {
    pub resource_arn: String,
    pub secret_arn: String,
    pub transaction_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EndTransactionResponse {
    pub transaction_status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_in_service_spelling() {
        let req = ExecuteStatementRequest {
            resource_arn: "arn:cluster".into(),
            secret_arn: "arn:secret".into(),
            database: "app".into(),
            transaction_id: None,
            sql: "SELECT :1".into(),
            parameters: vec![SqlParameter {
                name: "1".into(),
                value: Field::StringValue("2021-01-02 03:04:05".into()),
                type_hint: Some(TypeHint::Timestamp),
            }],
            include_result_metadata: true,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["resourceArn"], "arn:cluster");
        assert_eq!(json["includeResultMetadata"], true);
        assert!(json.get("transactionId").is_none());
        assert_eq!(json["parameters"][0]["typeHint"], "TIMESTAMP");
        assert_eq!(
            json["parameters"][0]["value"]["stringValue"],
            "2021-01-02 03:04:05"
        );
    }

    #[test]
    fn response_tolerates_missing_sections() {
        let resp: ExecuteStatementResponse =
            serde_json::from_str(r#"{"numberOfRecordsUpdated":3,"generatedFields":[{"longValue":7}]}"#)
                .unwrap();
        assert_eq!(resp.number_of_records_updated, 3);
        assert!(resp.records.is_empty());
        assert_eq!(resp.generated_fields, vec![Field::LongValue(7)]);

        let null: Field = serde_json::from_str(r#"{"isNull":true}"#).unwrap();
        assert!(null.is_null());
    }
}
