use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::CodeId;

/// A single-use token record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedeemCode {
    /// Assigned by the remote store on creation. Never changes.
    pub id: CodeId,

    /// Whether the code was already redeemed. The only mutable part of a code.
    pub is_used: bool,

    /// Point in time the code was generated, taken from the client clock.
    /// Legacy records, created before this was tracked, have no creation time.
    pub created_at: Option<OffsetDateTime>,
}

impl RedeemCode {
    pub fn from_parts(id: CodeId, fields: CodeFields) -> Self {
        Self {
            id,
            is_used: fields.is_used,
            created_at: fields.created_at,
        }
    }
}

impl From<Document> for RedeemCode {
    fn from(document: Document) -> Self {
        Self::from_parts(document.id, document.fields)
    }
}

/// The fields persisted per document in the redeem code collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeFields {
    #[serde(default)]
    pub is_used: bool,

    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<OffsetDateTime>,
}

impl CodeFields {
    /// Fields of a freshly generated code.
    pub fn unused(created_at: OffsetDateTime) -> Self {
        Self {
            is_used: false,
            created_at: Some(created_at),
        }
    }

    pub(crate) fn apply(&mut self, patch: &CodePatch) {
        if let Some(is_used) = patch.is_used {
            self.is_used = is_used;
        }
    }
}

/// Partial update of a document. Only fields set to `Some` are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_used: Option<bool>,
}

impl CodePatch {
    pub fn used(is_used: bool) -> Self {
        Self {
            is_used: Some(is_used),
        }
    }
}

/// A document as read from the remote store: its id plus its fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: CodeId,
    pub fields: CodeFields,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assertr::prelude::*;

    #[test]
    fn fields_use_camel_case_names() {
        let fields = CodeFields::unused(OffsetDateTime::UNIX_EPOCH);
        let json = serde_json::to_value(&fields).unwrap();
        assert_that(json).is_equal_to(serde_json::json!({
            "isUsed": false,
            "createdAt": "1970-01-01T00:00:00Z",
        }));
    }

    #[test]
    fn legacy_fields_without_creation_time_are_tolerated() {
        let fields: CodeFields = serde_json::from_str(r#"{ "isUsed": true }"#).unwrap();
        assert_that(fields.is_used).is_true();
        assert_that(fields.created_at.is_none()).is_true();
    }

    #[test]
    fn patch_only_serializes_present_fields() {
        let json = serde_json::to_string(&CodePatch::default()).unwrap();
        assert_that(json.as_str()).is_equal_to("{}");

        let mut fields = CodeFields::unused(OffsetDateTime::UNIX_EPOCH);
        fields.apply(&CodePatch::used(true));
        assert_that(fields.is_used).is_true();
        assert_that(fields.created_at).is_equal_to(Some(OffsetDateTime::UNIX_EPOCH));
    }
}
