//! Status check records.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A status check as returned to API clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusCheck {
    pub id: String,
    pub client_name: String,
    pub timestamp: DateTime<Utc>,
}

impl StatusCheck {
    /// New record with a generated id, stamped now.
    pub fn new(client_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            client_name: client_name.into(),
            timestamp: Utc::now(),
        }
    }

    /// Persisted shape, tagged with the identity that created it.
    pub fn to_document(&self, authenticated_user: &str) -> StatusCheckDocument {
        StatusCheckDocument {
            id: self.id.clone(),
            client_name: self.client_name.clone(),
            timestamp: self.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, false),
            authenticated_user: authenticated_user.to_string(),
        }
    }
}

/// A status check as stored. Timestamps are ISO-8601 strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCheckDocument {
    pub id: String,
    pub client_name: String,
    pub timestamp: String,
    pub authenticated_user: String,
}

impl StatusCheckDocument {
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

impl TryFrom<StatusCheckDocument> for StatusCheck {
    type Error = String;

    fn try_from(doc: StatusCheckDocument) -> Result<Self, Self::Error> {
        let timestamp = doc
            .parsed_timestamp()
            .ok_or_else(|| format!("document {} has invalid timestamp {:?}", doc.id, doc.timestamp))?;
        Ok(Self {
            id: doc.id,
            client_name: doc.client_name,
            timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_keeps_identity_and_iso_timestamp() {
        let check = StatusCheck::new("Memorial Bench 12");
        let doc = check.to_document("api-client-1234abcd");

        assert_eq!(doc.id, check.id);
        assert_eq!(doc.authenticated_user, "api-client-1234abcd");
        assert!(doc.timestamp.ends_with("+00:00"));

        let back = StatusCheck::try_from(doc).unwrap();
        assert_eq!(back, check);
    }

    #[test]
    fn test_bad_timestamp_is_reported() {
        let doc = StatusCheckDocument {
            id: "x".into(),
            client_name: "n".into(),
            timestamp: "yesterday".into(),
            authenticated_user: "u".into(),
        };
        assert!(StatusCheck::try_from(doc).is_err());
    }
}
