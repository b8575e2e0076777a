use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Persisted session document, one per session identity.
///
/// `session_data` is the opaque credential blob produced by the automation
/// client on authentication. The relay stores and returns it verbatim; its
/// internal structure belongs to the driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub session_id: String,
    pub session_data: Value,
}
