use serde::{Deserialize, Serialize};

/// Account identity reported by the client once the session is ready.
///
/// Field names follow the external API's JSON contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientIdentity {
    /// Bare phone number, e.g. `"4915112345678"`.
    pub phone_number: String,
    /// Display name the account advertises.
    pub pushname: String,
    /// Platform string reported by the client (e.g. `"android"`).
    pub platform: String,
    /// Serialized WhatsApp id, e.g. `"4915112345678@c.us"`.
    pub wid: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_api_field_names() {
        let identity = ClientIdentity {
            phone_number: "4915112345678".into(),
            pushname: "Ada".into(),
            platform: "android".into(),
            wid: "4915112345678@c.us".into(),
        };
        let value = serde_json::to_value(&identity).unwrap();
        assert_eq!(value["phoneNumber"], "4915112345678");
        assert_eq!(value["pushname"], "Ada");
        assert_eq!(value["platform"], "android");
        assert_eq!(value["wid"], "4915112345678@c.us");
    }
}
