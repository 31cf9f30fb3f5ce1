//! Send results

use serde::Serialize;

use super::Provider;

/// The outcome of a successful send
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResult {
    /// The provider that accepted the email
    pub provider: Provider,

    /// The identifier the provider assigned to the email
    pub provider_message_id: String,

    /// The provider's response, as received
    pub raw_response: serde_json::Value,
}
