use serde::{Deserialize, Serialize};

// Request body for the token exchange. roomId is only meaningful for
// anonymous callers.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    #[serde(rename = "roomId")]
    pub room_id: Option<String>,
}

// Success payload. Field names follow the public wire contract; failures are
// plain text bodies, not JSON.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub gcp: CloudTokenPayload,
    #[serde(rename = "apiGateway")]
    pub api_gateway: GatewayTokenPayload,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudTokenPayload {
    pub token: String,
    pub expire_time: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayTokenPayload {
    pub endpoint: String,
    pub token: String,
    pub expire_time: u64,
}
