use std::{env, time::Duration};

// Runtime/server configuration read from the environment.

pub fn http_port() -> u16 {
    env::var("PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(8080)
}

pub fn project_id() -> Option<String> {
    env::var("GCP_PROJECT").ok()
}

// Gateway audience, used both to sign gateway tokens and as the endpoint
// returned to clients.
pub fn api_gateway_audience() -> Option<String> {
    env::var("API_GATEWAY_AUDIENCE").ok()
}

pub fn database_url() -> Option<String> {
    env::var("DATABASE_URL").ok()
}

// Target service accounts may be overridden per environment; defaults
// derive from the project id.
pub fn guest_service_account(project_id: &str) -> String {
    env::var("GUEST_SERVICE_ACCOUNT")
        .unwrap_or_else(|_| format!("broker-guest@{project_id}.iam.gserviceaccount.com"))
}

pub fn admin_service_account(project_id: &str) -> String {
    env::var("ADMIN_SERVICE_ACCOUNT")
        .unwrap_or_else(|_| format!("broker-admin@{project_id}.iam.gserviceaccount.com"))
}

pub fn jwks_url() -> String {
    env::var("JWKS_URL").unwrap_or_else(|_| {
        "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com"
            .to_string()
    })
}

pub fn iam_credentials_url() -> String {
    env::var("IAM_CREDENTIALS_URL")
        .unwrap_or_else(|_| "https://iamcredentials.googleapis.com".to_string())
}

pub fn metadata_token_url() -> String {
    env::var("METADATA_TOKEN_URL").unwrap_or_else(|_| {
        "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token"
            .to_string()
    })
}

pub fn verify_timeout() -> Duration {
    let millis = env::var("VERIFY_TIMEOUT_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(5000);
    Duration::from_millis(millis)
}

pub fn mint_timeout() -> Duration {
    let millis = env::var("MINT_TIMEOUT_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(10_000);
    Duration::from_millis(millis)
}
