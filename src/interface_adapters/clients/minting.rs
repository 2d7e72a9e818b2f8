use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::entities::SignedGatewayToken;
use crate::domain::ports::CredentialMinter;

const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

// Thin reqwest client for the IAM credentials minting API. Requests
// authenticate with the broker's own identity, fetched from the metadata
// token endpoint.
#[derive(Clone)]
pub struct IamCredentialsClient {
    http: reqwest::Client,
    credentials_url: String,
    metadata_token_url: String,
    gateway_audience: String,
}

#[derive(Debug)]
pub enum MintClientError {
    Transport(reqwest::Error),
    Upstream {
        status: StatusCode,
        message: Option<String>,
    },
    Decode(reqwest::Error),
}

impl fmt::Display for MintClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MintClientError::Transport(err) => write!(f, "minting transport error: {err}"),
            MintClientError::Upstream { status, message } => {
                if let Some(message) = message {
                    write!(f, "minting upstream error {status}: {message}")
                } else {
                    write!(f, "minting upstream error {status}")
                }
            }
            MintClientError::Decode(err) => write!(f, "minting response decode error: {err}"),
        }
    }
}

impl std::error::Error for MintClientError {}

// Standard error envelope returned by the credentials API.
#[derive(Debug, Deserialize)]
struct UpstreamError {
    error: UpstreamErrorBody,
}

#[derive(Debug, Deserialize)]
struct UpstreamErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct MetadataTokenResponse {
    access_token: String,
}

#[derive(Debug, Serialize)]
struct GenerateAccessTokenRequest<'a> {
    scope: [&'a str; 1],
    // Wire format is a duration string, e.g. "3600s".
    lifetime: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateAccessTokenResponse {
    access_token: String,
}

// Claim set signed by the target service account for the gateway audience.
#[derive(Debug, Serialize)]
struct GatewayClaims<'a> {
    iss: &'a str,
    sub: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Debug, Serialize)]
struct SignJwtRequest {
    payload: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignJwtResponse {
    signed_jwt: String,
}

impl IamCredentialsClient {
    pub fn new(
        credentials_url: impl Into<String>,
        metadata_token_url: impl Into<String>,
        gateway_audience: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            credentials_url: credentials_url.into(),
            metadata_token_url: metadata_token_url.into(),
            gateway_audience: gateway_audience.into(),
        })
    }

    // The broker's own access token, used to authorize both minting calls.
    async fn broker_bearer(&self) -> Result<String, MintClientError> {
        let response = self
            .http
            .get(&self.metadata_token_url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(MintClientError::Transport)?;
        let status = response.status();

        if !status.is_success() {
            return Err(MintClientError::Upstream {
                status,
                message: None,
            });
        }

        let token = response
            .json::<MetadataTokenResponse>()
            .await
            .map_err(MintClientError::Decode)?;
        Ok(token.access_token)
    }

    async fn post_json<B, R>(
        &self,
        url: String,
        bearer: &str,
        body: &B,
    ) -> Result<R, MintClientError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let response = self
            .http
            .post(url)
            .bearer_auth(bearer)
            .json(body)
            .send()
            .await
            .map_err(MintClientError::Transport)?;
        let status = response.status();

        // Keep upstream status/message so failures can be logged usefully.
        if !status.is_success() {
            let message = response
                .json::<UpstreamError>()
                .await
                .ok()
                .map(|payload| payload.error.message);
            return Err(MintClientError::Upstream { status, message });
        }

        response.json::<R>().await.map_err(MintClientError::Decode)
    }
}

#[async_trait]
impl CredentialMinter for IamCredentialsClient {
    async fn mint_access_token(
        &self,
        target_account: &str,
        lifetime_seconds: u64,
    ) -> Result<String, String> {
        let bearer = self.broker_bearer().await.map_err(|err| err.to_string())?;
        let url = format!(
            "{}/v1/projects/-/serviceAccounts/{}:generateAccessToken",
            self.credentials_url, target_account
        );
        let body = GenerateAccessTokenRequest {
            scope: [CLOUD_PLATFORM_SCOPE],
            lifetime: format!("{lifetime_seconds}s"),
        };

        let response: GenerateAccessTokenResponse = self
            .post_json(url, &bearer, &body)
            .await
            .map_err(|err| err.to_string())?;

        Ok(response.access_token)
    }

    async fn sign_gateway_token(
        &self,
        target_account: &str,
        issued_at: u64,
        expires_at: u64,
    ) -> Result<SignedGatewayToken, String> {
        let bearer = self.broker_bearer().await.map_err(|err| err.to_string())?;
        let claims = GatewayClaims {
            iss: target_account,
            sub: target_account,
            aud: &self.gateway_audience,
            iat: issued_at,
            exp: expires_at,
        };
        let payload = serde_json::to_string(&claims)
            .map_err(|err| format!("claims encode failed: {err}"))?;
        let url = format!(
            "{}/v1/projects/-/serviceAccounts/{}:signJwt",
            self.credentials_url, target_account
        );

        let response: SignJwtResponse = self
            .post_json(url, &bearer, &SignJwtRequest { payload })
            .await
            .map_err(|err| err.to_string())?;

        Ok(SignedGatewayToken {
            endpoint: self.gateway_audience.clone(),
            token: response.signed_jwt,
        })
    }
}
