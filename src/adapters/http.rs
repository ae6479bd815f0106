use crate::domain::model::{AssetEntitlements, BearerToken, Component, ComponentsResponse};
use crate::domain::ports::{ConfigProvider, VendorApi};
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_AUTH_URL: &str = "https://apigtwb2c.us.dell.com/auth/oauth/v2/token";
pub const DEFAULT_ENTITLEMENTS_URL: &str =
    "https://apigtwb2c.us.dell.com/PROD/sbil/eapi/v5/asset-entitlements";
pub const DEFAULT_COMPONENTS_URL: &str =
    "https://apigtwb2c.us.dell.com/PROD/sbil/eapi/v5/asset-components";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// reqwest client for the vendor's OAuth, entitlement and component endpoints.
#[derive(Debug, Clone)]
pub struct DellApiClient {
    client: Client,
    auth_url: String,
    entitlements_url: String,
    components_url: String,
}

impl DellApiClient {
    pub fn new(
        auth_url: &str,
        entitlements_url: &str,
        components_url: &str,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            auth_url: auth_url.to_string(),
            entitlements_url: entitlements_url.to_string(),
            components_url: components_url.to_string(),
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(
            config.auth_url(),
            config.entitlements_url(),
            config.components_url(),
            config.request_timeout(),
        )
    }

    /// 狀態碼檢查後解析 JSON；空白回應視為預設值
    async fn decode<T: DeserializeOwned + Default>(endpoint: &str, response: Response) -> Result<T> {
        let status = response.status();
        tracing::debug!("📡 {} response status: {}", endpoint, status);

        if !status.is_success() {
            return Err(EtlError::UnexpectedStatus {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(T::default());
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl VendorApi for DellApiClient {
    async fn authenticate(&self, client_id: &str, client_secret: &str) -> Result<BearerToken> {
        tracing::debug!("🔑 Requesting access token from: {}", self.auth_url);

        let response = self
            .client
            .post(&self.auth_url)
            .form(&[
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await
            .map_err(|e| EtlError::AuthError {
                message: format!("identity endpoint unreachable: {}", e),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(EtlError::AuthError {
                message: format!("identity endpoint responded with status {}", status),
            });
        }

        let payload: TokenResponse = response.json().await.map_err(|e| EtlError::AuthError {
            message: format!("unreadable token response: {}", e),
        })?;

        match payload.access_token {
            Some(token) if !token.trim().is_empty() => {
                if let Some(expires_in) = payload.expires_in {
                    tracing::debug!("🔑 Token issued, expires in {}s", expires_in);
                }
                Ok(BearerToken::new(token))
            }
            _ => Err(EtlError::AuthError {
                message: "token response contained no access_token".to_string(),
            }),
        }
    }

    async fn fetch_entitlements(
        &self,
        service_tag: &str,
        token: &BearerToken,
    ) -> Result<Vec<AssetEntitlements>> {
        let response = self
            .client
            .get(&self.entitlements_url)
            .query(&[("servicetags", service_tag)])
            .bearer_auth(token.as_str())
            .send()
            .await?;

        Self::decode("asset-entitlements", response).await
    }

    async fn fetch_components(
        &self,
        service_tag: &str,
        token: &BearerToken,
    ) -> Result<Vec<Component>> {
        let response = self
            .client
            .get(&self.components_url)
            .query(&[("servicetag", service_tag)])
            .bearer_auth(token.as_str())
            .send()
            .await?;

        let payload: ComponentsResponse = Self::decode("asset-components", response).await?;
        Ok(payload.components)
    }
}
