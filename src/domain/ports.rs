use crate::domain::model::{
    AssetEntitlements, BearerToken, Component, EnrichedTable, InputTable,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    /// Matched against headers ignoring case and whitespace; cell values are trimmed.
    fn identifier_column(&self) -> &str;
    fn auth_url(&self) -> &str;
    fn entitlements_url(&self) -> &str;
    fn components_url(&self) -> &str;
    fn client_id(&self) -> &str;
    fn client_secret(&self) -> &str;
    fn request_timeout(&self) -> Option<Duration>;
}

/// The three vendor endpoints the enrichment depends on.
#[async_trait]
pub trait VendorApi: Send + Sync {
    async fn authenticate(&self, client_id: &str, client_secret: &str) -> Result<BearerToken>;
    async fn fetch_entitlements(
        &self,
        service_tag: &str,
        token: &BearerToken,
    ) -> Result<Vec<AssetEntitlements>>;
    async fn fetch_components(&self, service_tag: &str, token: &BearerToken)
        -> Result<Vec<Component>>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<InputTable>;
    async fn transform(&self, data: InputTable) -> Result<EnrichedTable>;
    async fn load(&self, result: EnrichedTable) -> Result<String>;
}
