use crate::adapters::http::DellApiClient;
use crate::core::merge::{
    canonical_columns, find_value, merge, normalize_column_name, output_columns,
};
use crate::core::storage_parser::get_storage;
use crate::core::table::{decode_table, delimiter_for, encode_table};
use crate::core::warranty::get_warranty;
use crate::core::{ConfigProvider, EnrichedTable, InputTable, Pipeline, RunStats, Storage};
use crate::domain::model::{LookupPlan, Record, StorageSummary, WarrantyInfo};
use crate::domain::ports::VendorApi;
use crate::utils::error::{EtlError, Result};

/// Reads the service-tag table, enriches every row from the vendor API and
/// writes the augmented table back out.
pub struct EnrichmentPipeline<S: Storage, C: ConfigProvider, A: VendorApi> {
    storage: S,
    config: C,
    api: A,
}

impl<S: Storage, C: ConfigProvider, A: VendorApi> EnrichmentPipeline<S, C, A> {
    pub fn new(storage: S, config: C, api: A) -> Self {
        Self {
            storage,
            config,
            api,
        }
    }

    /// Reads the input and lists the service tags a run would look up.
    pub async fn plan(&self) -> Result<LookupPlan> {
        let input = self.extract().await?;
        let identifier = self.config.identifier_column();

        Ok(LookupPlan {
            rows_read: input.records.len(),
            service_tags: input
                .records
                .iter()
                .filter_map(|record| service_tag_of(record, identifier))
                .map(str::to_string)
                .collect(),
        })
    }
}

/// Trimmed identifier of a row; `None` when the cell is missing or blank.
fn service_tag_of<'a>(record: &'a Record, identifier: &str) -> Option<&'a str> {
    find_value(record, identifier)
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
}

impl<S: Storage, C: ConfigProvider> EnrichmentPipeline<S, C, DellApiClient> {
    pub fn with_dell_api(storage: S, config: C) -> Result<Self> {
        let api = DellApiClient::from_config(&config)?;
        Ok(Self::new(storage, config, api))
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, A: VendorApi> Pipeline for EnrichmentPipeline<S, C, A> {
    async fn extract(&self) -> Result<InputTable> {
        let input_path = self.config.input_path();
        tracing::debug!("Reading input table from: {}", input_path);

        let bytes = self.storage.read_file(input_path).await?;
        let table = decode_table(&bytes, delimiter_for(input_path))?;

        let identifier = self.config.identifier_column();
        let wanted = normalize_column_name(identifier);
        if !table
            .headers
            .iter()
            .any(|column| normalize_column_name(column) == wanted)
        {
            return Err(EtlError::MissingColumn {
                column: identifier.to_string(),
            });
        }

        tracing::info!(
            "📥 Loaded {} rows with {} columns from {}",
            table.records.len(),
            table.headers.len(),
            input_path
        );
        Ok(table)
    }

    async fn transform(&self, data: InputTable) -> Result<EnrichedTable> {
        let original_columns = canonical_columns(&data.headers);
        let columns = output_columns(&original_columns);
        let identifier = self.config.identifier_column();

        // 取不到 token 就沒有繼續的意義，直接中止
        let token = self
            .api
            .authenticate(self.config.client_id(), self.config.client_secret())
            .await?;
        tracing::info!("🔑 Authenticated against vendor API");

        let total = data.records.len();
        let mut stats = RunStats {
            rows_read: total,
            ..Default::default()
        };
        let mut records = Vec::with_capacity(total);

        for (index, record) in data.records.iter().enumerate() {
            let Some(service_tag) = service_tag_of(record, identifier) else {
                tracing::warn!("⚠️ Row {}: empty '{}', skipping", index + 1, identifier);
                stats.skipped += 1;
                continue;
            };

            tracing::debug!("🔎 [{}/{}] Looking up {}", index + 1, total, service_tag);

            let warranty = match get_warranty(&self.api, service_tag, &token).await {
                Ok(warranty) => warranty,
                Err(e) => {
                    tracing::warn!("⚠️ Warranty lookup failed for {}: {}", service_tag, e);
                    stats.lookup_failures += 1;
                    WarrantyInfo::default()
                }
            };

            let storage = match get_storage(&self.api, service_tag, &token).await {
                Ok(storage) => storage,
                Err(e) => {
                    tracing::warn!("⚠️ Storage lookup failed for {}: {}", service_tag, e);
                    stats.lookup_failures += 1;
                    StorageSummary::Unknown
                }
            };

            records.push(merge(record, &original_columns, &warranty, &storage));
            stats.enriched += 1;
        }

        tracing::info!(
            "🔄 Enriched {} of {} rows ({} skipped, {} failed lookups)",
            stats.enriched,
            stats.rows_read,
            stats.skipped,
            stats.lookup_failures
        );

        Ok(EnrichedTable {
            columns,
            records,
            stats,
        })
    }

    async fn load(&self, result: EnrichedTable) -> Result<String> {
        let output_path = self.config.output_path();
        let bytes = encode_table(&result.columns, &result.records, delimiter_for(output_path))?;

        tracing::debug!("Writing {} bytes to {}", bytes.len(), output_path);
        self.storage.write_file(output_path, &bytes).await?;

        tracing::info!("💾 Wrote {} rows to {}", result.records.len(), output_path);
        Ok(output_path.to_string())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::core::{ConfigProvider, Storage};
    use crate::domain::model::{AssetEntitlements, BearerToken, Component, Entitlement};
    use crate::domain::ports::VendorApi;
    use crate::utils::error::{EtlError, Result};
    use std::collections::{HashMap, HashSet};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    pub struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        pub fn with_file(path: &str, content: &str) -> Self {
            let mut files = HashMap::new();
            files.insert(path.to_string(), content.as_bytes().to_vec());
            Self {
                files: Arc::new(Mutex::new(files)),
            }
        }

        pub async fn get_file(&self, path: &str) -> Option<String> {
            let files = self.files.lock().await;
            files
                .get(path)
                .map(|data| String::from_utf8_lossy(data).into_owned())
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                EtlError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    pub struct MockConfig {
        pub input_path: String,
        pub output_path: String,
        pub identifier_column: String,
    }

    impl MockConfig {
        pub fn new(input_path: &str, output_path: &str) -> Self {
            Self {
                input_path: input_path.to_string(),
                output_path: output_path.to_string(),
                identifier_column: "Serial Number".to_string(),
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn input_path(&self) -> &str {
            &self.input_path
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn identifier_column(&self) -> &str {
            &self.identifier_column
        }

        fn auth_url(&self) -> &str {
            "http://localhost/token"
        }

        fn entitlements_url(&self) -> &str {
            "http://localhost/entitlements"
        }

        fn components_url(&self) -> &str {
            "http://localhost/components"
        }

        fn client_id(&self) -> &str {
            "test-client"
        }

        fn client_secret(&self) -> &str {
            "test-secret"
        }

        fn request_timeout(&self) -> Option<Duration> {
            None
        }
    }

    /// In-memory vendor that records every call in order.
    #[derive(Default)]
    pub struct MockVendorApi {
        pub reject_auth: bool,
        pub entitlements: HashMap<String, Vec<AssetEntitlements>>,
        pub components: HashMap<String, Vec<Component>>,
        pub failing_tags: HashSet<String>,
        pub calls: std::sync::Mutex<Vec<String>>,
    }

    impl MockVendorApi {
        pub fn with_device(
            mut self,
            tag: &str,
            ship_date: &str,
            end_dates: &[&str],
            components: &[(&str, &str)],
        ) -> Self {
            let asset = AssetEntitlements {
                invalid: false,
                ship_date: Some(ship_date.to_string()),
                entitlements: end_dates
                    .iter()
                    .map(|end| Entitlement {
                        end_date: Some(end.to_string()),
                    })
                    .collect(),
            };
            self.entitlements.insert(tag.to_string(), vec![asset]);
            self.components.insert(
                tag.to_string(),
                components
                    .iter()
                    .map(|(item, part)| Component::new(item, part))
                    .collect(),
            );
            self
        }

        pub fn with_failing_tag(mut self, tag: &str) -> Self {
            self.failing_tags.insert(tag.to_string());
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().map(|c| c.clone()).unwrap_or_default()
        }

        fn record(&self, call: String) {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(call);
            }
        }

        fn check(&self, tag: &str, token: &BearerToken, endpoint: &str) -> Result<()> {
            assert_eq!(token.as_str(), "mock-token");
            if self.failing_tags.contains(tag) {
                return Err(EtlError::UnexpectedStatus {
                    endpoint: endpoint.to_string(),
                    status: 500,
                });
            }
            Ok(())
        }
    }

    #[async_trait::async_trait]
    impl VendorApi for MockVendorApi {
        async fn authenticate(&self, client_id: &str, client_secret: &str) -> Result<BearerToken> {
            self.record(format!("auth:{}", client_id));
            if self.reject_auth || client_secret.is_empty() {
                return Err(EtlError::AuthError {
                    message: "identity endpoint responded with status 401".to_string(),
                });
            }
            Ok(BearerToken::new("mock-token"))
        }

        async fn fetch_entitlements(
            &self,
            service_tag: &str,
            token: &BearerToken,
        ) -> Result<Vec<AssetEntitlements>> {
            self.record(format!("warranty:{}", service_tag));
            self.check(service_tag, token, "asset-entitlements")?;
            Ok(self.entitlements.get(service_tag).cloned().unwrap_or_default())
        }

        async fn fetch_components(
            &self,
            service_tag: &str,
            token: &BearerToken,
        ) -> Result<Vec<Component>> {
            self.record(format!("storage:{}", service_tag));
            self.check(service_tag, token, "asset-components")?;
            Ok(self.components.get(service_tag).cloned().unwrap_or_default())
        }
    }
}
