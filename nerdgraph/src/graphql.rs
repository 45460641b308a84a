//! Production `ConfigClient` backed by the NerdGraph settings mutation.
//!
//! One `agentApplicationSettingsUpdate` call per threshold: the mutation
//! writes the new Apdex T and selects the stored config back so the
//! caller can verify what actually landed.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use apdex::model::AppGuid;

use crate::client::ConfigClient;
use crate::errors::NerdGraphError;
use crate::types::{ServiceError, ThresholdUpdate, de_lenient_f64};

const DEFAULT_ENDPOINT: &str = "https://api.newrelic.com/graphql";

#[derive(Clone, Debug)]
pub struct NerdGraphConfig {
    /// GraphQL endpoint the mutations are POSTed to.
    pub endpoint: String,

    /// User API key sent as the `API-Key` header.
    pub api_key: String,

    /// Per-request timeout. The service is empirically slow; anything
    /// beyond this counts as a transport failure.
    pub request_timeout: Duration,
}

impl NerdGraphConfig {
    pub fn from_env() -> Self {
        let endpoint = std::env::var("NERDGRAPH_ENDPOINT")
            .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let api_key = std::env::var("NERDGRAPH_API_KEY").unwrap_or_default();

        Self {
            endpoint,
            api_key,
            request_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Clone)]
pub struct NerdGraphClient {
    http: reqwest::Client,
    cfg: NerdGraphConfig,
}

impl NerdGraphClient {
    pub fn new(cfg: NerdGraphConfig) -> Result<Self, NerdGraphError> {
        let http = reqwest::Client::builder()
            .timeout(cfg.request_timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self { http, cfg })
    }

    #[instrument(skip(self, mutation), level = "debug")]
    async fn mutate(&self, mutation: String) -> Result<SettingsUpdate, NerdGraphError> {
        let resp = self
            .http
            .post(&self.cfg.endpoint)
            .header("API-Key", &self.cfg.api_key)
            .json(&serde_json::json!({ "query": mutation }))
            .send()
            .await?
            .error_for_status()?;

        let body: GraphQlResponse = resp.json().await?;

        if let Some(err) = body.errors.first() {
            return Err(NerdGraphError::Graph(err.message.clone()));
        }

        body.data
            .and_then(|d| d.update)
            .ok_or(NerdGraphError::MissingData)
    }
}

#[async_trait]
impl ConfigClient for NerdGraphClient {
    async fn set_apm_threshold(
        &self,
        guid: &AppGuid,
        value: f64,
    ) -> anyhow::Result<ThresholdUpdate> {
        let update = self.mutate(apm_mutation(guid.as_str(), value)).await?;
        let stored = update
            .apm_settings
            .and_then(|s| s.config)
            .and_then(|c| c.apdex_target);

        debug!(guid = %guid, requested = value, stored = ?stored, "apm threshold mutation completed");

        Ok(ThresholdUpdate {
            guid: update.guid,
            stored_value: stored,
            errors: update.errors,
        })
    }

    async fn set_browser_threshold(
        &self,
        guid: &AppGuid,
        value: f64,
    ) -> anyhow::Result<ThresholdUpdate> {
        let update = self.mutate(browser_mutation(guid.as_str(), value)).await?;
        let stored = update
            .browser_settings
            .and_then(|s| s.config)
            .and_then(|c| c.apdex_target);

        debug!(guid = %guid, requested = value, stored = ?stored, "browser threshold mutation completed");

        Ok(ThresholdUpdate {
            guid: update.guid,
            stored_value: stored,
            errors: update.errors,
        })
    }
}

fn apm_mutation(guid: &str, value: f64) -> String {
    format!(
        r#"mutation {{
  agentApplicationSettingsUpdate(settings: {{apmConfig: {{apdexTarget: {value}}}}}, guid: "{guid}") {{
    guid
    errors {{
      description
      errorClass
      field
    }}
    apmSettings {{
      apmConfig {{
        apdexTarget
      }}
    }}
  }}
}}"#
    )
}

fn browser_mutation(guid: &str, value: f64) -> String {
    format!(
        r#"mutation {{
  agentApplicationSettingsUpdate(settings: {{browserConfig: {{apdexTarget: {value}}}}}, guid: "{guid}") {{
    guid
    errors {{
      description
      errorClass
      field
    }}
    browserSettings {{
      browserConfig {{
        apdexTarget
      }}
    }}
  }}
}}"#
    )
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<MutationData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct MutationData {
    #[serde(rename = "agentApplicationSettingsUpdate")]
    update: Option<SettingsUpdate>,
}

#[derive(Debug, Deserialize)]
struct SettingsUpdate {
    guid: String,
    #[serde(default)]
    errors: Vec<ServiceError>,
    #[serde(rename = "apmSettings")]
    apm_settings: Option<ApmSettings>,
    #[serde(rename = "browserSettings")]
    browser_settings: Option<BrowserSettings>,
}

#[derive(Debug, Deserialize)]
struct ApmSettings {
    #[serde(rename = "apmConfig")]
    config: Option<ApdexConfig>,
}

#[derive(Debug, Deserialize)]
struct BrowserSettings {
    #[serde(rename = "browserConfig")]
    config: Option<ApdexConfig>,
}

#[derive(Debug, Deserialize)]
struct ApdexConfig {
    #[serde(rename = "apdexTarget", default, deserialize_with = "de_lenient_f64")]
    apdex_target: Option<f64>,
}
