use async_trait::async_trait;

use apdex::model::AppGuid;

use crate::types::ThresholdUpdate;

/// Abstraction over the remote configuration service.
///
/// Both operations are single-shot request/response: no implicit retry,
/// no streaming. Implementations must normalize transport errors into
/// the returned error; a completed call reports the value the service
/// actually stored plus any field-level rejections.
#[async_trait]
pub trait ConfigClient: Send + Sync + 'static {
    async fn set_apm_threshold(
        &self,
        guid: &AppGuid,
        value: f64,
    ) -> anyhow::Result<ThresholdUpdate>;

    async fn set_browser_threshold(
        &self,
        guid: &AppGuid,
        value: f64,
    ) -> anyhow::Result<ThresholdUpdate>;
}
