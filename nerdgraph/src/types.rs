use serde::{Deserialize, Deserializer};

/// Field-level rejection reported by the settings mutation.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceError {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "errorClass", default)]
    pub error_class: Option<String>,
    #[serde(default)]
    pub field: Option<String>,
}

impl ServiceError {
    /// Human-readable form used when a rejection is folded into an
    /// outcome reason.
    pub fn describe(&self) -> String {
        match (&self.description, &self.field) {
            (Some(d), Some(f)) => format!("{d} ({f})"),
            (Some(d), None) => d.clone(),
            (None, Some(f)) => format!("rejected field {f}"),
            (None, None) => "unspecified service error".to_string(),
        }
    }
}

/// Normalized result of one threshold update call.
///
/// `stored_value` is the value the service echoed back, already coerced
/// to a number; `None` means the service did not confirm a value.
#[derive(Debug, Clone)]
pub struct ThresholdUpdate {
    pub guid: String,
    pub stored_value: Option<f64>,
    pub errors: Vec<ServiceError>,
}

/// The service historically returns `apdexTarget` as either a JSON
/// number or a decimal string. Coerce both so representation alone never
/// produces a false mismatch.
pub(crate) fn de_lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;

    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}
