use serde::{Deserialize, Serialize};

/// Envelope status value that signals a successful business outcome
pub const STATUS_OK: &str = "ok";

/// `{status, data}` wrapper used by every backend response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Only present on ride-detail responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_driver: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            status: STATUS_OK.to_string(),
            data: Some(data),
            is_driver: None,
            detail: None,
        }
    }

    pub fn rejected(detail: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            data: None,
            is_driver: None,
            detail: Some(detail.into()),
        }
    }

    pub fn with_is_driver(mut self, is_driver: bool) -> Self {
        self.is_driver = Some(is_driver);
        self
    }

    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// Body of a non-2xx response. Only `detail` is meaningful to the client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
}
