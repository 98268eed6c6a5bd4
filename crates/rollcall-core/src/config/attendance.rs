//! Attendance endpoint configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttendanceConfig {
    /// Shared secret the recognition pipeline presents in `X-Service-Key`
    /// when calling the automatic check-in endpoint. Unset disables it.
    #[serde(default)]
    pub service_api_key: Option<String>,
}
