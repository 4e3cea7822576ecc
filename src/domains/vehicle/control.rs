use serde::{Deserialize, Serialize};

use crate::common::DomainResult;

/// Sparse parameter update from the control plane.
///
/// A field that is absent, `null`, zero or negative leaves the current value unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlUpdate {
    #[serde(rename = "AverageSpeed", default, skip_serializing_if = "Option::is_none")]
    pub average_speed: Option<f64>,
    #[serde(rename = "Jitter", default, skip_serializing_if = "Option::is_none")]
    pub jitter: Option<f64>,
}

impl ControlUpdate {
    pub fn from_json(payload: &str) -> DomainResult<Self> {
        Ok(serde_json::from_str(payload)?)
    }

    pub fn with_average_speed(mut self, v: f64) -> Self {
        self.average_speed = Some(v);
        self
    }

    pub fn with_jitter(mut self, v: f64) -> Self {
        self.jitter = Some(v);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.average_speed.is_none() && self.jitter.is_none()
    }
}

/// Accepted values for live parameters: finite and strictly positive.
pub fn accepted_parameter(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}
