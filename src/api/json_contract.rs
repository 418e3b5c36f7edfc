use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

use super::LayoutEngineConfig;

pub const ENGINE_CONFIG_JSON_SCHEMA_V1: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutEngineConfigJsonContractV1 {
    pub schema_version: u32,
    pub config: LayoutEngineConfig,
}

impl LayoutEngineConfig {
    pub fn to_json_contract_v1_pretty(&self) -> ChartResult<String> {
        let payload = LayoutEngineConfigJsonContractV1 {
            schema_version: ENGINE_CONFIG_JSON_SCHEMA_V1,
            config: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            ChartError::InvalidConfig(format!("failed to serialize config contract v1: {e}"))
        })
    }

    /// Accepts either the versioned envelope or a bare config.
    pub fn from_json_compat_str(input: &str) -> ChartResult<Self> {
        let value: serde_json::Value = serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidConfig(format!("failed to parse config json: {e}")))?;
        if value.get("schema_version").is_none() {
            return serde_json::from_value(value).map_err(|e| {
                ChartError::InvalidConfig(format!("failed to parse config json payload: {e}"))
            });
        }
        let payload: LayoutEngineConfigJsonContractV1 =
            serde_json::from_value(value).map_err(|e| {
                ChartError::InvalidConfig(format!("failed to parse config json payload: {e}"))
            })?;
        if payload.schema_version != ENGINE_CONFIG_JSON_SCHEMA_V1 {
            return Err(ChartError::InvalidConfig(format!(
                "unsupported config schema version: {}",
                payload.schema_version
            )));
        }
        Ok(payload.config)
    }
}
