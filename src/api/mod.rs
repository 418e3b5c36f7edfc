mod engine_config;
mod json_contract;
mod layout_engine;

pub use engine_config::LayoutEngineConfig;
pub use json_contract::{ENGINE_CONFIG_JSON_SCHEMA_V1, LayoutEngineConfigJsonContractV1};
pub use layout_engine::LayoutEngine;
