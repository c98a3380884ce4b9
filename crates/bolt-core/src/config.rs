use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct EngineConfig {
    pub shell: Option<String>,
    pub workdir: Option<String>,
    pub chunk: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            shell: None,
            workdir: None,
            chunk: None,
        }
    }
}
