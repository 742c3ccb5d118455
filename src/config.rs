use std::path::Path;

use serde::{
  Deserialize, Serialize
};

use crate::error::HalaSkinningError;

/// How the animator prepares node local matrices before a clip is evaluated.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HalaPoseResetPolicy {
  /// Only the nodes targeted by the evaluated clip are reset (to identity).
  /// Nodes untouched by the clip keep whatever pose they were left in, so
  /// switching clips without calling `reset_pose` can leave stale poses behind.
  #[default]
  TouchedNodes,
  /// Every node is restored to its rest pose before the clip is evaluated.
  RestPose,
}

fn default_as_true() -> bool {
  true
}

/// The animator configuration.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HalaAnimatorConfig {
  #[serde(default)]
  pub reset_policy: HalaPoseResetPolicy,
  /// Log a notice each time a morph target weight channel is skipped.
  #[serde(default = "default_as_true")]
  pub report_unsupported_channels: bool,
}

/// The default implementation of the animator configuration.
impl Default for HalaAnimatorConfig {
  fn default() -> Self {
    Self {
      reset_policy: HalaPoseResetPolicy::default(),
      report_unsupported_channels: true,
    }
  }
}

/// The implementation of the animator configuration.
impl HalaAnimatorConfig {
  /// Parse the configuration from a JSON string.
  /// param json: The JSON text.
  /// return: The configuration.
  pub fn from_json_str(json: &str) -> Result<Self, HalaSkinningError> {
    let config = serde_json::from_str::<Self>(json)?;
    Ok(config)
  }

  /// Load the configuration from a JSON file.
  /// param path: The path to the JSON file.
  /// return: The configuration.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, HalaSkinningError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let config = Self::from_json_str(&text)?;
    log::debug!("Animator config loaded from \"{:?}\": {:?}.", path, config);
    Ok(config)
  }
}
