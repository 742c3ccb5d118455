pub use crate::error::HalaSkinningError;
pub use crate::config::{
  HalaAnimatorConfig,
  HalaPoseResetPolicy,
};
pub use crate::scene::{
  HalaNode,
  HalaSkin,
  HalaScene,
  loader::HalaGltfLoader,
};
pub use crate::animation::{
  HalaAnimationClip,
  HalaAnimationPath,
  HalaEvaluationReport,
  HalaInterpolation,
  HalaSampler,
};
pub use crate::animator::HalaAnimator;
