pub mod sampler;
pub mod clip;

pub use sampler::{
  HalaAnimationPath,
  HalaInterpolation,
  HalaSampler,
};
pub use clip::{
  HalaAnimationClip,
  HalaEvaluationReport,
};
