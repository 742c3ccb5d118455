use std::path::Path;

use glam::Mat4;

use crate::error::HalaSkinningError;
use crate::config::{
  HalaAnimatorConfig,
  HalaPoseResetPolicy,
};
use crate::animation::HalaEvaluationReport;
use crate::scene::{
  HalaScene,
  collect_joint_matrices,
};

/// The animator drives a scene's animations and owns the joint matrices
/// uploaded to the GPU each frame.
/// Call `set_state_at_time` first, then `update_joint_matrices`, once per frame.
pub struct HalaAnimator {
  scene: HalaScene,
  config: HalaAnimatorConfig,
  joint_matrices: Vec<Mat4>,
  active_animation: Option<usize>,
}

/// The Drop implementation of the animator.
impl Drop for HalaAnimator {
  fn drop(&mut self) {
    log::debug!("A HalaAnimator dropped.");
  }
}

/// The implementation of the animator.
impl HalaAnimator {
  /// Create a new animator.
  /// param scene: The scene to animate.
  /// param config: The animator configuration.
  /// return: The animator.
  pub fn new(scene: HalaScene, config: HalaAnimatorConfig) -> Self {
    let mut joint_matrices = Vec::with_capacity(scene.num_of_joints());
    collect_joint_matrices(&scene, &mut joint_matrices);

    log::debug!("A HalaAnimator created with {} animations and {} joints.", scene.animations.len(), joint_matrices.len());
    Self {
      scene,
      config,
      joint_matrices,
      active_animation: None,
    }
  }

  /// Create a new animator from glTF file.
  /// param path: The path to the glTF file.
  /// param config: The animator configuration.
  /// return: The animator.
  pub fn from_file<P: AsRef<Path>>(path: P, config: HalaAnimatorConfig) -> Result<Self, HalaSkinningError> {
    let scene = HalaScene::new(path)?;
    Ok(Self::new(scene, config))
  }

  /// Get the animated scene.
  /// return: The scene.
  pub fn scene(&self) -> &HalaScene {
    &self.scene
  }

  /// Get the animator configuration.
  /// return: The configuration.
  pub fn config(&self) -> &HalaAnimatorConfig {
    &self.config
  }

  /// Get the number of animations.
  /// return: The number of animations.
  pub fn animation_count(&self) -> usize {
    self.scene.animations.len()
  }

  /// Get the animation names in index order.
  /// return: The names.
  pub fn animation_names(&self) -> impl Iterator<Item = &str> {
    self.scene.animations.iter().map(|animation| animation.name.as_str())
  }

  /// The index of the animation evaluated last.
  pub fn active_animation(&self) -> Option<usize> {
    self.active_animation
  }

  /// Pose the scene with an animation at the time.
  /// The time is used as is. Use `wrap_time` to loop.
  /// param index: The animation index.
  /// param time: The time in seconds.
  /// return: The evaluation report.
  pub fn set_state_at_time(&mut self, index: usize, time: f32) -> Result<HalaEvaluationReport, HalaSkinningError> {
    if index >= self.scene.animations.len() {
      return Err(HalaSkinningError::new(
        &format!("Animation index {} out of range ({} animations).", index, self.scene.animations.len()),
        None,
      ));
    }

    match self.config.reset_policy {
      HalaPoseResetPolicy::RestPose => self.scene.reset_pose(),
      HalaPoseResetPolicy::TouchedNodes => {
        if self.active_animation.is_some_and(|active| active != index) {
          log::debug!(
            "Switching to animation \"{}\" without a pose reset, nodes it does not animate keep their previous pose.",
            self.scene.animations[index].name,
          );
        }
      },
    }

    let report = self.scene.evaluate_animation(index, time, self.config.report_unsupported_channels)?;
    self.active_animation = Some(index);
    Ok(report)
  }

  /// Pose the scene with an animation found by name.
  /// param name: The animation name.
  /// param time: The time in seconds.
  /// return: The evaluation report.
  pub fn set_state_at_time_by_name(&mut self, name: &str, time: f32) -> Result<HalaEvaluationReport, HalaSkinningError> {
    let index = self.scene.find_animation(name)
      .ok_or(HalaSkinningError::new(&format!("Animation \"{}\" not found.", name), None))?;
    self.set_state_at_time(index, time)
  }

  /// Restore the rest pose of every node.
  pub fn reset_pose(&mut self) {
    self.scene.reset_pose();
    self.active_animation = None;
  }

  /// Recompute all joint matrices from the current pose.
  /// return: The joint matrices, one block per skinned node in joint offset order.
  pub fn update_joint_matrices(&mut self) -> &[Mat4] {
    collect_joint_matrices(&self.scene, &mut self.joint_matrices);
    &self.joint_matrices
  }

  /// The joint matrices computed by the last `update_joint_matrices` call.
  pub fn joint_matrices(&self) -> &[Mat4] {
    &self.joint_matrices
  }

  /// The first joint matrix index of a skinned node.
  /// Vertex joint indices of the node's mesh are offset by it.
  /// param node: The node index.
  /// return: The joint offset, or None for nodes without joints.
  pub fn joint_offset(&self, node: u32) -> Option<usize> {
    self.scene.nodes.get(node as usize)
      .filter(|node| node.joint_count > 0)
      .map(|node| node.joint_offset)
  }

  /// Wrap a running time into an animation's keyframe range.
  /// param index: The animation index.
  /// param time: The running time in seconds.
  /// return: The wrapped time. Unknown animations leave it unchanged, zero-length ones pin it to their start.
  pub fn wrap_time(&self, index: usize, time: f32) -> f32 {
    let Some(animation) = self.scene.animations.get(index) else {
      return time;
    };
    let duration = animation.duration();
    if duration <= 0.0 {
      return animation.start_time();
    }
    animation.start_time() + (time - animation.start_time()).rem_euclid(duration)
  }
}
