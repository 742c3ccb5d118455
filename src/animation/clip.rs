use glam::Mat4;

use crate::scene::cpu::node::HalaNode;
use super::sampler::{
  HalaAnimationPath,
  HalaSampler,
};

/// What happened during one clip evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HalaEvaluationReport {
  /// The number of channels written into node local matrices.
  pub applied_channels: usize,
  /// Indices of samplers that were skipped because their property is not supported.
  pub unsupported_samplers: Vec<usize>,
  /// Indices of samplers that were skipped because they target no valid node.
  pub untargeted_samplers: Vec<usize>,
}

/// A named set of samplers defining one animation.
#[derive(Debug, Clone)]
pub struct HalaAnimationClip {
  pub name: String,
  pub samplers: Vec<HalaSampler>,
}

/// The implementation of the animation clip.
impl HalaAnimationClip {
  /// Create a new animation clip.
  /// param name: The clip name.
  /// param samplers: The samplers, applied in this order.
  /// return: The clip.
  pub fn new(name: &str, samplers: Vec<HalaSampler>) -> Self {
    Self {
      name: name.to_owned(),
      samplers,
    }
  }

  /// The earliest keyframe time of all samplers.
  pub fn start_time(&self) -> f32 {
    self.samplers.iter()
      .map(|sampler| sampler.start_time())
      .reduce(f32::min)
      .unwrap_or(0.0)
  }

  /// The latest keyframe time of all samplers.
  pub fn end_time(&self) -> f32 {
    self.samplers.iter()
      .map(|sampler| sampler.end_time())
      .reduce(f32::max)
      .unwrap_or(0.0)
  }

  /// The time between the earliest and the latest keyframe.
  /// return: The duration in seconds.
  pub fn duration(&self) -> f32 {
    self.end_time() - self.start_time()
  }

  /// Write the pose of this clip at the time into the node local matrices.
  /// param nodes: The scene nodes.
  /// param time: The time in seconds. It is not wrapped.
  /// return: The evaluation report.
  pub fn evaluate(&self, nodes: &mut [HalaNode], time: f32) -> HalaEvaluationReport {
    self.evaluate_with(nodes, time, true)
  }

  /// Write the pose of this clip at the time into the node local matrices.
  /// Every targeted node starts from identity. Translation replaces the matrix,
  /// rotation and scale are right-multiplied, in sampler order.
  /// param nodes: The scene nodes.
  /// param time: The time in seconds. It is not wrapped.
  /// param report_unsupported: Log a notice for skipped morph weight channels.
  /// return: The evaluation report.
  pub(crate) fn evaluate_with(&self, nodes: &mut [HalaNode], time: f32, report_unsupported: bool) -> HalaEvaluationReport {
    let mut report = HalaEvaluationReport::default();

    for sampler in self.samplers.iter() {
      if sampler.path == HalaAnimationPath::Weights {
        continue;
      }
      if let Some(node) = sampler.node.and_then(|index| nodes.get_mut(index as usize)) {
        node.local_transform = Mat4::IDENTITY;
      }
    }

    for (index, sampler) in self.samplers.iter().enumerate() {
      let Some(node) = sampler.node.and_then(|index| nodes.get_mut(index as usize)) else {
        report.untargeted_samplers.push(index);
        continue;
      };

      match sampler.path {
        HalaAnimationPath::Translation => {
          node.local_transform = Mat4::from_translation(sampler.sample_vec3(time));
        },
        HalaAnimationPath::Rotation => {
          node.local_transform *= Mat4::from_quat(sampler.sample_rotation(time));
        },
        HalaAnimationPath::Scale => {
          node.local_transform *= Mat4::from_scale(sampler.sample_vec3(time));
        },
        HalaAnimationPath::Weights => {
          if report_unsupported {
            log::warn!(
              "Animation \"{}\": morph target weight channel {} on node \"{}\" is not supported, skipped.",
              self.name, index, node.name,
            );
          }
          report.unsupported_samplers.push(index);
          continue;
        },
      }
      report.applied_channels += 1;
    }

    report
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use glam::{
    Quat,
    Vec3,
    Vec4,
  };

  fn nodes(count: usize) -> Vec<HalaNode> {
    (0..count).map(|i| HalaNode::with_matrix(&format!("node{}", i), Mat4::IDENTITY)).collect()
  }

  #[test]
  fn composes_translation_rotation_scale_in_sampler_order() {
    let rotation = Quat::from_rotation_y(0.5);
    let clip = HalaAnimationClip::new("trs", vec![
      HalaSampler::new(HalaAnimationPath::Translation, vec![0.0], vec![Vec4::new(1.0, 2.0, 3.0, 1.0)], Some(0)),
      HalaSampler::new(HalaAnimationPath::Rotation, vec![0.0], vec![Vec4::from(rotation)], Some(0)),
      HalaSampler::new(HalaAnimationPath::Scale, vec![0.0], vec![Vec4::new(2.0, 2.0, 2.0, 1.0)], Some(0)),
    ]);
    let mut nodes = nodes(1);
    let report = clip.evaluate(&mut nodes, 0.0);

    let expected = Mat4::from_scale_rotation_translation(Vec3::splat(2.0), rotation, Vec3::new(1.0, 2.0, 3.0));
    assert!(nodes[0].local_transform.abs_diff_eq(expected, 1e-5));
    assert_eq!(report.applied_channels, 3);
  }

  #[test]
  fn targeted_nodes_are_reset_before_channels_apply() {
    let clip = HalaAnimationClip::new("spin", vec![
      HalaSampler::new(HalaAnimationPath::Rotation, vec![0.0], vec![Vec4::from(Quat::from_rotation_x(1.0))], Some(0)),
    ]);
    let mut nodes = nodes(2);
    nodes[0].local_transform = Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0));
    nodes[1].local_transform = Mat4::from_translation(Vec3::new(0.0, 7.0, 0.0));

    clip.evaluate(&mut nodes, 0.0);
    clip.evaluate(&mut nodes, 0.0);

    assert!(nodes[0].local_transform.abs_diff_eq(Mat4::from_quat(Quat::from_rotation_x(1.0)), 1e-6));
    assert_eq!(nodes[1].local_transform, Mat4::from_translation(Vec3::new(0.0, 7.0, 0.0)));
  }

  #[test]
  fn translation_replaces_a_preceding_rotation() {
    let clip = HalaAnimationClip::new("out_of_order", vec![
      HalaSampler::new(HalaAnimationPath::Rotation, vec![0.0], vec![Vec4::from(Quat::from_rotation_z(1.0))], Some(0)),
      HalaSampler::new(HalaAnimationPath::Translation, vec![0.0], vec![Vec4::new(0.0, 0.0, 4.0, 1.0)], Some(0)),
    ]);
    let mut nodes = nodes(1);
    clip.evaluate(&mut nodes, 0.0);
    assert_eq!(nodes[0].local_transform, Mat4::from_translation(Vec3::new(0.0, 0.0, 4.0)));
  }

  #[test]
  fn weight_channel_is_a_reported_no_op() {
    let posed = Mat4::from_translation(Vec3::new(1.0, 1.0, 1.0));
    let clip = HalaAnimationClip::new("blink", vec![
      HalaSampler::new(HalaAnimationPath::Weights, vec![0.0, 1.0], vec![Vec4::ZERO, Vec4::X], Some(0)),
    ]);
    let mut nodes = nodes(1);
    nodes[0].local_transform = posed;

    let report = clip.evaluate(&mut nodes, 0.5);

    assert_eq!(nodes[0].local_transform, posed);
    assert_eq!(report.unsupported_samplers, vec![0]);
    assert_eq!(report.applied_channels, 0);
  }

  #[test]
  fn untargeted_sampler_is_skipped() {
    let clip = HalaAnimationClip::new("orphan", vec![
      HalaSampler::new(HalaAnimationPath::Translation, vec![0.0], vec![Vec4::ONE], None),
      HalaSampler::new(HalaAnimationPath::Translation, vec![0.0], vec![Vec4::ONE], Some(42)),
    ]);
    let mut nodes = nodes(1);
    let report = clip.evaluate(&mut nodes, 0.0);
    assert_eq!(report.untargeted_samplers, vec![0, 1]);
    assert_eq!(nodes[0].local_transform, Mat4::IDENTITY);
  }

  #[test]
  fn duration_spans_all_samplers() {
    let clip = HalaAnimationClip::new("walk", vec![
      HalaSampler::new(HalaAnimationPath::Translation, vec![0.5, 1.0], vec![Vec4::ZERO, Vec4::ONE], Some(0)),
      HalaSampler::new(HalaAnimationPath::Scale, vec![0.0, 2.5], vec![Vec4::ONE, Vec4::ONE], Some(0)),
    ]);
    assert_eq!(clip.start_time(), 0.0);
    assert_eq!(clip.end_time(), 2.5);
    assert_eq!(clip.duration(), 2.5);
  }
}
