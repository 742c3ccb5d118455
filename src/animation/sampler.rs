use glam::{
  Quat,
  Vec3,
  Vec4,
  Vec4Swizzles,
};

use crate::error::HalaSkinningError;

/// The node property an animation sampler drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HalaAnimationPath {
  Translation,
  Rotation,
  Scale,
  /// Morph target weights. Recognized but never applied.
  Weights,
}

/// How values between two keyframes are computed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HalaInterpolation {
  #[default]
  Linear,
  /// Hold the earlier keyframe until the next one is reached.
  Step,
}

/// The keyframe data of one animation channel.
/// Values are stored uniformly as 4-vectors. Translation and scale use xyz,
/// rotation quaternions are stored x, y, z, w with w as the real part.
#[derive(Debug, Clone)]
pub struct HalaSampler {
  pub path: HalaAnimationPath,
  pub interpolation: HalaInterpolation,
  pub times: Vec<f32>,
  pub values: Vec<Vec4>,
  /// The target node. A sampler without a target is a no-op.
  pub node: Option<u32>,
}

/// The implementation of the animation sampler.
impl HalaSampler {
  /// Create a new linearly interpolated sampler.
  /// param path: The target property.
  /// param times: The ascending keyframe times in seconds.
  /// param values: The keyframe values, parallel to the times.
  /// param node: The target node.
  /// return: The sampler.
  pub fn new(path: HalaAnimationPath, times: Vec<f32>, values: Vec<Vec4>, node: Option<u32>) -> Self {
    Self {
      path,
      interpolation: HalaInterpolation::Linear,
      times,
      values,
      node,
    }
  }

  /// Replace the interpolation mode.
  /// param interpolation: The interpolation mode.
  /// return: The sampler.
  pub fn with_interpolation(mut self, interpolation: HalaInterpolation) -> Self {
    self.interpolation = interpolation;
    self
  }

  /// Check the keyframe data.
  /// return: The result.
  pub fn validate(&self) -> Result<(), HalaSkinningError> {
    if self.times.is_empty() {
      return Err(HalaSkinningError::new("Sampler has no keyframes.", None));
    }
    if self.times.len() != self.values.len() {
      return Err(HalaSkinningError::new(
        &format!("Sampler has {} keyframe times but {} values.", self.times.len(), self.values.len()),
        None,
      ));
    }
    if self.times.windows(2).any(|pair| pair[1] < pair[0]) {
      return Err(HalaSkinningError::new("Sampler keyframe times are not ascending.", None));
    }
    Ok(())
  }

  /// Get the first keyframe time.
  /// return: The time in seconds, 0 without keyframes.
  pub fn start_time(&self) -> f32 {
    self.times.first().copied().unwrap_or(0.0)
  }

  /// Get the last keyframe time.
  /// return: The time in seconds, 0 without keyframes.
  pub fn end_time(&self) -> f32 {
    self.times.last().copied().unwrap_or(0.0)
  }

  /// Find the keyframe interval containing the time.
  /// Returns the first index `i` with `time < times[i + 1]`, or the last interval
  /// when the time is past every keyframe. Times before the first keyframe land
  /// in the first interval.
  /// param time: The time in seconds.
  /// return: The index of the interval's first keyframe.
  pub fn find_interval(&self, time: f32) -> usize {
    let len = self.times.len();
    if len < 2 {
      return 0;
    }
    for i in 0..len - 1 {
      if time < self.times[i + 1] {
        return i;
      }
    }
    len - 2
  }

  /// Compute the interpolation weight inside the interval starting at `start`.
  /// param start: The index of the interval's first keyframe.
  /// param time: The time in seconds.
  /// return: The weight in [0, 1].
  pub fn weight(&self, start: usize, time: f32) -> f32 {
    let last = self.times[start];
    let next = self.times[start + 1];
    if time <= last {
      return 0.0;
    }
    if time >= next {
      return 1.0;
    }
    let weight = (time - last) / (next - last);
    match self.interpolation {
      HalaInterpolation::Linear => weight,
      HalaInterpolation::Step => 0.0,
    }
  }

  /// Sample the raw value at the time.
  /// Rotation values are slerped and normalized, everything else is lerped.
  /// param time: The time in seconds.
  /// return: The sampled value.
  pub fn sample(&self, time: f32) -> Vec4 {
    if self.values.len() < 2 || self.times.len() < 2 {
      return self.values.first().copied().unwrap_or(Vec4::ZERO);
    }

    let start = self.find_interval(time);
    let weight = self.weight(start, time);
    let (from, to) = (self.values[start], self.values[start + 1]);
    match self.path {
      HalaAnimationPath::Rotation => {
        let rotation = Quat::from_vec4(from).slerp(Quat::from_vec4(to), weight).normalize();
        Vec4::from(rotation)
      },
      _ => {
        if weight <= 0.0 {
          from
        } else if weight >= 1.0 {
          to
        } else {
          from.lerp(to, weight)
        }
      },
    }
  }

  /// Sample a translation or scale at the time.
  /// param time: The time in seconds.
  /// return: The xyz part of the sampled value.
  pub fn sample_vec3(&self, time: f32) -> Vec3 {
    self.sample(time).xyz()
  }

  /// Sample the rotation at the time as a unit quaternion.
  /// param time: The time in seconds.
  /// return: The rotation.
  pub fn sample_rotation(&self, time: f32) -> Quat {
    Quat::from_vec4(self.sample(time)).normalize()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use approx::assert_relative_eq;

  fn translation_sampler() -> HalaSampler {
    HalaSampler::new(
      HalaAnimationPath::Translation,
      vec![0.0, 1.0, 2.0],
      vec![
        Vec4::new(0.0, 0.0, 0.0, 1.0),
        Vec4::new(2.0, 4.0, -6.0, 1.0),
        Vec4::new(0.1, 0.7, 0.3, 1.0),
      ],
      Some(0),
    )
  }

  #[test]
  fn interval_search_clamps_to_the_ends() {
    let sampler = translation_sampler();
    assert_eq!(sampler.find_interval(-5.0), 0);
    assert_eq!(sampler.find_interval(0.0), 0);
    assert_eq!(sampler.find_interval(0.99), 0);
    assert_eq!(sampler.find_interval(1.0), 1);
    assert_eq!(sampler.find_interval(2.0), 1);
    assert_eq!(sampler.find_interval(10.0), 1);
  }

  #[test]
  fn weight_is_exact_at_the_bounds() {
    let sampler = translation_sampler();
    assert_eq!(sampler.weight(0, -5.0), 0.0);
    assert_eq!(sampler.weight(0, 0.0), 0.0);
    assert_eq!(sampler.weight(0, 1.0), 1.0);
    assert_eq!(sampler.weight(1, 10.0), 1.0);
    assert_relative_eq!(sampler.weight(0, 0.25), 0.25);
  }

  #[test]
  fn sample_boundaries_and_midpoint() {
    let sampler = translation_sampler();
    assert_eq!(sampler.sample(-5.0), sampler.values[0]);
    assert_eq!(sampler.sample(10.0), sampler.values[2]);
    let mid = sampler.sample(0.5);
    assert!(mid.abs_diff_eq(Vec4::new(1.0, 2.0, -3.0, 1.0), 1e-6));
  }

  #[test]
  fn zero_length_interval_does_not_divide_by_zero() {
    let sampler = HalaSampler::new(
      HalaAnimationPath::Scale,
      vec![0.0, 1.0, 1.0, 2.0],
      vec![Vec4::ONE, Vec4::splat(2.0), Vec4::splat(3.0), Vec4::splat(4.0)],
      Some(0),
    );
    let value = sampler.sample(1.0);
    assert!(value.is_finite());
    assert_eq!(value, Vec4::splat(3.0));
  }

  #[test]
  fn single_keyframe_is_constant() {
    let value = Vec4::new(3.0, -1.0, 0.5, 1.0);
    let sampler = HalaSampler::new(HalaAnimationPath::Translation, vec![0.75], vec![value], Some(0));
    for time in [-1000.0, -1.0, 0.0, 0.75, 3.0, 1.0e9] {
      assert_eq!(sampler.sample(time), value);
    }
  }

  #[test]
  fn step_holds_the_previous_keyframe() {
    let sampler = translation_sampler().with_interpolation(HalaInterpolation::Step);
    assert_eq!(sampler.sample(0.9), sampler.values[0]);
    assert_eq!(sampler.sample(1.0), sampler.values[1]);
    assert_eq!(sampler.sample(1.5), sampler.values[1]);
  }

  #[test]
  fn slerped_rotation_has_unit_norm() {
    let from = Quat::from_rotation_y(0.3);
    let to = Quat::from_axis_angle(Vec3::new(1.0, 1.0, 0.0).normalize(), 2.5);
    let sampler = HalaSampler::new(
      HalaAnimationPath::Rotation,
      vec![0.0, 1.0],
      vec![Vec4::from(from), Vec4::from(to)],
      Some(0),
    );
    for step in 0..=20 {
      let time = step as f32 / 20.0;
      let rotation = sampler.sample(time);
      assert_relative_eq!(rotation.length(), 1.0, epsilon = 1e-5);
    }
    assert!(sampler.sample_rotation(0.0).abs_diff_eq(from, 1e-5));
    assert!(sampler.sample_rotation(1.0).abs_diff_eq(to, 1e-5));
  }

  #[test]
  fn rotation_uses_w_as_the_real_part() {
    let end = Quat::from_rotation_z(2.0);
    let sampler = HalaSampler::new(
      HalaAnimationPath::Rotation,
      vec![0.0, 2.0],
      vec![Vec4::new(0.0, 0.0, 0.0, 1.0), Vec4::from(end)],
      Some(0),
    );
    let expected = Quat::from_rotation_z(1.0);
    assert!(sampler.sample_rotation(1.0).abs_diff_eq(expected, 1e-5));
  }

  #[test]
  fn validate_rejects_malformed_keyframes() {
    let mut sampler = translation_sampler();
    assert!(sampler.validate().is_ok());

    sampler.values.pop();
    assert!(sampler.validate().is_err());

    let descending = HalaSampler::new(
      HalaAnimationPath::Scale,
      vec![1.0, 0.0],
      vec![Vec4::ONE, Vec4::ONE],
      Some(0),
    );
    assert!(descending.validate().is_err());

    let empty = HalaSampler::new(HalaAnimationPath::Scale, Vec::new(), Vec::new(), None);
    assert!(empty.validate().is_err());
  }
}
