use glam::Mat4;

/// A skin is an ordered set of joint nodes and their inverse bind matrices.
/// The joint order decides where each joint matrix lands in the skin's block.
#[derive(Debug, Clone)]
pub struct HalaSkin {
  pub name: String,
  pub joints: Vec<u32>,
  pub inverse_bind_matrices: Vec<Mat4>,
}

/// The implementation of the skin.
impl HalaSkin {
  /// Create a new skin.
  /// An empty inverse bind matrix list is replaced by identity matrices.
  /// param name: The skin name.
  /// param joints: The joint node indices.
  /// param inverse_bind_matrices: The inverse bind matrices, parallel to the joints.
  /// return: The skin.
  pub fn new(name: &str, joints: Vec<u32>, inverse_bind_matrices: Vec<Mat4>) -> Self {
    let inverse_bind_matrices = if inverse_bind_matrices.is_empty() {
      vec![Mat4::IDENTITY; joints.len()]
    } else {
      inverse_bind_matrices
    };
    Self {
      name: name.to_owned(),
      joints,
      inverse_bind_matrices,
    }
  }

  /// Get the number of joints.
  /// return: The number of joints.
  pub fn num_of_joints(&self) -> usize {
    self.joints.len()
  }
}
