use glam::{
  Mat4,
  Quat,
  Vec3,
};

/// A node is a transform in the scene hierarchy with optional mesh and skin bindings.
#[derive(Debug, Clone)]
pub struct HalaNode {
  pub name: String,
  pub parent: Option<u32>,
  pub children: Vec<u32>,
  /// The transform relative to the parent, rewritten by animation every frame.
  pub local_transform: Mat4,
  /// The rest pose transform. Never changed after load.
  pub base_transform: Mat4,

  pub mesh_index: Option<u32>,
  pub skin_index: Option<u32>,

  /// The number of joint matrices this node reserves in the flat joint array.
  pub joint_count: usize,
  /// The first index of this node's block in the flat joint array.
  pub joint_offset: usize,
}

/// The default implementation of the node.
impl Default for HalaNode {
  fn default() -> Self {
    Self {
      name: String::new(),
      parent: None,
      children: Vec::new(),
      local_transform: Mat4::IDENTITY,
      base_transform: Mat4::IDENTITY,
      mesh_index: None,
      skin_index: None,
      joint_count: 0,
      joint_offset: 0,
    }
  }
}

/// The implementation of the node.
impl HalaNode {
  /// Create a new node with the rest pose given as translation, rotation and scale.
  /// param name: The node name.
  /// param translation: The rest translation.
  /// param rotation: The rest rotation.
  /// param scale: The rest scale.
  /// return: The node.
  pub fn with_trs(name: &str, translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
    Self::with_matrix(name, Mat4::from_scale_rotation_translation(scale, rotation, translation))
  }

  /// Create a new node with the rest pose given as a matrix.
  /// param name: The node name.
  /// param base_transform: The rest pose matrix.
  /// return: The node.
  pub fn with_matrix(name: &str, base_transform: Mat4) -> Self {
    Self {
      name: name.to_owned(),
      local_transform: base_transform,
      base_transform,
      ..Default::default()
    }
  }
}
