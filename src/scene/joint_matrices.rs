use glam::Mat4;

use super::cpu::scene::HalaScene;

/// Owner transforms with a smaller determinant magnitude are treated as singular.
const SINGULAR_DETERMINANT: f32 = 1.0e-12;

/// Recompute the flat joint matrix array of the scene.
/// The output is resized to the scene's joint count and fully rewritten. For a
/// skinned node, joint `i` of its skin lands at `joint_offset + i` and holds
/// `inverse(global(owner)) * global(joint) * inverse_bind`, so skinning happens
/// in the mesh node's own space.
/// param scene: The scene.
/// param joint_matrices: The output joint matrices.
pub fn collect_joint_matrices(scene: &HalaScene, joint_matrices: &mut Vec<Mat4>) {
  joint_matrices.clear();
  joint_matrices.resize(scene.num_of_joints(), Mat4::IDENTITY);

  for &node_index in scene.traversal_order() {
    let node = &scene.nodes[node_index as usize];
    if node.joint_count == 0 {
      continue;
    }
    let Some(skin) = node.skin_index.and_then(|skin_index| scene.skins.get(skin_index as usize)) else {
      continue;
    };

    let owner_transform = scene.global_transform(node_index);
    let inverse_transform = if owner_transform.determinant().abs() < SINGULAR_DETERMINANT {
      log::warn!("Skinned node \"{}\" has a singular transform, skinning it in world space.", node.name);
      Mat4::IDENTITY
    } else {
      owner_transform.inverse()
    };

    let joints = skin.joints.iter().zip(skin.inverse_bind_matrices.iter());
    for (i, (&joint, inverse_bind_matrix)) in joints.enumerate() {
      joint_matrices[node.joint_offset + i] = inverse_transform * scene.global_transform(joint) * *inverse_bind_matrix;
    }
  }
}
