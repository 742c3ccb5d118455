use std::path::Path;

use glam::Mat4;

use crate::error::HalaSkinningError;
use crate::animation::{
  HalaAnimationClip,
  HalaEvaluationReport,
};
use super::node::HalaNode;
use super::skin::HalaSkin;
use super::super::joints;
use super::super::loader::HalaGltfLoader;

/// A scene is a node forest with the skins and animations that drive it.
pub struct HalaScene {
  pub nodes: Vec<HalaNode>,
  pub skins: Vec<HalaSkin>,
  pub animations: Vec<HalaAnimationClip>,
  pub root_nodes: Vec<u32>,

  traversal_order: Vec<u32>,
  num_of_joints: usize,
}

/// The Drop implementation of the scene.
impl Drop for HalaScene {
  fn drop(&mut self) {
    log::debug!("A HalaScene dropped.");
  }
}

/// The implementation of the scene.
impl HalaScene {
  /// Create a new scene from glTF file.
  /// param path: The path to the glTF file.
  /// return: The scene.
  pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, HalaSkinningError> {
    // Check the file extension.
    let path = path.as_ref();
    let extension = path.extension()
      .ok_or(HalaSkinningError::new(&format!("Get file \"{:?}\" extension failed.", path), None))?;
    let scene = match extension.to_str() {
      // glTF file.
      Some("gltf") | Some("glb") => HalaGltfLoader::load(path),
      // Unsupported file.
      _ => Err(HalaSkinningError::new(&format!("Unsupported file \"{:?}\".", path), None)),
    }?;

    log::debug!("A HalaScene created.");
    Ok(scene)
  }

  /// Create a new scene from already imported parts.
  /// Parents are filled in from the child lists, local transforms are reset to
  /// the rest pose and the joint blocks are assigned.
  /// param nodes: The nodes. Their parent links are ignored and rebuilt.
  /// param skins: The skins.
  /// param animations: The animation clips.
  /// param root_nodes: The scene root node indices.
  /// return: The scene.
  pub fn from_parts(
    nodes: Vec<HalaNode>,
    skins: Vec<HalaSkin>,
    animations: Vec<HalaAnimationClip>,
    root_nodes: Vec<u32>,
  ) -> Result<Self, HalaSkinningError> {
    let mut scene = Self {
      nodes,
      skins,
      animations,
      root_nodes,
      traversal_order: Vec::new(),
      num_of_joints: 0,
    };
    scene.update_node_hierarchies()?;
    scene.validate_roots()?;
    scene.validate_skins()?;
    scene.validate_animations()?;
    scene.reset_pose();

    joints::compute_joint_counts(&mut scene.nodes, &scene.skins);
    scene.traversal_order = joints::depth_first_order(&scene.nodes, &scene.root_nodes);
    scene.num_of_joints = joints::compute_joint_offsets(&mut scene.nodes, &scene.traversal_order);

    log::info!(
      "Scene built with {} nodes, {} skins, {} animations and {} joints.",
      scene.nodes.len(), scene.skins.len(), scene.animations.len(), scene.num_of_joints,
    );
    Ok(scene)
  }

  /// The total number of joint matrices of all skinned nodes.
  /// return: The joint count.
  pub fn num_of_joints(&self) -> usize {
    self.num_of_joints
  }

  /// The depth-first node order used for joint block assignment.
  /// return: The node indices in visiting order.
  pub fn traversal_order(&self) -> &[u32] {
    &self.traversal_order
  }

  /// Find an animation by name.
  /// param name: The animation name.
  /// return: The animation index.
  pub fn find_animation(&self, name: &str) -> Option<usize> {
    self.animations.iter().position(|animation| animation.name == name)
  }

  /// Get the local transform of a node.
  /// param index: The node index.
  /// return: The transform relative to the parent.
  pub fn local_transform(&self, index: u32) -> Mat4 {
    self.nodes[index as usize].local_transform
  }

  /// Replace the local transform of a node.
  /// param index: The node index.
  /// param transform: The transform relative to the parent.
  pub fn set_local_transform(&mut self, index: u32, transform: Mat4) {
    self.nodes[index as usize].local_transform = transform;
  }

  /// Compute the world transform of a node by composing the local transforms
  /// of its ancestors, root first. Nothing is cached.
  /// param index: The node index.
  /// return: The world transform.
  pub fn global_transform(&self, index: u32) -> Mat4 {
    let mut node = &self.nodes[index as usize];
    let mut transform = node.local_transform;
    while let Some(parent_idx) = node.parent {
      node = &self.nodes[parent_idx as usize];
      transform = node.local_transform * transform;
    }
    transform
  }

  /// Restore every node's local transform to its rest pose.
  pub fn reset_pose(&mut self) {
    for node in self.nodes.iter_mut() {
      node.local_transform = node.base_transform;
    }
  }

  /// Evaluate an animation at the time and write the pose into the nodes.
  /// param index: The animation index.
  /// param time: The time in seconds. It is not wrapped.
  /// param report_unsupported: Log a notice for skipped morph weight channels.
  /// return: The evaluation report.
  pub fn evaluate_animation(&mut self, index: usize, time: f32, report_unsupported: bool) -> Result<HalaEvaluationReport, HalaSkinningError> {
    let animation = self.animations.get(index)
      .ok_or(HalaSkinningError::new(&format!("Animation index {} out of range ({} animations).", index, self.animations.len()), None))?;
    Ok(animation.evaluate_with(&mut self.nodes, time, report_unsupported))
  }

  /// Update the node hierarchies.
  /// Set the parent of each node from the child lists and reject anything that is not a forest.
  fn update_node_hierarchies(&mut self) -> Result<(), HalaSkinningError> {
    let num_of_nodes = self.nodes.len();
    let mut temp_parents = vec![None; num_of_nodes];
    for (idx, node) in self.nodes.iter().enumerate() {
      for &child_idx in node.children.iter() {
        if child_idx as usize >= num_of_nodes {
          return Err(HalaSkinningError::new(&format!("Node \"{}\" has child {} out of range.", node.name, child_idx), None));
        }
        if child_idx as usize == idx {
          return Err(HalaSkinningError::new(&format!("Node \"{}\" is its own child.", node.name), None));
        }
        if temp_parents[child_idx as usize].is_some() {
          return Err(HalaSkinningError::new(&format!("Node {} has more than one parent.", child_idx), None));
        }
        temp_parents[child_idx as usize] = Some(idx as u32);
      }
    }
    for (node, parent) in self.nodes.iter_mut().zip(temp_parents) {
      node.parent = parent;
    }

    // With at most one parent per node, every node not reachable from a parentless node sits on a cycle.
    let parentless = (0..num_of_nodes as u32)
      .filter(|&idx| self.nodes[idx as usize].parent.is_none())
      .collect::<Vec<_>>();
    let reachable = joints::depth_first_order(&self.nodes, &parentless).len();
    if reachable != num_of_nodes {
      return Err(HalaSkinningError::new(&format!("Node hierarchy has a cycle ({} of {} nodes reachable).", reachable, num_of_nodes), None));
    }
    Ok(())
  }

  fn validate_roots(&self) -> Result<(), HalaSkinningError> {
    for (i, &root_idx) in self.root_nodes.iter().enumerate() {
      let root = self.nodes.get(root_idx as usize)
        .ok_or(HalaSkinningError::new(&format!("Root node {} out of range.", root_idx), None))?;
      if root.parent.is_some() {
        return Err(HalaSkinningError::new(&format!("Root node \"{}\" has a parent.", root.name), None));
      }
      if self.root_nodes[..i].contains(&root_idx) {
        return Err(HalaSkinningError::new(&format!("Root node \"{}\" is listed twice.", root.name), None));
      }
    }
    Ok(())
  }

  fn validate_skins(&self) -> Result<(), HalaSkinningError> {
    for node in self.nodes.iter() {
      if let Some(skin_idx) = node.skin_index {
        if skin_idx as usize >= self.skins.len() {
          return Err(HalaSkinningError::new(&format!("Node \"{}\" has skin {} out of range.", node.name, skin_idx), None));
        }
      }
    }
    for skin in self.skins.iter() {
      if let Some(&joint) = skin.joints.iter().find(|&&joint| joint as usize >= self.nodes.len()) {
        return Err(HalaSkinningError::new(&format!("Skin \"{}\" has joint {} out of range.", skin.name, joint), None));
      }
      if skin.inverse_bind_matrices.len() != skin.joints.len() {
        return Err(HalaSkinningError::new(
          &format!(
            "Skin \"{}\" has {} joints but {} inverse bind matrices.",
            skin.name, skin.joints.len(), skin.inverse_bind_matrices.len(),
          ),
          None,
        ));
      }
    }
    Ok(())
  }

  fn validate_animations(&self) -> Result<(), HalaSkinningError> {
    for animation in self.animations.iter() {
      for (i, sampler) in animation.samplers.iter().enumerate() {
        sampler.validate()
          .map_err(|err| HalaSkinningError::new(&format!("Animation \"{}\" sampler {}: {}", animation.name, i, err.message()), None))?;
        if let Some(node_idx) = sampler.node {
          if node_idx as usize >= self.nodes.len() {
            return Err(HalaSkinningError::new(&format!("Animation \"{}\" sampler {} targets node {} out of range.", animation.name, i, node_idx), None));
          }
        }
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use glam::Vec3;

  fn chain() -> Vec<HalaNode> {
    let mut root = HalaNode::with_matrix("root", Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0)));
    root.children = vec![1];
    let child = HalaNode::with_matrix("child", Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0)));
    vec![root, child]
  }

  #[test]
  fn parents_are_back_filled() {
    let scene = HalaScene::from_parts(chain(), Vec::new(), Vec::new(), vec![0]).unwrap();
    assert_eq!(scene.nodes[0].parent, None);
    assert_eq!(scene.nodes[1].parent, Some(0));
  }

  #[test]
  fn global_transform_composes_ancestors() {
    let scene = HalaScene::from_parts(chain(), Vec::new(), Vec::new(), vec![0]).unwrap();
    let global = scene.global_transform(1);
    assert!(global.abs_diff_eq(Mat4::from_translation(Vec3::new(1.0, 2.0, 0.0)), 1e-6));
  }

  #[test]
  fn reset_pose_restores_base_transforms() {
    let mut scene = HalaScene::from_parts(chain(), Vec::new(), Vec::new(), vec![0]).unwrap();
    scene.set_local_transform(1, Mat4::from_scale(Vec3::splat(3.0)));
    scene.reset_pose();
    assert_eq!(scene.local_transform(1), scene.nodes[1].base_transform);
  }

  #[test]
  fn rejects_two_parents() {
    let mut nodes = chain();
    nodes.push(HalaNode { children: vec![1], ..Default::default() });
    assert!(HalaScene::from_parts(nodes, Vec::new(), Vec::new(), vec![0]).is_err());
  }

  #[test]
  fn rejects_cycles() {
    let mut nodes = chain();
    nodes.push(HalaNode { children: vec![3], ..Default::default() });
    nodes.push(HalaNode { children: vec![2], ..Default::default() });
    let err = HalaScene::from_parts(nodes, Vec::new(), Vec::new(), vec![0]).err().unwrap();
    assert!(err.message().contains("cycle"));
  }

  #[test]
  fn rejects_out_of_range_references() {
    let mut nodes = chain();
    nodes[1].children = vec![9];
    assert!(HalaScene::from_parts(nodes, Vec::new(), Vec::new(), vec![0]).is_err());

    assert!(HalaScene::from_parts(chain(), Vec::new(), Vec::new(), vec![5]).is_err());
    assert!(HalaScene::from_parts(chain(), Vec::new(), Vec::new(), vec![1]).is_err());
    assert!(HalaScene::from_parts(chain(), Vec::new(), Vec::new(), vec![0, 0]).is_err());

    let skins = vec![HalaSkin::new("bad", vec![7], Vec::new())];
    assert!(HalaScene::from_parts(chain(), skins, Vec::new(), vec![0]).is_err());

    let mut nodes = chain();
    nodes[0].skin_index = Some(3);
    assert!(HalaScene::from_parts(nodes, Vec::new(), Vec::new(), vec![0]).is_err());
  }

  #[test]
  fn evaluate_animation_rejects_bad_index() {
    let mut scene = HalaScene::from_parts(chain(), Vec::new(), Vec::new(), vec![0]).unwrap();
    assert!(scene.evaluate_animation(0, 0.0, true).is_err());
  }
}
