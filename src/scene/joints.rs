use super::cpu::node::HalaNode;
use super::cpu::skin::HalaSkin;

/// Collect the node indices reachable from the roots in depth-first pre-order.
/// Roots are visited in the given order, children in their stored order.
/// param nodes: The scene nodes.
/// param root_nodes: The scene root node indices.
/// return: The visiting order.
pub fn depth_first_order(nodes: &[HalaNode], root_nodes: &[u32]) -> Vec<u32> {
  let mut order = Vec::with_capacity(nodes.len());
  let mut node_stack = Vec::new();
  for &root in root_nodes.iter() {
    node_stack.push(root);
    while let Some(index) = node_stack.pop() {
      order.push(index);
      node_stack.extend(nodes[index as usize].children.iter().rev().copied());
    }
  }
  order
}

/// Set the joint count of every node from the skin bound to it.
/// param nodes: The scene nodes.
/// param skins: The scene skins.
pub fn compute_joint_counts(nodes: &mut [HalaNode], skins: &[HalaSkin]) {
  for node in nodes.iter_mut() {
    node.joint_count = node.skin_index
      .and_then(|skin_index| skins.get(skin_index as usize))
      .map_or(0, |skin| skin.num_of_joints());
  }
}

/// Assign each node the start of its block in the flat joint matrix array.
/// One counter is shared by all roots. A node takes the counter on entry and
/// advances it by its joint count before its children are visited.
/// Skinned nodes unreachable from the roots lose their joint block.
/// param nodes: The scene nodes with joint counts already computed.
/// param order: The depth-first visiting order.
/// return: The total number of joint matrices.
pub fn compute_joint_offsets(nodes: &mut [HalaNode], order: &[u32]) -> usize {
  let mut visited = vec![false; nodes.len()];
  let mut current_offset = 0;
  for &index in order.iter() {
    let node = &mut nodes[index as usize];
    visited[index as usize] = true;
    node.joint_offset = current_offset;
    current_offset += node.joint_count;
  }

  for (node, _) in nodes.iter_mut().zip(visited).filter(|(_, visited)| !visited) {
    if node.joint_count > 0 {
      log::warn!("Skinned node \"{}\" is not reachable from any scene root, its skin is ignored.", node.name);
    }
    node.joint_count = 0;
    node.joint_offset = 0;
  }

  current_offset
}
