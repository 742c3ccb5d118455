pub mod loader;
pub mod cpu;
pub mod joints;
pub mod joint_matrices;

pub use cpu::{
  HalaNode,
  HalaSkin,
  HalaScene,
};
pub use joint_matrices::collect_joint_matrices;
