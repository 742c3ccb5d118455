use std::path::Path;

use glam::{
  Mat4,
  Vec3,
  Vec4,
};
use gltf::animation::{
  Interpolation,
  util::ReadOutputs,
};

use crate::error::HalaSkinningError;
use crate::animation::{
  HalaAnimationClip,
  HalaAnimationPath,
  HalaInterpolation,
  HalaSampler,
};
use super::super::{
  cpu::scene::HalaScene,
  cpu::node::HalaNode,
  cpu::skin::HalaSkin,
};

/// The glTF loader.
pub struct HalaGltfLoader;

/// The implementation of the glTF loader.
impl HalaGltfLoader {
  /// Load the glTF file from the given path.
  /// Only the node hierarchy, skins and animations are read.
  /// param path The path of the glTF file.
  /// return The loaded scene.
  pub fn load<P: AsRef<Path>>(path: P) -> Result<HalaScene, HalaSkinningError> {
    let path = path.as_ref();
    log::debug!("Loading glTF file \"{:?}\".", path);
    let gltf::Gltf { document, blob } = gltf::Gltf::open(path)?;
    let buffers = gltf::import_buffers(&document, path.parent(), blob)?;

    Self::load_document(&document, &buffers)
  }

  /// Build the scene from a parsed glTF document.
  /// Node indices are kept as they are in the document, so skin joints and
  /// animation targets need no remapping.
  /// param document The glTF document.
  /// param buffers The buffer data of the document.
  /// return The loaded scene.
  pub fn load_document(document: &gltf::Document, buffers: &[gltf::buffer::Data]) -> Result<HalaScene, HalaSkinningError> {
    let scene = document.default_scene()
      .or_else(|| document.scenes().next())
      .ok_or(HalaSkinningError::new("No scene in glTF document.", None))?;
    if document.scenes().len() > 1 {
      log::warn!("More than one scene in glTF document. Only scene \"{}\" will be animated.", scene.name().unwrap_or("<Unnamed>"));
    }
    log::debug!("Loading scene \"{}\".", scene.name().unwrap_or("<Unnamed>"));
    let root_nodes = scene.nodes().map(|node| node.index() as u32).collect::<Vec<_>>();

    // Load all nodes.
    let loaded_nodes = document.nodes().map(|node| Self::load_node(&node)).collect::<Vec<_>>();

    // Load all skins.
    let mut loaded_skins = Vec::new();
    for skin in document.skins() {
      loaded_skins.push(Self::load_skin(&skin, buffers)?);
    }

    // Load all animations.
    let mut loaded_animations = Vec::new();
    for animation in document.animations() {
      loaded_animations.push(Self::load_animation(&animation, buffers)?);
    }

    HalaScene::from_parts(loaded_nodes, loaded_skins, loaded_animations, root_nodes)
  }

  /// Load the node.
  /// param node The gltf node.
  /// return The loaded node.
  fn load_node(node: &gltf::Node) -> HalaNode {
    let local_mtx = node.transform().matrix();
    let mut loaded_node = HalaNode::with_matrix(
      node.name().unwrap_or("<Unnamed>"),
      Mat4::from_cols_array_2d(&local_mtx),
    );
    loaded_node.children = node.children().map(|child| child.index() as u32).collect();

    // If the node has a mesh, set the mesh index.
    if let Some(mesh) = node.mesh() {
      loaded_node.mesh_index = Some(mesh.index() as u32);
    }

    // If the node has a skin, set the skin index.
    if let Some(skin) = node.skin() {
      loaded_node.skin_index = Some(skin.index() as u32);
    }

    loaded_node
  }

  /// Load the skin.
  /// param skin The gltf skin.
  /// param buffers The gltf buffers.
  /// return The loaded skin.
  fn load_skin(skin: &gltf::Skin, buffers: &[gltf::buffer::Data]) -> Result<HalaSkin, HalaSkinningError> {
    let skin_name = skin.name().unwrap_or("<Unnamed>");
    log::debug!("Loading skin \"{}\".", skin_name);

    let joints = skin.joints().map(|joint| joint.index() as u32).collect::<Vec<_>>();
    let reader = skin.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));
    let inverse_bind_matrices = match reader.read_inverse_bind_matrices() {
      Some(matrices) => matrices.map(|mtx| Mat4::from_cols_array_2d(&mtx)).collect::<Vec<_>>(),
      None => {
        log::debug!("Skin \"{}\" has no inverse bind matrices, using identity.", skin_name);
        Vec::new()
      },
    };

    Ok(HalaSkin::new(skin_name, joints, inverse_bind_matrices))
  }

  /// Load the animation.
  /// Samplers keep their document order. Samplers no channel refers to are dropped.
  /// param animation The gltf animation.
  /// param buffers The gltf buffers.
  /// return The loaded animation clip.
  fn load_animation(animation: &gltf::Animation, buffers: &[gltf::buffer::Data]) -> Result<HalaAnimationClip, HalaSkinningError> {
    let animation_name = animation.name().unwrap_or("<Unnamed>");
    log::debug!("Loading animation \"{}\".", animation_name);

    let mut loaded_samplers: Vec<Option<HalaSampler>> = animation.samplers().map(|_| None).collect();
    for channel in animation.channels() {
      let sampler_index = channel.sampler().index();
      let reader = channel.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));

      let times = reader.read_inputs()
        .ok_or(HalaSkinningError::new(&format!("Read keyframe times from animation \"{}\" failed.", animation_name), None))?
        .collect::<Vec<_>>();
      let outputs = reader.read_outputs()
        .ok_or(HalaSkinningError::new(&format!("Read keyframe values from animation \"{}\" failed.", animation_name), None))?;
      let (path, mut values) = match outputs {
        ReadOutputs::Translations(translations) => (
          HalaAnimationPath::Translation,
          translations.map(|t| Vec3::from(t).extend(1.0)).collect::<Vec<_>>(),
        ),
        ReadOutputs::Rotations(rotations) => (
          HalaAnimationPath::Rotation,
          rotations.into_f32().map(Vec4::from).collect::<Vec<_>>(),
        ),
        ReadOutputs::Scales(scales) => (
          HalaAnimationPath::Scale,
          scales.map(|s| Vec3::from(s).extend(1.0)).collect::<Vec<_>>(),
        ),
        ReadOutputs::MorphTargetWeights(weights) => (
          HalaAnimationPath::Weights,
          weights.into_f32().map(|w| Vec4::new(w, 0.0, 0.0, 0.0)).collect::<Vec<_>>(),
        ),
      };

      let is_cubic_spline = matches!(channel.sampler().interpolation(), Interpolation::CubicSpline);
      let interpolation = match channel.sampler().interpolation() {
        Interpolation::Linear => HalaInterpolation::Linear,
        Interpolation::Step => HalaInterpolation::Step,
        Interpolation::CubicSpline => {
          log::warn!("Animation \"{}\": cubic spline sampler {} is played back linearly.", animation_name, sampler_index);
          HalaInterpolation::Linear
        },
      };

      // Each keyframe holds one value per morph target, and cubic spline keyframes lay
      // them out as [in-tangents, values, out-tangents]. Keep the first target's value.
      if (is_cubic_spline || path == HalaAnimationPath::Weights) && !times.is_empty() {
        let keyframe_stride = (values.len() / times.len()).max(1);
        let value_index = if is_cubic_spline { keyframe_stride / 3 } else { 0 };
        values = values.chunks(keyframe_stride)
          .filter_map(|keyframe| keyframe.get(value_index).copied())
          .collect();
      }

      if loaded_samplers[sampler_index].is_some() {
        log::warn!("Animation \"{}\": sampler {} is shared by several channels, the last one wins.", animation_name, sampler_index);
      }
      let node = channel.target().node().index() as u32;
      loaded_samplers[sampler_index] = Some(
        HalaSampler::new(path, times, values, Some(node)).with_interpolation(interpolation)
      );
    }

    let samplers = loaded_samplers.into_iter().flatten().collect::<Vec<_>>();
    Ok(HalaAnimationClip::new(animation_name, samplers))
  }
}
