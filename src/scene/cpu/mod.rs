pub mod node;
pub mod skin;
pub mod scene;

pub use node::HalaNode;
pub use skin::HalaSkin;
pub use scene::HalaScene;
