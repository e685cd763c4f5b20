//! Page elements and the node tree rendered into them.

pub mod memory;
pub mod node;
pub mod traits;

pub use memory::MemoryDom;
pub use node::{Element, Node};
pub use traits::DomHost;
