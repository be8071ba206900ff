pub mod document_registry;
pub mod region_registry;

pub use document_registry::DocumentRegistry;
pub use region_registry::{RegionRegistry, RegionSync};
