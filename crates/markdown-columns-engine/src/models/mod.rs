pub mod block;
pub mod config;
pub mod region;

pub use block::{BlockId, BlockTag, ContentBlock, Height};
pub use config::{ColumnSize, LayoutMode, MAX_COLUMN_COUNT, RegionConfig};
pub use region::{Insertion, NodeOf, Region, SyncReport};
