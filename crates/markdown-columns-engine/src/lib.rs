pub mod error;
pub mod layout;
pub mod models;
pub mod parsing;
pub mod plain_text;
pub mod preview;
pub mod registry;
pub mod settings;

// Re-export key types for easier usage
pub use error::RegionError;
pub use layout::{
    BalanceReport, ColumnStyle, ColumnSurface, LayoutOptions, LayoutOutcome, LayoutStrategy,
    RenderHost, RenderTarget, Renderer, StructuralClassifier, TaskListFixup,
};
pub use models::*;
pub use parsing::{ParsedBlock, ParsedDocument, ParsedRegion, parse_document};
pub use preview::preview_region;
pub use registry::{DocumentRegistry, RegionRegistry, RegionSync};
pub use settings::{parse_column_settings, parse_region_id};
