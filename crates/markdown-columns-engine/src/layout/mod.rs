//! # Layout strategies
//!
//! A region is laid out by exactly one [`LayoutStrategy`], chosen from its
//! [`LayoutMode`]. Every strategy starts by recreating the column containers
//! under the render target, so repeated layout calls never accumulate stale
//! columns or duplicated children.
//!
//! The engine never touches a real display tree. It talks to the host through
//! three seams:
//!
//! - [`Renderer`] (+ [`StructuralClassifier`], [`TaskListFixup`]): turns text
//!   into nodes, duplicates nodes, and answers questions about them
//! - [`ColumnSurface`]: one column container; attaching a node is also how it
//!   gets measured, so a node can never be measured while detached
//! - [`RenderTarget`]: owns the columns of one region
//!
//! ## Strategies
//!
//! - **Standard**: document order, column index advances on column breaks only
//! - **SingleColumn**: everything in one column
//! - **AutoBalance**: see [`auto_balance`]

pub mod auto_balance;
pub mod single_column;
pub mod standard;

#[cfg(test)]
pub(crate) mod testing;

use serde::{Deserialize, Serialize};

use crate::models::{ContentBlock, Height, LayoutMode, RegionConfig};

pub use auto_balance::AutoBalanceEngine;

/// Default cap on auto-balance placement passes per layout call.
pub const DEFAULT_BALANCE_ITERATIONS: usize = 5;

/// Turns source text into displayable nodes.
pub trait Renderer {
    /// Cloning a node must be cheap (a handle copy); [`Renderer::duplicate`]
    /// is the deep copy.
    type Node: Clone;

    fn render(&mut self, source: &str) -> Self::Node;

    fn duplicate(&mut self, node: &Self::Node) -> Self::Node;
}

/// Structural questions the engine asks about rendered nodes.
pub trait StructuralClassifier: Renderer {
    fn is_heading(&self, node: &Self::Node) -> bool;

    fn is_task_list(&self, node: &Self::Node) -> bool;
}

/// Repairs interactive checklist controls on a node about to be displayed.
pub trait TaskListFixup: Renderer {
    fn fixup(&mut self, node: &mut Self::Node, for_display_copy: bool);
}

/// Everything a layout pass needs from the host renderer.
pub trait RenderHost: StructuralClassifier + TaskListFixup {}

impl<T: StructuralClassifier + TaskListFixup> RenderHost for T {}

/// An ordered, appendable, clearable column container.
pub trait ColumnSurface {
    type Node;

    /// Appends `node` as the last child and returns its height measured in
    /// place.
    fn attach(&mut self, node: Self::Node) -> Height;

    /// Removes the last child, returning it.
    fn detach_last(&mut self) -> Option<Self::Node>;

    fn clear(&mut self);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Aggregate rendered height of the column.
    fn height(&self) -> Height;
}

/// Visual settings applied when columns are (re)created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnStyle {
    pub draw_border: bool,
    pub draw_shadow: bool,
    /// Percentage width of each column; its length is the column count.
    pub width_ratios: Vec<u16>,
}

/// The parent of a region's columns.
pub trait RenderTarget {
    type Column: ColumnSurface;

    /// Drops every existing column and creates `count` empty ones.
    fn recreate_columns(&mut self, count: usize, style: &ColumnStyle);

    fn columns(&self) -> &[Self::Column];

    fn columns_mut(&mut self) -> &mut [Self::Column];
}

/// Engine-wide layout knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutOptions {
    pub max_balance_iterations: usize,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            max_balance_iterations: DEFAULT_BALANCE_ITERATIONS,
        }
    }
}

/// Result of one balancing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceReport {
    /// Placement passes performed, never more than the iteration budget.
    pub passes: usize,
    /// Whether the last pass reproduced the previous column heights.
    pub converged: bool,
}

/// What a layout call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutOutcome {
    pub columns: usize,
    /// Content blocks displayed in the final placement.
    pub placed: usize,
    pub balance: Option<BalanceReport>,
}

/// The strategy currently rendering a region.
///
/// Switching modes always builds a new value; a strategy never changes its
/// variant in place, so auto-balance memo state cannot leak into another mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutStrategy {
    Standard,
    SingleColumn,
    AutoBalance(AutoBalanceEngine),
}

impl LayoutStrategy {
    pub fn for_mode(mode: LayoutMode, options: &LayoutOptions) -> Self {
        match mode {
            LayoutMode::Standard => LayoutStrategy::Standard,
            LayoutMode::SingleColumn => LayoutStrategy::SingleColumn,
            LayoutMode::AutoBalance => {
                LayoutStrategy::AutoBalance(AutoBalanceEngine::new(options.max_balance_iterations))
            }
        }
    }

    pub fn mode(&self) -> LayoutMode {
        match self {
            LayoutStrategy::Standard => LayoutMode::Standard,
            LayoutStrategy::SingleColumn => LayoutMode::SingleColumn,
            LayoutStrategy::AutoBalance(_) => LayoutMode::AutoBalance,
        }
    }

    /// Column heights remembered by the auto-balance engine; empty otherwise.
    pub fn previous_column_heights(&self) -> &[Height] {
        match self {
            LayoutStrategy::AutoBalance(engine) => engine.previous_column_heights(),
            _ => &[],
        }
    }

    pub fn layout<H, T>(
        &mut self,
        blocks: &mut [ContentBlock<H::Node>],
        config: &RegionConfig,
        host: &mut H,
        target: &mut T,
    ) -> LayoutOutcome
    where
        H: RenderHost,
        T: RenderTarget,
        T::Column: ColumnSurface<Node = H::Node>,
    {
        match self {
            LayoutStrategy::Standard => standard::layout(blocks, config, host, target),
            LayoutStrategy::SingleColumn => single_column::layout(blocks, config, host, target),
            LayoutStrategy::AutoBalance(engine) => engine.layout(blocks, config, host, target),
        }
    }
}

/// Attaches the block's display copy to `column` and returns the height it
/// measured at in place.
pub(crate) fn place_block<H, C>(
    block: &mut ContentBlock<H::Node>,
    host: &mut H,
    column: &mut C,
) -> Height
where
    H: RenderHost,
    C: ColumnSurface<Node = H::Node>,
{
    let mut node = block.display_node(host).clone();
    if block.is_task_list() {
        host.fixup(&mut node, true);
    }
    column.attach(node)
}
