//! # Auto-balance engine
//!
//! Spreads a region's blocks over its columns so the columns end up roughly
//! the same height, without reordering anything.
//!
//! Column heights are only known once content is actually placed (column width
//! changes wrapping), so the engine alternates placement and measurement:
//!
//! 1. Sum the heights of all content blocks, measuring unmeasured ones against
//!    the first column as a scratch surface.
//! 2. `target = total / column_count`, fixed for the whole pass.
//! 3. Clear the columns and walk the blocks in order. A block moves to the next
//!    column when it would push the current column past `target`. Headings are
//!    tested together with the block that follows them so a heading is never
//!    stranded at the bottom of a column. Column breaks go through the same
//!    test and then force one more advance. The last column takes whatever is
//!    left.
//! 4. Each placed block is re-measured from its display copy.
//! 5. Compare the column heights with the previous pass. Identical heights mean
//!    the layout converged; otherwise repeat, up to the iteration budget.
//!
//! The last placement is kept whether or not it converged. The previous
//! heights survive between layout calls, so an unchanged region settles after a
//! single pass on the next refresh.

use crate::layout::{
    BalanceReport, ColumnSurface, LayoutOutcome, RenderHost, RenderTarget, place_block,
};
use crate::models::{BlockTag, ContentBlock, Height, RegionConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoBalanceEngine {
    previous_column_heights: Vec<Height>,
    max_iterations: usize,
}

impl AutoBalanceEngine {
    pub fn new(max_iterations: usize) -> Self {
        Self {
            previous_column_heights: Vec::new(),
            max_iterations: max_iterations.max(1),
        }
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn previous_column_heights(&self) -> &[Height] {
        &self.previous_column_heights
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
        let column_count = config.effective_column_count();
        target.recreate_columns(column_count, &config.column_style());
        let columns = target.columns_mut();

        let mut passes = 0;
        let mut placed = 0;
        let mut converged = false;
        while passes < self.max_iterations {
            passes += 1;
            placed = balance_pass(blocks, host, columns);
            if self.record_column_heights(columns) {
                converged = true;
                break;
            }
        }

        if converged {
            log::debug!(
                "balanced {placed} blocks over {column_count} columns in {passes} pass(es): {:?}",
                self.previous_column_heights
            );
        } else {
            log::warn!(
                "column heights still moving after {passes} balance passes, keeping last placement"
            );
        }

        LayoutOutcome {
            columns: column_count,
            placed,
            balance: Some(BalanceReport { passes, converged }),
        }
    }

    /// Stores the current column heights, returning `true` when none changed.
    fn record_column_heights<C: ColumnSurface>(&mut self, columns: &[C]) -> bool {
        self.previous_column_heights.resize(columns.len(), 0);
        let mut unchanged = true;
        for (previous, column) in self.previous_column_heights.iter_mut().zip(columns) {
            let height = column.height();
            if *previous != height {
                *previous = height;
                unchanged = false;
            }
        }
        unchanged
    }
}

/// One measure-and-place pass. Returns the number of content blocks placed.
fn balance_pass<H, C>(blocks: &mut [ContentBlock<H::Node>], host: &mut H, columns: &mut [C]) -> usize
where
    H: RenderHost,
    C: ColumnSurface<Node = H::Node>,
{
    let column_count = columns.len();
    let Some(scratch) = columns.first_mut() else {
        return 0;
    };

    let total_height: Height = blocks
        .iter_mut()
        .filter(|b| b.tag() == BlockTag::None)
        .map(|b| b.measure(scratch))
        .fold(0, Height::saturating_add);
    let target_height = total_height / column_count as Height;

    for column in columns.iter_mut() {
        column.clear();
    }

    let mut column_index = 0;
    let mut current_height: Height = 0;
    let mut placed = 0;
    for i in 0..blocks.len() {
        let tag = blocks[i].tag();
        if !tag.is_placeable() {
            continue;
        }

        let this_height = blocks[i].rendered_height();
        let check_height = if tag == BlockTag::None && host.is_heading(blocks[i].original()) {
            let next_height = blocks.get(i + 1).map_or(0, |next| next.rendered_height());
            this_height.saturating_add(next_height)
        } else {
            this_height
        };

        // Breaks take the overflow test too.
        if current_height.saturating_add(check_height) > target_height
            && column_index + 1 < column_count
        {
            column_index += 1;
            current_height = 0;
        }
        current_height = current_height.saturating_add(this_height);

        if tag == BlockTag::None {
            let block = &mut blocks[i];
            let height = place_block(block, host, &mut columns[column_index]);
            block.set_rendered_height(height);
            placed += 1;
        } else if column_index + 1 < column_count {
            // Column break: takes effect for the blocks after it.
            column_index += 1;
            current_height = 0;
        }
    }

    placed
}
