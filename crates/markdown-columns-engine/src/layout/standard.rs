//! Fixed multi-column layout: blocks stay in document order and only a
//! column break moves the remaining content to the next column.

use crate::layout::{ColumnSurface, LayoutOutcome, RenderHost, RenderTarget, place_block};
use crate::models::{BlockTag, ContentBlock, RegionConfig};

pub fn layout<H, T>(
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

    let mut column_index = 0;
    let mut placed = 0;
    for block in blocks.iter_mut() {
        match block.tag() {
            BlockTag::None => {
                let Some(column) = columns.get_mut(column_index) else {
                    break;
                };
                // Heights are recorded for later mode switches but never
                // influence placement here.
                let height = place_block(block, host, column);
                if block.rendered_height() == 0 {
                    block.set_rendered_height(height);
                }
                placed += 1;
            }
            BlockTag::ColumnBreak if column_index + 1 < column_count => column_index += 1,
            _ => {}
        }
    }

    LayoutOutcome {
        columns: column_count,
        placed,
        balance: None,
    }
}
