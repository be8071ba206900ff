use crate::layout::{ColumnSurface, LayoutOutcome, RenderHost, RenderTarget, place_block};
use crate::models::{BlockTag, ContentBlock, RegionConfig};

/// Places every content block, in order, into a single column.
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
    let mut style = config.column_style();
    style.width_ratios = vec![100];
    target.recreate_columns(1, &style);

    let mut placed = 0;
    if let Some(column) = target.columns_mut().first_mut() {
        for block in blocks.iter_mut().filter(|b| b.tag() == BlockTag::None) {
            let height = place_block(block, host, column);
            if block.rendered_height() == 0 {
                block.set_rendered_height(height);
            }
            placed += 1;
        }
    }

    LayoutOutcome {
        columns: 1,
        placed,
        balance: None,
    }
}
