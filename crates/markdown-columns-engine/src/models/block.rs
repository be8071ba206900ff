use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::layout::{ColumnSurface, Renderer};

/// Rendered height in layout units (pixels for a DOM host, lines for text).
pub type Height = u32;

/// Identifier of a content block, stable for the block's whole lifetime.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct BlockId(Uuid);

impl BlockId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BlockId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Role of a block inside a region.
///
/// Everything except [`BlockTag::None`] is a zero-height structural marker: the
/// layout walk visits it but never displays it as content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BlockTag {
    #[default]
    None,
    RegionStart,
    RegionEnd,
    RegionSettings,
    ColumnBreak,
}

impl BlockTag {
    pub fn is_structural(self) -> bool {
        !matches!(self, BlockTag::None)
    }

    /// Tags the balancing walk assigns to a column.
    pub fn is_placeable(self) -> bool {
        matches!(self, BlockTag::None | BlockTag::ColumnBreak)
    }
}

/// One unit of document content tracked by a region.
///
/// Holds the host's rendered node for the block (`original`) plus a lazily
/// created duplicate used for display inside the columns. The duplicate is
/// owned by the block and survives layout passes; it is only dropped when the
/// block's content is replaced.
#[derive(Debug)]
pub struct ContentBlock<N> {
    id: BlockId,
    tag: BlockTag,
    source_lines: Vec<String>,
    original: N,
    rendered_height: Height,
    is_task_list: bool,
    display_copy: Option<N>,
}

impl<N> ContentBlock<N> {
    pub fn new(original: N, source_lines: Vec<String>) -> Self {
        Self::with_id(BlockId::new(), original, source_lines)
    }

    /// Creates a block under an identifier the host already handed out, e.g.
    /// one stamped on the rendered element.
    pub fn with_id(id: BlockId, original: N, source_lines: Vec<String>) -> Self {
        Self {
            id,
            tag: BlockTag::None,
            source_lines,
            original,
            rendered_height: 0,
            is_task_list: false,
            display_copy: None,
        }
    }

    pub fn with_tag(mut self, tag: BlockTag) -> Self {
        self.tag = tag;
        self
    }

    pub fn with_task_list(mut self, is_task_list: bool) -> Self {
        self.is_task_list = is_task_list;
        self
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn tag(&self) -> BlockTag {
        self.tag
    }

    pub fn source_lines(&self) -> &[String] {
        &self.source_lines
    }

    pub fn original(&self) -> &N {
        &self.original
    }

    pub fn rendered_height(&self) -> Height {
        self.rendered_height
    }

    pub fn is_task_list(&self) -> bool {
        self.is_task_list
    }

    pub fn display_copy(&self) -> Option<&N> {
        self.display_copy.as_ref()
    }

    /// Changes how future layout passes treat this block. Height is untouched.
    pub fn retag(&mut self, tag: BlockTag) {
        self.tag = tag;
    }

    /// Swaps in freshly rendered content, forgetting the cached height and copy.
    pub fn replace_content(&mut self, original: N, source_lines: Vec<String>) {
        self.original = original;
        self.source_lines = source_lines;
        self.rendered_height = 0;
        self.display_copy = None;
    }

    pub(crate) fn set_rendered_height(&mut self, height: Height) {
        self.rendered_height = height;
    }

    /// Returns the cached display copy, duplicating the original on first use.
    pub(crate) fn display_node<R>(&mut self, renderer: &mut R) -> &N
    where
        R: Renderer<Node = N>,
    {
        self.display_copy
            .get_or_insert_with(|| renderer.duplicate(&self.original))
    }
}

impl<N: Clone> ContentBlock<N> {
    /// Measures an unmeasured content block by briefly attaching its original
    /// node to `scratch`.
    ///
    /// Structural blocks and blocks that already carry a height are left alone.
    /// The scratch surface is returned to its prior state before this returns.
    pub fn measure<S>(&mut self, scratch: &mut S) -> Height
    where
        S: ColumnSurface<Node = N>,
    {
        if self.rendered_height == 0 && self.tag == BlockTag::None {
            let height = scratch.attach(self.original.clone());
            scratch.detach_last();
            log::trace!("measured block {} at {height}", self.id);
            self.rendered_height = height;
        }
        self.rendered_height
    }
}
