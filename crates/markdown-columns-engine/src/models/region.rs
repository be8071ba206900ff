use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::error::RegionError;
use crate::layout::{
    ColumnSurface, LayoutOptions, LayoutOutcome, LayoutStrategy, RenderHost, RenderTarget,
    Renderer,
};
use crate::models::{BlockId, BlockTag, ContentBlock, Height, LayoutMode, RegionConfig};
use crate::parsing::ParsedBlock;

/// Node type rendered into a target's columns.
pub type NodeOf<T> = <<T as RenderTarget>::Column as ColumnSurface>::Node;

/// Where [`Region::add_block`] puts a new block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    Start,
    End,
    Before(BlockId),
    After(BlockId),
    /// Clamped to the current length.
    Index(usize),
}

/// What [`Region::sync_blocks`] changed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub kept: usize,
    pub added: usize,
    pub removed: usize,
    pub retagged: usize,
}

impl SyncReport {
    pub fn is_unchanged(&self) -> bool {
        self.added == 0 && self.removed == 0 && self.retagged == 0
    }
}

/// One multi-column layout instance and the ordered blocks it owns.
///
/// Block order is document order and the only thing that maps content to
/// columns. `block_index` maps every id to its position in `blocks` for
/// constant-time lookup; every mutation goes through methods that keep the
/// two in step, reindexing the shifted tail.
pub struct Region<T: RenderTarget> {
    key: String,
    blocks: Vec<ContentBlock<NodeOf<T>>>,
    block_index: HashMap<BlockId, usize>,
    config: RegionConfig,
    strategy: LayoutStrategy,
    target: T,
}

impl<T: RenderTarget> Region<T> {
    pub fn new(key: impl Into<String>, target: T, options: &LayoutOptions) -> Self {
        Self::with_config(key, target, RegionConfig::default(), options)
    }

    pub fn with_config(
        key: impl Into<String>,
        target: T,
        config: RegionConfig,
        options: &LayoutOptions,
    ) -> Self {
        Self {
            key: key.into(),
            blocks: Vec::new(),
            block_index: HashMap::new(),
            strategy: LayoutStrategy::for_mode(config.layout_mode, options),
            config,
            target,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn config(&self) -> &RegionConfig {
        &self.config
    }

    /// Mode of the strategy currently rendering this region. Can lag behind
    /// `config().layout_mode` until the registry rebuilds the region.
    pub fn layout_mode(&self) -> LayoutMode {
        self.strategy.mode()
    }

    pub fn strategy(&self) -> &LayoutStrategy {
        &self.strategy
    }

    pub fn previous_column_heights(&self) -> &[Height] {
        self.strategy.previous_column_heights()
    }

    pub fn blocks(&self) -> &[ContentBlock<NodeOf<T>>] {
        &self.blocks
    }

    pub fn block(&self, id: BlockId) -> Option<&ContentBlock<NodeOf<T>>> {
        self.position(id).map(|index| &self.blocks[index])
    }

    pub fn block_mut(&mut self, id: BlockId) -> Option<&mut ContentBlock<NodeOf<T>>> {
        self.position(id).map(|index| &mut self.blocks[index])
    }

    pub fn contains(&self, id: BlockId) -> bool {
        self.block_index.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    fn position(&self, id: BlockId) -> Option<usize> {
        self.block_index.get(&id).copied()
    }

    /// Refreshes the index for every block from `from` on.
    fn reindex(&mut self, from: usize) {
        for (offset, block) in self.blocks[from..].iter().enumerate() {
            self.block_index.insert(block.id(), from + offset);
        }
    }

    pub fn add_block(
        &mut self,
        at: Insertion,
        block: ContentBlock<NodeOf<T>>,
    ) -> Result<BlockId, RegionError> {
        let id = block.id();
        if self.block_index.contains_key(&id) {
            return Err(RegionError::DuplicateId { id });
        }

        let index = match at {
            Insertion::Start => 0,
            Insertion::End => self.blocks.len(),
            Insertion::Before(anchor) => self
                .position(anchor)
                .ok_or(RegionError::NotFound { id: anchor })?,
            Insertion::After(anchor) => {
                self.position(anchor)
                    .ok_or(RegionError::NotFound { id: anchor })?
                    + 1
            }
            Insertion::Index(index) => index.min(self.blocks.len()),
        };

        self.blocks.insert(index, block);
        self.reindex(index);
        Ok(id)
    }

    /// Removes a block if present.
    ///
    /// Safe to call again for an id that is already gone, which happens when a
    /// host unload callback fires after the block was dropped by a sync.
    pub fn remove_block(&mut self, id: BlockId) -> Option<ContentBlock<NodeOf<T>>> {
        let index = self.position(id)?;
        self.block_index.remove(&id);
        let block = self.blocks.remove(index);
        self.reindex(index);
        Some(block)
    }

    /// Removes a block that must be present.
    pub fn take_block(&mut self, id: BlockId) -> Result<ContentBlock<NodeOf<T>>, RegionError> {
        self.remove_block(id).ok_or(RegionError::NotFound { id })
    }

    pub fn retag_block(&mut self, id: BlockId, tag: BlockTag) -> Result<(), RegionError> {
        let block = self.block_mut(id).ok_or(RegionError::NotFound { id })?;
        block.retag(tag);
        Ok(())
    }

    /// Replaces the config. Switching strategies is up to the registry.
    pub fn set_config(&mut self, config: RegionConfig) {
        self.config = config;
    }

    /// Consumes the region, returning a new one with the same key, blocks and
    /// target but a strategy freshly built for the current config.
    pub(crate) fn rebuilt(self, options: &LayoutOptions) -> Self {
        Self {
            strategy: LayoutStrategy::for_mode(self.config.layout_mode, options),
            ..self
        }
    }

    /// Lays the region out into its own target.
    pub fn render<H>(&mut self, host: &mut H) -> LayoutOutcome
    where
        H: RenderHost + Renderer<Node = NodeOf<T>>,
    {
        self.strategy
            .layout(&mut self.blocks, &self.config, host, &mut self.target)
    }

    /// Lays the region out into a separate target, e.g. for printing.
    ///
    /// Shadows are always off. The region's own strategy memo and the cached
    /// block heights are left as they were, since the export target may wrap
    /// at a different width.
    pub fn export_to<H, E>(&mut self, host: &mut H, target: &mut E) -> LayoutOutcome
    where
        H: RenderHost + Renderer<Node = NodeOf<T>>,
        E: RenderTarget,
        E::Column: ColumnSurface<Node = NodeOf<T>>,
    {
        let config = RegionConfig {
            draw_shadow: false,
            ..self.config.clone()
        };
        let heights: Vec<Height> = self.blocks.iter().map(ContentBlock::rendered_height).collect();
        let mut strategy = self.strategy.clone();
        let outcome = strategy.layout(&mut self.blocks, &config, host, target);
        for (block, height) in self.blocks.iter_mut().zip(heights) {
            block.set_rendered_height(height);
        }
        outcome
    }

    /// Brings the block list in line with freshly parsed source blocks.
    ///
    /// Existing blocks are matched by their verbatim source lines, in order,
    /// and keep their id, cached height and display copy. Unmatched parsed
    /// blocks are rendered and added; blocks with no parsed counterpart are
    /// removed. The final order follows `parsed`.
    pub fn sync_blocks<H>(&mut self, host: &mut H, parsed: &[ParsedBlock]) -> SyncReport
    where
        H: RenderHost + Renderer<Node = NodeOf<T>>,
    {
        let mut report = SyncReport::default();
        let mut order = Vec::with_capacity(parsed.len());
        let mut matched = HashSet::with_capacity(parsed.len());

        for source in parsed {
            let existing = self
                .blocks
                .iter_mut()
                .find(|b| !matched.contains(&b.id()) && b.source_lines() == source.lines.as_slice());

            let id = match existing {
                Some(block) => {
                    if block.tag() != source.tag {
                        block.retag(source.tag);
                        report.retagged += 1;
                    }
                    report.kept += 1;
                    block.id()
                }
                None => {
                    let node = host.render(&source.text());
                    let is_task_list = host.is_task_list(&node);
                    let block = ContentBlock::new(node, source.lines.clone())
                        .with_tag(source.tag)
                        .with_task_list(is_task_list);
                    let id = block.id();
                    self.block_index.insert(id, self.blocks.len());
                    self.blocks.push(block);
                    report.added += 1;
                    id
                }
            };
            matched.insert(id);
            order.push(id);
        }

        let stale: Vec<BlockId> = self
            .blocks
            .iter()
            .map(ContentBlock::id)
            .filter(|id| !matched.contains(id))
            .collect();
        for id in stale {
            if self.remove_block(id).is_some() {
                report.removed += 1;
            }
        }

        let rank: HashMap<BlockId, usize> =
            order.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        self.blocks
            .sort_by_key(|b| rank.get(&b.id()).copied().unwrap_or(usize::MAX));
        self.reindex(0);

        log::debug!(
            "region '{}' synced: {} kept, {} added, {} removed, {} retagged",
            self.key,
            report.kept,
            report.added,
            report.removed,
            report.retagged
        );
        report
    }
}

impl<T: RenderTarget> fmt::Debug for Region<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Region")
            .field("key", &self.key)
            .field("blocks", &self.blocks.len())
            .field("config", &self.config)
            .field("mode", &self.strategy.mode())
            .finish_non_exhaustive()
    }
}
