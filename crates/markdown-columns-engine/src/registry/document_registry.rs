use std::collections::BTreeMap;

use relative_path::{RelativePath, RelativePathBuf};

use crate::layout::{LayoutOptions, LayoutOutcome, RenderHost, RenderTarget, Renderer};
use crate::models::NodeOf;

use super::RegionRegistry;

/// Region registries for every open document, keyed by vault-relative path.
///
/// A registry is created when its document is opened and dropped with it;
/// nothing outlives [`DocumentRegistry::close_document`].
pub struct DocumentRegistry<T: RenderTarget> {
    documents: BTreeMap<RelativePathBuf, RegionRegistry<T>>,
    options: LayoutOptions,
}

impl<T: RenderTarget> DocumentRegistry<T> {
    pub fn new(options: LayoutOptions) -> Self {
        Self {
            documents: BTreeMap::new(),
            options,
        }
    }

    /// Returns the document's registry, creating an empty one on first open.
    pub fn open_document(&mut self, path: &RelativePath) -> &mut RegionRegistry<T> {
        self.documents
            .entry(path.to_relative_path_buf())
            .or_insert_with(|| {
                log::debug!("opening region registry for {path}");
                RegionRegistry::new(self.options)
            })
    }

    pub fn document(&self, path: &RelativePath) -> Option<&RegionRegistry<T>> {
        self.documents.get(path)
    }

    pub fn document_mut(&mut self, path: &RelativePath) -> Option<&mut RegionRegistry<T>> {
        self.documents.get_mut(path)
    }

    /// Tears down every region of the document.
    pub fn close_document(&mut self, path: &RelativePath) -> Option<RegionRegistry<T>> {
        let closed = self.documents.remove(path);
        if closed.is_some() {
            log::debug!("closed region registry for {path}");
        }
        closed
    }

    pub fn documents(&self) -> impl Iterator<Item = &RelativePath> {
        self.documents.keys().map(RelativePathBuf::as_relative_path)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Re-renders every region of every open document.
    pub fn refresh_all<H>(&mut self, host: &mut H) -> usize
    where
        H: RenderHost + Renderer<Node = NodeOf<T>>,
    {
        self.documents
            .values_mut()
            .map(|registry| registry.refresh_all(host).len())
            .sum()
    }

    /// Outcomes of refreshing the regions of one document.
    pub fn refresh_document<H>(
        &mut self,
        path: &RelativePath,
        host: &mut H,
    ) -> Vec<(String, LayoutOutcome)>
    where
        H: RenderHost + Renderer<Node = NodeOf<T>>,
    {
        self.documents
            .get_mut(path)
            .map(|registry| registry.refresh_all(host))
            .unwrap_or_default()
    }
}

impl<T: RenderTarget> Default for DocumentRegistry<T> {
    fn default() -> Self {
        Self::new(LayoutOptions::default())
    }
}
