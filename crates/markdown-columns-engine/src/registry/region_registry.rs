use std::collections::{BTreeMap, HashMap, HashSet};

use xi_rope::Rope;

use crate::error::RegionError;
use crate::layout::{LayoutOptions, LayoutOutcome, RenderHost, RenderTarget, Renderer};
use crate::models::{NodeOf, Region, RegionConfig, SyncReport};
use crate::parsing::{ParsedDocument, ParsedRegion, count_region_keys};
use crate::settings::parse_column_settings;

/// Outcome of bringing one parsed region into the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionSync {
    pub key: String,
    pub start_line: usize,
    pub result: Result<SyncReport, RegionError>,
}

/// The live regions of one document, one per key.
pub struct RegionRegistry<T: RenderTarget> {
    regions: BTreeMap<String, Region<T>>,
    options: LayoutOptions,
}

impl<T: RenderTarget> RegionRegistry<T> {
    pub fn new(options: LayoutOptions) -> Self {
        Self {
            regions: BTreeMap::new(),
            options,
        }
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// Creates the region for `key`.
    ///
    /// `occurrences` is how many start markers in the current document text
    /// use `key`. A key that is already registered and still appears more
    /// than once is a real duplicate and is rejected, leaving the existing
    /// region in place. Otherwise the existing entry is stale (its marker was
    /// re-rendered) and is replaced.
    pub fn create_region(
        &mut self,
        key: &str,
        occurrences: usize,
        target: T,
    ) -> Result<&mut Region<T>, RegionError> {
        if self.regions.contains_key(key) && occurrences > 1 {
            log::warn!("rejecting duplicate region key '{key}' ({occurrences} start markers)");
            return Err(RegionError::DuplicateKey {
                key: key.to_string(),
            });
        }

        let region = Region::new(key, target, &self.options);
        self.regions.insert(key.to_string(), region);
        self.region_mut(key)
    }

    /// [`Self::create_region`], counting occurrences in `document` itself.
    pub fn create_region_in_document(
        &mut self,
        key: &str,
        document: &Rope,
        target: T,
    ) -> Result<&mut Region<T>, RegionError> {
        let occurrences = count_region_keys(document).get(key).copied().unwrap_or(0);
        self.create_region(key, occurrences, target)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.regions.contains_key(key)
    }

    pub fn region(&self, key: &str) -> Option<&Region<T>> {
        self.regions.get(key)
    }

    pub fn region_mut(&mut self, key: &str) -> Result<&mut Region<T>, RegionError> {
        self.regions
            .get_mut(key)
            .ok_or_else(|| RegionError::RegionNotFound {
                key: key.to_string(),
            })
    }

    /// Parses `raw` and applies it to the region for `key`.
    ///
    /// Returns the region now registered under `key`. When the layout mode
    /// changes, that is a rebuilt region: same blocks, fresh strategy, no
    /// balance memo.
    pub fn set_region_settings(
        &mut self,
        key: &str,
        raw: &str,
    ) -> Result<&mut Region<T>, RegionError> {
        self.apply_config(key, parse_column_settings(raw))
    }

    pub fn apply_config(
        &mut self,
        key: &str,
        config: RegionConfig,
    ) -> Result<&mut Region<T>, RegionError> {
        let mut region = self
            .regions
            .remove(key)
            .ok_or_else(|| RegionError::RegionNotFound {
                key: key.to_string(),
            })?;

        let previous = region.layout_mode();
        region.set_config(config);
        if region.config().layout_mode != previous {
            log::debug!(
                "region '{key}' switching layout from {previous:?} to {:?}",
                region.config().layout_mode
            );
            region = region.rebuilt(&self.options);
        }

        self.regions.insert(key.to_string(), region);
        self.region_mut(key)
    }

    /// Drops the region. Absent keys are not an error.
    pub fn remove_region(&mut self, key: &str) -> Option<Region<T>> {
        self.regions.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.regions.keys().map(String::as_str)
    }

    pub fn regions(&self) -> impl Iterator<Item = &Region<T>> {
        self.regions.values()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Brings the registry in line with a freshly parsed document.
    ///
    /// Regions already registered keep their blocks (reconciled against the
    /// new source), new keys get a region on a target from `new_target`, and
    /// regions whose key vanished from the document are dropped. Every parsed
    /// region after the first with the same key fails with
    /// [`RegionError::DuplicateKey`]. Nothing is rendered.
    pub fn sync_document<H>(
        &mut self,
        host: &mut H,
        document: &ParsedDocument,
        mut new_target: impl FnMut() -> T,
    ) -> Vec<RegionSync>
    where
        H: RenderHost + Renderer<Node = NodeOf<T>>,
    {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for parsed in &document.regions {
            *counts.entry(parsed.key.as_str()).or_insert(0) += 1;
        }

        let mut seen: HashSet<&str> = HashSet::new();
        let mut results = Vec::with_capacity(document.regions.len());
        for parsed in &document.regions {
            let key = parsed.key.as_str();
            let reuse = seen.insert(key) && self.contains(key);
            let occurrences = counts.get(key).copied().unwrap_or(1);
            let result = self.sync_region(host, parsed, reuse, occurrences, &mut new_target);
            results.push(RegionSync {
                key: parsed.key.clone(),
                start_line: parsed.start_line,
                result,
            });
        }

        let stale: Vec<String> = self
            .keys()
            .filter(|key| !seen.contains(key))
            .map(str::to_string)
            .collect();
        for key in stale {
            log::debug!("dropping region '{key}', no longer in document");
            self.remove_region(&key);
        }

        results
    }

    fn sync_region<H>(
        &mut self,
        host: &mut H,
        parsed: &ParsedRegion,
        reuse: bool,
        occurrences: usize,
        new_target: &mut impl FnMut() -> T,
    ) -> Result<SyncReport, RegionError>
    where
        H: RenderHost + Renderer<Node = NodeOf<T>>,
    {
        if !reuse {
            self.create_region(&parsed.key, occurrences, new_target())?;
        }
        let region = self.apply_config(&parsed.key, parsed.config())?;
        Ok(region.sync_blocks(host, &parsed.blocks))
    }

    /// Re-renders every region, in key order.
    pub fn refresh_all<H>(&mut self, host: &mut H) -> Vec<(String, LayoutOutcome)>
    where
        H: RenderHost + Renderer<Node = NodeOf<T>>,
    {
        self.regions
            .iter_mut()
            .map(|(key, region)| (key.clone(), region.render(host)))
            .collect()
    }
}

impl<T: RenderTarget> Default for RegionRegistry<T> {
    fn default() -> Self {
        Self::new(LayoutOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::testing::{FakeHost, FakeTarget, content};
    use crate::models::{Insertion, LayoutMode};
    use crate::parsing::parse_document;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_duplicate_key_yields_one_error_and_one_region() {
        let document = Rope::from(
            "=== start-multi-column: A\n=== end-multi-column\n=== start-multi-column: A\n=== end-multi-column\n",
        );
        let mut registry = RegionRegistry::default();

        let results = [
            registry
                .create_region_in_document("A", &document, FakeTarget::default())
                .map(|_| ()),
            registry
                .create_region_in_document("A", &document, FakeTarget::default())
                .map(|_| ()),
        ];

        let errors: Vec<&RegionError> = results.iter().filter_map(|r| r.as_ref().err()).collect();
        assert_eq!(
            errors,
            vec![&RegionError::DuplicateKey {
                key: "A".to_string()
            }]
        );
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("A"));
    }

    #[test]
    fn test_empty_keys_are_duplicates_too() {
        let mut registry = RegionRegistry::default();
        registry.create_region("", 2, FakeTarget::default()).unwrap();

        let err = registry
            .create_region("", 2, FakeTarget::default())
            .unwrap_err();

        assert!(err.user_message().contains("empty IDs"));
    }

    #[test]
    fn test_single_occurrence_replaces_stale_region() {
        let mut registry = RegionRegistry::default();
        let region = registry.create_region("A", 1, FakeTarget::default()).unwrap();
        region.add_block(Insertion::End, content("old", 1)).unwrap();

        let region = registry.create_region("A", 1, FakeTarget::default()).unwrap();

        assert!(region.is_empty());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_mode_change_rebuilds_and_keeps_blocks() {
        let mut registry = RegionRegistry::default();
        let region = registry.create_region("A", 1, FakeTarget::default()).unwrap();
        let id = region.add_block(Insertion::End, content("a", 10)).unwrap();
        region.add_block(Insertion::End, content("b", 10)).unwrap();

        let region = registry
            .set_region_settings("A", "Number of Columns: 2\nAuto Layout: on")
            .unwrap();
        assert_eq!(region.layout_mode(), LayoutMode::AutoBalance);
        assert!(region.contains(id));
        assert_eq!(region.len(), 2);

        region.render(&mut FakeHost::default());
        assert_eq!(region.previous_column_heights(), &[10, 10]);

        // Leaving and re-entering auto-balance starts from an empty memo.
        registry.set_region_settings("A", "Auto Layout: off").unwrap();
        let region = registry.set_region_settings("A", "Auto Layout: on").unwrap();
        assert!(region.previous_column_heights().is_empty());
        assert!(region.contains(id));
    }

    #[test]
    fn test_same_mode_keeps_strategy_state() {
        let mut registry = RegionRegistry::default();
        let region = registry.create_region("A", 1, FakeTarget::default()).unwrap();
        region.add_block(Insertion::End, content("a", 6)).unwrap();
        region.add_block(Insertion::End, content("b", 10)).unwrap();
        registry.set_region_settings("A", "Auto Layout: on").unwrap();
        registry
            .region_mut("A")
            .unwrap()
            .render(&mut FakeHost::default());

        let region = registry
            .set_region_settings("A", "Auto Layout: on\nBorder: off")
            .unwrap();

        assert!(!region.config().draw_border);
        assert_eq!(region.previous_column_heights(), &[6, 10]);
    }

    #[test]
    fn test_settings_for_unknown_region() {
        let mut registry: RegionRegistry<FakeTarget> = RegionRegistry::default();
        assert_eq!(
            registry.set_region_settings("nope", "").unwrap_err(),
            RegionError::RegionNotFound {
                key: "nope".to_string()
            }
        );
    }

    #[test]
    fn test_remove_region_then_lookup_reports_absence() {
        let mut registry = RegionRegistry::default();
        registry.create_region("A", 1, FakeTarget::default()).unwrap();

        assert!(registry.remove_region("A").is_some());
        assert!(registry.remove_region("A").is_none());
        assert!(registry.region("A").is_none());
        assert!(registry.region_mut("A").is_err());
    }

    #[test]
    fn test_sync_document_keeps_ids_across_reloads() {
        let mut registry = RegionRegistry::default();
        let mut host = FakeHost::default();
        let first = parse_document(&Rope::from(
            "=== start-multi-column: A\na\n\nb\n=== end-multi-column\n=== start-multi-column: B\nx\n",
        ));

        let results = registry.sync_document(&mut host, &first, FakeTarget::default);
        assert!(results.iter().all(|r| r.result.is_ok()));
        let id_of_b = registry.region("A").unwrap().blocks()[2].id();

        let second = parse_document(&Rope::from(
            "=== start-multi-column: A\nnew\n\nb\n=== end-multi-column\n",
        ));
        let results = registry.sync_document(&mut host, &second, FakeTarget::default);

        assert_eq!(
            results[0].result,
            Ok(SyncReport {
                kept: 3,
                added: 1,
                removed: 1,
                retagged: 0
            })
        );
        assert_eq!(registry.region("A").unwrap().blocks()[2].id(), id_of_b);
        assert!(!registry.contains("B"));
    }

    #[test]
    fn test_sync_document_rejects_second_duplicate_only() {
        let mut registry = RegionRegistry::default();
        let document = parse_document(&Rope::from(
            "=== start-multi-column: A\none\n=== start-multi-column: A\ntwo\n",
        ));

        for _ in 0..2 {
            let results =
                registry.sync_document(&mut FakeHost::default(), &document, FakeTarget::default);

            assert!(results[0].result.is_ok());
            assert_eq!(
                results[1].result,
                Err(RegionError::DuplicateKey {
                    key: "A".to_string()
                })
            );
            assert_eq!(results[1].start_line, 2);
            assert_eq!(registry.len(), 1);
            let labels: Vec<String> = registry
                .region("A")
                .unwrap()
                .blocks()
                .iter()
                .map(|b| b.original().label.clone())
                .collect();
            assert_eq!(labels, vec!["=== start-multi-column: A", "one"]);
        }
    }

    #[test]
    fn test_sync_document_applies_settings() {
        let mut registry = RegionRegistry::default();
        let document = parse_document(&Rope::from(
            "```start-multi-column\nID: S\nNumber of Columns: 3\nAuto Layout: yes\n```\ntext\n",
        ));

        registry.sync_document(&mut FakeHost::default(), &document, FakeTarget::default);

        let region = registry.region("S").unwrap();
        assert_eq!(region.layout_mode(), LayoutMode::AutoBalance);
        assert_eq!(region.config().column_count, 3);
    }

    #[test]
    fn test_refresh_all_renders_every_region_in_key_order() {
        let mut registry = RegionRegistry::default();
        for key in ["b", "a"] {
            let region = registry.create_region(key, 1, FakeTarget::default()).unwrap();
            region.add_block(Insertion::End, content(key, 1)).unwrap();
        }

        let outcomes = registry.refresh_all(&mut FakeHost::default());

        let keys: Vec<&str> = outcomes.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert!(outcomes.iter().all(|(_, o)| o.placed == 1));
        assert_eq!(registry.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
