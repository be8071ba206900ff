//! One-off rendering of a region that is not part of any registry, such as
//! an editor preview of the region under the cursor.

use xi_rope::Rope;

use crate::layout::{LayoutOptions, LayoutOutcome, RenderHost, RenderTarget, Renderer};
use crate::models::{NodeOf, Region};
use crate::parsing::parse_region_body;

/// Parses `source` as a region body, renders its blocks with `host` and lays
/// them out once into `target`.
///
/// Settings come from the body's settings or start codeblock, defaults
/// otherwise. The returned region is not registered anywhere, so duplicate
/// keys are not checked.
pub fn preview_region<H, T>(
    source: &str,
    host: &mut H,
    target: T,
    options: &LayoutOptions,
) -> (Region<T>, LayoutOutcome)
where
    T: RenderTarget,
    H: RenderHost + Renderer<Node = NodeOf<T>>,
{
    let parsed = parse_region_body(&Rope::from(source));
    let mut region = Region::with_config(parsed.key.clone(), target, parsed.config(), options);
    region.sync_blocks(host, &parsed.blocks);
    let outcome = region.render(host);
    (region, outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::testing::{FakeHost, FakeTarget};
    use crate::models::LayoutMode;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_preview_uses_body_settings() {
        let source = "```column-settings\nNumber of Columns: 3\n```\none\n\ntwo\n=== end-column ===\nthree\n";

        let (region, outcome) = preview_region(
            source,
            &mut FakeHost::default(),
            FakeTarget::default(),
            &LayoutOptions::default(),
        );

        assert_eq!(region.layout_mode(), LayoutMode::Standard);
        assert_eq!(outcome.columns, 3);
        assert_eq!(outcome.placed, 3);
        assert_eq!(
            region.target().labels(),
            vec![vec!["one", "two"], vec!["three"], vec![]]
        );
    }

    #[test]
    fn test_preview_without_settings_uses_defaults() {
        let (region, outcome) = preview_region(
            "just text",
            &mut FakeHost::default(),
            FakeTarget::default(),
            &LayoutOptions::default(),
        );

        assert_eq!(region.key(), "");
        assert_eq!(outcome.columns, 2);
        assert_eq!(region.target().labels(), vec![vec!["just text"], vec![]]);
    }
}
