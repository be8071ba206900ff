//! Finds multi-column regions in markdown source.
//!
//! Parsing is two phases, like any line-oriented markdown block parser:
//! [`classify::MarkerClassifier`] looks at each line alone, then
//! [`builder::RegionBuilder`] groups the classified lines into regions and
//! blocks. Nothing here renders; the output is plain text that a
//! [`crate::layout::Renderer`] turns into nodes.

pub mod builder;
pub mod classify;
pub mod ids;
pub mod lines;

use std::collections::HashMap;

use xi_rope::Rope;

use crate::models::{BlockTag, RegionConfig};
use crate::settings::parse_column_settings;

use builder::RegionBuilder;
use classify::MarkerClassifier;
use lines::numbered_lines;

pub use ids::{FixedIds, fix_missing_ids, random_region_id};

/// One block of region source: a paragraph, a codeblock or a marker line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBlock {
    pub tag: BlockTag,
    /// Verbatim source lines, without terminators.
    pub lines: Vec<String>,
    /// Zero-based document line of the first source line.
    pub start_line: usize,
}

impl ParsedBlock {
    pub fn new(tag: BlockTag, lines: Vec<String>) -> Self {
        Self {
            tag,
            lines,
            start_line: 0,
        }
    }

    pub fn at_line(mut self, start_line: usize) -> Self {
        self.start_line = start_line;
        self
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsedRegion {
    /// Empty when the start marker carries no id.
    pub key: String,
    pub start_line: usize,
    /// `None` for a region that runs to the end of the document.
    pub end_line: Option<usize>,
    /// Body of the settings (or start) codeblock, if any.
    pub settings_text: Option<String>,
    /// Every block between the markers, the markers themselves included.
    pub blocks: Vec<ParsedBlock>,
}

impl ParsedRegion {
    pub fn config(&self) -> RegionConfig {
        self.settings_text
            .as_deref()
            .map(parse_column_settings)
            .unwrap_or_default()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsedDocument {
    pub regions: Vec<ParsedRegion>,
}

pub fn parse_document(rope: &Rope) -> ParsedDocument {
    let classifier = MarkerClassifier;
    let mut builder = RegionBuilder::new();

    for line in numbered_lines(rope) {
        let class = classifier.classify(&line);
        builder.push(&line, &class);
    }

    ParsedDocument {
        regions: builder.finish(),
    }
}

/// Parses the body of a single region, with or without its start marker.
pub fn parse_region_body(rope: &Rope) -> ParsedRegion {
    let classifier = MarkerClassifier;
    let mut builder = RegionBuilder::in_region();

    for line in numbered_lines(rope) {
        let class = classifier.classify(&line);
        builder.push(&line, &class);
    }

    let mut regions = builder.finish().into_iter();
    // A body that starts with its own marker leaves the implicit region empty.
    match regions.next() {
        Some(region) if region.blocks.is_empty() => regions.next().unwrap_or(region),
        other => other.unwrap_or_default(),
    }
}

/// How many start markers use each key. A count above one means every region
/// after the first with that key is rejected.
pub fn count_region_keys(rope: &Rope) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for region in parse_document(rope).regions {
        *counts.entry(region.key).or_insert(0) += 1;
    }
    counts
}
