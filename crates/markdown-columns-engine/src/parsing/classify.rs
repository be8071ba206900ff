use std::sync::LazyLock;

use regex::Regex;

use super::lines::LineRef;

static START_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*===\s*(?:start-multi-column|multi-column-start)(?:\s*:\s*(.*?))?\s*$")
        .expect("start tag regex")
});

static END_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*===\s*(?:end-multi-column|multi-column-end)\s*$").expect("end tag regex")
});

static COLUMN_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:===\s*(?:end-column|column-end)\s*===|---\s*(?:column-break|end-column)\s*---)\s*$",
    )
    .expect("column break regex")
});

static FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s{0,3}(`{3,}|~{3,})\s*([^\s`]*)").expect("fence regex"));

/// Info strings of a codeblock that opens a region.
pub const START_CODEBLOCK_INFO: [&str; 2] = ["start-multi-column", "multi-column-start"];

/// Info strings of a codeblock holding region settings.
pub const SETTINGS_CODEBLOCK_INFO: [&str; 3] =
    ["column-settings", "multi-column-settings", "settings"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceSig {
    Backticks,
    Tildes,
}

/// What a codeblock is for, judged by its info string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceRole {
    RegionStart,
    Settings,
    Content,
}

impl FenceRole {
    pub fn from_info(info: &str) -> Self {
        let info = info.to_ascii_lowercase();
        if START_CODEBLOCK_INFO.contains(&info.as_str()) {
            FenceRole::RegionStart
        } else if SETTINGS_CODEBLOCK_INFO.contains(&info.as_str()) {
            FenceRole::Settings
        } else {
            FenceRole::Content
        }
    }
}

/// Local facts about one line, independent of surrounding lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass {
    Blank,
    /// `=== start-multi-column: KEY`; the key is empty when missing.
    StartTag { key: String },
    EndTag,
    ColumnBreak,
    /// A line that opens or closes a fenced codeblock.
    Fence { sig: FenceSig, role: FenceRole, has_info: bool },
    Text,
}

/// Classifies lines against the multi-column marker syntax.
pub struct MarkerClassifier;

impl MarkerClassifier {
    pub fn classify(&self, line: &LineRef) -> LineClass {
        classify_text(&line.text)
    }
}

pub(crate) fn classify_text(text: &str) -> LineClass {
    if text.trim().is_empty() {
        return LineClass::Blank;
    }
    if let Some(caps) = START_TAG.captures(text) {
        let key = caps.get(1).map_or("", |m| m.as_str()).trim().to_string();
        return LineClass::StartTag { key };
    }
    if END_TAG.is_match(text) {
        return LineClass::EndTag;
    }
    if COLUMN_BREAK.is_match(text) {
        return LineClass::ColumnBreak;
    }
    if let Some(caps) = FENCE.captures(text) {
        let sig = if caps[1].starts_with('`') {
            FenceSig::Backticks
        } else {
            FenceSig::Tildes
        };
        let info = &caps[2];
        return LineClass::Fence {
            sig,
            role: FenceRole::from_info(info),
            has_info: !info.is_empty(),
        };
    }
    LineClass::Text
}
