use crate::models::BlockTag;
use crate::settings::parse_region_id;

use super::classify::{FenceRole, FenceSig, LineClass, classify_text};
use super::lines::LineRef;
use super::{ParsedBlock, ParsedRegion};

#[derive(Debug)]
enum LeafState {
    None,
    Paragraph {
        start: usize,
        lines: Vec<String>,
    },
    Fence {
        sig: FenceSig,
        role: FenceRole,
        start: usize,
        lines: Vec<String>,
    },
}

/// Groups classified lines into regions and regions into blocks.
///
/// Outside a region only start markers matter. Inside one, content is split
/// on blank lines and marker lines become structural blocks of their own.
/// Fenced codeblocks are consumed whole wherever they appear, so their
/// contents are never read as markers.
pub struct RegionBuilder {
    current: Option<ParsedRegion>,
    leaf: LeafState,
    out: Vec<ParsedRegion>,
}

impl RegionBuilder {
    pub fn new() -> Self {
        Self {
            current: None,
            leaf: LeafState::None,
            out: vec![],
        }
    }

    /// A builder that is already inside an unnamed region at line 0, for
    /// parsing a region body on its own.
    pub fn in_region() -> Self {
        let mut builder = Self::new();
        builder.open_region(String::new(), 0, None);
        builder
    }

    pub fn push(&mut self, line: &LineRef, class: &LineClass) {
        if matches!(self.leaf, LeafState::Fence { .. }) {
            self.consume_fence_line(line, class);
            return;
        }

        match class {
            LineClass::Blank => self.flush_paragraph(),
            LineClass::StartTag { key } => {
                self.close_region(None);
                self.open_region(key.clone(), line.number, None);
                self.push_marker(BlockTag::RegionStart, line);
            }
            LineClass::Fence { sig, role, .. } => {
                self.flush_paragraph();
                self.leaf = LeafState::Fence {
                    sig: *sig,
                    role: *role,
                    start: line.number,
                    lines: vec![line.text.clone()],
                };
            }
            _ if self.current.is_none() => {}
            LineClass::EndTag => {
                self.push_marker(BlockTag::RegionEnd, line);
                self.close_region(Some(line.number));
            }
            LineClass::ColumnBreak => self.push_marker(BlockTag::ColumnBreak, line),
            LineClass::Text => self.extend_paragraph(line),
        }
    }

    pub fn finish(mut self) -> Vec<ParsedRegion> {
        self.flush_paragraph();
        self.flush_fence();
        self.close_region(None);
        self.out
    }

    fn open_region(&mut self, key: String, start_line: usize, settings_text: Option<String>) {
        self.current = Some(ParsedRegion {
            key,
            start_line,
            end_line: None,
            settings_text,
            blocks: vec![],
        });
    }

    fn close_region(&mut self, end_line: Option<usize>) {
        self.flush_paragraph();
        if let Some(mut region) = self.current.take() {
            region.end_line = end_line;
            self.out.push(region);
        }
    }

    fn push_marker(&mut self, tag: BlockTag, line: &LineRef) {
        self.flush_paragraph();
        self.push_block(ParsedBlock::new(tag, vec![line.text.clone()]).at_line(line.number));
    }

    fn push_block(&mut self, block: ParsedBlock) {
        if let Some(region) = self.current.as_mut() {
            region.blocks.push(block);
        }
    }

    fn extend_paragraph(&mut self, line: &LineRef) {
        match &mut self.leaf {
            LeafState::Paragraph { lines, .. } => lines.push(line.text.clone()),
            _ => {
                self.leaf = LeafState::Paragraph {
                    start: line.number,
                    lines: vec![line.text.clone()],
                }
            }
        }
    }

    fn consume_fence_line(&mut self, line: &LineRef, class: &LineClass) {
        let LeafState::Fence { sig, lines, .. } = &mut self.leaf else {
            return;
        };
        let closes = matches!(
            class,
            LineClass::Fence { sig: close, has_info: false, .. } if close == sig
        );
        lines.push(line.text.clone());
        if closes {
            self.flush_fence();
        }
    }

    fn flush_paragraph(&mut self) {
        let prev = std::mem::replace(&mut self.leaf, LeafState::None);
        match prev {
            LeafState::Paragraph { start, lines } => {
                self.push_block(ParsedBlock::new(BlockTag::None, lines).at_line(start));
            }
            other => self.leaf = other,
        }
    }

    fn flush_fence(&mut self) {
        let prev = std::mem::replace(&mut self.leaf, LeafState::None);
        let LeafState::Fence {
            role, start, lines, ..
        } = prev
        else {
            self.leaf = prev;
            return;
        };

        match role {
            FenceRole::RegionStart => {
                let body = fence_body(&lines);
                self.close_region(None);
                self.open_region(parse_region_id(&body), start, Some(body));
                self.push_block(ParsedBlock::new(BlockTag::RegionStart, lines).at_line(start));
            }
            FenceRole::Settings => {
                if let Some(region) = self.current.as_mut() {
                    region.settings_text = Some(fence_body(&lines));
                }
                self.push_block(ParsedBlock::new(BlockTag::RegionSettings, lines).at_line(start));
            }
            FenceRole::Content => {
                if !lines.is_empty() {
                    self.push_block(ParsedBlock::new(BlockTag::None, lines).at_line(start));
                }
            }
        }
    }
}

impl Default for RegionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Lines between the opening and closing fence.
fn fence_body(lines: &[String]) -> String {
    let closed = lines.len() > 1
        && lines.last().is_some_and(|last| {
            matches!(classify_text(last), LineClass::Fence { has_info: false, .. })
        });
    let end = if closed { lines.len() - 1 } else { lines.len() };
    lines.get(1..end).unwrap_or_default().join("\n")
}
