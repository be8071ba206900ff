use std::rc::Rc;

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::layout::{Renderer, StructuralClassifier, TaskListFixup};

const OPEN_TASK: &str = "[ ] ";
const DONE_TASK: &str = "[x] ";
const OPEN_TASK_READ_ONLY: &str = "☐ ";
const DONE_TASK_READ_ONLY: &str = "☑ ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Plain,
    Heading(u8),
    Code,
    Quote,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLine {
    pub text: String,
    pub style: LineStyle,
}

impl TextLine {
    fn new(text: impl Into<String>, style: LineStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// A rendered markdown fragment: unwrapped display lines plus the facts the
/// layout engine asks about.
///
/// Lines are shared, so cloning a node is cheap; [`Renderer::duplicate`] makes
/// an independent copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextNode {
    lines: Rc<[TextLine]>,
    starts_with_heading: bool,
    has_tasks: bool,
}

impl TextNode {
    pub fn lines(&self) -> &[TextLine] {
        &self.lines
    }

    pub fn plain_text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Renders markdown fragments with pulldown-cmark.
#[derive(Debug, Default)]
pub struct PlainTextRenderer {
    rendered: usize,
}

impl PlainTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fragments rendered so far.
    pub fn rendered_count(&self) -> usize {
        self.rendered
    }
}

#[derive(Default)]
struct LineBuilder {
    out: Vec<TextLine>,
    current: String,
    style: Option<LineStyle>,
    lists: Vec<Option<u64>>,
    quote_depth: usize,
    in_code: bool,
    starts_with_heading: Option<bool>,
    has_tasks: bool,
}

impl LineBuilder {
    fn style(&self) -> LineStyle {
        match self.style {
            Some(style) => style,
            None if self.quote_depth > 0 => LineStyle::Quote,
            None => LineStyle::Plain,
        }
    }

    fn prefix(&self) -> String {
        "> ".repeat(self.quote_depth)
    }

    fn flush(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let text = format!("{}{}", self.prefix(), std::mem::take(&mut self.current));
        let style = self.style();
        self.out.push(TextLine::new(text, style));
    }

    fn push_code(&mut self, text: &str) {
        for line in text.lines() {
            let text = format!("{}{line}", self.prefix());
            self.out.push(TextLine::new(text, LineStyle::Code));
        }
    }

    fn first_block(&mut self, heading: bool) {
        self.starts_with_heading.get_or_insert(heading);
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                self.flush();
                self.first_block(true);
                self.style = Some(LineStyle::Heading(heading_level(level)));
            }
            Event::End(TagEnd::Heading(_)) => {
                self.flush();
                self.style = None;
            }
            Event::Start(Tag::Paragraph) => self.first_block(false),
            Event::End(TagEnd::Paragraph) => self.flush(),
            Event::Start(Tag::List(start)) => {
                self.flush();
                self.first_block(false);
                self.lists.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                self.flush();
                self.lists.pop();
            }
            Event::Start(Tag::Item) => {
                self.flush();
                let depth = self.lists.len().saturating_sub(1);
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => "- ".to_string(),
                };
                self.current = format!("{}{marker}", "  ".repeat(depth));
            }
            Event::End(TagEnd::Item) => self.flush(),
            Event::TaskListMarker(done) => {
                self.has_tasks = true;
                self.current
                    .push_str(if done { DONE_TASK } else { OPEN_TASK });
            }
            Event::Start(Tag::CodeBlock(_)) => {
                self.flush();
                self.first_block(false);
                self.in_code = true;
            }
            Event::End(TagEnd::CodeBlock) => self.in_code = false,
            Event::Start(Tag::BlockQuote(_)) => {
                self.flush();
                self.first_block(false);
                self.quote_depth += 1;
            }
            Event::End(TagEnd::BlockQuote(_)) => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }
            Event::Text(text) if self.in_code => self.push_code(&text),
            Event::Text(text) | Event::Code(text) | Event::Html(text) | Event::InlineHtml(text) => {
                self.current.push_str(&text)
            }
            Event::SoftBreak => self.current.push(' '),
            Event::HardBreak => self.flush(),
            Event::Rule => {
                self.flush();
                self.first_block(false);
                self.out.push(TextLine::new("───", LineStyle::Plain));
            }
            _ => {}
        }
    }

    fn finish(mut self) -> TextNode {
        self.flush();
        TextNode {
            lines: self.out.into(),
            starts_with_heading: self.starts_with_heading.unwrap_or(false),
            has_tasks: self.has_tasks,
        }
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

impl Renderer for PlainTextRenderer {
    type Node = TextNode;

    fn render(&mut self, source: &str) -> TextNode {
        self.rendered += 1;
        let options = Options::ENABLE_TASKLISTS | Options::ENABLE_STRIKETHROUGH;
        let mut builder = LineBuilder::default();
        for event in Parser::new_ext(source, options) {
            builder.handle(event);
        }
        builder.finish()
    }

    fn duplicate(&mut self, node: &TextNode) -> TextNode {
        TextNode {
            lines: node.lines.iter().cloned().collect(),
            ..node.clone()
        }
    }
}

impl StructuralClassifier for PlainTextRenderer {
    fn is_heading(&self, node: &TextNode) -> bool {
        node.starts_with_heading
    }

    fn is_task_list(&self, node: &TextNode) -> bool {
        node.has_tasks
    }
}

impl TaskListFixup for PlainTextRenderer {
    /// Display copies show checkboxes as read-only glyphs; anything else gets
    /// the editable `[ ]` form back.
    fn fixup(&mut self, node: &mut TextNode, for_display_copy: bool) {
        let swaps = if for_display_copy {
            [(OPEN_TASK, OPEN_TASK_READ_ONLY), (DONE_TASK, DONE_TASK_READ_ONLY)]
        } else {
            [(OPEN_TASK_READ_ONLY, OPEN_TASK), (DONE_TASK_READ_ONLY, DONE_TASK)]
        };
        node.lines = node
            .lines
            .iter()
            .map(|line| {
                let text = swaps
                    .iter()
                    .fold(line.text.clone(), |text, (from, to)| text.replacen(from, to, 1));
                TextLine::new(text, line.style)
            })
            .collect();
    }
}
