use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::layout::{ColumnStyle, ColumnSurface, RenderTarget};
use crate::models::Height;

use super::renderer::{LineStyle, TextLine, TextNode};

/// Splits `text` into rows no wider than `width` display cells.
///
/// Prose wraps at spaces; words longer than a row, and code, are cut at the
/// cell boundary. Always returns at least one row.
pub fn wrap_line(text: &str, width: usize, style: LineStyle) -> Vec<String> {
    let width = width.max(1);
    if UnicodeWidthStr::width(text) <= width {
        return vec![text.to_string()];
    }
    if style == LineStyle::Code {
        return hard_wrap(text, width);
    }

    let mut rows = Vec::new();
    let mut row = String::new();
    let mut row_width = 0;
    for word in text.split(' ').filter(|w| !w.is_empty()) {
        let word_width = UnicodeWidthStr::width(word);
        let needed = if row.is_empty() { word_width } else { row_width + 1 + word_width };
        if needed <= width {
            if !row.is_empty() {
                row.push(' ');
            }
            row.push_str(word);
            row_width = needed;
            continue;
        }
        if !row.is_empty() {
            rows.push(std::mem::take(&mut row));
        }
        if word_width <= width {
            row.push_str(word);
            row_width = word_width;
        } else {
            let mut pieces = hard_wrap(word, width);
            let last = pieces.pop().unwrap_or_default();
            rows.extend(pieces);
            row_width = UnicodeWidthStr::width(last.as_str());
            row = last;
        }
    }
    if !row.is_empty() || rows.is_empty() {
        rows.push(row);
    }
    rows
}

fn hard_wrap(text: &str, width: usize) -> Vec<String> {
    let mut rows = Vec::new();
    let mut row = String::new();
    let mut row_width = 0;
    for ch in text.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if row_width + w > width && !row.is_empty() {
            rows.push(std::mem::take(&mut row));
            row_width = 0;
        }
        row.push(ch);
        row_width += w;
    }
    rows.push(row);
    rows
}

/// One attached node and the rows it wrapped to.
#[derive(Debug, Clone)]
struct Placed {
    node: TextNode,
    rows: Vec<TextLine>,
}

/// A fixed-width column of wrapped text. Each attached block is followed by
/// `gap` blank rows.
#[derive(Debug, Clone)]
pub struct TextColumn {
    width: u16,
    gap: u16,
    children: Vec<Placed>,
}

impl TextColumn {
    pub fn new(width: u16, gap: u16) -> Self {
        Self {
            width,
            gap,
            children: Vec::new(),
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn nodes(&self) -> impl Iterator<Item = &TextNode> {
        self.children.iter().map(|p| &p.node)
    }

    /// Every display row, gaps included, top to bottom.
    pub fn rows(&self) -> Vec<TextLine> {
        let gap = TextLine {
            text: String::new(),
            style: LineStyle::Plain,
        };
        self.children
            .iter()
            .flat_map(|p| {
                p.rows
                    .iter()
                    .cloned()
                    .chain(std::iter::repeat_n(gap.clone(), self.gap as usize))
            })
            .collect()
    }

    fn wrap(&self, node: &TextNode) -> Vec<TextLine> {
        node.lines()
            .iter()
            .flat_map(|line| {
                wrap_line(&line.text, self.width as usize, line.style)
                    .into_iter()
                    .map(|text| TextLine {
                        text,
                        style: line.style,
                    })
            })
            .collect()
    }

    fn placed_height(&self, placed: &Placed) -> Height {
        placed.rows.len() as Height + Height::from(self.gap)
    }
}

impl ColumnSurface for TextColumn {
    type Node = TextNode;

    fn attach(&mut self, node: TextNode) -> Height {
        let rows = self.wrap(&node);
        let placed = Placed { node, rows };
        let height = self.placed_height(&placed);
        self.children.push(placed);
        height
    }

    fn detach_last(&mut self) -> Option<TextNode> {
        self.children.pop().map(|p| p.node)
    }

    fn clear(&mut self) {
        self.children.clear();
    }

    fn len(&self) -> usize {
        self.children.len()
    }

    fn height(&self) -> Height {
        self.children.iter().map(|p| self.placed_height(p)).sum()
    }
}

/// The columns of one region, sharing a fixed total width.
#[derive(Debug, Clone)]
pub struct TextTarget {
    width: u16,
    gutter: u16,
    gap: u16,
    style: Option<ColumnStyle>,
    columns: Vec<TextColumn>,
}

impl TextTarget {
    pub fn new(width: u16) -> Self {
        Self {
            width,
            gutter: 1,
            gap: 1,
            style: None,
            columns: Vec::new(),
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    /// Changes the total width. Takes effect on the next layout.
    pub fn set_width(&mut self, width: u16) {
        self.width = width;
    }

    /// Style of the current columns; `None` before the first layout.
    pub fn style(&self) -> Option<&ColumnStyle> {
        self.style.as_ref()
    }

    pub fn gutter(&self) -> u16 {
        self.gutter
    }

    /// Content width of each column: the total width minus gutters, split by
    /// ratio, minus two cells per column for borders.
    pub fn column_widths(&self, style: &ColumnStyle) -> Vec<u16> {
        let count = style.width_ratios.len().max(1) as u32;
        let gutters = u32::from(self.gutter) * (count - 1);
        let available = u32::from(self.width).saturating_sub(gutters);
        let border = if style.draw_border { 2 } else { 0 };
        style
            .width_ratios
            .iter()
            .map(|ratio| {
                let outer = available * u32::from(*ratio) / 100;
                (outer.saturating_sub(border).max(1)).min(u32::from(u16::MAX)) as u16
            })
            .collect()
    }
}

impl RenderTarget for TextTarget {
    type Column = TextColumn;

    fn recreate_columns(&mut self, count: usize, style: &ColumnStyle) {
        let mut style = style.clone();
        if style.width_ratios.len() != count {
            let share = (100 / count.max(1)) as u16;
            style.width_ratios = vec![share; count];
        }
        self.columns = self
            .column_widths(&style)
            .into_iter()
            .take(count)
            .map(|width| TextColumn::new(width, self.gap))
            .collect();
        self.style = Some(style);
    }

    fn columns(&self) -> &[TextColumn] {
        &self.columns
    }

    fn columns_mut(&mut self) -> &mut [TextColumn] {
        &mut self.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Renderer;
    use crate::plain_text::PlainTextRenderer;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("short", 10, vec!["short"])]
    #[case("the quick brown fox", 9, vec!["the quick", "brown fox"])]
    #[case("a verylongword b", 5, vec!["a", "veryl", "ongwo", "rd b"])]
    #[case("", 4, vec![""])]
    #[case("日本語テキスト", 6, vec!["日本語", "テキス", "ト"])]
    fn test_wrap_prose(#[case] text: &str, #[case] width: usize, #[case] expected: Vec<&str>) {
        assert_eq!(wrap_line(text, width, LineStyle::Plain), expected);
    }

    #[test]
    fn test_code_is_cut_not_word_wrapped() {
        assert_eq!(
            wrap_line("let x = 1;", 4, LineStyle::Code),
            vec!["let ", "x = ", "1;"]
        );
    }

    #[test]
    fn test_attach_measures_wrapped_rows_plus_gap() {
        let mut renderer = PlainTextRenderer::new();
        let mut column = TextColumn::new(10, 1);

        let height = column.attach(renderer.render("one two three four"));

        assert_eq!(height, 3);
        assert_eq!(column.height(), 3);
        assert_eq!(
            column.rows().iter().map(|r| r.text.as_str()).collect::<Vec<_>>(),
            vec!["one two", "three four", ""]
        );
        assert!(column.detach_last().is_some());
        assert_eq!(column.height(), 0);
    }

    #[test]
    fn test_narrower_column_is_taller() {
        let mut renderer = PlainTextRenderer::new();
        let node = renderer.render("one two three four five six");

        let wide = TextColumn::new(40, 0).attach(node.clone());
        let narrow = TextColumn::new(8, 0).attach(node);

        assert!(narrow > wide);
    }

    #[test]
    fn test_target_splits_width_by_ratio() {
        let mut target = TextTarget::new(101);
        let style = ColumnStyle {
            draw_border: true,
            draw_shadow: false,
            width_ratios: vec![75, 25],
        };

        target.recreate_columns(2, &style);

        let widths: Vec<u16> = target.columns().iter().map(TextColumn::width).collect();
        assert_eq!(widths, vec![73, 23]);
        assert_eq!(target.style(), Some(&style));
    }

    #[test]
    fn test_recreate_drops_old_columns() {
        let mut renderer = PlainTextRenderer::new();
        let mut target = TextTarget::new(40);
        let style = ColumnStyle {
            draw_border: false,
            draw_shadow: false,
            width_ratios: vec![50, 50],
        };
        target.recreate_columns(2, &style);
        target.columns_mut()[0].attach(renderer.render("a"));

        target.recreate_columns(2, &style);

        assert!(target.columns().iter().all(|c| c.is_empty()));
    }

    #[test]
    fn test_mismatched_ratios_fall_back_to_equal_shares() {
        let mut target = TextTarget::new(30);
        let style = ColumnStyle {
            draw_border: false,
            draw_shadow: false,
            width_ratios: vec![100],
        };

        target.recreate_columns(3, &style);

        assert_eq!(target.columns().len(), 3);
        assert_eq!(target.style().map(|s| s.width_ratios.clone()), Some(vec![33, 33, 33]));
    }
}
