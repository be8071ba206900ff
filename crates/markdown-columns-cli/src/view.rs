use markdown_columns_engine::RenderTarget;
use markdown_columns_engine::plain_text::{LineStyle, TextLine, TextTarget};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use unicode_width::UnicodeWidthStr;

fn style_for(style: LineStyle) -> Style {
    match style {
        LineStyle::Plain => Style::default(),
        LineStyle::Heading(1) => Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        LineStyle::Heading(_) => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        LineStyle::Code => Style::default().fg(Color::Yellow),
        LineStyle::Quote => Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
    }
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(UnicodeWidthStr::width(text));
    format!("{text}{}", " ".repeat(fill))
}

fn title_line(key: &str) -> Line<'static> {
    let title = if key.is_empty() { "(no id)" } else { key };
    Line::from(Span::styled(
        format!("── {title} ──"),
        Style::default().fg(Color::DarkGray),
    ))
}

/// The region's columns merged side by side into terminal lines.
pub fn region_lines(key: &str, target: &TextTarget) -> Vec<Line<'static>> {
    let border = target.style().is_some_and(|s| s.draw_border);
    let gutter = " ".repeat(target.gutter() as usize);
    let columns: Vec<(usize, Vec<TextLine>)> = target
        .columns()
        .iter()
        .map(|c| (c.width() as usize, c.rows()))
        .collect();
    let height = columns.iter().map(|(_, rows)| rows.len()).max().unwrap_or(0);
    let edge = Style::default().fg(Color::DarkGray);

    let mut lines = vec![title_line(key)];
    let frame_line = |left: &str, right: &str| {
        let mut spans = Vec::new();
        for (i, (width, _)) in columns.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(gutter.clone()));
            }
            spans.push(Span::styled(
                format!("{left}{}{right}", "─".repeat(*width)),
                edge,
            ));
        }
        Line::from(spans)
    };

    if border {
        lines.push(frame_line("┌", "┐"));
    }
    for row in 0..height {
        let mut spans = Vec::new();
        for (i, (width, rows)) in columns.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(gutter.clone()));
            }
            if border {
                spans.push(Span::styled("│", edge));
            }
            match rows.get(row) {
                Some(line) => {
                    spans.push(Span::styled(pad(&line.text, *width), style_for(line.style)))
                }
                None => spans.push(Span::raw(" ".repeat(*width))),
            }
            if border {
                spans.push(Span::styled("│", edge));
            }
        }
        lines.push(Line::from(spans));
    }
    if border {
        lines.push(frame_line("└", "┘"));
    }
    lines
}

/// A region that could not be created, shown as its error message.
pub fn error_lines(key: &str, message: &str) -> Vec<Line<'static>> {
    let style = Style::default().fg(Color::Red);
    std::iter::once(title_line(key))
        .chain(
            message
                .lines()
                .map(|l| Line::from(Span::styled(l.to_string(), style))),
        )
        .collect()
}
