use serde::{Deserialize, Serialize};

use crate::layout::ColumnStyle;

/// Most columns a region may ask for; larger counts in settings are ignored.
pub const MAX_COLUMN_COUNT: usize = 12;

/// Which layout strategy renders a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LayoutMode {
    #[default]
    Standard,
    SingleColumn,
    AutoBalance,
}

impl LayoutMode {
    /// Picks the mode for a parsed column count: one column always wins over
    /// the auto-layout flag.
    pub fn for_columns(column_count: usize, auto_layout: bool) -> Self {
        if column_count <= 1 {
            LayoutMode::SingleColumn
        } else if auto_layout {
            LayoutMode::AutoBalance
        } else {
            LayoutMode::Standard
        }
    }
}

/// Which column, if any, gets the larger share of the region width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColumnSize {
    #[default]
    Standard,
    Left,
    Center,
    Right,
}

impl ColumnSize {
    /// Parses the value of a `Largest Column:` setting.
    ///
    /// `second` means the middle column of three but the right column of two,
    /// so it is resolved against the column count.
    pub fn parse(value: &str, column_count: usize) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "standard" | "even" | "equal" => Some(ColumnSize::Standard),
            "left" | "first" => Some(ColumnSize::Left),
            "center" | "middle" => Some(ColumnSize::Center),
            "second" if column_count >= 3 => Some(ColumnSize::Center),
            "right" | "last" | "third" | "second" => Some(ColumnSize::Right),
            _ => None,
        }
    }

    /// Percentage widths for `column_count` columns.
    pub fn width_ratios(self, column_count: usize) -> Vec<u16> {
        match (column_count, self) {
            (2, ColumnSize::Left) => vec![75, 25],
            (2, ColumnSize::Right) => vec![25, 75],
            (3, ColumnSize::Left) => vec![50, 25, 25],
            (3, ColumnSize::Center) => vec![25, 50, 25],
            (3, ColumnSize::Right) => vec![25, 25, 50],
            (count, _) => {
                let count = count.max(1);
                vec![(100 / count) as u16; count]
            }
        }
    }
}

/// Per-region layout settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionConfig {
    pub column_count: usize,
    pub layout_mode: LayoutMode,
    pub draw_border: bool,
    pub draw_shadow: bool,
    pub largest_column: ColumnSize,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            column_count: 2,
            layout_mode: LayoutMode::Standard,
            draw_border: true,
            draw_shadow: true,
            largest_column: ColumnSize::Standard,
        }
    }
}

impl RegionConfig {
    /// Number of column containers a layout pass creates.
    pub fn effective_column_count(&self) -> usize {
        match self.layout_mode {
            LayoutMode::SingleColumn => 1,
            _ => self.column_count.clamp(1, MAX_COLUMN_COUNT),
        }
    }

    pub fn column_style(&self) -> ColumnStyle {
        ColumnStyle {
            draw_border: self.draw_border,
            draw_shadow: self.draw_shadow,
            width_ratios: self
                .largest_column
                .width_ratios(self.effective_column_count()),
        }
    }
}
