//! Parses the `Key: value` lines of a region settings block.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{ColumnSize, LayoutMode, MAX_COLUMN_COUNT, RegionConfig};

static SETTING_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([^:]+?)\s*:\s*(.*?)\s*$").expect("setting line regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SettingKey {
    Id,
    ColumnCount,
    LargestColumn,
    Border,
    Shadow,
    AutoLayout,
}

impl SettingKey {
    /// Matches keys ignoring case and whitespace, so `Num of Cols`,
    /// `numofcols` and `NUM OF COLS` are the same key.
    fn parse(raw: &str) -> Option<Self> {
        let key: String = raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "id" | "regionid" => Some(SettingKey::Id),
            "numberofcolumns" | "numofcols" | "colcount" => Some(SettingKey::ColumnCount),
            "largestcolumn" | "colsize" | "columnsize" => Some(SettingKey::LargestColumn),
            "border" => Some(SettingKey::Border),
            "shadow" => Some(SettingKey::Shadow),
            "autolayout" | "fluiddiv" => Some(SettingKey::AutoLayout),
            _ => None,
        }
    }
}

fn settings(text: &str) -> impl Iterator<Item = (SettingKey, &str)> {
    text.lines().filter_map(|line| {
        let caps = SETTING_LINE.captures(line)?;
        let key = SettingKey::parse(caps.get(1)?.as_str())?;
        Some((key, caps.get(2)?.as_str()))
    })
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "enabled" => Some(true),
        "off" | "false" | "no" | "disabled" => Some(false),
        _ => None,
    }
}

/// Builds a region config from settings text. Unknown keys and values that
/// do not parse leave the default in place.
pub fn parse_column_settings(text: &str) -> RegionConfig {
    let mut config = RegionConfig::default();
    let mut auto_layout = false;
    let mut largest_column = None;

    for (key, value) in settings(text) {
        match key {
            SettingKey::Id => {}
            SettingKey::ColumnCount => match value.parse::<usize>() {
                Ok(count) if (1..=MAX_COLUMN_COUNT).contains(&count) => {
                    config.column_count = count
                }
                _ => log::debug!("ignoring column count '{value}'"),
            },
            SettingKey::LargestColumn => largest_column = Some(value),
            SettingKey::Border => {
                if let Some(on) = parse_bool(value) {
                    config.draw_border = on;
                }
            }
            SettingKey::Shadow => {
                if let Some(on) = parse_bool(value) {
                    config.draw_shadow = on;
                }
            }
            SettingKey::AutoLayout => auto_layout = parse_bool(value).unwrap_or(auto_layout),
        }
    }

    // Resolved last: `second` depends on the final column count.
    if let Some(size) = largest_column.and_then(|v| ColumnSize::parse(v, config.column_count)) {
        config.largest_column = size;
    }
    config.layout_mode = LayoutMode::for_columns(config.column_count, auto_layout);
    config
}

/// The `ID:` value of a start codeblock, or `""` when it has none.
pub fn parse_region_id(text: &str) -> String {
    settings(text)
        .find(|(key, _)| *key == SettingKey::Id)
        .map(|(_, value)| value.to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_empty_text_gives_defaults() {
        assert_eq!(parse_column_settings(""), RegionConfig::default());
    }

    #[test]
    fn test_full_settings_block() {
        let config = parse_column_settings(
            "ID: ID_ab12\nNumber of Columns: 3\nLargest Column: second\nBorder: off\nShadow: disabled\nAuto Layout: true\n",
        );

        assert_eq!(
            config,
            RegionConfig {
                column_count: 3,
                layout_mode: LayoutMode::AutoBalance,
                draw_border: false,
                draw_shadow: false,
                largest_column: ColumnSize::Center,
            }
        );
    }

    #[rstest]
    #[case("Num of Cols: 4", 4)]
    #[case("col count:3", 3)]
    #[case("NUMBER OF COLUMNS : 1", 1)]
    #[case("Number of Columns: 0", 2)]
    #[case("Number of Columns: many", 2)]
    #[case("Number of Columns: 12", 12)]
    #[case("Number of Columns: 13", 2)]
    #[case("Number of Columns: 100000000000000", 2)]
    fn test_column_count_aliases(#[case] text: &str, #[case] expected: usize) {
        assert_eq!(parse_column_settings(text).column_count, expected);
    }

    #[rstest]
    #[case("Number of Columns: 1\nAuto Layout: on", LayoutMode::SingleColumn)]
    #[case("Number of Columns: 2\nFluid Div: yes", LayoutMode::AutoBalance)]
    #[case("AutoLayout: enabled", LayoutMode::AutoBalance)]
    #[case("Auto Layout: off", LayoutMode::Standard)]
    #[case("Auto Layout: maybe", LayoutMode::Standard)]
    fn test_layout_mode(#[case] text: &str, #[case] expected: LayoutMode) {
        assert_eq!(parse_column_settings(text).layout_mode, expected);
    }

    #[test]
    fn test_largest_column_resolves_against_final_count() {
        // `second` of two columns is the right one, even though the size is
        // given before the count.
        let config = parse_column_settings("Column Size: second\nCol Count: 2");
        assert_eq!(config.largest_column, ColumnSize::Right);
    }

    #[rstest]
    #[case("ID: ID_ab12\nNumber of Columns: 2", "ID_ab12")]
    #[case("Region ID:  spaced  ", "spaced")]
    #[case("Number of Columns: 2", "")]
    #[case("", "")]
    fn test_parse_region_id(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(parse_region_id(text), expected);
    }
}
