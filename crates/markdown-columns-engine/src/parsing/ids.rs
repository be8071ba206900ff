//! Repairs start markers that carry no region id.

use uuid::Uuid;

use crate::settings::parse_region_id;

use super::classify::{FenceRole, LineClass, classify_text};

/// Result of [`fix_missing_ids`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedIds {
    pub text: String,
    /// Number of start markers that received an id.
    pub updated: usize,
}

/// A fresh id of the form `ID_xxxx`.
pub fn random_region_id() -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    format!("ID_{}", &uuid[..4])
}

/// Gives every keyless start marker in `text` an id from `next_id`.
///
/// Start tags get `: <id>` appended (replacing a dangling `:`); start
/// codeblocks without an `ID:` line get one inserted after the opening fence.
/// Everything else, line endings included, is left as it was.
pub fn fix_missing_ids(text: &str, mut next_id: impl FnMut() -> String) -> FixedIds {
    let mut out: Vec<String> = Vec::new();
    let mut updated = 0;
    // Index in `out` of an open start codeblock's opening fence.
    let mut start_fence: Option<usize> = None;
    let mut in_fence = false;

    for line in text.split_inclusive('\n') {
        let (content, ending) = split_ending(line);
        let class = classify_text(content);

        if in_fence {
            out.push(line.to_string());
            if matches!(class, LineClass::Fence { has_info: false, .. }) {
                in_fence = false;
                if let Some(open) = start_fence.take() {
                    let body: Vec<&str> = out[open + 1..out.len() - 1]
                        .iter()
                        .map(|l| split_ending(l).0)
                        .collect();
                    if parse_region_id(&body.join("\n")).is_empty() {
                        let ending = split_ending(&out[open]).1;
                        let ending = if ending.is_empty() { "\n" } else { ending };
                        out.insert(open + 1, format!("ID: {}{ending}", next_id()));
                        updated += 1;
                    }
                }
            }
            continue;
        }

        match class {
            LineClass::StartTag { key } if key.is_empty() => {
                let trimmed = content.trim_end();
                let trimmed = trimmed.strip_suffix(':').unwrap_or(trimmed).trim_end();
                out.push(format!("{trimmed}: {}{ending}", next_id()));
                updated += 1;
            }
            LineClass::Fence { role, .. } => {
                in_fence = true;
                if role == FenceRole::RegionStart {
                    start_fence = Some(out.len());
                }
                out.push(line.to_string());
            }
            _ => out.push(line.to_string()),
        }
    }

    if updated > 0 {
        log::debug!("assigned {updated} missing region id(s)");
    }

    FixedIds {
        text: out.concat(),
        updated,
    }
}

fn split_ending(line: &str) -> (&str, &str) {
    let content = line.trim_end_matches(['\r', '\n']);
    (content, &line[content.len()..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;

    fn counter() -> impl FnMut() -> String {
        let mut n = 0;
        move || {
            n += 1;
            format!("ID_{n:04}")
        }
    }

    #[test]
    fn test_random_id_shape() {
        let id = random_region_id();
        assert_eq!(id.len(), 7);
        assert!(id.starts_with("ID_"));
        assert_ne!(random_region_id(), random_region_id());
    }

    #[test]
    fn test_fixes_tags_and_codeblocks() {
        let text = "=== start-multi-column\na\n=== end-multi-column\n\
                    === multi-column-start:   \n\
                    === start-multi-column: keep\n\
                    ```start-multi-column\nNumber of Columns: 2\n```\n\
                    ```multi-column-start\nID: ID_have\n```\n";

        let fixed = fix_missing_ids(text, counter());

        assert_eq!(fixed.updated, 3);
        assert_snapshot!(fixed.text.trim_end(), @r"
        === start-multi-column: ID_0001
        a
        === end-multi-column
        === multi-column-start: ID_0002
        === start-multi-column: keep
        ```start-multi-column
        ID: ID_0003
        Number of Columns: 2
        ```
        ```multi-column-start
        ID: ID_have
        ```
        ");
    }

    #[test]
    fn test_leaves_codeblock_contents_and_line_endings_alone() {
        let text = "```md\r\n=== start-multi-column\r\n```\r\n";

        let fixed = fix_missing_ids(text, counter());

        assert_eq!(fixed.updated, 0);
        assert_eq!(fixed.text, text);
    }

    #[test]
    fn test_keeps_crlf_on_fixed_lines() {
        let fixed = fix_missing_ids("=== start-multi-column:\r\nx", counter());
        assert_eq!(fixed.text, "=== start-multi-column: ID_0001\r\nx");
    }
}
