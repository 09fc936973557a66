//! Whitespace normalisation for generated files.

use serde_json::Value;
use tracing::{debug, instrument, warn};

use monoforge_core::{
    application::{VirtualTree, ports::Formatter},
    domain::RelativePath,
    error::ForgeResult,
};

const FORMATTED_EXTENSIONS: &[&str] = &[
    "ts", "tsx", "js", "mjs", "cjs", "jsx", "json", "css", "scss", "html", "md",
];

/// Formatter that needs no external tooling.
///
/// - `.json` files are re-serialised with two-space indentation
/// - trailing whitespace is stripped from every line
/// - files end with exactly one newline
///
/// Files with other extensions are left alone.
#[derive(Debug, Clone, Default)]
pub struct BasicFormatter;

impl BasicFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Formatted content of `path`, or `None` when it is not a supported type.
    pub fn format_text(&self, path: &RelativePath, content: &str) -> Option<String> {
        let extension = path.file_name()?.rsplit_once('.')?.1;
        if !FORMATTED_EXTENSIONS.contains(&extension) {
            return None;
        }

        let body = if extension == "json" {
            match serde_json::from_str::<Value>(content) {
                Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| content.to_string()),
                Err(e) => {
                    warn!(path = %path, error = %e, "not valid JSON; normalising whitespace only");
                    content.to_string()
                }
            }
        } else {
            content.to_string()
        };

        let mut out = body
            .lines()
            .map(str::trim_end)
            .collect::<Vec<_>>()
            .join("\n")
            .trim_end_matches('\n')
            .to_string();
        out.push('\n');
        Some(out)
    }
}

impl Formatter for BasicFormatter {
    #[instrument(skip_all, fields(files = files.len()))]
    fn format(&self, tree: &mut VirtualTree, files: &[RelativePath]) -> ForgeResult<usize> {
        let mut changed = 0;
        for path in files {
            let Some(current) = tree.read_optional(path)? else {
                continue;
            };
            let Some(formatted) = self.format_text(path, &current) else {
                continue;
            };
            if formatted != current {
                debug!(path = %path, "formatted");
                tree.write(path, formatted)?;
                changed += 1;
            }
        }
        Ok(changed)
    }
}
