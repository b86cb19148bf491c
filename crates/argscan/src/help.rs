//! Two-column option listing.

/// Default cap on the width of the option-name column.
pub const DEFAULT_MAX_COLUMN_WIDTH: usize = 40;

/// Layout settings for help rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelpConfig {
    /// Upper bound for the left column, padding included.
    pub max_column_width: usize,
}

impl Default for HelpConfig {
    fn default() -> Self {
        Self {
            max_column_width: DEFAULT_MAX_COLUMN_WIDTH,
        }
    }
}

/// One registration as shown in help: every name it answers to, plus a description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpEntry {
    pub names: Vec<String>,
    pub text: String,
}

impl HelpEntry {
    fn left(&self) -> String {
        self.names
            .iter()
            .map(|name| format!("{}{name}", dashes(name)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn left_width(&self) -> usize {
        let separators = 2 * self.names.len().saturating_sub(1);
        let names: usize = self
            .names
            .iter()
            .map(|name| dashes(name).len() + name.chars().count())
            .sum();
        separators + names
    }
}

fn dashes(name: &str) -> &'static str {
    if name.chars().count() == 1 {
        "-"
    } else {
        "--"
    }
}

/// Render `entries` under an optional `banner`, one line per entry.
pub fn render(banner: &str, entries: &[HelpEntry], config: &HelpConfig) -> String {
    let mut out = String::new();
    if !banner.is_empty() {
        out.push_str(banner);
        out.push('\n');
    }

    let widest = entries.iter().map(HelpEntry::left_width).max().unwrap_or(0);
    let column = (widest + 4).min(config.max_column_width);
    let width = column.saturating_sub(4);

    for entry in entries {
        out.push_str(&format!(
            "  {:width$}  {}\n",
            entry.left(),
            entry.text,
            width = width
        ));
    }
    out
}
