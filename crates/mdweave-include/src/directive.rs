//! Include directive parsing.
//!
//! A directive is the text of an include code block, one entry per line:
//!
//! ```text
//! # chapters
//! increase_headers=true
//! chapters/intro.md
//! chapters/usage.md
//! ```

/// One line of a directive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DirectiveEntry {
    /// `#` comment, kept verbatim.
    Comment(String),
    /// Header promotion switch.
    IncreaseHeaders(bool),
    /// File to include.
    Path(String),
}

/// Parsed include directive.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IncludeDirective {
    pub entries: Vec<DirectiveEntry>,
}

impl IncludeDirective {
    /// Parse directive text. Blank lines are dropped; nothing is rejected.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let entries = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(parse_entry)
            .collect();
        Self { entries }
    }

    /// Listed file paths, in order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|entry| match entry {
            DirectiveEntry::Path(path) => Some(path.as_str()),
            _ => None,
        })
    }

    /// Whether header promotion is requested. The last flag line wins.
    #[must_use]
    pub fn increase_headers(&self) -> bool {
        self.entries
            .iter()
            .rev()
            .find_map(|entry| match entry {
                DirectiveEntry::IncreaseHeaders(on) => Some(*on),
                _ => None,
            })
            .unwrap_or(false)
    }

    /// Rewrite every path entry in place.
    pub fn map_paths(&mut self, mut f: impl FnMut(&str) -> String) {
        for entry in &mut self.entries {
            if let DirectiveEntry::Path(path) = entry {
                *path = f(path);
            }
        }
    }

    /// Render back to directive text.
    #[must_use]
    pub fn render(&self) -> String {
        let lines: Vec<String> = self
            .entries
            .iter()
            .map(|entry| match entry {
                DirectiveEntry::Comment(text) | DirectiveEntry::Path(text) => text.clone(),
                DirectiveEntry::IncreaseHeaders(on) => format!("increase_headers={on}"),
            })
            .collect();
        lines.join("\n")
    }
}

fn parse_entry(line: &str) -> DirectiveEntry {
    if line.starts_with('#') {
        return DirectiveEntry::Comment(line.to_owned());
    }
    if let Some((key, value)) = line.split_once('=')
        && is_increase_headers_key(key)
    {
        return DirectiveEntry::IncreaseHeaders(value.trim().eq_ignore_ascii_case("true"));
    }
    DirectiveEntry::Path(line.to_owned())
}

/// Matches `increase_headers`, `Increase_headers`, `increase-headers`, ...
fn is_increase_headers_key(key: &str) -> bool {
    let normalized: String = key
        .trim()
        .chars()
        .filter(|c| !matches!(c, '_' | '-'))
        .map(|c| c.to_ascii_lowercase())
        .collect();
    normalized == "increaseheaders"
}
