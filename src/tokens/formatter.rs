//! Map-based template substitution.
//!
//! `{name}` occurrences are replaced with stored values. Unknown names are
//! kept verbatim by [`TokenFormatter::format`] and erased by
//! [`TokenFormatter::format_strict`]. Delimiters are configurable, e.g.
//! `{{title}}` with `("{{", "}}")`.

use std::collections::HashMap;

/// Template substitutor used by plain-text widgets.
#[derive(Clone, Debug)]
pub struct TokenFormatter {
    values: HashMap<String, String>,
    open: String,
    close: String,
}

impl Default for TokenFormatter {
    fn default() -> Self { Self::new() }
}

impl TokenFormatter {
    /// Formatter with `{` / `}` delimiters.
    pub fn new() -> Self { Self::with_delimiters("{", "}") }

    /// Formatter with custom delimiters. Empty delimiters fall back to braces.
    pub fn with_delimiters(
        open: &str,
        close: &str,
    ) -> Self {
        let (open, close) = if open.is_empty() || close.is_empty() {
            ("{", "}")
        } else {
            (open, close)
        };
        Self {
            values: HashMap::new(),
            open: open.to_owned(),
            close: close.to_owned(),
        }
    }

    pub fn set(
        &mut self,
        name: &str,
        value: impl Into<String>,
    ) {
        self.values.insert(name.to_owned(), value.into());
    }

    pub fn get(
        &self,
        name: &str,
    ) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn clear(&mut self) { self.values.clear(); }

    /// Substitute known names; unknown placeholders stay as written.
    pub fn format(
        &self,
        template: &str,
    ) -> String {
        self.substitute(template, false)
    }

    /// Substitute known names; unknown placeholders are removed.
    pub fn format_strict(
        &self,
        template: &str,
    ) -> String {
        self.substitute(template, true)
    }

    fn substitute(
        &self,
        template: &str,
        strict: bool,
    ) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find(&self.open) {
            out.push_str(&rest[..start]);
            let after_open = &rest[start + self.open.len()..];
            let Some(end) = after_open.find(&self.close) else {
                out.push_str(&rest[start..]);
                return out;
            };
            let name = &after_open[..end];
            let consumed = start + self.open.len() + end + self.close.len();

            if is_valid_name(name) {
                match self.values.get(name) {
                    Some(value) => out.push_str(value),
                    None if strict => {}
                    None => out.push_str(&rest[start..consumed]),
                }
                rest = &rest[consumed..];
            } else {
                // Not a placeholder; emit the opening delimiter and rescan after it.
                out.push_str(&self.open);
                rest = after_open;
            }
        }
        out.push_str(rest);
        out
    }
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
