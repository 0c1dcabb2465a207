//! Format-string tokenizer for composite widgets.
//!
//! Grammar:
//!
//! ```text
//! token := '{' name (':' param)? '}'
//! name  := [A-Za-z_][A-Za-z0-9_]*
//! param := [^}]*
//! ```
//!
//! Text between tokens becomes [`TokenKind::Literal`]. A widget-supplied
//! classifier maps each name to a kind; names it reports as `Literal` are
//! kept as literal text with the braces removed. Every token remembers its
//! source slice, so concatenating [`Token::raw`] over the output gives back
//! the input string.

/// Classification of a parsed token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Literal,
    Text,
    Icon,
    Shape,
}

/// One element of a parsed format string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Placeholder name; for literals, the text to draw.
    pub name: String,
    pub param: Option<String>,
    raw: String,
}

impl Token {
    /// Plain literal run.
    pub fn literal(text: &str) -> Self {
        Self {
            kind: TokenKind::Literal,
            name: text.to_owned(),
            param: None,
            raw: text.to_owned(),
        }
    }

    /// Source text this token was parsed from.
    #[inline]
    pub fn raw(&self) -> &str { &self.raw }

    /// Drawable text of a literal token.
    #[inline]
    pub fn text(&self) -> &str { &self.name }

    /// Parameter parsed as an integer (e.g. `{battery:20}` → 20).
    pub fn param_int(&self) -> Option<i32> { self.param.as_deref().and_then(|p| p.trim().parse().ok()) }

    #[inline]
    pub fn is(
        &self,
        kind: TokenKind,
        name: &str,
    ) -> bool {
        self.kind == kind && self.name == name
    }
}

/// Length in bytes of a valid name at the start of `s`, if any.
fn name_len(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    match bytes.first() {
        Some(b) if b.is_ascii_alphabetic() || *b == b'_' => {}
        _ => return None,
    }
    Some(
        bytes
            .iter()
            .position(|b| !(b.is_ascii_alphanumeric() || *b == b'_'))
            .unwrap_or(bytes.len()),
    )
}

/// Try to read one `{name}` / `{name:param}` token at the start of `s`.
///
/// Returns `(name, param, consumed_bytes)`.
fn read_token(s: &str) -> Option<(&str, Option<&str>, usize)> {
    let rest = s.strip_prefix('{')?;
    let n = name_len(rest)?;
    let name = &rest[..n];
    let after = &rest[n..];
    if after.starts_with('}') {
        return Some((name, None, n + 2));
    }
    let param_src = after.strip_prefix(':')?;
    let close = param_src.find('}')?;
    Some((name, Some(&param_src[..close]), n + close + 3))
}

/// Parse `format` into tokens using `classify` for placeholder names.
pub fn parse_format_tokens<F>(
    format: &str,
    classify: F,
) -> Vec<Token>
where
    F: Fn(&str) -> TokenKind,
{
    let mut tokens = Vec::new();
    let mut literal_start = 0;
    let mut i = 0;

    while i < format.len() {
        let Some(offset) = format[i..].find('{') else {
            break;
        };
        let at = i + offset;
        match read_token(&format[at..]) {
            Some((name, param, consumed)) => {
                if at > literal_start {
                    tokens.push(Token::literal(&format[literal_start..at]));
                }
                let raw = &format[at..at + consumed];
                let kind = classify(name);
                let token = if kind == TokenKind::Literal {
                    let text = &raw[1..raw.len() - 1];
                    Token {
                        kind,
                        name: text.to_owned(),
                        param: None,
                        raw: raw.to_owned(),
                    }
                } else {
                    Token {
                        kind,
                        name: name.to_owned(),
                        param: param.map(str::to_owned),
                        raw: raw.to_owned(),
                    }
                };
                tokens.push(token);
                i = at + consumed;
                literal_start = i;
            }
            None => {
                i = at + 1;
            }
        }
    }

    if literal_start < format.len() {
        tokens.push(Token::literal(&format[literal_start..]));
    }
    tokens
}
