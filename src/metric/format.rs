//! printf-style number formatting for metric text.
//!
//! Supported conversions: `%f`, `%d`/`%i`, `%e`, `%g`, `%s` and `%%`, with
//! flags `-`, `0`, `+`, space, a width and a precision (`%5.1f`, `%-4d`).
//! Each conversion consumes the next value; missing values format as 0.
//! Anything else is copied through unchanged.

/// Upper bound for a directive's width and precision.
const MAX_FIELD: usize = 64;

/// Parsed `%[flags][width][.precision]conv` directive.
#[derive(Clone, Copy, Debug, Default)]
struct Spec {
    left: bool,
    zero: bool,
    plus: bool,
    space: bool,
    width: usize,
    precision: Option<usize>,
}

/// Format `values` through `format`.
pub fn format_values(
    format: &str,
    values: &[f64],
) -> String {
    format_values_with_suffixes(format, values, &[])
}

/// Like [`format_values`], appending `suffixes[i]` right after the `i`-th
/// conversion.
pub fn format_values_with_suffixes(
    format: &str,
    values: &[f64],
    suffixes: &[&str],
) -> String {
    let mut out = String::with_capacity(format.len() + 8);
    let mut chars = format.chars().peekable();
    let mut arg = 0;

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let mut spec = Spec::default();
        let mut raw = String::from('%');

        while let Some(&f) = chars.peek() {
            match f {
                '-' => spec.left = true,
                '0' => spec.zero = true,
                '+' => spec.plus = true,
                ' ' => spec.space = true,
                _ => break,
            }
            raw.push(f);
            chars.next();
        }
        while let Some(&d) = chars.peek() {
            let Some(digit) = d.to_digit(10) else { break };
            spec.width = push_digit(spec.width, digit);
            raw.push(d);
            chars.next();
        }
        if chars.peek() == Some(&'.') {
            raw.push('.');
            chars.next();
            let mut precision = 0;
            while let Some(&d) = chars.peek() {
                let Some(digit) = d.to_digit(10) else { break };
                precision = push_digit(precision, digit);
                raw.push(d);
                chars.next();
            }
            spec.precision = Some(precision);
        }

        let Some(conv) = chars.next() else {
            out.push_str(&raw);
            break;
        };
        let body = match conv {
            '%' => {
                out.push('%');
                continue;
            }
            'f' | 'F' => {
                let v = values.get(arg).copied().unwrap_or(0.0);
                let precision = spec.precision.unwrap_or(6);
                signed(format!("{:.*}", precision, round_half_away(v.abs(), precision)), v, spec)
            }
            'd' | 'i' => {
                let v = values.get(arg).copied().unwrap_or(0.0).round();
                signed(format!("{}", v.abs() as i64), v, spec)
            }
            'e' | 'E' => {
                let v = values.get(arg).copied().unwrap_or(0.0);
                let s = format!("{:.*e}", spec.precision.unwrap_or(6), v.abs());
                signed(if conv == 'E' { s.to_uppercase() } else { s }, v, spec)
            }
            'g' | 'G' | 's' | 'v' => {
                let v = values.get(arg).copied().unwrap_or(0.0);
                signed(format!("{}", v.abs()), v, spec)
            }
            other => {
                out.push_str(&raw);
                out.push(other);
                continue;
            }
        };

        out.push_str(&pad(body, spec));
        if let Some(suffix) = suffixes.get(arg) {
            out.push_str(suffix);
        }
        arg += 1;
    }
    out
}

/// Append a decimal digit to a width or precision, capped at [`MAX_FIELD`].
#[inline]
fn push_digit(
    acc: usize,
    digit: u32,
) -> usize {
    acc.saturating_mul(10).saturating_add(digit as usize).min(MAX_FIELD)
}

/// Round to `precision` decimals with ties away from zero, matching C printf
/// on exact halves such as `42.5`.
fn round_half_away(
    v: f64,
    precision: usize,
) -> f64 {
    if precision > 15 {
        return v;
    }
    let scale = 10f64.powi(precision as i32);
    (v * scale).round() / scale
}

/// Prefix the sign for `v` onto an unsigned rendering.
fn signed(
    digits: String,
    v: f64,
    spec: Spec,
) -> String {
    let negative = v.is_sign_negative() && digits.chars().any(|c| c.is_ascii_digit() && c != '0');
    let sign = if negative {
        "-"
    } else if spec.plus {
        "+"
    } else if spec.space {
        " "
    } else {
        ""
    };
    format!("{sign}{digits}")
}

fn pad(
    body: String,
    spec: Spec,
) -> String {
    let len = body.chars().count();
    if len >= spec.width {
        return body;
    }
    let fill = spec.width - len;
    if spec.left {
        format!("{body}{}", " ".repeat(fill))
    } else if spec.zero {
        let (sign, digits) = match body.chars().next() {
            Some(c @ ('-' | '+' | ' ')) => (c.to_string(), body[1..].to_string()),
            _ => (String::new(), body),
        };
        format!("{sign}{}{digits}", "0".repeat(fill))
    } else {
        format!("{}{body}", " ".repeat(fill))
    }
}
