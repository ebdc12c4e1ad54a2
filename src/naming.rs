//! Filename parsing for the `name@<n>x.ext` density convention.
//!
//! Source images may declare the pixel density they were exported at with an
//! `@<n>x` suffix before the extension. The suffix is stripped from the
//! output base name and the number becomes the image's *declared ratio*:
//!
//! - `hero.png` → base `hero`, ratio 1
//! - `hero@2x.png` → base `hero`, ratio 2
//! - `hero@1.5x.webp` → base `hero`, ratio 1.5
//! - `hero@abcx.png` → base `hero`, ratio 1 (malformed ratios degrade silently)
//!
//! Anything after the last `@` is treated as the ratio descriptor, whether or
//! not it parses. `me@home.png` therefore has base `me`.

/// Result of parsing a filename like `hero@2x.png`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFileName {
    /// `@`-separated segments of the stem, ratio descriptor removed.
    pub name_segments: Vec<String>,
    /// Declared source density. 1 when absent or unparseable.
    pub declared_ratio: f64,
}

impl ParsedFileName {
    /// Output stem: the name segments re-joined with `@`.
    pub fn base_name(&self) -> String {
        self.name_segments.join("@")
    }
}

/// Parse a filename (no directory component). Never fails.
pub fn parse_file_name(file_name: &str) -> ParsedFileName {
    let stem = match file_name.rfind('.') {
        Some(dot) => &file_name[..dot],
        None => file_name,
    };

    let mut name_segments: Vec<String> = stem.split('@').map(str::to_string).collect();
    let declared_ratio = if name_segments.len() > 1 {
        let descriptor = name_segments.pop().unwrap_or_default();
        parse_ratio(&descriptor).unwrap_or(1.0)
    } else {
        1.0
    };

    ParsedFileName {
        name_segments,
        declared_ratio,
    }
}

/// Parse the numeric prefix of a `<number>x` descriptor.
fn parse_ratio(descriptor: &str) -> Option<f64> {
    let number = descriptor.strip_suffix('x').unwrap_or(descriptor);
    leading_float(number.trim_start()).filter(|r| r.is_finite())
}

/// Longest prefix of `s` that parses as a float (`"2.5abc"` → 2.5).
fn leading_float(s: &str) -> Option<f64> {
    let candidate_len = s
        .char_indices()
        .take_while(|(_, c)| c.is_ascii_digit() || matches!(c, '.' | '+' | '-' | 'e' | 'E'))
        .map(|(i, c)| i + c.len_utf8())
        .last()?;

    (1..=candidate_len)
        .rev()
        .find_map(|end| s[..end].parse::<f64>().ok())
}
