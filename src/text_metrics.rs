//! Font-free text width estimation.
//!
//! Widths are estimated from a column count: double-width glyphs (CJK, Hangul, fullwidth
//! forms, emoji) take two columns, everything else one. Each column is scaled by an
//! average character width that grows with the font weight.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static LINE_BREAK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<br\s*/?>|\\n").expect("line break pattern is valid")
});

// Sorted, non-overlapping inclusive ranges of double-width code points.
const WIDE_RANGES: &[(u32, u32)] = &[
    (0x1100, 0x115F),   // Hangul Jamo
    (0x2E80, 0x303E),   // CJK radicals, Kangxi, CJK symbols and punctuation
    (0x3041, 0x33FF),   // Hiragana, Katakana, Bopomofo, compatibility
    (0x3400, 0x4DBF),   // CJK extension A
    (0x4E00, 0x9FFF),   // CJK unified ideographs
    (0xA000, 0xA4CF),   // Yi
    (0xAC00, 0xD7A3),   // Hangul syllables
    (0xF900, 0xFAFF),   // CJK compatibility ideographs
    (0xFE30, 0xFE4F),   // CJK compatibility forms
    (0xFF00, 0xFF60),   // Fullwidth forms
    (0xFFE0, 0xFFE6),   // Fullwidth signs
    (0x1F300, 0x1F64F), // Misc symbols and pictographs, emoticons
    (0x1F680, 0x1F6FF), // Transport and map symbols
    (0x1F900, 0x1F9FF), // Supplemental symbols and pictographs
    (0x1FA70, 0x1FAFF), // Symbols and pictographs extended-A
    (0x20000, 0x3FFFD), // CJK extensions B and later
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Light,
    #[default]
    Normal,
    Medium,
    Bold,
}

impl FontWeight {
    /// Average advance of one column, as a fraction of the font size.
    pub fn average_char_ratio(self) -> f64 {
        match self {
            FontWeight::Light => 0.52,
            FontWeight::Normal => 0.56,
            FontWeight::Medium => 0.59,
            FontWeight::Bold => 0.63,
        }
    }
}

pub fn is_wide(ch: char) -> bool {
    let code = ch as u32;
    WIDE_RANGES
        .binary_search_by(|&(start, end)| {
            if code < start {
                std::cmp::Ordering::Greater
            } else if code > end {
                std::cmp::Ordering::Less
            } else {
                std::cmp::Ordering::Equal
            }
        })
        .is_ok()
}

pub fn char_columns(ch: char) -> usize {
    match ch {
        '\n' | '\r' => 0,
        _ if is_wide(ch) => 2,
        _ => 1,
    }
}

pub fn text_columns(text: &str) -> usize {
    text.chars().map(char_columns).sum()
}

/// Estimated rendered width in pixels. Always finite and non-negative.
pub fn estimate_width(text: &str, font_size: f64, weight: FontWeight) -> f64 {
    if text.is_empty() || !font_size.is_finite() || font_size <= 0.0 {
        return 0.0;
    }
    text_columns(text) as f64 * font_size * weight.average_char_ratio()
}

pub fn widest_line_width<S: AsRef<str>>(lines: &[S], font_size: f64, weight: FontWeight) -> f64 {
    lines
        .iter()
        .map(|line| estimate_width(line.as_ref(), font_size, weight))
        .fold(0.0, f64::max)
}

/// Splits on newlines, `<br>`, `<br/>` and literal `\n`, trimming each line.
pub fn split_lines(text: &str) -> Vec<String> {
    let normalized = LINE_BREAK.replace_all(text, "\n");
    normalized
        .split('\n')
        .map(|line| line.trim().to_string())
        .collect()
}

/// Greedy word wrap against an estimated pixel budget. Words wider than the budget keep
/// their own line.
pub fn wrap_line(line: &str, max_width: f64, font_size: f64, weight: FontWeight) -> Vec<String> {
    if estimate_width(line, font_size, weight) <= max_width {
        return vec![line.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if estimate_width(&candidate, font_size, weight) > max_width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            current.push_str(word);
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Pixel budget for `max_chars` average-width columns.
pub fn max_width_for_chars(max_chars: usize, font_size: f64, weight: FontWeight) -> f64 {
    max_chars.max(1) as f64 * font_size * weight.average_char_ratio()
}
