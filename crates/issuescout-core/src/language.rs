// Natural-language detection for issue titles and bodies
//
// Simple heuristics over Unicode script ranges. Good enough to route a
// Chinese bug report away from someone filtering for English; not a
// linguistics engine. Known weakness: short or code-heavy Romance-language
// text tends to fall through to English - an accepted false negative.
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::Issue;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NaturalLanguage {
    En,
    Zh,
    Ja,
    Ko,
    Es,
    Fr,
    De,
    Pt,
    Ru,
    Ar,
    Hi,
    Other,
}

impl NaturalLanguage {
    pub fn code(&self) -> &'static str {
        match self {
            NaturalLanguage::En => "en",
            NaturalLanguage::Zh => "zh",
            NaturalLanguage::Ja => "ja",
            NaturalLanguage::Ko => "ko",
            NaturalLanguage::Es => "es",
            NaturalLanguage::Fr => "fr",
            NaturalLanguage::De => "de",
            NaturalLanguage::Pt => "pt",
            NaturalLanguage::Ru => "ru",
            NaturalLanguage::Ar => "ar",
            NaturalLanguage::Hi => "hi",
            NaturalLanguage::Other => "other",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            NaturalLanguage::En => "English",
            NaturalLanguage::Zh => "Chinese",
            NaturalLanguage::Ja => "Japanese",
            NaturalLanguage::Ko => "Korean",
            NaturalLanguage::Es => "Spanish",
            NaturalLanguage::Fr => "French",
            NaturalLanguage::De => "German",
            NaturalLanguage::Pt => "Portuguese",
            NaturalLanguage::Ru => "Russian",
            NaturalLanguage::Ar => "Arabic",
            NaturalLanguage::Hi => "Hindi",
            NaturalLanguage::Other => "Other",
        }
    }
}

impl std::str::FromStr for NaturalLanguage {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" => Ok(NaturalLanguage::En),
            "zh" => Ok(NaturalLanguage::Zh),
            "ja" => Ok(NaturalLanguage::Ja),
            "ko" => Ok(NaturalLanguage::Ko),
            "es" => Ok(NaturalLanguage::Es),
            "fr" => Ok(NaturalLanguage::Fr),
            "de" => Ok(NaturalLanguage::De),
            "pt" => Ok(NaturalLanguage::Pt),
            "ru" => Ok(NaturalLanguage::Ru),
            "ar" => Ok(NaturalLanguage::Ar),
            "hi" => Ok(NaturalLanguage::Hi),
            "other" => Ok(NaturalLanguage::Other),
            other => Err(crate::Error::ConfigError(format!(
                "Unknown language code: {}",
                other
            ))),
        }
    }
}

fn is_kana(c: char) -> bool {
    // Hiragana + Katakana
    ('\u{3040}'..='\u{309f}').contains(&c) || ('\u{30a0}'..='\u{30ff}').contains(&c)
}

fn is_cjk(c: char) -> bool {
    // CJK Unified Ideographs
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

fn is_hangul(c: char) -> bool {
    ('\u{ac00}'..='\u{d7a3}').contains(&c)
}

fn is_arabic(c: char) -> bool {
    ('\u{0600}'..='\u{06ff}').contains(&c)
}

fn is_cyrillic(c: char) -> bool {
    ('\u{0400}'..='\u{04ff}').contains(&c)
}

fn is_devanagari(c: char) -> bool {
    ('\u{0900}'..='\u{097f}').contains(&c)
}

fn is_accented_latin(c: char) -> bool {
    "àáâãäåèéêëìíîïòóôõöùúûüýÿñç"
        .chars()
        .any(|a| a == c || a.to_uppercase().next() == Some(c))
}

fn is_german_marker(c: char) -> bool {
    matches!(c, 'ä' | 'ö' | 'ü' | 'ß' | 'Ä' | 'Ö' | 'Ü')
}

const SPANISH_HINTS: &[&str] = &[
    "es", "el", "la", "de", "que", "en", "un", "una", "por", "con", "para",
];
const FRENCH_HINTS: &[&str] = &[
    "le", "la", "les", "de", "du", "des", "et", "est", "un", "une", "pour", "avec", "dans",
];
const PORTUGUESE_HINTS: &[&str] = &[
    "o", "a", "os", "as", "de", "do", "da", "dos", "das", "em", "um", "uma", "com", "para",
];

/// Drop the parts of a markdown-ish text that confuse script detection:
/// code fences, inline code, URLs, and markdown punctuation.
fn clean_text(text: &str) -> String {
    let no_fences = strip_delimited(text, "```");
    let no_inline = strip_delimited(&no_fences, "`");

    let mut kept = String::with_capacity(no_inline.len());
    for token in no_inline.split_whitespace() {
        if token.starts_with("http://") || token.starts_with("https://") {
            continue;
        }
        if !kept.is_empty() {
            kept.push(' ');
        }
        kept.push_str(token);
    }

    kept.chars()
        .map(|c| match c {
            '#' | '*' | '_' | '-' | '[' | ']' | '(' | ')' | '{' | '}' => ' ',
            c => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Keep the segments outside pairs of `delim`; an unclosed delimiter
/// keeps the trailing text
fn strip_delimited(text: &str, delim: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut inside = false;
    for (i, segment) in text.split(delim).enumerate() {
        if !inside {
            if i > 0 {
                out.push(' ');
            }
            out.push_str(segment);
        }
        inside = !inside;
    }
    out
}

/// Detect the natural language of a text. Defaults to English for empty,
/// short, or mostly-ASCII input.
pub fn detect_language(text: &str) -> NaturalLanguage {
    let clean = clean_text(text);
    if clean.chars().count() < 3 {
        return NaturalLanguage::En;
    }

    let total = clean.chars().count();
    let non_ascii = clean.chars().filter(|c| !c.is_ascii()).count();
    if (non_ascii as f64) / (total as f64) <= 0.3 {
        return NaturalLanguage::En;
    }

    // Kana before generic CJK: Japanese text containing kanji would
    // otherwise be mis-flagged as Chinese
    if clean.chars().any(is_kana) {
        return NaturalLanguage::Ja;
    }
    if clean.chars().any(is_cjk) {
        return NaturalLanguage::Zh;
    }
    if clean.chars().any(is_hangul) {
        return NaturalLanguage::Ko;
    }
    if clean.chars().any(is_arabic) {
        return NaturalLanguage::Ar;
    }
    if clean.chars().any(is_cyrillic) {
        return NaturalLanguage::Ru;
    }
    if clean.chars().any(is_devanagari) {
        return NaturalLanguage::Hi;
    }

    if clean.chars().any(is_accented_latin) {
        let words: HashSet<String> = clean
            .split_whitespace()
            .map(|w| w.to_lowercase())
            .collect();

        if SPANISH_HINTS.iter().any(|h| words.contains(*h)) {
            return NaturalLanguage::Es;
        }
        if FRENCH_HINTS.iter().any(|h| words.contains(*h)) {
            return NaturalLanguage::Fr;
        }
        if PORTUGUESE_HINTS.iter().any(|h| words.contains(*h)) {
            return NaturalLanguage::Pt;
        }
    }

    if clean.chars().any(is_german_marker) {
        return NaturalLanguage::De;
    }

    NaturalLanguage::En
}

/// Filter issues down to the allowed natural languages.
///
/// An empty allow-list or one containing Other passes everything through,
/// since "Other" as a filter means the user doesn't want language-based
/// exclusion at all.
pub fn filter_by_language(issues: Vec<Issue>, allowed: &[NaturalLanguage]) -> Vec<Issue> {
    if allowed.is_empty() || allowed.contains(&NaturalLanguage::Other) {
        return issues;
    }

    issues
        .into_iter()
        .filter(|issue| {
            let title_lang = detect_language(&issue.title);
            if allowed.contains(&title_lang) {
                return true;
            }
            if let Some(body) = &issue.body {
                return allowed.contains(&detect_language(body));
            }
            false
        })
        .collect()
}
