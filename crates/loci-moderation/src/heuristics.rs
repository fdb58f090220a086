//! Synchronous note moderation heuristics.
//!
//! Ordered checks, each rejecting with a fixed user-facing reason:
//! 1. Empty after trim
//! 2. Length over the note cap
//! 3. Profanity (case-insensitive substring)
//! 4. Spam patterns (URLs, mentions, repeated characters, symbol runs)
//! 5. Gibberish (vowel/letter ratio outside the plausible band)
//!
//! All checks operate on the trimmed text. This stage is local and cheap;
//! the remote classifier only ever sees text that passed it.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use loci_core::defaults::{
    GIBBERISH_MIN_LETTERS, NOTE_MAX_CHARS, REPEAT_RUN_LIMIT, SYMBOL_RUN_LIMIT, VOWEL_RATIO_MAX,
    VOWEL_RATIO_MIN,
};
use loci_core::{ModerationStage, Verdict};

/// Rejection reason for empty input.
pub const REASON_EMPTY: &str = "Note cannot be empty.";

/// Rejection reason for over-length input.
pub const REASON_TOO_LONG: &str = "Note is too long (max 500 characters).";

/// Rejection reason for profanity.
pub const REASON_PROFANITY: &str = "Please remove offensive language.";

/// Rejection reason for spam patterns.
pub const REASON_SPAM: &str = "Links, spam, or repeated characters are not allowed.";

/// Rejection reason for gibberish.
pub const REASON_GIBBERISH: &str = "Note looks cryptic/gibberish. Add more meaningful words.";

/// Default profane token set, matched as case-insensitive substrings.
pub const DEFAULT_PROFANITY: &[&str] = &[
    "fuck", "shit", "bitch", "asshole", "bastard", "slut", "whore", "nigger", "faggot", "cunt",
];

/// URL scheme anywhere in the text.
static URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)https?://").expect("url pattern compiles"));

/// Handle-style mention: `@` followed by at least two word characters.
static MENTION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@\w{2,}").expect("mention pattern compiles"));

/// Run of characters in the Unicode symbol classes So or Sk (emoji and
/// modifier symbols) at or past the spam limit.
static SYMBOL_RUN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"[\p{{So}}\p{{Sk}}]{{{},}}", SYMBOL_RUN_LIMIT))
        .expect("symbol run pattern compiles")
});

/// Runs of newlines, carriage returns, and tabs, collapsed by the
/// display sanitizer.
static CONTROL_RUN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\r\n\t]+").expect("control run pattern compiles"));

/// The synchronous moderation gate.
///
/// Holds the profanity set; thresholds and patterns are fixed constants
/// from [`loci_core::defaults`].
#[derive(Debug, Clone)]
pub struct HeuristicGate {
    profanity: Vec<String>,
}

impl HeuristicGate {
    /// Gate with the default profanity set.
    pub fn new() -> Self {
        Self::with_profanity(DEFAULT_PROFANITY.iter().copied())
    }

    /// Gate with a custom profanity set. Tokens are matched as
    /// case-insensitive substrings.
    pub fn with_profanity<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            profanity: words.into_iter().map(|w| w.into().to_lowercase()).collect(),
        }
    }

    /// Run every check in order over the trimmed text.
    pub fn check(&self, text: &str) -> Verdict {
        let trimmed = text.trim();

        if trimmed.is_empty() {
            return self.reject(REASON_EMPTY);
        }

        if trimmed.chars().count() > NOTE_MAX_CHARS {
            return self.reject(REASON_TOO_LONG);
        }

        let lowered = trimmed.to_lowercase();
        if self.profanity.iter().any(|w| lowered.contains(w.as_str())) {
            return self.reject(REASON_PROFANITY);
        }

        if URL_PATTERN.is_match(trimmed)
            || MENTION_PATTERN.is_match(trimmed)
            || has_repeat_run(trimmed, REPEAT_RUN_LIMIT)
            || SYMBOL_RUN_PATTERN.is_match(trimmed)
        {
            return self.reject(REASON_SPAM);
        }

        if let Some(ratio) = vowel_ratio(trimmed) {
            if !(VOWEL_RATIO_MIN..=VOWEL_RATIO_MAX).contains(&ratio) {
                return self.reject(REASON_GIBBERISH);
            }
        }

        Verdict::Allowed
    }

    fn reject(&self, reason: &str) -> Verdict {
        debug!(reason, "note rejected by heuristics");
        Verdict::reject(ModerationStage::Heuristic, reason)
    }
}

impl Default for HeuristicGate {
    fn default() -> Self {
        Self::new()
    }
}

/// True if any character repeats `limit` or more times consecutively.
///
/// Hand-rolled scan; the regex engine has no backreferences.
fn has_repeat_run(text: &str, limit: usize) -> bool {
    let mut run = 0usize;
    let mut prev: Option<char> = None;
    for c in text.chars() {
        if prev == Some(c) {
            run += 1;
        } else {
            prev = Some(c);
            run = 1;
        }
        if run >= limit {
            return true;
        }
    }
    false
}

/// Vowel/letter ratio over ASCII letters, or `None` when the text has too
/// few letters for the ratio to mean anything.
fn vowel_ratio(text: &str) -> Option<f64> {
    let mut letters = 0usize;
    let mut vowels = 0usize;
    for c in text.chars().filter(|c| c.is_ascii_alphabetic()) {
        letters += 1;
        if matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u') {
            vowels += 1;
        }
    }
    if letters < GIBBERISH_MIN_LETTERS {
        return None;
    }
    Some(vowels as f64 / letters as f64)
}

/// Prepare stored note text for display: collapse runs of `\r`, `\n`, and
/// `\t` into a single space, trim, and clamp over-length text to the note
/// cap with a trailing ellipsis.
///
/// Never applied before validation; moderation sees the text as written.
pub fn sanitize_for_display(text: &str) -> String {
    let collapsed = CONTROL_RUN_PATTERN.replace_all(text, " ");
    let trimmed = collapsed.trim();
    if trimmed.chars().count() > NOTE_MAX_CHARS {
        let clamped: String = trimmed.chars().take(NOTE_MAX_CHARS).collect();
        format!("{}…", clamped)
    } else {
        trimmed.to_string()
    }
}
