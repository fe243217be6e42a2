//! Terminal control sequence removal for console log excerpts.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;

const CONTROL_SEQUENCE_PATTERN: &str = r"\x1b\[[0-9;]*[A-Za-z]";

fn control_sequence_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(CONTROL_SEQUENCE_PATTERN).expect("control sequence pattern compiles")
    })
}

/// Returns true when `text` holds at least one `ESC [ <digits/;> <letter>` sequence.
pub fn contains_control_sequences(text: &str) -> bool {
    control_sequence_regex().is_match(text)
}

/// Removes every terminal control sequence from `text`.
///
/// Removal repeats until no sequence is left, so input such as
/// `"\x1b\x1b[0m[1m"` (where deleting the inner sequence forms a new one)
/// is fully cleaned and `strip(strip(x)) == strip(x)` holds.
pub fn strip_control_sequences(text: &str) -> String {
    let regex = control_sequence_regex();
    let mut current = match regex.replace_all(text, "") {
        Cow::Borrowed(unchanged) => return unchanged.to_string(),
        Cow::Owned(stripped) => stripped,
    };
    loop {
        let next = match regex.replace_all(&current, "") {
            Cow::Borrowed(_) => None,
            Cow::Owned(stripped) => Some(stripped),
        };
        match next {
            Some(stripped) => current = stripped,
            None => return current,
        }
    }
}
