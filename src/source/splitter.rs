use once_cell::sync::Lazy;
use regex::Regex;

/// Terminal punctuation (Latin and Devanagari danda) or a line break
static SENTENCE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?।॥|]+|\r?\n").unwrap());

/// Units this short (in chars, after trimming) are noise
const MIN_SENTENCE_CHARS: usize = 4;

/// Words a running sentence needs before a capitalised word may start a new one
const MIN_WORDS_BEFORE_CAPITAL_BREAK: usize = 3;

/// Split raw transcription output into sentence-like units.
///
/// Breaks on terminal punctuation and newlines, then before a capitalised word
/// that follows a lowercase one once the running sentence has a few words.
/// Units of three characters or fewer are dropped.
pub fn split_sentences(text: &str) -> Vec<String> {
    SENTENCE_BREAK
        .split(text)
        .flat_map(split_on_capitals)
        .map(|s| s.trim().to_string())
        .filter(|s| s.chars().count() >= MIN_SENTENCE_CHARS)
        .collect()
}

fn split_on_capitals(piece: &str) -> Vec<String> {
    let mut units = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for word in piece.split_whitespace() {
        let breaks = current.len() >= MIN_WORDS_BEFORE_CAPITAL_BREAK
            && starts_uppercase(word)
            && current.last().is_some_and(|prev| ends_lowercase(prev));

        if breaks {
            units.push(current.join(" "));
            current.clear();
        }
        current.push(word);
    }

    if !current.is_empty() {
        units.push(current.join(" "));
    }
    units
}

fn starts_uppercase(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase)
}

fn ends_lowercase(word: &str) -> bool {
    word.chars()
        .rev()
        .find(|c| c.is_alphabetic())
        .is_some_and(char::is_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_on_punctuation() {
        let sentences = split_sentences("Om namah shivaya. Jai shri krishna!");
        assert_eq!(sentences, vec!["Om namah shivaya", "Jai shri krishna"]);
    }

    #[test]
    fn test_splits_on_danda_and_newlines() {
        let sentences = split_sentences("अजिता हरे जय माधवा । विष्णो अजमुख देव नाथा\nविजय शारदे");
        assert_eq!(
            sentences,
            vec!["अजिता हरे जय माधवा", "विष्णो अजमुख देव नाथा", "विजय शारदे"]
        );
    }

    #[test]
    fn test_capital_after_lowercase_starts_sentence() {
        let sentences = split_sentences("Om namah shivaya Jai shri krishna");
        assert_eq!(sentences, vec!["Om namah shivaya", "Jai shri krishna"]);
    }

    #[test]
    fn test_short_runs_keep_capitals_together() {
        let sentences = split_sentences("Hare Krishna Rama");
        assert_eq!(sentences, vec!["Hare Krishna Rama"]);
    }

    #[test]
    fn test_drops_short_fragments() {
        let sentences = split_sentences("Om. ab. Jai shri krishna. ...");
        assert_eq!(sentences, vec!["Jai shri krishna"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(split_sentences("   \n  ").is_empty());
    }
}
