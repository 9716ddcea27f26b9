//! Whole-word keyword scoring shared by style and palette selection.

/// Lowercase alphanumeric words of `text`, in order.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Number of tokens that equal one of `keywords` (case-insensitive).
pub fn count_hits<S: AsRef<str>>(tokens: &[String], keywords: &[S]) -> usize {
    tokens
        .iter()
        .filter(|t| keywords.iter().any(|k| k.as_ref().eq_ignore_ascii_case(t)))
        .count()
}

/// Index of the highest-scoring keyword set. Ties go to the earlier set;
/// `None` when nothing matches.
pub fn best_match<S: AsRef<str>>(text: &str, sets: &[&[S]]) -> Option<usize> {
    let tokens = tokenize(text);
    let mut best: Option<(usize, usize)> = None;
    for (index, keywords) in sets.iter().enumerate() {
        let hits = count_hits(&tokens, keywords);
        if hits == 0 {
            continue;
        }
        match best {
            Some((_, top)) if hits <= top => {}
            _ => best = Some((index, hits)),
        }
    }
    best.map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_splits_on_punctuation() {
        assert_eq!(tokenize("Fast-paced, BOLD launch!"), vec!["fast", "paced", "bold", "launch"]);
    }

    #[test]
    fn hits_are_whole_words() {
        let tokens = tokenize("a fastidious fast car");
        assert_eq!(count_hits(&tokens, &["fast"]), 1);
    }

    #[test]
    fn best_match_prefers_more_hits_then_earlier_set() {
        let a: &[&str] = &["calm"];
        let b: &[&str] = &["bold", "loud"];
        assert_eq!(best_match("bold and loud", &[a, b]), Some(1));
        assert_eq!(best_match("calm but bold", &[a, b]), Some(0));
        assert_eq!(best_match("nothing here", &[a, b]), None);
    }
}
