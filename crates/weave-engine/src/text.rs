//! Text keys for matching free-form names across methodologies.

use std::collections::BTreeMap;

const STOP_WORDS: &[&str] = &[
    "about", "after", "against", "all", "also", "and", "any", "are", "because", "been", "being",
    "but", "can", "could", "does", "due", "each", "for", "from", "has", "have", "into", "its",
    "may", "might", "more", "not", "other", "over", "such", "than", "that", "the", "their",
    "them", "then", "there", "these", "they", "this", "those", "through", "under", "upon",
    "use", "used", "using", "via", "was", "were", "when", "where", "which", "while", "who",
    "will", "with", "within", "without", "would", "threat", "threats",
];

/// Words that describe what a control is rather than what it does.
const CONTROL_FILLER: &[&str] = &[
    "control",
    "controls",
    "mitigation",
    "mitigations",
    "safeguard",
    "safeguards",
];

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

/// Matching key for a control name: lower-case, punctuation stripped and
/// filler words removed, so "MFA Control" and "mfa" match.
pub(crate) fn control_key(name: &str) -> String {
    words(name)
        .filter(|w| !CONTROL_FILLER.contains(&w.as_str()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// The `limit` most frequent content words of `text`, ties broken by first
/// appearance, returned sorted so the key does not depend on word order.
pub(crate) fn keywords(text: &str, limit: usize) -> Vec<String> {
    let mut counts: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    for (position, word) in words(text)
        .filter(|w| w.chars().count() >= 3 && !STOP_WORDS.contains(&w.as_str()))
        .enumerate()
    {
        counts.entry(word).or_insert((0, position)).0 += 1;
    }

    let mut ranked: Vec<(String, usize, usize)> = counts
        .into_iter()
        .map(|(word, (count, first))| (word, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    let mut top: Vec<String> = ranked.into_iter().take(limit).map(|(w, _, _)| w).collect();
    top.sort();
    top
}

/// Lower-case words of `text` joined by single spaces, so "Role-Based
/// access_control" reads as "role based access control".
pub(crate) fn normalize_words(text: &str) -> String {
    words(text).collect::<Vec<_>>().join(" ")
}

/// Lower-case alphanumerics only, so `data_store` and `Data Store` compare
/// equal.
pub(crate) fn compact(text: &str) -> String {
    words(text).collect()
}

/// Whether any of `phrases` occurs in the already lower-cased `haystack`.
pub(crate) fn mentions_any(haystack: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|phrase| haystack.contains(phrase))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn control_key_drops_filler_and_punctuation() {
        assert_eq!(control_key("MFA Control"), "mfa");
        assert_eq!(control_key("Input-validation safeguard"), "input validation");
        assert_eq!(control_key("  WAF  "), "waf");
        assert_eq!(control_key("Mitigation"), "");
    }

    #[test]
    fn normalized_words_make_phrases_searchable() {
        let evidence = normalize_words("Role-Based access_control (RBAC)");
        assert_eq!(evidence, "role based access control rbac");
        assert!(mentions_any(&evidence, &["access control"]));
        assert!(!mentions_any(&evidence, &["encrypt"]));
    }

    #[test]
    fn compact_ignores_separators_and_case() {
        assert_eq!(compact("Data_Store"), compact("data store"));
        assert_eq!(compact("Data_Store"), "datastore");
    }

    #[test]
    fn keywords_rank_by_frequency_then_position() {
        let text = "SQL injection in checkout. Injection lets attacker read card data from checkout";
        assert_eq!(keywords(text, 3), vec!["checkout", "injection", "sql"]);
    }

    #[test]
    fn keywords_ignore_word_order_and_stop_words() {
        assert_eq!(
            keywords("token replay against the gateway", 3),
            keywords("gateway token replay", 3)
        );
    }
}
