//! Canonical forms used to match records across methodologies.
//!
//! Entity identity across methodologies is case-insensitive name equality.
//! Two methodologies naming the same component differently will not match,
//! and two unrelated components sharing a name will.

/// The six canonical threat categories every complete model should touch.
pub const THREAT_CATEGORIES: [&str; 6] = [
    "spoofing",
    "tampering",
    "repudiation",
    "information-disclosure",
    "denial-of-service",
    "elevation-of-privilege",
];

/// Matching key for an entity name.
#[must_use]
pub fn canonical_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Normalize a threat category tag to kebab-case and fold common aliases onto
/// the canonical six.
#[must_use]
pub fn normalize_category(category: &str) -> String {
    let kebab = category
        .trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-' || c == '/')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    match kebab.as_str() {
        "s" | "spoof" | "identity-spoofing" => "spoofing".to_string(),
        "t" | "tamper" | "data-tampering" => "tampering".to_string(),
        "r" | "non-repudiation" => "repudiation".to_string(),
        "i" | "info-disclosure" | "disclosure" | "data-disclosure" | "data-leak"
        | "data-leakage" | "information-leakage" => "information-disclosure".to_string(),
        "d" | "dos" | "ddos" | "denial" | "availability" => "denial-of-service".to_string(),
        "e" | "eop" | "privilege-escalation" | "elevation" | "escalation-of-privilege" => {
            "elevation-of-privilege".to_string()
        }
        "supplychain" | "third-party" | "dependency" => "supply-chain".to_string(),
        _ => kebab,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn category_aliases_fold_to_canonical() {
        assert_eq!(normalize_category("Information Disclosure"), "information-disclosure");
        assert_eq!(normalize_category("DoS"), "denial-of-service");
        assert_eq!(normalize_category("privilege_escalation"), "elevation-of-privilege");
        assert_eq!(normalize_category("Supply Chain"), "supply-chain");
        assert_eq!(normalize_category("prompt injection"), "prompt-injection");
    }

    #[test]
    fn canonical_names_ignore_case_and_padding() {
        assert_eq!(canonical_name("  Payment API "), "payment api");
        assert_eq!(canonical_name("payment api"), canonical_name("PAYMENT API"));
    }
}
