//! Approximate matching of OCR phrases against a controlled vocabulary.

/// Default minimum score (0–100) for a fuzzy match to be accepted.
pub const DEFAULT_FUZZY_CUTOFF: f64 = 70.0;

/// Substring-tolerant similarity in [0, 100].
///
/// The shorter string is slid over every equal-length window of the longer
/// one; the best normalized Levenshtein similarity wins. Comparison is
/// case-insensitive.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.to_uppercase().chars().collect();
    let b: Vec<char> = b.to_uppercase().chars().collect();

    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if shorter.is_empty() {
        return 0.0;
    }

    let needle: String = shorter.iter().collect();
    let mut best = 0.0_f64;

    for window in longer.windows(shorter.len()) {
        let candidate: String = window.iter().collect();
        let score = strsim::normalized_levenshtein(&needle, &candidate);
        if score > best {
            best = score;
            if best >= 1.0 {
                break;
            }
        }
    }

    best * 100.0
}

/// Returns the best-scoring candidate if its score reaches `cutoff`.
///
/// Ties go to the first candidate with the top score, so callers should pass
/// candidates in their vocabulary's declared order.
pub fn fuzzy_match<'a, S: AsRef<str>>(text: &str, candidates: &'a [S], cutoff: f64) -> Option<&'a str> {
    if text.trim().is_empty() {
        return None;
    }

    let mut best_match: Option<&'a str> = None;
    let mut best_score = 0.0_f64;

    for candidate in candidates {
        let candidate = candidate.as_ref();
        let score = partial_ratio(text, candidate);
        if score > best_score {
            best_match = Some(candidate);
            best_score = score;
        }
    }

    if best_score >= cutoff { best_match } else { None }
}
