use unicode_normalization::UnicodeNormalization;

/// Literal fixups applied after whitespace is collapsed.
/// Both spellings of the liter abbreviation collapse to the bare "л".
const REPLACEMENTS: &[(&str, &str)] = &[("л.", "л"), ("л .", "л")];

/// Normalizes raw OCR text from one HUD field.
///
/// NFKC, then every whitespace run (newlines included) becomes a single space,
/// then the literal replacement table is applied until nothing changes.
/// The result is a fixpoint: normalizing it again returns it unchanged.
pub fn normalize_text(raw: &str) -> String {
    let composed: String = raw.nfkc().collect();
    let mut text = composed.split_whitespace().collect::<Vec<_>>().join(" ");

    // Each replacement shrinks the string, so this terminates
    loop {
        let mut next = text.clone();
        for (from, to) in REPLACEMENTS {
            next = next.replace(from, to);
        }
        if next == text {
            return text;
        }
        text = next;
    }
}
