use regex::Regex;
use std::sync::OnceLock;

/// Pattern for "current° / target°". Numbers may be negative and use either
/// a comma or a dot as the decimal separator.
const TEMPERATURE_PATTERN: &str =
    r"(-?\d+(?:[.,]\d+)?)\s*°\s*/\s*(-?\d+(?:[.,]\d+)?)\s*°";

/// Pattern for "current л / required л", the unit period being optional.
const WATER_PATTERN: &str =
    r"(-?\d+(?:[.,]\d+)?)\s*[лЛ]\.?\s*/\s*(-?\d+(?:[.,]\d+)?)\s*[лЛ]\.?";

/// Pattern for a soil percentage: "37 %"
const SOIL_PATTERN: &str = r"(\d+(?:[.,]\d+)?)\s*%";

/// Pattern for "СТАДИЯ <roman numeral> (<percent>%)"
const STAGE_PATTERN: &str =
    r"(?i)СТАДИЯ\s*([IVXLC]+)\s*\(\s*(\d+(?:[.,]\d+)?)\s*%\s*\)";

/// Letters that can appear in a genome sequence.
pub const GENE_LETTERS: [char; 5] = ['G', 'W', 'Y', 'H', 'X'];

fn compiled(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("HUD field pattern must compile"))
}

fn temperature_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, TEMPERATURE_PATTERN)
}

fn water_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, WATER_PATTERN)
}

fn soil_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, SOIL_PATTERN)
}

fn stage_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, STAGE_PATTERN)
}

/// Parses a locale-formatted decimal ("18,4" or "18.4").
pub fn parse_decimal(text: &str) -> Option<f64> {
    text.trim().replace(',', ".").parse::<f64>().ok()
}

/// Finds the first pair matched by `regex` and parses both numbers.
fn extract_pair(regex: &Regex, text: &str) -> Option<(f64, f64)> {
    let caps = regex.captures(text)?;
    let first = parse_decimal(caps.get(1)?.as_str())?;
    let second = parse_decimal(caps.get(2)?.as_str())?;
    Some((first, second))
}

/// Extracts (current, target) from the temperature field.
pub fn extract_temperature(text: &str) -> Option<(f64, f64)> {
    extract_pair(temperature_regex(), text)
}

/// Extracts (current, required) from the water field.
pub fn extract_water(text: &str) -> Option<(f64, f64)> {
    extract_pair(water_regex(), text)
}

/// Extracts the soil percentage.
pub fn extract_soil(text: &str) -> Option<f64> {
    let caps = soil_regex().captures(text)?;
    parse_decimal(caps.get(1)?.as_str())
}

/// Extracts the growth stage and its completion percent.
///
/// Text without the stage keyword is kept as the label with no percent;
/// absent text stays absent.
pub fn extract_stage(text: Option<&str>) -> (Option<String>, Option<f64>) {
    let Some(text) = text else {
        return (None, None);
    };

    let parsed = stage_regex().captures(text).and_then(|caps| {
        let numeral = caps.get(1)?.as_str().to_uppercase();
        let percent = parse_decimal(caps.get(2)?.as_str())?;
        Some((numeral, percent))
    });

    match parsed {
        Some((numeral, percent)) => (Some(numeral), Some(percent)),
        None => (Some(text.to_string()), None),
    }
}

/// Collects the gene letters of a genome field in order of appearance.
///
/// Separators and OCR noise between letters are dropped: "G/G/G/G/X" → "GGGGX".
pub fn extract_genome(text: &str) -> Option<String> {
    let sequence: String = text
        .chars()
        .map(|c| c.to_ascii_uppercase())
        .filter(|c| GENE_LETTERS.contains(c))
        .collect();

    if sequence.is_empty() {
        None
    } else {
        Some(sequence)
    }
}

/// Splits the crop block into (crop name, status phrase).
///
/// `vocabulary` holds canonical (uppercase) crop names, longest first, so that
/// "ВИНОГРАД БЕЛЫЙ" wins over a shorter prefix. Without a vocabulary hit the
/// first word is taken as the crop.
pub fn extract_crop_and_status(
    text: Option<&str>,
    vocabulary: &[String],
) -> (Option<String>, Option<String>) {
    let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        return (None, None);
    };

    for crop in vocabulary {
        if let Some(rest) = strip_prefix_uppercase(text, crop) {
            let status = rest.trim();
            let status = (!status.is_empty()).then(|| status.to_string());
            return (Some(title_case(crop)), status);
        }
    }

    match text.split_once(' ') {
        Some((crop, rest)) => {
            let status = rest.trim();
            let status = (!status.is_empty()).then(|| status.to_string());
            (Some(title_case(crop)), status)
        }
        None => (Some(title_case(text)), None),
    }
}

/// Returns what follows `prefix` if the uppercased `text` starts with it.
/// The remainder is sliced from the original text, not from its uppercase form.
fn strip_prefix_uppercase<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let mut expected = prefix.chars().peekable();
    let mut chars = text.chars();

    while expected.peek().is_some() {
        let ch = chars.next()?;
        for upper in ch.to_uppercase() {
            if expected.next()? != upper {
                return None;
            }
        }
    }

    Some(chars.as_str())
}

/// Title-cases a name: "ВИНОГРАД БЕЛЫЙ" → "Виноград Белый", "ЖУК-ЩЕЛКУН" → "Жук-Щелкун".
pub fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut after_letter = false;

    for ch in text.chars() {
        if after_letter {
            result.extend(ch.to_lowercase());
        } else {
            result.extend(ch.to_uppercase());
        }
        after_letter = ch.is_alphabetic();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocabulary() -> Vec<String> {
        ["ВИНОГРАД РОЗОВЫЙ", "ВИНОГРАД БЕЛЫЙ", "ЛУК РЕПЧАТЫЙ", "КУКУРУЗА", "ТЫКВА"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("18,4"), Some(18.4));
        assert_eq!(parse_decimal("18.4"), Some(18.4));
        assert_eq!(parse_decimal("-2"), Some(-2.0));
        assert_eq!(parse_decimal("abc"), None);
    }

    #[test]
    fn test_temperature_parsing() {
        assert_eq!(extract_temperature("Температура 18.4° / 24.0°"), Some((18.4, 24.0)));
        assert_eq!(extract_temperature("18,4° / 24,0°"), Some((18.4, 24.0)));
        assert_eq!(extract_temperature("-3°/ 12°"), Some((-3.0, 12.0)));
        assert_eq!(extract_temperature("-1,5 ° / -0.5 °"), Some((-1.5, -0.5)));
    }

    #[test]
    fn test_temperature_missing() {
        assert_eq!(extract_temperature("18.4 / 24.0"), None);
        assert_eq!(extract_temperature(""), None);
    }

    #[test]
    fn test_water_parsing() {
        assert_eq!(extract_water("4.9 л. / 5.0 л."), Some((4.9, 5.0)));
        assert_eq!(extract_water("4.9 л / 5.0 л"), Some((4.9, 5.0)));
        assert_eq!(extract_water("Вода 4,9л/5,0л"), Some((4.9, 5.0)));
    }

    #[test]
    fn test_water_missing() {
        assert_eq!(extract_water("4.9 / 5.0"), None);
        assert_eq!(extract_water("5.0 л"), None);
    }

    #[test]
    fn test_soil_parsing() {
        assert_eq!(extract_soil("0%"), Some(0.0));
        assert_eq!(extract_soil("Почва 37 %"), Some(37.0));
        assert_eq!(extract_soil("37"), None);
    }

    #[test]
    fn test_stage_parsing() {
        assert_eq!(extract_stage(Some("СТАДИЯ I (2%)")), (Some("I".to_string()), Some(2.0)));
        assert_eq!(
            extract_stage(Some("стадия iv ( 55 % )")),
            (Some("IV".to_string()), Some(55.0))
        );
    }

    #[test]
    fn test_stage_without_keyword_keeps_text() {
        assert_eq!(extract_stage(Some("Созревание")), (Some("Созревание".to_string()), None));
        assert_eq!(extract_stage(None), (None, None));
    }

    #[test]
    fn test_genome_parsing() {
        assert_eq!(extract_genome("G/G/G/G/X"), Some("GGGGX".to_string()));
        assert_eq!(extract_genome("g w-y h"), Some("GWYH".to_string()));
        assert_eq!(extract_genome("---"), None);
    }

    #[test]
    fn test_crop_with_compound_name() {
        let (crop, status) = extract_crop_and_status(Some("Виноград Белый Посажено"), &vocabulary());
        assert_eq!(crop.as_deref(), Some("Виноград Белый"));
        assert_eq!(status.as_deref(), Some("Посажено"));
    }

    #[test]
    fn test_crop_without_status() {
        let (crop, status) = extract_crop_and_status(Some("КУКУРУЗА"), &vocabulary());
        assert_eq!(crop.as_deref(), Some("Кукуруза"));
        assert_eq!(status, None);
    }

    #[test]
    fn test_crop_status_keeps_original_case() {
        let (crop, status) =
            extract_crop_and_status(Some("Тыква Рекомендуется добавить удобрения"), &vocabulary());
        assert_eq!(crop.as_deref(), Some("Тыква"));
        assert_eq!(status.as_deref(), Some("Рекомендуется добавить удобрения"));
    }

    #[test]
    fn test_unknown_crop_falls_back_to_first_word() {
        let (crop, status) = extract_crop_and_status(Some("ананас Растёт быстро"), &vocabulary());
        assert_eq!(crop.as_deref(), Some("Ананас"));
        assert_eq!(status.as_deref(), Some("Растёт быстро"));

        let (crop, status) = extract_crop_and_status(Some("ананас"), &vocabulary());
        assert_eq!(crop.as_deref(), Some("Ананас"));
        assert_eq!(status, None);
    }

    #[test]
    fn test_crop_absent() {
        assert_eq!(extract_crop_and_status(None, &vocabulary()), (None, None));
        assert_eq!(extract_crop_and_status(Some("  "), &vocabulary()), (None, None));
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("ВИНОГРАД БЕЛЫЙ"), "Виноград Белый");
        assert_eq!(title_case("ЖУК-ЩЕЛКУН"), "Жук-Щелкун");
        assert_eq!(title_case("БИОЛОГИЧЕСКИЕ"), "Биологические");
    }
}
