use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

use super::config::EngineSettings;
use super::metrics::{
    BarReading, CropMetrics, FertilizerAdvice, GenomeInfo, ParasiteInfo, Severity,
};
use crate::hud::{
    HudParser, ParseResult, extract_genome, extract_soil, extract_stage, extract_temperature,
    extract_water, title_case,
};
use crate::knowledge::{CropFact, GeneTrait, KnowledgeBase, canonical_name, gene_traits};

/// Parasite field value meaning "no parasites".
pub const NO_PARASITES: &str = "Нет";
/// Alert tag raised for any unresolved parasite.
pub const PARASITE_ALERT: &str = "Паразиты";
/// Status phrases containing this (case-insensitive) ask for fertilizer.
pub const FERTILIZER_KEYWORD: &str = "УДОБ";
pub const FERTILIZER_RATIONALE: &str = "Рекомендуется добавить удобрения";
/// Risk flag set by a parasite-risk gene.
pub const PARASITE_RISK_RAISED: &str = "повышен";

pub const TEMPERATURE_UNIT: &str = "°C";
pub const WATER_UNIT: &str = "л";

/// Combines extracted HUD fields with knowledge-base facts.
///
/// Holds no per-call state; one engine can evaluate frames from many threads.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    knowledge: Arc<KnowledgeBase>,
    settings: EngineSettings,
    parser: HudParser,
}

impl RuleEngine {
    pub fn new(knowledge: Arc<KnowledgeBase>, settings: EngineSettings) -> Self {
        let parser = HudParser::new(&knowledge, settings.parasite_fuzzy_cutoff);
        Self {
            knowledge,
            settings,
            parser,
        }
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Parser sharing this engine's vocabularies and fuzzy cutoff.
    pub fn parser(&self) -> &HudParser {
        &self.parser
    }

    /// Produces the diagnostic record for one parsed frame.
    pub fn evaluate(&self, parsed: &ParseResult) -> CropMetrics {
        let crop_fact = parsed
            .crop
            .as_deref()
            .and_then(|crop| self.knowledge.get_crop(crop));
        if crop_fact.is_none() {
            debug!(crop = ?parsed.crop, "no crop fact");
        }

        let (stage, stage_percent) = extract_stage(parsed.stage_text.as_deref());
        let genome = parsed
            .genome_text
            .as_deref()
            .and_then(extract_genome)
            .map(|sequence| self.evaluate_genome(sequence));
        let temperature = parsed.temperature_text.as_deref().and_then(extract_temperature);
        let water = parsed.water_text.as_deref().and_then(extract_water);
        let soil_pct = parsed.soil_text.as_deref().and_then(extract_soil);

        let water_bar = self.evaluate_water(crop_fact, genome.as_ref(), water);
        let temperature_bar = self.evaluate_temperature(crop_fact, temperature);
        let parasites = self.evaluate_parasites(parsed.crop.as_deref(), parsed.parasites_text.as_deref());
        let fertilizer = self.evaluate_fertilizer(crop_fact, parsed.status_text.as_deref());
        let alerts = collect_alerts(water_bar.as_ref(), temperature_bar.as_ref(), &parasites);

        CropMetrics {
            crop: parsed.crop.clone(),
            status_text: parsed.status_text.clone(),
            stage,
            stage_percent,
            genome,
            temperature: temperature_bar,
            water: water_bar,
            soil_pct,
            parasites,
            fertilizer,
            alerts,
            timestamp: Utc::now(),
        }
    }

    fn evaluate_genome(&self, sequence: String) -> GenomeInfo {
        let mut effects = Vec::new();
        let mut water_multiplier = 1.0;
        let mut risk = None;

        for gene in sequence.chars() {
            if let Some(description) = self.knowledge.gene_effect(gene) {
                effects.push(format!("{} — {}", gene, description));
            }
            for gene_trait in gene_traits(gene) {
                match gene_trait {
                    GeneTrait::WaterDemand => water_multiplier *= self.settings.genome_water_multiplier,
                    GeneTrait::ParasiteRisk => risk = Some(PARASITE_RISK_RAISED.to_string()),
                }
            }
        }

        GenomeInfo {
            sequence,
            effects,
            risk,
            water_multiplier,
        }
    }

    fn evaluate_temperature(
        &self,
        crop_fact: Option<&CropFact>,
        temperature: Option<(f64, f64)>,
    ) -> Option<BarReading> {
        let (min, max) = crop_fact?.temperature_range?;
        let (current, target) = temperature?;

        let status = classify_temperature(
            current,
            (min, max),
            self.settings.temp_delta_near,
            self.settings.temp_delta_warn,
        );

        Some(BarReading {
            current: Some(current),
            target: Some(target),
            required: None,
            unit: TEMPERATURE_UNIT.to_string(),
            status,
            notes: vec![format!(
                "диапазон {}…{}{}",
                format_bound(min),
                format_bound(max),
                TEMPERATURE_UNIT
            )],
        })
    }

    fn evaluate_water(
        &self,
        crop_fact: Option<&CropFact>,
        genome: Option<&GenomeInfo>,
        water: Option<(f64, f64)>,
    ) -> Option<BarReading> {
        if crop_fact.is_none() && water.is_none() {
            return None;
        }

        let fact_required = crop_fact.and_then(|fact| fact.water_l);
        let (current, ocr_required) = match water {
            Some((current, required)) => (Some(current), Some(required)),
            None => (None, None),
        };

        // OCR value first, crop fact second; the genome multiplier applies to whichever won
        let required = ocr_required
            .or(fact_required)
            .map(|required| match genome {
                Some(genome) => required * genome.water_multiplier,
                None => required,
            });

        let mut notes = Vec::new();
        let status = match (current, required) {
            (Some(current), Some(required)) => {
                let status = classify_water(current, required);
                match status {
                    Severity::Critical => notes.push("критический дефицит воды".to_string()),
                    Severity::Warn => notes.push("нехватка воды".to_string()),
                    _ => {}
                }
                status
            }
            (None, Some(required)) => {
                notes.push(format!("нужно минимум {:.1} {}", required, WATER_UNIT));
                Severity::Ok
            }
            _ => Severity::Ok,
        };

        Some(BarReading {
            current,
            target: None,
            required,
            unit: WATER_UNIT.to_string(),
            status,
            notes,
        })
    }

    fn evaluate_parasites(&self, crop: Option<&str>, text: Option<&str>) -> ParasiteInfo {
        let phrase = text
            .map(str::trim)
            .filter(|phrase| !phrase.is_empty() && canonical_name(phrase) != canonical_name(NO_PARASITES));

        let Some(phrase) = phrase else {
            return ParasiteInfo {
                detected: NO_PARASITES.to_string(),
                status: Severity::Ok,
                recommendation: None,
                chemical_class: None,
                volume_l: None,
                confidence: 0.0,
            };
        };

        match self.knowledge.find_chemical(crop, phrase) {
            Some((chemical_class, chemical)) => ParasiteInfo {
                detected: phrase.to_string(),
                status: Severity::Warn,
                recommendation: Some(format!(
                    "{} — {:.1} {}",
                    title_case(chemical_class),
                    chemical.volume_l,
                    WATER_UNIT
                )),
                chemical_class: Some(chemical_class.to_string()),
                volume_l: Some(chemical.volume_l),
                confidence: 1.0,
            },
            None => {
                match self.parser.match_parasite(phrase) {
                    Some(closest) => debug!(phrase, closest, "unidentified parasite, closest known pest"),
                    None => debug!(phrase, "unidentified parasite"),
                }
                ParasiteInfo {
                    detected: phrase.to_string(),
                    status: Severity::Warn,
                    recommendation: None,
                    chemical_class: None,
                    volume_l: None,
                    confidence: 0.0,
                }
            }
        }
    }

    fn evaluate_fertilizer(&self, crop_fact: Option<&CropFact>, status_text: Option<&str>) -> FertilizerAdvice {
        let mut advice = FertilizerAdvice::default();
        let Some(fact) = crop_fact else {
            return advice;
        };

        advice.family = fact.fertilizer_family.clone();
        let requested = status_text.is_some_and(|status| status.to_uppercase().contains(FERTILIZER_KEYWORD));
        if requested {
            advice.recommended = true;
            advice.dosage_l = fact
                .water_l
                .map(|water| water * self.settings.fertilizer_apply_factor);
            advice.rationale = Some(FERTILIZER_RATIONALE.to_string());
        }
        advice
    }
}

/// Severity ladder for a temperature against a crop range, most severe first.
pub fn classify_temperature(current: f64, (min, max): (f64, f64), near: f64, warn: f64) -> Severity {
    if current < min - warn || current > max + warn {
        Severity::Critical
    } else if current < min - near || current > max + near {
        Severity::Warn
    } else if current < min || current > max {
        Severity::Near
    } else {
        Severity::Ok
    }
}

/// Water deficit classification: under half the requirement is critical.
pub fn classify_water(current: f64, required: f64) -> Severity {
    if current < 0.5 * required {
        Severity::Critical
    } else if current < required {
        Severity::Warn
    } else {
        Severity::Ok
    }
}

/// Alert tags in fixed order: water, temperature, parasites.
fn collect_alerts(
    water: Option<&BarReading>,
    temperature: Option<&BarReading>,
    parasites: &ParasiteInfo,
) -> Vec<String> {
    let mut alerts: Vec<String> = [water, temperature]
        .into_iter()
        .flatten()
        .filter(|reading| reading.status.is_alert())
        .map(|reading| reading.status.label().to_string())
        .collect();

    if parasites.status != Severity::Ok {
        alerts.push(PARASITE_ALERT.to_string());
    }
    alerts
}

/// Range bounds always show a decimal: 12 → "12.0", 12.5 → "12.5".
fn format_bound(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::thread;

    fn engine_with(settings: EngineSettings) -> RuleEngine {
        RuleEngine::new(Arc::new(KnowledgeBase::load_default().unwrap()), settings)
    }

    fn engine() -> RuleEngine {
        engine_with(EngineSettings::default())
    }

    fn build_parse_result() -> ParseResult {
        ParseResult {
            crop: Some("Кукуруза".to_string()),
            status_text: Some("Рекомендуется добавить удобрения".to_string()),
            stage_text: Some("СТАДИЯ I (2%)".to_string()),
            genome_text: Some("GGGGX".to_string()),
            temperature_text: Some("18.4° / 24.0°".to_string()),
            water_text: Some("4.0 л. / 5.0 л.".to_string()),
            soil_text: Some("0%".to_string()),
            parasites_text: Some("Нет".to_string()),
        }
    }

    fn with_multiplier(multiplier: f64) -> EngineSettings {
        EngineSettings {
            genome_water_multiplier: multiplier,
            ..EngineSettings::default()
        }
    }

    #[test]
    fn test_engine_evaluates_water_deficit() {
        let result = engine_with(with_multiplier(1.1)).evaluate(&build_parse_result());
        let water = result.water.unwrap();
        assert_eq!(water.status, Severity::Warn);
        assert_eq!(water.notes, vec!["нехватка воды".to_string()]);
        assert!(result.fertilizer.recommended);
        assert_eq!(result.fertilizer.dosage_l, Some(5.0));
    }

    #[test]
    fn test_water_multiplier_applies_after_fallback() {
        let parsed = ParseResult {
            genome_text: Some("G/G/W/G/X".to_string()),
            ..build_parse_result()
        };
        let result = engine_with(with_multiplier(1.1)).evaluate(&parsed);

        let water = result.water.unwrap();
        assert_relative_eq!(water.required.unwrap(), 5.5, epsilon = 1e-9);
        assert_eq!(water.current, Some(4.0));
        assert_eq!(water.status, Severity::Warn);
        // Fertilizer dosage uses the crop's raw water requirement
        assert_eq!(result.fertilizer.dosage_l, Some(5.0));
        assert_eq!(result.fertilizer.family.as_deref(), Some("АЗОТНЫЕ"));
    }

    #[test]
    fn test_water_critical_deficit() {
        let parsed = ParseResult {
            water_text: Some("2.0 л / 5.0 л".to_string()),
            ..build_parse_result()
        };
        let result = engine().evaluate(&parsed);
        let water = result.water.unwrap();
        assert_eq!(water.status, Severity::Critical);
        assert_eq!(water.notes, vec!["критический дефицит воды".to_string()]);
        assert_eq!(result.alerts, vec!["CRITICAL".to_string()]);
    }

    #[test]
    fn test_water_enough() {
        let parsed = ParseResult {
            water_text: Some("5.0 л / 5.0 л".to_string()),
            ..build_parse_result()
        };
        let water = engine().evaluate(&parsed).water.unwrap();
        assert_eq!(water.status, Severity::Ok);
        assert!(water.notes.is_empty());
    }

    #[test]
    fn test_water_falls_back_to_crop_fact() {
        let parsed = ParseResult {
            water_text: None,
            genome_text: Some("W".to_string()),
            ..build_parse_result()
        };
        let water = engine_with(with_multiplier(2.0)).evaluate(&parsed).water.unwrap();
        assert_eq!(water.current, None);
        assert_eq!(water.required, Some(10.0));
        assert_eq!(water.status, Severity::Ok);
        assert_eq!(water.notes, vec!["нужно минимум 10.0 л".to_string()]);
    }

    #[test]
    fn test_water_absent_without_fact_or_ocr() {
        let parsed = ParseResult {
            crop: Some("Ананас".to_string()),
            water_text: None,
            ..build_parse_result()
        };
        let result = engine().evaluate(&parsed);
        assert!(result.water.is_none());
        assert!(result.temperature.is_none());
    }

    #[test]
    fn test_water_without_crop_fact_uses_ocr_only() {
        let parsed = ParseResult {
            crop: Some("Ананас".to_string()),
            water_text: Some("1.0 л / 4.0 л".to_string()),
            ..build_parse_result()
        };
        let water = engine().evaluate(&parsed).water.unwrap();
        assert_eq!(water.required, Some(4.0));
        assert_eq!(water.status, Severity::Critical);
    }

    #[test]
    fn test_parasite_matching() {
        let parsed = ParseResult {
            parasites_text: Some("Тля".to_string()),
            ..build_parse_result()
        };
        let parasites = engine().evaluate(&parsed).parasites;
        assert_eq!(parasites.status, Severity::Warn);
        assert_eq!(parasites.chemical_class.as_deref(), Some("БИОЛОГИЧЕСКИЕ"));
        assert_eq!(parasites.volume_l, Some(2.1));
        assert_eq!(parasites.confidence, 1.0);
        assert_eq!(parasites.recommendation.as_deref(), Some("Биологические — 2.1 л"));
        assert_eq!(parasites.detected, "Тля");
    }

    #[test]
    fn test_unidentified_parasite_still_warns() {
        let parsed = ParseResult {
            parasites_text: Some("Саранча".to_string()),
            ..build_parse_result()
        };
        let result = engine().evaluate(&parsed);
        assert_eq!(result.parasites.status, Severity::Warn);
        assert_eq!(result.parasites.recommendation, None);
        assert_eq!(result.parasites.chemical_class, None);
        assert_eq!(result.parasites.confidence, 0.0);
        assert!(result.alerts.contains(&PARASITE_ALERT.to_string()));
    }

    #[test]
    fn test_no_parasites_sentinel() {
        for text in [None, Some("нет"), Some("  НЕТ "), Some("")] {
            let parsed = ParseResult {
                parasites_text: text.map(str::to_string),
                ..build_parse_result()
            };
            let parasites = engine().evaluate(&parsed).parasites;
            assert_eq!(parasites.status, Severity::Ok);
            assert_eq!(parasites.detected, NO_PARASITES);
        }
    }

    #[test]
    fn test_vine_pest_uses_vine_category() {
        let parsed = ParseResult {
            crop: Some("Виноград Белый".to_string()),
            parasites_text: Some("Цикады".to_string()),
            ..build_parse_result()
        };
        let parasites = engine().evaluate(&parsed).parasites;
        assert_eq!(parasites.chemical_class.as_deref(), Some("БИОЛОГИЧЕСКИЕ"));
        assert_eq!(parasites.confidence, 1.0);
    }

    #[test]
    fn test_temperature_within_range() {
        let temperature = engine().evaluate(&build_parse_result()).temperature.unwrap();
        assert_eq!(temperature.status, Severity::Ok);
        assert_eq!(temperature.current, Some(18.4));
        assert_eq!(temperature.target, Some(24.0));
        assert_eq!(temperature.unit, "°C");
        assert_eq!(temperature.notes, vec!["диапазон -2.0…24.0°C".to_string()]);
    }

    #[test]
    fn test_temperature_ladder() {
        let engine = engine();
        let cases = [
            ("24.3° / 20°", Severity::Near),
            ("24.5° / 20°", Severity::Near),
            ("25.0° / 20°", Severity::Warn),
            ("26.0° / 20°", Severity::Warn),
            ("26.5° / 20°", Severity::Critical),
            ("-2.3° / 20°", Severity::Near),
            ("-4.0° / 20°", Severity::Warn),
            ("-4.5° / 20°", Severity::Critical),
        ];
        for (text, expected) in cases {
            let parsed = ParseResult {
                temperature_text: Some(text.to_string()),
                ..build_parse_result()
            };
            let temperature = engine.evaluate(&parsed).temperature.unwrap();
            assert_eq!(temperature.status, expected, "for {}", text);
        }
    }

    #[test]
    fn test_temperature_severity_only_escalates() {
        let range = (12.0, 15.0);
        let mut previous = Severity::Ok;
        for step in 0..100 {
            let current = 15.0 + step as f64 * 0.1;
            let severity = classify_temperature(current, range, 0.5, 2.0);
            assert!(severity >= previous, "de-escalated at {}", current);
            previous = severity;
        }
        assert_eq!(previous, Severity::Critical);

        let mut previous = Severity::Ok;
        for step in 0..100 {
            let current = 12.0 - step as f64 * 0.1;
            let severity = classify_temperature(current, range, 0.5, 2.0);
            assert!(severity >= previous, "de-escalated at {}", current);
            previous = severity;
        }
        assert_eq!(previous, Severity::Critical);
    }

    #[test]
    fn test_temperature_absent_without_range() {
        let parsed = ParseResult {
            crop: Some("Виноград Розовый".to_string()),
            ..build_parse_result()
        };
        assert!(engine().evaluate(&parsed).temperature.is_none());

        let parsed = ParseResult {
            temperature_text: Some("жарко".to_string()),
            ..build_parse_result()
        };
        assert!(engine().evaluate(&parsed).temperature.is_none());
    }

    #[test]
    fn test_temperature_alert_follows_water_alert() {
        let parsed = ParseResult {
            temperature_text: Some("30° / 20°".to_string()),
            parasites_text: Some("Медведка".to_string()),
            ..build_parse_result()
        };
        let result = engine().evaluate(&parsed);
        assert_eq!(
            result.alerts,
            vec!["WARN".to_string(), "CRITICAL".to_string(), "Паразиты".to_string()]
        );
    }

    #[test]
    fn test_genome_effects_and_risk() {
        let parsed = ParseResult {
            genome_text: Some("G-W-X".to_string()),
            ..build_parse_result()
        };
        let genome = engine().evaluate(&parsed).genome.unwrap();
        assert_eq!(genome.sequence, "GWX");
        assert_eq!(
            genome.effects,
            vec![
                "G — ускоряет рост растения".to_string(),
                "W — требует больше воды".to_string(),
                "X — приманивает больше паразитов".to_string(),
            ]
        );
        assert_eq!(genome.risk.as_deref(), Some(PARASITE_RISK_RAISED));
        assert_relative_eq!(genome.water_multiplier, 1.15);
    }

    #[test]
    fn test_genome_multiplier_accumulates() {
        let parsed = ParseResult {
            genome_text: Some("WWG".to_string()),
            ..build_parse_result()
        };
        let genome = engine().evaluate(&parsed).genome.unwrap();
        assert_relative_eq!(genome.water_multiplier, 1.15 * 1.15);
        assert_eq!(genome.risk, None);
    }

    #[test]
    fn test_genome_absent() {
        let parsed = ParseResult {
            genome_text: Some("///".to_string()),
            ..build_parse_result()
        };
        assert!(engine().evaluate(&parsed).genome.is_none());
    }

    #[test]
    fn test_fertilizer_not_requested() {
        let parsed = ParseResult {
            status_text: Some("Посажено".to_string()),
            ..build_parse_result()
        };
        let fertilizer = engine().evaluate(&parsed).fertilizer;
        assert!(!fertilizer.recommended);
        assert_eq!(fertilizer.family.as_deref(), Some("АЗОТНЫЕ"));
        assert_eq!(fertilizer.dosage_l, None);
    }

    #[test]
    fn test_fertilizer_apply_factor() {
        let settings = EngineSettings {
            fertilizer_apply_factor: 0.5,
            ..EngineSettings::default()
        };
        let fertilizer = engine_with(settings).evaluate(&build_parse_result()).fertilizer;
        assert_eq!(fertilizer.dosage_l, Some(2.5));
        assert_eq!(fertilizer.rationale.as_deref(), Some(FERTILIZER_RATIONALE));
    }

    #[test]
    fn test_fertilizer_without_crop_fact() {
        let parsed = ParseResult {
            crop: Some("Ананас".to_string()),
            ..build_parse_result()
        };
        let fertilizer = engine().evaluate(&parsed).fertilizer;
        assert_eq!(fertilizer, FertilizerAdvice::default());
    }

    #[test]
    fn test_stage_and_soil() {
        let result = engine().evaluate(&build_parse_result());
        assert_eq!(result.stage.as_deref(), Some("I"));
        assert_eq!(result.stage_percent, Some(2.0));
        assert_eq!(result.soil_pct, Some(0.0));
        assert_eq!(result.crop.as_deref(), Some("Кукуруза"));
    }

    #[test]
    fn test_concurrent_evaluation_is_consistent() {
        let engine = Arc::new(engine());
        let parsed = ParseResult {
            parasites_text: Some("Тля".to_string()),
            ..build_parse_result()
        };
        let expected = engine.evaluate(&parsed);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let engine = Arc::clone(&engine);
                let parsed = parsed.clone();
                thread::spawn(move || engine.evaluate(&parsed))
            })
            .collect();

        for handle in handles {
            let result = handle.join().expect("evaluation thread panicked");
            assert_eq!(result.water, expected.water);
            assert_eq!(result.temperature, expected.temperature);
            assert_eq!(result.parasites, expected.parasites);
            assert_eq!(result.alerts, expected.alerts);
        }
    }
}
