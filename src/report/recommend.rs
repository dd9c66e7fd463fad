//! Advisory lines for one diagnostic record.

use crate::rules::{CropMetrics, Severity};

/// Builds the advice lines for a frame.
///
/// Lines come in a fixed order: temperature, water, fertilizer, parasites,
/// genome. A section without enough data is skipped.
pub fn build_recommendations(metrics: &CropMetrics) -> Vec<String> {
    let mut recommendations = Vec::new();

    if let Some(temperature) = &metrics.temperature {
        if let Some(current) = temperature.current {
            let target = temperature
                .target
                .map(|target| format!(" / {:.1}°", target))
                .unwrap_or_default();
            let line = format!(
                "Температура {:.1}°{} ({}) {}",
                current,
                target,
                temperature.status,
                temperature.notes.join(", ")
            );
            recommendations.push(line.trim().to_string());
        }
    }

    if let Some(water) = &metrics.water {
        if let Some(required) = water.required {
            recommendations.push(format!(
                "Вода {:.1}/{:.1} л ({})",
                water.current.unwrap_or(0.0),
                required,
                water.status
            ));
        }
    }

    let fertilizer = &metrics.fertilizer;
    if fertilizer.recommended {
        if let Some(dosage) = fertilizer.dosage_l {
            recommendations.push(format!(
                "Удобрение: {} — {:.1} л ({})",
                fertilizer.family.as_deref().unwrap_or("-"),
                dosage,
                fertilizer.rationale.as_deref().unwrap_or_default()
            ));
        }
    }

    let parasites = &metrics.parasites;
    if parasites.status != Severity::Ok {
        match &parasites.recommendation {
            Some(recommendation) => {
                recommendations.push(format!("Паразиты: {} → {}", parasites.detected, recommendation))
            }
            None => recommendations.push(format!("Паразиты: {} (требуется уточнение)", parasites.detected)),
        }
    }

    if let Some(genome) = &metrics.genome {
        let mut effects = genome.effects.join("; ");
        if let Some(risk) = &genome.risk {
            effects.push_str(&format!("; риск паразитов {}", risk));
        }
        recommendations.push(format!("Геном {}: {}", genome.sequence, effects));
    }

    recommendations
}
