//! Mock recommendation generator
//!
//! Domain → model-id lookup with a default row, simplicity promotion under
//! high urgency, position-based relevance with bounded jitter, and rationale
//! text rendered from per-model templates.

use tera::{Context, Tera};

use super::classifier::normalize_domain;
use super::scores::ScoreSource;
use crate::catalog::builtin::{
    CIRCLE_OF_COMPETENCE, FEEDBACK_LOOPS, FIRST_PRINCIPLES, GAME_THEORY, HANLONS_RAZOR, INVERSION,
    OCCAMS_RAZOR, OPPORTUNITY_COST, PARETO, PROBABILISTIC, SECOND_ORDER, SYSTEMS_THINKING,
};
use crate::models::{MentalModel, ModelRecommendation, Urgency};

pub const MAX_RECOMMENDATIONS: usize = 5;

/// Relevance of the first recommendation before jitter
const BASE_RELEVANCE: u8 = 95;
/// Relevance drop per position; larger than the jitter so order is strict
const RELEVANCE_STEP: u8 = 8;
const RELEVANCE_JITTER: u8 = 4;

/// Models promoted to the front under high urgency, in final order
pub const SIMPLICITY_MODELS: &[&str] = &[OCCAMS_RAZOR, PARETO];

const DEFAULT_MODELS: &[&str] = &[
    FIRST_PRINCIPLES,
    SYSTEMS_THINKING,
    SECOND_ORDER,
    INVERSION,
    OCCAMS_RAZOR,
];

const DOMAIN_MODELS: &[(&str, &[&str])] = &[
    (
        "business",
        &[FIRST_PRINCIPLES, OPPORTUNITY_COST, SECOND_ORDER, PARETO, INVERSION],
    ),
    (
        "technology",
        &[FIRST_PRINCIPLES, SYSTEMS_THINKING, OCCAMS_RAZOR, INVERSION, FEEDBACK_LOOPS],
    ),
    (
        "geopolitics",
        &[GAME_THEORY, SECOND_ORDER, SYSTEMS_THINKING, PROBABILISTIC, INVERSION],
    ),
    (
        "personal",
        &[INVERSION, OPPORTUNITY_COST, CIRCLE_OF_COMPETENCE, SECOND_ORDER, HANLONS_RAZOR],
    ),
    (
        "health",
        &[PROBABILISTIC, OCCAMS_RAZOR, INVERSION, SECOND_ORDER, CIRCLE_OF_COMPETENCE],
    ),
];

const GENERIC_RATIONALE: &str =
    "{{ model }} offers a structured lens on this {{ domain }} problem.";

const RATIONALES: &[(&str, &str)] = &[
    (FIRST_PRINCIPLES, "{{ model }} strips the {{ domain }} problem down to fundamentals so assumptions can be rebuilt from scratch."),
    (SYSTEMS_THINKING, "{{ model }} maps how the moving parts of this {{ domain }} situation feed into each other."),
    (SECOND_ORDER, "{{ model }} traces the knock-on effects of each {{ domain }} option before you commit."),
    (INVERSION, "{{ model }} asks what would guarantee failure in this {{ domain }} problem so you can avoid it."),
    (OCCAMS_RAZOR, "{{ model }} keeps the {{ domain }} response simple when there is little time to spare."),
    (PARETO, "{{ model }} finds the few {{ domain }} levers that produce most of the impact."),
    (GAME_THEORY, "{{ model }} models the incentives of each actor in this {{ domain }} situation."),
    (OPPORTUNITY_COST, "{{ model }} makes the hidden cost of each {{ domain }} choice explicit."),
    (CIRCLE_OF_COMPETENCE, "{{ model }} separates what you know about this {{ domain }} problem from what you need help with."),
    (PROBABILISTIC, "{{ model }} weighs {{ domain }} outcomes by likelihood instead of certainty."),
    (HANLONS_RAZOR, "{{ model }} checks whether the {{ domain }} friction is a mistake rather than ill intent."),
    (FEEDBACK_LOOPS, "{{ model }} spots the loops that will amplify or dampen change in this {{ domain }} system."),
];

/// Candidate model ids for a domain, falling back to the default row
pub fn models_for_domain(domain: &str) -> &'static [&'static str] {
    let key = normalize_domain(domain);
    DOMAIN_MODELS
        .iter()
        .find(|(d, _)| *d == key)
        .map(|(_, ids)| *ids)
        .unwrap_or(DEFAULT_MODELS)
}

/// Render the rationale for a model, using the generic template for unknown ids
pub fn rationale_for(model_id: &str, model_name: &str, domain: &str) -> String {
    let template = RATIONALES
        .iter()
        .find(|(id, _)| *id == model_id)
        .map(|(_, t)| *t)
        .unwrap_or(GENERIC_RATIONALE);

    let mut context = Context::new();
    context.insert("model", model_name);
    context.insert("domain", domain);

    match Tera::one_off(template, &context, false) {
        Ok(text) => text,
        Err(e) => {
            log::warn!("Failed to render rationale for {}: {}", model_id, e);
            format!("{} offers a structured lens on this {} problem.", model_name, domain)
        }
    }
}

/// Ordered candidate ids after catalog filtering and urgency promotion
pub fn candidate_ids(catalog: &[MentalModel], domain: &str, urgency: Urgency) -> Vec<String> {
    let in_catalog = |id: &str| catalog.iter().any(|m| m.id == id);

    let mut ids: Vec<String> = models_for_domain(domain)
        .iter()
        .filter(|id| in_catalog(id))
        .map(|id| id.to_string())
        .collect();

    if ids.is_empty() {
        ids = catalog
            .iter()
            .take(MAX_RECOMMENDATIONS)
            .map(|m| m.id.clone())
            .collect();
    }

    if urgency.favors_simplicity() {
        for simple in SIMPLICITY_MODELS.iter().rev() {
            if !in_catalog(simple) {
                continue;
            }
            ids.retain(|id| id != simple);
            ids.insert(0, simple.to_string());
        }
    }

    ids.truncate(MAX_RECOMMENDATIONS);
    ids
}

/// Build the recommendation list for a classified problem
pub fn recommend_models(
    catalog: &[MentalModel],
    domain: &str,
    urgency: Urgency,
    scores: &mut ScoreSource,
) -> Vec<ModelRecommendation> {
    let domain = normalize_domain(domain);

    candidate_ids(catalog, &domain, urgency)
        .into_iter()
        .enumerate()
        .filter_map(|(position, id)| {
            let model = catalog.iter().find(|m| m.id == id)?;
            let base = BASE_RELEVANCE.saturating_sub(RELEVANCE_STEP * position as u8);
            let relevance = base.saturating_add(scores.jitter(RELEVANCE_JITTER)).min(100);

            Some(ModelRecommendation {
                model_id: model.id.clone(),
                model_name: model.name.clone(),
                relevance,
                rationale: rationale_for(&model.id, &model.name, &domain),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::builtin::{builtin_catalog, fallback_catalog};

    fn ids(recs: &[ModelRecommendation]) -> Vec<&str> {
        recs.iter().map(|r| r.model_id.as_str()).collect()
    }

    #[test]
    fn test_geopolitics_critical_puts_simplicity_first() {
        for catalog in [builtin_catalog(), fallback_catalog()] {
            let mut scores = ScoreSource::from_entropy();
            let recs = recommend_models(&catalog, "geopolitics", Urgency::Critical, &mut scores);
            assert_eq!(recs[0].model_id, OCCAMS_RAZOR);
        }
    }

    #[test]
    fn test_high_urgency_promotes_existing_entry_without_duplicating() {
        let catalog = builtin_catalog();
        let mut scores = ScoreSource::seeded(3);
        let recs = recommend_models(&catalog, "technology", Urgency::High, &mut scores);
        let got = ids(&recs);
        assert_eq!(got[0], OCCAMS_RAZOR);
        assert_eq!(got[1], PARETO);
        assert_eq!(got.iter().filter(|id| **id == OCCAMS_RAZOR).count(), 1);
        assert_eq!(got.len(), MAX_RECOMMENDATIONS);
    }

    #[test]
    fn test_low_urgency_keeps_table_order() {
        let catalog = builtin_catalog();
        let mut scores = ScoreSource::seeded(3);
        let recs = recommend_models(&catalog, "business", Urgency::Low, &mut scores);
        assert_eq!(
            ids(&recs),
            vec![FIRST_PRINCIPLES, OPPORTUNITY_COST, SECOND_ORDER, PARETO, INVERSION]
        );
    }

    #[test]
    fn test_unknown_domain_uses_default_row() {
        let catalog = builtin_catalog();
        let mut scores = ScoreSource::seeded(9);
        let recs = recommend_models(&catalog, "astronomy", Urgency::Medium, &mut scores);
        assert_eq!(ids(&recs), DEFAULT_MODELS.to_vec());
    }

    #[test]
    fn test_scores_strictly_decrease_and_stay_in_range() {
        let catalog = builtin_catalog();
        for _ in 0..50 {
            let mut scores = ScoreSource::from_entropy();
            let recs = recommend_models(&catalog, "health", Urgency::Medium, &mut scores);
            assert!(!recs.is_empty());
            for (i, rec) in recs.iter().enumerate() {
                let base = BASE_RELEVANCE - RELEVANCE_STEP * i as u8;
                assert!(rec.relevance >= base && rec.relevance <= base + RELEVANCE_JITTER);
            }
            assert!(recs.windows(2).all(|w| w[0].relevance > w[1].relevance));
        }
    }

    #[test]
    fn test_ids_missing_from_catalog_are_skipped() {
        let catalog = fallback_catalog();
        let mut scores = ScoreSource::seeded(1);
        let recs = recommend_models(&catalog, "geopolitics", Urgency::Low, &mut scores);
        assert_eq!(ids(&recs), vec![SECOND_ORDER, SYSTEMS_THINKING, INVERSION]);
    }

    #[test]
    fn test_no_table_match_in_catalog_uses_catalog_head() {
        let catalog: Vec<MentalModel> = builtin_catalog()
            .into_iter()
            .filter(|m| m.id == HANLONS_RAZOR || m.id == FEEDBACK_LOOPS)
            .collect();
        let mut scores = ScoreSource::seeded(1);
        let recs = recommend_models(&catalog, "business", Urgency::Low, &mut scores);
        assert_eq!(ids(&recs), vec![HANLONS_RAZOR, FEEDBACK_LOOPS]);
    }

    #[test]
    fn test_same_seed_same_recommendations() {
        let catalog = builtin_catalog();
        let a = recommend_models(&catalog, "personal", Urgency::High, &mut ScoreSource::seeded(77));
        let b = recommend_models(&catalog, "personal", Urgency::High, &mut ScoreSource::seeded(77));
        assert_eq!(a, b);
    }

    #[test]
    fn test_rationale_substitution_and_fallback() {
        let text = rationale_for(INVERSION, "Inversion", "business");
        assert_eq!(
            text,
            "Inversion asks what would guarantee failure in this business problem so you can avoid it."
        );

        let generic = rationale_for("made-up", "Made Up", "health");
        assert_eq!(generic, "Made Up offers a structured lens on this health problem.");
    }
}
