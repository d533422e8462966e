// Built-in catalog entries
//
// `fallback_catalog` is substituted whenever the configured source fails or
// returns nothing. `builtin_catalog` is the full offline catalog.

use crate::models::{MentalModel, ModelCategory, PerformanceMetrics};

pub const FIRST_PRINCIPLES: &str = "first-principles";
pub const SYSTEMS_THINKING: &str = "systems-thinking";
pub const SECOND_ORDER: &str = "second-order-thinking";
pub const INVERSION: &str = "inversion";
pub const OCCAMS_RAZOR: &str = "occams-razor";
pub const PARETO: &str = "pareto-principle";
pub const GAME_THEORY: &str = "game-theory";
pub const OPPORTUNITY_COST: &str = "opportunity-cost";
pub const CIRCLE_OF_COMPETENCE: &str = "circle-of-competence";
pub const PROBABILISTIC: &str = "probabilistic-thinking";
pub const HANLONS_RAZOR: &str = "hanlons-razor";
pub const FEEDBACK_LOOPS: &str = "feedback-loops";

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn metrics(accuracy: u8, usage_count: u32, success_rate: u8, relevance: u8) -> PerformanceMetrics {
    PerformanceMetrics {
        accuracy,
        usage_count,
        success_rate,
        relevance,
    }
}

fn first_principles() -> MentalModel {
    MentalModel {
        id: FIRST_PRINCIPLES.to_string(),
        name: "First-Principles Thinking".to_string(),
        category: ModelCategory::ProblemSolving,
        complexity: 7,
        scenarios: strings(&["innovation", "product design", "cost reduction"]),
        description: "Break a problem down into its most basic truths and rebuild a solution from there instead of reasoning by analogy.".to_string(),
        limitations: strings(&[
            "Time-consuming for routine decisions",
            "Requires deep domain knowledge to identify true fundamentals",
        ]),
        case_study: Some("Rebuilding battery cost estimates from raw material prices rather than market quotes.".to_string()),
        metrics: Some(metrics(87, 1240, 82, 91)),
    }
}

fn systems_thinking() -> MentalModel {
    MentalModel {
        id: SYSTEMS_THINKING.to_string(),
        name: "Systems Thinking".to_string(),
        category: ModelCategory::Systems,
        complexity: 8,
        scenarios: strings(&["organizational change", "policy design", "supply chains"]),
        description: "Look at how parts of a system interact over time, including delays, stocks, flows and feedback, rather than at parts in isolation.".to_string(),
        limitations: strings(&[
            "Models can grow too large to act on",
            "Boundaries of the system are a judgement call",
        ]),
        case_study: Some("Tracing a hospital's bed shortage to discharge delays two departments away.".to_string()),
        metrics: Some(metrics(84, 980, 79, 88)),
    }
}

fn second_order() -> MentalModel {
    MentalModel {
        id: SECOND_ORDER.to_string(),
        name: "Second-Order Thinking".to_string(),
        category: ModelCategory::DecisionMaking,
        complexity: 6,
        scenarios: strings(&["strategy", "policy", "long-term planning"]),
        description: "Ask \"and then what?\" to trace the consequences of consequences before committing to a decision.".to_string(),
        limitations: strings(&[
            "Predictions degrade quickly beyond a few steps",
            "Can stall decisions under time pressure",
        ]),
        case_study: None,
        metrics: Some(metrics(81, 870, 77, 85)),
    }
}

fn inversion() -> MentalModel {
    MentalModel {
        id: INVERSION.to_string(),
        name: "Inversion".to_string(),
        category: ModelCategory::ProblemSolving,
        complexity: 4,
        scenarios: strings(&["risk management", "project planning", "personal goals"]),
        description: "Work backwards: ask what would guarantee failure, then avoid those things.".to_string(),
        limitations: strings(&[
            "Avoiding failure is not the same as achieving success",
        ]),
        case_study: Some("Running a pre-mortem before a product launch to list every way it could flop.".to_string()),
        metrics: Some(metrics(79, 760, 80, 83)),
    }
}

fn occams_razor() -> MentalModel {
    MentalModel {
        id: OCCAMS_RAZOR.to_string(),
        name: "Occam's Razor".to_string(),
        category: ModelCategory::DecisionMaking,
        complexity: 2,
        scenarios: strings(&["diagnosis", "crisis response", "debugging"]),
        description: "Prefer the explanation or plan that needs the fewest assumptions.".to_string(),
        limitations: strings(&[
            "The simplest explanation is not always correct",
            "Can hide genuinely complex causes",
        ]),
        case_study: None,
        metrics: Some(metrics(76, 1420, 78, 80)),
    }
}

fn pareto() -> MentalModel {
    MentalModel {
        id: PARETO.to_string(),
        name: "Pareto Principle".to_string(),
        category: ModelCategory::Economics,
        complexity: 2,
        scenarios: strings(&["prioritization", "crisis response", "quality improvement"]),
        description: "Roughly 80% of effects come from 20% of causes; focus on the vital few.".to_string(),
        limitations: strings(&["The 80/20 split is a heuristic, not a law"]),
        case_study: Some("Fixing the top 20% of reported bugs removed most customer complaints.".to_string()),
        metrics: Some(metrics(74, 1310, 76, 79)),
    }
}

fn game_theory() -> MentalModel {
    MentalModel {
        id: GAME_THEORY.to_string(),
        name: "Game Theory".to_string(),
        category: ModelCategory::Strategy,
        complexity: 9,
        scenarios: strings(&["negotiation", "geopolitics", "competitive markets"]),
        description: "Model decisions as interactions between actors whose payoffs depend on each other's choices.".to_string(),
        limitations: strings(&[
            "Assumes actors are rational and payoffs are known",
            "Real games are rarely cleanly defined",
        ]),
        case_study: Some("Analysing arms-control talks as a repeated prisoner's dilemma.".to_string()),
        metrics: Some(metrics(83, 640, 74, 86)),
    }
}

fn opportunity_cost() -> MentalModel {
    MentalModel {
        id: OPPORTUNITY_COST.to_string(),
        name: "Opportunity Cost".to_string(),
        category: ModelCategory::Economics,
        complexity: 3,
        scenarios: strings(&["budgeting", "hiring", "career choices"]),
        description: "Every choice forgoes the next best alternative; weigh that hidden cost explicitly.".to_string(),
        limitations: strings(&["Alternatives are often hard to value"]),
        case_study: None,
        metrics: Some(metrics(78, 820, 79, 81)),
    }
}

fn circle_of_competence() -> MentalModel {
    MentalModel {
        id: CIRCLE_OF_COMPETENCE.to_string(),
        name: "Circle of Competence".to_string(),
        category: ModelCategory::Psychology,
        complexity: 3,
        scenarios: strings(&["investing", "career choices", "delegation"]),
        description: "Know the boundaries of what you genuinely understand and stay inside them or get help.".to_string(),
        limitations: strings(&["People misjudge where their circle ends"]),
        case_study: None,
        metrics: Some(metrics(75, 590, 77, 76)),
    }
}

fn probabilistic() -> MentalModel {
    MentalModel {
        id: PROBABILISTIC.to_string(),
        name: "Probabilistic Thinking".to_string(),
        category: ModelCategory::DecisionMaking,
        complexity: 7,
        scenarios: strings(&["forecasting", "health decisions", "investing"]),
        description: "Reason in likelihoods and ranges, updating beliefs as new evidence arrives.".to_string(),
        limitations: strings(&[
            "Base rates are often unknown",
            "Numbers can lend false precision",
        ]),
        case_study: Some("Estimating the probability of a supplier default before signing a contract.".to_string()),
        metrics: Some(metrics(85, 710, 80, 84)),
    }
}

fn hanlons_razor() -> MentalModel {
    MentalModel {
        id: HANLONS_RAZOR.to_string(),
        name: "Hanlon's Razor".to_string(),
        category: ModelCategory::Psychology,
        complexity: 1,
        scenarios: strings(&["conflict resolution", "team dynamics"]),
        description: "Never attribute to malice that which is adequately explained by mistakes or neglect.".to_string(),
        limitations: strings(&["Sometimes malice is the real cause"]),
        case_study: None,
        metrics: Some(metrics(72, 540, 75, 70)),
    }
}

fn feedback_loops() -> MentalModel {
    MentalModel {
        id: FEEDBACK_LOOPS.to_string(),
        name: "Feedback Loops".to_string(),
        category: ModelCategory::Systems,
        complexity: 5,
        scenarios: strings(&["growth strategy", "habit building", "technology adoption"]),
        description: "Identify reinforcing and balancing loops that amplify or dampen change.".to_string(),
        limitations: strings(&["Loop strength is hard to measure"]),
        case_study: None,
        metrics: Some(metrics(80, 660, 78, 82)),
    }
}

/// The fixed five-model list used when the catalog source is unavailable
pub fn fallback_catalog() -> Vec<MentalModel> {
    vec![
        first_principles(),
        systems_thinking(),
        second_order(),
        inversion(),
        occams_razor(),
    ]
}

/// The full offline catalog
pub fn builtin_catalog() -> Vec<MentalModel> {
    let mut catalog = fallback_catalog();
    catalog.extend([
        pareto(),
        game_theory(),
        opportunity_cost(),
        circle_of_competence(),
        probabilistic(),
        hanlons_razor(),
        feedback_loops(),
    ]);
    catalog
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_fallback_has_five_models() {
        assert_eq!(fallback_catalog().len(), 5);
    }

    #[test]
    fn test_builtin_ids_unique_and_complexity_in_range() {
        let catalog = builtin_catalog();
        let ids: HashSet<_> = catalog.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids.len(), catalog.len());
        assert!(catalog.iter().all(|m| (1..=10).contains(&m.complexity)));
    }

    #[test]
    fn test_builtin_extends_fallback() {
        let builtin = builtin_catalog();
        for (i, model) in fallback_catalog().iter().enumerate() {
            assert_eq!(&builtin[i], model);
        }
    }
}
