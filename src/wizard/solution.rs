//! Mock solution generator
//!
//! Every model has a playbook: description template, implementation steps,
//! score ranges, risks, benefits and the biases it is prone to. Unknown
//! model ids get the generic playbook instead of an error.

use chrono::Utc;
use std::collections::BTreeMap;
use tera::{Context, Tera};
use uuid::Uuid;

use super::scores::ScoreSource;
use crate::catalog::builtin::{
    CIRCLE_OF_COMPETENCE, FEEDBACK_LOOPS, FIRST_PRINCIPLES, GAME_THEORY, HANLONS_RAZOR, INVERSION,
    OCCAMS_RAZOR, OPPORTUNITY_COST, PARETO, PROBABILISTIC, SECOND_ORDER, SYSTEMS_THINKING,
};
use crate::export::ExportFormat;
use crate::models::{
    BiasAnalysis, BiasRisk, ConfidenceLevel, MentalModel, ProblemSubmission, Severity, Solution,
    SolutionVariant,
};

const DEFAULT_STAKEHOLDERS: &[&str] = &["Decision makers", "Affected teams", "End users"];

/// Bounds for the confidence score behind `ConfidenceLevel`
const CONFIDENCE_RANGE: (u8, u8) = (55, 95);

struct Playbook {
    model_id: &'static str,
    title: &'static str,
    description: &'static str,
    steps: &'static [&'static str],
    feasibility: (u8, u8),
    innovation: (u8, u8),
    risks: &'static [&'static str],
    benefits: &'static [&'static str],
    biases: &'static [&'static str],
}

struct BiasTemplate {
    id: &'static str,
    name: &'static str,
    evidence: &'static str,
    mitigation: &'static str,
}

const BIAS_CATALOG: &[BiasTemplate] = &[
    BiasTemplate {
        id: "confirmation",
        name: "Confirmation Bias",
        evidence: "Framing of the {{ domain }} problem leans on evidence that supports the first explanation considered.",
        mitigation: "Assign someone to argue the opposite case and list disconfirming evidence.",
    },
    BiasTemplate {
        id: "anchoring",
        name: "Anchoring",
        evidence: "Early numbers or precedents in the {{ domain }} description may dominate later estimates.",
        mitigation: "Generate independent estimates before looking at the initial figures.",
    },
    BiasTemplate {
        id: "availability",
        name: "Availability Heuristic",
        evidence: "Recent or vivid {{ domain }} events may be overweighted against base rates.",
        mitigation: "Look up base rates for similar situations before judging likelihood.",
    },
    BiasTemplate {
        id: "overconfidence",
        name: "Overconfidence",
        evidence: "The {{ domain }} plan assumes outcomes with more certainty than the evidence allows.",
        mitigation: "State explicit confidence ranges and revisit them as data arrives.",
    },
    BiasTemplate {
        id: "sunk_cost",
        name: "Sunk Cost Fallacy",
        evidence: "Past investment in the current {{ domain }} approach may be steering the decision.",
        mitigation: "Evaluate options only on future costs and benefits.",
    },
    BiasTemplate {
        id: "groupthink",
        name: "Groupthink",
        evidence: "Consensus on the {{ domain }} direction formed without visible dissent.",
        mitigation: "Collect opinions anonymously before group discussion.",
    },
    BiasTemplate {
        id: "status_quo",
        name: "Status Quo Bias",
        evidence: "Options that keep the current {{ domain }} arrangement are treated as the safe default.",
        mitigation: "Score doing nothing as an explicit option with its own risks.",
    },
];

const GENERIC_PLAYBOOK: Playbook = Playbook {
    model_id: "",
    title: "{{ model }} Approach",
    description: "Apply {{ model }} to \"{{ issue }}\" and turn the insight into a short action plan.",
    steps: &[
        "Restate the problem in one sentence",
        "Apply the model's core question to each part of the problem",
        "Pick the most promising action",
        "Review the result after a fixed interval",
    ],
    feasibility: (55, 80),
    innovation: (40, 70),
    risks: &["Generic application may miss domain specifics"],
    benefits: &["Brings structure to an unstructured problem"],
    biases: &["confirmation", "overconfidence"],
};

const PLAYBOOKS: &[Playbook] = &[
    Playbook {
        model_id: FIRST_PRINCIPLES,
        title: "Rebuild from Fundamentals",
        description: "Decompose \"{{ issue }}\" into the facts that cannot be argued with, then design a {{ domain }} solution upward from those facts using {{ model }}.",
        steps: &[
            "List every assumption embedded in the current approach",
            "Challenge each assumption until only verifiable facts remain",
            "Recombine the facts into at least three new solution options",
            "Prototype the cheapest option and measure against the old baseline",
        ],
        feasibility: (60, 80),
        innovation: (75, 95),
        risks: &["Slow to produce results", "May discard useful conventional wisdom"],
        benefits: &["Breakthrough options that analogy would miss", "Clear understanding of cost drivers"],
        biases: &["anchoring", "overconfidence", "status_quo"],
    },
    Playbook {
        model_id: SYSTEMS_THINKING,
        title: "Map the System",
        description: "Use {{ model }} to draw the stocks, flows and feedback around \"{{ issue }}\" and intervene at the highest-leverage point in the {{ domain }} system.",
        steps: &[
            "Identify the actors, resources and flows involved",
            "Draw the causal loop diagram and mark delays",
            "Locate leverage points where small changes shift behaviour",
            "Pilot an intervention and watch for unintended loops",
        ],
        feasibility: (50, 75),
        innovation: (65, 90),
        risks: &["Diagram can grow beyond what the team can act on", "Delayed effects make results hard to attribute"],
        benefits: &["Addresses root causes instead of symptoms", "Surfaces unintended consequences early"],
        biases: &["confirmation", "groupthink"],
    },
    Playbook {
        model_id: SECOND_ORDER,
        title: "Follow the Consequences",
        description: "For each option addressing \"{{ issue }}\", use {{ model }} to ask \"and then what?\" at least twice before choosing a {{ domain }} course of action.",
        steps: &[
            "List the candidate options",
            "Write down first-order effects for each",
            "Extend each effect to second and third order",
            "Choose the option whose later consequences are acceptable",
        ],
        feasibility: (65, 85),
        innovation: (50, 75),
        risks: &["Speculative chains of consequences", "Analysis paralysis under time pressure"],
        benefits: &["Avoids quick wins that backfire", "Better long-term alignment"],
        biases: &["overconfidence", "availability"],
    },
    Playbook {
        model_id: INVERSION,
        title: "Avoid Failure First",
        description: "Invert \"{{ issue }}\": use {{ model }} to list what would make this {{ domain }} situation fail and remove those causes one by one.",
        steps: &[
            "Run a pre-mortem: assume the effort failed and ask why",
            "Rank failure causes by likelihood and impact",
            "Design a guard against each of the top causes",
            "Assign owners to monitor the early warning signs",
        ],
        feasibility: (70, 90),
        innovation: (45, 70),
        risks: &["Focus on avoidance can crowd out ambition"],
        benefits: &["Quick to apply", "Reduces the chance of obvious mistakes"],
        biases: &["availability", "status_quo"],
    },
    Playbook {
        model_id: OCCAMS_RAZOR,
        title: "Simplest Viable Plan",
        description: "Use {{ model }} to pick the explanation of \"{{ issue }}\" with the fewest assumptions and act on the simplest {{ domain }} plan that addresses it.",
        steps: &[
            "List competing explanations",
            "Count the assumptions each one needs",
            "Act on the simplest explanation that fits the facts",
            "Escalate to a richer model only if the simple plan fails",
        ],
        feasibility: (80, 95),
        innovation: (30, 55),
        risks: &["May oversimplify a genuinely complex cause"],
        benefits: &["Fast to execute", "Easy to communicate under pressure"],
        biases: &["confirmation", "overconfidence"],
    },
    Playbook {
        model_id: PARETO,
        title: "Focus on the Vital Few",
        description: "Apply {{ model }} to \"{{ issue }}\": find the 20% of {{ domain }} causes behind 80% of the impact and address those first.",
        steps: &[
            "Collect data on causes and their impact",
            "Rank causes and find the cumulative 80% cut-off",
            "Direct resources to the top causes",
            "Re-measure and repeat",
        ],
        feasibility: (75, 92),
        innovation: (35, 60),
        risks: &["The long tail may hide an important issue"],
        benefits: &["High return on limited effort", "Clear prioritisation"],
        biases: &["availability", "anchoring"],
    },
    Playbook {
        model_id: GAME_THEORY,
        title: "Shape the Incentives",
        description: "Model \"{{ issue }}\" as a game with {{ model }}: identify each {{ domain }} actor's options and payoffs, then choose a strategy robust to their responses.",
        steps: &[
            "Identify the players and their goals",
            "Map each player's options and payoffs",
            "Find equilibria and the moves that shift them",
            "Commit to a strategy and signal it credibly",
        ],
        feasibility: (45, 70),
        innovation: (70, 92),
        risks: &["Payoffs may be misjudged", "Actors may not behave rationally"],
        benefits: &["Anticipates counter-moves", "Reveals cooperative options"],
        biases: &["overconfidence", "groupthink", "anchoring"],
    },
    Playbook {
        model_id: OPPORTUNITY_COST,
        title: "Price the Alternatives",
        description: "Use {{ model }} to compare every {{ domain }} option for \"{{ issue }}\" against the best alternative it rules out.",
        steps: &[
            "List realistic alternatives, including doing nothing",
            "Estimate what each alternative would return",
            "Compare each option against the best forgone alternative",
            "Choose and record what was given up",
        ],
        feasibility: (70, 90),
        innovation: (40, 65),
        risks: &["Alternatives are hard to value precisely"],
        benefits: &["Makes trade-offs explicit", "Prevents wasting scarce resources"],
        biases: &["sunk_cost", "status_quo"],
    },
    Playbook {
        model_id: CIRCLE_OF_COMPETENCE,
        title: "Know Your Boundaries",
        description: "Use {{ model }} to split \"{{ issue }}\" into parts you understand deeply and {{ domain }} parts that need outside expertise.",
        steps: &[
            "List the knowledge the problem requires",
            "Mark which areas are inside your competence",
            "Bring in expertise for the areas outside it",
            "Decide only on what you can evaluate",
        ],
        feasibility: (70, 88),
        innovation: (35, 60),
        risks: &["Boundaries may be misjudged"],
        benefits: &["Fewer unforced errors", "Better use of expert help"],
        biases: &["overconfidence", "confirmation"],
    },
    Playbook {
        model_id: PROBABILISTIC,
        title: "Think in Likelihoods",
        description: "Use {{ model }} to assign probabilities to the {{ domain }} outcomes of \"{{ issue }}\" and choose the option with the best expected result.",
        steps: &[
            "Find base rates for similar situations",
            "Estimate probabilities for each outcome",
            "Compute expected value for each option",
            "Update estimates as new evidence arrives",
        ],
        feasibility: (55, 78),
        innovation: (55, 80),
        risks: &["False precision in estimates", "Base rates may not exist"],
        benefits: &["Calibrated decisions", "Explicit handling of uncertainty"],
        biases: &["anchoring", "availability", "overconfidence"],
    },
    Playbook {
        model_id: HANLONS_RAZOR,
        title: "Assume Error Before Malice",
        description: "Use {{ model }} to reframe the friction in \"{{ issue }}\" as a likely mistake and fix the {{ domain }} process that allowed it.",
        steps: &[
            "Describe the behaviour without attributing intent",
            "List process gaps that could explain it",
            "Talk to the people involved",
            "Fix the process and monitor",
        ],
        feasibility: (80, 95),
        innovation: (25, 50),
        risks: &["Genuine bad faith may go unaddressed"],
        benefits: &["Defuses conflict", "Improves processes"],
        biases: &["confirmation", "groupthink"],
    },
    Playbook {
        model_id: FEEDBACK_LOOPS,
        title: "Tune the Loops",
        description: "Use {{ model }} to find the reinforcing and balancing loops behind \"{{ issue }}\" and strengthen the ones that move the {{ domain }} system toward the goal.",
        steps: &[
            "Identify what grows or shrinks over time",
            "Trace the loops that drive each change",
            "Add or strengthen balancing loops where growth is harmful",
            "Measure loop strength after each change",
        ],
        feasibility: (55, 78),
        innovation: (60, 85),
        risks: &["Loop effects are delayed and hard to measure"],
        benefits: &["Sustainable change", "Early warning of runaway effects"],
        biases: &["status_quo", "confirmation"],
    },
];

fn playbook_for(model_id: &str) -> &'static Playbook {
    PLAYBOOKS
        .iter()
        .find(|p| p.model_id == model_id)
        .unwrap_or(&GENERIC_PLAYBOOK)
}

fn bias_template(id: &str) -> Option<&'static BiasTemplate> {
    BIAS_CATALOG.iter().find(|b| b.id == id)
}

fn render(template: &str, context: &Context) -> String {
    match Tera::one_off(template, context, false) {
        Ok(text) => text,
        Err(e) => {
            log::warn!("Failed to render solution template: {}", e);
            template.to_string()
        }
    }
}

fn humanize_id(model_id: &str) -> String {
    model_id
        .split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn severity_from_index(index: usize) -> Severity {
    match index {
        0 => Severity::Low,
        1 => Severity::Medium,
        _ => Severity::High,
    }
}

fn bias_analysis(
    playbook: &Playbook,
    context: &Context,
    scores: &mut ScoreSource,
) -> BiasAnalysis {
    let biases: Vec<BiasRisk> = playbook
        .biases
        .iter()
        .filter_map(|id| bias_template(id))
        .map(|template| BiasRisk {
            bias_type: template.name.to_string(),
            severity: severity_from_index(scores.index(3)),
            evidence: render(template.evidence, context),
            mitigation: template.mitigation.to_string(),
        })
        .collect();

    let risk_score = if biases.is_empty() {
        0
    } else {
        let total: u32 = biases.iter().map(|b| b.severity.weight()).sum();
        (total / biases.len() as u32) as u8
    };

    let confidence_score = scores.range(CONFIDENCE_RANGE.0, CONFIDENCE_RANGE.1);

    BiasAnalysis {
        risk_score,
        biases,
        confidence: ConfidenceLevel::from_score(confidence_score),
    }
}

fn stakeholder_views(
    submission: &ProblemSubmission,
    model_name: &str,
    playbook: &Playbook,
) -> BTreeMap<String, String> {
    let stakeholders: Vec<String> = if submission.stakeholders.is_empty() {
        DEFAULT_STAKEHOLDERS.iter().map(|s| s.to_string()).collect()
    } else {
        submission.stakeholders.clone()
    };

    let headline = playbook
        .benefits
        .first()
        .copied()
        .unwrap_or("a clearer view of the trade-offs");

    stakeholders
        .into_iter()
        .map(|name| {
            let view = format!(
                "For {}, {} mainly offers {}; the main concern is {}.",
                name,
                model_name,
                headline.to_lowercase(),
                playbook
                    .risks
                    .first()
                    .map(|r| r.to_lowercase())
                    .unwrap_or_else(|| "execution risk".to_string())
            );
            (name, view)
        })
        .collect()
}

/// Generate one solution for `model_id` against the active submission
pub fn generate_solution(
    catalog: &[MentalModel],
    submission: &ProblemSubmission,
    model_id: &str,
    scores: &mut ScoreSource,
) -> Solution {
    let playbook = playbook_for(model_id);
    let model_name = catalog
        .iter()
        .find(|m| m.id == model_id)
        .map(|m| m.name.clone())
        .unwrap_or_else(|| humanize_id(model_id));

    let mut context = Context::new();
    context.insert("model", &model_name);
    context.insert("domain", &submission.domain);
    context.insert("issue", &submission.structured.core_issue);

    let variant = SolutionVariant {
        title: render(playbook.title, &context),
        description: render(playbook.description, &context),
        feasibility: scores.range(playbook.feasibility.0, playbook.feasibility.1),
        innovation: scores.range(playbook.innovation.0, playbook.innovation.1),
        steps: playbook.steps.iter().map(|s| s.to_string()).collect(),
        risks: playbook.risks.iter().map(|s| s.to_string()).collect(),
        benefits: playbook.benefits.iter().map(|s| s.to_string()).collect(),
    };

    let bias_analysis = bias_analysis(playbook, &context, scores);
    let stakeholder_views = stakeholder_views(submission, &model_name, playbook);

    Solution {
        id: Uuid::new_v4().to_string(),
        submission_id: submission.id.clone(),
        model_id: model_id.to_string(),
        model_name,
        variants: vec![variant],
        bias_analysis,
        stakeholder_views,
        export_formats: ExportFormat::all().to_vec(),
        created_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::builtin::builtin_catalog;
    use crate::models::{ComplexityEstimate, StructuredData, Urgency};

    fn submission(stakeholders: Vec<String>) -> ProblemSubmission {
        ProblemSubmission {
            id: "sub-1".to_string(),
            text: "Our supplier raised prices by 30%. We must decide this week.".to_string(),
            domain: "business".to_string(),
            urgency: Urgency::High,
            stakeholders,
            context: None,
            structured: StructuredData {
                core_issue: "Our supplier raised prices by 30%".to_string(),
                complexity: ComplexityEstimate::Medium,
                constraints: vec!["We must decide this week".to_string()],
            },
            submitted_at: Utc::now(),
        }
    }

    #[test]
    fn test_every_playbook_bias_is_in_catalog() {
        for playbook in PLAYBOOKS.iter().chain(std::iter::once(&GENERIC_PLAYBOOK)) {
            assert!((2..=3).contains(&playbook.biases.len()));
            for id in playbook.biases {
                assert!(bias_template(id).is_some(), "unknown bias {}", id);
            }
        }
    }

    #[test]
    fn test_known_model_uses_playbook_ranges() {
        let catalog = builtin_catalog();
        let sub = submission(vec![]);
        for _ in 0..30 {
            let solution =
                generate_solution(&catalog, &sub, INVERSION, &mut ScoreSource::from_entropy());
            let variant = &solution.variants[0];
            assert!((70..=90).contains(&variant.feasibility));
            assert!((45..=70).contains(&variant.innovation));
            assert_eq!(variant.title, "Avoid Failure First");
            assert!(variant.description.contains("Our supplier raised prices by 30%"));
            assert!(variant.description.contains("business"));
            assert_eq!(variant.steps.len(), 4);
        }
    }

    #[test]
    fn test_solution_references_submission() {
        let catalog = builtin_catalog();
        let solution = generate_solution(
            &catalog,
            &submission(vec![]),
            OCCAMS_RAZOR,
            &mut ScoreSource::seeded(5),
        );
        assert_eq!(solution.submission_id, "sub-1");
        assert_eq!(solution.model_id, OCCAMS_RAZOR);
        assert_eq!(solution.model_name, "Occam's Razor");
        assert_eq!(solution.export_formats.len(), 3);
    }

    #[test]
    fn test_unknown_model_gets_generic_text() {
        let catalog = builtin_catalog();
        let solution = generate_solution(
            &catalog,
            &submission(vec![]),
            "lateral-thinking",
            &mut ScoreSource::seeded(5),
        );
        assert_eq!(solution.model_name, "Lateral Thinking");
        assert_eq!(solution.variants[0].title, "Lateral Thinking Approach");
        assert!((55..=80).contains(&solution.variants[0].feasibility));
    }

    #[test]
    fn test_bias_analysis_bounds() {
        let catalog = builtin_catalog();
        for _ in 0..30 {
            let solution = generate_solution(
                &catalog,
                &submission(vec![]),
                GAME_THEORY,
                &mut ScoreSource::from_entropy(),
            );
            let analysis = &solution.bias_analysis;
            assert_eq!(analysis.biases.len(), 3);
            assert!((25..=85).contains(&analysis.risk_score));
            for bias in &analysis.biases {
                assert!(!bias.mitigation.is_empty());
                assert!(bias.evidence.contains("business"));
            }
        }
    }

    #[test]
    fn test_stakeholder_views() {
        let catalog = builtin_catalog();
        let custom = generate_solution(
            &catalog,
            &submission(vec!["Finance".to_string(), "Suppliers".to_string()]),
            PARETO,
            &mut ScoreSource::seeded(1),
        );
        assert_eq!(custom.stakeholder_views.len(), 2);
        assert!(custom.stakeholder_views["Finance"].starts_with("For Finance, Pareto Principle"));

        let defaults = generate_solution(
            &catalog,
            &submission(vec![]),
            PARETO,
            &mut ScoreSource::seeded(1),
        );
        assert_eq!(defaults.stakeholder_views.len(), DEFAULT_STAKEHOLDERS.len());
    }

    #[test]
    fn test_same_seed_same_scores() {
        let catalog = builtin_catalog();
        let sub = submission(vec![]);
        let a = generate_solution(&catalog, &sub, SYSTEMS_THINKING, &mut ScoreSource::seeded(11));
        let b = generate_solution(&catalog, &sub, SYSTEMS_THINKING, &mut ScoreSource::seeded(11));
        assert_eq!(a.variants, b.variants);
        assert_eq!(a.bias_analysis, b.bias_analysis);
    }
}
