//! Catalog filter/search engine
//!
//! Pure functions over a catalog slice. The same criteria over the same
//! catalog always give the same ordered output.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{MentalModel, ModelCategory};

/// Category criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum CategoryFilter {
    All,
    Only(ModelCategory),
}

impl Default for CategoryFilter {
    fn default() -> Self {
        CategoryFilter::All
    }
}

/// Complexity bucket criterion. Buckets are disjoint and cover 1-10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityFilter {
    All,
    /// 1-3
    Simple,
    /// 4-7
    Moderate,
    /// 8-10
    Complex,
}

impl ComplexityFilter {
    pub fn buckets() -> &'static [ComplexityFilter] {
        &[
            ComplexityFilter::Simple,
            ComplexityFilter::Moderate,
            ComplexityFilter::Complex,
        ]
    }

    /// Inclusive range for the bucket, `None` for `All`
    pub fn range(&self) -> Option<(u8, u8)> {
        match self {
            ComplexityFilter::All => None,
            ComplexityFilter::Simple => Some((1, 3)),
            ComplexityFilter::Moderate => Some((4, 7)),
            ComplexityFilter::Complex => Some((8, 10)),
        }
    }

    pub fn matches(&self, complexity: u8) -> bool {
        match self.range() {
            None => true,
            Some((lo, hi)) => (lo..=hi).contains(&complexity),
        }
    }

    /// Bucket a score falls into
    pub fn bucket_for(complexity: u8) -> ComplexityFilter {
        Self::buckets()
            .iter()
            .copied()
            .find(|b| b.matches(complexity))
            .unwrap_or(ComplexityFilter::Complex)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplexityFilter::All => "all",
            ComplexityFilter::Simple => "simple",
            ComplexityFilter::Moderate => "moderate",
            ComplexityFilter::Complex => "complex",
        }
    }
}

impl Default for ComplexityFilter {
    fn default() -> Self {
        ComplexityFilter::All
    }
}

/// The three independent filter criteria
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub category: CategoryFilter,
    #[serde(default)]
    pub complexity: ComplexityFilter,
}

impl FilterCriteria {
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_category(mut self, category: ModelCategory) -> Self {
        self.category = CategoryFilter::Only(category);
        self
    }

    pub fn with_complexity(mut self, complexity: ComplexityFilter) -> Self {
        self.complexity = complexity;
        self
    }

    /// True when no criterion narrows the catalog
    pub fn is_identity(&self) -> bool {
        self.query.trim().is_empty()
            && self.category == CategoryFilter::All
            && self.complexity == ComplexityFilter::All
    }

    /// Check a single model against every active criterion
    pub fn matches(&self, model: &MentalModel) -> bool {
        let category_ok = match self.category {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => model.category == c,
        };

        category_ok && self.complexity.matches(model.complexity) && matches_query(model, &self.query)
    }
}

fn matches_query(model: &MentalModel, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }

    model.name.to_lowercase().contains(&needle)
        || model.description.to_lowercase().contains(&needle)
        || model
            .scenarios
            .iter()
            .any(|s| s.to_lowercase().contains(&needle))
}

/// Filter a catalog, preserving catalog order
pub fn filter_models(catalog: &[MentalModel], criteria: &FilterCriteria) -> Vec<MentalModel> {
    if criteria.is_identity() {
        return catalog.to_vec();
    }

    catalog
        .iter()
        .filter(|m| criteria.matches(m))
        .cloned()
        .collect()
}

/// Per-category and per-bucket counts for the catalog view
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub total: usize,
    pub by_category: BTreeMap<String, usize>,
    pub by_complexity: BTreeMap<String, usize>,
    pub average_complexity: f64,
}

pub fn catalog_stats(catalog: &[MentalModel]) -> CatalogStats {
    let mut stats = CatalogStats {
        total: catalog.len(),
        ..Default::default()
    };

    for model in catalog {
        *stats
            .by_category
            .entry(model.category.as_str().to_string())
            .or_insert(0) += 1;
        *stats
            .by_complexity
            .entry(ComplexityFilter::bucket_for(model.complexity).as_str().to_string())
            .or_insert(0) += 1;
    }

    if !catalog.is_empty() {
        let sum: u32 = catalog.iter().map(|m| m.complexity as u32).sum();
        stats.average_complexity = sum as f64 / catalog.len() as f64;
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::builtin::{builtin_catalog, fallback_catalog};

    fn ids(models: &[MentalModel]) -> Vec<&str> {
        models.iter().map(|m| m.id.as_str()).collect()
    }

    #[test]
    fn test_no_criteria_is_identity() {
        let catalog = builtin_catalog();
        let result = filter_models(&catalog, &FilterCriteria::default());
        assert_eq!(result, catalog);
    }

    #[test]
    fn test_whitespace_query_is_inactive() {
        let catalog = builtin_catalog();
        let criteria = FilterCriteria::default().with_query("   ");
        assert_eq!(filter_models(&catalog, &criteria).len(), catalog.len());
    }

    #[test]
    fn test_query_is_case_insensitive_on_name() {
        let catalog = builtin_catalog();
        let criteria = FilterCriteria::default().with_query("OCCAM");
        assert_eq!(ids(&filter_models(&catalog, &criteria)), vec!["occams-razor"]);
    }

    #[test]
    fn test_query_matches_scenario_tags() {
        let catalog = builtin_catalog();
        let criteria = FilterCriteria::default().with_query("crisis response");
        let result = filter_models(&catalog, &criteria);
        assert_eq!(ids(&result), vec!["occams-razor", "pareto-principle"]);
    }

    #[test]
    fn test_query_matches_description() {
        let catalog = builtin_catalog();
        let criteria = FilterCriteria::default().with_query("fewest assumptions");
        assert_eq!(ids(&filter_models(&catalog, &criteria)), vec!["occams-razor"]);
    }

    #[test]
    fn test_category_and_bucket_combine() {
        let catalog = builtin_catalog();
        let criteria = FilterCriteria::default()
            .with_category(ModelCategory::DecisionMaking)
            .with_complexity(ComplexityFilter::Simple);
        assert_eq!(ids(&filter_models(&catalog, &criteria)), vec!["occams-razor"]);
    }

    #[test]
    fn test_buckets_are_disjoint_and_cover_range() {
        for score in 1..=10u8 {
            let hits = ComplexityFilter::buckets()
                .iter()
                .filter(|b| b.matches(score))
                .count();
            assert_eq!(hits, 1, "score {} must fall in exactly one bucket", score);
        }
    }

    #[test]
    fn test_filter_is_idempotent_and_order_preserving() {
        let catalog = builtin_catalog();
        let criteria_set = vec![
            FilterCriteria::default().with_query("ing"),
            FilterCriteria::default().with_complexity(ComplexityFilter::Moderate),
            FilterCriteria::default()
                .with_query("e")
                .with_category(ModelCategory::Economics),
            FilterCriteria::default().with_query("zzz-no-match"),
        ];

        for criteria in criteria_set {
            let once = filter_models(&catalog, &criteria);
            let twice = filter_models(&once, &criteria);
            assert_eq!(once, twice);

            let positions: Vec<usize> = once
                .iter()
                .map(|m| catalog.iter().position(|c| c.id == m.id).unwrap())
                .collect();
            assert!(positions.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_fallback_with_default_criteria_returns_all_five() {
        let fallback = fallback_catalog();
        assert_eq!(filter_models(&fallback, &FilterCriteria::default()).len(), 5);
    }

    #[test]
    fn test_catalog_stats() {
        let stats = catalog_stats(&fallback_catalog());
        assert_eq!(stats.total, 5);
        assert_eq!(stats.by_category.get("problem_solving"), Some(&2));
        assert_eq!(stats.by_complexity.get("simple"), Some(&1));
        assert_eq!(stats.by_complexity.get("moderate"), Some(&3));
        assert_eq!(stats.by_complexity.get("complex"), Some(&1));
        assert!((stats.average_complexity - 5.4).abs() < 1e-9);
    }

    #[test]
    fn test_criteria_deserialize_from_frontend_shape() {
        let criteria: FilterCriteria = serde_json::from_str(
            r#"{"query": "risk", "category": {"type": "only", "value": "problem_solving"}, "complexity": "moderate"}"#,
        )
        .unwrap();
        assert_eq!(criteria.category, CategoryFilter::Only(ModelCategory::ProblemSolving));
        assert_eq!(criteria.complexity, ComplexityFilter::Moderate);
    }
}
