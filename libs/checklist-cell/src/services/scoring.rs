// libs/checklist-cell/src/services/scoring.rs
use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::debug;

use shared_utils::text::{contains_normalized, normalize};

use crate::models::{
    ChecklistCatalog, ChecklistItem, ChecklistPriority, ChecklistSelection, ScoredItem,
};

pub const DEFAULT_CONTEXT_BONUS: i32 = 10;

/// Keywords that mark an item and an appointment type as belonging to the
/// same kind of visit. The bonus applies once per group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordGroup {
    pub name: String,
    pub keywords: Vec<String>,
    pub bonus: i32,
}

impl KeywordGroup {
    pub fn new(name: &str, keywords: &[&str], bonus: i32) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| normalize(k)).collect(),
            bonus,
        }
    }

    /// `text` must already be normalized. Any substring occurrence counts,
    /// so `cirugia` also fires inside `postcirugia`.
    fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|keyword| text.contains(keyword.as_str()))
    }
}

/// Hand-tuned ophthalmology keyword table.
pub fn default_keyword_groups() -> Vec<KeywordGroup> {
    vec![
        KeywordGroup::new(
            "imaging",
            &[
                "oct", "tomografia", "retinografia", "angiografia", "campimetria",
                "campo visual", "topografia", "biometria", "paquimetria", "estudio", "study",
            ],
            15,
        ),
        KeywordGroup::new(
            "consultation",
            &["consulta", "consultation", "revision", "control", "seguimiento", "follow-up"],
            12,
        ),
        KeywordGroup::new(
            "surgery",
            &[
                "cirugia", "surgery", "quirurgic", "preoperatori", "postoperatori",
                "catarata", "vitrectomia",
            ],
            12,
        ),
        KeywordGroup::new(
            "treatment",
            &["inyeccion", "injection", "intravitrea", "laser", "tratamiento", "treatment"],
            10,
        ),
        KeywordGroup::new(
            "documentation",
            &["informe", "report", "consentimiento", "consent", "receta", "prescription"],
            6,
        ),
    ]
}

/// Scores checklist items against the appointment a booking is being made for.
#[derive(Debug, Clone)]
pub struct RelevanceScorer {
    groups: Vec<KeywordGroup>,
    context_bonus: i32,
}

impl RelevanceScorer {
    pub fn new(groups: Vec<KeywordGroup>, context_bonus: i32) -> Self {
        Self { groups, context_bonus }
    }

    pub fn groups(&self) -> &[KeywordGroup] {
        &self.groups
    }

    /// Weighted sum of category weight, keyword-group bonuses, context bonus,
    /// priority bonus and status bonus. Every term is non-negative.
    pub fn score(&self, item: &ChecklistItem, appointment_type: &str, context: &str) -> i32 {
        let item_text = normalize(&item.searchable_text());
        let appointment_text = normalize(appointment_type);

        let keyword_bonus: i32 = self
            .groups
            .iter()
            .filter(|group| group.matches(&item_text) && group.matches(&appointment_text))
            .map(|group| group.bonus)
            .sum();

        let context_bonus = if contains_normalized(context, &item.label) {
            self.context_bonus
        } else {
            0
        };

        item.category.base_weight()
            + keyword_bonus
            + context_bonus
            + item.priority.map_or(0, |p| p.bonus())
            + item.status.map_or(0, |s| s.bonus())
    }

    /// Items ordered by score, then priority, then earliest due date.
    pub fn rank_scored(
        &self,
        items: &[ChecklistItem],
        appointment_type: &str,
        context: &str,
    ) -> Vec<ScoredItem> {
        let mut scored: Vec<(&ChecklistItem, i32)> = items
            .iter()
            .map(|item| (item, self.score(item, appointment_type, context)))
            .collect();

        scored.sort_by(|(a, score_a), (b, score_b)| {
            score_b
                .cmp(score_a)
                .then_with(|| {
                    ChecklistPriority::rank(b.priority).cmp(&ChecklistPriority::rank(a.priority))
                })
                .then_with(|| compare_due_dates(a, b))
        });

        debug!(
            "Ranked {} checklist items for appointment type '{}'",
            scored.len(),
            appointment_type
        );

        scored
            .into_iter()
            .map(|(item, score)| ScoredItem {
                item_id: item.id.clone(),
                score,
            })
            .collect()
    }

    pub fn rank(&self, items: &[ChecklistItem], appointment_type: &str, context: &str) -> Vec<String> {
        self.rank_scored(items, appointment_type, context)
            .into_iter()
            .map(|scored| scored.item_id)
            .collect()
    }

    /// Rank the whole catalog and pre-select the best `limit` items.
    pub fn suggest(
        &self,
        catalog: &ChecklistCatalog,
        appointment_type: &str,
        context: &str,
        limit: usize,
    ) -> ChecklistSelection {
        let ranked = self.rank(catalog.items(), appointment_type, context);
        let suggested = select_top_n(&ranked, limit);
        debug!("Suggesting {:?} for '{}'", suggested, appointment_type);
        ChecklistSelection::with_suggestions(suggested)
    }
}

impl Default for RelevanceScorer {
    fn default() -> Self {
        Self::new(default_keyword_groups(), DEFAULT_CONTEXT_BONUS)
    }
}

/// The first `n` ranked ids. Advisory only.
pub fn select_top_n(ranked: &[String], n: usize) -> Vec<String> {
    ranked.iter().take(n).cloned().collect()
}

// Dated items come first; two undated items tie.
fn compare_due_dates(a: &ChecklistItem, b: &ChecklistItem) -> Ordering {
    match (a.due_date, b.due_date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
