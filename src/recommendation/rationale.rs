//! Human-readable rationale lines.

use super::confidence::round_display;
use crate::scoring::ScoringDetails;
use crate::tier::CareTier;

pub const MAX_RATIONALE_LINES: usize = 6;
const MAX_SECTIONS: usize = 3;
const NO_CARE_CLOSING: &str = "✓ No formal care is needed right now. Return if circumstances change.";

/// `snake_case` id to "Title Case".
pub fn titleize(id: &str) -> String {
    id.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Headline, up to three scoring sections with their top answer, and a
/// closing line for the no-care tier. At most six lines.
pub fn build_rationale(details: &ScoringDetails, tier: CareTier, total_score: f64) -> Vec<String> {
    let mut lines = vec![format!(
        "Based on {} points, we recommend: {}",
        round_display(total_score),
        tier.label()
    )];

    let mut sections: Vec<_> = details.by_section.iter().collect();
    // stable: equal scores keep declaration order
    sections.sort_by(|a, b| b.score.total_cmp(&a.score));

    for section in sections.into_iter().take(MAX_SECTIONS) {
        if section.score <= 0.0 {
            continue;
        }
        lines.push(format!(
            "{}: {} points",
            titleize(&section.section_id),
            round_display(section.score)
        ));
        if let Some(top) = section.top_detail().filter(|d| d.score > 0.0) {
            lines.push(format!("• {}", top.answer));
        }
    }

    if tier == CareTier::None {
        lines.push(NO_CARE_CLOSING.to_string());
    }

    lines.truncate(MAX_RATIONALE_LINES);
    lines
}
