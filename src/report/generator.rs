//! Analysis text generation.
//!
//! Each team gets one fixed-template block. Averages are printed with
//! one decimal place, raw season numbers as they were supplied.

use crate::analysis::{DefenseSummary, OffenseSummary};

/// Render the scoring block for one team.
pub fn render_offense_block(summary: &OffenseSummary) -> String {
    let mut block = String::new();

    block.push_str(&format!("{} analysis:\n", summary.team));
    block.push_str(&format!("- Average points: {:.1}\n", summary.mean_points));
    block.push_str(&format!(
        "- Best season: {}, points {}\n",
        summary.best.season, summary.best.points
    ));
    block.push_str(&format!(
        "- Worst season: {}, points {}\n",
        summary.worst.season, summary.worst.points
    ));

    block
}

/// Render the defensive block for one team.
pub fn render_defense_block(summary: &DefenseSummary) -> String {
    let mut block = String::new();

    block.push_str(&format!("{} defensive analysis:\n", summary.team));

    block.push_str("- Season averages:\n");
    block.push_str(&format!(
        "  • Defensive rebounds: {:.1}\n",
        summary.mean_defensive_rebounds
    ));
    block.push_str(&format!("  • Steals: {:.1}\n", summary.mean_steals));
    block.push_str(&format!("  • Blocks: {:.1}\n", summary.mean_blocks));

    let best = &summary.best;
    block.push_str(&format!("- Best defensive season: {}\n", best.season));
    block.push_str(&format!(
        "  • Defensive rebounds: {}\n",
        best.defensive_rebounds
    ));
    block.push_str(&format!("  • Steals: {}\n", best.steals));
    block.push_str(&format!("  • Blocks: {}\n", best.blocks));

    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{SeasonDefense, SeasonPoints};
    use crate::models::Stat;

    #[test]
    fn test_render_offense_block() {
        let summary = OffenseSummary {
            team: "Denver Nuggets".to_string(),
            mean_points: 9012.26,
            best: SeasonPoints {
                season: "2022-23".to_string(),
                points: Stat(9562.0),
            },
            worst: SeasonPoints {
                season: "2020-21".to_string(),
                points: Stat(8371.5),
            },
        };

        let block = render_offense_block(&summary);

        assert_eq!(
            block,
            "Denver Nuggets analysis:\n\
             - Average points: 9012.3\n\
             - Best season: 2022-23, points 9562\n\
             - Worst season: 2020-21, points 8371.5\n"
        );
    }

    #[test]
    fn test_render_defense_block() {
        let summary = DefenseSummary {
            team: "Utah Jazz".to_string(),
            mean_blocks: 404.333,
            mean_steals: 525.0,
            mean_defensive_rebounds: 2867.66,
            best: SeasonDefense {
                season: "2018-19".to_string(),
                blocks: Stat(483.0),
                steals: Stat(665.0),
                defensive_rebounds: Stat(2923.0),
            },
        };

        let block = render_defense_block(&summary);

        assert!(block.starts_with("Utah Jazz defensive analysis:\n"));
        assert!(block.contains("  • Defensive rebounds: 2867.7\n"));
        assert!(block.contains("  • Steals: 525.0\n"));
        assert!(block.contains("- Best defensive season: 2018-19\n"));
        assert!(block.contains("  • Defensive rebounds: 2923\n"));
        assert!(block.ends_with("  • Blocks: 483\n"));
    }
}
