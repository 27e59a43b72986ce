use indexmap::IndexMap;

use crate::state::play::PlayEvent;

/// Runs credited to one half-inning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfInningRuns {
    /// Inning number.
    pub inning: u32,
    /// True for the top half (away batting).
    pub is_top_inning: bool,
    /// Runs scored in that half.
    pub runs: u32,
}

/// Runs per half-inning derived from the play log, in the order halves were played.
///
/// Only halves in which at least one run scored are listed.
pub fn linescore(events: &[PlayEvent]) -> Vec<HalfInningRuns> {
    let mut halves: IndexMap<(u32, bool), u32> = IndexMap::new();
    for event in events {
        let runs = runs_in_play(event);
        if runs > 0 {
            *halves
                .entry((event.inning, event.is_top_inning))
                .or_default() += runs;
        }
    }

    halves
        .into_iter()
        .map(|((inning, is_top_inning), runs)| HalfInningRuns {
            inning,
            is_top_inning,
            runs,
        })
        .collect()
}

/// Runs recorded by a single play, read back from its description.
///
/// Home runs are recomputed from the occupancy stored with the play, so a legacy
/// description without a run clause still counts correctly.
pub fn runs_in_play(event: &PlayEvent) -> u32 {
    let result = event.result.as_str();
    if result.starts_with("Home Run") {
        return 1
            + u32::from(event.on_first)
            + u32::from(event.on_second)
            + u32::from(event.on_third);
    }
    if result == "Run Scored" || result.contains("Run Forced In") {
        return 1;
    }
    scored_clause(result).unwrap_or(0)
}

/// Parse the `N Run(s) Scored` clause of a description.
fn scored_clause(result: &str) -> Option<u32> {
    let words: Vec<&str> = result.split_whitespace().collect();
    words.windows(3).find_map(|window| match window {
        [count, "Run" | "Runs", "Scored"] => count.parse().ok(),
        _ => None,
    })
}
