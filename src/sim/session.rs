//! Session outcome
//!
//! A session is PLAYING until the boss dies (VICTORY) or the hero's hp runs
//! out (DEFEAT). Both outcomes are final: the score is frozen and the arena
//! stops accepting gameplay.

use serde::{Deserialize, Serialize};

use super::state::{Arena, GameEvent, KillCounts, SessionResult};

/// Results-screen summary of a finished (or in-progress) session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub seed: u64,
    pub result: SessionResult,
    pub score: u64,
    pub kills: KillCounts,
    pub level: u32,
    pub elapsed_seconds: f32,
}

/// Decide the outcome after combat. Boss death wins over simultaneous hero death.
pub fn evaluate(arena: &mut Arena, boss_killed: bool) {
    if arena.session.result.is_terminal() {
        return;
    }
    if boss_killed {
        end_session(arena, SessionResult::Victory);
    } else if arena.stats.hp <= 0 {
        end_session(arena, SessionResult::Defeat);
    }
}

fn end_session(arena: &mut Arena, result: SessionResult) {
    let score = arena.session.kills.score();
    arena.session.result = result;
    arena.session.final_score = Some(score);
    arena.session.interstitial = None;
    arena.session.paused = false;
    arena.store.hero.vel = glam::Vec2::ZERO;
    arena.store.hero.anim.moving = false;
    arena.events.push(GameEvent::SessionEnded { result });

    log::info!(
        "Session ended: {:?} after {:.1}s, score {} (mobs {}, elites {}, bosses {}), level {}",
        result,
        arena.session.elapsed_seconds,
        score,
        arena.session.kills.mobs,
        arena.session.kills.elites,
        arena.session.kills.bosses,
        arena.stats.level
    );
}

impl Arena {
    /// Current score; frozen once the session has ended
    pub fn score(&self) -> u64 {
        self.session
            .final_score
            .unwrap_or_else(|| self.session.kills.score())
    }

    pub fn is_over(&self) -> bool {
        self.session.result.is_terminal()
    }

    /// Summary of the session as it stands
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            seed: self.seed,
            result: self.session.result,
            score: self.score(),
            kills: self.session.kills,
            level: self.stats.level,
            elapsed_seconds: self.session.elapsed_seconds,
        }
    }

    /// Summary only once the session has reached a terminal state
    pub fn final_summary(&self) -> Option<SessionSummary> {
        self.is_over().then(|| self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Tier;
    use crate::tuning::Tuning;

    fn arena() -> Arena {
        Arena::new(3, Tuning::default(), Vec::new())
    }

    #[test]
    fn test_hp_zero_is_defeat() {
        let mut arena = arena();
        arena.stats.hp = 0;
        evaluate(&mut arena, false);
        assert_eq!(arena.session.result, SessionResult::Defeat);
        assert_eq!(
            arena.events.last(),
            Some(&GameEvent::SessionEnded {
                result: SessionResult::Defeat
            })
        );
    }

    #[test]
    fn test_boss_kill_beats_simultaneous_defeat() {
        let mut arena = arena();
        arena.stats.hp = 0;
        evaluate(&mut arena, true);
        assert_eq!(arena.session.result, SessionResult::Victory);
    }

    #[test]
    fn test_victory_score_is_frozen() {
        let mut arena = arena();
        for _ in 0..5 {
            arena.session.kills.record(Tier::Mob);
        }
        arena.session.kills.record(Tier::Boss);
        evaluate(&mut arena, true);

        let summary = arena.final_summary().expect("terminal");
        assert_eq!(summary.result, SessionResult::Victory);
        assert_eq!(summary.score, 105);

        arena.session.kills.record(Tier::Mob);
        assert_eq!(arena.score(), 105);
    }

    #[test]
    fn test_terminal_result_never_changes() {
        let mut arena = arena();
        arena.stats.hp = 0;
        evaluate(&mut arena, false);
        evaluate(&mut arena, true);
        assert_eq!(arena.session.result, SessionResult::Defeat);
        let ended = arena
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::SessionEnded { .. }))
            .count();
        assert_eq!(ended, 1);
    }

    #[test]
    fn test_playing_has_no_final_summary() {
        let arena = arena();
        assert!(arena.final_summary().is_none());
        assert_eq!(arena.summary().result, SessionResult::Playing);
    }

    #[test]
    fn test_summary_serializes() {
        let mut arena = arena();
        arena.stats.hp = 0;
        evaluate(&mut arena, false);
        let json = serde_json::to_string(&arena.summary()).expect("serialize");
        let back: SessionSummary = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.result, SessionResult::Defeat);
    }
}
