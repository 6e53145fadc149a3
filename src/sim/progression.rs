//! XP, leveling and upgrades
//!
//! Leveling is gated: reaching the XP threshold pauses the arena and surfaces
//! an interstitial. While vocabulary challenges remain, the gate is a
//! challenge; a correct answer leads on to upgrade selection, a wrong one
//! closes the gate without reward. Once the queue is drained the gate goes
//! straight to upgrade selection.

use std::collections::VecDeque;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::state::{Arena, GameEvent, PlayerStats};
use crate::error::{ArenaError, Result};

/// One vocabulary record supplied by the content collaborator
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VocabChallenge {
    pub word: String,
    #[serde(default)]
    pub definition: Option<String>,
    #[serde(default)]
    pub part_of_speech: Option<String>,
    #[serde(default)]
    pub example: Option<String>,
    /// Illustration filled in by background enrichment, if it has resolved
    #[serde(default)]
    pub image_url: Option<String>,
}

impl VocabChallenge {
    pub fn new(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            ..Default::default()
        }
    }
}

/// Pending challenges, consumed destructively one per level gate
#[derive(Debug, Clone, Default)]
pub struct ChallengeQueue {
    pending: VecDeque<VocabChallenge>,
}

impl ChallengeQueue {
    /// Queue the records in a random order drawn from the session RNG
    pub fn shuffled<R: Rng + ?Sized>(mut records: Vec<VocabChallenge>, rng: &mut R) -> Self {
        records.shuffle(rng);
        Self {
            pending: records.into(),
        }
    }

    pub fn pop(&mut self) -> Option<VocabChallenge> {
        self.pending.pop_front()
    }

    pub fn peek(&self) -> Option<&VocabChallenge> {
        self.pending.front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Attach resolved media to every still-queued record for `word`.
    ///
    /// Called by the enrichment activity between ticks; returns whether any
    /// record was updated. Records already dequeued keep whatever they had.
    pub fn enrich(&mut self, word: &str, image_url: &str) -> bool {
        let mut updated = false;
        for record in self.pending.iter_mut().filter(|r| r.word == word) {
            record.image_url = Some(image_url.to_string());
            updated = true;
        }
        updated
    }
}

/// Stat change carried by an upgrade
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UpgradeEffect {
    Damage { amount: i32 },
    /// Shorter attack interval, never below `min_ticks`
    FireRate { ticks: u32, min_ticks: u32 },
    MoveSpeed { factor: f32 },
    /// Raises max hp and heals by the same amount
    MaxHp { amount: i32 },
    Heal { amount: i32 },
    PickupRadius { factor: f32 },
    ProjectileSpeed { amount: f32 },
    Multishot { count: u32 },
}

impl UpgradeEffect {
    /// Pure stat transform
    pub fn apply(self, stats: &PlayerStats) -> PlayerStats {
        let mut next = stats.clone();
        match self {
            UpgradeEffect::Damage { amount } => next.damage += amount,
            UpgradeEffect::FireRate { ticks, min_ticks } => {
                next.attack_interval_ticks = next
                    .attack_interval_ticks
                    .saturating_sub(ticks)
                    .max(min_ticks.max(1));
            }
            UpgradeEffect::MoveSpeed { factor } => next.speed *= factor,
            UpgradeEffect::MaxHp { amount } => {
                next.max_hp += amount;
                next.hp += amount;
            }
            UpgradeEffect::Heal { amount } => next.hp += amount,
            UpgradeEffect::PickupRadius { factor } => next.pickup_radius *= factor,
            UpgradeEffect::ProjectileSpeed { amount } => next.projectile_speed += amount,
            UpgradeEffect::Multishot { count } => next.projectile_count += count,
        }
        next.clamp_hp();
        next
    }
}

/// An entry in the static upgrade pool
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpgradeOption {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub effect: UpgradeEffect,
}

pub const UPGRADE_POOL: &[UpgradeOption] = &[
    UpgradeOption {
        id: "sharpened_quill",
        name: "Sharpened Quill",
        description: "+5 projectile damage",
        effect: UpgradeEffect::Damage { amount: 5 },
    },
    UpgradeOption {
        id: "quick_study",
        name: "Quick Study",
        description: "Fire 8 ticks sooner",
        effect: UpgradeEffect::FireRate {
            ticks: 8,
            min_ticks: 10,
        },
    },
    UpgradeOption {
        id: "swift_steps",
        name: "Swift Steps",
        description: "+15% movement speed",
        effect: UpgradeEffect::MoveSpeed { factor: 1.15 },
    },
    UpgradeOption {
        id: "thick_dictionary",
        name: "Thick Dictionary",
        description: "+20 max HP",
        effect: UpgradeEffect::MaxHp { amount: 20 },
    },
    UpgradeOption {
        id: "second_wind",
        name: "Second Wind",
        description: "Restore 40 HP",
        effect: UpgradeEffect::Heal { amount: 40 },
    },
    UpgradeOption {
        id: "word_magnet",
        name: "Word Magnet",
        description: "+30% pickup radius",
        effect: UpgradeEffect::PickupRadius { factor: 1.3 },
    },
    UpgradeOption {
        id: "rapid_recall",
        name: "Rapid Recall",
        description: "Faster projectiles",
        effect: UpgradeEffect::ProjectileSpeed { amount: 1.5 },
    },
    UpgradeOption {
        id: "echo_chamber",
        name: "Echo Chamber",
        description: "+1 extra projectile",
        effect: UpgradeEffect::Multishot { count: 1 },
    },
];

pub fn find_upgrade(id: &str) -> Option<&'static UpgradeOption> {
    UPGRADE_POOL.iter().find(|u| u.id == id)
}

/// Draw `count` distinct options without replacement
pub fn draw_upgrade_options<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<&'static UpgradeOption> {
    let count = count.min(UPGRADE_POOL.len());
    rand::seq::index::sample(rng, UPGRADE_POOL.len(), count)
        .into_iter()
        .map(|i| &UPGRADE_POOL[i])
        .collect()
}

/// Apply a chosen upgrade and close the level transition.
///
/// Every upgrade also grants one extra projectile on top of its own effect.
pub fn apply_upgrade(option: &UpgradeOption, stats: &PlayerStats, threshold_increment: u32) -> PlayerStats {
    let mut next = option.effect.apply(stats);
    next.projectile_count += 1;
    next.level += 1;
    next.close_level_gate(threshold_increment);
    next
}

/// A pause-gated UI event awaiting a collaborator result
#[derive(Debug, Clone, PartialEq)]
pub enum Interstitial {
    Challenge(VocabChallenge),
    UpgradeChoice { options: Vec<&'static UpgradeOption> },
}

impl Interstitial {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Interstitial::Challenge(_) => "challenge",
            Interstitial::UpgradeChoice { .. } => "upgrade choice",
        }
    }
}

/// Pull nearby gems toward the hero and collect the ones that arrive
pub fn collect_gems(arena: &mut Arena) {
    let hero_pos = arena.store.hero.pos;
    let pickup_radius = arena.stats.pickup_radius;
    let easing = arena.tuning.magnet_easing;
    let pickup_distance = arena.tuning.pickup_distance;

    let mut collected = 0u32;
    arena.store.gems.retain_mut(|gem| {
        if gem.pos.distance(hero_pos) <= pickup_radius {
            gem.pos += (hero_pos - gem.pos) * easing;
        }
        if gem.pos.distance(hero_pos) < pickup_distance {
            collected += 1;
            false
        } else {
            true
        }
    });

    for _ in 0..collected {
        arena.stats.xp += arena.tuning.xp_per_gem;
        arena.events.push(GameEvent::GemCollected);
    }
}

/// Open a level gate if the threshold has been reached.
///
/// At most one gate opens per tick; the gate pauses the arena.
pub fn check_level_gate(arena: &mut Arena) {
    if arena.session.interstitial.is_some() || arena.stats.xp < arena.stats.xp_to_next_level {
        return;
    }

    arena.session.paused = true;
    arena.store.hero.vel = glam::Vec2::ZERO;
    arena.store.hero.anim.moving = false;

    let interstitial = match arena.session.challenges.pop() {
        Some(challenge) => {
            log::info!(
                "Level gate at level {}: challenge '{}' ({} left)",
                arena.stats.level,
                challenge.word,
                arena.session.challenges.len()
            );
            Interstitial::Challenge(challenge)
        }
        None => {
            log::info!("Level gate at level {}: upgrade choice", arena.stats.level);
            Interstitial::UpgradeChoice {
                options: draw_upgrade_options(&mut arena.rng, arena.tuning.upgrade_choices),
            }
        }
    };
    arena.events.push(GameEvent::LevelGate {
        challenge: matches!(interstitial, Interstitial::Challenge(_)),
    });
    arena.session.interstitial = Some(interstitial);
}

impl Arena {
    /// The interstitial currently blocking gameplay, if any
    pub fn pending_interstitial(&self) -> Option<&Interstitial> {
        self.session.interstitial.as_ref()
    }

    /// Report the collaborator's verdict on the pending challenge
    pub fn resolve_challenge(&mut self, correct: bool) -> Result<()> {
        if self.session.result.is_terminal() {
            return Err(ArenaError::SessionOver);
        }
        let word = match &self.session.interstitial {
            Some(Interstitial::Challenge(challenge)) => challenge.word.clone(),
            Some(other) => {
                log::warn!("Challenge result reported during {}", other.kind_name());
                return Err(ArenaError::InterstitialMismatch {
                    expected: "challenge",
                    found: other.kind_name(),
                });
            }
            None => {
                log::warn!("Challenge result reported with nothing pending");
                return Err(ArenaError::NoPendingInterstitial);
            }
        };

        if correct {
            log::info!("Challenge '{}' answered correctly", word);
            self.session.interstitial = Some(Interstitial::UpgradeChoice {
                options: draw_upgrade_options(&mut self.rng, self.tuning.upgrade_choices),
            });
        } else {
            log::info!("Challenge '{}' missed; level withheld", word);
            self.stats.close_level_gate(self.tuning.threshold_increment);
            self.session.interstitial = None;
            self.session.paused = false;
            self.events.push(GameEvent::ChallengeFailed);
        }
        Ok(())
    }

    /// Apply the upgrade the player picked and resume
    pub fn choose_upgrade(&mut self, id: &str) -> Result<()> {
        if self.session.result.is_terminal() {
            return Err(ArenaError::SessionOver);
        }
        let offered = match &self.session.interstitial {
            Some(Interstitial::UpgradeChoice { options }) => options,
            Some(other) => {
                log::warn!("Upgrade '{}' chosen during {}", id, other.kind_name());
                return Err(ArenaError::InterstitialMismatch {
                    expected: "upgrade choice",
                    found: other.kind_name(),
                });
            }
            None => {
                log::warn!("Upgrade '{}' chosen with nothing pending", id);
                return Err(ArenaError::NoPendingInterstitial);
            }
        };
        let option = find_upgrade(id).ok_or_else(|| ArenaError::UnknownUpgrade(id.to_string()))?;
        if !offered.iter().any(|o| o.id == option.id) {
            return Err(ArenaError::UpgradeNotOffered(id.to_string()));
        }

        self.stats = apply_upgrade(option, &self.stats, self.tuning.threshold_increment);
        self.sync_hero();
        self.session.interstitial = None;
        self.session.paused = false;

        log::debug!("Applied upgrade '{}' -> {:?}", option.id, self.stats);
        log::info!("Reached level {}", self.stats.level);
        self.events.push(GameEvent::LevelUp {
            level: self.stats.level,
        });
        Ok(())
    }
}
