//! Game state and core simulation types
//!
//! The `EntityStore` is the single owner of every actor in the arena. Systems
//! reach entities only through it, addressing them by stable `EntityId`.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::progression::{ChallengeQueue, Interstitial, VocabChallenge};
use crate::consts::*;
use crate::tuning::{EnemyProfile, PlayerBase, Tuning};

/// Stable entity handle, never reused within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// What an entity is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Hero,
    Mob,
    Elite,
    EliteRanged,
    Boss,
    XpGem,
    Projectile,
    EnemyProjectile,
}

impl EntityKind {
    pub fn is_enemy(self) -> bool {
        matches!(
            self,
            EntityKind::Mob | EntityKind::Elite | EntityKind::EliteRanged | EntityKind::Boss
        )
    }

    /// Scoring tier (enemies only)
    pub fn tier(self) -> Option<Tier> {
        match self {
            EntityKind::Mob => Some(Tier::Mob),
            EntityKind::Elite | EntityKind::EliteRanged => Some(Tier::Elite),
            EntityKind::Boss => Some(Tier::Boss),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Hero => "hero",
            EntityKind::Mob => "mob",
            EntityKind::Elite => "elite",
            EntityKind::EliteRanged => "elite_ranged",
            EntityKind::Boss => "boss",
            EntityKind::XpGem => "xp_gem",
            EntityKind::Projectile => "projectile",
            EntityKind::EnemyProjectile => "enemy_projectile",
        }
    }
}

/// Enemy category used for kill counts and scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    Mob,
    Elite,
    Boss,
}

/// Sprite facing, derived from the dominant movement axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

/// Walk-cycle state for rendering
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Animation {
    pub facing: Facing,
    pub frame: u8,
    /// Wall-clock timestamp (ms) of the last frame advance
    pub last_frame_ms: f64,
    pub moving: bool,
}

/// A positioned actor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Bounding box (collision uses the circle of half the larger edge)
    pub size: Vec2,
    pub hp: i32,
    pub max_hp: i32,
    /// Melee damage for enemies, impact damage for projectiles
    pub contact_damage: i32,
    /// Ticks until this entity's next ranged attack
    pub attack_cooldown: u32,
    /// First tick at which this enemy may deal contact damage again
    /// (per-enemy cooldown mode only)
    pub contact_ready_tick: u64,
    pub anim: Animation,
}

impl Entity {
    pub fn new(id: EntityId, kind: EntityKind, pos: Vec2, size: Vec2) -> Self {
        Self {
            id,
            kind,
            pos,
            vel: Vec2::ZERO,
            size,
            hp: 1,
            max_hp: 1,
            contact_damage: 0,
            attack_cooldown: 0,
            contact_ready_tick: 0,
            anim: Animation::default(),
        }
    }

    /// Bounding circle radius
    #[inline]
    pub fn radius(&self) -> f32 {
        self.size.x.max(self.size.y) / 2.0
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Subtract damage, saturating at zero.
    ///
    /// Returns true only on the hit that takes the entity from alive to dead,
    /// so simultaneous hits on one tick can never report two kills.
    pub fn apply_damage(&mut self, damage: i32) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.hp = (self.hp - damage.max(0)).max(0);
        !self.is_alive()
    }

    pub fn hp_ratio(&self) -> f32 {
        if self.max_hp <= 0 {
            0.0
        } else {
            self.hp as f32 / self.max_hp as f32
        }
    }
}

/// Authoritative collections of every actor in the arena
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityStore {
    pub hero: Entity,
    /// Active enemies (sorted by id for determinism)
    pub enemies: Vec<Entity>,
    /// Player projectiles
    pub projectiles: Vec<Entity>,
    pub enemy_projectiles: Vec<Entity>,
    pub gems: Vec<Entity>,
    next_id: u32,
}

impl EntityStore {
    /// Empty store seeded with a single hero at `hero_pos`
    pub fn new(hero_pos: Vec2, hero_hp: i32) -> Self {
        let mut hero = Entity::new(
            EntityId(1),
            EntityKind::Hero,
            hero_pos,
            Vec2::splat(HERO_SIZE),
        );
        hero.hp = hero_hp;
        hero.max_hp = hero_hp;
        Self {
            hero,
            enemies: Vec::new(),
            projectiles: Vec::new(),
            enemy_projectiles: Vec::new(),
            gems: Vec::new(),
            next_id: 2,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn spawn_enemy(&mut self, kind: EntityKind, profile: &EnemyProfile, pos: Vec2) -> EntityId {
        let id = self.next_entity_id();
        let mut enemy = Entity::new(id, kind, pos, Vec2::splat(profile.size));
        enemy.hp = profile.hp.max(1);
        enemy.max_hp = enemy.hp;
        enemy.contact_damage = profile.contact_damage;
        self.enemies.push(enemy);
        id
    }

    pub fn spawn_projectile(&mut self, hostile: bool, pos: Vec2, vel: Vec2, damage: i32) -> EntityId {
        let id = self.next_entity_id();
        let kind = if hostile {
            EntityKind::EnemyProjectile
        } else {
            EntityKind::Projectile
        };
        let mut projectile = Entity::new(id, kind, pos, Vec2::splat(PROJECTILE_SIZE));
        projectile.vel = vel;
        projectile.contact_damage = damage;
        if hostile {
            self.enemy_projectiles.push(projectile);
        } else {
            self.projectiles.push(projectile);
        }
        id
    }

    pub fn spawn_gem(&mut self, pos: Vec2) -> EntityId {
        let id = self.next_entity_id();
        self.gems
            .push(Entity::new(id, EntityKind::XpGem, pos, Vec2::splat(GEM_SIZE)));
        id
    }

    /// Every entity in draw order: gems, enemies, hero, projectiles
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.gems
            .iter()
            .chain(&self.enemies)
            .chain(std::iter::once(&self.hero))
            .chain(&self.projectiles)
            .chain(&self.enemy_projectiles)
    }

    /// Total entities including the hero
    pub fn entity_count(&self) -> usize {
        1 + self.enemies.len() + self.projectiles.len() + self.enemy_projectiles.len() + self.gems.len()
    }

    pub fn boss(&self) -> Option<&Entity> {
        self.enemies.iter().find(|e| e.kind == EntityKind::Boss)
    }

    /// Ensure collections are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.enemies.sort_by_key(|e| e.id);
        self.projectiles.sort_by_key(|e| e.id);
        self.enemy_projectiles.sort_by_key(|e| e.id);
        self.gems.sort_by_key(|e| e.id);
    }
}

/// Progression-facing hero attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub hp: i32,
    pub max_hp: i32,
    pub speed: f32,
    pub damage: i32,
    pub attack_interval_ticks: u32,
    pub projectile_speed: f32,
    pub pickup_radius: f32,
    pub projectile_count: u32,
    pub level: u32,
    pub xp: u32,
    pub xp_to_next_level: u32,
}

impl PlayerStats {
    pub fn from_base(base: &PlayerBase) -> Self {
        Self {
            hp: base.max_hp,
            max_hp: base.max_hp,
            speed: base.speed,
            damage: base.damage,
            attack_interval_ticks: base.attack_interval_ticks.max(1),
            projectile_speed: base.projectile_speed,
            pickup_radius: base.pickup_radius,
            projectile_count: base.projectile_count,
            level: 1,
            xp: 0,
            xp_to_next_level: base.xp_to_next_level,
        }
    }

    /// Restore `0 <= hp <= max_hp`
    pub fn clamp_hp(&mut self) {
        self.max_hp = self.max_hp.max(1);
        self.hp = self.hp.clamp(0, self.max_hp);
    }

    /// Close a level transition (passed or failed): xp resets and the bar grows
    pub fn close_level_gate(&mut self, threshold_increment: u32) {
        self.xp = 0;
        self.xp_to_next_level += threshold_increment;
    }
}

/// Session outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionResult {
    #[default]
    Playing,
    Defeat,
    Victory,
}

impl SessionResult {
    pub fn is_terminal(self) -> bool {
        self != SessionResult::Playing
    }
}

/// Kills per enemy tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KillCounts {
    pub mobs: u32,
    pub elites: u32,
    pub bosses: u32,
}

impl KillCounts {
    pub fn record(&mut self, tier: Tier) {
        match tier {
            Tier::Mob => self.mobs += 1,
            Tier::Elite => self.elites += 1,
            Tier::Boss => self.bosses += 1,
        }
    }

    /// Weighted sum of kills
    pub fn score(&self) -> u64 {
        self.mobs as u64 * SCORE_MOB + self.elites as u64 * SCORE_ELITE + self.bosses as u64 * SCORE_BOSS
    }
}

/// Session-level bookkeeping
#[derive(Debug, Clone)]
pub struct SessionState {
    pub elapsed_seconds: f32,
    /// True while an interstitial is shown
    pub paused: bool,
    pub result: SessionResult,
    pub kills: KillCounts,
    pub challenges: ChallengeQueue,
    pub boss_spawned: bool,
    pub interstitial: Option<Interstitial>,
    /// Score frozen at the terminal moment
    pub final_score: Option<u64>,
}

/// Something that happened during a tick (fire-and-forget for audio/UI)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    EnemySpawned { kind: EntityKind },
    BossSpawned,
    PlayerFired { count: u32 },
    EnemyKilled { kind: EntityKind },
    PlayerHit { damage: i32 },
    GemCollected,
    LevelGate { challenge: bool },
    LevelUp { level: u32 },
    ChallengeFailed,
    SessionEnded { result: SessionResult },
}

/// Complete arena state for one session
#[derive(Debug, Clone)]
pub struct Arena {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    pub rng: Pcg32,
    /// Simulation tick counter (advances only while unpaused)
    pub time_ticks: u64,
    pub store: EntityStore,
    pub stats: PlayerStats,
    pub session: SessionState,
    /// Ticks until the next player volley
    pub fire_cooldown: u32,
    /// Ticks accumulated toward the next spawn slot
    pub spawn_timer: f32,
    /// First tick at which the shared contact window reopens
    pub contact_ready_tick: u64,
    /// Events produced since the last drain
    pub events: Vec<GameEvent>,
}

impl Arena {
    /// Create a new session: empty store with one hero, shuffled challenge queue
    pub fn new(seed: u64, tuning: Tuning, challenges: Vec<VocabChallenge>) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let stats = PlayerStats::from_base(&tuning.player);
        let store = EntityStore::new(
            Vec2::new(ARENA_WIDTH / 2.0, ARENA_HEIGHT / 2.0),
            stats.hp,
        );
        let challenges = ChallengeQueue::shuffled(challenges, &mut rng);

        log::info!(
            "Arena session started (seed {}, {} challenges queued)",
            seed,
            challenges.len()
        );

        Self {
            seed,
            rng,
            time_ticks: 0,
            store,
            fire_cooldown: stats.attack_interval_ticks,
            stats,
            session: SessionState {
                elapsed_seconds: 0.0,
                paused: false,
                result: SessionResult::Playing,
                kills: KillCounts::default(),
                challenges,
                boss_spawned: false,
                interstitial: None,
                final_score: None,
            },
            spawn_timer: 0.0,
            contact_ready_tick: 0,
            events: Vec::new(),
            tuning,
        }
    }

    /// Profile for an enemy kind
    pub fn profile(&self, kind: EntityKind) -> &EnemyProfile {
        self.tuning.profile(kind)
    }

    /// Whether gameplay may mutate this tick
    pub fn is_running(&self) -> bool {
        !self.session.paused && !self.session.result.is_terminal()
    }

    /// Copy progression hp onto the hero entity for rendering
    pub fn sync_hero(&mut self) {
        self.stats.clamp_hp();
        self.store.hero.hp = self.stats.hp;
        self.store.hero.max_hp = self.stats.max_hp;
    }

    /// Take every event produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
