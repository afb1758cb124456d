//! Units: templates, attack pool construction and wound resolution
//!
//! A [`Unit`] owns its models and all per-battle combat state. The attack
//! and defend algorithms here are pure functions of the unit and the random
//! source passed in; nothing in this module logs or looks at the board
//! beyond the unit's own position.

use crate::core::dice::{roll_d6, roll_pool, DicePool, DieColor, WoundPool};
use crate::core::entity::UnitId;
use crate::core::keyword::{Capabilities, Keyword};
use crate::core::model::Model;
use crate::core::types::{Phase, Position, Side, UnitName};
use crate::{Result, SkirmishError};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Best and worst possible save thresholds
pub const BEST_SAVE: u32 = 2;
pub const WORST_SAVE: u32 = 6;

/// Armor tier; lower save thresholds are better
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ArmorTier {
    #[serde(rename = "Unarmored", alias = "None")]
    Unarmored,
    #[serde(rename = "Light Armor", alias = "Light")]
    Light,
    #[serde(rename = "Medium Armor", alias = "Medium")]
    Medium,
    #[serde(rename = "Heavy Armor", alias = "Heavy")]
    Heavy,
    #[serde(rename = "Super Heavy Armor", alias = "Super Heavy")]
    SuperHeavy,
}

impl ArmorTier {
    pub fn base_save(self) -> u32 {
        match self {
            ArmorTier::Unarmored => 6,
            ArmorTier::Light => 5,
            ArmorTier::Medium => 4,
            ArmorTier::Heavy => 3,
            ArmorTier::SuperHeavy => 2,
        }
    }
}

/// Roster description of a unit, as loaded from data files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitTemplate {
    pub name: String,
    pub num_models: u32,
    pub wounds_per_model: u32,
    pub armor: ArmorTier,
    pub movement: f64,
    pub ap_cost: u32,
    #[serde(default)]
    pub missile_dice: Vec<DieColor>,
    #[serde(default)]
    pub melee_dice: Vec<DieColor>,
    #[serde(default)]
    pub attack_range: f64,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl UnitTemplate {
    pub fn validate(&self) -> Result<()> {
        if self.num_models == 0 {
            return Err(SkirmishError::InvalidRoster(format!(
                "{} has no models",
                self.name
            )));
        }
        if self.wounds_per_model == 0 {
            return Err(SkirmishError::InvalidRoster(format!(
                "{} has zero wounds per model",
                self.name
            )));
        }
        if self.ap_cost == 0 {
            return Err(SkirmishError::InvalidRoster(format!(
                "{} must cost at least 1 AP",
                self.name
            )));
        }
        if self.movement < 0.0 || self.attack_range < 0.0 {
            return Err(SkirmishError::InvalidRoster(format!(
                "{} has negative movement or range",
                self.name
            )));
        }
        Ok(())
    }

    pub fn parsed_keywords(&self) -> Result<Vec<Keyword>> {
        self.keywords.iter().map(|k| Keyword::parse(k)).collect()
    }
}

/// What happened inside one `defend` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DefendReport {
    /// Save threshold in force for this attack
    pub threshold: u32,
    /// Wounds soaked by shields
    pub absorbed: u32,
    /// Wounds that entered the queue
    pub queued: u32,
    pub saved: u32,
    /// Damage points that landed on living models
    pub damage: u32,
    pub models_killed: u32,
    /// Kills held back by Last Stand
    pub deferred: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueuedWound {
    Mortal,
    Double,
    Normal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub name: UnitName,
    pub owner: Side,
    pub initial_num_models: u32,
    pub num_models: u32,
    /// Roster order; the front is the oldest model
    pub models: Vec<Model>,
    pub wounds_per_model: u32,
    pub armor: ArmorTier,
    pub movement: f64,
    pub attack_range: f64,
    pub ap_cost: u32,
    pub missile_dice: DicePool,
    pub melee_dice: DicePool,
    pub keywords: Vec<Keyword>,
    pub caps: Capabilities,
    pub position: Option<Position>,
    /// Handle of the unit this one is locked in melee with
    pub melee_target: Option<UnitId>,
    pub has_activated: bool,
    pub shields_remaining: u32,
    pub pending_casualties: u32,
    pub alive: bool,
}

impl Unit {
    pub fn from_template(id: UnitId, owner: Side, template: &UnitTemplate) -> Result<Unit> {
        template.validate()?;
        let keywords = template.parsed_keywords()?;
        let caps = Capabilities::from_keywords(&keywords);
        Ok(Unit {
            id,
            name: UnitName::new(template.name.clone()),
            owner,
            initial_num_models: template.num_models,
            num_models: template.num_models,
            models: (0..template.num_models)
                .map(|_| Model::new(template.wounds_per_model))
                .collect(),
            wounds_per_model: template.wounds_per_model,
            armor: template.armor,
            movement: template.movement,
            attack_range: template.attack_range,
            ap_cost: template.ap_cost,
            missile_dice: template.missile_dice.iter().copied().collect(),
            melee_dice: template.melee_dice.iter().copied().collect(),
            shields_remaining: caps.shields,
            keywords,
            caps,
            position: None,
            melee_target: None,
            has_activated: false,
            pending_casualties: 0,
            alive: true,
        })
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn is_engaged(&self) -> bool {
        self.melee_target.is_some()
    }

    pub fn has_missile_attack(&self) -> bool {
        !self.missile_dice.is_empty() && self.attack_range > 0.0
    }

    /// Models with wounds left, including ones Last Stand has not yet removed
    pub fn living_models(&self) -> u32 {
        self.models.iter().filter(|m| m.is_alive()).count() as u32
    }

    /// Models no longer fighting at full strength, as counted by the dice pool
    pub fn models_lost(&self) -> u32 {
        self.initial_num_models.saturating_sub(self.num_models)
    }

    /// Models destroyed so far, counting casualties Last Stand is holding back
    pub fn models_destroyed(&self) -> u32 {
        self.initial_num_models.saturating_sub(self.living_models())
    }

    pub fn starting_wounds(&self) -> u32 {
        self.initial_num_models * self.wounds_per_model
    }

    pub fn total_wounds_remaining(&self) -> u32 {
        self.models.iter().map(Model::remaining).sum()
    }

    pub fn distance_to(&self, other: &Unit) -> Option<f64> {
        match (self.position, other.position) {
            (Some(a), Some(b)) => Some(a.distance_to(&b)),
            _ => None,
        }
    }

    /// Build the dice pool for an attack
    ///
    /// Lost models remove their dice from the front of the base list, then
    /// keyword dice are added per model still fighting, then Degrade drops
    /// dice from the back.
    pub fn attack_dice(&self, phase: Phase, charging: bool) -> DicePool {
        let base = match phase {
            Phase::Missile => &self.missile_dice,
            Phase::Melee => &self.melee_dice,
        };
        let lost = (self.models_lost() as usize).min(base.len());
        let mut pool: DicePool = base[lost..].iter().copied().collect();

        let fighting = self.num_models as usize;
        for &die in &self.caps.attack_augmentation {
            pool.extend(std::iter::repeat(die).take(fighting));
        }
        if charging {
            for &die in &self.caps.crushing_charge {
                pool.extend(std::iter::repeat(die).take(fighting));
            }
        }

        if let Some(n) = self.caps.degrade {
            if self.total_wounds_remaining() * 2 < self.starting_wounds() {
                let keep = pool.len().saturating_sub(n as usize);
                pool.truncate(keep);
            }
        }
        pool
    }

    pub fn roll_attack<R: Rng + ?Sized>(&self, phase: Phase, charging: bool, rng: &mut R) -> WoundPool {
        roll_pool(&self.attack_dice(phase, charging), self.caps.slayer, rng)
    }

    /// Save penalty this unit imposes on its target
    pub fn save_modifier(&self, phase: Phase) -> i32 {
        match phase {
            Phase::Missile if self.caps.withering_fire => 1,
            Phase::Melee if self.caps.relentless => 1,
            _ => 0,
        }
    }

    /// Effective save threshold against `attacker`, clamped to 2..=6
    ///
    /// Camouflage can never improve a save past 2+ on its own, so the
    /// modifier applies to the already-capped value.
    pub fn save_threshold(&self, attacker: &Capabilities, phase: Phase, modifier: i32) -> u32 {
        let mut threshold = self.armor.base_save() as i32;
        if phase == Phase::Missile && self.caps.camouflage && !attacker.sharpshooter {
            threshold = (threshold - 1).max(BEST_SAVE as i32);
        }
        threshold += modifier;
        threshold.clamp(BEST_SAVE as i32, WORST_SAVE as i32) as u32
    }

    /// Resolve incoming wounds against this unit
    pub fn defend<R: Rng + ?Sized>(
        &mut self,
        incoming: WoundPool,
        save_modifier: i32,
        attacker: &Capabilities,
        phase: Phase,
        rng: &mut R,
    ) -> DefendReport {
        let mut report = DefendReport {
            threshold: self.save_threshold(attacker, phase, save_modifier),
            ..DefendReport::default()
        };

        let total = incoming.total();
        if phase == Phase::Missile && self.shields_remaining > 0 {
            report.absorbed = self.shields_remaining.min(total);
            self.shields_remaining -= report.absorbed;
        }

        let mut queue: Vec<QueuedWound> = Vec::with_capacity(total as usize);
        queue.extend(std::iter::repeat(QueuedWound::Mortal).take(incoming.mortal as usize));
        queue.extend(std::iter::repeat(QueuedWound::Double).take(incoming.double as usize));
        queue.extend(std::iter::repeat(QueuedWound::Normal).take(incoming.normal as usize));
        queue.truncate((total - report.absorbed) as usize);
        report.queued = queue.len() as u32;

        let mut order: Vec<usize> = (0..self.models.len())
            .filter(|&i| self.models[i].is_alive())
            .collect();
        if attacker.assassin {
            order.reverse();
        }

        let mut target = order.iter().copied().peekable();
        for wound in queue {
            let Some(&index) = target.peek() else {
                break;
            };
            let roll = roll_d6(rng);
            let saved = match wound {
                QueuedWound::Mortal => self.caps.lucky && roll >= report.threshold,
                QueuedWound::Double | QueuedWound::Normal => roll >= report.threshold,
            };
            if saved {
                report.saved += 1;
                continue;
            }
            let damage = if wound == QueuedWound::Double { 2 } else { 1 };
            let model = &mut self.models[index];
            report.damage += damage.min(model.remaining());
            if model.take_damage(damage) {
                report.models_killed += 1;
                target.next();
            }
        }

        if report.models_killed > 0 {
            if self.caps.last_stand && !self.has_activated {
                self.pending_casualties += report.models_killed;
                report.deferred = report.models_killed;
            } else {
                self.remove_dead_models();
            }
        }
        self.recompute_alive();
        report
    }

    /// Drop dead models from the roster and recount
    fn remove_dead_models(&mut self) {
        self.models.retain(Model::is_alive);
        self.num_models = self.models.len() as u32;
        self.pending_casualties = 0;
    }

    /// Remove casualties Last Stand was holding back
    pub fn flush_pending_casualties(&mut self) -> u32 {
        let flushed = self.pending_casualties;
        if flushed > 0 {
            self.remove_dead_models();
            self.recompute_alive();
        }
        flushed
    }

    pub fn recompute_alive(&mut self) {
        let standing = self.models.iter().any(Model::is_alive);
        let holding_on = self.caps.last_stand && self.pending_casualties > 0 && !self.has_activated;
        self.alive = standing || holding_on;
    }

    /// Roll a d6 and bring back that many destroyed models, capped at the number destroyed
    pub fn regenerate<R: Rng + ?Sized>(&mut self, rng: &mut R) -> u32 {
        let roll = roll_d6(rng);
        self.restore_models(roll)
    }

    /// Append up to `count` fresh models at full wounds
    ///
    /// Held-back Last Stand casualties are removed first so the returning
    /// models take their place.
    pub fn restore_models(&mut self, count: u32) -> u32 {
        let restored = count.min(self.models_destroyed());
        if restored == 0 {
            return 0;
        }
        if self.pending_casualties > 0 {
            self.remove_dead_models();
        }
        let wounds = self.wounds_per_model;
        self.models.extend((0..restored).map(|_| Model::new(wounds)));
        self.num_models = self.models.len() as u32;
        self.recompute_alive();
        restored
    }

    /// Reset per-turn state at the start of a turn
    pub fn start_turn(&mut self) {
        self.has_activated = false;
        self.recompute_alive();
    }
}
