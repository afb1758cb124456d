//! Battle state: unit registry, players, board and random source

use crate::battlefield::Battlefield;
use crate::config::RulesConfig;
use crate::core::{EntityStore, Player, PlayerName, Position, Side, Unit, UnitId, UnitTemplate};
use crate::game::BattleLogger;
use crate::Result;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;

/// Complete state of one battle
///
/// Units live in a single registry and refer to each other only by
/// `UnitId`, so destroying or disengaging a unit never leaves a dangling
/// reference. Everything random in the battle draws from `rng`.
#[derive(Debug, Clone)]
pub struct BattleState {
    /// Every unit on either side, alive or destroyed
    pub units: EntityStore<Unit>,

    /// Side A then side B
    pub players: [Player; 2],

    pub battlefield: Battlefield,

    pub rules: RulesConfig,

    /// Current turn, starting at 1 once the first turn begins
    pub turn_number: u32,

    /// Random source for dice, saves, charges and regeneration
    pub rng: ChaCha12Rng,

    /// Event sink for the driver layers
    pub logger: BattleLogger,
}

impl BattleState {
    pub fn new(
        name_a: impl Into<PlayerName>,
        name_b: impl Into<PlayerName>,
        battlefield: Battlefield,
        rules: RulesConfig,
    ) -> Self {
        BattleState {
            units: EntityStore::new(),
            players: [Player::new(name_a, Side::A), Player::new(name_b, Side::B)],
            battlefield,
            rules,
            turn_number: 0,
            rng: ChaCha12Rng::seed_from_u64(0),
            logger: BattleLogger::new(),
        }
    }

    /// Reseed the battle's random source
    pub fn seed_rng(&mut self, seed: u64) {
        self.rng = ChaCha12Rng::seed_from_u64(seed);
    }

    /// Build a unit from a template and hand it to `side`
    pub fn add_unit(&mut self, side: Side, template: &UnitTemplate) -> Result<UnitId> {
        let id = self.units.next_id();
        let unit = Unit::from_template(id, side, template)?;
        self.units.insert(id, unit);
        self.players[side.index()].units.push(id);
        Ok(id)
    }

    /// Build a unit and place it immediately
    pub fn add_unit_at(&mut self, side: Side, template: &UnitTemplate, position: Position) -> Result<UnitId> {
        let id = self.add_unit(side, template)?;
        self.units.get_mut(id)?.position = Some(position);
        Ok(id)
    }

    pub fn unit(&self, id: UnitId) -> Result<&Unit> {
        self.units.get(id)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Result<&mut Unit> {
        self.units.get_mut(id)
    }

    pub fn player(&self, side: Side) -> &Player {
        &self.players[side.index()]
    }

    pub fn player_mut(&mut self, side: Side) -> &mut Player {
        &mut self.players[side.index()]
    }

    /// Living units of `side`, in deployment order
    pub fn alive_units(&self, side: Side) -> impl Iterator<Item = &Unit> + '_ {
        self.players[side.index()]
            .units
            .iter()
            .filter_map(|id| self.units.get(*id).ok())
            .filter(|u| u.is_alive())
    }

    /// Units of `side` still allowed to activate this turn
    pub fn ready_units(&self, side: Side) -> Vec<UnitId> {
        self.alive_units(side)
            .filter(|u| !u.has_activated)
            .map(|u| u.id)
            .collect()
    }

    /// Sum of AP costs over the side's living units
    pub fn total_ap(&self, side: Side) -> u32 {
        self.alive_units(side).map(|u| u.ap_cost).sum()
    }

    /// Most expensive living unit of the side (0 if none)
    pub fn largest_unit_cost(&self, side: Side) -> u32 {
        self.alive_units(side).map(|u| u.ap_cost).max().unwrap_or(0)
    }

    /// Living models of `side` whose unit stands within `radius` of `point`
    pub fn models_in_range(&self, side: Side, point: &Position, radius: f64) -> u32 {
        self.alive_units(side)
            .filter(|u| u.position.is_some_and(|p| p.distance_to(point) <= radius))
            .map(|u| u.living_models())
            .sum()
    }

    pub fn is_wiped(&self, side: Side) -> bool {
        self.alive_units(side).next().is_none()
    }

    /// Units of `side` that were destroyed
    pub fn units_wiped(&self, side: Side) -> usize {
        self.players[side.index()].units.len() - self.alive_units(side).count()
    }

    /// Put every unplaced unit in its side's deployment row
    pub fn deploy(&mut self) {
        for side in Side::both() {
            let ids = self.players[side.index()].units.clone();
            for id in ids {
                let placed = self.units.get(id).map(|u| u.position.is_some()).unwrap_or(true);
                if placed {
                    continue;
                }
                let position = self.battlefield.deployment_position(side, &mut self.rng);
                if let Ok(unit) = self.units.get_mut(id) {
                    unit.position = Some(position);
                }
            }
        }
    }

    /// Clear activation flags at the start of a turn
    pub fn begin_turn(&mut self, turn: u32) {
        self.turn_number = turn;
        for id in self.units.sorted_ids() {
            if let Ok(unit) = self.units.get_mut(id) {
                unit.start_turn();
            }
        }
    }
}
