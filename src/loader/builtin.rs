//! Built-in demo forces

use crate::core::{ArmorTier, DieColor, UnitTemplate};
use crate::loader::roster::{Roster, RosterEntry};

#[allow(clippy::too_many_arguments)]
fn template(
    name: &str,
    models: u32,
    wounds: u32,
    armor: ArmorTier,
    movement: f64,
    ap_cost: u32,
    missile: &[DieColor],
    melee: &[DieColor],
    range: f64,
    keywords: &[&str],
) -> UnitTemplate {
    UnitTemplate {
        name: name.to_string(),
        num_models: models,
        wounds_per_model: wounds,
        armor,
        movement,
        ap_cost,
        missile_dice: missile.to_vec(),
        melee_dice: melee.to_vec(),
        attack_range: range,
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
    }
}

pub fn solar_knights() -> UnitTemplate {
    let dice = [DieColor::Blue; 5];
    template("Solar Knights", 5, 1, ArmorTier::Medium, 6.0, 4, &dice, &dice, 18.0, &["Withering Fire"])
}

pub fn heavy_solar_knights() -> UnitTemplate {
    let dice = [DieColor::Purple; 5];
    template(
        "Heavy Solar Knights",
        5,
        2,
        ArmorTier::Heavy,
        5.0,
        5,
        &dice,
        &dice,
        24.0,
        &["Withering Fire", "Relentless"],
    )
}

pub fn alien_warriors() -> UnitTemplate {
    template(
        "Alien Warriors",
        10,
        1,
        ArmorTier::Light,
        12.0,
        4,
        &[],
        &[DieColor::Pink; 10],
        0.0,
        &["Relentless"],
    )
}

pub fn shooty_aliens() -> UnitTemplate {
    template(
        "Shooty Aliens",
        10,
        1,
        ArmorTier::Light,
        8.0,
        4,
        &[DieColor::Blue; 10],
        &[DieColor::White; 10],
        18.0,
        &["Withering Fire"],
    )
}

/// Three Solar Knights squads and two heavy squads, led by Frank
pub fn solar_knights_roster() -> Roster {
    Roster {
        name: "Solar Knights".to_string(),
        player: Some("Frank".to_string()),
        units: vec![
            RosterEntry { count: 2, template: solar_knights() },
            RosterEntry { count: 2, template: heavy_solar_knights() },
            RosterEntry { count: 1, template: solar_knights() },
        ],
    }
}

/// Three warrior broods and two shooting broods, led by Dee
pub fn aliens_roster() -> Roster {
    Roster {
        name: "Aliens".to_string(),
        player: Some("Dee".to_string()),
        units: vec![
            RosterEntry { count: 3, template: alien_warriors() },
            RosterEntry { count: 2, template: shooty_aliens() },
        ],
    }
}

/// The two demo forces, side A first
pub fn builtin_rosters() -> [Roster; 2] {
    [solar_knights_roster(), aliens_roster()]
}

/// Look up a template by name across the built-in rosters
pub fn builtin_template(name: &str) -> Option<UnitTemplate> {
    builtin_rosters()
        .iter()
        .find_map(|r| r.find_template(name).cloned())
}
