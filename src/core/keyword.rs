//! Unit keywords
//!
//! Roster data carries keywords as strings such as `"Shields 2"` or
//! `"Attack Augmentation Red"`. They are parsed once into [`Keyword`] values
//! when a unit is built, then folded into a [`Capabilities`] set that the
//! combat code reads directly.

use crate::core::dice::DieColor;
use crate::{Result, SkirmishError};
use nom::{
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::{alpha1, digit1, space1},
    combinator::{all_consuming, map, map_res, value},
    sequence::preceded,
    IResult,
};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Keyword {
    /// +1 to the defender's save threshold in the missile phase
    WitheringFire,
    /// +1 to the defender's save threshold in the melee phase
    Relentless,
    /// Saves improve by one step against missile attacks
    Camouflage,
    /// Ignores the defender's Camouflage
    Sharpshooter,
    /// Mortal wounds may be saved
    Lucky,
    /// Casualties are taken from the newest models first
    Assassin,
    /// Mortal results are rerolled and accumulated
    Slayer,
    /// Absorbs this many missile wounds over the whole battle
    Shields(u32),
    /// Casualties wait for the unit's own activation before being removed
    LastStand,
    /// Loses this many dice once below half starting wounds
    Degrade(u32),
    Commander(u32),
    /// One extra die of this color per living model, both phases
    AttackAugmentation(DieColor),
    /// One extra die of this color per living model when charging
    CrushingCharge(DieColor),
    Regenerate,
    Disengage,
    Overwatch,
}

fn count_param(input: &str) -> IResult<&str, u32> {
    preceded(space1, map_res(digit1, str::parse::<u32>))(input)
}

fn die_param(input: &str) -> IResult<&str, DieColor> {
    preceded(space1, map_res(alpha1, str::parse::<DieColor>))(input)
}

fn parameterised(input: &str) -> IResult<&str, Keyword> {
    alt((
        map(
            preceded(tag_no_case("Attack Augmentation"), die_param),
            Keyword::AttackAugmentation,
        ),
        map(
            preceded(tag_no_case("Crushing Charge"), die_param),
            Keyword::CrushingCharge,
        ),
        map(preceded(tag_no_case("Shields"), count_param), Keyword::Shields),
        map(preceded(tag_no_case("Degrade"), count_param), Keyword::Degrade),
        map(preceded(tag_no_case("Commander"), count_param), Keyword::Commander),
    ))(input)
}

fn flag(input: &str) -> IResult<&str, Keyword> {
    alt((
        value(Keyword::WitheringFire, tag_no_case("Withering Fire")),
        value(Keyword::Relentless, tag_no_case("Relentless")),
        value(Keyword::Camouflage, tag_no_case("Camouflage")),
        value(Keyword::Sharpshooter, tag_no_case("Sharpshooter")),
        value(Keyword::Lucky, tag_no_case("Lucky")),
        value(Keyword::Assassin, tag_no_case("Assassin")),
        value(Keyword::Slayer, tag_no_case("Slayer")),
        value(Keyword::LastStand, tag_no_case("Last Stand")),
        value(Keyword::Regenerate, tag_no_case("Regenerate")),
        value(Keyword::Disengage, tag_no_case("Disengage")),
        value(Keyword::Overwatch, tag_no_case("Overwatch")),
    ))(input)
}

impl Keyword {
    /// Parse a roster keyword string
    pub fn parse(text: &str) -> Result<Keyword> {
        let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
        let parsed = all_consuming(alt((parameterised, flag)))(normalized.as_str())
            .map(|(_, keyword)| keyword)
            .map_err(|_| SkirmishError::UnknownKeyword(text.to_string()));
        parsed
    }
}

impl FromStr for Keyword {
    type Err = SkirmishError;

    fn from_str(s: &str) -> Result<Self> {
        Keyword::parse(s)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Keyword::WitheringFire => write!(f, "Withering Fire"),
            Keyword::Relentless => write!(f, "Relentless"),
            Keyword::Camouflage => write!(f, "Camouflage"),
            Keyword::Sharpshooter => write!(f, "Sharpshooter"),
            Keyword::Lucky => write!(f, "Lucky"),
            Keyword::Assassin => write!(f, "Assassin"),
            Keyword::Slayer => write!(f, "Slayer"),
            Keyword::Shields(n) => write!(f, "Shields {n}"),
            Keyword::LastStand => write!(f, "Last Stand"),
            Keyword::Degrade(n) => write!(f, "Degrade {n}"),
            Keyword::Commander(n) => write!(f, "Commander {n}"),
            Keyword::AttackAugmentation(die) => write!(f, "Attack Augmentation {die}"),
            Keyword::CrushingCharge(die) => write!(f, "Crushing Charge {die}"),
            Keyword::Regenerate => write!(f, "Regenerate"),
            Keyword::Disengage => write!(f, "Disengage"),
            Keyword::Overwatch => write!(f, "Overwatch"),
        }
    }
}

/// Keywords resolved into direct fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub withering_fire: bool,
    pub relentless: bool,
    pub camouflage: bool,
    pub sharpshooter: bool,
    pub lucky: bool,
    pub assassin: bool,
    pub slayer: bool,
    pub last_stand: bool,
    pub regenerate: bool,
    pub disengage: bool,
    pub overwatch: bool,
    /// Total shield capacity at battle start
    pub shields: u32,
    pub degrade: Option<u32>,
    pub commander: Option<u32>,
    pub attack_augmentation: SmallVec<[DieColor; 2]>,
    pub crushing_charge: SmallVec<[DieColor; 2]>,
}

impl Capabilities {
    pub fn from_keywords(keywords: &[Keyword]) -> Self {
        let mut caps = Capabilities::default();
        for keyword in keywords {
            match *keyword {
                Keyword::WitheringFire => caps.withering_fire = true,
                Keyword::Relentless => caps.relentless = true,
                Keyword::Camouflage => caps.camouflage = true,
                Keyword::Sharpshooter => caps.sharpshooter = true,
                Keyword::Lucky => caps.lucky = true,
                Keyword::Assassin => caps.assassin = true,
                Keyword::Slayer => caps.slayer = true,
                Keyword::LastStand => caps.last_stand = true,
                Keyword::Regenerate => caps.regenerate = true,
                Keyword::Disengage => caps.disengage = true,
                Keyword::Overwatch => caps.overwatch = true,
                Keyword::Shields(n) => caps.shields += n,
                Keyword::Degrade(n) => caps.degrade = Some(caps.degrade.unwrap_or(0) + n),
                Keyword::Commander(n) => caps.commander = Some(caps.commander.unwrap_or(0).max(n)),
                Keyword::AttackAugmentation(die) => caps.attack_augmentation.push(die),
                Keyword::CrushingCharge(die) => caps.crushing_charge.push(die),
            }
        }
        caps
    }
}
