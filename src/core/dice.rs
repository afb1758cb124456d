//! Die colors and roll semantics
//!
//! Every die has six equally likely faces. A color fixes how many of those
//! faces are normal hits, double hits, mortal hits and double mortal hits;
//! the remaining faces miss.

use crate::SkirmishError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::ops::AddAssign;
use std::str::FromStr;

/// Number of faces on every die
pub const FACES_PER_DIE: u8 = 6;

/// Die colors, ordered roughly from weakest to strongest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DieColor {
    White,
    Green,
    Blue,
    Purple,
    Black,
    Gunmetal,
    Silver,
    Gold,
    Pink,
    Red,
    Crimson,
}

/// Face counts of one die color; faces not counted here miss
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DieFaces {
    pub normal: u8,
    pub double: u8,
    pub mortal: u8,
    pub double_mortal: u8,
}

impl DieFaces {
    const fn new(normal: u8, double: u8, mortal: u8, double_mortal: u8) -> Self {
        DieFaces {
            normal,
            double,
            mortal,
            double_mortal,
        }
    }

    pub fn miss(&self) -> u8 {
        FACES_PER_DIE - self.normal - self.double - self.mortal - self.double_mortal
    }
}

/// Result of a single die
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Normal,
    Double,
    Mortal,
    DoubleMortal,
    Miss,
}

impl Face {
    /// Wound units produced by this face, with doubles already expanded
    pub fn wounds(self) -> WoundPool {
        match self {
            Face::Normal => WoundPool::new(1, 0),
            Face::Double => WoundPool::new(2, 0),
            Face::Mortal => WoundPool::new(0, 1),
            Face::DoubleMortal => WoundPool::new(0, 2),
            Face::Miss => WoundPool::default(),
        }
    }

    pub fn is_mortal(self) -> bool {
        matches!(self, Face::Mortal | Face::DoubleMortal)
    }
}

impl DieColor {
    pub const ALL: [DieColor; 11] = [
        DieColor::White,
        DieColor::Green,
        DieColor::Blue,
        DieColor::Purple,
        DieColor::Black,
        DieColor::Gunmetal,
        DieColor::Silver,
        DieColor::Gold,
        DieColor::Pink,
        DieColor::Red,
        DieColor::Crimson,
    ];

    pub fn faces(self) -> DieFaces {
        match self {
            DieColor::White => DieFaces::new(2, 1, 0, 0),
            DieColor::Green => DieFaces::new(3, 1, 0, 0),
            DieColor::Blue => DieFaces::new(3, 2, 0, 0),
            DieColor::Purple => DieFaces::new(3, 2, 1, 0),
            DieColor::Black => DieFaces::new(2, 2, 1, 1),
            DieColor::Gunmetal => DieFaces::new(1, 0, 2, 1),
            DieColor::Silver => DieFaces::new(1, 0, 3, 1),
            DieColor::Gold => DieFaces::new(2, 0, 2, 2),
            DieColor::Pink => DieFaces::new(1, 2, 0, 0),
            DieColor::Red => DieFaces::new(1, 3, 0, 0),
            DieColor::Crimson => DieFaces::new(1, 4, 0, 0),
        }
    }

    /// Face at position `index` (0..6) in the order normal, double, mortal,
    /// double mortal, miss
    pub fn face_at(self, index: u8) -> Face {
        let f = self.faces();
        let mut bound = f.normal;
        if index < bound {
            return Face::Normal;
        }
        bound += f.double;
        if index < bound {
            return Face::Double;
        }
        bound += f.mortal;
        if index < bound {
            return Face::Mortal;
        }
        bound += f.double_mortal;
        if index < bound {
            return Face::DoubleMortal;
        }
        Face::Miss
    }

    /// Roll one die of this color
    pub fn roll<R: Rng + ?Sized>(self, rng: &mut R) -> Face {
        self.face_at(rng.gen_range(0..FACES_PER_DIE))
    }

    pub fn name(self) -> &'static str {
        match self {
            DieColor::White => "White",
            DieColor::Green => "Green",
            DieColor::Blue => "Blue",
            DieColor::Purple => "Purple",
            DieColor::Black => "Black",
            DieColor::Gunmetal => "Gunmetal",
            DieColor::Silver => "Silver",
            DieColor::Gold => "Gold",
            DieColor::Pink => "Pink",
            DieColor::Red => "Red",
            DieColor::Crimson => "Crimson",
        }
    }
}

impl fmt::Display for DieColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DieColor {
    type Err = SkirmishError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        DieColor::ALL
            .iter()
            .copied()
            .find(|c| c.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| SkirmishError::UnknownDieColor(wanted.to_string()))
    }
}

/// Ordered dice pool, one slot per model plus keyword extras
pub type DicePool = SmallVec<[DieColor; 16]>;

/// Incoming wound units grouped by kind
///
/// Rolled pools always report doubles expanded into `normal`/`mortal`;
/// `double` is for callers that hand over wounds still carrying the double
/// label, each of which deals 2 damage when unsaved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WoundPool {
    pub normal: u32,
    pub double: u32,
    pub mortal: u32,
}

impl WoundPool {
    pub fn new(normal: u32, mortal: u32) -> Self {
        WoundPool {
            normal,
            double: 0,
            mortal,
        }
    }

    pub fn total(&self) -> u32 {
        self.normal + self.double + self.mortal
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl AddAssign for WoundPool {
    fn add_assign(&mut self, rhs: Self) {
        self.normal += rhs.normal;
        self.double += rhs.double;
        self.mortal += rhs.mortal;
    }
}

/// Roll every die in `pool` and total the wounds
///
/// With `slayer`, a die that comes up mortal is rolled again (same color)
/// until it shows a non-mortal face, keeping every result along the way.
pub fn roll_pool<R: Rng + ?Sized>(pool: &[DieColor], slayer: bool, rng: &mut R) -> WoundPool {
    let mut wounds = WoundPool::default();
    for &die in pool {
        loop {
            let face = die.roll(rng);
            wounds += face.wounds();
            if !(slayer && face.is_mortal()) {
                break;
            }
        }
    }
    wounds
}

/// Roll a single d6 (1..=6)
pub fn roll_d6<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    rng.gen_range(1..=6)
}
