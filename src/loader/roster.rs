//! Roster file loader (JSON)

use crate::core::{Side, UnitId, UnitTemplate};
use crate::game::BattleState;
use crate::{Result, SkirmishError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

fn one() -> u32 {
    1
}

/// A unit template and how many copies of it the roster fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    #[serde(default = "one")]
    pub count: u32,
    #[serde(flatten)]
    pub template: UnitTemplate,
}

/// A named force
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    pub name: String,
    /// Default commander name for battles fought with this roster
    #[serde(default)]
    pub player: Option<String>,
    pub units: Vec<RosterEntry>,
}

impl Roster {
    /// Total units once every entry is expanded
    pub fn unit_count(&self) -> usize {
        self.units.iter().map(|e| e.count as usize).sum()
    }

    /// Sum of AP costs over every unit
    pub fn total_ap(&self) -> u32 {
        self.units.iter().map(|e| e.count * e.template.ap_cost).sum()
    }

    /// Templates in deployment order, one per unit
    pub fn templates(&self) -> impl Iterator<Item = &UnitTemplate> + '_ {
        self.units
            .iter()
            .flat_map(|e| std::iter::repeat(&e.template).take(e.count as usize))
    }

    pub fn find_template(&self, name: &str) -> Option<&UnitTemplate> {
        self.units
            .iter()
            .map(|e| &e.template)
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Check every template and keyword up front
    pub fn validate(&self) -> Result<()> {
        if self.unit_count() == 0 {
            return Err(SkirmishError::InvalidRoster(format!(
                "Roster '{}' has no units",
                self.name
            )));
        }
        for entry in &self.units {
            entry.template.validate()?;
            entry.template.parsed_keywords()?;
        }
        Ok(())
    }

    /// Put fresh copies of every unit into `state` under `side`
    ///
    /// Ids come from the battle's registry, so the same roster can be
    /// instantiated into any number of battles.
    pub fn instantiate(&self, state: &mut BattleState, side: Side) -> Result<Vec<UnitId>> {
        self.templates().map(|t| state.add_unit(side, t)).collect()
    }
}

/// Roster loader for .json files
pub struct RosterLoader;

impl RosterLoader {
    /// Load a roster from a .json file
    pub fn load_from_file(path: &Path) -> Result<Roster> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content).map_err(|e| Self::with_path(path, e))
    }

    /// Parse and validate a roster from its JSON text
    pub fn parse(content: &str) -> Result<Roster> {
        let roster: Roster = serde_json::from_str(content)?;
        roster.validate()?;
        Ok(roster)
    }

    fn with_path(path: &Path, error: SkirmishError) -> SkirmishError {
        match error {
            SkirmishError::InvalidRoster(msg) => {
                SkirmishError::InvalidRoster(format!("{}: {msg}", path.display()))
            }
            other => other,
        }
    }
}

/// Read several roster files concurrently, preserving order
pub async fn load_rosters(paths: &[PathBuf]) -> Result<Vec<Roster>> {
    let tasks: Vec<_> = paths
        .iter()
        .cloned()
        .map(|path| {
            tokio::spawn(async move {
                let content = tokio::fs::read_to_string(&path).await?;
                let roster = RosterLoader::parse(&content).map_err(|e| RosterLoader::with_path(&path, e))?;
                Ok::<_, SkirmishError>(roster)
            })
        })
        .collect();

    let mut rosters = Vec::with_capacity(tasks.len());
    for task in tasks {
        rosters.push(task.await??);
    }
    Ok(rosters)
}
