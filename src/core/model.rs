//! Single wound-tracking model inside a unit

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub max_wounds: u32,
    /// May drop below zero when a double wound overkills
    pub current_wounds: i32,
}

impl Model {
    pub fn new(wounds: u32) -> Self {
        Model {
            max_wounds: wounds,
            current_wounds: wounds as i32,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.current_wounds > 0
    }

    /// Apply damage and report whether this killed the model
    pub fn take_damage(&mut self, amount: u32) -> bool {
        let was_alive = self.is_alive();
        self.current_wounds -= amount as i32;
        was_alive && !self.is_alive()
    }

    /// Wounds left, never negative
    pub fn remaining(&self) -> u32 {
        self.current_wounds.max(0) as u32
    }
}
