//! Battlefield geometry, control points and terrain
//!
//! The board is a rectangle divided into square cells. Control points sit
//! in the two middle rows; side A deploys in the first row and side B in
//! the last.

use crate::config::RulesConfig;
use crate::core::{Keyword, Position, Side};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    pub id: usize,
    pub position: Position,
}

/// Area of the board that grants a keyword to units standing in it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainFeature {
    pub center: Position,
    pub radius: f64,
    pub grants: Keyword,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Battlefield {
    pub width: f64,
    pub height: f64,
    pub square_size: f64,
    pub control_points: Vec<ControlPoint>,
    pub terrain: Vec<TerrainFeature>,
}

impl Battlefield {
    /// Empty board with no objectives
    pub fn new(rules: &RulesConfig) -> Self {
        Battlefield {
            width: rules.board_width,
            height: rules.board_height,
            square_size: rules.square_size,
            control_points: Vec::new(),
            terrain: Vec::new(),
        }
    }

    /// Board with 2 to 4 control points at random spots in the middle rows
    pub fn generate<R: Rng + ?Sized>(rules: &RulesConfig, rng: &mut R) -> Self {
        let mut field = Battlefield::new(rules);
        let count = rng.gen_range(2..=4);
        let (_, rows) = field.grid();
        let middle = if rows >= 4 { 1..=rows - 2 } else { 0..=rows.saturating_sub(1) };
        for _ in 0..count {
            let row = rng.gen_range(middle.clone());
            let position = field.random_point_in_row(row, rng);
            field.add_control_point(position);
        }
        field
    }

    pub fn with_control_points(mut self, points: &[Position]) -> Self {
        for &p in points {
            self.add_control_point(p);
        }
        self
    }

    pub fn with_terrain(mut self, feature: TerrainFeature) -> Self {
        self.terrain.push(feature);
        self
    }

    fn add_control_point(&mut self, position: Position) {
        let id = self.control_points.len();
        self.control_points.push(ControlPoint { id, position });
    }

    pub fn control_points(&self) -> &[ControlPoint] {
        &self.control_points
    }

    /// Keyword granted by terrain at `position`, if any
    pub fn terrain_at(&self, position: &Position) -> Option<Keyword> {
        self.terrain
            .iter()
            .find(|t| t.center.distance_to(position) <= t.radius)
            .map(|t| t.grants)
    }

    /// (columns, rows) of the cell grid
    pub fn grid(&self) -> (u32, u32) {
        (
            (self.width / self.square_size).floor().max(1.0) as u32,
            (self.height / self.square_size).floor().max(1.0) as u32,
        )
    }

    fn random_point_in_row<R: Rng + ?Sized>(&self, row: u32, rng: &mut R) -> Position {
        let (columns, _) = self.grid();
        let column = rng.gen_range(0..columns);
        Position::new(
            column as f64 * self.square_size + rng.gen_range(0.0..self.square_size),
            row as f64 * self.square_size + rng.gen_range(0.0..self.square_size),
        )
    }

    /// Random deployment spot in the side's home row
    pub fn deployment_position<R: Rng + ?Sized>(&self, side: Side, rng: &mut R) -> Position {
        let (_, rows) = self.grid();
        let row = match side {
            Side::A => 0,
            Side::B => rows - 1,
        };
        self.random_point_in_row(row, rng)
    }

    /// Keep a position on the board
    pub fn clamp(&self, position: Position) -> Position {
        Position::new(
            position.x.clamp(0.0, self.width),
            position.y.clamp(0.0, self.height),
        )
    }
}
