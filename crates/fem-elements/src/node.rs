//! Finite element nodes.
//!
//! Nodes are owned by the model (a plain `Vec<Node>` in tests); elements only
//! store indices into that slice.

use nalgebra::Vector3;

/// Which node state a geometric quantity is evaluated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Configuration {
    /// Current (deformed) positions
    Current,
    /// Rest (reference) positions
    Rest,
}

/// A finite element node
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Node ID
    pub id: usize,
    position: Vector3<f64>,
    rest_position: Vector3<f64>,
    /// Shell director: front position minus back position
    director: Vector3<f64>,
    rest_director: Vector3<f64>,
}

impl Node {
    /// Create a node whose rest and current positions coincide
    pub fn new(id: usize, x: f64, y: f64, z: f64) -> Self {
        Self::from_position(id, Vector3::new(x, y, z))
    }

    pub fn from_position(id: usize, position: Vector3<f64>) -> Self {
        Self {
            id,
            position,
            rest_position: position,
            director: Vector3::zeros(),
            rest_director: Vector3::zeros(),
        }
    }

    pub fn position(&self) -> &Vector3<f64> {
        &self.position
    }

    pub fn set_position(&mut self, position: Vector3<f64>) {
        self.position = position;
    }

    pub fn rest_position(&self) -> &Vector3<f64> {
        &self.rest_position
    }

    /// Replace the rest position. Elements using this node must have their
    /// rest data invalidated afterwards.
    pub fn set_rest_position(&mut self, rest: Vector3<f64>) {
        self.rest_position = rest;
    }

    /// Make the current position the new rest position.
    pub fn reset_rest_position(&mut self) {
        self.rest_position = self.position;
        self.rest_director = self.director;
    }

    pub fn director(&self) -> &Vector3<f64> {
        &self.director
    }

    pub fn rest_director(&self) -> &Vector3<f64> {
        &self.rest_director
    }

    /// Set both the current and rest director
    pub fn set_director(&mut self, director: Vector3<f64>) {
        self.director = director;
        self.rest_director = director;
    }

    pub fn set_current_director(&mut self, director: Vector3<f64>) {
        self.director = director;
    }

    pub fn coordinates(&self, config: Configuration) -> &Vector3<f64> {
        match config {
            Configuration::Current => &self.position,
            Configuration::Rest => &self.rest_position,
        }
    }

    pub fn director_in(&self, config: Configuration) -> &Vector3<f64> {
        match config {
            Configuration::Current => &self.director,
            Configuration::Rest => &self.rest_director,
        }
    }

    /// Back surface position of a shell node
    pub fn back_coordinates(&self, config: Configuration) -> Vector3<f64> {
        self.coordinates(config) - self.director_in(config)
    }

    /// Get coordinates as an array
    pub fn coords(&self) -> [f64; 3] {
        [self.position.x, self.position.y, self.position.z]
    }
}
