//! Tracked people published for social-aware costmap layers.

use serde::{Deserialize, Serialize};

use super::geometry::{Header, Point, Vector3};

/// A single tracked person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub position: Point,
    pub velocity: Vector3,
    /// Tracker confidence (0.0 - 1.0).
    #[serde(default)]
    pub reliability: f64,
    #[serde(default)]
    pub tagnames: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Person {
    pub fn new(name: impl Into<String>, position: Point, velocity: Vector3) -> Self {
        Self {
            name: name.into(),
            position,
            velocity,
            reliability: 0.0,
            tagnames: Vec::new(),
            tags: Vec::new(),
        }
    }
}

/// Stamped collection of people.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct People {
    pub header: Header,
    pub people: Vec<Person>,
}
