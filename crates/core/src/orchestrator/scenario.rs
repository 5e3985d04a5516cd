//! Scripted inputs for a run.
//!
//! Defaults reproduce the stock scenario: start facing -y at (0, 4), one
//! person walking along +y from the origin, and two waypoints.

use serde::{Deserialize, Serialize};

use crate::messages::{
    ComputePathThroughPosesGoal, Header, People, Person, Point, Pose, PoseStamped,
    PoseWithCovariance, PoseWithCovarianceStamped, Quaternion, SetInitialPoseRequest, Vector3,
};

/// Facing -y in the map frame.
const FACING_NEG_Y: Quaternion = Quaternion {
    x: 0.0,
    y: 0.0,
    z: -0.7071068,
    w: 0.7071068,
};

/// Localization estimate sent before planning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialPose {
    pub position: Point,
    pub orientation: Quaternion,
    /// Variance of x (covariance index 0).
    pub variance_x: f64,
    /// Variance of y (covariance index 7).
    pub variance_y: f64,
}

impl Default for InitialPose {
    fn default() -> Self {
        Self {
            position: Point::new(0.0, 4.0, 0.01),
            orientation: FACING_NEG_Y,
            variance_x: 0.25,
            variance_y: 0.25,
        }
    }
}

/// A person announced to the planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonSpec {
    pub name: String,
    #[serde(default)]
    pub position: Point,
    #[serde(default)]
    pub velocity: Vector3,
}

/// A planar waypoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub x: f64,
    pub y: f64,
    #[serde(default = "default_waypoint_orientation")]
    pub orientation: Quaternion,
}

fn default_waypoint_orientation() -> Quaternion {
    FACING_NEG_Y
}

impl Waypoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            orientation: default_waypoint_orientation(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default = "default_frame_id")]
    pub frame_id: String,
    #[serde(default)]
    pub initial_pose: InitialPose,
    #[serde(default = "default_people")]
    pub people: Vec<PersonSpec>,
    /// Visited in listed order.
    #[serde(default = "default_waypoints")]
    pub waypoints: Vec<Waypoint>,
}

fn default_frame_id() -> String {
    "map".to_string()
}

fn default_people() -> Vec<PersonSpec> {
    vec![PersonSpec {
        name: "person1".to_string(),
        position: Point::new(0.0, 0.0, 0.0),
        velocity: Vector3::new(0.0, 1.0, 0.0),
    }]
}

fn default_waypoints() -> Vec<Waypoint> {
    vec![Waypoint::new(0.0, 2.0), Waypoint::new(-0.8, 0.0)]
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            frame_id: default_frame_id(),
            initial_pose: InitialPose::default(),
            people: default_people(),
            waypoints: default_waypoints(),
        }
    }
}

impl Scenario {
    pub fn initial_pose_request(&self) -> SetInitialPoseRequest {
        let pose = Pose::new(self.initial_pose.position, self.initial_pose.orientation);
        SetInitialPoseRequest {
            pose: PoseWithCovarianceStamped {
                header: Header::in_frame(&self.frame_id),
                pose: PoseWithCovariance::planar(
                    pose,
                    self.initial_pose.variance_x,
                    self.initial_pose.variance_y,
                ),
            },
        }
    }

    /// People message stamped with the current time.
    pub fn people_message(&self) -> People {
        People {
            header: Header::now(&self.frame_id),
            people: self
                .people
                .iter()
                .map(|p| Person::new(p.name.clone(), p.position, p.velocity))
                .collect(),
        }
    }

    pub fn path_goal(&self) -> ComputePathThroughPosesGoal {
        ComputePathThroughPosesGoal {
            goals: self
                .waypoints
                .iter()
                .map(|w| PoseStamped {
                    header: Header::in_frame(&self.frame_id),
                    pose: Pose::new(Point::new(w.x, w.y, 0.0), w.orientation),
                })
                .collect(),
            ..Default::default()
        }
    }
}
