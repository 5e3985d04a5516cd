//! Geometry primitives.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Number of entries in a row-major 6x6 pose covariance.
pub const COVARIANCE_LEN: usize = 36;

/// Timestamp split into seconds and nanoseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Time {
    pub sec: i32,
    pub nanosec: u32,
}

impl Time {
    /// Current wall-clock time.
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Seconds saturate at the bounds of `i32`.
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        let secs = at.timestamp();
        let sec = i32::try_from(secs).unwrap_or_else(|_| {
            warn!("Timestamp {} does not fit in a message stamp, clamping", secs);
            if secs < 0 {
                i32::MIN
            } else {
                i32::MAX
            }
        });

        Self {
            sec,
            nanosec: at.timestamp_subsec_nanos(),
        }
    }
}

/// Stamp and coordinate frame attached to a message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Header {
    #[serde(default)]
    pub stamp: Time,
    pub frame_id: String,
}

impl Header {
    /// Header in `frame_id` with a zero stamp ("use latest available").
    pub fn in_frame(frame_id: impl Into<String>) -> Self {
        Self {
            stamp: Time::default(),
            frame_id: frame_id.into(),
        }
    }

    /// Header in `frame_id` stamped with the current time.
    pub fn now(frame_id: impl Into<String>) -> Self {
        Self {
            stamp: Time::now(),
            frame_id: frame_id.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Orientation as a unit quaternion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            w: 1.0,
        }
    }
}

impl Quaternion {
    pub fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// Planar rotation about the z axis.
    pub fn from_yaw(yaw: f64) -> Self {
        let half = yaw / 2.0;
        Self {
            x: 0.0,
            y: 0.0,
            z: half.sin(),
            w: half.cos(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Point,
    pub orientation: Quaternion,
}

impl Pose {
    pub fn new(position: Point, orientation: Quaternion) -> Self {
        Self {
            position,
            orientation,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseStamped {
    pub header: Header,
    pub pose: Pose,
}

/// Pose with a row-major 6x6 covariance over (x, y, z, roll, pitch, yaw).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseWithCovariance {
    pub pose: Pose,
    pub covariance: Vec<f64>,
}

impl Default for PoseWithCovariance {
    fn default() -> Self {
        Self {
            pose: Pose::default(),
            covariance: vec![0.0; COVARIANCE_LEN],
        }
    }
}

impl PoseWithCovariance {
    /// Pose with only the x and y variances populated.
    pub fn planar(pose: Pose, var_x: f64, var_y: f64) -> Self {
        let mut covariance = vec![0.0; COVARIANCE_LEN];
        covariance[0] = var_x;
        covariance[7] = var_y;
        Self { pose, covariance }
    }

    /// Entry at `(row, col)` of the covariance matrix.
    pub fn covariance_at(&self, row: usize, col: usize) -> f64 {
        self.covariance.get(row * 6 + col).copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseWithCovarianceStamped {
    pub header: Header,
    pub pose: PoseWithCovariance,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_saturates_past_2038() {
        let at = DateTime::from_timestamp(i64::from(i32::MAX) + 10, 0).unwrap();
        assert_eq!(Time::from_datetime(at).sec, i32::MAX);

        let before = DateTime::from_timestamp(i64::from(i32::MIN) - 10, 0).unwrap();
        assert_eq!(Time::from_datetime(before).sec, i32::MIN);
    }

    #[test]
    fn test_planar_covariance_layout() {
        let pose = PoseWithCovariance::planar(Pose::default(), 0.25, 0.25);
        assert_eq!(pose.covariance.len(), COVARIANCE_LEN);
        assert_eq!(pose.covariance_at(0, 0), 0.25);
        assert_eq!(pose.covariance_at(1, 1), 0.25);
        let non_zero = pose.covariance.iter().filter(|v| **v != 0.0).count();
        assert_eq!(non_zero, 2);
    }

    #[test]
    fn test_from_yaw_quarter_turn() {
        let q = Quaternion::from_yaw(-std::f64::consts::FRAC_PI_2);
        assert!((q.z + 0.7071068).abs() < 1e-6);
        assert!((q.w - 0.7071068).abs() < 1e-6);
    }

    #[test]
    fn test_time_from_datetime() {
        let at = DateTime::from_timestamp(1_700_000_000, 250).unwrap();
        let time = Time::from_datetime(at);
        assert_eq!(time.sec, 1_700_000_000);
        assert_eq!(time.nanosec, 250);
    }

    #[test]
    fn test_header_stamp_defaults_when_missing() {
        let header: Header = serde_json::from_str(r#"{"frame_id":"map"}"#).unwrap();
        assert_eq!(header.frame_id, "map");
        assert_eq!(header.stamp, Time::default());
    }
}
