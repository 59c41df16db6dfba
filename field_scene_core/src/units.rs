// field_scene_core/src/units.rs

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::f64::consts::{FRAC_PI_2, PI};
use std::ops::{Add, AddAssign, Neg, Sub};

/// A signed planar angle.
///
/// Stored in radians. Conversions to and from degrees are exact up to the usual
/// floating point rounding, so values that must compare equal across ticks should
/// be produced the same way each time.
///
/// Angles are written to and read from configuration files in **degrees**.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Angle(f64);

/// Facing direction of a robot or ball on the field plane.
pub type Heading = Angle;

impl Angle {
    pub const ZERO: Angle = Angle(0.0);
    pub const QUARTER_TURN: Angle = Angle(FRAC_PI_2);
    pub const HALF_TURN: Angle = Angle(PI);

    pub const fn from_radians(radians: f64) -> Self {
        Self(radians)
    }

    pub fn from_degrees(degrees: f64) -> Self {
        Self(degrees.to_radians())
    }

    pub const fn radians(self) -> f64 {
        self.0
    }

    pub fn degrees(self) -> f64 {
        self.0.to_degrees()
    }
}

impl Add for Angle {
    type Output = Angle;

    fn add(self, rhs: Angle) -> Angle {
        Angle(self.0 + rhs.0)
    }
}

impl AddAssign for Angle {
    fn add_assign(&mut self, rhs: Angle) {
        self.0 += rhs.0;
    }
}

impl Sub for Angle {
    type Output = Angle;

    fn sub(self, rhs: Angle) -> Angle {
        Angle(self.0 - rhs.0)
    }
}

impl Neg for Angle {
    type Output = Angle;

    fn neg(self) -> Angle {
        Angle(-self.0)
    }
}

impl Serialize for Angle {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.degrees())
    }
}

impl<'de> Deserialize<'de> for Angle {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let degrees: f64 = Deserialize::deserialize(deserializer)?;
        Ok(Angle::from_degrees(degrees))
    }
}
