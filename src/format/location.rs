use crate::point::Point;
use std::fmt;
use uom::si::angle::degree;
use uom::si::f64::{Angle, Length};
use uom::si::length::meter;

#[cfg(any(test, feature = "approx"))]
use approx::{AbsDiffEq, RelativeEq};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A location that is formatted by, or the result of parsing with, a
/// [`LocationFormatter`](super::LocationFormatter).
///
/// Every component is optional, since a pattern need not mention all of them.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Location {
    // NOTE: angles are kept in degrees, the unit every location pattern is written in, so that
    // formatting rounds the value the caller gave rather than its radian conversion.
    latitude: Option<f64>,
    longitude: Option<f64>,
    elevation: Option<Length>,
}

impl Location {
    /// A location without any components.
    pub const EMPTY: Location = Location {
        latitude: None,
        longitude: None,
        elevation: None,
    };

    /// Provides a constructor for a [`Location`].
    pub fn builder() -> Builder {
        Builder {
            under_construction: Self::EMPTY,
        }
    }

    /// Copies latitude, longitude, and elevation (if any) of a [`Point`].
    #[must_use]
    pub fn from_point(point: &impl Point) -> Self {
        Self {
            latitude: Some(point.latitude().get::<degree>()),
            longitude: Some(point.longitude().get::<degree>()),
            elevation: point.elevation(),
        }
    }

    #[must_use]
    pub fn latitude(&self) -> Option<Angle> {
        self.latitude.map(Angle::new::<degree>)
    }

    #[must_use]
    pub fn longitude(&self) -> Option<Angle> {
        self.longitude.map(Angle::new::<degree>)
    }

    #[must_use]
    pub fn elevation(&self) -> Option<Length> {
        self.elevation
    }

    /// The latitude in degrees, in [-90, 90].
    #[must_use]
    pub fn latitude_degrees(&self) -> Option<f64> {
        self.latitude
    }

    /// The longitude in degrees, in [-180, 180].
    #[must_use]
    pub fn longitude_degrees(&self) -> Option<f64> {
        self.longitude
    }

    pub(crate) fn elevation_meters(&self) -> Option<f64> {
        self.elevation.map(|e| e.get::<meter>())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn component<T: fmt::Display>(
            f: &mut fmt::Formatter<'_>,
            value: Option<T>,
            unit: &str,
        ) -> fmt::Result {
            match value {
                Some(value) => write!(f, "{value}{unit}"),
                None => f.write_str("-"),
            }
        }

        f.write_str("(")?;
        component(f, self.latitude, "°")?;
        f.write_str(", ")?;
        component(f, self.longitude, "°")?;
        f.write_str(", ")?;
        component(f, self.elevation_meters(), "m")?;
        f.write_str(")")
    }
}

/// [Builder] for a [`Location`].
///
/// [Builder]: https://rust-unofficial.github.io/patterns/patterns/creational/builder.html
#[derive(Debug, Clone, Copy)]
#[must_use]
pub struct Builder {
    under_construction: Location,
}

impl Builder {
    /// Sets the latitude.
    ///
    /// Returns `None` if the latitude is outside [-90°, 90°].
    pub fn latitude(self, latitude: impl Into<Angle>) -> Option<Self> {
        self.latitude_degrees(latitude.into().get::<degree>())
    }

    /// Sets the latitude in degrees.
    ///
    /// Returns `None` if the latitude is outside [-90, 90].
    pub fn latitude_degrees(mut self, degrees: f64) -> Option<Self> {
        if !(-90.0..=90.0).contains(&degrees) {
            return None;
        }
        self.under_construction.latitude = Some(degrees);
        Some(self)
    }

    /// Sets the longitude.
    ///
    /// Returns `None` if the longitude is outside [-180°, 180°].
    pub fn longitude(self, longitude: impl Into<Angle>) -> Option<Self> {
        self.longitude_degrees(longitude.into().get::<degree>())
    }

    /// Sets the longitude in degrees.
    ///
    /// Returns `None` if the longitude is outside [-180, 180].
    pub fn longitude_degrees(mut self, degrees: f64) -> Option<Self> {
        if !(-180.0..=180.0).contains(&degrees) {
            return None;
        }
        self.under_construction.longitude = Some(degrees);
        Some(self)
    }

    pub fn elevation(mut self, elevation: impl Into<Length>) -> Self {
        self.under_construction.elevation = Some(elevation.into());
        self
    }

    #[must_use]
    pub fn build(self) -> Location {
        self.under_construction
    }
}

#[cfg(any(test, feature = "approx"))]
fn both_or_neither(a: Option<f64>, b: Option<f64>, eq: impl Fn(f64, f64) -> bool) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

#[cfg(any(test, feature = "approx"))]
impl AbsDiffEq<Self> for Location {
    /// In degrees for angles and meters for the elevation.
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        let eq = |a: f64, b: f64| a.abs_diff_eq(&b, epsilon);
        both_or_neither(self.latitude, other.latitude, eq)
            && both_or_neither(self.longitude, other.longitude, eq)
            && both_or_neither(self.elevation_meters(), other.elevation_meters(), eq)
    }
}

#[cfg(any(test, feature = "approx"))]
impl RelativeEq for Location {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        let eq = |a: f64, b: f64| a.relative_eq(&b, epsilon, max_relative);
        both_or_neither(self.latitude, other.latitude, eq)
            && both_or_neither(self.longitude, other.longitude, eq)
            && both_or_neither(self.elevation_meters(), other.elevation_meters(), eq)
    }
}
