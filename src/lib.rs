//! This library provides the geodesy a GPS track needs: precise distances and track lengths on a
//! reference ellipsoid, and a small pattern language for writing and reading geographic locations.
//!
//! Distances are computed by a [`Geoid`], which solves the inverse geodesic problem on an
//! [`Ellipsoid`] (by default [WGS84](Ellipsoid::WGS84), the model GPS uses). Anything that has a
//! latitude and a longitude can take part by implementing [`Point`]; [`GeoPoint`] is a ready-made
//! implementation that also carries elevation and time. Whole tracks are measured with
//! [`Geoid::path_length`] (open) and [`Geoid::tour_length`] (closed), or point by point with a
//! [`LengthCollector`].
//!
//! Locations are written and read by a [`LocationFormatter`](format::LocationFormatter), compiled
//! from a pattern such as `DD°MM''SS.SSS"X`. The [`format`] module documents the pattern language
//! and holds a set of preset formatters following ISO 6709.
//!
//! # Examples
//!
//! Measure a short walk and print where it ended:
//!
//! ```
//! use track_geodesy::{format::{Location, ISO_HUMAN_LONG}, GeoPoint, Geoid};
//! use uom::si::f64::{Angle, Length};
//! use uom::si::{angle::degree, length::meter};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let point = |latitude: f64, longitude: f64| {
//!     GeoPoint::builder()
//!         .latitude(Angle::new::<degree>(latitude))
//!         .expect("latitude is in [-90°, 90°]")
//!         .longitude(Angle::new::<degree>(longitude))
//!         .elevation(Length::new::<meter>(574.))
//!         .build()
//! };
//! let walk = [
//!     point(47.2692124, 11.4041024),
//!     point(47.2700000, 11.4050000),
//!     point(47.2710000, 11.4045000),
//! ];
//!
//! let length = Geoid::WGS84.path_length(walk.iter().cloned())?;
//! assert!(length > Length::new::<meter>(200.) && length < Length::new::<meter>(250.));
//!
//! let end = Location::from_point(&walk[2]);
//! assert_eq!(
//!     ISO_HUMAN_LONG.format(&end)?,
//!     "47°16'15.600\"N 11°24'16.200\"E 574.00m"
//! );
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod float_equality;
pub mod format;

mod ellipsoid;
mod geoid;
mod length_collector;
mod point;
mod util;

/// The stages of building a [`GeoPoint`] with [`GeoPoint::builder`].
pub mod builder {
    pub use super::point::{
        Builder, HasLatitude, HasLongitude, MissingLatitude, MissingLongitude,
    };
}

pub use ellipsoid::Ellipsoid;
pub use error::{
    EllipsoidError, Error, FormatError, GeodesicError, ParseError, PatternError, PatternErrorKind,
};
pub use geoid::Geoid;
pub use length_collector::LengthCollector;
pub use point::{Components, GeoPoint, Point};
