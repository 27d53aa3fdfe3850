use crate::util::BoundedAngle;
use std::fmt;
use std::marker::PhantomData;
use std::time::SystemTime;
use uom::si::angle::{degree, radian};
use uom::si::f64::{Angle, Length};
use uom::si::length::meter;
use uom::ConstZero;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An Earth-bound position as provided by a GPS track, route, or way-point model.
///
/// Only latitude and longitude are required; the geodesic computations in [`Geoid`] ignore
/// elevation. Implement this for your own track point type to feed it into [`Geoid::distance`]
/// or [`Geoid::path_length`].
///
/// [`Geoid`]: crate::Geoid
/// [`Geoid::distance`]: crate::Geoid::distance
/// [`Geoid::path_length`]: crate::Geoid::path_length
pub trait Point {
    /// Degrees north of the equator.
    fn latitude(&self) -> Angle;

    /// Degrees east of the reference meridian.
    fn longitude(&self) -> Angle;

    /// Elevation above the reference ellipsoid, if known.
    fn elevation(&self) -> Option<Length> {
        None
    }

    /// When the point was recorded, if known.
    fn time(&self) -> Option<SystemTime> {
        None
    }
}

impl<P: Point + ?Sized> Point for &P {
    fn latitude(&self) -> Angle {
        (**self).latitude()
    }

    fn longitude(&self) -> Angle {
        (**self).longitude()
    }

    fn elevation(&self) -> Option<Length> {
        (**self).elevation()
    }

    fn time(&self) -> Option<SystemTime> {
        (**self).time()
    }
}

/// A plain [`Point`] value: latitude, longitude, and optionally elevation and a timestamp.
///
/// ```rust
/// use track_geodesy::GeoPoint;
/// use uom::si::f64::{Angle, Length};
/// use uom::si::{angle::degree, length::meter};
///
/// let innsbruck = GeoPoint::builder()
///     .latitude(Angle::new::<degree>(47.2692124))
///     .expect("latitude is in [-90°, 90°]")
///     .longitude(Angle::new::<degree>(11.4041024))
///     .elevation(Length::new::<meter>(574.))
///     .build();
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeoPoint {
    // NOTE: latitude has been checked to lie in [-90°, 90°] % 360°, but neither angle is
    // normalized. the accessors normalize.
    latitude: Angle,
    longitude: Angle,
    elevation: Option<Length>,
    time: Option<SystemTime>,
}

impl GeoPoint {
    /// Constructs a point from latitude and longitude.
    ///
    /// The latitude must be in [-90°,90°] % 360°. If it is not, this function returns `None`.
    #[must_use]
    pub fn build(
        Components {
            latitude,
            longitude,
        }: Components,
    ) -> Option<Self> {
        Some(
            Self::builder()
                .latitude(latitude)?
                .longitude(longitude)
                .build(),
        )
    }

    /// Provides a constructor for a [`GeoPoint`].
    pub fn builder() -> Builder<MissingLatitude, MissingLongitude> {
        Builder {
            under_construction: GeoPoint {
                latitude: Angle::ZERO,
                longitude: Angle::ZERO,
                elevation: None,
                time: None,
            },
            has: (PhantomData, PhantomData),
        }
    }

    /// Returns the latitude in [-90°, 90°].
    #[must_use]
    pub fn latitude(&self) -> Angle {
        // the builder rejects anything that doesn't normalize into [-90°, 90°]
        let radians = BoundedAngle::new(self.latitude)
            .to_latitude()
            .unwrap_or_else(|| BoundedAngle::new(self.latitude).to_signed_range());
        Angle::new::<radian>(radians)
    }

    /// Returns the longitude in [-180°, 180°).
    #[must_use]
    pub fn longitude(&self) -> Angle {
        Angle::new::<radian>(BoundedAngle::new(self.longitude).to_signed_range())
    }

    #[must_use]
    pub fn elevation(&self) -> Option<Length> {
        self.elevation
    }

    #[must_use]
    pub fn time(&self) -> Option<SystemTime> {
        self.time
    }

    /// Copies the position of any [`Point`].
    ///
    /// Returns `None` if the point's latitude is outside [-90°,90°] % 360°.
    #[must_use]
    pub fn from_point(point: &impl Point) -> Option<Self> {
        let mut builder = Self::builder()
            .latitude(point.latitude())?
            .longitude(point.longitude());
        if let Some(elevation) = point.elevation() {
            builder = builder.elevation(elevation);
        }
        if let Some(time) = point.time() {
            builder = builder.time(time);
        }
        Some(builder.build())
    }
}

impl Point for GeoPoint {
    fn latitude(&self) -> Angle {
        GeoPoint::latitude(self)
    }

    fn longitude(&self) -> Angle {
        GeoPoint::longitude(self)
    }

    fn elevation(&self) -> Option<Length> {
        self.elevation
    }

    fn time(&self) -> Option<SystemTime> {
        self.time
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lat = self.latitude().get::<degree>();
        let ns = if lat.is_sign_negative() { 'S' } else { 'N' };
        let lon = self.longitude().get::<degree>();
        let ew = if lon.is_sign_negative() { 'W' } else { 'E' };
        write!(f, "{:.6}°{ns}, {:.6}°{ew}", lat.abs(), lon.abs())?;
        if let Some(elevation) = self.elevation {
            write!(f, ", {:.2}m", elevation.get::<meter>())?;
        }
        Ok(())
    }
}

/// Argument type for [`GeoPoint::build`].
#[derive(Debug, Default)]
#[must_use]
pub struct Components {
    /// The latitude of the proposed [`GeoPoint`].
    ///
    /// The latitude must be in [-90°,90°] % 360°.
    pub latitude: Angle,

    /// The longitude of the proposed [`GeoPoint`].
    pub longitude: Angle,
}

/// Used to indicate that a partially-constructed [`GeoPoint`] is missing the latitude component.
pub struct MissingLatitude;
/// Used to indicate that a partially-constructed [`GeoPoint`] has the latitude component set.
pub struct HasLatitude;
/// Used to indicate that a partially-constructed [`GeoPoint`] is missing the longitude component.
pub struct MissingLongitude;
/// Used to indicate that a partially-constructed [`GeoPoint`] has the longitude component set.
pub struct HasLongitude;

/// [Builder] for a [`GeoPoint`].
///
/// Construct one through [`GeoPoint::builder`], and finalize with [`Builder::build`].
///
/// [Builder]: https://rust-unofficial.github.io/patterns/patterns/creational/builder.html
#[derive(Debug)]
#[must_use]
pub struct Builder<Latitude, Longitude> {
    under_construction: GeoPoint,
    has: (PhantomData<Latitude>, PhantomData<Longitude>),
}

// manual impls of Clone and Copy to avoid requiring the markers to be Copy + Clone
impl<L1, L2> Clone for Builder<L1, L2> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<L1, L2> Copy for Builder<L1, L2> {}

impl<L1, L2> Builder<L1, L2> {
    /// Sets the latitude of the [`GeoPoint`]-to-be.
    ///
    /// The latitude must be in [-90°,90°] % 360°. If it is not, this function returns `None`.
    pub fn latitude(mut self, latitude: impl Into<Angle>) -> Option<Builder<HasLatitude, L2>> {
        let latitude = latitude.into();
        BoundedAngle::new(latitude).to_latitude()?;
        self.under_construction.latitude = latitude;
        Some(Builder {
            under_construction: self.under_construction,
            has: (PhantomData::<HasLatitude>, self.has.1),
        })
    }

    /// Sets the longitude of the [`GeoPoint`]-to-be.
    pub fn longitude(mut self, longitude: impl Into<Angle>) -> Builder<L1, HasLongitude> {
        self.under_construction.longitude = longitude.into();
        Builder {
            under_construction: self.under_construction,
            has: (self.has.0, PhantomData::<HasLongitude>),
        }
    }

    /// Sets the elevation of the [`GeoPoint`]-to-be.
    pub fn elevation(mut self, elevation: impl Into<Length>) -> Self {
        self.under_construction.elevation = Some(elevation.into());
        self
    }

    /// Sets the timestamp of the [`GeoPoint`]-to-be.
    pub fn time(mut self, time: SystemTime) -> Self {
        self.under_construction.time = Some(time);
        self
    }
}

impl Builder<HasLatitude, HasLongitude> {
    #[must_use]
    pub fn build(self) -> GeoPoint {
        self.under_construction
    }
}
