use crate::ellipsoid::Ellipsoid;
use crate::error::GeodesicError;
use crate::float_equality;
use crate::length_collector::LengthCollector;
use crate::point::Point;
use std::time::SystemTime;
use uom::si::angle::{degree, radian};
use uom::si::f64::{Angle, Length, Velocity};
use uom::si::length::meter;
use uom::si::velocity::meter_per_second;

// Vincenty's inverse formula is iterated until λ changes by less than this, relative to itself.
const DISTANCE_ITERATION_EPSILON: f64 = 1E-12;
const DISTANCE_ITERATION_MAX: usize = 1000;

/// Geodesic computations on an [`Ellipsoid`].
///
/// Distances are computed with [Vincenty's inverse formula][vincenty], which is accurate to
/// within a millimeter on the ellipsoid but fails to converge for (nearly) antipodal points. For
/// those, [`Geoid::spherical_distance`] is a cheap, less accurate alternative.
///
/// ```rust
/// use track_geodesy::{GeoPoint, Geoid};
/// use uom::si::f64::Angle;
/// use uom::si::{angle::degree, length::meter};
///
/// let innsbruck = GeoPoint::builder()
///     .latitude(Angle::new::<degree>(47.2692124))
///     .expect("latitude is in [-90°, 90°]")
///     .longitude(Angle::new::<degree>(11.4041024))
///     .build();
/// let hafelekar = GeoPoint::builder()
///     .latitude(Angle::new::<degree>(47.3502))
///     .expect("latitude is in [-90°, 90°]")
///     .longitude(Angle::new::<degree>(11.70584))
///     .build();
///
/// let distance = Geoid::WGS84.distance(&innsbruck, &hafelekar)?;
/// assert!((distance.get::<meter>() - 24_528.356).abs() < 1e-3);
/// # Ok::<(), track_geodesy::error::GeodesicError>(())
/// ```
///
/// [vincenty]: https://en.wikipedia.org/wiki/Vincenty%27s_formulae
#[derive(Debug, Clone, PartialEq)]
pub struct Geoid {
    ellipsoid: Ellipsoid,
}

impl Geoid {
    /// The geoid of the [`Ellipsoid::WGS84`] model, as used by GPS.
    pub const WGS84: Geoid = Geoid::of(Ellipsoid::WGS84);

    /// The geoid of the [`Ellipsoid::IERS_1989`] model.
    pub const IERS_1989: Geoid = Geoid::of(Ellipsoid::IERS_1989);

    /// The geoid of the [`Ellipsoid::IERS_2003`] model.
    pub const IERS_2003: Geoid = Geoid::of(Ellipsoid::IERS_2003);

    /// The geoid of the [`Ellipsoid::DEFAULT`] model.
    pub const DEFAULT: Geoid = Geoid::of(Ellipsoid::DEFAULT);

    /// Creates a geoid for the given earth model.
    #[must_use]
    pub const fn of(ellipsoid: Ellipsoid) -> Self {
        Self { ellipsoid }
    }

    #[must_use]
    pub fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }

    /// Computes the length of the geodesic between two points on the surface of the ellipsoid.
    ///
    /// The result is exactly zero for identical points, and symmetric in its arguments up to
    /// floating point error. Fails with [`GeodesicError::ConvergenceFailure`] if the iteration
    /// does not settle, which happens for (nearly) antipodal points.
    pub fn distance(&self, start: &impl Point, end: &impl Point) -> Result<Length, GeodesicError> {
        let a = self.ellipsoid.a().get::<meter>();
        let b = self.ellipsoid.b().get::<meter>();
        let f = self.ellipsoid.flattening();
        // (a² - b²) / b²
        let second_eccentricity_sq = (a * a - b * b) / (b * b);

        let lat1 = start.latitude().get::<radian>();
        let lon1 = start.longitude().get::<radian>();
        let lat2 = end.latitude().get::<radian>();
        let lon2 = end.longitude().get::<radian>();

        let omega = lon2 - lon1;

        // reduced latitudes
        let u1 = ((1. - f) * lat1.tan()).atan();
        let (sin_u1, cos_u1) = u1.sin_cos();
        let u2 = ((1. - f) * lat2.tan()).atan();
        let (sin_u2, cos_u2) = u2.sin_cos();

        let sin_u1_sin_u2 = sin_u1 * sin_u2;
        let cos_u1_sin_u2 = cos_u1 * sin_u2;
        let sin_u1_cos_u2 = sin_u1 * cos_u2;
        let cos_u1_cos_u2 = cos_u1 * cos_u2;

        // Eq. 13
        let mut lambda = omega;

        for iteration in 1..=DISTANCE_ITERATION_MAX {
            let lambda0 = lambda;
            let (sin_lambda, cos_lambda) = lambda.sin_cos();

            // Eq. 14
            let sin2_sigma = (cos_u2 * sin_lambda) * (cos_u2 * sin_lambda)
                + (cos_u1_sin_u2 - sin_u1_cos_u2 * cos_lambda)
                    * (cos_u1_sin_u2 - sin_u1_cos_u2 * cos_lambda);
            let sin_sigma = sin2_sigma.sqrt();

            // Eq. 15
            let cos_sigma = sin_u1_sin_u2 + cos_u1_cos_u2 * cos_lambda;

            // Eq. 16
            let sigma = sin_sigma.atan2(cos_sigma);

            // Eq. 17; sin²σ may be (almost) zero for coincident points
            let sin_alpha = if float_equality::equal(sin2_sigma, 0., 1) {
                0.
            } else {
                cos_u1_cos_u2 * sin_lambda / sin_sigma
            };
            let cos_alpha = sin_alpha.asin().cos();
            let cos2_alpha = cos_alpha * cos_alpha;

            // Eq. 18; cos²α may be (almost) zero for equatorial lines
            let cos_2sigma_m = if float_equality::equal(cos2_alpha, 0., 1) {
                0.
            } else {
                cos_sigma - 2. * sin_u1_sin_u2 / cos2_alpha
            };
            let cos2_2sigma_m = cos_2sigma_m * cos_2sigma_m;
            let u_sq = cos2_alpha * second_eccentricity_sq;

            // Eq. 3
            let big_a =
                1. + u_sq / 16384. * (4096. + u_sq * (-768. + u_sq * (320. - 175. * u_sq)));

            // Eq. 4
            let big_b = u_sq / 1024. * (256. + u_sq * (-128. + u_sq * (74. - 47. * u_sq)));

            // Eq. 6
            let delta_sigma = big_b
                * sin_sigma
                * (cos_2sigma_m
                    + big_b / 4.
                        * (cos_sigma * (-1. + 2. * cos2_2sigma_m)
                            - big_b / 6.
                                * cos_2sigma_m
                                * (-3. + 4. * sin2_sigma)
                                * (-3. + 4. * cos2_2sigma_m)));

            // Eq. 10
            let c = f / 16. * cos2_alpha * (4. + f * (4. - 3. * cos2_alpha));

            // Eq. 11
            lambda = omega
                + (1. - c)
                    * f
                    * sin_alpha
                    * (sigma
                        + c * sin_sigma
                            * (cos_2sigma_m + c * cos_sigma * (-1. + 2. * cos2_2sigma_m)));

            // NOTE: a NaN ratio (λ = λ₀ = 0, eg for coincident points) also ends the iteration
            let change = ((lambda - lambda0) / lambda).abs();
            if !(change > DISTANCE_ITERATION_EPSILON) {
                tracing::trace!(iteration, "geodesic iteration converged");
                // Eq. 19
                return Ok(Length::new::<meter>(b * big_a * (sigma - delta_sigma)));
            }
        }

        let error = GeodesicError::ConvergenceFailure {
            start: (
                start.latitude().get::<degree>(),
                start.longitude().get::<degree>(),
            ),
            end: (end.latitude().get::<degree>(), end.longitude().get::<degree>()),
            iterations: DISTANCE_ITERATION_MAX,
        };
        tracing::debug!(%error, "giving up on geodesic distance");
        Err(error)
    }

    /// Computes the [great-circle distance] between two points on a sphere with the ellipsoid's
    /// equatorial radius.
    ///
    /// This is less accurate than [`Geoid::distance`], but always succeeds.
    ///
    /// The current implementation computes this [using the archaversine] (inverse haversine).
    ///
    /// [great-circle distance]: https://en.wikipedia.org/wiki/Great-circle_distance
    /// [using the archaversine]: https://en.wikipedia.org/wiki/Haversine_formula#Formulation
    #[doc(alias = "haversine_distance")]
    #[must_use]
    pub fn spherical_distance(&self, start: &impl Point, end: &impl Point) -> Length {
        let central_angle = central_angle_by_inverse_haversine(
            start.latitude(),
            end.latitude(),
            start.longitude(),
            end.longitude(),
        );
        self.ellipsoid.a() * central_angle.get::<radian>()
    }

    /// The average speed needed to get from `start` to `end` in the time between their
    /// timestamps.
    ///
    /// Returns `None` if either point lacks a timestamp or both were recorded at the same
    /// instant. If `end` was recorded before `start`, the speed is negative.
    pub fn speed(
        &self,
        start: &impl Point,
        end: &impl Point,
    ) -> Result<Option<Velocity>, GeodesicError> {
        let (Some(t0), Some(t1)) = (start.time(), end.time()) else {
            return Ok(None);
        };
        let seconds = seconds_between(t0, t1);
        if seconds == 0. {
            return Ok(None);
        }
        let distance = self.distance(start, end)?;
        Ok(Some(Velocity::new::<meter_per_second>(
            distance.get::<meter>() / seconds,
        )))
    }

    /// Returns a fresh accumulator for the length of a path.
    pub fn length_collector<P>(&self) -> LengthCollector<'_, P>
    where
        P: Point + Clone,
    {
        LengthCollector::new(self)
    }

    /// The length of the path through `points`, in order.
    ///
    /// Zero for fewer than two points. Fails on the first pair of consecutive points whose
    /// distance cannot be computed.
    pub fn path_length<I>(&self, points: I) -> Result<Length, GeodesicError>
    where
        I: IntoIterator,
        I::Item: Point + Clone,
    {
        let mut collector = self.length_collector();
        for point in points {
            collector.add(point)?;
        }
        Ok(collector.path_length())
    }

    /// The length of the path through `points` and back from the last point to the first.
    ///
    /// Zero for fewer than two points.
    pub fn tour_length<I>(&self, points: I) -> Result<Length, GeodesicError>
    where
        I: IntoIterator,
        I::Item: Point + Clone,
    {
        let mut collector = self.length_collector();
        for point in points {
            collector.add(point)?;
        }
        collector.tour_length()
    }
}

impl Default for Geoid {
    fn default() -> Self {
        Self::DEFAULT
    }
}

fn seconds_between(t0: SystemTime, t1: SystemTime) -> f64 {
    match t1.duration_since(t0) {
        Ok(forward) => forward.as_secs_f64(),
        Err(backward) => -backward.duration().as_secs_f64(),
    }
}

fn central_angle_by_inverse_haversine(
    lat_a: Angle,
    lat_b: Angle,
    lon_a: Angle,
    lon_b: Angle,
) -> Angle {
    let lat_a = lat_a.get::<radian>(); // φ1
    let lat_b = lat_b.get::<radian>(); // φ2
    let delta_lat = lat_b - lat_a;
    let delta_lon = lon_b.get::<radian>() - lon_a.get::<radian>();

    let inner = 1. - delta_lat.cos() + lat_a.cos() * lat_b.cos() * (1. - delta_lon.cos());
    // clamp against rounding pushing the haversine just past 1 for antipodes
    Angle::new::<radian>(2. * (inner / 2.).sqrt().min(1.).asin())
}
