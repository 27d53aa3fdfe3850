use crate::error::EllipsoidError;
use std::borrow::Cow;
use std::fmt;
use uom::si::f64::Length;
use uom::si::length::meter;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An earth ellipsoid: the mathematical figure approximating the shape of the Earth that
/// geodetic computations are performed on.
///
/// Use one of the well-known models ([`Ellipsoid::WGS84`], [`Ellipsoid::IERS_1989`],
/// [`Ellipsoid::IERS_2003`]) or construct your own with [`Ellipsoid::new`].
///
/// See <https://en.wikipedia.org/wiki/Earth_ellipsoid>.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Parameters"))]
pub struct Ellipsoid {
    name: Cow<'static, str>,
    // equatorial radius in meters
    a: f64,
    // polar radius in meters
    b: f64,
    inverse_flattening: f64,
}

impl Ellipsoid {
    /// The ellipsoid of the [World Geodetic System 1984][wgs84].
    ///
    /// [wgs84]: https://en.wikipedia.org/wiki/World_Geodetic_System#WGS_84
    pub const WGS84: Ellipsoid = Ellipsoid {
        name: Cow::Borrowed("WGS-84"),
        a: 6_378_137.0,
        b: 6_356_752.314_245,
        inverse_flattening: 298.257_223_563,
    };

    /// The ellipsoid of the [International Earth Rotation and Reference Systems Service][iers]
    /// (1989).
    ///
    /// [iers]: https://en.wikipedia.org/wiki/IERS
    pub const IERS_1989: Ellipsoid = Ellipsoid {
        name: Cow::Borrowed("IERS-1989"),
        a: 6_378_136.0,
        b: 6_356_751.302,
        inverse_flattening: 298.257,
    };

    /// The ellipsoid of the [International Earth Rotation and Reference Systems Service][iers]
    /// (2003).
    ///
    /// [iers]: https://en.wikipedia.org/wiki/IERS
    pub const IERS_2003: Ellipsoid = Ellipsoid {
        name: Cow::Borrowed("IERS-2003"),
        a: 6_378_136.6,
        b: 6_356_751.9,
        inverse_flattening: 298.256_42,
    };

    /// The default ellipsoid, [`Ellipsoid::WGS84`].
    pub const DEFAULT: Ellipsoid = Self::WGS84;

    /// Constructs an ellipsoid from its equatorial radius `a`, polar radius `b` (both in
    /// meters), and inverse flattening `1/f`.
    ///
    /// Fails if `name` is empty or any parameter is not a finite, positive number.
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        a: f64,
        b: f64,
        inverse_flattening: f64,
    ) -> Result<Self, EllipsoidError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(EllipsoidError::MissingName);
        }
        for (parameter, value) in [("a", a), ("b", b), ("inverse_flattening", inverse_flattening)]
        {
            if !(value.is_finite() && value > 0.) {
                return Err(EllipsoidError::InvalidParameter { parameter, value });
            }
        }

        Ok(Self {
            name,
            a,
            b,
            inverse_flattening,
        })
    }

    /// The name of the earth model, eg `WGS-84`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The equatorial radius (semi-major axis).
    #[doc(alias = "semi_major_axis")]
    #[must_use]
    pub fn a(&self) -> Length {
        Length::new::<meter>(self.a)
    }

    /// The polar radius (semi-minor axis).
    #[doc(alias = "semi_minor_axis")]
    #[must_use]
    pub fn b(&self) -> Length {
        Length::new::<meter>(self.b)
    }

    #[must_use]
    pub fn inverse_flattening(&self) -> f64 {
        self.inverse_flattening
    }

    /// The flattening `f = 1 / (1/f)`.
    #[must_use]
    pub fn flattening(&self) -> f64 {
        1. / self.inverse_flattening
    }
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Ellipsoid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (a = {} m, b = {} m, 1/f = {})",
            self.name, self.a, self.b, self.inverse_flattening
        )
    }
}

/// Unvalidated ellipsoid parameters as they appear in configuration files.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct Parameters {
    name: String,
    a: f64,
    b: f64,
    inverse_flattening: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<Parameters> for Ellipsoid {
    type Error = EllipsoidError;

    fn try_from(p: Parameters) -> Result<Self, Self::Error> {
        Ellipsoid::new(p.name, p.a, p.b, p.inverse_flattening)
    }
}

#[cfg(test)]
mod tests {
    use super::Ellipsoid;
    use crate::error::EllipsoidError;
    use approx::assert_relative_eq;
    use rstest::rstest;
    use uom::si::length::meter;

    #[rstest]
    #[case(Ellipsoid::WGS84, "WGS-84")]
    #[case(Ellipsoid::IERS_1989, "IERS-1989")]
    #[case(Ellipsoid::IERS_2003, "IERS-2003")]
    fn presets_are_consistent(#[case] ellipsoid: Ellipsoid, #[case] name: &str) {
        assert_eq!(ellipsoid.name(), name);
        // b = a * (1 - f) up to the published rounding of b
        let a = ellipsoid.a().get::<meter>();
        let b = ellipsoid.b().get::<meter>();
        assert_relative_eq!(a * (1. - ellipsoid.flattening()), b, epsilon = 1.);
    }

    #[test]
    fn default_is_wgs84() {
        assert_eq!(Ellipsoid::default(), Ellipsoid::WGS84);
        assert_eq!(Ellipsoid::DEFAULT, Ellipsoid::WGS84);
    }

    #[test]
    fn custom_ellipsoid() {
        let sphere = Ellipsoid::new("sphere", 6_371_000., 6_371_000., f64::MAX).unwrap();
        assert_eq!(sphere.name(), "sphere");
        assert_eq!(sphere.a(), sphere.b());
        assert!(sphere.flattening() < 1e-300);

        let owned = Ellipsoid::new(String::from("owned"), 1., 1., 1.).unwrap();
        assert_eq!(owned.name(), "owned");
    }

    #[rstest]
    #[case("", 1., 1., 1., EllipsoidError::MissingName)]
    #[case("  ", 1., 1., 1., EllipsoidError::MissingName)]
    #[case("x", 0., 1., 1., EllipsoidError::InvalidParameter { parameter: "a", value: 0. })]
    #[case("x", 1., -1., 1., EllipsoidError::InvalidParameter { parameter: "b", value: -1. })]
    #[case("x", 1., 1., f64::INFINITY, EllipsoidError::InvalidParameter { parameter: "inverse_flattening", value: f64::INFINITY })]
    fn rejects_bad_parameters(
        #[case] name: &'static str,
        #[case] a: f64,
        #[case] b: f64,
        #[case] f: f64,
        #[case] expected: EllipsoidError,
    ) {
        assert_eq!(Ellipsoid::new(name, a, b, f), Err(expected));
    }

    #[test]
    fn display() {
        insta::assert_snapshot!(
            Ellipsoid::WGS84,
            @"WGS-84 (a = 6378137 m, b = 6356752.314245 m, 1/f = 298.257223563)"
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn from_config() {
        let ellipsoid: Ellipsoid = serde_yaml::from_str(
            "name: IERS-2003\na: 6378136.6\nb: 6356751.9\ninverse_flattening: 298.25642\n",
        )
        .unwrap();
        assert_eq!(ellipsoid, Ellipsoid::IERS_2003);

        let roundtrip: Ellipsoid =
            serde_yaml::from_str(&serde_yaml::to_string(&Ellipsoid::WGS84).unwrap()).unwrap();
        assert_eq!(roundtrip, Ellipsoid::WGS84);

        assert!(serde_yaml::from_str::<Ellipsoid>("name: ''\na: 1\nb: 1\ninverse_flattening: 1\n").is_err());
    }
}
