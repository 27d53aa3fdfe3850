use uom::si::angle::radian;
use uom::si::f64::Angle;

/// An angle normalized into one full turn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct BoundedAngle {
    angle: Angle,
}

impl BoundedAngle {
    pub(crate) fn new(angle: impl Into<Angle>) -> Self {
        Self {
            // NOTE: uom may store the value differently-normalized, so we normalize on output as
            // well.
            angle: Angle::new::<radian>(Self::into_bounds(angle.into())),
        }
    }

    /// Returns the angle in [0°, 360°) in radians.
    pub(crate) fn get_bounded(self) -> f64 {
        Self::into_bounds(self.angle)
    }

    fn into_bounds(angle: Angle) -> f64 {
        let out_of_bounds: f64 = angle.get::<radian>();
        out_of_bounds.rem_euclid(Angle::FULL_TURN.get::<radian>())
    }

    /// Returns the angle in [-180°, 180°) in radians.
    pub(crate) fn to_signed_range(self) -> f64 {
        let angle = self.get_bounded();
        if angle < Angle::HALF_TURN.get::<radian>() {
            angle
        } else {
            angle - Angle::FULL_TURN.get::<radian>()
        }
    }

    /// Returns the angle as a latitude in [-90°, 90°] in radians, or `None` if the angle points
    /// into the "back" half of the circle.
    pub(crate) fn to_latitude(self) -> Option<f64> {
        let signed = self.to_signed_range();
        (-std::f64::consts::FRAC_PI_2..=std::f64::consts::FRAC_PI_2)
            .contains(&signed)
            .then_some(signed)
    }
}

#[cfg(test)]
mod tests {
    use crate::util::BoundedAngle;
    use approx::assert_relative_eq;
    use rstest::rstest;
    use uom::si::angle::{degree, radian};
    use uom::si::f64::Angle;

    fn d(degrees: f64) -> Angle {
        Angle::new::<degree>(degrees)
    }

    #[test]
    fn bounded_angle_negative_radians() {
        let out_of_bounds = -(0.5 * Angle::HALF_TURN);
        let sut = BoundedAngle::new(out_of_bounds);
        assert_eq!(sut.get_bounded(), 1.5 * Angle::HALF_TURN.get::<radian>());
    }

    #[test]
    fn bounded_angle_negative_degrees() {
        let sut = BoundedAngle::new(d(-390.));
        assert_relative_eq!(sut.get_bounded(), 330.0_f64.to_radians(), epsilon = 1e-12);
    }

    #[rstest]
    #[case(d(0.), 0.)]
    #[case(d(180.), -180.)]
    #[case(d(359.), -1.)]
    #[case(d(270.), -90.)]
    #[case(d(-90.), -90.)]
    #[case(d(360.+120.), 120.)]
    #[case(d(360.+340.), -20.)]
    fn bounded_angle_to_signed_range_converts_correctly(
        #[case] input: Angle,
        #[case] expected_result_in_degrees: f64,
    ) {
        assert_relative_eq!(
            BoundedAngle::new(input).to_signed_range(),
            expected_result_in_degrees.to_radians(),
            epsilon = f64::EPSILON * 1000.
        );
    }

    #[rstest]
    #[case(d(0.), Some(0.))]
    #[case(d(90.), Some(90.))]
    #[case(d(-90.), Some(-90.))]
    #[case(d(360. + 45.), Some(45.))]
    #[case(d(-360. - 45.), Some(-45.))]
    #[case(d(90.9948211), None)]
    #[case(d(190.112282), None)]
    fn bounded_angle_to_latitude(#[case] input: Angle, #[case] expected_degrees: Option<f64>) {
        let latitude = BoundedAngle::new(input).to_latitude();
        match (latitude, expected_degrees) {
            (Some(actual), Some(expected)) => {
                assert_relative_eq!(actual, expected.to_radians(), epsilon = 1e-12)
            }
            (None, None) => {}
            (actual, expected) => panic!("expected {expected:?}°, got {actual:?} rad"),
        }
    }
}
