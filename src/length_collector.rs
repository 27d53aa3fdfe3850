use crate::error::GeodesicError;
use crate::geoid::Geoid;
use crate::point::Point;
use uom::si::f64::Length;
use uom::si::length::meter;

/// Sequential accumulator for the length of a path of [`Point`]s.
///
/// Points are fed in order with [`LengthCollector::add`]; every point after the first adds the
/// geodesic distance from its predecessor. Obtain one through [`Geoid::length_collector`].
///
/// The accumulated length depends on which points are adjacent, so two collectors over different
/// parts of a path cannot be merged: [`LengthCollector::combine`] always fails.
#[derive(Debug, Clone)]
#[must_use]
pub struct LengthCollector<'g, P> {
    geoid: &'g Geoid,
    // in meters
    length: f64,
    first: Option<P>,
    previous: Option<P>,
    count: usize,
}

impl<'g, P> LengthCollector<'g, P>
where
    P: Point + Clone,
{
    pub(crate) fn new(geoid: &'g Geoid) -> Self {
        Self {
            geoid,
            length: 0.,
            first: None,
            previous: None,
            count: 0,
        }
    }

    /// Appends `point` to the path.
    ///
    /// Fails if the distance from the previously added point cannot be computed; the collector
    /// is left unchanged in that case.
    pub fn add(&mut self, point: P) -> Result<(), GeodesicError> {
        if let Some(previous) = &self.previous {
            self.length += self.geoid.distance(previous, &point)?.get::<meter>();
        }
        if self.first.is_none() {
            self.first = Some(point.clone());
        }
        self.previous = Some(point);
        self.count += 1;
        Ok(())
    }

    /// Always fails with [`GeodesicError::UnsupportedCombination`].
    pub fn combine(self, _other: Self) -> Result<Self, GeodesicError> {
        Err(GeodesicError::UnsupportedCombination)
    }

    /// Number of points added so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The length of the path through all added points, in order.
    #[must_use]
    pub fn path_length(&self) -> Length {
        Length::new::<meter>(self.length)
    }

    /// The length of the path closed back onto its first point.
    ///
    /// With fewer than two points there is nothing to close, and the result is zero.
    pub fn tour_length(self) -> Result<Length, GeodesicError> {
        match (&self.previous, &self.first) {
            (Some(last), Some(first)) if self.count >= 2 => {
                let closing = self.geoid.distance(last, first)?;
                Ok(self.path_length() + closing)
            }
            _ => Ok(self.path_length()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::GeodesicError;
    use crate::geoid::Geoid;
    use crate::length_collector::LengthCollector;
    use crate::point::tests::point;
    use crate::point::GeoPoint;
    use approx::assert_relative_eq;
    use uom::si::length::meter;

    #[test]
    fn empty_and_single_point() {
        let geoid = Geoid::DEFAULT;
        let mut collector: LengthCollector<'_, GeoPoint> = geoid.length_collector();
        assert!(collector.is_empty());
        assert_eq!(collector.path_length().get::<meter>(), 0.);

        collector.add(point(47.2692124, 11.4041024)).unwrap();
        assert_eq!(collector.len(), 1);
        assert_eq!(collector.path_length().get::<meter>(), 0.);
        assert_eq!(collector.tour_length().unwrap().get::<meter>(), 0.);
    }

    #[test]
    fn accumulates_in_order() {
        let geoid = Geoid::DEFAULT;
        let points = [
            point(47.2692124, 11.4041024),
            point(47.3502, 11.70584),
            point(47.5, 11.9),
        ];

        let mut collector = geoid.length_collector();
        for p in points {
            collector.add(p).unwrap();
        }
        assert_eq!(collector.len(), 3);

        let expected = geoid.distance(&points[0], &points[1]).unwrap()
            + geoid.distance(&points[1], &points[2]).unwrap();
        assert_relative_eq!(
            collector.path_length().get::<meter>(),
            expected.get::<meter>(),
            epsilon = 1e-6
        );

        let closing = geoid.distance(&points[2], &points[0]).unwrap();
        assert_relative_eq!(
            collector.tour_length().unwrap().get::<meter>(),
            (expected + closing).get::<meter>(),
            epsilon = 1e-6
        );
    }

    #[test]
    fn failed_add_leaves_collector_unchanged() {
        let geoid = Geoid::DEFAULT;
        let mut collector = geoid.length_collector();
        collector.add(point(0., 0.)).unwrap();

        let error = collector.add(point(0.5, 179.7)).unwrap_err();
        assert!(matches!(error, GeodesicError::ConvergenceFailure { .. }));
        assert_eq!(collector.len(), 1);
        assert_eq!(collector.path_length().get::<meter>(), 0.);
    }

    #[test]
    fn combination_is_unsupported() {
        let geoid = Geoid::DEFAULT;
        let mut left = geoid.length_collector();
        left.add(point(1., 1.)).unwrap();
        let right = geoid.length_collector();

        assert_eq!(
            left.combine(right).unwrap_err(),
            GeodesicError::UnsupportedCombination
        );
    }
}
