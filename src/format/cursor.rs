use super::field::{Axis, LocationField};
use super::location::Location;
use crate::error::ParseError;
use uom::si::f64::Length;
use uom::si::length::meter;

/// A read position in the text being parsed. Positions are byte offsets.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Cursor<'a> {
    text: &'a str,
    position: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self { text, position: 0 }
    }

    pub(crate) fn position(&self) -> usize {
        self.position
    }

    fn rest(&self) -> &'a str {
        &self.text[self.position..]
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.position == self.text.len()
    }

    /// The text between `start` and the current position.
    pub(crate) fn since(&self, start: usize) -> &'a str {
        &self.text[start..self.position]
    }

    /// Consumes the next character if it satisfies `predicate`.
    pub(crate) fn next_if(&mut self, predicate: impl FnOnce(char) -> bool) -> Option<char> {
        let c = self.rest().chars().next().filter(|&c| predicate(c))?;
        self.position += c.len_utf8();
        Some(c)
    }

    pub(crate) fn eat(&mut self, expected: char) -> bool {
        self.next_if(|c| c == expected).is_some()
    }

    pub(crate) fn eat_str(&mut self, expected: &str) -> bool {
        if self.rest().starts_with(expected) {
            self.position += expected.len();
            true
        } else {
            false
        }
    }

    /// Consumes between `min` and `max` ASCII digits, as many as there are.
    ///
    /// Leaves the cursor in place if there are fewer than `min`.
    pub(crate) fn digits(&mut self, min: usize, max: usize) -> Option<&'a str> {
        let count = self
            .rest()
            .bytes()
            .take(max)
            .take_while(u8::is_ascii_digit)
            .count();
        if count < min {
            return None;
        }
        let start = self.position;
        self.position += count;
        Some(self.since(start))
    }
}

/// What has been read of one axis so far.
#[derive(Debug, Clone, Copy, Default)]
struct Component {
    magnitude: Option<f64>,
    negative: bool,
}

impl Component {
    fn add(&mut self, magnitude: f64, negative: bool) {
        *self.magnitude.get_or_insert(0.) += magnitude;
        self.negative |= negative;
    }

    fn value(self) -> Option<f64> {
        self.magnitude
            .map(|m| if self.negative { -m } else { m })
    }
}

/// Collects the fields read while parsing, and turns them into a [`Location`] at the end.
///
/// It is `Copy` so that an optional section can be rolled back by restoring a snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Accumulator {
    latitude: Component,
    longitude: Component,
    elevation: Component,
}

impl Accumulator {
    fn component(&mut self, axis: Axis) -> &mut Component {
        match axis {
            Axis::Latitude => &mut self.latitude,
            Axis::Longitude => &mut self.longitude,
            Axis::Elevation => &mut self.elevation,
        }
    }

    /// Adds a field's magnitude, given in the field's own unit.
    pub(crate) fn add(&mut self, field: LocationField, magnitude: f64, negative: bool) {
        let whole = magnitude / field.unit.per_whole() as f64;
        self.component(field.axis).add(whole, negative);
    }

    pub(crate) fn set_hemisphere(&mut self, axis: Axis, negative: bool) {
        self.component(axis).negative |= negative;
    }

    pub(crate) fn build(self) -> Result<Location, ParseError> {
        let mut builder = Location::builder();
        if let Some(latitude) = self.latitude.value() {
            builder = builder
                .latitude_degrees(latitude)
                .ok_or(ParseError::OutOfRange {
                    field: Axis::Latitude.name(),
                    value: latitude,
                })?;
        }
        if let Some(longitude) = self.longitude.value() {
            builder = builder
                .longitude_degrees(longitude)
                .ok_or(ParseError::OutOfRange {
                    field: Axis::Longitude.name(),
                    value: longitude,
                })?;
        }
        if let Some(elevation) = self.elevation.value() {
            builder = builder.elevation(Length::new::<meter>(elevation));
        }
        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::{Accumulator, Cursor};
    use crate::error::ParseError;
    use crate::format::field::{Axis, LocationField};
    use approx::assert_relative_eq;

    #[test]
    fn cursor_moves_over_bytes() {
        let mut cursor = Cursor::new("12°34'x");
        assert_eq!(cursor.digits(1, 1), Some("1"));
        assert_eq!(cursor.digits(3, 3), None);
        assert_eq!(cursor.position(), 1);
        assert_eq!(cursor.digits(1, usize::MAX), Some("2"));
        assert!(!cursor.eat_str("'"));
        assert!(cursor.eat_str("°"));
        assert_eq!(cursor.position(), 4);
        assert_eq!(cursor.digits(2, 2), Some("34"));
        assert!(cursor.eat('\''));
        assert_eq!(cursor.next_if(|c| c == 'N' || c == 'S'), None);
        assert!(cursor.eat('x'));
        assert!(cursor.is_at_end());
        assert_eq!(cursor.since(4), "34'x");
    }

    #[test]
    fn accumulates_degrees_minutes_seconds() {
        let field = |letter| LocationField::from_letter(letter).unwrap();

        let mut accumulator = Accumulator::default();
        accumulator.add(field('D'), 18., true);
        accumulator.add(field('M'), 36., false);
        accumulator.add(field('S'), 36., false);
        accumulator.add(field('E'), 12.5, false);
        let location = accumulator.build().unwrap();

        assert_relative_eq!(location.latitude_degrees().unwrap(), -18.61, epsilon = 1e-12);
        assert_eq!(location.longitude_degrees(), None);
        assert_relative_eq!(location.elevation_meters().unwrap(), 12.5);
    }

    #[test]
    fn hemisphere_sets_the_sign() {
        let mut accumulator = Accumulator::default();
        accumulator.add(LocationField::from_letter('d').unwrap(), 1., false);
        accumulator.set_hemisphere(Axis::Longitude, true);
        let location = accumulator.build().unwrap();
        assert_eq!(location.longitude_degrees(), Some(-1.));
    }

    #[test]
    fn out_of_range() {
        let mut accumulator = Accumulator::default();
        accumulator.add(LocationField::from_letter('D').unwrap(), 91., false);
        assert_eq!(
            accumulator.build(),
            Err(ParseError::OutOfRange {
                field: "latitude",
                value: 91.
            })
        );
    }
}
