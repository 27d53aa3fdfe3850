use super::cursor::Cursor;
use crate::error::{FormatError, ParseError};
use std::fmt::Write;

// integers above this are no longer exactly representable as f64
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// The most fraction digits a field may have. With this many, every latitude and longitude in
/// seconds still scales to an exact integer.
pub(crate) const MAX_FRACTION_DIGITS: usize = 9;

/// The location component a field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Axis {
    Latitude,
    Longitude,
    Elevation,
}

impl Axis {
    pub(crate) fn name(self) -> &'static str {
        match self {
            Axis::Latitude => "latitude",
            Axis::Longitude => "longitude",
            Axis::Elevation => "elevation",
        }
    }

    /// The letter of the hemisphere element of this axis, and the letters it reads and writes for
    /// non-negative and negative values.
    pub(crate) fn hemisphere(self) -> Option<(char, char, char)> {
        match self {
            Axis::Latitude => Some(('X', 'N', 'S')),
            Axis::Longitude => Some(('x', 'E', 'W')),
            Axis::Elevation => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Unit {
    Degrees,
    Minutes,
    Seconds,
    Meters,
}

impl Unit {
    /// How many of this unit make up one degree (or meter).
    pub(crate) fn per_whole(self) -> u64 {
        match self {
            Unit::Degrees | Unit::Meters => 1,
            Unit::Minutes => 60,
            Unit::Seconds => 3600,
        }
    }

    /// Whether this unit carries the sign of the whole value.
    fn is_whole(self) -> bool {
        matches!(self, Unit::Degrees | Unit::Meters)
    }
}

/// What a pattern letter stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LocationField {
    pub(crate) axis: Axis,
    pub(crate) unit: Unit,
}

impl LocationField {
    /// Maps a pattern letter to its field, resolving the deprecated `L`, `l`, and `H`.
    pub(crate) fn from_letter(letter: char) -> Option<Self> {
        let (axis, unit) = match letter {
            'D' | 'L' => (Axis::Latitude, Unit::Degrees),
            'M' => (Axis::Latitude, Unit::Minutes),
            'S' => (Axis::Latitude, Unit::Seconds),
            'd' | 'l' => (Axis::Longitude, Unit::Degrees),
            'm' => (Axis::Longitude, Unit::Minutes),
            's' => (Axis::Longitude, Unit::Seconds),
            'E' | 'H' => (Axis::Elevation, Unit::Meters),
            _ => return None,
        };
        Some(Self { axis, unit })
    }

    /// The canonical pattern letter.
    pub(crate) fn letter(self) -> char {
        match (self.axis, self.unit) {
            (Axis::Latitude, Unit::Degrees) => 'D',
            (Axis::Latitude, Unit::Minutes) => 'M',
            (Axis::Latitude, Unit::Seconds) => 'S',
            (Axis::Longitude, Unit::Degrees) => 'd',
            (Axis::Longitude, Unit::Minutes) => 'm',
            (Axis::Longitude, Unit::Seconds) => 's',
            (_, _) => 'E',
        }
    }

    pub(crate) fn name(self) -> &'static str {
        match (self.axis, self.unit) {
            (Axis::Latitude, Unit::Degrees) => "latitude degrees",
            (Axis::Latitude, Unit::Minutes) => "latitude minutes",
            (Axis::Latitude, Unit::Seconds) => "latitude seconds",
            (Axis::Longitude, Unit::Degrees) => "longitude degrees",
            (Axis::Longitude, Unit::Minutes) => "longitude minutes",
            (Axis::Longitude, Unit::Seconds) => "longitude seconds",
            (_, _) => "elevation",
        }
    }
}

/// The finest unit, and its number of fraction digits, that a pattern shows of an axis.
///
/// Values are rounded to this resolution once, and all fields of the axis are derived from the
/// rounded value. That way `D M` shows 0.999° as `1 0` rather than `0 60`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Resolution {
    pub(crate) unit: Unit,
    pub(crate) fraction: usize,
}

/// A compiled field of a location pattern, eg `+DD` or `SS.SSS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LocationFieldFormat {
    pub(crate) field: LocationField,
    /// Minimum number of integer digits. Widths above one are strict: they are zero-padded on
    /// format and must be matched exactly on parse.
    pub(crate) width: usize,
    pub(crate) fraction: usize,
    /// Preceded by `+`: always shows and requires a sign.
    pub(crate) signed: bool,
    /// The axis has a hemisphere letter, which carries the sign instead.
    pub(crate) absolute: bool,
    pub(crate) resolution: Resolution,
}

impl LocationFieldFormat {
    pub(crate) fn new(field: LocationField, width: usize, fraction: usize, signed: bool) -> Self {
        Self {
            field,
            width,
            fraction,
            signed,
            absolute: false,
            resolution: Resolution {
                unit: field.unit,
                fraction,
            },
        }
    }

    fn is_strict(&self) -> bool {
        self.width > 1
    }

    /// Appends this field's share of `value` (in degrees or meters) to `out`.
    pub(crate) fn format(&self, value: f64, out: &mut String) -> Result<(), FormatError> {
        let not_representable = || FormatError::NotRepresentable {
            field: self.field.axis.name(),
            value,
        };

        let Resolution { unit, fraction } = self.resolution;
        let scale = u32::try_from(fraction)
            .ok()
            .and_then(|f| 10_u64.checked_pow(f))
            .ok_or_else(not_representable)?;
        let scaled = value.abs() * unit.per_whole() as f64 * scale as f64;
        if !(scaled < MAX_EXACT_INTEGER) {
            return Err(not_representable());
        }
        // rounds half away from zero
        let ticks = scaled.round() as u64;

        let finest = ticks / scale;
        let mut integer = finest / (unit.per_whole() / self.field.unit.per_whole());
        if !self.field.unit.is_whole() {
            integer %= 60;
        }

        if self.signed {
            out.push(if value.is_sign_negative() { '-' } else { '+' });
        } else if !self.absolute && self.field.unit.is_whole() && value.is_sign_negative() {
            out.push('-');
        }

        // writing into a String cannot fail
        let _ = write!(out, "{integer:0width$}", width = self.width);
        if self.fraction > 0 {
            let _ = write!(out, ".{:0width$}", ticks % scale, width = self.fraction);
        }
        Ok(())
    }

    /// Reads this field at the cursor, returning the magnitude it denotes in its own unit, and
    /// whether it was preceded by a minus sign.
    pub(crate) fn parse(&self, cursor: &mut Cursor<'_>) -> Result<(f64, bool), ParseError> {
        let error = |position| ParseError::Field {
            field: self.field.name(),
            position,
        };

        let negative = if self.signed {
            match cursor.next_if(|c| c == '+' || c == '-') {
                Some(sign) => sign == '-',
                None => return Err(error(cursor.position())),
            }
        } else if !self.absolute && self.field.unit.is_whole() {
            cursor.eat('-')
        } else {
            false
        };

        let start = cursor.position();
        let integer = if self.is_strict() {
            cursor.digits(self.width, self.width)
        } else {
            cursor.digits(1, usize::MAX)
        };
        if integer.is_none() {
            return Err(error(cursor.position()));
        }
        if self.fraction > 0
            && !(cursor.eat('.') && cursor.digits(self.fraction, self.fraction).is_some())
        {
            return Err(error(cursor.position()));
        }

        let magnitude = cursor
            .since(start)
            .parse::<f64>()
            .map_err(|_| error(start))?;
        // minutes and seconds roll over into the next coarser field
        if !self.field.unit.is_whole() && magnitude >= 60. {
            return Err(error(start));
        }
        Ok((magnitude, negative))
    }

    /// Appends the pattern text of this field to `out`.
    pub(crate) fn write_pattern(&self, out: &mut String) {
        let letter = self.field.letter();
        if self.signed {
            out.push('+');
        }
        out.extend(std::iter::repeat(letter).take(self.width));
        if self.fraction > 0 {
            out.push('.');
            out.extend(std::iter::repeat(letter).take(self.fraction));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Axis, LocationField, LocationFieldFormat, Resolution, Unit};
    use crate::error::{FormatError, ParseError};
    use crate::format::cursor::Cursor;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn field(letter: char, width: usize, fraction: usize, signed: bool) -> LocationFieldFormat {
        LocationFieldFormat::new(
            LocationField::from_letter(letter).unwrap(),
            width,
            fraction,
            signed,
        )
    }

    fn format(field: &LocationFieldFormat, value: f64) -> String {
        let mut out = String::new();
        field.format(value, &mut out).unwrap();
        out
    }

    #[rstest]
    #[case('D', 'D', Axis::Latitude, Unit::Degrees)]
    #[case('L', 'D', Axis::Latitude, Unit::Degrees)]
    #[case('l', 'd', Axis::Longitude, Unit::Degrees)]
    #[case('s', 's', Axis::Longitude, Unit::Seconds)]
    #[case('H', 'E', Axis::Elevation, Unit::Meters)]
    fn letters(#[case] letter: char, #[case] canonical: char, #[case] axis: Axis, #[case] unit: Unit) {
        let field = LocationField::from_letter(letter).unwrap();
        assert_eq!(field.letter(), canonical);
        assert_eq!(field.axis, axis);
        assert_eq!(field.unit, unit);
    }

    #[test]
    fn unknown_letters() {
        assert_eq!(LocationField::from_letter('X'), None);
        assert_eq!(LocationField::from_letter('g'), None);
    }

    #[rstest]
    #[case(field('D', 1, 0, false), 1., "1")]
    #[case(field('D', 2, 0, false), 1., "01")]
    #[case(field('D', 2, 0, false), -1., "-01")]
    #[case(field('D', 1, 0, true), 1., "+1")]
    #[case(field('D', 1, 0, true), -1., "-1")]
    #[case(field('d', 3, 0, false), -12., "-012")]
    #[case(field('d', 2, 0, false), 123., "123")]
    #[case(field('D', 1, 2, false), 1.234, "1.23")]
    #[case(field('D', 1, 2, false), 1.235, "1.24")]
    #[case(field('E', 1, 2, false), 0., "0.00")]
    #[case(field('E', 1, 0, true), 0., "+0")]
    fn formats_whole_fields(
        #[case] field: LocationFieldFormat,
        #[case] value: f64,
        #[case] expected: &str,
    ) {
        assert_eq!(format(&field, value), expected);
    }

    #[test]
    fn coarser_fields_use_the_finest_resolution() {
        let resolution = Resolution {
            unit: Unit::Seconds,
            fraction: 2,
        };
        let mut degrees = field('D', 1, 0, false);
        degrees.resolution = resolution;
        let mut minutes = field('M', 1, 0, false);
        minutes.resolution = resolution;
        let mut seconds = field('S', 1, 2, false);
        seconds.resolution = resolution;

        // 0.099° = 0° 5' 56.4"
        assert_eq!(format(&degrees, 0.099), "0");
        assert_eq!(format(&minutes, 0.099), "5");
        assert_eq!(format(&seconds, 0.099), "56.40");

        // minutes and seconds never carry a sign
        assert_eq!(format(&degrees, -0.099), "-0");
        assert_eq!(format(&minutes, -0.099), "5");
    }

    #[test]
    fn absolute_fields_have_no_sign() {
        let mut degrees = field('D', 1, 0, false);
        degrees.absolute = true;
        assert_eq!(format(&degrees, -1.), "1");
    }

    #[rstest]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    #[case(1e300)]
    fn rejects_unrepresentable_values(#[case] value: f64) {
        let mut out = String::new();
        assert!(matches!(
            field('D', 1, 3, false).format(value, &mut out),
            Err(FormatError::NotRepresentable { field: "latitude", .. })
        ));
    }

    #[rstest]
    #[case(field('D', 1, 0, false), "12", 12., false, 2)]
    #[case(field('D', 1, 0, false), "-12", 12., true, 3)]
    #[case(field('D', 2, 0, false), "123", 12., false, 2)]
    #[case(field('D', 2, 0, false), "-01", 1., true, 3)]
    #[case(field('D', 2, 0, true), "+01", 1., false, 3)]
    #[case(field('M', 1, 3, false), "36.000x", 36., false, 6)]
    #[case(field('E', 1, 2, false), "0.10m", 0.1, false, 4)]
    #[case(field('S', 2, 2, false), "59.99", 59.99, false, 5)]
    #[case(field('D', 1, 0, false), "75", 75., false, 2)]
    fn parses(
        #[case] field: LocationFieldFormat,
        #[case] text: &str,
        #[case] magnitude: f64,
        #[case] negative: bool,
        #[case] consumed: usize,
    ) {
        let mut cursor = Cursor::new(text);
        let (m, n) = field.parse(&mut cursor).unwrap();
        assert_relative_eq!(m, magnitude);
        assert_eq!(n, negative);
        assert_eq!(cursor.position(), consumed);
    }

    #[rstest]
    #[case(field('D', 1, 0, true), "1", 0)]
    #[case(field('D', 2, 0, false), "1", 0)]
    #[case(field('D', 1, 2, false), "1.2", 2)]
    #[case(field('D', 1, 2, false), "1,23", 1)]
    #[case(field('M', 1, 0, false), "-1", 0)]
    #[case(field('D', 1, 0, false), "", 0)]
    #[case(field('M', 1, 0, false), "75", 0)]
    #[case(field('M', 2, 3, false), "60.000", 0)]
    #[case(field('s', 2, 2, false), "60.00", 0)]
    fn rejects(#[case] field: LocationFieldFormat, #[case] text: &str, #[case] position: usize) {
        let mut cursor = Cursor::new(text);
        let error = field.parse(&mut cursor).unwrap_err();
        assert!(matches!(error, ParseError::Field { .. }));
        assert_eq!(error.position(), Some(position));
    }

    #[test]
    fn patterns() {
        let mut out = String::new();
        field('L', 2, 3, true).write_pattern(&mut out);
        field('m', 1, 0, false).write_pattern(&mut out);
        assert_eq!(out, "+DD.DDDm");
    }
}
