//! Formatting and parsing of geographic locations with patterns.
//!
//! A pattern is made up of field letters, each standing for one component of a [`Location`]:
//!
//! | Letter | Field |
//! |---|---|
//! | `D` | latitude degrees |
//! | `M` | latitude minutes |
//! | `S` | latitude seconds |
//! | `d` | longitude degrees |
//! | `m` | longitude minutes |
//! | `s` | longitude seconds |
//! | `E` | elevation in meters |
//! | `X` | hemisphere of the latitude, `N` or `S` |
//! | `x` | hemisphere of the longitude, `E` or `W` |
//!
//! A run of the same letter (`DD`) sets a minimum width that is zero-padded when formatting and
//! must be matched exactly when parsing. A single letter (`D`) uses as many digits as needed. The
//! letters after a `.` (`DD.DDD`) are the fraction digits, at most nine per field. Parsed minutes
//! and seconds must be below 60. A `+` before a degree or elevation
//! field always shows the sign. Text in `'...'` is taken literally, `''` is an apostrophe, and a
//! `[...]` section is optional. Other characters are literal text.
//!
//! The letters `L`, `l`, and `H` are accepted as older names of `D`, `d`, and `E`.
//!
//! ```
//! use track_geodesy::format::{Location, LocationFormatter, ISO_HUMAN_LONG};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let location = Location::builder()
//!     .latitude_degrees(47.2692124)
//!     .unwrap()
//!     .longitude_degrees(11.4041024)
//!     .unwrap()
//!     .build();
//!
//! let text = ISO_HUMAN_LONG.format(&location)?;
//! assert_eq!(text, "47°16'09.165\"N 11°24'14.769\"E");
//!
//! let custom = LocationFormatter::of_pattern("DD.DDDDX dd.ddddx")?;
//! assert_eq!(custom.format(&location)?, "47.2692N 11.4041E");
//! let parsed = custom.parse("47.2692N 11.4041E")?;
//! assert_eq!(parsed.latitude_degrees(), Some(47.2692));
//! # Ok(())
//! # }
//! ```

mod compile;
mod cursor;
mod field;
mod location;
mod token;

pub use location::{Builder as LocationBuilder, Location};
pub use token::{tokenize, FieldRun, Token};

use crate::error::{FormatError, ParseError, PatternError};
use compile::{compile, Element};
use cursor::{Accumulator, Cursor};
use field::Axis;
use once_cell::sync::Lazy;
use std::fmt;
use std::str::FromStr;
use uom::si::angle::degree;
use uom::si::f64::{Angle, Length};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Formats and parses [`Location`]s according to a pattern.
///
/// A formatter is compiled once and can then be shared and reused; it is immutable.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct LocationFormatter {
    elements: Vec<Element>,
    /// The canonical form of the pattern this formatter was compiled from.
    pattern: String,
}

impl LocationFormatter {
    /// Compiles a location pattern.
    ///
    /// See the [module documentation](self) for the pattern language.
    pub fn of_pattern(pattern: &str) -> Result<Self, PatternError> {
        let elements = compile(pattern)?;
        let mut canonical = String::new();
        for element in &elements {
            element.write_pattern(&mut canonical);
        }
        Ok(Self {
            elements,
            pattern: canonical,
        })
    }

    /// Returns the pattern of this formatter.
    ///
    /// This is the canonical form of the pattern the formatter was compiled from: deprecated
    /// letters are replaced, and literals are only quoted where they have to be. Compiling it
    /// again yields an equal formatter.
    #[must_use]
    pub fn to_pattern(&self) -> &str {
        &self.pattern
    }

    /// Formats a location.
    ///
    /// Optional sections are left out if the location lacks a value they need. Fails if any
    /// other part of the pattern needs a value the location lacks.
    pub fn format(&self, location: &Location) -> Result<String, FormatError> {
        let mut out = String::new();
        for element in &self.elements {
            match element {
                Element::Optional(section) => {
                    if section
                        .iter()
                        .filter_map(needed_axis)
                        .all(|axis| value(location, axis).is_some())
                    {
                        for element in section {
                            self.format_element(element, location, &mut out)?;
                        }
                    }
                }
                element => self.format_element(element, location, &mut out)?,
            }
        }
        Ok(out)
    }

    fn format_element(
        &self,
        element: &Element,
        location: &Location,
        out: &mut String,
    ) -> Result<(), FormatError> {
        let required = |axis: Axis| {
            value(location, axis).ok_or_else(|| FormatError::MissingValue {
                field: axis.name(),
                pattern: self.pattern.clone(),
            })
        };

        match element {
            Element::Literal(text) => out.push_str(text),
            Element::Plus => out.push('+'),
            Element::Field(field) => field.format(required(field.field.axis)?, out)?,
            Element::Hemisphere(axis) => {
                let value = required(*axis)?;
                if let Some((_, positive, negative)) = axis.hemisphere() {
                    out.push(if value.is_sign_negative() {
                        negative
                    } else {
                        positive
                    });
                }
            }
            Element::Optional(section) => {
                for element in section {
                    self.format_element(element, location, out)?;
                }
            }
        }
        Ok(())
    }

    /// Formats a location that only has a latitude.
    ///
    /// Fails if the latitude is outside [-90°, 90°], or the pattern needs another component.
    pub fn format_latitude(&self, latitude: Angle) -> Result<String, FormatError> {
        let location = Location::builder()
            .latitude(latitude)
            .ok_or(FormatError::NotRepresentable {
                field: Axis::Latitude.name(),
                value: latitude.get::<degree>(),
            })?
            .build();
        self.format(&location)
    }

    /// Formats a location that only has a longitude.
    ///
    /// Fails if the longitude is outside [-180°, 180°], or the pattern needs another component.
    pub fn format_longitude(&self, longitude: Angle) -> Result<String, FormatError> {
        let location = Location::builder()
            .longitude(longitude)
            .ok_or(FormatError::NotRepresentable {
                field: Axis::Longitude.name(),
                value: longitude.get::<degree>(),
            })?
            .build();
        self.format(&location)
    }

    /// Formats a location that only has an elevation.
    pub fn format_elevation(&self, elevation: Length) -> Result<String, FormatError> {
        self.format(&Location::builder().elevation(elevation).build())
    }

    /// Parses a location from the whole of `text`.
    pub fn parse(&self, text: &str) -> Result<Location, ParseError> {
        let (location, consumed) = self.parse_prefix(text)?;
        if consumed < text.len() {
            return Err(ParseError::TrailingInput { position: consumed });
        }
        Ok(location)
    }

    /// Parses a location from the start of `text`.
    ///
    /// Returns the location and the number of bytes it took up.
    pub fn parse_prefix(&self, text: &str) -> Result<(Location, usize), ParseError> {
        let mut cursor = Cursor::new(text);
        let mut accumulator = Accumulator::default();
        parse_elements(&self.elements, &mut cursor, &mut accumulator)?;
        Ok((accumulator.build()?, cursor.position()))
    }
}

/// The location component an element needs, if any.
fn needed_axis(element: &Element) -> Option<Axis> {
    match element {
        Element::Field(field) => Some(field.field.axis),
        Element::Hemisphere(axis) => Some(*axis),
        _ => None,
    }
}

/// A component of a location in the unit patterns are written in, degrees or meters.
fn value(location: &Location, axis: Axis) -> Option<f64> {
    match axis {
        Axis::Latitude => location.latitude_degrees(),
        Axis::Longitude => location.longitude_degrees(),
        Axis::Elevation => location.elevation_meters(),
    }
}

fn parse_elements(
    elements: &[Element],
    cursor: &mut Cursor<'_>,
    accumulator: &mut Accumulator,
) -> Result<(), ParseError> {
    for element in elements {
        match element {
            Element::Literal(text) => {
                if !cursor.eat_str(text) {
                    return Err(ParseError::Literal {
                        expected: text.clone(),
                        position: cursor.position(),
                    });
                }
            }
            Element::Plus => {
                if !cursor.eat('+') {
                    return Err(ParseError::Literal {
                        expected: "+".to_string(),
                        position: cursor.position(),
                    });
                }
            }
            Element::Field(field) => {
                let (magnitude, negative) = field.parse(cursor)?;
                accumulator.add(field.field, magnitude, negative);
            }
            Element::Hemisphere(axis) => {
                let Some((_, positive, negative)) = axis.hemisphere() else {
                    continue;
                };
                match cursor.next_if(|c| c == positive || c == negative) {
                    Some(letter) => accumulator.set_hemisphere(*axis, letter == negative),
                    None => {
                        return Err(ParseError::Hemisphere {
                            expected: if *axis == Axis::Latitude {
                                "N or S"
                            } else {
                                "E or W"
                            },
                            position: cursor.position(),
                        })
                    }
                }
            }
            Element::Optional(section) => {
                let (mut attempt, mut attempted) = (*cursor, *accumulator);
                match parse_elements(section, &mut attempt, &mut attempted) {
                    Ok(()) => {
                        *cursor = attempt;
                        *accumulator = attempted;
                    }
                    Err(error) => {
                        tracing::debug!(%error, position = cursor.position(), "skipping optional section");
                    }
                }
            }
        }
    }
    Ok(())
}

impl fmt::Display for LocationFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LocationFormatter[{}]", self.pattern)
    }
}

impl FromStr for LocationFormatter {
    type Err = PatternError;

    fn from_str(pattern: &str) -> Result<Self, Self::Err> {
        Self::of_pattern(pattern)
    }
}

impl TryFrom<String> for LocationFormatter {
    type Error = PatternError;

    fn try_from(pattern: String) -> Result<Self, Self::Error> {
        Self::of_pattern(&pattern)
    }
}

impl From<LocationFormatter> for String {
    fn from(formatter: LocationFormatter) -> Self {
        formatter.pattern
    }
}

fn preset(pattern: &str) -> LocationFormatter {
    LocationFormatter::of_pattern(pattern).expect("preset patterns are valid")
}

/// Latitude in degrees, minutes, and seconds, eg `23°59'15.486"N`.
pub static ISO_HUMAN_LAT_LONG: Lazy<LocationFormatter> = Lazy::new(|| preset("D°MM''SS.SSS\"X"));

/// Longitude in degrees, minutes, and seconds, eg `65°14'03.390"W`.
pub static ISO_HUMAN_LON_LONG: Lazy<LocationFormatter> =
    Lazy::new(|| preset("dd°mm''ss.sss\"x"));

/// Elevation in meters, eg `23.99m`.
pub static ISO_HUMAN_ELE_LONG: Lazy<LocationFormatter> = Lazy::new(|| preset("E.EE'm'"));

/// Latitude, longitude, and (if present) elevation, eg `23°59'15.486"N 65°14'03.390"W 23.99m`.
pub static ISO_HUMAN_LONG: Lazy<LocationFormatter> =
    Lazy::new(|| preset("DD°MM''SS.SSS\"X dd°mm''ss.sss\"x[ E.EE'm']"));

/// ISO 6709 latitude in degrees, eg `+23.99`.
pub static ISO_LAT_SHORT: Lazy<LocationFormatter> = Lazy::new(|| preset("+DD.DD"));

/// ISO 6709 latitude in degrees and minutes, eg `+2359.258`.
pub static ISO_LAT_MEDIUM: Lazy<LocationFormatter> = Lazy::new(|| preset("+DDMM.MMM"));

/// ISO 6709 latitude in degrees, minutes, and seconds, eg `+235915.49`.
pub static ISO_LAT_LONG: Lazy<LocationFormatter> = Lazy::new(|| preset("+DDMMSS.SS"));

/// ISO 6709 longitude in degrees, eg `+023.99`.
pub static ISO_LON_SHORT: Lazy<LocationFormatter> = Lazy::new(|| preset("+ddd.dd"));

/// ISO 6709 longitude in degrees and minutes, eg `+02359.258`.
pub static ISO_LON_MEDIUM: Lazy<LocationFormatter> = Lazy::new(|| preset("+dddmm.mmm"));

/// ISO 6709 longitude in degrees, minutes, and seconds, eg `+0235915.49`.
pub static ISO_LON_LONG: Lazy<LocationFormatter> = Lazy::new(|| preset("+dddmmss.ss"));

/// ISO 6709 elevation in whole meters, eg `+24CRS`.
pub static ISO_ELE_SHORT: Lazy<LocationFormatter> = Lazy::new(|| preset("+E'CRS'"));

/// ISO 6709 elevation in meters with one decimal, eg `+24.0CRS`.
pub static ISO_ELE_MEDIUM: Lazy<LocationFormatter> = Lazy::new(|| preset("+E.E'CRS'"));

/// ISO 6709 elevation in meters with two decimals, eg `+23.99CRS`.
pub static ISO_ELE_LONG: Lazy<LocationFormatter> = Lazy::new(|| preset("+E.EE'CRS'"));

/// [`ISO_LAT_SHORT`], [`ISO_LON_SHORT`], and (if present) [`ISO_ELE_SHORT`] in one.
pub static ISO_SHORT: Lazy<LocationFormatter> =
    Lazy::new(|| preset("+DD.DD+ddd.dd[+E'CRS']"));

/// [`ISO_LAT_MEDIUM`], [`ISO_LON_MEDIUM`], and (if present) [`ISO_ELE_MEDIUM`] in one.
pub static ISO_MEDIUM: Lazy<LocationFormatter> =
    Lazy::new(|| preset("+DDMM.MMM+dddmm.mmm[+E.E'CRS']"));

/// [`ISO_LAT_LONG`], [`ISO_LON_LONG`], and (if present) [`ISO_ELE_LONG`] in one.
pub static ISO_LONG: Lazy<LocationFormatter> =
    Lazy::new(|| preset("+DDMMSS.SS+dddmmss.ss[+E.EE'CRS']"));
