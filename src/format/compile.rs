//! Turns location patterns into the elements a [`LocationFormatter`](super::LocationFormatter)
//! formats and parses with.

use super::field::{
    Axis, LocationField, LocationFieldFormat, Resolution, Unit, MAX_FRACTION_DIGITS,
};
use super::token::{is_field_letter, tokenize, FieldRun, Token};
use crate::error::{PatternError, PatternErrorKind};

/// One compiled piece of a location pattern.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Element {
    /// Text that is written and expected as-is.
    Literal(String),
    /// A `+` that does not precede a field, and is therefore text.
    Plus,
    Field(LocationFieldFormat),
    /// `X` (N/S) or `x` (E/W).
    Hemisphere(Axis),
    /// A `[...]` section, left out when formatting if a value it needs is missing, and skipped
    /// when parsing if it does not match.
    Optional(Vec<Element>),
}

impl Element {
    /// Appends the pattern text of this element to `out`.
    pub(crate) fn write_pattern(&self, out: &mut String) {
        match self {
            Element::Literal(text) => {
                let escaped = text.replace('\'', "''");
                if text.chars().any(is_protected) {
                    out.push('\'');
                    out.push_str(&escaped);
                    out.push('\'');
                } else {
                    out.push_str(&escaped);
                }
            }
            Element::Plus => out.push('+'),
            Element::Field(field) => field.write_pattern(out),
            Element::Hemisphere(axis) => {
                if let Some((letter, _, _)) = axis.hemisphere() {
                    out.push(letter);
                }
            }
            Element::Optional(elements) => {
                out.push('[');
                for element in elements {
                    element.write_pattern(out);
                }
                out.push(']');
            }
        }
    }
}

/// Characters that have to be quoted to appear in a literal.
fn is_protected(c: char) -> bool {
    is_field_letter(c) || matches!(c, 'X' | 'x' | '+' | '[' | ']')
}

/// Compiles and validates a location pattern.
pub(crate) fn compile(pattern: &str) -> Result<Vec<Element>, PatternError> {
    let error = |kind| PatternError {
        pattern: pattern.to_string(),
        kind,
    };

    let mut elements = Vec::new();
    let mut optional: Option<Vec<Element>> = None;
    let mut quoted = false;
    let mut sign = false;

    let mut tokens = tokenize(pattern).into_iter().peekable();
    while let Some(token) = tokens.next() {
        let target = optional.as_mut().unwrap_or(&mut elements);

        // a `+` binds only to the field right after it
        if sign && !matches!(token, Token::Field(_)) {
            target.push(Element::Plus);
            sign = false;
        }

        match token {
            Token::Quote => {
                if tokens.next_if_eq(&Token::Quote).is_some() {
                    push_literal(target, "'");
                } else {
                    quoted = !quoted;
                }
            }
            Token::Literal(text) => push_literal(target, &text),
            // the tokenizer only emits literals and quotes inside quotes
            token if quoted => push_literal(target, &token.to_string()),
            Token::Sign => sign = true,
            Token::Hemisphere(letter) => target.push(Element::Hemisphere(if letter == 'X' {
                Axis::Latitude
            } else {
                Axis::Longitude
            })),
            Token::Field(FieldRun {
                letter,
                width,
                fraction,
            }) => {
                let Some(field) = LocationField::from_letter(letter) else {
                    push_literal(target, &letter.to_string());
                    continue;
                };
                target.push(Element::Field(LocationFieldFormat::new(
                    field,
                    width,
                    fraction.unwrap_or(0),
                    sign,
                )));
                sign = false;
            }
            Token::OptionalStart => {
                if optional.is_some() {
                    return Err(error(PatternErrorKind::NestedOptional));
                }
                optional = Some(Vec::new());
            }
            Token::OptionalEnd => match optional.take() {
                Some(section) => elements.push(Element::Optional(section)),
                None => return Err(error(PatternErrorKind::UnopenedOptional)),
            },
        }
    }
    if sign {
        optional
            .as_mut()
            .unwrap_or(&mut elements)
            .push(Element::Plus);
    }
    if quoted {
        return Err(error(PatternErrorKind::UnclosedQuote));
    }
    if optional.is_some() {
        return Err(error(PatternErrorKind::UnclosedOptional));
    }

    validate(&elements).map_err(error)?;
    resolve(&mut elements);

    tracing::trace!(pattern, elements = elements.len(), "compiled location pattern");
    Ok(elements)
}

fn push_literal(target: &mut Vec<Element>, text: &str) {
    if let Some(Element::Literal(previous)) = target.last_mut() {
        previous.push_str(text);
    } else {
        target.push(Element::Literal(text.to_string()));
    }
}

/// Visits every field and hemisphere, including those in optional sections.
fn for_each_element<'e>(elements: &'e [Element], f: &mut impl FnMut(&'e Element)) {
    for element in elements {
        match element {
            Element::Optional(section) => for_each_element(section, f),
            element => f(element),
        }
    }
}

fn for_each_field_mut(elements: &mut [Element], f: &mut impl FnMut(&mut LocationFieldFormat)) {
    for element in elements {
        match element {
            Element::Optional(section) => for_each_field_mut(section, f),
            Element::Field(field) => f(field),
            _ => {}
        }
    }
}

/// The fields and hemisphere of one axis.
#[derive(Default)]
struct AxisFields<'e> {
    degrees: Option<&'e LocationFieldFormat>,
    minutes: Option<&'e LocationFieldFormat>,
    seconds: Option<&'e LocationFieldFormat>,
    hemisphere: bool,
}

fn validate(elements: &[Element]) -> Result<(), PatternErrorKind> {
    let mut seen = Vec::new();
    let mut repeated = None;
    let mut misplaced_sign = None;
    let mut too_precise = None;
    let mut latitude = AxisFields::default();
    let mut longitude = AxisFields::default();

    for_each_element(elements, &mut |element| {
        let letter = match element {
            Element::Field(field) => {
                if field.signed && !matches!(field.field.unit, Unit::Degrees | Unit::Meters) {
                    misplaced_sign.get_or_insert(field.field.letter());
                }
                if field.fraction > MAX_FRACTION_DIGITS {
                    too_precise.get_or_insert(field.field.letter());
                }
                let axis = match field.field.axis {
                    Axis::Latitude => &mut latitude,
                    Axis::Longitude => &mut longitude,
                    Axis::Elevation => return seen_once(&mut seen, &mut repeated, 'E'),
                };
                match field.field.unit {
                    Unit::Degrees => axis.degrees = Some(field),
                    Unit::Minutes => axis.minutes = Some(field),
                    Unit::Seconds => axis.seconds = Some(field),
                    Unit::Meters => {}
                }
                field.field.letter()
            }
            Element::Hemisphere(Axis::Latitude) => {
                latitude.hemisphere = true;
                'X'
            }
            Element::Hemisphere(_) => {
                longitude.hemisphere = true;
                'x'
            }
            _ => return,
        };
        seen_once(&mut seen, &mut repeated, letter);
    });

    if let Some(letter) = repeated {
        return Err(PatternErrorKind::RepeatedField(letter));
    }
    if let Some(letter) = misplaced_sign {
        return Err(PatternErrorKind::MisplacedSign(letter));
    }
    if let Some(field) = too_precise {
        return Err(PatternErrorKind::TooManyFractionDigits {
            field,
            max: MAX_FRACTION_DIGITS,
        });
    }
    validate_axis(&latitude, ['D', 'M', 'S', 'X'])?;
    validate_axis(&longitude, ['d', 'm', 's', 'x'])
}

fn seen_once(seen: &mut Vec<char>, repeated: &mut Option<char>, letter: char) {
    if seen.contains(&letter) {
        repeated.get_or_insert(letter);
    } else {
        seen.push(letter);
    }
}

fn validate_axis(
    fields: &AxisFields<'_>,
    [d, m, s, x]: [char; 4],
) -> Result<(), PatternErrorKind> {
    if let Some(degrees) = fields.degrees {
        if degrees.signed && fields.hemisphere {
            return Err(PatternErrorKind::SignWithHemisphere(d, x));
        }
        if degrees.fraction > 0 && (fields.minutes.is_some() || fields.seconds.is_some()) {
            return Err(PatternErrorKind::FractionalDegrees(d));
        }
    }
    if fields.minutes.is_some() && fields.degrees.is_none() {
        return Err(PatternErrorKind::MissingField {
            field: m,
            requires: d,
        });
    }
    if fields.seconds.is_some() && fields.minutes.is_none() {
        return Err(PatternErrorKind::MissingField {
            field: s,
            requires: m,
        });
    }
    if let (Some(minutes), Some(_)) = (fields.minutes, fields.seconds) {
        if minutes.fraction > 0 {
            return Err(PatternErrorKind::FractionalMinutes(m));
        }
    }
    Ok(())
}

/// Marks the fields of axes with a hemisphere as absolute, and tells every field the resolution
/// of its axis.
fn resolve(elements: &mut [Element]) {
    let mut hemispheres = Vec::new();
    let mut finest: Vec<(Axis, Resolution)> = Vec::new();
    for_each_element(elements, &mut |element| match element {
        Element::Hemisphere(axis) => hemispheres.push(*axis),
        Element::Field(field) => {
            let resolution = Resolution {
                unit: field.field.unit,
                fraction: field.fraction,
            };
            match finest.iter_mut().find(|(axis, _)| *axis == field.field.axis) {
                Some((_, current)) if current.unit.per_whole() < resolution.unit.per_whole() => {
                    *current = resolution;
                }
                Some(_) => {}
                None => finest.push((field.field.axis, resolution)),
            }
        }
        _ => {}
    });

    for_each_field_mut(elements, &mut |field| {
        field.absolute = hemispheres.contains(&field.field.axis);
        if let Some((_, resolution)) = finest.iter().find(|(axis, _)| *axis == field.field.axis) {
            field.resolution = *resolution;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::{compile, Element};
    use crate::error::PatternErrorKind;
    use crate::format::field::{Resolution, Unit};
    use rstest::rstest;

    fn to_pattern(elements: &[Element]) -> String {
        let mut out = String::new();
        for element in elements {
            element.write_pattern(&mut out);
        }
        out
    }

    #[rstest]
    #[case("D D", PatternErrorKind::RepeatedField('D'))]
    #[case("M M", PatternErrorKind::RepeatedField('M'))]
    #[case("S S", PatternErrorKind::RepeatedField('S'))]
    #[case("d d", PatternErrorKind::RepeatedField('d'))]
    #[case("m m", PatternErrorKind::RepeatedField('m'))]
    #[case("s s", PatternErrorKind::RepeatedField('s'))]
    #[case("E E", PatternErrorKind::RepeatedField('E'))]
    #[case("DX X", PatternErrorKind::RepeatedField('X'))]
    #[case("D[L]", PatternErrorKind::RepeatedField('D'))]
    #[case("+DX", PatternErrorKind::SignWithHemisphere('D', 'X'))]
    #[case("+dx", PatternErrorKind::SignWithHemisphere('d', 'x'))]
    #[case("D +M", PatternErrorKind::MisplacedSign('M'))]
    #[case("D.D M", PatternErrorKind::FractionalDegrees('D'))]
    #[case("D.D M S", PatternErrorKind::FractionalDegrees('D'))]
    #[case("d.d m", PatternErrorKind::FractionalDegrees('d'))]
    #[case("d.d m s", PatternErrorKind::FractionalDegrees('d'))]
    #[case("M", PatternErrorKind::MissingField { field: 'M', requires: 'D' })]
    #[case("M S", PatternErrorKind::MissingField { field: 'M', requires: 'D' })]
    #[case("S", PatternErrorKind::MissingField { field: 'S', requires: 'M' })]
    #[case("m", PatternErrorKind::MissingField { field: 'm', requires: 'd' })]
    #[case("m s", PatternErrorKind::MissingField { field: 'm', requires: 'd' })]
    #[case("s", PatternErrorKind::MissingField { field: 's', requires: 'm' })]
    #[case("D S", PatternErrorKind::MissingField { field: 'S', requires: 'M' })]
    #[case("D M.MM S", PatternErrorKind::FractionalMinutes('M'))]
    #[case("D.DDDDDDDDDD", PatternErrorKind::TooManyFractionDigits { field: 'D', max: 9 })]
    #[case("D M S.SSSSSSSSSSSSSSSSSSSS", PatternErrorKind::TooManyFractionDigits { field: 'S', max: 9 })]
    #[case("+E.EEEEEEEEEEEEEEEEEEEEE", PatternErrorKind::TooManyFractionDigits { field: 'E', max: 9 })]
    #[case("d m.mm s", PatternErrorKind::FractionalMinutes('m'))]
    #[case("[D[E]]", PatternErrorKind::NestedOptional)]
    #[case("D]", PatternErrorKind::UnopenedOptional)]
    #[case("[D", PatternErrorKind::UnclosedOptional)]
    #[case("D'm", PatternErrorKind::UnclosedQuote)]
    fn rejects_invalid_patterns(#[case] pattern: &str, #[case] kind: PatternErrorKind) {
        let error = compile(pattern).unwrap_err();
        assert_eq!(error.pattern, pattern);
        assert_eq!(error.kind, kind);
    }

    #[rstest]
    #[case("+LL.LLL", "+DD.DDD")]
    #[case("+ll.lll", "+dd.ddd")]
    #[case("+H.HH", "+E.EE")]
    #[case("L l H", "D d E")]
    fn normalizes_deprecated_letters(#[case] pattern: &str, #[case] canonical: &str) {
        assert_eq!(to_pattern(&compile(pattern).unwrap()), canonical);
    }

    #[rstest]
    #[case(".DDf")]
    #[case("DD[gg]")]
    #[case("DD[g''g]")]
    #[case("+[+A+]+")]
    #[case("D°MM''SS.SSS\"X")]
    #[case("+E'CRS'")]
    #[case("D.DDDDDDDDD")]
    #[case("DD°MM''SS.SSS\"X dd°mm''ss.sss\"x[ E.EE'm']")]
    fn canonical_patterns_round_trip(#[case] pattern: &str) {
        let elements = compile(pattern).unwrap();
        assert_eq!(to_pattern(&elements), pattern);
        assert_eq!(compile(&to_pattern(&elements)).unwrap(), elements);
    }

    #[rstest]
    #[case("'E'", "'E'")]
    #[case("'abc'", "abc")]
    #[case("'it''s'", "'it''s'")]
    #[case("'it'''", "it''")]
    #[case("'m'''", "'m'''")]
    #[case("a'b'c", "abc")]
    fn quoted_literals(#[case] pattern: &str, #[case] canonical: &str) {
        let elements = compile(pattern).unwrap();
        assert_eq!(to_pattern(&elements), canonical);
        assert_eq!(elements.len(), 1);
    }

    #[test]
    fn sign_binds_to_the_next_field() {
        let elements = compile("+[+'A'+]+").unwrap();
        assert_eq!(
            elements,
            vec![
                Element::Plus,
                Element::Optional(vec![
                    Element::Plus,
                    Element::Literal("A".to_string()),
                    Element::Plus,
                ]),
                Element::Plus,
            ]
        );

        let elements = compile("+DD").unwrap();
        assert!(matches!(&elements[..], [Element::Field(field)] if field.signed));
    }

    #[test]
    fn axes_share_their_finest_resolution() {
        let elements = compile("DD MM SS.SSSX E").unwrap();
        let fields: Vec<_> = elements
            .iter()
            .filter_map(|element| match element {
                Element::Field(field) => Some(*field),
                _ => None,
            })
            .collect();
        assert_eq!(fields.len(), 4);
        for field in &fields[..3] {
            assert!(field.absolute);
            assert_eq!(
                field.resolution,
                Resolution {
                    unit: Unit::Seconds,
                    fraction: 3
                }
            );
        }
        assert!(!fields[3].absolute);
        assert_eq!(
            fields[3].resolution,
            Resolution {
                unit: Unit::Meters,
                fraction: 0
            }
        );
    }
}
