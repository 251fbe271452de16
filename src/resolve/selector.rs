//! Series token decoding.
//!
//! A series token is the URL-safe base64 encoding of a label selector such as
//! `{profile_type="heap",job="api"}`. An optional metric name may precede the
//! braces (`heap{job="api"}`) and is treated as a `__name__` matcher.
//!
//! Only equality matchers are accepted. `!=`, `=~` and `!~` are rejected as
//! malformed rather than coerced into equality matchers, so a regex selector
//! never silently targets a different series. Both padded and unpadded tokens
//! decode.
//!
//! Quoted values take the usual backslash escapes: `\a \b \f \n \r \t \v \\`,
//! the enclosing quote, `\xNN` and `\NNN` (ASCII only), `\uNNNN` and
//! `\UNNNNNNNN`. Any other escape is a syntax error.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, tag, take_while, take_while_m_n},
    character::complete::{char, multispace0, none_of, satisfy},
    combinator::{eof, map_opt, opt, recognize, value},
    multi::separated_list0,
    sequence::{delimited, pair, preceded},
    IResult, Parser,
};

use crate::resolve::{LabelMatcher, ResolveError, SeriesSelector};

/// Label carrying the metric name for `name{...}` selectors.
pub const METRIC_NAME_LABEL: &str = "__name__";

const TOKEN_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encode selector text into a series token.
pub fn encode_series(selector: &str) -> String {
    URL_SAFE.encode(selector.as_bytes())
}

/// Decode a series token into a selector.
pub fn decode_series(token: &str, profile_type_label: &str) -> Result<SeriesSelector, ResolveError> {
    let token = token.replace("%3D", "=").replace("%3d", "=");
    let bytes = TOKEN_ENGINE.decode(token.as_bytes())?;
    let text = String::from_utf8(bytes)?;

    let matchers = parse_selector(&text).map_err(|reason| ResolveError::Selector {
        selector: text.clone(),
        reason,
    })?;
    Ok(SeriesSelector::new(matchers, profile_type_label))
}

/// Parse selector text into equality matchers.
///
/// Returns a human readable reason on failure.
pub fn parse_selector(input: &str) -> Result<Vec<LabelMatcher>, String> {
    let parsed = match selector(input) {
        Ok((_, parsed)) => parsed,
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            return Err(format!("unexpected input at {:?}", e.input));
        }
        Err(nom::Err::Incomplete(_)) => return Err("unexpected end of selector".to_string()),
    };

    let mut matchers = Vec::with_capacity(parsed.len());
    for (name, op, value) in parsed {
        if op != "=" {
            return Err(format!(
                "unsupported operator {} for label {}, only equality matchers are allowed",
                op, name
            ));
        }
        matchers.push(LabelMatcher::equal(name, value));
    }

    if !matchers.iter().any(|m| !m.value.is_empty()) {
        return Err("vector selector must contain at least one non-empty matcher".to_string());
    }
    Ok(matchers)
}

type RawMatcher<'a> = (&'a str, &'a str, String);

fn selector(input: &str) -> IResult<&str, Vec<RawMatcher<'_>>> {
    let (input, _) = multispace0(input)?;
    let (input, metric) = opt(metric_name).parse(input)?;
    let (input, _) = multispace0(input)?;
    let (input, braced) = opt(braced_matchers).parse(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = eof(input)?;

    let mut matchers = Vec::new();
    if let Some(name) = metric {
        matchers.push((METRIC_NAME_LABEL, "=", name.to_string()));
    }
    matchers.extend(braced.unwrap_or_default());
    Ok((input, matchers))
}

fn braced_matchers(input: &str) -> IResult<&str, Vec<RawMatcher<'_>>> {
    let (input, _) = char('{').parse(input)?;
    let (input, _) = multispace0(input)?;
    let (input, matchers) =
        separated_list0(delimited(multispace0, char(','), multispace0), matcher).parse(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = opt(char(',')).parse(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = char('}').parse(input)?;
    Ok((input, matchers))
}

fn matcher(input: &str) -> IResult<&str, RawMatcher<'_>> {
    let (input, name) = label_name(input)?;
    let (input, _) = multispace0(input)?;
    let (input, op) = alt((tag("=~"), tag("!~"), tag("!="), tag("="))).parse(input)?;
    let (input, _) = multispace0(input)?;
    let (input, value) = quoted_string(input)?;
    Ok((input, (name, op, value)))
}

fn label_name(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))
    .parse(input)
}

fn metric_name(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c: char| c.is_ascii_alphabetic() || c == '_' || c == ':'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == ':'),
    ))
    .parse(input)
}

fn quoted_string(input: &str) -> IResult<&str, String> {
    let (input, quote) = alt((char('"'), char('\''))).parse(input)?;

    let (input, value) = if quote == '\'' {
        alt((
            escaped_transform(none_of("\\'"), '\\', |i| escape_sequence(i, '\'')),
            value(String::new(), tag("")),
        ))
        .parse(input)?
    } else {
        alt((
            escaped_transform(none_of("\\\""), '\\', |i| escape_sequence(i, '"')),
            value(String::new(), tag("")),
        ))
        .parse(input)?
    };

    let (input, _) = char(quote).parse(input)?;
    Ok((input, value))
}

/// The character denoted by an escape, with the leading backslash consumed.
fn escape_sequence(input: &str, quote: char) -> IResult<&str, char> {
    alt((
        value('\u{07}', char('a')),
        value('\u{08}', char('b')),
        value('\u{0C}', char('f')),
        value('\n', char('n')),
        value('\r', char('r')),
        value('\t', char('t')),
        value('\u{0B}', char('v')),
        value('\\', char('\\')),
        value(quote, char(quote)),
        map_opt(preceded(char('x'), digits(2, 16)), ascii_char),
        map_opt(digits(3, 8), ascii_char),
        map_opt(preceded(char('u'), digits(4, 16)), char::from_u32),
        map_opt(preceded(char('U'), digits(8, 16)), char::from_u32),
    ))
    .parse(input)
}

/// Exactly `count` digits in `radix`, as a number.
fn digits<'a>(count: usize, radix: u32) -> impl Parser<&'a str, Output = u32, Error = nom::error::Error<&'a str>> {
    map_opt(
        take_while_m_n(count, count, move |c: char| c.is_digit(radix)),
        move |s: &str| u32::from_str_radix(s, radix).ok(),
    )
}

fn ascii_char(code: u32) -> Option<char> {
    char::from_u32(code).filter(char::is_ascii)
}

/// Check that `name` is a valid label name.
pub fn is_valid_label_name(name: &str) -> bool {
    matches!(label_name(name), Ok(("", _)))
}
