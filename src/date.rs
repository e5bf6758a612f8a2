//! Date grammars for both source formats.
//!
//! GEDCOM dates go through a strict structured parse first (`12 MAR 1920`,
//! `ABT 1900`, `BET 1900 AND 1910`, `FROM 1920 TO 1930`). Anything that does
//! not fit falls back to a regex token scan that also understands French month
//! names. GeneWeb uses its own compact `dd/mm/yyyy` grammar with symbolic
//! modifier prefixes.

use std::sync::LazyLock;

use regex::Regex;
use time::{Date, Month};

use crate::model::{DateModifier, GenealogyDate};

const ENGLISH_MONTHS: [&str; 12] = ["JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC"];

/// French month spellings, full and abbreviated, with and without diacritics.
const FRENCH_MONTHS: &[(&str, u8)] = &[
    ("janvier", 1),
    ("janv", 1),
    ("février", 2),
    ("fevrier", 2),
    ("févr", 2),
    ("fevr", 2),
    ("fév", 2),
    ("fev", 2),
    ("mars", 3),
    ("avril", 4),
    ("avr", 4),
    ("mai", 5),
    ("juin", 6),
    ("juillet", 7),
    ("juil", 7),
    ("août", 8),
    ("aout", 8),
    ("septembre", 9),
    ("sept", 9),
    ("octobre", 10),
    ("novembre", 11),
    ("décembre", 12),
    ("decembre", 12),
    ("déc", 12),
];

static MODIFIER_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    compile(r"(?i)^\s*(ABT|ABOUT|EST|CAL|BEF|BEFORE|AFT|AFTER|BET|BETWEEN|FROM|VERS|AVANT|APRÈS|APRES|ENTRE)\b\.?")
});

static TOKEN_RE: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"\p{L}+|\d+"));

fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(error) => {
            tracing::error!(%error, pattern, "date pattern failed to compile");
            None
        }
    }
}

// =============================================================================
// MONTHS
// =============================================================================

/// Resolve an English 3-letter abbreviation or a French month name to 1..=12.
#[must_use]
pub fn month_from_name(word: &str) -> Option<u8> {
    let word = word.trim().trim_end_matches('.');
    let upper = word.to_uppercase();
    if let Some(index) = ENGLISH_MONTHS.iter().position(|m| *m == upper) {
        return u8::try_from(index + 1).ok();
    }
    let lower = word.to_lowercase();
    FRENCH_MONTHS
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, month)| *month)
}

fn english_month(word: &str) -> Option<u8> {
    ENGLISH_MONTHS
        .iter()
        .position(|m| *m == word)
        .and_then(|index| u8::try_from(index + 1).ok())
}

// =============================================================================
// GEDCOM
// =============================================================================

/// Parse a GEDCOM `DATE` value. Never fails; unparsable text keeps only `raw`.
#[must_use]
pub fn parse_gedcom_date(raw: &str) -> GenealogyDate {
    let trimmed = raw.trim();
    parse_structured(trimmed).unwrap_or_else(|| parse_fallback(trimmed))
}

fn parse_structured(raw: &str) -> Option<GenealogyDate> {
    let upper = raw.to_ascii_uppercase();
    let cleaned = upper.trim_start_matches("@#DGREGORIAN@").trim();
    let tokens: Vec<&str> = cleaned.split_whitespace().collect();
    let (&first, rest) = tokens.split_first()?;

    let (modifier, start, end) = match first {
        "ABT" | "EST" | "CAL" => (DateModifier::About, rest, None),
        "BEF" => (DateModifier::Before, rest, None),
        "AFT" => (DateModifier::After, rest, None),
        "TO" => (DateModifier::Before, rest, None),
        "BET" => split_range(rest, "AND")?,
        "FROM" => match rest.iter().position(|t| *t == "TO") {
            Some(_) => split_range(rest, "TO")?,
            None => (DateModifier::Between, rest, None),
        },
        _ => (DateModifier::Exact, tokens.as_slice(), None),
    };

    let (day, month, year) = simple_date(start)?;
    let end_year = match end {
        Some(end) => Some(simple_date(end)?.2),
        None => None,
    };
    Some(GenealogyDate { day, month, year: Some(year), modifier, end_year, raw: raw.to_owned() })
}

fn split_range<'a>(
    tokens: &'a [&'a str],
    separator: &str,
) -> Option<(DateModifier, &'a [&'a str], Option<&'a [&'a str]>)> {
    let index = tokens.iter().position(|t| *t == separator)?;
    Some((DateModifier::Between, &tokens[..index], Some(&tokens[index + 1..])))
}

/// `[day] [MON] year` with an English month abbreviation.
fn simple_date(tokens: &[&str]) -> Option<(Option<u8>, Option<u8>, i32)> {
    let year = |token: &str| -> Option<i32> {
        let digits = token.split('/').next()?;
        if digits.is_empty() || digits.len() > 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    };
    match tokens {
        [y] => Some((None, None, year(y)?)),
        [m, y] => Some((None, Some(english_month(m)?), year(y)?)),
        [d, m, y] => {
            let day: u8 = d.parse().ok()?;
            if !(1..=31).contains(&day) {
                return None;
            }
            Some((Some(day), Some(english_month(m)?), year(y)?))
        }
        _ => None,
    }
}

/// Regex token scan for dates the structured grammar rejects.
///
/// Numbers above 31 are years. Numbers 1..=31 seen before any year fill the
/// day, then the month when the day is already taken.
fn parse_fallback(raw: &str) -> GenealogyDate {
    let mut date = GenealogyDate::raw_only(raw);
    let (Some(modifier_re), Some(token_re)) = (MODIFIER_RE.as_ref(), TOKEN_RE.as_ref()) else {
        return date;
    };

    let mut rest = raw;
    if let Some(caps) = modifier_re.captures(raw) {
        date.modifier = match caps[1].to_uppercase().as_str() {
            "ABT" | "ABOUT" | "EST" | "CAL" | "VERS" => DateModifier::About,
            "BEF" | "BEFORE" | "AVANT" => DateModifier::Before,
            "AFT" | "AFTER" | "APRÈS" | "APRES" => DateModifier::After,
            _ => DateModifier::Between,
        };
        rest = &raw[caps[0].len()..];
    }

    for token in token_re.find_iter(rest).map(|m| m.as_str()) {
        if token.bytes().all(|b| b.is_ascii_digit()) {
            if token.len() > 6 {
                continue;
            }
            let Ok(number) = token.parse::<i32>() else {
                continue;
            };
            if number > 31 {
                if date.year.is_none() {
                    date.year = Some(number);
                } else if date.modifier == DateModifier::Between && date.end_year.is_none() {
                    date.end_year = Some(number);
                }
            } else if number >= 1 && date.year.is_none() {
                let small = u8::try_from(number).ok();
                if date.day.is_none() {
                    date.day = small;
                } else if date.month.is_none() && number <= 12 {
                    date.month = small;
                }
            }
        } else if date.month.is_none() && date.year.is_none() {
            date.month = month_from_name(token);
        }
    }
    date
}

/// Render a date back into GEDCOM syntax.
#[must_use]
pub fn format_gedcom_date(date: &GenealogyDate) -> String {
    let Some(year) = date.year else {
        return date.raw.clone();
    };
    let mut core = String::new();
    if let Some(day) = date.day {
        core.push_str(&format!("{day} "));
    }
    if let Some(month) = date.month.filter(|m| (1..=12).contains(m)) {
        core.push_str(ENGLISH_MONTHS[usize::from(month - 1)]);
        core.push(' ');
    }
    core.push_str(&year.to_string());

    match date.modifier {
        DateModifier::Exact => core,
        DateModifier::About => format!("ABT {core}"),
        DateModifier::Before => format!("BEF {core}"),
        DateModifier::After => format!("AFT {core}"),
        DateModifier::Between => match date.end_year {
            Some(end) => format!("BET {core} AND {end}"),
            None => format!("BET {core}"),
        },
    }
}

// =============================================================================
// GENEWEB
// =============================================================================

/// Parse a compact GeneWeb date token (`~1920`, `<03/1920`, `12/03/1920`,
/// `1900..1910`). Returns `None` when the token is not a date at all.
///
/// Out-of-range day or month components are dropped, not fatal.
#[must_use]
pub fn parse_geneweb_date(token: &str) -> Option<GenealogyDate> {
    let raw = token.trim();
    let (modifier, body) = match raw.chars().next()? {
        '~' | '?' => (DateModifier::About, &raw[1..]),
        '<' => (DateModifier::Before, &raw[1..]),
        '>' => (DateModifier::After, &raw[1..]),
        _ => (DateModifier::Exact, raw),
    };

    let body = body.split('|').next().unwrap_or(body);
    if let Some((start, end)) = body.split_once("..") {
        let mut date = parse_geneweb_body(start, raw)?;
        date.modifier = DateModifier::Between;
        date.end_year = parse_geneweb_body(end, raw).and_then(|d| d.year);
        return Some(date);
    }

    let mut date = parse_geneweb_body(body, raw)?;
    date.modifier = modifier;
    Some(date)
}

fn parse_geneweb_body(body: &str, raw: &str) -> Option<GenealogyDate> {
    let body = body.trim_end_matches(['J', 'F', 'H', 'A']);
    let parts: Vec<&str> = body.split('/').collect();
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }
    if parts
        .iter()
        .any(|p| p.is_empty() || p.len() > 4 || !p.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }

    let numbers: Vec<u32> = parts.iter().filter_map(|p| p.parse().ok()).collect();
    let in_range = |value: u32, max: u32| -> Option<u8> {
        if (1..=max).contains(&value) { u8::try_from(value).ok() } else { None }
    };

    let (day, month, year) = match numbers.as_slice() {
        [d, m, y] => (in_range(*d, 31), in_range(*m, 12), *y),
        [m, y] => (None, in_range(*m, 12), *y),
        [y] => (None, None, *y),
        _ => return None,
    };
    if year == 0 {
        return None;
    }

    Some(GenealogyDate {
        day,
        month,
        year: i32::try_from(year).ok(),
        modifier: DateModifier::Exact,
        end_year: None,
        raw: raw.to_owned(),
    })
}

// =============================================================================
// TIMESTAMPS
// =============================================================================

/// Milliseconds since the Unix epoch at UTC midnight of the known date.
///
/// Missing month/day default to 1; an impossible day falls back to the first
/// of the month.
#[must_use]
pub fn to_timestamp_millis(date: &GenealogyDate) -> Option<i64> {
    calendar_millis(date.year?, date.month, date.day)
}

/// End of a dated interval: the end year for `between`, otherwise the start.
#[must_use]
pub fn end_timestamp_millis(date: &GenealogyDate) -> Option<i64> {
    match (date.modifier, date.end_year) {
        (DateModifier::Between, Some(end_year)) => calendar_millis(end_year, None, None),
        _ => to_timestamp_millis(date),
    }
}

fn calendar_millis(year: i32, month: Option<u8>, day: Option<u8>) -> Option<i64> {
    let month = match Month::try_from(month.unwrap_or(1)) {
        Ok(month) => month,
        Err(_) => Month::January,
    };
    let calendar = match Date::from_calendar_date(year, month, day.unwrap_or(1)) {
        Ok(calendar) => calendar,
        Err(_) => match Date::from_calendar_date(year, month, 1) {
            Ok(calendar) => calendar,
            Err(_) => return None,
        },
    };
    Some(calendar.midnight().assume_utc().unix_timestamp() * 1000)
}

#[cfg(test)]
#[path = "date_test.rs"]
mod tests;
