//! Token-level parsing of GeneWeb family lines, person fragments and child lines.
//!
//! A `fam` line packs both spouses into one run of tokens with no fixed
//! fields. The split point is either an explicit `+` followed by a name, or
//! the first `SURNAME Given` pair after the husband's own name.

use crate::date::parse_geneweb_date;
use crate::model::{GenealogyDate, GenealogyPerson, GenealogyPlace, Sex};

/// Inline tags whose next token is their value.
const VALUE_TAGS: &[&str] = &["bp", "dp", "bs", "ds", "pp", "rp", "occu", "nick", "alias", "src", "image", "mp", "ms"];

/// A person as written in one place of the file, before identity assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonFragment {
    /// `surname_givenname` dedup key, lowercased, occurrence number kept.
    pub key: String,
    /// Raw surname token, used as the default surname of children.
    pub surname_token: String,
    pub person: GenealogyPerson,
}

/// Both spouses and the marriage data of one `fam` line.
#[derive(Debug, Clone, PartialEq)]
pub struct FamilyLine {
    pub husband: Option<PersonFragment>,
    pub wife: Option<PersonFragment>,
    pub marriage_date: Option<GenealogyDate>,
    pub marriage_place: Option<GenealogyPlace>,
}

// =============================================================================
// FAMILY LINES
// =============================================================================

/// Parse the text after `fam `. Returns `None` when no spouse separator exists.
#[must_use]
pub fn parse_family_line(text: &str) -> Option<FamilyLine> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let (husband_tokens, wife_tokens) = split_spouses(&tokens)?;

    let mut marriage_date = None;
    let mut marriage_place = None;
    let mut own = Vec::new();
    let mut i = 0;
    while i < husband_tokens.len() {
        let token = husband_tokens[i];
        if token == "+" {
            if let Some(date) = husband_tokens.get(i + 1).and_then(|next| parse_geneweb_date(next)) {
                marriage_date = Some(date);
                i += 2;
                continue;
            }
        } else if let Some(date) = token.strip_prefix('+').and_then(parse_geneweb_date) {
            marriage_date = Some(date);
            i += 1;
            continue;
        } else if token == "#mp" {
            marriage_place = husband_tokens.get(i + 1).map(|place| GenealogyPlace::new(&decode_spaces(place)));
            i += 2;
            continue;
        }
        own.push(token);
        i += 1;
    }

    Some(FamilyLine {
        husband: parse_person(&own, Sex::Male),
        wife: parse_person(&wife_tokens, Sex::Female),
        marriage_date,
        marriage_place,
    })
}

/// Locate the husband/wife boundary.
///
/// An explicit `+` counts only when it is followed by a name rather than a
/// date. Otherwise the first all-uppercase word followed by a capitalized
/// word, past the husband's own name, starts the wife.
fn split_spouses<'a>(tokens: &[&'a str]) -> Option<(Vec<&'a str>, Vec<&'a str>)> {
    for (i, token) in tokens.iter().enumerate() {
        if *token == "+" {
            if tokens.get(i + 1).is_some_and(|next| starts_name(next)) {
                return Some((tokens[..i].to_vec(), tokens[i + 1..].to_vec()));
            }
        } else if let Some(rest) = token.strip_prefix('+') {
            if starts_name(rest) {
                let mut wife = vec![rest];
                wife.extend_from_slice(&tokens[i + 1..]);
                return Some((tokens[..i].to_vec(), wife));
            }
        }
    }

    (2..tokens.len().saturating_sub(1))
        .find(|&i| {
            !is_tag(tokens[i - 1]) && is_surname_word(tokens[i]) && is_given_word(tokens[i + 1])
        })
        .map(|i| (tokens[..i].to_vec(), tokens[i..].to_vec()))
}

/// A surname token, or `?` for an unknown spouse.
fn starts_name(token: &str) -> bool {
    token == "?" || (parse_geneweb_date(token).is_none() && token.chars().next().is_some_and(char::is_uppercase))
}

fn is_tag(token: &str) -> bool {
    token.starts_with('#') && VALUE_TAGS.contains(&&token[1..])
}

/// All letters uppercase, at least two of them.
fn is_surname_word(token: &str) -> bool {
    let letters: Vec<char> = token.chars().filter(|c| c.is_alphabetic()).collect();
    letters.len() >= 2
        && letters.iter().all(|c| c.is_uppercase())
        && token.chars().all(|c| c.is_alphabetic() || matches!(c, '-' | '_' | '\'' | '.' | '0'..='9'))
}

/// Uppercase initial followed by at least one lowercase letter.
fn is_given_word(token: &str) -> bool {
    token.chars().next().is_some_and(char::is_uppercase) && token.chars().any(char::is_lowercase)
}

// =============================================================================
// PERSONS
// =============================================================================

/// Parse `SURNAME Given [dates] [#tag value]...` into a fragment.
///
/// Returns `None` for fewer than two tokens or for `?` placeholder names.
#[must_use]
pub fn parse_person(tokens: &[&str], sex: Sex) -> Option<PersonFragment> {
    let [surname, given, rest @ ..] = tokens else {
        return None;
    };
    if *surname == "?" || *given == "?" {
        return None;
    }

    let mut person = GenealogyPerson { sex, ..GenealogyPerson::default() };
    person.last_name = display_surname(surname);
    person.first_name = display_given(given);

    let mut date_slot = 0;
    let mut title = Vec::new();
    let mut i = 0;
    while i < rest.len() {
        let token = rest[i];
        if let Some(tag) = token.strip_prefix('#') {
            let value = rest
                .get(i + 1)
                .filter(|next| !next.starts_with('#') && parse_geneweb_date(next).is_none() && **next != "0");
            apply_tag(&mut person, tag, value.copied());
            i += if value.is_some() { 2 } else { 1 };
            continue;
        }
        if token.starts_with('[') || !title.is_empty() {
            title.push(token.trim_start_matches('[').trim_end_matches(']'));
            if token.ends_with(']') {
                person.title = Some(decode_spaces(&title.join(" "))).filter(|t| !t.is_empty());
                title.clear();
            }
            i += 1;
            continue;
        }
        if token == "0" {
            date_slot += 1;
        } else if let Some(date) = parse_geneweb_date(token) {
            match date_slot {
                0 => person.birth_date = Some(date),
                1 => person.death_date = Some(date),
                _ => {}
            }
            date_slot += 1;
        }
        i += 1;
    }

    Some(PersonFragment { key: person_key(surname, given), surname_token: (*surname).to_owned(), person })
}

fn apply_tag(person: &mut GenealogyPerson, tag: &str, value: Option<&str>) {
    let Some(value) = value.map(decode_spaces).filter(|v| !v.is_empty()) else {
        return;
    };
    match tag {
        "bp" => person.birth_place = Some(GenealogyPlace::new(&value)),
        "dp" => person.death_place = Some(GenealogyPlace::new(&value)),
        "occu" => person.occupation = Some(value),
        "nick" | "alias" => {
            if person.nickname.is_none() {
                person.nickname = Some(value);
            }
        }
        _ => {}
    }
}

/// Parse a children-block line: `- [h|f] Given [SURNAME] [dates] [#tags]`.
///
/// The surname defaults to the family's `default_surname` token.
#[must_use]
pub fn parse_child_line(line: &str, default_surname: &str) -> Option<PersonFragment> {
    let rest = line.trim().strip_prefix('-')?;
    let mut tokens: Vec<&str> = rest.split_whitespace().collect();

    let sex = match tokens.first().copied() {
        Some("h") => Sex::Male,
        Some("f") => Sex::Female,
        _ => Sex::Unknown,
    };
    if sex != Sex::Unknown {
        tokens.remove(0);
    }

    let (&given, after) = tokens.split_first()?;
    let (surname, after) = match after.split_first() {
        Some((&candidate, remaining)) if is_surname_word(candidate) => (candidate, remaining),
        _ => (default_surname, after),
    };

    let mut person_tokens = vec![surname, given];
    person_tokens.extend_from_slice(after);
    parse_person(&person_tokens, sex)
}

/// Dedup key for a `SURNAME Given` pair.
#[must_use]
pub fn person_key(surname: &str, given: &str) -> String {
    format!("{}_{}", surname.to_lowercase(), given.to_lowercase())
}

/// GeneWeb writes spaces inside a token as `_`.
fn decode_spaces(token: &str) -> String {
    token.replace('_', " ").trim().to_owned()
}

/// Drop a trailing `.N` occurrence number and decode spaces.
fn display_given(token: &str) -> String {
    let base = match token.rsplit_once('.') {
        Some((name, occurrence)) if !occurrence.is_empty() && occurrence.bytes().all(|b| b.is_ascii_digit()) => name,
        _ => token,
    };
    decode_spaces(base)
}

/// Title-case an all-uppercase surname (`DE_LA_TOUR` -> `De La Tour`).
fn display_surname(token: &str) -> String {
    let decoded = decode_spaces(token);
    if decoded.chars().any(char::is_lowercase) {
        return decoded;
    }
    let mut out = String::with_capacity(decoded.len());
    let mut word_start = true;
    for c in decoded.chars() {
        if c.is_alphabetic() {
            if word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            word_start = false;
        } else {
            out.push(c);
            word_start = matches!(c, ' ' | '-' | '\'');
        }
    }
    out
}
