//! Record extraction: individuals, families, header metadata.
//!
//! Every optional field goes through an [`Extraction`] so a missing tag stays
//! silent while a present-but-unusable tag becomes a warning. Only a record
//! without an identifier is dropped.

use std::collections::HashMap;

use super::tree::{self, GedcomNode};
use crate::date::parse_gedcom_date;
use crate::detect::Format;
use crate::model::{
    Extraction, FileMetadata, GenealogyDate, GenealogyFamily, GenealogyPerson, GenealogyPlace, ParseResult, Residence,
    Sex,
};

/// Lookups shared by every record of one file.
struct RecordContext<'a> {
    /// Shared `NOTE` records by identifier.
    notes: &'a HashMap<String, String>,
    /// Whether `PLAC.MAP` coordinates are read (GEDCOM 7.0).
    geocoded: bool,
}

/// Parse raw GEDCOM bytes into the shared model.
#[must_use]
pub fn parse(bytes: &[u8]) -> ParseResult {
    let mut warnings = Vec::new();
    let text = tree::decode(bytes, &mut warnings);
    let lines = tree::preprocess(&text);
    let records = tree::build_tree(&lines, &mut warnings);

    let metadata = records
        .iter()
        .find(|r| r.tag == "HEAD")
        .map_or_else(|| FileMetadata { format: Some(Format::Gedcom), ..FileMetadata::default() }, extract_metadata);
    let geocoded = metadata.version.as_deref().is_some_and(|v| v.trim_start().starts_with('7'));

    let notes: HashMap<String, String> = records
        .iter()
        .filter(|r| r.tag == "NOTE" || r.tag == "SNOTE")
        .filter_map(|r| r.xref.clone().map(|id| (id, r.text())))
        .collect();
    let ctx = RecordContext { notes: &notes, geocoded };

    let mut persons = Vec::new();
    let mut families = Vec::new();
    for record in &records {
        match record.tag.as_str() {
            "INDI" => persons.extend(extract_individual(record, &ctx, &mut warnings)),
            "FAM" => families.extend(extract_family(record, &ctx, &mut warnings)),
            _ => {}
        }
    }

    let mut result = ParseResult { persons, families, metadata, warnings };
    result.enforce_references();
    result
}

// =============================================================================
// HEADER
// =============================================================================

fn extract_metadata(head: &GedcomNode) -> FileMetadata {
    let version = head
        .child("GEDC")
        .and_then(|gedc| gedc.child_value("VERS"))
        .map(ToOwned::to_owned);
    let source = head.child("SOUR").and_then(|sour| {
        sour.child_value("NAME")
            .or_else(|| Some(sour.value.trim()).filter(|v| !v.is_empty()))
            .map(ToOwned::to_owned)
    });
    FileMetadata {
        format: Some(Format::Gedcom),
        version,
        source,
        language: head.child_value("LANG").map(ToOwned::to_owned),
        encoding: head.child_value("CHAR").map(ToOwned::to_owned),
    }
}

// =============================================================================
// INDIVIDUALS
// =============================================================================

fn extract_individual(record: &GedcomNode, ctx: &RecordContext<'_>, warnings: &mut Vec<String>) -> Option<GenealogyPerson> {
    let Some(id) = record.xref.clone() else {
        warnings.push("INDI record without identifier dropped".to_owned());
        return None;
    };
    let context = format!("INDI {id}");
    let mut person = GenealogyPerson::new(&id);

    if let Some((first, last)) = extract_name(record).into_option(&format!("{context} NAME"), warnings) {
        person.first_name = first;
        person.last_name = last;
    }
    person.sex = record.child_value("SEX").map_or(Sex::Unknown, Sex::from_code);

    if let Some(birth) = record.child("BIRT") {
        (person.birth_date, person.birth_place) = extract_event(birth, ctx, &format!("{context} BIRT"), warnings);
    }
    if let Some(death) = record.child("DEAT") {
        (person.death_date, person.death_place) = extract_event(death, ctx, &format!("{context} DEAT"), warnings);
    }

    person.occupation = non_empty_text(record.child("OCCU"));
    person.nickname = record
        .child("NAME")
        .and_then(|name| name.child_value("NICK"))
        .or_else(|| record.child_value("NICK"))
        .map(ToOwned::to_owned);
    person.title = non_empty_text(record.child("TITL"));
    person.notes = extract_notes(record, ctx);

    for residence in record.children.iter().filter(|c| is_residence(c)) {
        let (date, place) = extract_event(residence, ctx, &format!("{context} RESI"), warnings);
        if date.is_some() || place.is_some() {
            person.residences.push(Residence { date, place });
        }
    }

    person.child_of_family = record.children_with("FAMC").find_map(GedcomNode::pointer);
    person.spouse_of_families = record.children_with("FAMS").filter_map(GedcomNode::pointer).collect();
    Some(person)
}

/// Given/surname, preferring `GIVN`/`SURN` over the `First /Last/` value.
fn extract_name(record: &GedcomNode) -> Extraction<(String, String)> {
    let Some(name) = record.child("NAME") else {
        return Extraction::Absent;
    };

    let (mut first, mut last) = split_slashed_name(&name.value);
    if let Some(given) = name.child_value("GIVN") {
        given.clone_into(&mut first);
    }
    if let Some(surname) = name.child_value("SURN") {
        surname.clone_into(&mut last);
    }

    if first.is_empty() && last.is_empty() {
        return Extraction::Malformed(format!("no usable name in '{}'", name.value.trim()));
    }
    Extraction::Found((first, last))
}

/// Split `Jean /Dupont/ Jr` into (`Jean Jr`, `Dupont`).
fn split_slashed_name(value: &str) -> (String, String) {
    let mut parts = value.splitn(3, '/');
    let before = parts.next().unwrap_or_default().trim();
    match (parts.next(), parts.next()) {
        (Some(surname), after) => {
            let after = after.unwrap_or_default().trim();
            let first = [before, after]
                .iter()
                .filter(|s| !s.is_empty())
                .copied()
                .collect::<Vec<_>>()
                .join(" ");
            (first, surname.trim().to_owned())
        }
        (None, _) => (before.to_owned(), String::new()),
    }
}

fn is_residence(node: &GedcomNode) -> bool {
    node.tag == "RESI"
        || (node.tag == "EVEN"
            && node
                .child_value("TYPE")
                .is_some_and(|t| t.eq_ignore_ascii_case("residence")))
}

fn non_empty_text(node: Option<&GedcomNode>) -> Option<String> {
    node.map(GedcomNode::text).filter(|t| !t.is_empty())
}

/// Inline `NOTE` text and resolved `NOTE @N1@` pointers, joined by blank lines.
fn extract_notes(record: &GedcomNode, ctx: &RecordContext<'_>) -> Option<String> {
    let notes: Vec<String> = record
        .children
        .iter()
        .filter(|c| c.tag == "NOTE" || c.tag == "SNOTE")
        .filter_map(|note| match note.pointer() {
            Some(target) => ctx.notes.get(&target).cloned(),
            None => Some(note.text()),
        })
        .filter(|text| !text.is_empty())
        .collect();
    if notes.is_empty() { None } else { Some(notes.join("\n\n")) }
}

// =============================================================================
// EVENTS, DATES, PLACES
// =============================================================================

fn extract_event(
    event: &GedcomNode,
    ctx: &RecordContext<'_>,
    context: &str,
    warnings: &mut Vec<String>,
) -> (Option<GenealogyDate>, Option<GenealogyPlace>) {
    let date = extract_date(event).into_option(&format!("{context} DATE"), warnings);
    if let Some(date) = date.as_ref().filter(|d| !d.has_components()) {
        warnings.push(format!("{context} DATE: kept unparsed date '{}'", date.raw));
    }
    let place = extract_place(event, ctx, context, warnings).into_option(&format!("{context} PLAC"), warnings);
    (date, place)
}

fn extract_date(event: &GedcomNode) -> Extraction<GenealogyDate> {
    match event.child("DATE") {
        None => Extraction::Absent,
        Some(node) if node.value.trim().is_empty() => Extraction::Malformed("empty date".to_owned()),
        Some(node) => Extraction::Found(parse_gedcom_date(&node.value)),
    }
}

fn extract_place(
    event: &GedcomNode,
    ctx: &RecordContext<'_>,
    context: &str,
    warnings: &mut Vec<String>,
) -> Extraction<GenealogyPlace> {
    let Some(node) = event.child("PLAC") else {
        return Extraction::Absent;
    };
    let name = node.text();
    if name.is_empty() {
        return Extraction::Malformed("empty place".to_owned());
    }

    let place = GenealogyPlace::new(&name);
    if !ctx.geocoded {
        return Extraction::Found(place);
    }
    match extract_coordinates(node).into_option(&format!("{context} PLAC MAP"), warnings) {
        Some((latitude, longitude)) => Extraction::Found(place.with_coordinates(Some(latitude), Some(longitude))),
        None => Extraction::Found(place),
    }
}

fn extract_coordinates(place: &GedcomNode) -> Extraction<(f64, f64)> {
    let Some(map) = place.child("MAP") else {
        return Extraction::Absent;
    };
    let latitude = map.child_value("LATI").and_then(parse_coordinate);
    let longitude = map.child_value("LONG").and_then(parse_coordinate);
    match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Extraction::Found((latitude, longitude)),
        _ => Extraction::Malformed(format!(
            "unusable coordinates LATI={:?} LONG={:?}",
            map.child_value("LATI"),
            map.child_value("LONG")
        )),
    }
}

/// Parse `N48.8566` / `W2.35` / `-2.35` into a signed decimal degree.
#[must_use]
pub fn parse_coordinate(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let mut chars = raw.chars();
    let (sign, number) = match chars.next()?.to_ascii_uppercase() {
        'N' | 'E' => (1.0, chars.as_str()),
        'S' | 'W' => (-1.0, chars.as_str()),
        _ => (1.0, raw),
    };
    let value: f64 = number.trim().parse().ok()?;
    value.is_finite().then_some(sign * value)
}

// =============================================================================
// FAMILIES
// =============================================================================

fn extract_family(record: &GedcomNode, ctx: &RecordContext<'_>, warnings: &mut Vec<String>) -> Option<GenealogyFamily> {
    let Some(id) = record.xref.clone() else {
        warnings.push("FAM record without identifier dropped".to_owned());
        return None;
    };
    let context = format!("FAM {id}");
    let mut family = GenealogyFamily::new(&id);

    family.husband_id = record.child("HUSB").and_then(GedcomNode::pointer);
    family.wife_id = record.child("WIFE").and_then(GedcomNode::pointer);
    family.children_ids = record
        .children
        .iter()
        .filter(|c| c.tag == "CHIL" || c.tag == "_CHIL")
        .filter_map(GedcomNode::pointer)
        .fold(Vec::new(), |mut children, child| {
            if !children.contains(&child) {
                children.push(child);
            }
            children
        });

    if let Some(marriage) = record.child("MARR") {
        (family.marriage_date, family.marriage_place) =
            extract_event(marriage, ctx, &format!("{context} MARR"), warnings);
    }
    if let Some(divorce) = record.child("DIV") {
        family.divorce_date = extract_date(divorce).into_option(&format!("{context} DIV DATE"), warnings);
    }
    family.notes = extract_notes(record, ctx);
    Some(family)
}
