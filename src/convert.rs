//! Maps the parsed genealogy model onto graph nodes and edges.
//!
//! DESIGN
//! ======
//! One node per person, then per family: a `married to` edge between the
//! spouses, a `parent of` edge from each parent to each child, and optionally
//! `sibling of` edges between every pair of children. Edges only reference
//! persons through the id map built while emitting nodes; a family member
//! missing from that map is skipped without a warning, because the parser
//! already recorded one.

use std::collections::{BTreeMap, HashMap};

use uuid::Uuid;

use crate::config::{ImportOptions, Locale};
use crate::date::{end_timestamp_millis, to_timestamp_millis};
use crate::graph::{
    EdgeDirection, EdgeKind, FAMILY_ID_KEY, GraphEdge, GraphNode, NodeStyle, Position, PropertyValue, SOURCE_ID_KEY,
    TimelineEvent,
};
use crate::layout::SpacingProfile;
use crate::model::{GenealogyDate, GenealogyFamily, GenealogyPerson, GenealogyPlace, ParseResult, Sex};

/// Category tag applied when `add_genealogy_tag` is set.
pub const GENEALOGY_TAG: &str = "genealogy";

const TEXT_COLOR: &str = "#1F1A17";

// =============================================================================
// TYPES
// =============================================================================

/// Converter output: nodes in person order, edges in family order.
#[derive(Debug, Clone, Default)]
pub struct ConvertedGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    /// Source person id -> node id.
    pub node_ids: HashMap<String, Uuid>,
}

/// Localized display strings.
struct Labels {
    male: &'static str,
    female: &'static str,
    unknown: &'static str,
    birth: &'static str,
    death: &'static str,
    residence: &'static str,
    married_to: &'static str,
    parent_of: &'static str,
    sibling_of: &'static str,
}

const ENGLISH: Labels = Labels {
    male: "Male",
    female: "Female",
    unknown: "Unknown",
    birth: "Birth",
    death: "Death",
    residence: "Residence",
    married_to: "married to",
    parent_of: "parent of",
    sibling_of: "sibling of",
};

const FRENCH: Labels = Labels {
    male: "Homme",
    female: "Femme",
    unknown: "Inconnu",
    birth: "Naissance",
    death: "Décès",
    residence: "Résidence",
    married_to: "marié à",
    parent_of: "parent de",
    sibling_of: "frère/sœur de",
};

fn labels(locale: Locale) -> &'static Labels {
    match locale {
        Locale::En => &ENGLISH,
        Locale::Fr => &FRENCH,
    }
}

// =============================================================================
// CONVERSION
// =============================================================================

/// Convert a parse result into graph records.
#[must_use]
pub fn convert(result: &ParseResult, options: &ImportOptions) -> ConvertedGraph {
    let labels = labels(options.locale);
    let profile = SpacingProfile::for_node_count(result.persons.len());
    let mut graph = ConvertedGraph::default();

    for person in &result.persons {
        let node = person_node(person, options, labels, profile);
        graph.node_ids.insert(person.id.clone(), node.id);
        graph.nodes.push(node);
    }

    let persons: HashMap<&str, &GenealogyPerson> = result.persons.iter().map(|p| (p.id.as_str(), p)).collect();
    for family in &result.families {
        family_edges(family, &persons, &graph.node_ids, options, labels, &mut graph.edges);
    }

    tracing::debug!(nodes = graph.nodes.len(), edges = graph.edges.len(), "genealogy graph converted");
    graph
}

fn person_node(person: &GenealogyPerson, options: &ImportOptions, labels: &Labels, profile: SpacingProfile) -> GraphNode {
    let mut properties = BTreeMap::new();
    properties.insert("first_name".to_owned(), PropertyValue::Text(person.first_name.clone()));
    properties.insert("last_name".to_owned(), PropertyValue::Text(person.last_name.clone()));
    properties.insert("sex".to_owned(), PropertyValue::Text(sex_label(person.sex, labels).to_owned()));
    properties.insert(SOURCE_ID_KEY.to_owned(), PropertyValue::Text(person.id.clone()));
    if options.import_occupation {
        insert_text(&mut properties, "occupation", person.occupation.as_deref());
    }
    insert_text(&mut properties, "nickname", person.nickname.as_deref());
    insert_text(&mut properties, "title", person.title.as_deref());
    if options.import_notes {
        insert_text(&mut properties, "notes", person.notes.as_deref());
    }

    let mut tags = Vec::new();
    if options.add_genealogy_tag {
        tags.push(GENEALOGY_TAG.to_owned());
    }
    tags.push(sex_tag(person.sex).to_owned());

    GraphNode {
        id: Uuid::new_v4(),
        label: person.display_name(),
        tags,
        properties,
        events: person_events(person, labels),
        style: node_style(person.sex, options.color_by_gender),
        position: Position::default(),
        width: profile.node_width,
        height: profile.node_height,
    }
}

fn person_events(person: &GenealogyPerson, labels: &Labels) -> Vec<TimelineEvent> {
    let mut events = Vec::new();
    let instants = [
        (labels.birth, person.birth_date.as_ref(), person.birth_place.as_ref()),
        (labels.death, person.death_date.as_ref(), person.death_place.as_ref()),
    ];
    for (label, date, place) in instants {
        if let Some(start) = date.and_then(to_timestamp_millis) {
            events.push(timeline_event(label, start, start, place));
        }
    }

    for residence in &person.residences {
        let Some(date) = residence.date.as_ref() else {
            continue;
        };
        if let (Some(start), Some(end)) = (to_timestamp_millis(date), end_timestamp_millis(date)) {
            events.push(timeline_event(labels.residence, start, end.max(start), residence.place.as_ref()));
        }
    }
    events
}

fn timeline_event(label: &str, start: i64, end: i64, place: Option<&GenealogyPlace>) -> TimelineEvent {
    let coordinates = place.and_then(|p| p.coordinates);
    TimelineEvent {
        label: label.to_owned(),
        start,
        end,
        place: place.map(|p| p.name.clone()),
        latitude: coordinates.map(|c| c.latitude),
        longitude: coordinates.map(|c| c.longitude),
    }
}

fn insert_text(properties: &mut BTreeMap<String, PropertyValue>, key: &str, value: Option<&str>) {
    if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
        properties.insert(key.to_owned(), PropertyValue::Text(value.to_owned()));
    }
}

fn sex_label(sex: Sex, labels: &Labels) -> &'static str {
    match sex {
        Sex::Male => labels.male,
        Sex::Female => labels.female,
        Sex::Unknown => labels.unknown,
    }
}

fn sex_tag(sex: Sex) -> &'static str {
    match sex {
        Sex::Male => "male",
        Sex::Female => "female",
        Sex::Unknown => "unknown-sex",
    }
}

/// Pure lookup: sex-specific palette, or one neutral style for everyone.
#[must_use]
pub fn node_style(sex: Sex, color_by_gender: bool) -> NodeStyle {
    let (fill, stroke) = if color_by_gender {
        match sex {
            Sex::Male => ("#E3F2FD", "#1565C0"),
            Sex::Female => ("#FCE4EC", "#AD1457"),
            Sex::Unknown => ("#ECEFF1", "#546E7A"),
        }
    } else {
        ("#FFF9C4", "#F9A825")
    };
    NodeStyle { fill: fill.to_owned(), stroke: stroke.to_owned(), text_color: TEXT_COLOR.to_owned() }
}

// =============================================================================
// EDGES
// =============================================================================

fn family_edges(
    family: &GenealogyFamily,
    persons: &HashMap<&str, &GenealogyPerson>,
    node_ids: &HashMap<String, Uuid>,
    options: &ImportOptions,
    labels: &Labels,
    edges: &mut Vec<GraphEdge>,
) {
    let node_of = |id: Option<&String>| id.and_then(|id| node_ids.get(id)).copied();
    let husband = node_of(family.husband_id.as_ref());
    let wife = node_of(family.wife_id.as_ref());
    let edge = |source: Uuid, target: Uuid, kind: EdgeKind, label: &str, direction: EdgeDirection| {
        new_edge(family, source, target, kind, label, direction, options)
    };

    if let (Some(husband), Some(wife)) = (husband, wife) {
        let mut marriage = edge(husband, wife, EdgeKind::MarriedTo, labels.married_to, EdgeDirection::None);
        let spouse = |id: Option<&String>| id.and_then(|id| persons.get(id.as_str())).copied();
        let end = marriage_end(family, spouse(family.husband_id.as_ref()), spouse(family.wife_id.as_ref()));
        insert_date(&mut marriage.properties, "marriage_date", family.marriage_date.as_ref());
        insert_date(&mut marriage.properties, "divorce_date", family.divorce_date.as_ref());
        insert_date(&mut marriage.properties, "marriage_end", end);
        if let Some(place) = family.marriage_place.as_ref() {
            marriage
                .properties
                .insert("marriage_place".to_owned(), PropertyValue::Text(place.name.clone()));
        }
        edges.push(marriage);
    }

    let children: Vec<Uuid> = family.children_ids.iter().filter_map(|id| node_ids.get(id).copied()).collect();
    for parent in [husband, wife].into_iter().flatten() {
        for &child in &children {
            edges.push(edge(parent, child, EdgeKind::ParentOf, labels.parent_of, EdgeDirection::Forward));
        }
    }

    if options.create_sibling_links {
        for (i, &a) in children.iter().enumerate() {
            for &b in &children[i + 1..] {
                edges.push(edge(a, b, EdgeKind::SiblingOf, labels.sibling_of, EdgeDirection::None));
            }
        }
    }
}

fn new_edge(
    family: &GenealogyFamily,
    source: Uuid,
    target: Uuid,
    kind: EdgeKind,
    label: &str,
    direction: EdgeDirection,
    options: &ImportOptions,
) -> GraphEdge {
    let mut properties = BTreeMap::new();
    properties.insert(FAMILY_ID_KEY.to_owned(), PropertyValue::Text(family.id.clone()));
    GraphEdge {
        id: Uuid::new_v4(),
        source,
        target,
        kind,
        label: label.to_owned(),
        direction,
        tags: if options.add_genealogy_tag { vec![GENEALOGY_TAG.to_owned()] } else { Vec::new() },
        properties,
    }
}

fn insert_date(properties: &mut BTreeMap<String, PropertyValue>, key: &str, date: Option<&GenealogyDate>) {
    if let Some(millis) = date.and_then(to_timestamp_millis) {
        properties.insert(key.to_owned(), PropertyValue::Date(millis));
    }
}

/// Divorce date if known, else the earlier spouse death, else nothing.
#[must_use]
pub fn marriage_end<'a>(
    family: &'a GenealogyFamily,
    husband: Option<&'a GenealogyPerson>,
    wife: Option<&'a GenealogyPerson>,
) -> Option<&'a GenealogyDate> {
    if let Some(divorce) = family.divorce_date.as_ref().filter(|d| d.year.is_some()) {
        return Some(divorce);
    }
    let deaths = [husband, wife]
        .into_iter()
        .flatten()
        .filter_map(|p| p.death_date.as_ref())
        .filter(|d| d.year.is_some());
    deaths.min_by_key(|d| d.sort_key())
}

#[cfg(test)]
#[path = "convert_test.rs"]
mod tests;
