//! Stateful line scanner for the GeneWeb grammar.
//!
//! All running state (block mode, buffered block lines, the person/family
//! tables) lives in one [`ParseContext`] created per call and consumed by
//! [`ParseContext::finish`].

use std::collections::{HashMap, HashSet};

use super::fragment::{self, PersonFragment};
use crate::date::parse_geneweb_date;
use crate::detect::Format;
use crate::model::{
    FileMetadata, GenealogyDate, GenealogyFamily, GenealogyPerson, GenealogyPlace, ParseResult, Residence,
};

/// Which block, if any, the scanner is inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    None,
    Children,
    Notes,
    PersonEvents,
    FamilyEvents,
    /// A block with no import meaning, consumed until its terminator.
    Skipped(&'static str),
}

/// Blocks that are read past without effect, with their terminators.
const SKIPPED_BLOCKS: &[(&str, &str)] = &[
    ("notes-db", "end notes-db"),
    ("page-ext", "end page-ext"),
    ("wizard-note", "end wizard-note"),
];

/// Where a `beg` children block attaches.
#[derive(Debug, Clone)]
struct ChildrenTarget {
    family: usize,
    surname: String,
}

/// One event line from a `pevt` or `fevt` block.
#[derive(Debug, Default)]
struct EventLine {
    tag: String,
    date: Option<GenealogyDate>,
    place: Option<GenealogyPlace>,
    text: Vec<String>,
}

pub(crate) struct ParseContext {
    mode: Mode,
    buffer: Vec<String>,
    block_line: usize,
    /// Person key targeted by an open `notes` or `pevt` block.
    person_target: Option<String>,
    /// Family the next `beg` block (or open one) attaches to.
    children_target: Option<ChildrenTarget>,
    /// Family the next `fevt` block attaches to.
    last_family: Option<usize>,
    persons: Vec<GenealogyPerson>,
    person_index: HashMap<String, usize>,
    /// Person id -> position in `persons`.
    id_index: HashMap<String, usize>,
    /// `(family, child id)` pairs already attached.
    attached_children: HashSet<(usize, String)>,
    families: Vec<GenealogyFamily>,
    metadata: FileMetadata,
    warnings: Vec<String>,
}

impl ParseContext {
    pub(crate) fn new() -> Self {
        Self {
            mode: Mode::None,
            buffer: Vec::new(),
            block_line: 0,
            person_target: None,
            children_target: None,
            last_family: None,
            persons: Vec::new(),
            person_index: HashMap::new(),
            id_index: HashMap::new(),
            attached_children: HashSet::new(),
            families: Vec::new(),
            metadata: FileMetadata { format: Some(Format::GeneWeb), ..FileMetadata::default() },
            warnings: Vec::new(),
        }
    }

    /// Feed one physical line (1-based `number` for warnings).
    pub(crate) fn scan_line(&mut self, number: usize, raw: &str) {
        let line = raw.trim();
        match self.mode {
            Mode::None => self.scan_top_level(number, line),
            Mode::Children => self.buffer_until(line, "end"),
            Mode::Notes => self.buffer_until(line, "end notes"),
            Mode::PersonEvents => self.buffer_until(line, "end pevt"),
            Mode::FamilyEvents => self.buffer_until(line, "end fevt"),
            Mode::Skipped(terminator) => {
                if line == terminator {
                    self.mode = Mode::None;
                }
            }
        }
    }

    /// Close any open block and hand back the collected model.
    pub(crate) fn finish(mut self) -> ParseResult {
        if self.mode != Mode::None {
            self.warnings
                .push(format!("line {}: block not closed before end of file", self.block_line));
            self.close_block();
        }
        let mut result = ParseResult {
            persons: self.persons,
            families: self.families,
            metadata: self.metadata,
            warnings: self.warnings,
        };
        result.enforce_references();
        result
    }

    fn scan_top_level(&mut self, number: usize, line: &str) {
        if line.is_empty() || line.starts_with('#') {
            return;
        }
        if let Some(encoding) = line.strip_prefix("encoding:") {
            self.metadata.encoding = Some(encoding.trim().to_owned());
            return;
        }
        if line == "gwplus" {
            self.metadata.version = Some("gwplus".to_owned());
            return;
        }
        if let Some(&(_, terminator)) = SKIPPED_BLOCKS.iter().find(|(opener, _)| first_word(line) == *opener) {
            self.open_block(Mode::Skipped(terminator), number);
            return;
        }

        match first_word(line) {
            "fam" => self.scan_family(number, line["fam".len()..].trim()),
            "beg" => self.open_block(Mode::Children, number),
            "notes" => {
                self.person_target = target_key(&line["notes".len()..]);
                self.children_target = None;
                self.open_block(Mode::Notes, number);
            }
            "pevt" => {
                self.person_target = target_key(&line["pevt".len()..]);
                self.children_target = None;
                self.open_block(Mode::PersonEvents, number);
            }
            "fevt" => self.open_block(Mode::FamilyEvents, number),
            "rel" => self.children_target = None,
            _ => {}
        }
    }

    fn open_block(&mut self, mode: Mode, number: usize) {
        self.mode = mode;
        self.block_line = number;
        self.buffer.clear();
    }

    fn buffer_until(&mut self, line: &str, terminator: &str) {
        if line == terminator {
            self.close_block();
        } else if !line.is_empty() {
            self.buffer.push(line.to_owned());
        }
    }

    fn close_block(&mut self) {
        let lines = std::mem::take(&mut self.buffer);
        match self.mode {
            Mode::Children => self.apply_children(&lines),
            Mode::Notes => self.apply_notes(&lines),
            Mode::PersonEvents => self.apply_person_events(&lines),
            Mode::FamilyEvents => self.apply_family_events(&lines),
            Mode::None | Mode::Skipped(_) => {}
        }
        self.mode = Mode::None;
        self.person_target = None;
    }

    // =========================================================================
    // FAMILIES
    // =========================================================================

    fn scan_family(&mut self, number: usize, text: &str) {
        self.children_target = None;
        self.last_family = None;
        let Some(parsed) = fragment::parse_family_line(text) else {
            self.warnings
                .push(format!("line {number}: no spouse separator in family line; family skipped"));
            return;
        };

        let index = self.families.len();
        let family_id = format!("F{}", index + 1);
        let mut family = GenealogyFamily::new(&family_id);
        family.marriage_date = parsed.marriage_date;
        family.marriage_place = parsed.marriage_place;

        let surname = parsed
            .husband
            .as_ref()
            .or(parsed.wife.as_ref())
            .map(|f| f.surname_token.clone())
            .unwrap_or_default();

        if let Some(husband) = parsed.husband {
            let id = self.register(husband);
            self.add_spouse_family(&id, &family_id);
            family.husband_id = Some(id);
        }
        if let Some(wife) = parsed.wife {
            let id = self.register(wife);
            self.add_spouse_family(&id, &family_id);
            family.wife_id = Some(id);
        }

        self.families.push(family);
        self.children_target = Some(ChildrenTarget { family: index, surname });
        self.last_family = Some(index);
    }

    fn apply_children(&mut self, lines: &[String]) {
        let Some(target) = self.children_target.clone() else {
            return;
        };
        for line in lines.iter().filter(|l| l.starts_with('-')) {
            let Some(child) = fragment::parse_child_line(line, &target.surname) else {
                self.warnings.push(format!("line {}: unreadable child line: {line}", self.block_line));
                continue;
            };
            let id = self.register(child);
            let family_id = self.families[target.family].id.clone();
            if let Some(person) = self.person_mut(&id) {
                if person.child_of_family.is_none() {
                    person.child_of_family = Some(family_id);
                }
            }
            if self.attached_children.insert((target.family, id.clone())) {
                self.families[target.family].children_ids.push(id);
            }
        }
    }

    fn apply_family_events(&mut self, lines: &[String]) {
        let Some(index) = self.last_family else {
            self.warnings
                .push(format!("line {}: family events without a family", self.block_line));
            return;
        };
        let family = &mut self.families[index];
        for event in lines.iter().filter_map(|l| parse_event_line(l)) {
            match event.tag.as_str() {
                "marr" => {
                    if family.marriage_date.is_none() {
                        family.marriage_date = event.date;
                    }
                    if family.marriage_place.is_none() {
                        family.marriage_place = event.place;
                    }
                }
                "div" => {
                    if family.divorce_date.is_none() {
                        family.divorce_date = event.date;
                    }
                }
                _ => {}
            }
        }
    }

    // =========================================================================
    // PERSONS
    // =========================================================================

    /// Resolve a fragment to a person id, merging into an existing record
    /// with the same key.
    fn register(&mut self, fragment: PersonFragment) -> String {
        if let Some(&index) = self.person_index.get(&fragment.key) {
            let person = &mut self.persons[index];
            person.fill_missing_from(fragment.person);
            return person.id.clone();
        }
        let id = format!("I{}", self.persons.len() + 1);
        let mut person = fragment.person;
        person.id.clone_from(&id);
        self.person_index.insert(fragment.key, self.persons.len());
        self.id_index.insert(id.clone(), self.persons.len());
        self.persons.push(person);
        id
    }

    fn add_spouse_family(&mut self, person_id: &str, family_id: &str) {
        if let Some(person) = self.person_mut(person_id) {
            if !person.spouse_of_families.iter().any(|f| f == family_id) {
                person.spouse_of_families.push(family_id.to_owned());
            }
        }
    }

    fn person_mut(&mut self, id: &str) -> Option<&mut GenealogyPerson> {
        let index = *self.id_index.get(id)?;
        self.persons.get_mut(index)
    }

    fn target_person(&mut self, block: &str) -> Option<&mut GenealogyPerson> {
        let key = self.person_target.clone()?;
        match self.person_index.get(&key) {
            Some(&index) => Some(&mut self.persons[index]),
            None => {
                self.warnings
                    .push(format!("line {}: {block} for unknown person {key}", self.block_line));
                None
            }
        }
    }

    fn apply_notes(&mut self, lines: &[String]) {
        let body = match lines.split_first() {
            Some((first, rest)) if first == "beg" => rest,
            _ => lines,
        };
        let text = body.join("\n");
        if text.is_empty() {
            return;
        }
        if let Some(person) = self.target_person("notes") {
            if person.notes.is_none() {
                person.notes = Some(text);
            }
        }
    }

    fn apply_person_events(&mut self, lines: &[String]) {
        let events: Vec<EventLine> = lines.iter().filter_map(|l| parse_event_line(l)).collect();
        let Some(person) = self.target_person("pevt") else {
            return;
        };
        for event in events {
            match event.tag.as_str() {
                "birt" | "bapt" => {
                    if person.birth_date.is_none() {
                        person.birth_date = event.date;
                    }
                    if person.birth_place.is_none() {
                        person.birth_place = event.place;
                    }
                }
                "deat" | "buri" => {
                    if person.death_date.is_none() {
                        person.death_date = event.date;
                    }
                    if person.death_place.is_none() {
                        person.death_place = event.place;
                    }
                }
                "resi" => {
                    if event.date.is_some() || event.place.is_some() {
                        person.residences.push(Residence { date: event.date, place: event.place });
                    }
                }
                "occu" => {
                    if person.occupation.is_none() && !event.text.is_empty() {
                        person.occupation = Some(event.text.join(" "));
                    }
                }
                _ => {}
            }
        }
    }
}

/// `#tag [date] [#p place] [text...]`
fn parse_event_line(line: &str) -> Option<EventLine> {
    let mut tokens = line.split_whitespace();
    let tag = tokens.next()?.strip_prefix('#')?;
    let mut event = EventLine { tag: tag.to_ascii_lowercase(), ..EventLine::default() };

    while let Some(token) = tokens.next() {
        if token == "#p" {
            event.place = tokens
                .next()
                .map(|place| GenealogyPlace::new(&place.replace('_', " ")));
        } else if token.starts_with('#') {
            tokens.next();
        } else if event.date.is_none() && event.text.is_empty() && parse_geneweb_date(token).is_some() {
            event.date = parse_geneweb_date(token);
        } else {
            event.text.push(token.replace('_', " "));
        }
    }
    Some(event)
}

fn first_word(line: &str) -> &str {
    line.split_whitespace().next().unwrap_or_default()
}

/// `SURNAME Given` after a block keyword, as a dedup key.
fn target_key(rest: &str) -> Option<String> {
    let mut tokens = rest.split_whitespace();
    let surname = tokens.next()?;
    let given = tokens.next()?;
    Some(fragment::person_key(surname, given))
}
