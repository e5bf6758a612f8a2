//! Line normalization and the `level tag value` tree.
//!
//! Real exports bend the grammar: byte-order marks, CRLF endings, comment
//! lines, and pointer records that lost their leading `0`. Everything is
//! normalized here before the hierarchical walk in [`super::parse`].

/// One lexed `level [@xref@] TAG [value]` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GedcomLine {
    pub level: usize,
    pub xref: Option<String>,
    pub tag: String,
    pub value: String,
}

/// A line plus everything nested under it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GedcomNode {
    pub tag: String,
    pub xref: Option<String>,
    pub value: String,
    pub children: Vec<GedcomNode>,
}

impl GedcomNode {
    /// First direct child with `tag`.
    #[must_use]
    pub fn child(&self, tag: &str) -> Option<&GedcomNode> {
        self.children.iter().find(|c| c.tag == tag)
    }

    /// All direct children with `tag`, in file order.
    pub fn children_with<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a GedcomNode> + 'a {
        self.children.iter().filter(move |c| c.tag == tag)
    }

    /// Trimmed value of the first `tag` child, if non-empty.
    #[must_use]
    pub fn child_value(&self, tag: &str) -> Option<&str> {
        self.child(tag)
            .map(|c| c.value.trim())
            .filter(|v| !v.is_empty())
    }

    /// Value with `CONT` (new line) and `CONC` (same line) continuations folded in.
    #[must_use]
    pub fn text(&self) -> String {
        let mut text = self.value.clone();
        for child in &self.children {
            match child.tag.as_str() {
                "CONT" => {
                    text.push('\n');
                    text.push_str(&child.value);
                }
                "CONC" => text.push_str(&child.value),
                _ => {}
            }
        }
        text.trim().to_owned()
    }

    /// Target of a `@X1@` pointer value, without the `@` delimiters.
    #[must_use]
    pub fn pointer(&self) -> Option<String> {
        parse_pointer(&self.value)
    }
}

/// Strip `@` delimiters from a pointer such as `@I1@`.
#[must_use]
pub fn parse_pointer(value: &str) -> Option<String> {
    let inner = value.trim().strip_prefix('@')?.strip_suffix('@')?;
    if inner.is_empty() || inner.contains('@') {
        return None;
    }
    Some(inner.to_owned())
}

// =============================================================================
// PREPROCESSING
// =============================================================================

/// Decode raw bytes as UTF-8, replacing invalid sequences.
pub fn decode(bytes: &[u8], warnings: &mut Vec<String>) -> String {
    let text = match std::str::from_utf8(bytes) {
        Ok(text) => text.to_owned(),
        Err(error) => {
            warnings.push(format!("invalid UTF-8 at byte {}; decoded lossily", error.valid_up_to()));
            String::from_utf8_lossy(bytes).into_owned()
        }
    };
    text.trim_start_matches('\u{feff}').to_owned()
}

/// Split into lines, drop blanks and `#` comments, and restore a missing
/// level-`0` prefix on top-level pointer records.
///
/// Trailing spaces are kept: they are significant before a `CONC` line.
#[must_use]
pub fn preprocess(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.trim_start().trim_end_matches('\r'))
        .filter(|line| {
            let content = line.trim_end();
            !content.is_empty() && !content.starts_with('#')
        })
        .map(|line| {
            if is_unprefixed_record(line) {
                format!("0 {line}")
            } else {
                line.to_owned()
            }
        })
        .collect()
}

/// `@I1@ INDI` with no level number in front.
fn is_unprefixed_record(line: &str) -> bool {
    let mut parts = line.split_whitespace();
    let (Some(first), Some(second)) = (parts.next(), parts.next()) else {
        return false;
    };
    parse_pointer(first).is_some() && second.chars().all(|c| c.is_ascii_uppercase() || c == '_')
}

/// Lex one normalized line. Returns `None` when there is no level number or tag.
#[must_use]
pub fn lex_line(line: &str) -> Option<GedcomLine> {
    let (level, rest) = line.split_once(' ')?;
    let level: usize = level.parse().ok()?;
    let rest = rest.trim_start();

    let (xref, rest) = match rest.split_once(' ') {
        Some((head, tail)) if parse_pointer(head).is_some() => (parse_pointer(head), tail.trim_start()),
        None if parse_pointer(rest).is_some() => return None,
        _ => (None, rest),
    };

    let (tag, value) = match rest.split_once(' ') {
        Some((tag, value)) => (tag, value),
        None => (rest, ""),
    };
    if tag.is_empty() {
        return None;
    }
    Some(GedcomLine { level, xref, tag: tag.to_ascii_uppercase(), value: value.to_owned() })
}

/// Group lexed lines into a forest of top-level records.
///
/// A line that jumps more than one level deeper is attached to the deepest
/// open node, with a warning.
pub fn build_tree(lines: &[String], warnings: &mut Vec<String>) -> Vec<GedcomNode> {
    let mut roots = Vec::new();
    let mut stack: Vec<GedcomNode> = Vec::new();

    for (index, raw) in lines.iter().enumerate() {
        let Some(line) = lex_line(raw) else {
            warnings.push(format!("line {}: not a GEDCOM record: {raw}", index + 1));
            continue;
        };

        let mut level = line.level;
        if level > stack.len() {
            warnings.push(format!("line {}: level {level} skips a level", index + 1));
            level = stack.len();
        }
        while stack.len() > level {
            close_top(&mut stack, &mut roots);
        }
        stack.push(GedcomNode { tag: line.tag, xref: line.xref, value: line.value, children: Vec::new() });
    }

    while !stack.is_empty() {
        close_top(&mut stack, &mut roots);
    }
    roots
}

fn close_top(stack: &mut Vec<GedcomNode>, roots: &mut Vec<GedcomNode>) {
    if let Some(node) = stack.pop() {
        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => roots.push(node),
        }
    }
}
