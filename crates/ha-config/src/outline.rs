//! Block-structure outline of a YAML source
//!
//! `serde_yaml` drops comments and layout, so edits that must keep them are
//! located on this outline instead. The outline is built from the marked
//! event stream of `yaml_rust2`: every mapping key carries the line and
//! column it was written at, and every block collection the lines it spans.
//! Flow collections are recorded as opaque [`NodeKind::Flow`] spans.

use crate::error::ConfigResult;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust2::scanner::{Marker, TScalarStyle};

const BOM: char = '\u{feff}';

/// A mapping key as written in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    /// Zero-based line number
    pub line: usize,
    /// Byte column where the key starts (including any opening quote)
    pub col: usize,
    /// Byte length of the key as written (including quotes)
    pub len: usize,
    /// Unquoted key text
    pub name: String,
    /// Quote character if the key was quoted
    pub quote: Option<char>,
}

/// A `key: value` pair of a mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: Key,
    pub value: Node,
}

/// A `- value` item of a block sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub value: Node,
}

/// Shape of a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Mapping(Vec<Entry>),
    Sequence(Vec<Item>),
    /// `{...}` or `[...]`
    Flow,
    /// Scalars and aliases
    Scalar,
    /// No value at all (`key:` followed by a sibling, or an empty document)
    Empty,
}

/// A node of the outline with the lines it spans
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    /// Byte column of the first key, dash or scalar
    pub col: usize,
    pub first_line: usize,
    /// Last line holding content of this node (trailing comments excluded)
    pub last_line: usize,
}

impl Node {
    fn empty(line: usize, col: usize) -> Self {
        Self {
            kind: NodeKind::Empty,
            col,
            first_line: line,
            last_line: line,
        }
    }

    /// Entries if this node is a block mapping
    pub fn as_mapping(&self) -> Option<&[Entry]> {
        match &self.kind {
            NodeKind::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    /// Items if this node is a block sequence
    pub fn as_sequence(&self) -> Option<&[Item]> {
        match &self.kind {
            NodeKind::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a mapping entry by key name
    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.as_mapping()?.iter().find(|e| e.key.name == name)
    }
}

/// Outline of the first document of a source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outline {
    pub root: Node,
}

impl Outline {
    /// Scan a YAML source
    pub fn parse(source: &str) -> ConfigResult<Self> {
        // the scanner never sees the BOM; columns on the first line are shifted back
        let (bom, body) = match source.strip_prefix(BOM) {
            Some(body) => (BOM.len_utf8(), body),
            None => (0, source),
        };

        let mut log = EventLog::default();
        Parser::new(body.chars()).load(&mut log, false)?;

        let mut builder = Builder {
            events: &log.events,
            pos: 0,
            lines: body.lines().collect(),
            bom,
        };
        Ok(Self {
            root: builder.document(),
        })
    }
}

#[derive(Debug, Default)]
struct EventLog {
    events: Vec<(Event, Marker)>,
}

impl MarkedEventReceiver for EventLog {
    fn on_event(&mut self, event: Event, mark: Marker) {
        self.events.push((event, mark));
    }
}

struct Builder<'a> {
    events: &'a [(Event, Marker)],
    pos: usize,
    lines: Vec<&'a str>,
    bom: usize,
}

impl<'a> Builder<'a> {
    fn peek(&self) -> Option<&'a (Event, Marker)> {
        self.events.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'a (Event, Marker)> {
        let event = self.events.get(self.pos)?;
        self.pos += 1;
        Some(event)
    }

    fn document(&mut self) -> Node {
        while let Some((event, _)) = self.peek() {
            match event {
                Event::Scalar(..) | Event::Alias(_) | Event::SequenceStart(..) | Event::MappingStart(..) => {
                    return self.node(0);
                }
                _ => self.pos += 1,
            }
        }
        Node::empty(0, 0)
    }

    /// Build the node starting at the next event; `owner_line` places empty values
    fn node(&mut self, owner_line: usize) -> Node {
        let Some((event, mark)) = self.advance() else {
            return Node::empty(owner_line, 0);
        };
        let (line, col) = self.position(mark);

        match event {
            Event::MappingStart(..) | Event::SequenceStart(..) if self.is_flow(line, col) => {
                self.flow(line, col)
            }
            Event::MappingStart(..) => self.mapping(line, col),
            Event::SequenceStart(..) => self.sequence(line, col),
            Event::Scalar(value, TScalarStyle::Plain, ..)
                if (value.is_empty() || value == "~") && !self.text_at(line, col).starts_with('~') =>
            {
                Node::empty(owner_line, self.source_col(line, col))
            }
            _ => Node {
                kind: NodeKind::Scalar,
                col: self.source_col(line, col),
                first_line: line,
                last_line: self.content_end(line),
            },
        }
    }

    fn mapping(&mut self, first_line: usize, col: usize) -> Node {
        let mut entries = Vec::new();
        let mut last_line = first_line;

        while let Some((event, _)) = self.peek() {
            if matches!(event, Event::MappingEnd) {
                self.pos += 1;
                break;
            }
            let key = self.key();
            let key_line = key.as_ref().map_or(last_line, |k| k.line);
            let value = self.node(key_line);
            last_line = last_line.max(key_line).max(value.last_line);
            // complex keys cannot be renamed and are left out
            if let Some(key) = key {
                entries.push(Entry { key, value });
            }
        }

        Node {
            kind: NodeKind::Mapping(entries),
            col: self.source_col(first_line, col),
            first_line,
            last_line,
        }
    }

    fn key(&mut self) -> Option<Key> {
        let (event, mark) = self.peek()?;
        let Event::Scalar(name, style, ..) = event else {
            self.node(0);
            return None;
        };
        self.pos += 1;

        let (line, col) = self.position(mark);
        let quote = match style {
            TScalarStyle::SingleQuoted => Some('\''),
            TScalarStyle::DoubleQuoted => Some('"'),
            _ => None,
        };
        let len = match quote {
            Some(quote) => quoted_len(self.text_at(line, col), quote),
            None => name.len(),
        };

        Some(Key {
            line,
            col: self.source_col(line, col),
            len,
            name: name.clone(),
            quote,
        })
    }

    fn sequence(&mut self, first_line: usize, col: usize) -> Node {
        let mut items = Vec::new();
        let mut last_line = first_line;

        while let Some((event, _)) = self.peek() {
            if matches!(event, Event::SequenceEnd) {
                self.pos += 1;
                break;
            }
            let value = self.node(last_line);
            last_line = last_line.max(value.last_line);
            items.push(Item { value });
        }

        Node {
            kind: NodeKind::Sequence(items),
            col: self.source_col(first_line, col),
            first_line,
            last_line,
        }
    }

    fn flow(&mut self, first_line: usize, col: usize) -> Node {
        let mut depth = 1;
        let mut last_line = first_line;

        while depth > 0 {
            let Some((event, mark)) = self.advance() else {
                break;
            };
            match event {
                Event::MappingStart(..) | Event::SequenceStart(..) => depth += 1,
                Event::MappingEnd | Event::SequenceEnd => {
                    depth -= 1;
                    last_line = self.position(mark).0;
                }
                _ => {}
            }
        }

        Node {
            kind: NodeKind::Flow,
            col: self.source_col(first_line, col),
            first_line,
            last_line,
        }
    }

    /// Last content line of a scalar starting on `first_line`, found from
    /// where the next event begins
    fn content_end(&self, first_line: usize) -> usize {
        let Some((_, mark)) = self.peek() else {
            return first_line;
        };
        let (end_line, end_col) = self.position(mark);

        let lead = self
            .lines
            .get(end_line)
            .and_then(|text| text.get(..end_col))
            .unwrap_or("");
        let mut line = if end_line > first_line && lead.trim_matches([' ', '\t', '-', '?', ':']).is_empty() {
            end_line - 1
        } else {
            end_line.max(first_line)
        };

        while line > first_line && self.lines.get(line).map_or(true, |text| is_blank_or_comment(text)) {
            line -= 1;
        }
        line
    }

    /// Zero-based line and byte column (without the BOM) of a marker
    fn position(&self, mark: &Marker) -> (usize, usize) {
        let line = mark.line().saturating_sub(1);
        let text = self.lines.get(line).copied().unwrap_or("");
        let col = text
            .char_indices()
            .nth(mark.col())
            .map_or(text.len(), |(i, _)| i);
        (line, col)
    }

    fn source_col(&self, line: usize, col: usize) -> usize {
        if line == 0 {
            col + self.bom
        } else {
            col
        }
    }

    fn text_at(&self, line: usize, col: usize) -> &'a str {
        self.lines
            .get(line)
            .and_then(|text| text.get(col..))
            .unwrap_or("")
    }

    fn is_flow(&self, line: usize, col: usize) -> bool {
        self.text_at(line, col).starts_with(['{', '['])
    }
}

fn is_blank_or_comment(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// Byte length of a quoted scalar written at the start of `text`
fn quoted_len(text: &str, quote: char) -> usize {
    let mut chars = text.char_indices().skip(1).peekable();

    while let Some((i, c)) = chars.next() {
        if c == '\\' && quote == '"' {
            chars.next();
            continue;
        }
        if c == quote {
            // '' is an escaped quote inside single-quoted scalars
            if quote == '\'' && matches!(chars.peek(), Some((_, '\''))) {
                chars.next();
                continue;
            }
            return i + c.len_utf8();
        }
    }
    text.len()
}
