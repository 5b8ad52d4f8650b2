use std::collections::BTreeMap;
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use regex::Regex;

use crate::pattern::{FieldType, FieldValue, PatternError};

/// A piece of a parsed path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Field { name: String, spec: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternField {
    pub name: String,
    pub field_type: FieldType,
}

/// A path template such as `data/{region}/{date:%Y-%m-%d}.csv`.
///
/// Fields are written `{name}` or `{name:spec}`; `{{` and `}}` stand for literal
/// braces. The template doubles as a glob (each field becomes `*`) and as a
/// matcher that recovers field values from concrete paths.
#[derive(Debug, Clone)]
pub struct PathPattern {
    template: String,
    segments: Vec<Segment>,
    fields: Vec<PatternField>,
    matcher: Regex,
    /// Capture group name and field name, one per field occurrence.
    captures: Vec<(String, String)>,
}

impl PathPattern {
    pub fn parse(template: &str) -> Result<Self, PatternError> {
        let segments = parse_segments(template)?;

        let mut fields: Vec<PatternField> = Vec::new();
        for segment in &segments {
            let Segment::Field { name, spec } = segment else {
                continue;
            };
            let field_type = FieldType::from_spec(spec.as_deref());
            match fields.iter().find(|f| &f.name == name) {
                Some(existing) if existing.field_type != field_type => {
                    return Err(PatternError::ConflictingField {
                        template: template.to_string(),
                        name: name.clone(),
                    });
                }
                Some(_) => {}
                None => fields.push(PatternField {
                    name: name.clone(),
                    field_type,
                }),
            }
        }

        let mut expr = String::from("^");
        let mut captures = Vec::new();
        for segment in &segments {
            match segment {
                Segment::Literal(text) => expr.push_str(&literal_regex(text)),
                Segment::Field { name, spec } => {
                    let group = format!("f{}", captures.len());
                    let body = field_regex(&FieldType::from_spec(spec.as_deref()), spec.as_deref());
                    expr.push_str(&format!("(?P<{group}>{body})"));
                    captures.push((group, name.clone()));
                }
            }
        }
        expr.push('$');

        let matcher = Regex::new(&expr).map_err(|source| PatternError::Matcher {
            template: template.to_string(),
            source,
        })?;

        Ok(Self {
            template: template.to_string(),
            segments,
            fields,
            matcher,
            captures,
        })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Declared fields in order of first appearance.
    pub fn fields(&self) -> &[PatternField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&PatternField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn has_fields(&self) -> bool {
        !self.fields.is_empty()
    }

    /// The glob that enumerates candidate paths for this template.
    pub fn to_glob(&self) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(text) => text.as_str(),
                Segment::Field { .. } => "*",
            })
            .collect()
    }

    /// Recover the field values encoded in a single path.
    ///
    /// Returns `None` when the path does not fit the template, when a field's
    /// text does not decode to its declared type, or when a repeated field
    /// carries different text at different positions.
    pub fn reverse_format(&self, path: &str) -> Option<BTreeMap<String, FieldValue>> {
        let normalized = path.replace('\\', "/");
        let caps = self.matcher.captures(&normalized)?;

        let mut raw: BTreeMap<&str, &str> = BTreeMap::new();
        for (group, name) in &self.captures {
            let text = caps.name(group)?.as_str();
            if let Some(previous) = raw.insert(name.as_str(), text)
                && previous != text
            {
                return None;
            }
        }

        self.fields
            .iter()
            .map(|field| {
                let text = raw.get(field.name.as_str())?;
                let value = field.field_type.decode(text)?;
                Some((field.name.clone(), value))
            })
            .collect()
    }
}

impl PartialEq for PathPattern {
    fn eq(&self, other: &Self) -> bool {
        self.template == other.template
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.template)
    }
}

fn parse_segments(template: &str) -> Result<Vec<Segment>, PatternError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.char_indices().peekable();

    while let Some((position, c)) = chars.next() {
        match c {
            '{' if chars.peek().map(|(_, next)| *next) == Some('{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek().map(|(_, next)| *next) == Some('}') => {
                chars.next();
                literal.push('}');
            }
            '}' => {
                return Err(PatternError::UnmatchedBrace {
                    template: template.to_string(),
                    position,
                });
            }
            '{' => {
                let mut body = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    match c {
                        '}' => {
                            closed = true;
                            break;
                        }
                        '{' => break,
                        c => body.push(c),
                    }
                }
                if !closed {
                    return Err(PatternError::UnclosedBrace {
                        template: template.to_string(),
                        position,
                    });
                }

                let (name, spec) = match body.split_once(':') {
                    Some((name, spec)) => (name.trim(), Some(spec.to_string())),
                    None => (body.trim(), None),
                };
                if name.is_empty() {
                    return Err(PatternError::EmptyFieldName {
                        template: template.to_string(),
                        position,
                    });
                }

                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Field {
                    name: name.to_string(),
                    spec,
                });
            }
            c => literal.push(c),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    Ok(segments)
}

/// Literal template text, with glob wildcards kept as wildcards.
///
/// Follows the `glob` crate: `*` and `?` stay within one path component,
/// `**/` spans zero or more directories and `[...]`/`[!...]` are classes.
fn literal_regex(text: &str) -> String {
    let text = text.replace('\\', "/");
    let mut out = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                if chars.next_if_eq(&'/').is_some() {
                    out.push_str("(?:.*/)?");
                } else {
                    out.push_str(".*");
                }
            }
            '*' => out.push_str("[^/]*"),
            '?' => out.push_str("[^/]"),
            '[' => match class_regex(&mut chars) {
                Some(class) => out.push_str(&class),
                None => out.push_str(&regex::escape("[")),
            },
            c => out.push_str(&regex::escape(&c.to_string())),
        }
    }

    out
}

/// Translate a glob character class whose `[` was already consumed.
///
/// Leaves `chars` untouched and returns `None` when the class is unterminated.
fn class_regex(chars: &mut Peekable<Chars<'_>>) -> Option<String> {
    let mut lookahead = chars.clone();
    let negated = lookahead.next_if_eq(&'!').is_some();

    let mut members = Vec::new();
    // a leading `]` is a member, not the end of the class
    if let Some(first) = lookahead.next_if_eq(&']') {
        members.push(first);
    }
    loop {
        match lookahead.next()? {
            ']' => break,
            c => members.push(c),
        }
    }
    if members.is_empty() {
        return None;
    }

    let mut class = String::from(if negated { "[^/" } else { "[" });
    for (i, c) in members.iter().enumerate() {
        if *c == '-' && i > 0 && i + 1 < members.len() {
            class.push('-');
        } else {
            class.push_str(&regex::escape(&c.to_string()));
        }
    }
    class.push(']');

    *chars = lookahead;
    Some(class)
}

fn field_regex(field_type: &FieldType, spec: Option<&str>) -> String {
    match field_type {
        FieldType::Str => "[^/]+?".to_string(),
        FieldType::Int => match spec.and_then(zero_padded_width) {
            // the sign counts toward the padded width: `{:03d}` renders -7 as `-07`
            Some(width) => {
                let signed = width.saturating_sub(1).max(1);
                format!(r"(?:[-+]\d{{{signed},}}|\d{{{width},}})")
            }
            None => r"[-+]?\d+".to_string(),
        },
        FieldType::Float => r"[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?".to_string(),
        FieldType::DateTime(format) => strftime_regex(format),
    }
}

/// Width of a zero-padded integer spec such as `03d`.
fn zero_padded_width(spec: &str) -> Option<usize> {
    let digits = spec.trim().strip_suffix('d')?.strip_prefix('0')?;
    digits.parse().ok().filter(|w| *w > 0)
}

fn strftime_regex(format: &str) -> String {
    let mut out = String::new();
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push_str(&regex::escape(&c.to_string()));
            continue;
        }

        // unpadded variants such as %-d
        let unpadded = chars.next_if_eq(&'-').is_some();
        let Some(directive) = chars.next() else {
            out.push('%');
            break;
        };

        let body = match (directive, unpadded) {
            ('Y', _) => r"\d{4}",
            ('m' | 'd' | 'H' | 'I' | 'M' | 'S' | 'y' | 'e', true) => r"\d{1,2}",
            ('m' | 'd' | 'H' | 'I' | 'M' | 'S' | 'y', false) => r"\d{2}",
            ('e', false) => r"[ \d]\d",
            ('j', true) => r"\d{1,3}",
            ('j', false) => r"\d{3}",
            ('f', _) => r"\d{1,9}",
            ('b' | 'h' | 'a', _) => "[A-Za-z]{3}",
            ('B' | 'A', _) => "[A-Za-z]+",
            ('p', _) => "[AaPp][Mm]",
            ('z', _) => r"[-+]\d{2}:?\d{2}",
            ('s', _) => r"-?\d+",
            ('%', _) => "%",
            _ => ".+?",
        };
        out.push_str(body);
    }

    out
}
