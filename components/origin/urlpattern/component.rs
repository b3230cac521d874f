/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Compilation and evaluation of a single pattern field.
//!
//! A field compiles into a flat list of matchers. Optional groups become a jump over the
//! matchers they contain, which is taken only after the group failed to match while present.
//! Matching fills one table row per matcher, so it takes time linear in the input for a
//! given pattern whatever the number of wildcards.

use super::tokenizer::{Token, TokenType, TokenizePolicy, tokenize};
use crate::error::SpecificationError;
use crate::host;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) enum ComponentKind {
    Protocol,
    Hostname,
    Port,
}

impl ComponentKind {
    pub(super) fn name(self) -> &'static str {
        match self {
            ComponentKind::Protocol => "protocol",
            ComponentKind::Hostname => "hostname",
            ComponentKind::Port => "port",
        }
    }

    fn is_literal_code_point(self, c: char) -> bool {
        match self {
            ComponentKind::Protocol => matches!(c, 'a'..='z' | '0'..='9' | '+' | '-' | '.'),
            ComponentKind::Hostname => host::is_pattern_literal_code_point(c),
            ComponentKind::Port => c.is_ascii_digit(),
        }
    }
}

/// <https://urlpattern.spec.whatwg.org/#part>, without regular expressions.
#[derive(Clone, Debug, Eq, PartialEq)]
enum Part {
    Fixed(String),
    Name(String),
    Wildcard,
    /// Parts that may be absent as a whole. Groups without a modifier are inlined.
    Optional(Vec<Part>),
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum Matcher {
    Literal(String),
    /// One or more characters, never crossing a `.` in a hostname.
    Name(String),
    /// Any text, including none.
    Any,
    /// One or more whole dot-separated labels.
    LabelRun,
    /// Zero or more characters of a single label.
    WithinLabel,
    /// Start of an optional section; `end` is the index of the first matcher after it.
    Optional { end: usize },
}

#[derive(Clone, Debug)]
pub(super) struct Component {
    kind: ComponentKind,
    source: String,
    matchers: Vec<Matcher>,
    names: Vec<String>,
}

impl Component {
    pub(super) fn compile(kind: ComponentKind, source: &str) -> Result<Component, SpecificationError> {
        if source.is_empty() && kind != ComponentKind::Port {
            return Err(SpecificationError::EmptyField(kind.name()));
        }

        let tokens = tokenize(source, TokenizePolicy::Strict, kind.name())?;
        let parts = parse_parts(&tokens, kind)?;
        if kind == ComponentKind::Hostname {
            check_hostname_literals(&parts)?;
        }
        let mut names = vec![];
        collect_names(&parts, &mut names)?;

        let mut matchers = vec![];
        compile_sequence(kind, &parts, true, &mut matchers);

        Ok(Component {
            kind,
            source: source.to_owned(),
            matchers,
            names,
        })
    }

    pub(super) fn source(&self) -> &str {
        &self.source
    }

    pub(super) fn names(&self) -> &[String] {
        &self.names
    }

    /// Matches the whole of `input`, returning the text captured by each named group that
    /// took part in the match.
    pub(super) fn exec(&self, input: &str) -> Option<Vec<(String, String)>> {
        // Canonical origins are ASCII, which keeps every byte offset a char boundary.
        if !input.is_ascii() {
            return None;
        }
        let table = MatchTable::new(self, input.as_bytes());
        if !table.get(0, 0) {
            return None;
        }
        table.captures(self)
    }
}

/// For every matcher and input position, whether the matchers from there on match the rest
/// of the input. Rows are filled from the last matcher backwards, each in a single pass over
/// the input.
struct MatchTable<'a> {
    input: &'a [u8],
    /// Position of the `.` ending the label at each position, or the input length.
    label_ends: Vec<usize>,
    width: usize,
    reachable: Vec<bool>,
}

impl<'a> MatchTable<'a> {
    fn new(component: &Component, input: &'a [u8]) -> MatchTable<'a> {
        let width = input.len() + 1;
        let mut label_ends = vec![input.len(); width];
        for position in (0..input.len()).rev() {
            label_ends[position] = match input[position] {
                b'.' => position,
                _ => label_ends[position + 1],
            };
        }

        let rows = component.matchers.len() + 1;
        let mut table = MatchTable {
            input,
            label_ends,
            width,
            reachable: vec![false; rows * width],
        };
        table.set(rows - 1, input.len(), true);
        for (index, matcher) in component.matchers.iter().enumerate().rev() {
            table.fill_row(component.kind, index, matcher);
        }
        table
    }

    fn get(&self, index: usize, position: usize) -> bool {
        self.reachable[index * self.width + position]
    }

    fn set(&mut self, index: usize, position: usize, value: bool) {
        self.reachable[index * self.width + position] = value;
    }

    fn fill_row(&mut self, kind: ComponentKind, index: usize, matcher: &Matcher) {
        let input = self.input;
        let len = input.len();
        let next = index + 1;
        // Whether `next` matches after zero or more characters of the current label, seen
        // from the position after the current one.
        let mut reach_after = false;

        for position in (0..=len).rev() {
            let consumable =
                position < len && (kind != ComponentKind::Hostname || input[position] != b'.');
            let reachable = match *matcher {
                Matcher::Literal(ref literal) => {
                    input[position..].starts_with(literal.as_bytes()) &&
                        self.get(next, position + literal.len())
                },
                Matcher::Optional { end } => self.get(next, position) || self.get(end, position),
                Matcher::Any => {
                    self.get(next, position) || (position < len && self.get(index, position + 1))
                },
                Matcher::WithinLabel => self.get(next, position) || (consumable && reach_after),
                Matcher::Name(_) => consumable && reach_after,
                Matcher::LabelRun => {
                    let end = self.label_ends[position];
                    end > position &&
                        (self.get(next, end) || (end < len && self.get(index, end + 1)))
                },
            };
            reach_after = self.get(next, position) || (consumable && reach_after);
            self.set(index, position, reachable);
        }
    }

    /// Walks the table from the start, preferring present optional parts and the longest
    /// text for each variable part.
    fn captures(&self, component: &Component) -> Option<Vec<(String, String)>> {
        let len = self.input.len();
        let mut captures = vec![];
        let mut position = 0;
        let mut index = 0;

        while let Some(matcher) = component.matchers.get(index) {
            let next = index + 1;
            match *matcher {
                Matcher::Literal(ref literal) => position += literal.len(),
                Matcher::Optional { end } => {
                    if !self.get(next, position) {
                        index = end;
                        continue;
                    }
                },
                Matcher::Any => position = self.longest(next, position, len)?,
                Matcher::WithinLabel => {
                    position = self.longest(next, position, self.label_ends[position])?
                },
                Matcher::Name(ref name) => {
                    let limit = match component.kind {
                        ComponentKind::Hostname => self.label_ends[position],
                        _ => len,
                    };
                    let end = self.longest(next, position + 1, limit)?;
                    let value = String::from_utf8_lossy(&self.input[position..end]).into_owned();
                    captures.push((name.clone(), value));
                    position = end;
                },
                Matcher::LabelRun => {
                    let mut end = self.label_ends[position];
                    while end < len && self.get(index, end + 1) {
                        end = self.label_ends[end + 1];
                    }
                    position = end;
                },
            }
            index = next;
        }
        Some(captures)
    }

    /// The last position in `start..=limit` from which the matchers from `index` on match.
    fn longest(&self, index: usize, start: usize, limit: usize) -> Option<usize> {
        (start..=limit).rev().find(|&position| self.get(index, position))
    }
}

/// <https://urlpattern.spec.whatwg.org/#parse-a-pattern-string>, restricted to `?` modifiers
/// and a single level of groups.
fn parse_parts(tokens: &[Token], kind: ComponentKind) -> Result<Vec<Part>, SpecificationError> {
    let mut parts = vec![];
    let mut group: Option<Vec<Part>> = None;
    let mut index = 0;

    while let Some(token) = tokens.get(index) {
        index += 1;
        let current = group.as_mut().unwrap_or(&mut parts);
        match token.token_type {
            TokenType::Char | TokenType::EscapedChar | TokenType::OtherModifier => {
                for c in token.value.chars() {
                    if !kind.is_literal_code_point(c) {
                        return Err(SpecificationError::InvalidLiteral {
                            field: kind.name(),
                            literal: c.to_string(),
                        });
                    }
                }
                match current.last_mut() {
                    Some(Part::Fixed(fixed)) => fixed.push_str(token.value),
                    _ => current.push(Part::Fixed(token.value.to_owned())),
                }
            },
            TokenType::Name | TokenType::Asterisk => {
                let part = match token.token_type {
                    TokenType::Name => Part::Name(token.value.to_owned()),
                    _ => Part::Wildcard,
                };
                if take_optional_modifier(tokens, &mut index)? {
                    current.push(Part::Optional(vec![part]));
                } else {
                    current.push(part);
                }
            },
            TokenType::Open => {
                if group.is_some() {
                    return Err(SpecificationError::NestedGroup);
                }
                group = Some(vec![]);
            },
            TokenType::Close => {
                let inner = group.take().ok_or(SpecificationError::UnbalancedGroup)?;
                if take_optional_modifier(tokens, &mut index)? {
                    parts.push(Part::Optional(inner));
                } else {
                    for part in inner {
                        match (parts.last_mut(), part) {
                            (Some(Part::Fixed(fixed)), Part::Fixed(more)) => fixed.push_str(&more),
                            (_, part) => parts.push(part),
                        }
                    }
                }
            },
            TokenType::End => break,
            TokenType::InvalidChar => {
                return Err(SpecificationError::Tokenize {
                    field: kind.name(),
                    position: token.index,
                });
            },
        }
    }

    if group.is_some() {
        return Err(SpecificationError::UnbalancedGroup);
    }
    Ok(parts)
}

/// Consumes a modifier following a name, a wildcard or a group. Only `?` is supported.
fn take_optional_modifier(tokens: &[Token], index: &mut usize) -> Result<bool, SpecificationError> {
    match tokens.get(*index) {
        Some(token) if token.token_type == TokenType::OtherModifier => {
            if token.value != "?" {
                return Err(SpecificationError::UnsupportedModifier(token.value.to_owned()));
            }
            *index += 1;
            Ok(true)
        },
        _ => Ok(false),
    }
}

fn collect_names(parts: &[Part], names: &mut Vec<String>) -> Result<(), SpecificationError> {
    for part in parts {
        match part {
            Part::Name(name) => {
                if names.contains(name) {
                    return Err(SpecificationError::DuplicateName(name.clone()));
                }
                names.push(name.clone());
            },
            Part::Optional(inner) => collect_names(inner, names)?,
            Part::Fixed(_) | Part::Wildcard => {},
        }
    }
    Ok(())
}

/// Literal hostname text has to fit in a canonical host: no empty labels, and a fully
/// literal hostname has to be one.
fn check_hostname_literals(parts: &[Part]) -> Result<(), SpecificationError> {
    let invalid = |literal: &str| SpecificationError::InvalidLiteral {
        field: ComponentKind::Hostname.name(),
        literal: literal.to_owned(),
    };

    if let [Part::Fixed(host)] = parts {
        return host::canonicalize(host)
            .map(|_| ())
            .map_err(|_| invalid(host));
    }
    if let Some(Part::Fixed(first)) = parts.first() {
        if first.starts_with('.') {
            return Err(invalid(first));
        }
    }
    if let Some(Part::Fixed(last)) = parts.last() {
        if last.ends_with('.') {
            return Err(invalid(last));
        }
    }
    for part in parts {
        match part {
            Part::Fixed(fixed) if fixed.contains("..") => return Err(invalid(fixed)),
            Part::Optional(inner) => {
                for part in inner {
                    if let Part::Fixed(fixed) = part {
                        if fixed.contains("..") {
                            return Err(invalid(fixed));
                        }
                    }
                }
            },
            _ => {},
        }
    }
    Ok(())
}

/// Where a hostname wildcard at `index` sits: whether it covers whole labels, and whether a
/// `.` follows it.
fn wildcard_alignment(parts: &[Part], index: usize) -> (bool, bool) {
    let follows_dot = match index.checked_sub(1) {
        None => true,
        Some(previous) => matches!(
            &parts[previous],
            Part::Fixed(fixed) if fixed.ends_with('.')
        ),
    };
    let precedes_dot = matches!(
        parts.get(index + 1),
        Some(Part::Fixed(fixed)) if fixed.starts_with('.')
    );
    let label_aligned = follows_dot && (precedes_dot || index + 1 == parts.len());
    (label_aligned, precedes_dot)
}

/// `*.rest` also matches `rest` itself: zero or more labels, each followed by a `.` that is
/// taken from the literal after the wildcard.
fn push_optional_labels(out: &mut Vec<Matcher>) {
    let start = out.len();
    out.push(Matcher::Optional { end: start + 3 });
    out.push(Matcher::LabelRun);
    out.push(Matcher::Literal(".".to_owned()));
}

fn compile_sequence(kind: ComponentKind, parts: &[Part], top_level: bool, out: &mut Vec<Matcher>) {
    // Set when a wildcard took over the leading dot of the literal after it.
    let mut strip_leading_dot = false;

    for (index, part) in parts.iter().enumerate() {
        match part {
            Part::Fixed(fixed) => {
                let fixed = match strip_leading_dot {
                    true => &fixed[1..],
                    false => &fixed[..],
                };
                strip_leading_dot = false;
                if !fixed.is_empty() {
                    out.push(Matcher::Literal(fixed.to_owned()));
                }
            },
            Part::Name(name) => out.push(Matcher::Name(name.clone())),
            // `*?.rest` is the same as `*.rest`, which already allows zero labels.
            Part::Optional(inner)
                if kind == ComponentKind::Hostname &&
                    top_level &&
                    *inner == [Part::Wildcard] &&
                    wildcard_alignment(parts, index) == (true, true) =>
            {
                push_optional_labels(out);
                strip_leading_dot = true;
            },
            Part::Optional(inner) => {
                let start = out.len();
                out.push(Matcher::Optional { end: 0 });
                compile_sequence(kind, inner, false, out);
                out[start] = Matcher::Optional { end: out.len() };
            },
            Part::Wildcard if kind != ComponentKind::Hostname => out.push(Matcher::Any),
            Part::Wildcard => {
                let (label_aligned, precedes_dot) = wildcard_alignment(parts, index);
                if top_level && parts.len() == 1 {
                    out.push(Matcher::Any);
                } else if label_aligned && top_level && precedes_dot {
                    push_optional_labels(out);
                    strip_leading_dot = true;
                } else if label_aligned {
                    out.push(Matcher::LabelRun);
                } else {
                    out.push(Matcher::WithinLabel);
                }
            },
        }
    }
}
