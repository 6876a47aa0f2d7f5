/* -*- coding: utf8 -*-
 *
 *  parser.rs: Implements the ParsingEngine, the extended pattern scanner
 *  that turns a string like `node[1-10]!node[8-10],@gpu` into a stream of
 *  (opcode, template, rangeset) events.
 *
 *  (C) Copyright 2022 - 2023 Olivier Delhomme
 *  e-mail : olivier.delhomme@free.fr
 *
 *  This program is free software; you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation; either version 3, or (at your option)
 *  any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program; if not, write to the Free Software Foundation,
 *  Inc., 59 Temple Place - Suite 330, Boston, MA 02111-1307, USA.
 */

use crate::error::NodeSetError;
use crate::range::guess_padding;
use crate::rangeset::RangeSet;
use crate::template::Template;
use lazy_static::lazy_static;
use regex::Regex;

/// Each opcode maps 1:1 to a `NodeSetBase` method, replacing a
/// string-keyed method dispatch with a plain match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Union,
    Intersection,
    Difference,
    SymmetricDifference,
}

impl Opcode {
    fn from_char(c: char) -> Option<Opcode> {
        match c {
            ',' => Some(Opcode::Union),
            '!' => Some(Opcode::Difference),
            '&' => Some(Opcode::Intersection),
            '^' => Some(Opcode::SymmetricDifference),
            _ => None,
        }
    }
}

/// One event emitted by the scanner. `Term` carries a plain node pattern;
/// `Group` carries a `@name`/`@ns:name` reference, kept as its own variant
/// (rather than a zero-width `Template` beginning with `@`) so
/// `NodeSetBase` never has to special-case a template prefix — only the
/// facade that owns a resolver ever sees a `Group` event.
#[derive(Debug, Clone)]
pub enum ParseEvent {
    Term { op: Opcode, template: Template, range: Option<RangeSet> },
    Group { op: Opcode, namespace: Option<String>, name: String, range: Option<RangeSet> },
}

lazy_static! {
    /// Decomposes a single node token into (non-digits, digits, rest),
    /// anchored to the *first* digit run: everything after it, digits or
    /// not, is carried through untouched as the suffix.
    static ref SINGLE_NODE_RE: Regex = Regex::new(r"^(\D*)(\d*)(.*)$").unwrap();
}

/// Finds the earliest of `,`, `!`, `&`, `^` in `s`, if any.
fn next_op(s: &str) -> Option<(usize, Opcode)> {
    const OPS: [char; 4] = [',', '!', '&', '^'];
    OPS.iter()
        .filter_map(|c| s.find(*c).map(|idx| (idx, Opcode::from_char(*c).unwrap())))
        .min_by_key(|(idx, _)| *idx)
}

impl ParseEvent {
    /// Builds the right event variant from a scanned `(prefix, suffix,
    /// range)` triple: a prefix starting with `@` names a group reference,
    /// optionally namespaced (`@ns:name`).
    fn from_parts(op: Opcode, prefix: &str, suffix: &str, range: Option<RangeSet>) -> ParseEvent {
        match prefix.strip_prefix('@') {
            Some(rest) => {
                let combined = format!("{rest}{suffix}");
                let (namespace, name) = match combined.split_once(':') {
                    Some((ns, name)) => (Some(ns.to_string()), name.to_string()),
                    None => (None, combined),
                };
                ParseEvent::Group { op, namespace, name, range }
            }
            None => ParseEvent::Term { op, template: Template::new(prefix, suffix), range },
        }
    }
}

/// Transforms an extended pattern string into a stream of `ParseEvent`s.
/// Stateless: holds no resolver — group resolution is the facade's job,
/// not the scanner's.
pub struct ParsingEngine;

impl ParsingEngine {
    /// Scans `input`, threading `autostep` into every numbered range the
    /// scan produces. Fails with [`NodeSetError::Parse`] (offending
    /// substring attached) on malformed syntax, or with
    /// [`NodeSetError::RangeParse`] when a bracketed range list itself
    /// fails to parse.
    pub fn scan(input: &str, autostep: Option<usize>) -> Result<Vec<ParseEvent>, NodeSetError> {
        log::trace!("ParsingEngine::scan({input:?}, autostep={autostep:?})");
        let mut events = Vec::new();
        let mut op_code = Opcode::Union;
        let mut pat = input.to_string();

        loop {
            let trimmed = pat.trim_start().to_string();
            if trimmed.is_empty() {
                break;
            }

            let op = next_op(&trimmed);
            let bracket_idx = trimmed.find('[');

            let bracket_first = match (bracket_idx, op) {
                (Some(b), Some((o, _))) => b < o,
                (Some(_), None) => true,
                (None, _) => false,
            };

            if bracket_first {
                let bracket_idx = bracket_idx.expect("bracket_first implies a bracket index");
                let prefix = &trimmed[..bracket_idx];
                let after_bracket_open = &trimmed[bracket_idx + 1..];
                let (rangelist, after_bracket) = after_bracket_open
                    .split_once(']')
                    .ok_or_else(|| NodeSetError::parse(trimmed.clone(), "missing bracket"))?;

                let (suffix, rest) = match next_op(after_bracket) {
                    Some((idx, next_opcode)) => {
                        let (s, r) = after_bracket.split_at(idx);
                        (s, Some((r[1..].to_string(), next_opcode)))
                    }
                    None => (after_bracket, None),
                };
                let suffix = suffix.trim_end();

                if prefix.is_empty() && suffix.is_empty() {
                    return Err(NodeSetError::parse(trimmed.clone(), "empty node name"));
                }

                let rangeset = RangeSet::parse(rangelist, autostep)?;
                events.push(ParseEvent::from_parts(op_code, prefix, suffix, Some(rangeset)));

                match rest {
                    Some((rest_pat, next_opcode)) => {
                        pat = rest_pat;
                        op_code = next_opcode;
                    }
                    None => break,
                }
            } else {
                let (node, rest) = match op {
                    Some((idx, next_opcode)) => {
                        let (n, r) = trimmed.split_at(idx);
                        (n, Some((r[1..].to_string(), next_opcode)))
                    }
                    None => (trimmed.as_str(), None),
                };
                let node = node.trim();
                if node.is_empty() {
                    return Err(NodeSetError::parse(trimmed.clone(), "empty node name"));
                }

                let caps = SINGLE_NODE_RE
                    .captures(node)
                    .ok_or_else(|| NodeSetError::parse(node.to_string(), "parse error"))?;
                let prefix = caps.get(1).map_or("", |m| m.as_str());
                let digits = caps.get(2).map_or("", |m| m.as_str());
                let suffix = caps.get(3).map_or("", |m| m.as_str());

                if prefix.is_empty() && suffix.is_empty() {
                    return Err(NodeSetError::parse(node.to_string(), "empty node name"));
                }

                let range = if digits.is_empty() {
                    None
                } else {
                    let value: u32 = digits
                        .parse()
                        .map_err(|_| NodeSetError::parse(node.to_string(), "invalid numeral"))?;
                    let pad = guess_padding(digits)?;
                    Some(RangeSet::empty().with_autostep(autostep.unwrap_or(usize::MAX)).tap_add(value, pad))
                };

                events.push(ParseEvent::from_parts(op_code, prefix, suffix, range));

                match rest {
                    Some((rest_pat, next_opcode)) => {
                        pat = rest_pat;
                        op_code = next_opcode;
                    }
                    None => break,
                }
            }
        }

        Ok(events)
    }
}

/// Small private extension so the single-value-range construction above
/// reads as one expression instead of a three-line `let mut`.
trait TapAdd {
    fn tap_add(self, value: u32, pad: usize) -> Self;
}
impl TapAdd for RangeSet {
    fn tap_add(mut self, value: u32, pad: usize) -> RangeSet {
        self.add(value, Some(pad));
        self
    }
}
