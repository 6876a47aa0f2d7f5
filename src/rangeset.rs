/* -*- coding: utf8 -*-
 *
 *  rangeset.rs: Implements the RangeSet engine: an ordered, padded,
 *  autostep-folding set of non-negative integers such as `1-4,8-14/2,50`
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

use crate::config::DEFAULT_AUTOSTEP;
use crate::error::NodeSetError;
use crate::range::{fold_vec_u32_in_vec_range, Range};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// An ordered set of non-negative integers, with a uniform zero-padding
/// width and an autostep folding threshold.
///
/// * `members` is the canonical, de-duplicated, ascending set.
/// * `padding` is `0` for "no leading zeros", or `k > 0` to render every
///   member with exactly `k` digits.
/// * `autostep` is the minimum run length at which an arithmetic
///   progression of step > 1 folds to `a-b/step` instead of being listed
///   member by member.
///
/// RangeSet examples:
/// * "1,3-5,89"
/// * "9-2,101,2-8/2"
///
/// Example:
/// ```rust
/// use nodeset::RangeSet;
/// let rangeset = RangeSet::new("22-28/2,29").unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeSet {
    members: BTreeSet<u32>,
    padding: usize,
    autostep: usize,
}

impl RangeSet {
    /// An empty RangeSet, zero padding, autostep disabled.
    pub fn empty() -> RangeSet {
        RangeSet { members: BTreeSet::new(), padding: 0, autostep: DEFAULT_AUTOSTEP }
    }

    /// A RangeSet containing a single value, from a `(value, padding)`
    /// pair.
    pub fn from_value(value: u32, padding: usize) -> RangeSet {
        let mut rs = RangeSet::empty();
        rs.padding = padding;
        rs.members.insert(value);
        rs
    }

    /// Overrides the autostep threshold, returning `self`. Used by callers
    /// (the parser, chiefly) that build a RangeSet programmatically instead
    /// of through [`RangeSet::parse`].
    pub fn with_autostep(mut self, autostep: usize) -> RangeSet {
        self.autostep = autostep;
        self
    }

    /// Parses a comma/`-`/`/`-separated folded string such as
    /// `"1,3-5,89"`. `autostep` overrides the default threshold
    /// ([`crate::config::DEFAULT_AUTOSTEP`]) for this RangeSet.
    pub fn parse(s: &str, autostep: Option<usize>) -> Result<RangeSet, NodeSetError> {
        log::trace!("RangeSet::parse({s:?}, autostep={autostep:?})");
        let mut rs = RangeSet::empty();
        rs.autostep = autostep.unwrap_or(DEFAULT_AUTOSTEP);

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(rs);
        }

        let mut canonical_pad: Option<usize> = None;
        for token in trimmed.split(',') {
            let token = token.trim();
            if token.is_empty() {
                return Err(NodeSetError::range_parse(s, "empty range token"));
            }
            let range = Range::new(token)?;
            let pad = range.pad();
            match canonical_pad {
                None => canonical_pad = Some(pad),
                Some(fp) if pad != 0 && pad != fp => {
                    return Err(NodeSetError::range_parse(
                        s,
                        format!("inconsistent padding in \"{token}\""),
                    ));
                }
                _ => {}
            }
            rs.members.extend(range.generate_vec_u32());
        }
        rs.padding = canonical_pad.unwrap_or(0);
        Ok(rs)
    }

    /// Parses with the crate-wide default autostep threshold.
    pub fn new(s: &str) -> Result<RangeSet, NodeSetError> {
        RangeSet::parse(s, None)
    }

    pub fn padding(&self) -> usize {
        self.padding
    }

    pub fn autostep(&self) -> usize {
        self.autostep
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, value: u32) -> bool {
        self.members.contains(&value)
    }

    /// Adds a single value. `pad` sets the padding if this is the first
    /// member ever added; it is ignored otherwise (padding stays
    /// uniform across the RangeSet, per its invariant).
    pub fn add(&mut self, value: u32, pad: Option<usize>) {
        if self.members.is_empty() {
            if let Some(p) = pad {
                self.padding = p;
            }
        }
        self.members.insert(value);
    }

    /// `s.update(t)`: union, keeping `self`'s padding and autostep.
    pub fn update(&mut self, other: &RangeSet) {
        self.members.extend(other.members.iter().copied());
    }

    /// Bulk insert, used by `NodeSet::updaten`-style multi-value updates.
    pub fn extend(&mut self, values: impl IntoIterator<Item = u32>) {
        self.members.extend(values);
    }

    /// Smallest member, if any.
    pub fn first(&self) -> Option<u32> {
        self.members.iter().next().copied()
    }

    /// Largest member, if any.
    pub fn last(&self) -> Option<u32> {
        self.members.iter().next_back().copied()
    }

    /// `s.intersection_update(t)`: keep only members also in `t`.
    pub fn intersection_update(&mut self, other: &RangeSet) {
        self.members = self.members.intersection(&other.members).copied().collect();
    }

    /// `s.difference_update(t, strict)`: remove members found in `t`. If
    /// `strict`, fails with [`NodeSetError::MissingMember`] on the first
    /// (smallest) member of `t` absent from `self`, leaving `self`
    /// untouched.
    pub fn difference_update(&mut self, other: &RangeSet, strict: bool) -> Result<(), NodeSetError> {
        if strict {
            for value in &other.members {
                if !self.members.contains(value) {
                    return Err(NodeSetError::MissingMember(*value));
                }
            }
        }
        for value in &other.members {
            self.members.remove(value);
        }
        Ok(())
    }

    /// `s.symmetric_difference_update(t)`: keep members in exactly one
    /// of `self`, `t`.
    pub fn symmetric_difference_update(&mut self, other: &RangeSet) {
        self.members = self.members.symmetric_difference(&other.members).copied().collect();
    }

    /// Whether `self` is a superset of `other`.
    pub fn issuperset(&self, other: &RangeSet) -> bool {
        other.members.is_subset(&self.members)
    }

    pub fn issubset(&self, other: &RangeSet) -> bool {
        other.issuperset(self)
    }

    /// Ascending iteration over raw members.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.members.iter().copied()
    }

    /// Ascending iteration yielding already zero-padded strings, matching
    /// the `Iterator<Item = String>` convention the rest of this crate
    /// uses for rendering.
    pub fn iter_padded(&self) -> impl Iterator<Item = String> + '_ {
        let pad = self.padding;
        self.members.iter().map(move |v| format!("{v:0pad$}"))
    }

    /// Returns the member at `index` (0-based over the ascending
    /// sequence; negative counts from the end), with its padding.
    pub fn get(&self, index: i64) -> Result<(u32, usize), NodeSetError> {
        let len = self.members.len() as i64;
        let idx = if index < 0 { len + index } else { index };
        if idx < 0 || idx >= len {
            return Err(NodeSetError::Index(format!("{index} out of range")));
        }
        let value = *self.members.iter().nth(idx as usize).expect("bounds checked above");
        Ok((value, self.padding))
    }

    /// Extracts a slice over the ascending member sequence. Negative
    /// `step` is permitted only when `start` and `stop` are both unset,
    /// and walks the sequence from the end backward by `-step`; the
    /// resulting RangeSet, like any RangeSet, iterates its members in
    /// ascending numeric order regardless of the sampling direction used
    /// to select them.
    pub fn slice(
        &self,
        start: Option<i64>,
        stop: Option<i64>,
        step: Option<i64>,
    ) -> Result<RangeSet, NodeSetError> {
        let members: Vec<u32> = self.members.iter().copied().collect();
        let len = members.len() as i64;
        let step_val = step.unwrap_or(1);
        if step_val == 0 {
            return Err(NodeSetError::Index("slice step cannot be zero".to_string()));
        }

        let mut result = RangeSet::empty();
        result.padding = self.padding;
        result.autostep = self.autostep;

        if step_val < 0 {
            if start.is_some() || stop.is_some() {
                return Err(NodeSetError::Index(
                    "illegal start and stop when negative step is used".to_string(),
                ));
            }
            let stride = (-step_val) as usize;
            let mut idx = len - 1;
            while idx >= 0 {
                result.members.insert(members[idx as usize]);
                idx -= stride as i64;
            }
            return Ok(result);
        }

        let norm = |value: Option<i64>, default: i64| -> i64 {
            match value {
                None => default,
                Some(v) if v < 0 => std::cmp::max(0, len + v),
                Some(v) => v,
            }
        };
        let sl_start = norm(start, 0).min(len) as usize;
        let sl_stop = norm(stop, len).min(len) as usize;
        let stride = step_val as usize;

        let mut idx = sl_start;
        while idx < sl_stop {
            result.members.insert(members[idx]);
            idx += stride;
        }
        Ok(result)
    }

    /// Folds the canonical member set into the minimal vector of
    /// [`Range`]s, using this RangeSet's padding.
    pub fn fold_ranges(&self) -> Vec<Range> {
        let v: Vec<u32> = self.members.iter().copied().collect();
        fold_vec_u32_in_vec_range(&v, self.padding)
    }

    /// Renders the compact folded form: consecutive runs of step 1 always
    /// collapse to `a-b`; runs of step > 1 collapse to `a-b/step` only
    /// once they reach `autostep` members, otherwise every member of the
    /// run is listed individually.
    pub fn fold(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        for range in self.fold_ranges() {
            if range.step_is_one() || range.len() as usize >= self.autostep {
                parts.push(range.to_string());
            } else {
                for v in range.generate_vec_u32() {
                    parts.push(format!("{:0pad$}", v, pad = self.padding));
                }
            }
        }
        parts.join(",")
    }
}

impl fmt::Display for RangeSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.fold())
    }
}

impl FromStr for RangeSet {
    type Err = NodeSetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RangeSet::new(s)
    }
}

/// Padding and autostep are not taken into account: equality is on
/// member sets only.
impl PartialEq for RangeSet {
    fn eq(&self, other: &Self) -> bool {
        self.members == other.members
    }
}
impl Eq for RangeSet {}

/*********************************** Tests ***********************************/
