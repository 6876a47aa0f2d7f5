/* -*- coding: utf8 -*-
 *
 *  nodeset_base.rs: Implements NodeSetBase, the template-wise mapping
 *  that carries the actual set algebra beneath the NodeSet façade.
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
use crate::rangeset::RangeSet;
use crate::template::Template;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

/// A mapping `Template -> RangeSet?`: `None` marks an unnumbered node
/// (the template carries the whole node name and nothing is
/// substituted), `Some(rangeset)` marks every value of `rangeset`
/// sharing that template. Iteration and rendering walk templates in
/// their natural (lexicographic) `BTreeMap` order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeSetBase {
    patterns: BTreeMap<Template, Option<RangeSet>>,
}

impl NodeSetBase {
    pub fn empty() -> NodeSetBase {
        NodeSetBase { patterns: BTreeMap::new() }
    }

    pub fn len(&self) -> usize {
        self.patterns.values().map(|rs| rs.as_ref().map_or(1, RangeSet::len)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn patterns(&self) -> &BTreeMap<Template, Option<RangeSet>> {
        &self.patterns
    }

    /// Inserts a single unnumbered node.
    pub fn add_bare(&mut self, template: Template) {
        self.add_entry(template, None);
    }

    /// Inserts a single numbered node.
    pub fn add_single(&mut self, template: Template, value: u32, pad: usize) {
        let mut rs = RangeSet::empty();
        rs.add(value, Some(pad));
        self.add_entry(template, Some(rs));
    }

    /// Merges a `(template, rangeset?)` pair, the low-level primitive
    /// every higher-level operation funnels through. When the template
    /// already carries a RangeSet, `incoming` is unioned into it; an
    /// incoming bare (`None`) entry never erases an existing ranged one
    /// (the one case the source would otherwise crash on: adding a bare
    /// node under a template that already has range values).
    pub fn add_entry(&mut self, template: Template, incoming: Option<RangeSet>) {
        match self.patterns.entry(template) {
            Entry::Occupied(mut e) => {
                let slot = e.get_mut();
                match (slot.as_mut(), incoming) {
                    (Some(existing), Some(inc)) => existing.update(&inc),
                    (None, inc) => *slot = inc,
                    (Some(_), None) => {}
                }
            }
            Entry::Vacant(e) => {
                e.insert(incoming);
            }
        }
    }

    /// Iterates every node string in canonical order: lexicographic by
    /// template, then ascending numeric index within a template.
    pub fn iter(&self) -> impl Iterator<Item = String> + '_ {
        self.patterns.iter().flat_map(|(tpl, rangeset)| -> Box<dyn Iterator<Item = String>> {
            match rangeset {
                Some(rs) => Box::new(rs.iter_padded().map(move |v| tpl.substitute(&v))),
                None => Box::new(std::iter::once(tpl.substitute(""))),
            }
        })
    }

    /// Renders the compact folded form: `prefix[a-b,c]suffix` for
    /// multi-member templates, `prefix<n>suffix` for single-member ones,
    /// and the literal template for unnumbered nodes.
    pub fn fold(&self) -> String {
        self.patterns
            .iter()
            .map(|(tpl, rangeset)| match rangeset {
                Some(rs) if rs.len() >= 2 => tpl.substitute(&format!("[{}]", rs.fold())),
                Some(rs) => tpl.substitute(&rs.fold()),
                None => tpl.substitute(""),
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    /// `s.update(t)`: template-wise union.
    pub fn update(&mut self, other: &NodeSetBase) {
        for (tpl, rs) in &other.patterns {
            self.add_entry(tpl.clone(), rs.clone());
        }
    }

    /// `s.updaten(others)`: merges several NodeSetBases at once, grouping
    /// by template so each template's RangeSet is combined only once —
    /// avoids rehashing the same template over and over for a batch drawn
    /// from a homogeneous cluster.
    pub fn updaten(&mut self, others: &[NodeSetBase]) {
        let mut grouped: BTreeMap<Template, Vec<Option<RangeSet>>> = BTreeMap::new();
        for other in others {
            for (tpl, rs) in &other.patterns {
                grouped.entry(tpl.clone()).or_default().push(rs.clone());
            }
        }
        for (template, rangesets) in grouped {
            let all_bare = rangesets.iter().all(Option::is_none);
            if all_bare {
                self.add_entry(template, None);
                continue;
            }
            let mut merged: Option<RangeSet> = None;
            for rs in rangesets.into_iter().flatten() {
                match merged.as_mut() {
                    Some(m) => m.update(&rs),
                    None => merged = Some(rs),
                }
            }
            self.add_entry(template, merged);
        }
    }

    pub fn clear(&mut self) {
        self.patterns.clear();
    }

    /// `s.intersection_update(t)`: keeps only templates present on both
    /// sides, intersecting their RangeSets; a template present on both
    /// sides as a bare node survives once. Unlike the source this has a
    /// single clause per case (the source repeats the bare/bare clause
    /// twice, a dead duplication fixed here).
    pub fn intersection_update(&mut self, other: &NodeSetBase) {
        let mut kept: BTreeMap<Template, Option<RangeSet>> = BTreeMap::new();
        for (tpl, irangeset) in &other.patterns {
            match (self.patterns.get(tpl), irangeset) {
                (Some(Some(rs)), Some(inc)) => {
                    let mut merged = rs.clone();
                    merged.intersection_update(inc);
                    if !merged.is_empty() {
                        kept.insert(tpl.clone(), Some(merged));
                    }
                }
                (Some(None), None) => {
                    kept.insert(tpl.clone(), None);
                }
                _ => {}
            }
        }
        self.patterns = kept;
    }

    /// `s.difference_update(t, strict)`: removes, per shared template,
    /// the members found in `t`; a strict failure reports the offending
    /// element and leaves `self` untouched (checked before any removal
    /// is committed, so a failure partway through never leaves a partial
    /// difference applied).
    pub fn difference_update(&mut self, other: &NodeSetBase, strict: bool) -> Result<(), NodeSetError> {
        if strict {
            for (tpl, erangeset) in &other.patterns {
                match (self.patterns.get(tpl), erangeset) {
                    (Some(Some(rs)), Some(e)) => {
                        for v in e.iter() {
                            if !rs.contains(v) {
                                return Err(NodeSetError::MissingMember(v));
                            }
                        }
                    }
                    (Some(None), None) | (Some(Some(_)), None) => {}
                    (None, Some(e)) => {
                        if let Some(v) = e.first() {
                            return Err(NodeSetError::MissingMember(v));
                        }
                    }
                    (None, None) => return Err(NodeSetError::MissingNode(tpl.substitute(""))),
                }
            }
        }

        let mut purge = Vec::new();
        for (tpl, erangeset) in &other.patterns {
            match self.patterns.get_mut(tpl) {
                Some(Some(rangeset)) => {
                    if let Some(e) = erangeset {
                        rangeset.difference_update(e, false).expect("pre-checked above");
                        if rangeset.is_empty() {
                            purge.push(tpl.clone());
                        }
                    }
                }
                Some(None) => {
                    if erangeset.is_none() {
                        purge.push(tpl.clone());
                    }
                }
                None => {}
            }
        }
        for tpl in purge {
            self.patterns.remove(&tpl);
        }
        Ok(())
    }

    pub fn remove(&mut self, other: &NodeSetBase) -> Result<(), NodeSetError> {
        self.difference_update(other, true)
    }

    /// `s.symmetric_difference_update(t)`: keeps members present in
    /// exactly one side. Computed in two read-only passes (shared
    /// templates, then `t`-only templates) with purges collected into a
    /// list and applied after both passes — the source mutates
    /// `self._patterns` while a later loop is still walking it, relying
    /// on iterating a *different* dict to get away with it; collecting
    /// first sidesteps the question entirely.
    pub fn symmetric_difference_update(&mut self, other: &NodeSetBase) {
        let mut next: BTreeMap<Template, Option<RangeSet>> = self.patterns.clone();

        for (tpl, brangeset) in &other.patterns {
            match (self.patterns.get(tpl), brangeset) {
                (Some(Some(rs)), Some(b)) => {
                    let mut merged = rs.clone();
                    merged.symmetric_difference_update(b);
                    next.insert(tpl.clone(), Some(merged));
                }
                (Some(Some(_)), None) | (Some(None), Some(_)) => {
                    // mismatched bare/ranged identity for the same template: drop it
                    next.remove(tpl);
                }
                (Some(None), None) => {
                    next.remove(tpl);
                }
                (None, _) => {
                    next.insert(tpl.clone(), brangeset.clone());
                }
            }
        }

        next.retain(|_, rs| !matches!(rs, Some(r) if r.is_empty()));
        self.patterns = next;
    }

    fn binary_contains(&self, template: &Template, erangeset: &Option<RangeSet>) -> bool {
        match (self.patterns.get(template), erangeset) {
            (Some(Some(rs)), Some(e)) => rs.issuperset(e),
            (Some(None), None) => true,
            _ => false,
        }
    }

    /// Whether `self` contains every element of `other`.
    pub fn issuperset(&self, other: &NodeSetBase) -> bool {
        other.patterns.iter().all(|(tpl, rs)| self.binary_contains(tpl, rs))
    }

    pub fn issubset(&self, other: &NodeSetBase) -> bool {
        other.issuperset(self)
    }

    /// Returns the node string at `index` (0-based in canonical order;
    /// negative counts from the end).
    pub fn get(&self, index: i64) -> Result<String, NodeSetError> {
        let total = self.len() as i64;
        let idx = if index < 0 {
            if index < -total {
                return Err(NodeSetError::Index(format!("{index} out of range")));
            }
            total + index
        } else {
            index
        };

        let mut seen = 0i64;
        for (tpl, rangeset) in &self.patterns {
            match rangeset {
                Some(rs) => {
                    let cnt = rs.len() as i64;
                    if idx < seen + cnt {
                        let (value, pad) = rs.get(idx - seen)?;
                        return Ok(tpl.substitute(&format!("{value:0pad$}")));
                    }
                    seen += cnt;
                }
                None => {
                    if idx == seen {
                        return Ok(tpl.substitute(""));
                    }
                    seen += 1;
                }
            }
        }
        Err(NodeSetError::Index(format!("{index} out of range")))
    }

    /// Extracts a slice over the canonical node order, preserving
    /// templates and padding. The bound computation lives directly in
    /// this method rather than a separate helper, so there's no risk of
    /// a helper being handed the wrong length.
    pub fn slice(
        &self,
        start: Option<i64>,
        stop: Option<i64>,
        step: Option<i64>,
    ) -> Result<NodeSetBase, NodeSetError> {
        let length = self.len() as i64;
        let step_val = step.unwrap_or(1);
        if step_val == 0 {
            return Err(NodeSetError::Index("slice step cannot be zero".to_string()));
        }

        let (sl_start, sl_stop, sl_step) = if step_val < 0 {
            if start.is_some() || stop.is_some() {
                return Err(NodeSetError::Index(
                    "illegal start and stop when negative step is used".to_string(),
                ));
            }
            let neg = -step_val;
            let stepmod = (length + neg - 1).rem_euclid(neg);
            (stepmod, length, neg)
        } else {
            let norm_start = match start {
                None => 0,
                Some(v) if v < 0 => (length + v).max(0),
                Some(v) => v,
            };
            let norm_stop = match stop {
                None => length,
                Some(v) if v < 0 => (length + v).max(0),
                Some(v) => v,
            };
            (norm_start, norm_stop, step_val)
        };

        let mut result = NodeSetBase::empty();
        let mut sl_next = sl_start;
        if sl_stop <= sl_next {
            return Ok(result);
        }

        let mut seen = 0i64;
        for (tpl, rangeset) in &self.patterns {
            match rangeset {
                Some(rs) => {
                    let cnt = rs.len() as i64;
                    let offset = sl_next - seen;
                    if offset < cnt {
                        let num = (sl_stop - sl_next).min(cnt - offset);
                        let sub = rs.slice(Some(offset), Some(offset + num), Some(sl_step))?;
                        result.add_entry(tpl.clone(), Some(sub));
                        sl_next += num;
                        if (sl_next - sl_start) % sl_step != 0 {
                            sl_next = sl_start + ((sl_next - sl_start) / sl_step + 1) * sl_step;
                        }
                        if sl_next >= sl_stop {
                            break;
                        }
                        seen += cnt;
                    } else {
                        seen += cnt;
                    }
                }
                None => {
                    if sl_next > seen {
                        seen += 1;
                        continue;
                    }
                    result.add_entry(tpl.clone(), None);
                    sl_next += 1;
                    if (sl_next - sl_start) % sl_step != 0 {
                        sl_next = sl_start + ((sl_next - sl_start) / sl_step + 1) * sl_step;
                    }
                    if sl_next >= sl_stop {
                        break;
                    }
                    seen += 1;
                }
            }
        }
        Ok(result)
    }
}

impl fmt::Display for NodeSetBase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.fold())
    }
}

impl PartialEq for NodeSetBase {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.issuperset(other)
    }
}
impl Eq for NodeSetBase {}

impl PartialOrd for NodeSetBase {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self == other {
            Some(Ordering::Equal)
        } else if self.len() < other.len() && self.issubset(other) {
            Some(Ordering::Less)
        } else if self.len() > other.len() && self.issuperset(other) {
            Some(Ordering::Greater)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_numbered(prefix: &str, range: &str) -> NodeSetBase {
        let mut b = NodeSetBase::empty();
        b.add_entry(Template::bare(prefix), Some(RangeSet::new(range).unwrap()));
        b
    }

    #[test]
    fn fold_renders_brackets_only_past_one_member() {
        let mut b = NodeSetBase::empty();
        b.add_single(Template::bare("node"), 7, 0);
        assert_eq!(b.fold(), "node7");

        let b2 = base_numbered("node", "1-3");
        assert_eq!(b2.fold(), "node[1-3]");
    }

    #[test]
    fn union_merges_shared_templates() {
        let mut a = base_numbered("node", "1-5");
        let b = base_numbered("node", "8-10");
        a.update(&b);
        assert_eq!(a.fold(), "node[1-5,8-10]");
    }

    #[test]
    fn intersection_keeps_only_shared_templates() {
        let mut a = base_numbered("node", "0-10");
        let b = base_numbered("node", "5-13");
        a.intersection_update(&b);
        assert_eq!(a.fold(), "node[5-10]");
    }

    #[test]
    fn difference_purges_emptied_templates() {
        let mut a = base_numbered("node", "0-10");
        let b = base_numbered("node", "0-10");
        a.difference_update(&b, false).unwrap();
        assert!(a.is_empty());
    }

    #[test]
    fn symmetric_difference_keeps_disjoint_members() {
        let mut a = base_numbered("node", "0-10");
        let b = base_numbered("node", "5-13");
        a.symmetric_difference_update(&b);
        assert_eq!(a.fold(), "node[0-4,11-13]");
    }

    #[test]
    fn strict_difference_fails_on_missing_member() {
        let mut a = base_numbered("node", "0-5");
        let b = base_numbered("node", "0-10");
        let err = a.difference_update(&b, true).unwrap_err();
        assert_eq!(err, NodeSetError::MissingMember(6));
    }

    #[test]
    fn bare_and_numbered_nodes_coexist_under_distinct_templates() {
        let mut a = NodeSetBase::empty();
        a.add_bare(Template::bare("login"));
        a.add_single(Template::new("node", ""), 3, 0);
        assert_eq!(a.len(), 2);
        let mut rendered: Vec<String> = a.iter().collect();
        rendered.sort();
        assert_eq!(rendered, vec!["login".to_string(), "node3".to_string()]);
    }

    #[test]
    fn equality_is_length_and_mutual_superset() {
        let a = base_numbered("node", "1-5");
        let b = base_numbered("node", "1-5");
        assert_eq!(a, b);
    }
}
