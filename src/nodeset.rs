/* -*- coding: utf8 -*-
 *
 *  nodeset.rs: Implements NodeSet, the user-facing facade wrapping a
 *  NodeSetBase with a ParsingEngine and an optional GroupResolver.
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

use crate::config::NodeSetConfig;
use crate::error::{ExternalErrorKind, NodeSetError};
use crate::nodeset_base::NodeSetBase;
use crate::parser::{Opcode, ParseEvent, ParsingEngine};
use crate::resolver::GroupResolver;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Anything that can be merged into a `NodeSet`: nothing, a pattern
/// string, or another `NodeSet` instance — the three input forms every
/// set operation accepts.
pub trait NodeSetSource {
    fn into_base(self, owner: &NodeSet) -> Result<NodeSetBase, NodeSetError>;
}

impl NodeSetSource for &str {
    fn into_base(self, owner: &NodeSet) -> Result<NodeSetBase, NodeSetError> {
        owner.parse_str(self)
    }
}

impl NodeSetSource for &String {
    fn into_base(self, owner: &NodeSet) -> Result<NodeSetBase, NodeSetError> {
        owner.parse_str(self.as_str())
    }
}

impl NodeSetSource for &NodeSet {
    fn into_base(self, _owner: &NodeSet) -> Result<NodeSetBase, NodeSetError> {
        Ok(self.base.clone())
    }
}

impl<T: NodeSetSource> NodeSetSource for Option<T> {
    fn into_base(self, owner: &NodeSet) -> Result<NodeSetBase, NodeSetError> {
        match self {
            Some(inner) => inner.into_base(owner),
            None => Ok(NodeSetBase::empty()),
        }
    }
}

/// The user-facing entity: a `NodeSetBase` plus the parsing/resolution
/// context needed to accept strings directly. Cheaply clonable (the
/// resolver is an `Arc`, shared read-only across many `NodeSet`s).
#[derive(Clone)]
pub struct NodeSet {
    base: NodeSetBase,
    config: NodeSetConfig,
    resolver: Option<Arc<dyn GroupResolver>>,
}

impl NodeSet {
    /// An empty NodeSet using the default configuration and no resolver.
    pub fn empty() -> NodeSet {
        NodeSet { base: NodeSetBase::empty(), config: NodeSetConfig::default(), resolver: None }
    }

    /// An empty NodeSet with the given configuration.
    pub fn with_config(config: NodeSetConfig) -> NodeSet {
        NodeSet { base: NodeSetBase::empty(), config, resolver: None }
    }

    /// Attaches a group resolver, builder-style.
    pub fn with_resolver(mut self, resolver: Arc<dyn GroupResolver>) -> NodeSet {
        self.resolver = Some(resolver);
        self
    }

    pub fn set_resolver(&mut self, resolver: Arc<dyn GroupResolver>) {
        self.resolver = Some(resolver);
    }

    pub fn resolver(&self) -> Option<&Arc<dyn GroupResolver>> {
        self.resolver.as_ref()
    }

    pub fn config(&self) -> &NodeSetConfig {
        &self.config
    }

    /// Creates a NodeSet from `nodes` — `None`, a `&str`/`&String`
    /// pattern, or an existing `NodeSet` — using the default
    /// configuration and no resolver. Use [`NodeSet::with_config`] +
    /// [`NodeSet::update`] to parse with a resolver or a non-default
    /// autostep attached.
    pub fn new(nodes: impl NodeSetSource) -> Result<NodeSet, NodeSetError> {
        let mut ns = NodeSet::empty();
        ns.update(nodes)?;
        Ok(ns)
    }

    /// `NodeSet.fromlist`: builds a NodeSet from a batch of patterns in one
    /// shot, using [`NodeSetBase::updaten`] so each shared template's
    /// RangeSet is merged once instead of once per list item.
    pub fn from_list<S: AsRef<str>>(items: &[S], config: NodeSetConfig) -> Result<NodeSet, NodeSetError> {
        let ns = NodeSet::with_config(config);
        let mut bases = Vec::with_capacity(items.len());
        for item in items {
            bases.push(ns.parse_str(item.as_ref())?);
        }
        let mut ns = ns;
        ns.base.updaten(&bases);
        Ok(ns)
    }

    /// `NodeSet.fromall`: every node known to the resolver under
    /// `namespace`. Tries [`GroupResolver::all_nodes`] first, falling back
    /// to listing every group and unioning its members when `all_nodes`
    /// isn't implemented.
    pub fn from_all(
        namespace: Option<&str>,
        config: NodeSetConfig,
        resolver: Arc<dyn GroupResolver>,
    ) -> Result<NodeSet, NodeSetError> {
        let mut ns = NodeSet { base: NodeSetBase::empty(), config, resolver: Some(resolver.clone()) };
        match resolver.all_nodes(namespace) {
            Ok(nodes) => {
                for n in nodes {
                    ns.update(n.as_str())?;
                }
            }
            Err(_) => {
                let names = resolver.grouplist(namespace)?;
                for name in names {
                    let nodes = resolver.group_nodes(&name, namespace)?;
                    ns.update(nodes.join(",").as_str())?;
                }
            }
        }
        Ok(ns)
    }

    pub fn len(&self) -> usize {
        self.base.len()
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    /// Iterates every node string in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = String> + '_ {
        self.base.iter()
    }

    /// The node at `index` (0-based in canonical order; negative counts
    /// from the end).
    pub fn get(&self, index: i64) -> Result<String, NodeSetError> {
        self.base.get(index)
    }

    /// A sub-NodeSet over `[start, stop)` with the given `step`, sharing
    /// this NodeSet's configuration and resolver. Negative `step` is only
    /// legal when `start` and `stop` are both unset (reverse iteration).
    pub fn slice(&self, start: Option<i64>, stop: Option<i64>, step: Option<i64>) -> Result<NodeSet, NodeSetError> {
        let base = self.base.slice(start, stop, step)?;
        Ok(NodeSet { base, config: self.config.clone(), resolver: self.resolver.clone() })
    }

    /// Splits into `n` sub-NodeSets of near-equal size (sizes differ by at
    /// most 1, the first `len % n` being the larger ones), in canonical
    /// order. Always yields exactly `n` pieces; when `n` exceeds `len()`,
    /// the trailing sub-NodeSets are empty. Does not mutate `self`.
    pub fn split(&self, n: usize) -> Result<Vec<NodeSet>, NodeSetError> {
        if n == 0 {
            return Err(NodeSetError::Index("split count must be greater than zero".to_string()));
        }
        let total = self.len();
        let slice_size = total / n;
        let left = total % n;

        let mut result = Vec::with_capacity(n);
        let mut begin: i64 = 0;
        for i in 0..n {
            let length = slice_size + usize::from(i < left);
            let sub = self.slice(Some(begin), Some(begin + length as i64), None)?;
            begin += length as i64;
            result.push(sub);
        }
        Ok(result)
    }

    /// Re-attaches a resolver after deserializing a bare [`NodeSetBase`];
    /// the host re-attaches a resolver here, or leaves it unset.
    pub fn from_base(base: NodeSetBase, config: NodeSetConfig) -> NodeSet {
        NodeSet { base, config, resolver: None }
    }

    /// The underlying template/RangeSet map, for persistence. The
    /// resolver and parser are never serialized.
    pub fn to_base(&self) -> NodeSetBase {
        self.base.clone()
    }

    fn parse_str(&self, s: &str) -> Result<NodeSetBase, NodeSetError> {
        let events = ParsingEngine::scan(s, Some(self.config.default_autostep))?;
        let mut result = NodeSetBase::empty();
        for event in events {
            match event {
                ParseEvent::Term { op, template, range } => {
                    let mut term = NodeSetBase::empty();
                    term.add_entry(template, range);
                    self.apply_op(&mut result, op, &term)?;
                }
                ParseEvent::Group { op, namespace, name, range } => {
                    let group = self.resolve_group(namespace.as_deref(), &name, range.as_ref())?;
                    self.apply_op(&mut result, op, &group)?;
                }
            }
        }
        Ok(result)
    }

    fn apply_op(&self, target: &mut NodeSetBase, op: Opcode, other: &NodeSetBase) -> Result<(), NodeSetError> {
        match op {
            Opcode::Union => {
                target.update(other);
                Ok(())
            }
            Opcode::Intersection => {
                target.intersection_update(other);
                Ok(())
            }
            Opcode::Difference => target.difference_update(other, false),
            Opcode::SymmetricDifference => {
                target.symmetric_difference_update(other);
                Ok(())
            }
        }
    }

    /// Resolves a `@name`/`@ns:name` reference (optionally ranged, eg.
    /// `@group[1-3]` meaning groups `group1`, `group2`, `group3`) to a
    /// `NodeSetBase`, recursively re-parsing each group's member list.
    fn resolve_group(
        &self,
        namespace: Option<&str>,
        name: &str,
        range: Option<&crate::rangeset::RangeSet>,
    ) -> Result<NodeSetBase, NodeSetError> {
        let resolver = self
            .resolver
            .as_ref()
            .ok_or(NodeSetError::External(ExternalErrorKind::NoUpcall))?;
        let namespace = namespace.or(self.config.default_namespace.as_deref());

        let group_names: Vec<String> = match range {
            None => vec![name.to_string()],
            Some(rs) => rs.iter_padded().map(|v| format!("{name}{v}")).collect(),
        };

        let mut result = NodeSetBase::empty();
        for group_name in group_names {
            let nodes = resolver.group_nodes(&group_name, namespace)?;
            if nodes.is_empty() {
                continue;
            }
            let sub = self.parse_str(&nodes.join(","))?;
            result.update(&sub);
        }
        Ok(result)
    }

    pub fn update(&mut self, other: impl NodeSetSource) -> Result<(), NodeSetError> {
        let base = other.into_base(self)?;
        self.base.update(&base);
        Ok(())
    }

    /// Merges several sources at once, grouping by template the way
    /// [`NodeSetBase::updaten`] does.
    pub fn updaten(&mut self, others: impl IntoIterator<Item = impl NodeSetSource>) -> Result<(), NodeSetError> {
        let mut bases = Vec::new();
        for other in others {
            bases.push(other.into_base(self)?);
        }
        self.base.updaten(&bases);
        Ok(())
    }

    pub fn intersection_update(&mut self, other: impl NodeSetSource) -> Result<(), NodeSetError> {
        let base = other.into_base(self)?;
        self.base.intersection_update(&base);
        Ok(())
    }

    pub fn difference_update(&mut self, other: impl NodeSetSource, strict: bool) -> Result<(), NodeSetError> {
        let base = other.into_base(self)?;
        self.base.difference_update(&base, strict)
    }

    pub fn symmetric_difference_update(&mut self, other: impl NodeSetSource) -> Result<(), NodeSetError> {
        let base = other.into_base(self)?;
        self.base.symmetric_difference_update(&base);
        Ok(())
    }

    /// `remove(x)` is `difference_update(x, strict=true)`: fails with
    /// [`NodeSetError::MissingMember`]/[`NodeSetError::MissingNode`] when
    /// `x` is absent.
    pub fn remove(&mut self, other: impl NodeSetSource) -> Result<(), NodeSetError> {
        self.difference_update(other, true)
    }

    pub fn union(&self, other: impl NodeSetSource) -> Result<NodeSet, NodeSetError> {
        let mut n = self.clone();
        n.update(other)?;
        Ok(n)
    }

    pub fn intersection(&self, other: impl NodeSetSource) -> Result<NodeSet, NodeSetError> {
        let mut n = self.clone();
        n.intersection_update(other)?;
        Ok(n)
    }

    pub fn difference(&self, other: impl NodeSetSource) -> Result<NodeSet, NodeSetError> {
        let mut n = self.clone();
        n.difference_update(other, false)?;
        Ok(n)
    }

    pub fn symmetric_difference(&self, other: impl NodeSetSource) -> Result<NodeSet, NodeSetError> {
        let mut n = self.clone();
        n.symmetric_difference_update(other)?;
        Ok(n)
    }

    /// Whether `self` contains every element of `other` (a.k.a. `contains`).
    pub fn issuperset(&self, other: impl NodeSetSource) -> Result<bool, NodeSetError> {
        let base = other.into_base(self)?;
        Ok(self.base.issuperset(&base))
    }

    pub fn contains(&self, other: impl NodeSetSource) -> Result<bool, NodeSetError> {
        self.issuperset(other)
    }

    pub fn issubset(&self, other: impl NodeSetSource) -> Result<bool, NodeSetError> {
        let base = other.into_base(self)?;
        Ok(self.base.issubset(&base))
    }

    /// Regroups this set using external group definitions, maximally
    /// substituting `@name`/`@ns:name` references. Returns a string;
    /// `self` is never mutated.
    ///
    /// * `overlap`: when false (default), a full group is only emitted if
    ///   it is still entirely contained in what's left to cover.
    /// * `noprefix`: when false and `namespace` is given, emitted groups
    ///   are written `@namespace:name`; otherwise just `@name`.
    pub fn regroup(&self, namespace: Option<&str>, overlap: bool, noprefix: bool) -> Result<String, NodeSetError> {
        let resolver = match self.resolver.clone() {
            Some(r) => r,
            None => return Ok(self.base.fold()),
        };

        let grouplist = resolver.grouplist(namespace).ok();
        let has_reverse = resolver.has_node_groups(namespace);

        if grouplist.is_none() && !has_reverse {
            return Ok(self.base.fold());
        }

        let use_reverse = has_reverse && grouplist.as_ref().map_or(true, |names| names.len() >= self.len());
        log::debug!(
            "regroup: using {} lookup ({} candidate groups known)",
            if use_reverse { "reverse" } else { "forward" },
            grouplist.as_ref().map_or(0, Vec::len)
        );

        let candidate_names: Vec<String> = if use_reverse {
            let mut seen = std::collections::BTreeSet::new();
            let mut names = Vec::new();
            for node in self.base.iter() {
                for g in resolver.node_groups(&node, namespace)? {
                    if seen.insert(g.clone()) {
                        names.push(g);
                    }
                }
            }
            names
        } else {
            grouplist.unwrap_or_default()
        };

        let mut fulls: Vec<(usize, String, NodeSetBase)> = Vec::new();
        for name in candidate_names {
            let nodes = resolver.group_nodes(&name, namespace)?;
            let group_base = self.parse_str(&nodes.join(","))?;
            if !group_base.is_empty() && self.base.issuperset(&group_base) {
                fulls.push((group_base.len(), name, group_base));
            }
        }

        // largest group first, ties broken by name ascending
        fulls.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

        let mut rest = self.base.clone();
        let mut emitted: Vec<String> = Vec::new();

        for (_, name, group_base) in fulls {
            if !overlap && !rest.issuperset(&group_base) {
                continue;
            }
            let label = match (namespace, noprefix) {
                (Some(ns), false) => format!("@{ns}:{name}"),
                _ => format!("@{name}"),
            };
            emitted.push(label);
            rest.difference_update(&group_base, false)?;
            if rest.is_empty() {
                break;
            }
        }

        if emitted.is_empty() {
            Ok(rest.fold())
        } else if rest.is_empty() {
            Ok(emitted.join(","))
        } else {
            Ok(format!("{},{}", emitted.join(","), rest.fold()))
        }
    }
}

impl FromStr for NodeSet {
    type Err = NodeSetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeSet::new(s)
    }
}

impl PartialEq for NodeSet {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base
    }
}
impl Eq for NodeSet {}

impl PartialOrd for NodeSet {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.base.partial_cmp(&other.base)
    }
}

impl fmt::Display for NodeSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.base)
    }
}

impl fmt::Debug for NodeSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("NodeSet")
            .field("base", &self.base)
            .field("config", &self.config)
            .field("has_resolver", &self.resolver.is_some())
            .finish()
    }
}

/// Consuming iteration over every node string.
impl IntoIterator for NodeSet {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.base.iter().collect::<Vec<_>>().into_iter()
    }
}

impl<'a> IntoIterator for &'a NodeSet {
    type Item = String;
    type IntoIter = Box<dyn Iterator<Item = String> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.base.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::StaticResolver;

    #[test]
    fn union_then_difference_seed_scenario() {
        let mut ns = NodeSet::new("cluster[1-30]").unwrap();
        ns.update("cluster32").unwrap();
        ns.difference_update("cluster[2-5]", false).unwrap();
        assert_eq!(ns.to_string(), "cluster[1,6-30,32]");
    }

    #[test]
    fn difference_seed_scenario() {
        let ns = NodeSet::new("node[0-10]!node[8-10]").unwrap();
        assert_eq!(ns.to_string(), "node[0-7]");
    }

    #[test]
    fn intersection_seed_scenario() {
        let ns = NodeSet::new("node[0-10]&node[5-13]").unwrap();
        assert_eq!(ns.to_string(), "node[5-10]");
    }

    #[test]
    fn symmetric_difference_seed_scenario() {
        let ns = NodeSet::new("node[0-10]^node[5-13]").unwrap();
        assert_eq!(ns.to_string(), "node[0-4,11-13]");
    }

    #[test]
    fn expand_preserves_padding() {
        let ns = NodeSet::new("forbin[03-05]-ilo").unwrap();
        let nodes: Vec<String> = ns.iter().collect();
        assert_eq!(nodes, vec!["forbin03-ilo", "forbin04-ilo", "forbin05-ilo"]);
    }

    #[test]
    fn split_seed_scenario() {
        let ns = NodeSet::new("foo[1-5]").unwrap();
        let parts = ns.split(3).unwrap();
        let rendered: Vec<String> = parts.iter().map(|p| p.to_string()).collect();
        assert_eq!(rendered, vec!["foo[1-2]", "foo[3-4]", "foo5"]);
    }

    #[test]
    fn autostep_expand_scenario() {
        let config = NodeSetConfig::new(3);
        let mut ns = NodeSet::with_config(config);
        ns.update("cluster[0-10/2]").unwrap();
        let nodes: Vec<String> = ns.iter().collect();
        assert_eq!(nodes, vec!["cluster0", "cluster2", "cluster4", "cluster6", "cluster8", "cluster10"]);
    }

    #[test]
    fn mixed_numbered_and_unnumbered_same_prefix() {
        let ns = NodeSet::new("login,login2").unwrap();
        assert_eq!(ns.len(), 2);
    }

    #[test]
    fn percent_in_input_round_trips() {
        let ns = NodeSet::new("100%-node1").unwrap();
        assert_eq!(ns.to_string(), "100%-node1");
    }

    #[test]
    fn missing_bracket_is_a_parse_error() {
        assert!(NodeSet::new("node[1-10").is_err());
    }

    #[test]
    fn strict_remove_of_absent_element_fails() {
        let mut ns = NodeSet::new("node[1-5]").unwrap();
        let err = ns.remove("node10").unwrap_err();
        assert_eq!(err, NodeSetError::MissingMember(10));
    }

    #[test]
    fn group_reference_resolves_and_unions() {
        let resolver: Arc<dyn GroupResolver> =
            Arc::new(StaticResolver::new().with_group("gpu", vec!["node1".into(), "node2".into()]));
        let mut ns = NodeSet::empty().with_resolver(resolver);
        ns.update("@gpu,node5").unwrap();
        assert_eq!(ns.to_string(), "node[1-2,5]");
    }

    #[test]
    fn group_without_resolver_fails_external() {
        let mut ns = NodeSet::empty();
        let err = ns.update("@gpu").unwrap_err();
        assert!(matches!(err, NodeSetError::External(_)));
    }

    #[test]
    fn regroup_emits_full_group_and_rest() {
        let resolver: Arc<dyn GroupResolver> = Arc::new(
            StaticResolver::new()
                .with_group("gpu", vec!["node1".into(), "node2".into(), "node3".into()]),
        );
        let mut ns = NodeSet::empty().with_resolver(resolver);
        ns.update("node[1-3],node9").unwrap();
        let regrouped = ns.regroup(None, false, false).unwrap();
        assert_eq!(regrouped, "@gpu,node9");
    }

    #[test]
    fn regroup_without_resolver_falls_back_to_fold() {
        let ns = NodeSet::new("node[1-5]").unwrap();
        assert_eq!(ns.regroup(None, false, false).unwrap(), "node[1-5]");
    }

    #[test]
    fn slice_and_get_agree() {
        let ns = NodeSet::new("node[0-20]").unwrap();
        let sub = ns.slice(Some(2), Some(15), None).unwrap();
        for k in 0..sub.len() {
            assert_eq!(ns.get(2 + k as i64).unwrap(), sub.get(k as i64).unwrap());
        }
    }

    #[test]
    fn negative_step_slice_with_bounds_fails() {
        let ns = NodeSet::new("node[0-10]").unwrap();
        assert!(ns.slice(Some(0), None, Some(-1)).is_err());
    }
}
