/* -*- coding: utf8 -*-
 *
 *  resolver.rs: Implements the GroupResolver interface, the external
 *  collaborator that maps `@group[:namespace]` references to node lists.
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

use crate::error::{ExternalErrorKind, NodeSetError};

/// External collaborator resolving `@name[:namespace]` group references to
/// node lists. The crate never ships a real resolver (subprocess/file
/// backed resolution is an application concern); this trait is the seam
/// an embedding application implements.
///
/// Only [`GroupResolver::group_nodes`] is required. The other methods have
/// default bodies reporting [`ExternalErrorKind::NoUpcall`] so a minimal
/// resolver needs to implement just one method; [`NodeSet::regroup`]
/// degrades gracefully when `grouplist`/`node_groups` are unavailable (see
/// its algorithm).
///
/// `Send + Sync` so a resolver can be shared read-only across many
/// `NodeSet`s, including across threads.
pub trait GroupResolver: Send + Sync {
    /// Expands one group to its member node strings.
    fn group_nodes(&self, name: &str, namespace: Option<&str>) -> Result<Vec<String>, NodeSetError>;

    /// Reverse lookup: the groups a node belongs to. Optional.
    fn node_groups(&self, _node: &str, _namespace: Option<&str>) -> Result<Vec<String>, NodeSetError> {
        Err(NodeSetError::External(ExternalErrorKind::NoUpcall))
    }

    /// Enumerates every group name in `namespace`. Optional.
    fn grouplist(&self, _namespace: Option<&str>) -> Result<Vec<String>, NodeSetError> {
        Err(NodeSetError::External(ExternalErrorKind::NoUpcall))
    }

    /// Shortcut for "every node known to this namespace". Optional.
    fn all_nodes(&self, _namespace: Option<&str>) -> Result<Vec<String>, NodeSetError> {
        Err(NodeSetError::External(ExternalErrorKind::NoUpcall))
    }

    /// Whether [`GroupResolver::node_groups`] is implemented for real.
    /// `regroup()`'s direction heuristic consults this before paying for a
    /// full `grouplist` + per-group `group_nodes` pass.
    fn has_node_groups(&self, _namespace: Option<&str>) -> bool {
        false
    }
}

/// The explicit "no group resolution at all" resolver: every call fails
/// with [`ExternalErrorKind::QueryFailed`].
#[derive(Debug, Default, Clone, Copy)]
pub struct NullResolver;

impl GroupResolver for NullResolver {
    fn group_nodes(&self, name: &str, _namespace: Option<&str>) -> Result<Vec<String>, NodeSetError> {
        Err(NodeSetError::External(ExternalErrorKind::QueryFailed(format!(
            "no group resolver configured (requested group \"{name}\")"
        ))))
    }
}

/// An in-memory resolver backed by a fixed `name -> nodes` table. Not part
/// of the core interface: a small test fixture so `regroup()` and
/// `@group`/`@ns:group` parsing can be exercised without a real resolver,
/// which this crate deliberately doesn't ship.
#[cfg(any(test, feature = "test-util"))]
#[derive(Debug, Default, Clone)]
pub struct StaticResolver {
    groups: std::collections::BTreeMap<String, Vec<String>>,
}

#[cfg(any(test, feature = "test-util"))]
impl StaticResolver {
    pub fn new() -> StaticResolver {
        StaticResolver::default()
    }

    pub fn with_group(mut self, name: impl Into<String>, nodes: Vec<String>) -> StaticResolver {
        self.groups.insert(name.into(), nodes);
        self
    }
}

#[cfg(any(test, feature = "test-util"))]
impl GroupResolver for StaticResolver {
    fn group_nodes(&self, name: &str, _namespace: Option<&str>) -> Result<Vec<String>, NodeSetError> {
        self.groups.get(name).cloned().ok_or_else(|| {
            NodeSetError::External(ExternalErrorKind::QueryFailed(format!("unknown group \"{name}\"")))
        })
    }

    fn node_groups(&self, node: &str, _namespace: Option<&str>) -> Result<Vec<String>, NodeSetError> {
        Ok(self
            .groups
            .iter()
            .filter(|(_, nodes)| nodes.iter().any(|n| n == node))
            .map(|(name, _)| name.clone())
            .collect())
    }

    fn grouplist(&self, _namespace: Option<&str>) -> Result<Vec<String>, NodeSetError> {
        Ok(self.groups.keys().cloned().collect())
    }

    fn all_nodes(&self, _namespace: Option<&str>) -> Result<Vec<String>, NodeSetError> {
        let mut all: Vec<String> = self.groups.values().flatten().cloned().collect();
        all.sort();
        all.dedup();
        Ok(all)
    }

    fn has_node_groups(&self, _namespace: Option<&str>) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_resolver_always_fails() {
        let r = NullResolver;
        assert!(r.group_nodes("anything", None).is_err());
        assert!(!r.has_node_groups(None));
    }

    #[test]
    fn static_resolver_round_trips_membership() {
        let r = StaticResolver::new().with_group("gpu", vec!["node1".into(), "node2".into()]);
        assert_eq!(r.group_nodes("gpu", None).unwrap(), vec!["node1", "node2"]);
        assert_eq!(r.node_groups("node1", None).unwrap(), vec!["gpu".to_string()]);
        assert_eq!(r.grouplist(None).unwrap(), vec!["gpu".to_string()]);
    }
}
