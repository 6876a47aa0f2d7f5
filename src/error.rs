/* -*- coding: utf8 -*-
 *
 *  error.rs: Implements the error taxonomy shared by every module
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

use thiserror::Error;

/// Failure reason for a [`NodeSetError::External`], mirroring the two
/// capabilities a `GroupResolver` may fail to provide.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ExternalErrorKind {
    /// The resolver attempted the query but it failed (subprocess error,
    /// malformed response, ...).
    QueryFailed(String),
    /// The resolver does not implement this capability at all.
    NoUpcall,
}

impl std::fmt::Display for ExternalErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExternalErrorKind::QueryFailed(msg) => write!(f, "query failed: {msg}"),
            ExternalErrorKind::NoUpcall => write!(f, "resolver has no such capability"),
        }
    }
}

/// The single error type returned by every fallible operation in this
/// crate. One variant per abstract error kind.
#[derive(Error, Clone, Debug, Eq, PartialEq)]
pub enum NodeSetError {
    /// Malformed extended pattern. `part` carries the offending substring
    /// so the caller can locate it.
    #[error("{msg}: \"{part}\"")]
    Parse { part: String, msg: String },

    /// Malformed range list (`a-b/step` syntax). Behaves as a subtype of
    /// [`NodeSetError::Parse`]: see [`NodeSetError::part`] and
    /// [`NodeSetError::message`].
    #[error("bad range: {msg}: \"{part}\"")]
    RangeParse { part: String, msg: String },

    /// The group resolver failed, or lacks a capability the caller needs.
    #[error("external error: {0}")]
    External(ExternalErrorKind),

    /// Out-of-bounds index, or an illegal negative-step slice.
    #[error("index error: {0}")]
    Index(String),

    /// Strict `remove`/`difference_update(strict=true)` of an absent
    /// member.
    #[error("missing member: {0}")]
    MissingMember(u32),

    /// Strict `remove`/`difference_update(strict=true)` of an absent
    /// unnumbered node (a template with no numeric slot at all).
    #[error("missing member: {0}")]
    MissingNode(String),
}

impl NodeSetError {
    /// Constructs a [`NodeSetError::Parse`].
    pub fn parse(part: impl Into<String>, msg: impl Into<String>) -> Self {
        NodeSetError::Parse { part: part.into(), msg: msg.into() }
    }

    /// Constructs a [`NodeSetError::RangeParse`].
    pub fn range_parse(part: impl Into<String>, msg: impl Into<String>) -> Self {
        NodeSetError::RangeParse { part: part.into(), msg: msg.into() }
    }

    /// The offending substring, for `Parse` and `RangeParse` variants.
    /// Returns `None` for every other variant.
    pub fn part(&self) -> Option<&str> {
        match self {
            NodeSetError::Parse { part, .. } | NodeSetError::RangeParse { part, .. } => Some(part),
            _ => None,
        }
    }

    /// The human-readable message, without the offending substring.
    pub fn message(&self) -> Option<&str> {
        match self {
            NodeSetError::Parse { msg, .. } | NodeSetError::RangeParse { msg, .. } => Some(msg),
            _ => None,
        }
    }

    /// True for both `Parse` and `RangeParse`: `RangeParse` is a subtype
    /// of `Parse`, reported separately only so callers can tell a
    /// malformed range list apart from a malformed pattern.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, NodeSetError::Parse { .. } | NodeSetError::RangeParse { .. })
    }
}

pub type Result<T> = std::result::Result<T, NodeSetError>;
