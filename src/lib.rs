/* -*- coding: utf8 -*-
 *
 *  lib.rs: Implements all structure logic to deal with NodeSets
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

//! Compact representation and algebra for sets of cluster hostnames, eg.
//! `node[1-30,32]` for thirty-one nodes named `node1` through `node30`
//! plus `node32`.
//!
//! The core types are layered:
//! * [`Range`] / [`RangeSet`] — arithmetic progressions of integers and
//!   their union, with padding and `a-b/step` folding.
//! * [`Template`] — a node name's `prefix%sSuffix` shape.
//! * [`NodeSetBase`] — a `Template -> RangeSet` map, carrying the set
//!   algebra (union, intersection, difference, symmetric difference,
//!   indexing, slicing).
//! * [`NodeSet`] — the facade most callers use: parses extended pattern
//!   strings (`node[1-10]!node[8-10],@gpu`) and, given a [`GroupResolver`],
//!   resolves `@group` references and `regroup()`s a set back into group
//!   notation.

/// configuration shared by `NodeSet` instances
pub mod config;

/// the crate-wide error taxonomy
pub mod error;

/// `NodeSet`, the user-facing facade
mod nodeset;

/// `NodeSetBase`, the template-wise set algebra engine
mod nodeset_base;

/// the extended pattern scanner
mod parser;

/// module to manage range such as `1-4` or `1` or even `30-0/4`
mod range;

/// module to manage a set of ranges called a rangeset, such as `1-4,8-14/2,50`
mod rangeset;

/// `GroupResolver`, the external group-name resolution seam
pub mod resolver;

/// `Template`, the prefix/suffix carrier keying a `NodeSetBase`
mod template;

pub use config::{NodeSetConfig, DEFAULT_AUTOSTEP};
pub use error::{ExternalErrorKind, NodeSetError};
pub use nodeset::{NodeSet, NodeSetSource};
pub use nodeset_base::NodeSetBase;
pub use parser::{Opcode, ParseEvent, ParsingEngine};
pub use range::{fold_vec_u32_in_vec_range, guess_padding, Range};
pub use rangeset::RangeSet;
pub use resolver::{GroupResolver, NullResolver};
pub use template::Template;

#[cfg(any(test, feature = "test-util"))]
pub use resolver::StaticResolver;
