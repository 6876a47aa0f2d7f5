/* -*- coding: utf8 -*-
 *
 *  template.rs: Implements the Template, the prefix/suffix carrier that
 *  keys every entry of a NodeSetBase.
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

use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque carrier for a node name split around its numeric slot:
/// `prefix + "%s" + suffix`. A Template with an empty slot (no numeric
/// part at all) represents an unnumbered node, keyed in `NodeSetBase`
/// against a `None` RangeSet.
///
/// `Ord`/`Eq` are derived from the `(prefix, suffix)` pair, which orders
/// identically to the combined `prefix + "%s" + suffix` string since the
/// slot position never moves between templates: deriving on the pair
/// avoids allocating the combined string for every comparison.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Template {
    prefix: String,
    suffix: String,
}

impl Template {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Template {
        Template { prefix: prefix.into(), suffix: suffix.into() }
    }

    /// A template for an unnumbered node, eg. `"login"` parsed with no
    /// bracketed range at all.
    pub fn bare(name: impl Into<String>) -> Template {
        Template { prefix: name.into(), suffix: String::new() }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Substitutes `value` (already folded/padded as needed by the
    /// caller) into the `%s` slot.
    pub fn substitute(&self, value: &str) -> String {
        format!("{}{value}{}", self.prefix, self.suffix)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}%s{}", self.prefix, self.suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_matches_combined_string() {
        let a = Template::new("node", "");
        let b = Template::new("rack", "-core");
        assert!(a < b);
    }

    #[test]
    fn substitute_fills_the_slot() {
        let t = Template::new("node", "-mgmt");
        assert_eq!(t.substitute("007"), "node007-mgmt");
    }

    #[test]
    fn bare_template_has_no_suffix() {
        let t = Template::bare("login");
        assert_eq!(t.to_string(), "login%s");
        assert_eq!(t.substitute(""), "login");
    }
}
