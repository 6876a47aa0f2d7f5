/* -*- coding: utf8 -*-
 *
 *  range.rs: Implements a single arithmetic progression such as `1-4`,
 *  `1`, or `30-0/4` — the unit that RangeSet folds to and parses from.
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
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A range is composed of ordered numbers (at least one). A range may be
/// incremental or decremental. Padding is taken into account with the
/// number of zeros found at the beginning of the first written number.
///
/// Range examples:
/// * 10-49
/// * 1-25/2
/// * 101
/// * 097-103
/// * 30-0/4
///
/// Example:
/// ```rust
/// use nodeset::Range;
/// let range: Range = "01-15/3".parse().unwrap();
/// ```
///
/// * `start` is the start of the range
/// * `end` is the end of the range
/// * `step` is the step to apply between each increment of this Range
/// * `pad` is the padding applied when displaying a Range; `0` means no
///   padding, calculated only from how many zeros the first literal
///   number started with.
#[derive(Debug, Clone, Copy)]
pub struct Range {
    start: u32,
    end: u32,
    step: u32,
    pad: usize,
}

/// "Guesses" the padding requested by counting the characters of the
/// initial string and comparing it with the length of the number it
/// parses to.
pub fn guess_padding(value: &str) -> Result<usize, NodeSetError> {
    let len1 = value.len();
    let number: u32 = value
        .parse()
        .map_err(|_| NodeSetError::range_parse(value, "not a number"))?;
    let len2 = number.to_string().len();

    match len1.cmp(&len2) {
        Ordering::Greater => Ok(len1),
        _ => Ok(0),
    }
}

/// Finds the longest constant-step run starting at `start` (step taken
/// from `v[start]`/`v[start+1]`), returning the index of its last
/// element. May return `start + 1` when the run doesn't extend past its
/// first step; the caller decides whether that two-element run should be
/// kept or broken up.
fn run_end(v: &[u32], start: usize) -> usize {
    let step = v[start + 1] - v[start];
    let mut end = start + 1;
    while end + 1 < v.len() && v[end + 1] - v[end] == step {
        end += 1;
    }
    end
}

/// Folds a non-empty, sorted, de-duplicated slice of `u32` into the
/// minimal vector of [`Range`]s that covers it, each one a maximal
/// arithmetic progression. `pad` is applied uniformly to every produced
/// `Range`. Used by `RangeSet::fold_ranges` to render the compact
/// bracketed form.
///
/// A two-element run (a single observed step) is only kept as a `Range`
/// when its second element isn't itself the start of a longer run with a
/// different step — otherwise that element is peeled off to the longer
/// run and the first element stands alone, so a short leading outlier
/// never steals the boundary element of the run that follows it.
pub fn fold_vec_u32_in_vec_range(v: &[u32], pad: usize) -> Vec<Range> {
    let mut res: Vec<Range> = Vec::new();
    if v.is_empty() {
        return res;
    }
    if v.len() == 1 {
        res.push(Range::new_from_values(v[0], v[0], 1, pad));
        return res;
    }

    let mut i = 0;
    while i < v.len() {
        if i == v.len() - 1 {
            res.push(Range::new_from_values(v[i], v[i], 1, pad));
            i += 1;
            continue;
        }

        let end = run_end(v, i);
        if end == i + 1 && end + 1 < v.len() {
            let alt_end = run_end(v, end);
            if alt_end - end + 1 >= 3 {
                res.push(Range::new_from_values(v[i], v[i], 1, pad));
                i += 1;
                continue;
            }
        }

        let step = v[i + 1] - v[i];
        res.push(Range::new_from_values(v[i], v[end], step, pad));
        i = end + 1;
    }

    res
}

impl Range {
    /// True when start and end are the same, ie. this range has only one
    /// number.
    pub fn start_is_end(&self) -> bool {
        self.start == self.end
    }

    /// True if the Range counts one by one; the display form then omits
    /// `/1`.
    pub fn step_is_one(&self) -> bool {
        self.step == 1
    }

    /// Returns the padding that applies to the Range.
    pub fn pad(&self) -> usize {
        self.pad
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn step(&self) -> u32 {
        self.step
    }

    /// Counts the number of values in the Range.
    pub fn len(&self) -> u32 {
        match self.start.cmp(&self.end) {
            Ordering::Greater => 1 + ((self.start - self.end) / self.step),
            Ordering::Less => 1 + ((self.end - self.start) / self.step),
            Ordering::Equal => 1,
        }
    }

    /// A Range is never empty: it always carries at least one number.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Tells whether the Range counts backward (`start > end`).
    pub fn is_reverse_order(&self) -> bool {
        self.start > self.end
    }

    /// Expands the Range into a vector of `u32`, in the order specified
    /// (forward or reverse).
    pub fn generate_vec_u32(&self) -> Vec<u32> {
        let mut vector: Vec<u32> = Vec::with_capacity(self.len() as usize);
        let mut index = self.start;
        if self.is_reverse_order() {
            while index >= self.end {
                vector.push(index);
                if index < self.step {
                    break;
                }
                index -= self.step;
            }
        } else {
            while index <= self.end {
                vector.push(index);
                index += self.step;
            }
        }
        vector
    }

    /// Creates a new Range directly from the values that define it:
    /// `start-end/step`. `pad` is the minimal digit count, eg. `2` with
    /// `pad = 3` renders `002`.
    pub fn new_from_values(start: u32, end: u32, step: u32, pad: usize) -> Range {
        Range { start, end, step, pad }
    }

    /// Creates a new Range from a string like `1-5/2`, `1`, or `9-15`. It
    /// may even be in reverse mode such as `15-9`. Padding is guessed in
    /// either mode.
    pub fn new(strange: &str) -> Result<Range, NodeSetError> {
        let (base, step) = match strange.split_once('/') {
            Some((base, step)) => {
                let step: u32 = step
                    .parse()
                    .map_err(|_| NodeSetError::range_parse(strange, "invalid step"))?;
                if step == 0 {
                    return Err(NodeSetError::range_parse(strange, "step cannot be zero"));
                }
                (base, step)
            }
            None => (strange, 1),
        };

        let (start_str, end_str) = match base.split_once('-') {
            Some((start, end)) => (start, end),
            None => (base, base),
        };

        let start: u32 = start_str
            .parse()
            .map_err(|_| NodeSetError::range_parse(strange, "invalid range bound"))?;
        let end: u32 = end_str
            .parse()
            .map_err(|_| NodeSetError::range_parse(strange, "invalid range bound"))?;

        let pad = if start <= end { guess_padding(start_str)? } else { guess_padding(end_str)? };

        Ok(Range { start, end, step, pad })
    }
}

/// Iterator over a Range; yields already-padded strings.
impl IntoIterator for Range {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        let pad = self.pad;
        self.generate_vec_u32()
            .into_iter()
            .map(move |n| format!("{n:0pad$}"))
            .collect::<Vec<_>>()
            .into_iter()
    }
}

impl FromStr for Range {
    type Err = NodeSetError;

    fn from_str(strange: &str) -> Result<Self, Self::Err> {
        Range::new(strange)
    }
}

/// Displays the range in folded form: `01-18/3`.
impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let pad = self.pad;

        let start_end_str = if self.start != self.end {
            format!("{:0pad$}-{:0pad$}", self.start, self.end)
        } else {
            format!("{:0pad$}", self.start)
        };

        if self.step != 1 {
            write!(f, "{start_end_str}/{}", self.step)
        } else {
            write!(f, "{start_end_str}")
        }
    }
}

/// Padding is not taken into account: `1-100/2` equals `001-100/2`.
impl PartialEq for Range {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start && self.end == other.end && self.step == other.step
    }
}
impl Eq for Range {}

/*********************************** Tests ***********************************/

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn testing_creating_range() {
        let range = Range::new("1-10").unwrap();
        assert_eq!(range, Range { start: 1, end: 10, step: 1, pad: 0 });

        let range = Range::new("10-1").unwrap();
        assert_eq!(range, Range { start: 10, end: 1, step: 1, pad: 0 });

        let range = Range::new("1-10/2").unwrap();
        assert_eq!(range, Range { start: 1, end: 10, step: 2, pad: 0 });

        let range = Range::new("10-1/3").unwrap();
        assert_eq!(range, Range { start: 10, end: 1, step: 3, pad: 0 });
    }

    fn values(range_str: &str) -> Vec<String> {
        Range::new(range_str).unwrap().into_iter().collect()
    }

    #[test]
    fn testing_range_values() {
        assert_eq!(values("1-14/4"), vec!["1", "5", "9", "13"]);
        assert_eq!(values("38-42"), vec!["38", "39", "40", "41", "42"]);
        assert_eq!(values("1"), vec!["1"]);
        assert_eq!(values("097-103"), vec!["097", "098", "099", "100", "101", "102", "103"]);
        assert_eq!(values("42-38"), vec!["42", "41", "40", "39", "38"]);
    }

    #[test]
    fn testing_padding_guess() {
        assert_eq!(guess_padding("097").unwrap(), 3);
        assert_eq!(guess_padding("42").unwrap(), 0);
        assert_eq!(guess_padding("0").unwrap(), 0);
    }

    #[test]
    fn testing_zero_step_rejected() {
        assert!(Range::new("1-10/0").is_err());
    }

    #[test]
    fn testing_fold_vec_u32() {
        let folded = fold_vec_u32_in_vec_range(&[1, 5, 9, 13], 0);
        assert_eq!(folded, vec![Range::new_from_values(1, 13, 4, 0)]);

        let folded = fold_vec_u32_in_vec_range(&[1, 6, 7, 8, 9, 32], 0);
        assert_eq!(
            folded,
            vec![
                Range::new_from_values(1, 1, 1, 0),
                Range::new_from_values(6, 9, 1, 0),
                Range::new_from_values(32, 32, 1, 0),
            ]
        );

        let folded = fold_vec_u32_in_vec_range(&[1, 6, 7, 8, 32], 0);
        assert_eq!(
            folded,
            vec![
                Range::new_from_values(1, 1, 1, 0),
                Range::new_from_values(6, 8, 1, 0),
                Range::new_from_values(32, 32, 1, 0),
            ]
        );

        let folded = fold_vec_u32_in_vec_range(&[42], 2);
        assert_eq!(folded, vec![Range::new_from_values(42, 42, 1, 2)]);
    }
}
