//! Offset range algebra.
//!
//! An [`OffsetRange`] is a half-open interval `[start, end)` of satoshi
//! positions measured from the start of one output's value. An
//! [`AssetOffsets`] is the ordered, non-overlapping list of ranges that one
//! asset occupies in one output. These are positions inside an output, not
//! satoshi ordinals.

use sat_types::{binding_sat_num, Decimal};

use crate::error::OffsetError;

/// `[start, end)` in satoshis relative to the owning output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OffsetRange {
    pub start: i64,
    pub end: i64,
}

impl OffsetRange {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> i64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn shifted(&self, by: i64) -> Self {
        Self {
            start: self.start + by,
            end: self.end + by,
        }
    }
}

/// Ranges occupied by one asset in one output, ascending by `start`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssetOffsets(Vec<OffsetRange>);

impl AssetOffsets {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OffsetRange> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[OffsetRange] {
        &self.0
    }

    pub fn first(&self) -> Option<&OffsetRange> {
        self.0.first()
    }

    pub fn last(&self) -> Option<&OffsetRange> {
        self.0.last()
    }

    /// Sum of all range lengths.
    pub fn total_len(&self) -> i64 {
        self.0.iter().map(OffsetRange::len).sum()
    }

    /// Move every range by `by` satoshis.
    pub fn shift(&mut self, by: i64) {
        for r in &mut self.0 {
            *r = r.shifted(by);
        }
    }

    /// Whether ranges are non-empty, ascending and non-overlapping, and lie
    /// within `[0, limit)`.
    pub fn is_well_formed(&self, limit: i64) -> bool {
        let mut prev_end = 0;
        for r in &self.0 {
            if r.is_empty() || r.start < prev_end || r.end > limit {
                return false;
            }
            prev_end = r.end;
        }
        true
    }

    /// Partition at `boundary`. Ranges left of it are kept as they are, ranges
    /// right of it are rebased so `boundary` becomes position 0, and a range
    /// straddling it is cut in two.
    pub fn split(&self, boundary: i64) -> (AssetOffsets, AssetOffsets) {
        let mut left = Vec::new();
        let mut right = Vec::new();

        for r in self.0.iter().filter(|r| !r.is_empty()) {
            if r.end <= boundary {
                left.push(*r);
            } else if r.start >= boundary {
                right.push(r.shifted(-boundary));
            } else {
                left.push(OffsetRange::new(r.start, boundary));
                right.push(OffsetRange::new(0, r.end - boundary));
            }
        }

        (AssetOffsets(left), AssetOffsets(right))
    }

    /// Concatenate `other`, whose ranges are already expressed in this
    /// output's coordinates. Adjacent ranges at the seam are coalesced.
    pub fn append(&mut self, other: AssetOffsets) {
        let mut incoming = other.0.into_iter();
        let Some(head) = incoming.next() else {
            return;
        };
        match self.0.last_mut() {
            Some(tail) if tail.end == head.start => tail.end = head.end,
            _ => self.0.push(head),
        }
        self.0.extend(incoming);
    }

    /// Position just past the first `amount` asset units, where one satoshi
    /// backs `divisor` units.
    ///
    /// Walks the ranges in order, consuming each range's length until the
    /// remaining satoshi count falls inside one. Asking for exactly the
    /// covered length returns the end of the last range.
    pub fn locate(&self, amount: &Decimal, divisor: u32) -> Result<i64, OffsetError> {
        let last = self.0.last().ok_or(OffsetError::Empty)?;
        let requested = binding_sat_num(amount, divisor);
        let mut remaining = requested;
        for r in &self.0 {
            if remaining < r.len() {
                return Ok(r.start + remaining);
            }
            remaining -= r.len();
        }
        if remaining == 0 {
            return Ok(last.end);
        }
        Err(OffsetError::Exceeds {
            requested,
            covered: self.total_len(),
        })
    }
}

impl From<Vec<OffsetRange>> for AssetOffsets {
    fn from(ranges: Vec<OffsetRange>) -> Self {
        Self(ranges)
    }
}

impl FromIterator<OffsetRange> for AssetOffsets {
    fn from_iter<I: IntoIterator<Item = OffsetRange>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a AssetOffsets {
    type Item = &'a OffsetRange;
    type IntoIter = std::slice::Iter<'a, OffsetRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
