//! Seven-segment digit decoding.
//!
//! A [`DigitTable`] is an ordered list of segment patterns. Lookup is a linear
//! scan that returns the first row whose seven segments all match; rows after
//! the first match are never consulted, so row order decides overlaps.

use std::fmt;

/// Bits per segment group.
pub const SEGMENTS: usize = 7;

/// On/off state of the seven segments of one digit, in order a..g.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SegmentGroup([bool; SEGMENTS]);

impl SegmentGroup {
    /// Wrap segment states
    pub const fn new(bits: [bool; SEGMENTS]) -> Self {
        Self(bits)
    }

    /// Build from `0`/`1` literals; any non-zero value is "lit"
    pub const fn from_levels(levels: [u8; SEGMENTS]) -> Self {
        let mut bits = [false; SEGMENTS];
        let mut i = 0;
        while i < SEGMENTS {
            bits[i] = levels[i] != 0;
            i += 1;
        }
        Self(bits)
    }

    /// Copy the first seven bits of `bits`, if there are that many
    pub fn from_slice(bits: &[bool]) -> Option<Self> {
        let bits: [bool; SEGMENTS] = bits.get(..SEGMENTS)?.try_into().ok()?;
        Some(Self(bits))
    }

    /// Segment states a..g
    pub const fn bits(&self) -> [bool; SEGMENTS] {
        self.0
    }
}

impl fmt::Debug for SegmentGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SegmentGroup(")?;
        for lit in self.0 {
            write!(f, "{}", u8::from(lit))?;
        }
        write!(f, ")")
    }
}

/// One row of a digit table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigitPattern {
    /// Segment pattern to match
    pub segments: SegmentGroup,
    /// Digit reported on a match
    pub value: u8,
    /// Row describes a dark display rather than a digit shape
    pub blank: bool,
}

impl DigitPattern {
    /// A digit shape
    pub const fn digit(levels: [u8; SEGMENTS], value: u8) -> Self {
        Self {
            segments: SegmentGroup::from_levels(levels),
            value,
            blank: false,
        }
    }

    /// A blank row reported as `value`
    pub const fn blank(levels: [u8; SEGMENTS], value: u8) -> Self {
        Self {
            segments: SegmentGroup::from_levels(levels),
            value,
            blank: true,
        }
    }
}

/// Segment patterns of the display controller.
///
/// Plain digits come first so they win over the indicator rows. The last row
/// is a dark digit, which reads as 0.
pub static DEFAULT_TABLE: &[DigitPattern] = &[
    DigitPattern::digit([1, 1, 1, 1, 1, 1, 0], 0),
    DigitPattern::digit([0, 1, 1, 0, 0, 0, 0], 1),
    DigitPattern::digit([1, 1, 0, 1, 1, 0, 1], 2),
    DigitPattern::digit([1, 1, 1, 1, 0, 0, 1], 3),
    DigitPattern::digit([0, 1, 1, 0, 0, 1, 1], 4),
    DigitPattern::digit([1, 0, 1, 1, 0, 1, 1], 5),
    DigitPattern::digit([1, 0, 1, 1, 1, 1, 1], 6),
    DigitPattern::digit([1, 1, 1, 0, 0, 0, 0], 7),
    DigitPattern::digit([1, 1, 1, 1, 1, 1, 1], 8),
    DigitPattern::digit([1, 1, 1, 1, 0, 1, 1], 9),
    // indicator LED lit
    DigitPattern::digit([0, 0, 0, 0, 1, 0, 0], 0),
    DigitPattern::digit([0, 1, 1, 0, 1, 0, 0], 1),
    DigitPattern::blank([0, 0, 0, 0, 0, 0, 0], 0),
];

/// Ordered first-match lookup over a pattern table.
#[derive(Debug, Clone, Copy)]
pub struct DigitTable {
    rows: &'static [DigitPattern],
}

impl Default for DigitTable {
    fn default() -> Self {
        Self::new(DEFAULT_TABLE)
    }
}

impl DigitTable {
    /// Use `rows` in declaration order
    pub const fn new(rows: &'static [DigitPattern]) -> Self {
        Self { rows }
    }

    /// First row matching all seven segments of `group`
    pub fn lookup(&self, group: &SegmentGroup) -> Option<&'static DigitPattern> {
        self.rows.iter().find(|row| row.segments == *group)
    }

    /// Digit shown by `group`, or `None` if no row matches
    pub fn decode(&self, group: &SegmentGroup) -> Option<u8> {
        self.lookup(group).map(|row| row.value)
    }

    /// Segment pattern of the first non-blank row showing `value`
    pub fn pattern_for(&self, value: u8) -> Option<SegmentGroup> {
        self.rows
            .iter()
            .find(|row| !row.blank && row.value == value)
            .map(|row| row.segments)
    }
}
