//! Multi-digit value assembly.

use super::digit::DigitTable;
use super::extract::{Frame, FRAME_DIGITS};
use super::FrameRejection;

/// Positional weights, most significant digit first.
const WEIGHTS: [u16; FRAME_DIGITS] = [100, 10, 1];

/// Combine the three digits of `frame` into one value.
///
/// Any unrecognized digit rejects the whole frame; no partial sum is returned.
pub fn assemble(frame: &Frame, table: &DigitTable) -> Result<u16, FrameRejection> {
    frame
        .groups()
        .iter()
        .zip(WEIGHTS)
        .enumerate()
        .try_fold(0u16, |total, (position, (group, weight))| {
            let digit = table
                .decode(group)
                .ok_or(FrameRejection::UnrecognizedDigit { position })?;
            Ok(total + weight * u16::from(digit))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::digit::SegmentGroup;

    fn digit(d: u8) -> SegmentGroup {
        DigitTable::default().pattern_for(d).unwrap()
    }

    fn garbage() -> SegmentGroup {
        SegmentGroup::from_levels([1, 0, 0, 0, 0, 0, 1])
    }

    #[test]
    fn test_weights_digits() {
        let frame = Frame::from_groups([digit(2), digit(4), digit(5)]);
        assert_eq!(assemble(&frame, &DigitTable::default()), Ok(245));

        let frame = Frame::from_groups([digit(1), digit(0), digit(4)]);
        assert_eq!(assemble(&frame, &DigitTable::default()), Ok(104));
    }

    #[test]
    fn test_assembly_is_pure() {
        let table = DigitTable::default();
        let frame = Frame::from_groups([digit(9), digit(8), digit(7)]);
        assert_eq!(assemble(&frame, &table), assemble(&frame, &table));
    }

    #[test]
    fn test_any_unrecognized_digit_rejects_frame() {
        let table = DigitTable::default();
        for position in 0..FRAME_DIGITS {
            let mut groups = [digit(1), digit(0), digit(2)];
            groups[position] = garbage();
            assert_eq!(
                assemble(&Frame::from_groups(groups), &table),
                Err(FrameRejection::UnrecognizedDigit { position })
            );
        }
    }

    #[test]
    fn test_first_unrecognized_position_reported() {
        let frame = Frame::from_groups([digit(1), garbage(), garbage()]);
        assert_eq!(
            assemble(&frame, &DigitTable::default()),
            Err(FrameRejection::UnrecognizedDigit { position: 1 })
        );
    }

    #[test]
    fn test_blank_display_assembles_to_zero() {
        let dark = SegmentGroup::default();
        let frame = Frame::from_groups([dark, dark, dark]);
        assert_eq!(assemble(&frame, &DigitTable::default()), Ok(0));
    }

    #[test]
    fn test_blank_leading_digit() {
        let dark = SegmentGroup::default();
        let frame = Frame::from_groups([dark, digit(9), digit(8)]);
        assert_eq!(assemble(&frame, &DigitTable::default()), Ok(98));
    }
}
