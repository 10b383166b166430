// pixeltune/src/core/resolver.rs
use super::{OutputFormat, ProcessingOptions};

/// A single user edit to the processing options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Edit {
    Width(u32),
    Height(u32),
    Scale(u32),
    Lock(bool),
    Quality(u8),
    Format(OutputFormat),
}

/// Applies `edit` to `prev` and returns the complete new option set.
///
/// Width and height edits under the aspect lock derive the other side from
/// the ratio of `prev` at the moment of the edit, not from the source image.
/// A scale edit moves both sides by `new / old`. When the divisor of either
/// derivation is zero the edited field is still taken but the derived fields
/// keep their previous values.
pub fn resolve(prev: &ProcessingOptions, edit: Edit) -> ProcessingOptions {
    let mut next = prev.clone();

    match edit {
        Edit::Width(width) => {
            next.width = width;
            if prev.keep_aspect {
                if let Some(height) = derive(width, prev.height, prev.width) {
                    next.height = height;
                } else {
                    log::debug!("Previous width is 0, keeping height {}", prev.height);
                }
            }
        }
        Edit::Height(height) => {
            next.height = height;
            if prev.keep_aspect {
                if let Some(width) = derive(height, prev.width, prev.height) {
                    next.width = width;
                } else {
                    log::debug!("Previous height is 0, keeping width {}", prev.width);
                }
            }
        }
        Edit::Scale(scale) => {
            next.scale = scale;
            if prev.scale == 0 {
                log::debug!("Previous scale is 0, keeping {}x{}", prev.width, prev.height);
            } else {
                let factor = scale as f64 / prev.scale as f64;
                next.width = round_px(prev.width as f64 * factor);
                next.height = round_px(prev.height as f64 * factor);
            }
        }
        Edit::Lock(keep_aspect) => next.keep_aspect = keep_aspect,
        Edit::Quality(quality) => next.quality = quality.clamp(1, 100),
        Edit::Format(format) => next.format = format,
    }

    next
}

/// `round(value * numerator / denominator)`, or `None` when `denominator` is 0.
fn derive(value: u32, numerator: u32, denominator: u32) -> Option<u32> {
    if denominator == 0 {
        return None;
    }
    Some(round_px(value as f64 * (numerator as f64 / denominator as f64)))
}

fn round_px(value: f64) -> u32 {
    // f64::round is half-away-from-zero; the cast saturates
    value.round() as u32
}

/// Reads a dimension typed into a text field.
///
/// Takes the leading integer like a lenient form parser would: `"640px"` is
/// 640. Blank, non-numeric and negative input all yield 0.
pub fn parse_dimension(input: &str) -> u32 {
    let trimmed = input.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let digits = &digits[..end];

    if negative || digits.is_empty() {
        return 0;
    }

    digits.parse::<u32>().unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(width: u32, height: u32, keep_aspect: bool) -> ProcessingOptions {
        ProcessingOptions {
            width,
            height,
            keep_aspect,
            ..Default::default()
        }
    }

    #[test]
    fn test_locked_width_derives_height() {
        let next = resolve(&options(1000, 500, true), Edit::Width(500));
        assert_eq!((next.width, next.height), (500, 250));
    }

    #[test]
    fn test_locked_height_derives_width() {
        let next = resolve(&options(800, 600, true), Edit::Height(300));
        assert_eq!((next.width, next.height), (400, 300));
    }

    #[test]
    fn test_unlocked_edits_are_independent() {
        let next = resolve(&options(800, 600, false), Edit::Width(10));
        assert_eq!((next.width, next.height), (10, 600));

        let next = resolve(&next, Edit::Height(7));
        assert_eq!((next.width, next.height), (10, 7));
    }

    #[test]
    fn test_ratio_uses_previous_values_not_source() {
        let start = options(800, 600, false);
        let skewed = resolve(&start, Edit::Width(400));
        let locked = resolve(&skewed, Edit::Lock(true));
        let next = resolve(&locked, Edit::Width(200));
        assert_eq!((next.width, next.height), (200, 300));
    }

    #[test]
    fn test_scale_moves_both_sides() {
        let next = resolve(&options(800, 600, true), Edit::Scale(50));
        assert_eq!((next.width, next.height, next.scale), (400, 300, 50));

        let next = resolve(&next, Edit::Scale(150));
        assert_eq!((next.width, next.height, next.scale), (1200, 900, 150));
    }

    #[test]
    fn test_scale_is_not_clamped() {
        let next = resolve(&options(100, 100, true), Edit::Scale(400));
        assert_eq!((next.width, next.height, next.scale), (400, 400, 400));
    }

    #[test]
    fn test_zero_divisors_keep_derived_fields() {
        let next = resolve(&options(0, 0, true), Edit::Width(320));
        assert_eq!((next.width, next.height), (320, 0));

        let next = resolve(&options(0, 0, true), Edit::Height(240));
        assert_eq!((next.width, next.height), (0, 240));

        let mut prev = options(800, 600, true);
        prev.scale = 0;
        let next = resolve(&prev, Edit::Scale(50));
        assert_eq!((next.width, next.height, next.scale), (800, 600, 50));
    }

    #[test]
    fn test_width_zero_is_accepted() {
        let next = resolve(&options(800, 600, true), Edit::Width(0));
        assert_eq!((next.width, next.height), (0, 0));
    }

    #[test]
    fn test_inverse_edit_within_one_pixel() {
        for (old_w, old_h) in [(1000, 500), (1920, 1080), (333, 777), (4032, 3024), (7, 3)] {
            for new_w in [1, 13, 250, 640, 999, 1234] {
                let forward = resolve(&options(old_w, old_h, true), Edit::Width(new_w));
                let expected = (new_w as f64 * old_h as f64 / old_w as f64).round() as u32;
                assert_eq!(forward.height, expected);

                if forward.height == 0 {
                    continue;
                }
                // Feed the derived height back against the original ratio
                let back = resolve(&options(old_w, old_h, true), Edit::Height(forward.height));
                assert_eq!(back.height, forward.height);
                assert!(
                    (back.width as i64 - new_w as i64).abs() <= 1,
                    "{}x{} -> {} -> {} -> {}",
                    old_w,
                    old_h,
                    new_w,
                    forward.height,
                    back.width
                );
            }
        }
    }

    #[test]
    fn test_quality_and_format_edits() {
        let prev = options(10, 10, true);
        assert_eq!(resolve(&prev, Edit::Quality(0)).quality, 1);
        assert_eq!(resolve(&prev, Edit::Quality(250)).quality, 100);
        assert_eq!(resolve(&prev, Edit::Quality(42)).quality, 42);
        assert_eq!(
            resolve(&prev, Edit::Format(OutputFormat::WebP)).format,
            OutputFormat::WebP
        );
    }

    #[test]
    fn test_parse_dimension() {
        assert_eq!(parse_dimension("640"), 640);
        assert_eq!(parse_dimension("  640px"), 640);
        assert_eq!(parse_dimension("+12"), 12);
        assert_eq!(parse_dimension(""), 0);
        assert_eq!(parse_dimension("abc"), 0);
        assert_eq!(parse_dimension("-5"), 0);
        assert_eq!(parse_dimension("99999999999"), u32::MAX);
    }
}
