//! Fixed-width number formatting for the text panel.

/// Width of a section rule, in characters.
pub const RULE_WIDTH: usize = 56;

/// Round to the nearest integer and zero-pad the magnitude to `digits`,
/// keeping a leading `-` for negative values: `-4.6 -> "-005"` for 3 digits.
///
/// Non-finite values print as zero.
pub fn zero_pad(value: f64, digits: usize) -> String {
    let rounded = if value.is_finite() { value.round() } else { 0.0 };
    let magnitude = rounded.abs() as u64;
    if rounded < 0.0 {
        format!("-{magnitude:0digits$}")
    } else {
        format!("{magnitude:0digits$}")
    }
}

/// Section header such as `----- Velocity -----...` padded to [`RULE_WIDTH`].
pub fn section(title: &str) -> String {
    let head = format!("----- {title} ");
    let fill = RULE_WIDTH.saturating_sub(head.chars().count());
    format!("{head}{}", "-".repeat(fill))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_to_width() {
        assert_eq!(zero_pad(7.0, 3), "007");
        assert_eq!(zero_pad(42.4, 2), "42");
        assert_eq!(zero_pad(1234.0, 3), "1234");
    }

    #[test]
    fn keeps_sign() {
        assert_eq!(zero_pad(-4.6, 3), "-005");
        assert_eq!(zero_pad(-12.0, 2), "-12");
    }

    #[test]
    fn no_negative_zero() {
        assert_eq!(zero_pad(-0.3, 3), "000");
        assert_eq!(zero_pad(f64::NAN, 2), "00");
    }

    #[test]
    fn section_rule_has_fixed_width() {
        let s = section("Velocity");
        assert!(s.starts_with("----- Velocity -"));
        assert_eq!(s.chars().count(), RULE_WIDTH);
    }
}
