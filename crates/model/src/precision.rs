/// Enough fractional digits to print any finite `f64` exactly.
const EXACT_DIGITS: usize = 1100;

/// Format `value` with `digits` significant digits.
///
/// Follows `Number.prototype.toPrecision`: the exact value is rounded half
/// up, then printed in fixed notation for exponents in `[-6, digits)` and in
/// exponential notation (`1.2e+2`) otherwise.
pub fn to_precision(value: f64, digits: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let digits: usize = digits.max(1);

    if value == 0.0 {
        return format!("{:.*}", digits - 1, 0.0);
    }

    let sign: &str = if value < 0.0 { "-" } else { "" };
    let (kept, exponent) = round_half_up(value.abs(), digits);

    if exponent < -6 || exponent >= digits as i32 {
        let exponent_sign: char = if exponent < 0 { '-' } else { '+' };
        let (lead, rest) = kept.split_at(1);
        let mantissa: String = if rest.is_empty() {
            lead.to_string()
        } else {
            format!("{lead}.{rest}")
        };

        return format!("{sign}{mantissa}e{exponent_sign}{}", exponent.abs());
    }

    if exponent < 0 {
        let zeros: String = "0".repeat((-exponent - 1) as usize);

        return format!("{sign}0.{zeros}{kept}");
    }

    let (whole, fraction) = kept.split_at(exponent as usize + 1);

    if fraction.is_empty() {
        format!("{sign}{whole}")
    } else {
        format!("{sign}{whole}.{fraction}")
    }
}

/// The first `digits` significant digits of `value` rounded half up, with
/// the decimal exponent of the leading digit.
fn round_half_up(value: f64, digits: usize) -> (String, i32) {
    // Exact decimal expansion, so ties are real ties
    let exact: String = format!("{:.*e}", EXACT_DIGITS, value);
    let (mantissa, exponent) = exact.split_once('e').unwrap_or((exact.as_str(), "0"));
    let mut exponent: i32 = exponent.parse().unwrap_or_default();

    let significant: Vec<u8> = mantissa
        .bytes()
        .filter(u8::is_ascii_digit)
        .map(|digit| digit - b'0')
        .collect();
    let mut kept: Vec<u8> = significant.iter().copied().take(digits).collect();
    kept.resize(digits, 0);

    if significant.get(digits).is_some_and(|next| *next >= 5) {
        let mut carry: bool = true;

        for digit in kept.iter_mut().rev() {
            if *digit == 9 {
                *digit = 0;
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }

        if carry {
            kept.insert(0, 1);
            kept.truncate(digits);
            exponent += 1;
        }
    }

    let kept: String = kept.iter().map(|digit| char::from(b'0' + digit)).collect();

    (kept, exponent)
}
