// Damage magnitude decoding.
//
// Storm records store damage as a coefficient plus a scale letter, e.g.
// `25.0` with `K` meaning $25,000.
use crate::error::{Result, StormError};

/// Map a scale code to its power of ten.
///
/// Case-insensitive and whitespace-tolerant: `H`=2, `K`=3, `M`=6, `B`=9,
/// empty=0. Anything else is rejected with [`StormError::InvalidScaleCode`].
pub fn decode_exponent(code: &str) -> Result<i32> {
    match code.trim().to_ascii_uppercase().as_str() {
        "" => Ok(0),
        "H" => Ok(2),
        "K" => Ok(3),
        "M" => Ok(6),
        "B" => Ok(9),
        other => Err(StormError::InvalidScaleCode {
            code: other.to_string(),
        }),
    }
}

pub fn decode_magnitude(coefficient: f64, code: &str) -> Result<f64> {
    let exp = decode_exponent(code)?;
    Ok(coefficient * 10f64.powi(exp))
}
