// src/utils/fixed_point.rs

/// Short-integer encoding of reflectance and of most scaled indices.
pub const REFLECTANCE_SCALE: f32 = 10000.0;

/// Encoding used by the ratio-minus-one family.
pub const RATIO_SCALE: f32 = 1000.0;

/// Scale and truncate toward zero, saturating at the i16 range.
#[inline]
pub fn scale_truncate(value: f32, scale: f32) -> i16 {
    (value * scale) as i16
}

/// Scale and truncate toward zero; `None` when the scaled value leaves
/// the i16 range (encoded as nodata by the caller).
#[inline]
pub fn scale_checked(value: f32, scale: f32) -> Option<i16> {
    let scaled = value * scale;
    if scaled.is_finite() && scaled >= i16::MIN as f32 && scaled <= i16::MAX as f32 {
        Some(scaled as i16)
    } else {
        None
    }
}

/// f64 variant of [`scale_truncate`], used by the unmixing kernel.
#[inline]
pub fn scale_truncate_f64(value: f64, scale: f64) -> i16 {
    (value * scale) as i16
}
