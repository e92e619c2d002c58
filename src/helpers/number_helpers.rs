/// Rounds to `decimals` places, the way stats are stored on documents.
/// Non-finite input collapses to zero.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
