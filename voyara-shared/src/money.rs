/// Round a currency amount to 2-decimal precision.
///
/// All package arithmetic in the engine goes through this before a value is
/// stored or compared, so equal-looking totals compare equal.
pub fn round2(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
