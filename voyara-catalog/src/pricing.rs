//! Package price and rating arithmetic.
//!
//! Everything here is pure and rounds through `round2` so that stored
//! totals, budget comparisons and test fixtures agree to the cent.

use chrono::NaiveDate;
use voyara_shared::round2;

/// Chargeable nights for a stay. A same-day or inverted range still bills
/// one night.
pub fn nights_between(date_from: NaiveDate, date_to: NaiveDate) -> i64 {
    (date_to - date_from).num_days().max(1)
}

/// Total package price: both flight legs, the hotel for every night, and
/// the transfer pair.
pub fn package_price(
    outbound_price: f64,
    return_price: f64,
    nightly_price: f64,
    nights: i64,
    start_transfer_price: f64,
    end_transfer_price: f64,
) -> f64 {
    round2(
        outbound_price
            + return_price
            + nightly_price * nights as f64
            + start_transfer_price
            + end_transfer_price,
    )
}

/// Package rating: the mean of the hotel and the two transfer ratings,
/// rounded to 2 decimals.
pub fn package_rating(hotel_rating: f64, start_transfer_rating: f64, end_transfer_rating: f64) -> f64 {
    round2((hotel_rating + start_transfer_rating + end_transfer_rating) / 3.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn nights_span_the_range() {
        assert_eq!(nights_between(date(2027, 6, 1), date(2027, 6, 7)), 6);
    }

    #[test]
    fn nights_never_drop_below_one() {
        assert_eq!(nights_between(date(2027, 6, 1), date(2027, 6, 1)), 1);
    }

    #[test]
    fn price_sums_legs_nights_and_transfers() {
        // 2000 + 2000 + 800 * 6 + 100 + 50
        let total = package_price(2000.0, 2000.0, 800.0, 6, 100.0, 50.0);
        assert_eq!(total, 8950.0);
    }

    #[test]
    fn price_rounds_to_two_decimals() {
        let total = package_price(0.105, 0.105, 0.0, 1, 0.0, 0.0);
        assert_eq!(total, 0.21);
    }

    #[test]
    fn rating_is_the_rounded_mean() {
        assert_eq!(package_rating(5.0, 5.0, 4.5), 4.83);
        assert_eq!(package_rating(8.0, 8.0, 8.0), 8.0);
    }
}
