//! Portfolio statistics over a customer's bookings.

use chrono::NaiveDate;
use voyara_domain::{Booking, BookingStatus};
use voyara_shared::round2;

/// (total stays, upcoming stays) for a portfolio. Cancelled bookings do not
/// count; upcoming means a confirmed stay starting today or later.
pub fn stay_counts(bookings: &[Booking], today: NaiveDate) -> (usize, usize) {
    let total = bookings
        .iter()
        .filter(|b| b.status != BookingStatus::Cancelled)
        .count();
    let upcoming = bookings
        .iter()
        .filter(|b| b.status == BookingStatus::Booked && b.date_from >= today)
        .count();
    (total, upcoming)
}

/// (spent, saved) across confirmed and completed stays.
///
/// Stored totals are post-discount; with a promotional discount of `d`
/// percent, the amount saved on a package is `total * d / (100 - d)`.
pub fn portfolio_totals(bookings: &[Booking]) -> (f64, f64) {
    let mut spent = 0.0;
    let mut saved = 0.0;
    for b in bookings {
        if !matches!(b.status, BookingStatus::Booked | BookingStatus::Completed) {
            continue;
        }
        spent += b.total_price;
        if let Some(discount) = b.discount {
            if discount > 0.0 && discount < 100.0 {
                saved += b.total_price * discount / (100.0 - discount);
            }
        }
    }
    (round2(spent), round2(saved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn booking(status: BookingStatus, total_price: f64, discount: Option<f64>) -> Booking {
        Booking {
            id: 1,
            status,
            hotel_id: 1,
            start_transfer_id: 1,
            end_transfer_id: 2,
            outbound_flight_id: 1,
            return_flight_id: 2,
            start_city_id: 1,
            visited_city_id: 2,
            date_from: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            date_to: NaiveDate::from_ymd_opt(2026, 2, 7).unwrap(),
            guests: 2,
            total_price,
            rating: 8.0,
            discount,
            disruption: None,
            parent_booking_id: None,
            created_at: Utc::now(),
        }
    }

    fn with_start(mut b: Booking, start: NaiveDate) -> Booking {
        b.date_from = start;
        b
    }

    #[test]
    fn totals_over_mixed_portfolio() {
        let bookings = vec![
            booking(BookingStatus::Booked, 800.0, Some(20.0)),
            booking(BookingStatus::Completed, 500.0, Some(0.0)),
            booking(BookingStatus::Cancelled, 1000.0, Some(50.0)),
            booking(BookingStatus::Booked, 300.0, None),
        ];
        let (spent, saved) = portfolio_totals(&bookings);
        assert_eq!(spent, 1600.0);
        assert_eq!(saved, 200.0);
    }

    #[test]
    fn cancelled_only_portfolio_totals_to_zero() {
        let bookings = vec![booking(BookingStatus::Cancelled, 1000.0, Some(10.0))];
        assert_eq!(portfolio_totals(&bookings), (0.0, 0.0));
    }

    #[test]
    fn empty_portfolio_totals_to_zero() {
        assert_eq!(portfolio_totals(&[]), (0.0, 0.0));
    }

    #[test]
    fn counts_exclude_cancelled_and_find_upcoming() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 22).unwrap();
        let d = |y, m, dd| NaiveDate::from_ymd_opt(y, m, dd).unwrap();
        let bookings = vec![
            with_start(booking(BookingStatus::Booked, 1.0, None), d(2026, 2, 1)),
            with_start(booking(BookingStatus::Completed, 1.0, None), d(2026, 1, 10)),
            with_start(booking(BookingStatus::Cancelled, 1.0, None), d(2026, 3, 1)),
            with_start(booking(BookingStatus::Booked, 1.0, None), d(2026, 1, 22)),
            with_start(booking(BookingStatus::Disrupted, 1.0, None), d(2026, 5, 1)),
        ];
        assert_eq!(stay_counts(&bookings, today), (4, 2));
    }

    #[test]
    fn no_upcoming_when_all_stays_started() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 22).unwrap();
        let d = |y, m, dd| NaiveDate::from_ymd_opt(y, m, dd).unwrap();
        let bookings = vec![
            with_start(booking(BookingStatus::Completed, 1.0, None), d(2025, 12, 1)),
            with_start(booking(BookingStatus::Booked, 1.0, None), d(2026, 1, 1)),
        ];
        assert_eq!(stay_counts(&bookings, today), (2, 0));
    }
}
