use serde::{Deserialize, Serialize};

use crate::booking::BookingStatus;

/// Actions the payment flow and the user decision flow feed into the
/// lifecycle state machine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingAction {
    StartPayment,
    PaymentSuccess,
    PaymentFailed,
    Cancel,
}

/// Pure status-transition function. Unknown pairs leave the status
/// unchanged; persisting the result is the caller's job.
///
/// The watchdog's `booked -> disrupted` transition and the post-disruption
/// decisions (`disrupted -> cancelled | risk_accepted`, alternative
/// acceptance) are deliberate writes outside this table.
pub fn next_status(current: BookingStatus, action: BookingAction) -> BookingStatus {
    match (current, action) {
        (BookingStatus::Prepared, BookingAction::StartPayment) => BookingStatus::Pending,
        (BookingStatus::Pending, BookingAction::PaymentSuccess) => BookingStatus::Booked,
        (BookingStatus::Pending, BookingAction::PaymentFailed) => BookingStatus::Prepared,
        (_, BookingAction::Cancel) => BookingStatus::Cancelled,
        (unchanged, _) => unchanged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_happy_path() {
        assert_eq!(
            next_status(BookingStatus::Prepared, BookingAction::StartPayment),
            BookingStatus::Pending
        );
        assert_eq!(
            next_status(BookingStatus::Pending, BookingAction::PaymentSuccess),
            BookingStatus::Booked
        );
    }

    #[test]
    fn failed_payment_returns_to_prepared() {
        assert_eq!(
            next_status(BookingStatus::Pending, BookingAction::PaymentFailed),
            BookingStatus::Prepared
        );
    }

    #[test]
    fn cancel_applies_from_any_status() {
        for status in [
            BookingStatus::Prepared,
            BookingStatus::Pending,
            BookingStatus::Booked,
            BookingStatus::Disrupted,
            BookingStatus::RiskAccepted,
            BookingStatus::Completed,
        ] {
            assert_eq!(next_status(status, BookingAction::Cancel), BookingStatus::Cancelled);
        }
    }

    #[test]
    fn unknown_pairs_leave_status_unchanged() {
        assert_eq!(
            next_status(BookingStatus::Booked, BookingAction::StartPayment),
            BookingStatus::Booked
        );
        assert_eq!(
            next_status(BookingStatus::Booked, BookingAction::PaymentSuccess),
            BookingStatus::Booked
        );
        assert_eq!(
            next_status(BookingStatus::Disrupted, BookingAction::PaymentFailed),
            BookingStatus::Disrupted
        );
    }
}
