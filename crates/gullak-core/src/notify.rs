//! Bill-due notifications
//!
//! A [`Notifier`] delivers title/body alerts when permission is granted.
//! Alert construction is pure; the bills page runs one sweep per sign-in
//! over the first bills snapshot.

use chrono::NaiveDate;
use tracing::debug;

use crate::models::Bill;

/// Notification permission state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

/// Delivery seam for user-facing alerts.
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, body: &str);
}

/// Notifier that writes alerts to the terminal, honoring permission.
pub struct ConsoleNotifier {
    permission: Permission,
}

impl ConsoleNotifier {
    pub fn new(permission: Permission) -> Self {
        Self { permission }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, title: &str, body: &str) {
        if self.permission == Permission::Denied {
            debug!(title, "notification suppressed");
            return;
        }
        println!("🔔 {}: {}", title, body);
    }
}

/// A constructed alert, ready for a [`Notifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillAlert {
    pub title: String,
    pub body: String,
}

/// Alerts for unpaid bills due exactly today. Paid bills and other dates
/// produce nothing.
pub fn due_bill_alerts(bills: &[Bill], today: NaiveDate) -> Vec<BillAlert> {
    bills
        .iter()
        .filter(|b| !b.paid && b.due_date == today)
        .map(|b| BillAlert {
            title: "Bill Due Today".to_string(),
            body: format!("{} ₹{} is due today!", b.name, b.amount),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Notifier that records alerts for assertions.
    pub struct RecordingNotifier {
        pub sent: Mutex<Vec<(String, String)>>,
    }

    impl RecordingNotifier {
        pub fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, title: &str, body: &str) {
            self.sent
                .lock()
                .unwrap()
                .push((title.to_string(), body.to_string()));
        }
    }

    fn bill(name: &str, amount: i64, due: NaiveDate, paid: bool) -> Bill {
        let mut b = Bill::new(name, amount, due);
        b.paid = paid;
        b
    }

    #[test]
    fn test_alerts_only_for_unpaid_bills_due_today() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 28).unwrap();
        let tomorrow = NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();

        let bills = vec![
            bill("Rent", 8000, today, false),
            bill("Internet", 599, today, true),
            bill("Phone", 299, tomorrow, false),
        ];

        let alerts = due_bill_alerts(&bills, today);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].title, "Bill Due Today");
        assert_eq!(alerts[0].body, "Rent ₹8000 is due today!");
    }

    #[test]
    fn test_no_bills_no_alerts() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 28).unwrap();
        assert!(due_bill_alerts(&[], today).is_empty());
    }
}
