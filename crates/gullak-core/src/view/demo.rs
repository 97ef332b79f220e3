//! Guest demo dataset
//!
//! Fixed, read-only data shown when no user is signed in. Demo data is
//! assembled fresh per call and never written to the store; mutations are
//! unavailable in demo views.

use chrono::{Duration, Utc};

use crate::models::{
    ChatMessage, Investment, ProfileSummary, RiskTier, Transaction, TransactionKind,
};

pub const DEMO_BALANCE: i64 = 12_450;
pub const DEMO_SPENT_THIS_MONTH: i64 = 4_320;
pub const DEMO_TOTAL_SAVED: i64 = 2_100;
pub const DEMO_GOAL_PROGRESS: u32 = 45;

/// Headline numbers for the guest dashboard.
pub fn demo_summary() -> ProfileSummary {
    ProfileSummary {
        balance: DEMO_BALANCE,
        spent_this_month: DEMO_SPENT_THIS_MONTH,
        total_saved: DEMO_TOTAL_SAVED,
        goal_progress: DEMO_GOAL_PROGRESS,
    }
}

/// The guest dashboard's recent transactions.
pub fn demo_transactions() -> Vec<Transaction> {
    let now = Utc::now();
    vec![
        Transaction {
            id: "m1".into(),
            name: "Mock Coffee".into(),
            amount: -80,
            category: "Food".into(),
            time: now - Duration::hours(2),
            kind: TransactionKind::Expense,
        },
        Transaction {
            id: "m2".into(),
            name: "Pocket Money".into(),
            amount: 2000,
            category: "Income".into(),
            time: now - Duration::days(1),
            kind: TransactionKind::Income,
        },
        Transaction {
            id: "m3".into(),
            name: "Mock Snack".into(),
            amount: -120,
            category: "Food".into(),
            time: now - Duration::days(2),
            kind: TransactionKind::Expense,
        },
    ]
}

/// Placeholder holdings shown on an empty, signed-in portfolio.
pub fn demo_investments() -> Vec<Investment> {
    vec![
        Investment {
            id: "demo-1".into(),
            name: "Demo Nifty Fund".into(),
            kind: "Mutual Fund".into(),
            invested: 50_000,
            current: 58_000,
            risk: RiskTier::Medium,
            is_demo: true,
        },
        Investment {
            id: "demo-2".into(),
            name: "Demo SIP".into(),
            kind: "SIP".into(),
            invested: 24_000,
            current: 27_000,
            risk: RiskTier::Low,
            is_demo: true,
        },
    ]
}

/// Opening assistant messages for a guest chat.
pub fn demo_welcome_messages() -> Vec<ChatMessage> {
    vec![
        ChatMessage::assistant("👋 Hi there! I'm Gullak AI."),
        ChatMessage::assistant("Ask me about saving, investing, or tracking your expenses 💰"),
    ]
}
