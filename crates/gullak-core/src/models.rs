//! Data models for Gullak
//!
//! Core entities for the personal-finance views: transactions, savings
//! goals, bills, investments, community channels, and advisor chat turns.
//! All currency amounts are whole rupees; only transaction amounts are
//! signed.
//!
//! Each entity decodes from a loosely-typed store [`Document`] with
//! explicit defaults for optional fields. Records missing a required
//! field decode to `None` and are skipped by the view layer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::store::{Document, FromDocument};

/// The current signed-in identity, as observed from the auth service.
///
/// Created and destroyed entirely by the auth collaborator; the
/// application only observes transitions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    /// No signed-in user; views fall back to demo data.
    #[default]
    Guest,
    /// A signed-in user.
    Authenticated {
        id: String,
        email: String,
        display_name: Option<String>,
    },
}

impl Session {
    /// Create an authenticated session.
    pub fn authenticated(
        id: impl Into<String>,
        email: impl Into<String>,
        display_name: Option<String>,
    ) -> Self {
        Session::Authenticated {
            id: id.into(),
            email: email.into(),
            display_name,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated { .. })
    }

    /// The user id, if signed in.
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Session::Authenticated { id, .. } => Some(id),
            Session::Guest => None,
        }
    }

    pub fn email(&self) -> Option<&str> {
        match self {
            Session::Authenticated { email, .. } => Some(email),
            Session::Guest => None,
        }
    }

    /// Name used in page greetings: display name, else the local part of
    /// the email, else "Guest".
    pub fn greeting_name(&self) -> String {
        match self {
            Session::Authenticated {
                display_name: Some(name),
                ..
            } if !name.is_empty() => name.clone(),
            Session::Authenticated { email, .. } => email
                .split('@')
                .next()
                .filter(|s| !s.is_empty())
                .unwrap_or("User")
                .to_string(),
            Session::Guest => "Guest".to_string(),
        }
    }
}

/// Whether a transaction adds to or draws from the balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    /// Derive the kind from a signed amount when the stored record omits it.
    pub fn from_amount(amount: i64) -> Self {
        if amount >= 0 {
            TransactionKind::Income
        } else {
            TransactionKind::Expense
        }
    }
}

/// A ledger entry. Read-only from the view layer's perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub name: String,
    /// Signed: positive for income, negative for expenses.
    pub amount: i64,
    pub category: String,
    pub time: DateTime<Utc>,
    pub kind: TransactionKind,
}

impl FromDocument for Transaction {
    fn from_document(doc: &Document) -> Option<Self> {
        let name = doc.str_field("name")?.to_string();
        let amount = doc.int_field("amount")?;
        let kind = doc
            .str_field("kind")
            .and_then(parse_kind)
            .unwrap_or_else(|| TransactionKind::from_amount(amount));
        Some(Transaction {
            id: doc.id.clone(),
            name,
            amount,
            category: doc.str_field("category").unwrap_or("").to_string(),
            time: doc
                .str_field("time")
                .and_then(parse_timestamp)
                .unwrap_or_default(),
            kind,
        })
    }
}

/// A savings goal.
///
/// `current` only moves through explicit add-savings actions; progress is
/// clamped to 100% for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub name: String,
    pub target: i64,
    pub current: i64,
    pub deadline: String,
    pub color: String,
}

/// Fallback color tag applied when a stored goal has none.
pub const DEFAULT_GOAL_COLOR: &str = "from-primary to-secondary";

impl Goal {
    /// Create a new goal with a fresh id.
    pub fn new(name: impl Into<String>, target: i64, deadline: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            target,
            current: 0,
            deadline: deadline.into(),
            color: DEFAULT_GOAL_COLOR.to_string(),
        }
    }

    /// Rounded progress percentage, clamped to 100 for display.
    ///
    /// A target of zero yields 0 rather than a non-finite value.
    pub fn progress_percent(&self) -> u32 {
        if self.target <= 0 {
            return 0;
        }
        let pct = (self.current as f64 / self.target as f64) * 100.0;
        (pct.round().max(0.0) as u32).min(100)
    }

    /// Amount still needed, never below zero.
    pub fn remaining(&self) -> i64 {
        (self.target - self.current).max(0)
    }

    pub fn is_achieved(&self) -> bool {
        self.target > 0 && self.current >= self.target
    }

    /// Store body for creation. Includes the id so the optimistic local
    /// copy and the stored document agree.
    pub fn to_body(&self) -> Value {
        serde_json::json!({
            "id": self.id,
            "name": self.name,
            "target": self.target,
            "current": self.current,
            "deadline": self.deadline,
            "color": self.color,
        })
    }
}

impl FromDocument for Goal {
    fn from_document(doc: &Document) -> Option<Self> {
        Some(Goal {
            id: doc.id.clone(),
            name: doc.str_field("name")?.to_string(),
            target: doc.int_field("target").unwrap_or(0),
            current: doc.int_field("current").unwrap_or(0),
            deadline: doc.str_field("deadline").unwrap_or("").to_string(),
            color: doc
                .str_field("color")
                .unwrap_or(DEFAULT_GOAL_COLOR)
                .to_string(),
        })
    }
}

/// A bill to pay. Once `paid` is set it is terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: String,
    pub name: String,
    pub amount: i64,
    pub due_date: NaiveDate,
    pub paid: bool,
}

impl Bill {
    pub fn new(name: impl Into<String>, amount: i64, due_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            amount,
            due_date,
            paid: false,
        }
    }

    pub fn is_due_today(&self, today: NaiveDate) -> bool {
        !self.paid && self.due_date == today
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.paid && self.due_date < today
    }

    pub fn to_body(&self) -> Value {
        serde_json::json!({
            "id": self.id,
            "name": self.name,
            "amount": self.amount,
            "dueDate": self.due_date.to_string(),
            "paid": self.paid,
        })
    }
}

impl FromDocument for Bill {
    fn from_document(doc: &Document) -> Option<Self> {
        Some(Bill {
            id: doc.id.clone(),
            name: doc.str_field("name")?.to_string(),
            amount: doc.int_field("amount").unwrap_or(0),
            due_date: doc
                .str_field("dueDate")
                .and_then(|s| s.parse().ok())
                .unwrap_or(NaiveDate::MIN),
            paid: doc.bool_field("paid").unwrap_or(false),
        })
    }
}

/// Risk tier for an investment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RiskTier {
    #[default]
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskTier::Low => write!(f, "Low"),
            RiskTier::Medium => write!(f, "Medium"),
            RiskTier::High => write!(f, "High"),
        }
    }
}

impl std::str::FromStr for RiskTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(RiskTier::Low),
            "medium" => Ok(RiskTier::Medium),
            "high" => Ok(RiskTier::High),
            other => Err(format!("Unknown risk tier: {other}")),
        }
    }
}

/// A portfolio holding.
///
/// Demo entries (`is_demo`) are excluded from aggregate totals and cannot
/// be mutated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Investment {
    pub id: String,
    pub name: String,
    /// Free-form instrument type, e.g. "Mutual Fund" or "SIP".
    pub kind: String,
    pub invested: i64,
    pub current: i64,
    pub risk: RiskTier,
    pub is_demo: bool,
}

impl Investment {
    pub fn new(
        name: impl Into<String>,
        kind: impl Into<String>,
        invested: i64,
        current: i64,
        risk: RiskTier,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            kind: kind.into(),
            invested,
            current,
            risk,
            is_demo: false,
        }
    }

    /// Unrealized gain; negative when underwater.
    pub fn gain(&self) -> i64 {
        self.current - self.invested
    }

    /// Store body for creation, scoped to the owning user.
    pub fn to_body(&self, user_id: &str, created_at: DateTime<Utc>) -> Value {
        serde_json::json!({
            "id": self.id,
            "userId": user_id,
            "name": self.name,
            "type": self.kind,
            "invested": self.invested,
            "current": self.current,
            "risk": self.risk.to_string(),
            "createdAt": created_at.to_rfc3339(),
        })
    }
}

impl FromDocument for Investment {
    fn from_document(doc: &Document) -> Option<Self> {
        Some(Investment {
            id: doc.id.clone(),
            name: doc.str_field("name")?.to_string(),
            kind: doc.str_field("type").unwrap_or("").to_string(),
            invested: doc.int_field("invested").unwrap_or(0),
            current: doc.int_field("current").unwrap_or(0),
            risk: doc
                .str_field("risk")
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            is_demo: doc.bool_field("isDemo").unwrap_or(false),
        })
    }
}

/// A community discussion channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub id: String,
    pub name: String,
    pub owner: String,
}

impl FromDocument for Channel {
    fn from_document(doc: &Document) -> Option<Self> {
        Some(Channel {
            id: doc.id.clone(),
            name: doc.str_field("name")?.to_string(),
            owner: doc.str_field("owner").unwrap_or("Anonymous").to_string(),
        })
    }
}

/// A message posted to a community channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelMessage {
    pub id: String,
    pub text: String,
    pub user: String,
    pub created_at: DateTime<Utc>,
}

impl FromDocument for ChannelMessage {
    fn from_document(doc: &Document) -> Option<Self> {
        Some(ChannelMessage {
            id: doc.id.clone(),
            text: doc.str_field("text")?.to_string(),
            user: doc.str_field("user").unwrap_or("Anonymous").to_string(),
            created_at: doc
                .str_field("createdAt")
                .and_then(parse_timestamp)
                .unwrap_or_default(),
        })
    }
}

/// Who produced a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    /// Wire-format role string for advisor payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// One turn of the advisor conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Per-user headline numbers shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub balance: i64,
    pub spent_this_month: i64,
    pub total_saved: i64,
    pub goal_progress: u32,
}

impl FromDocument for ProfileSummary {
    fn from_document(doc: &Document) -> Option<Self> {
        Some(ProfileSummary {
            balance: doc.int_field("balance").unwrap_or(0),
            spent_this_month: doc.int_field("spentThisMonth").unwrap_or(0),
            total_saved: doc.int_field("totalSaved").unwrap_or(0),
            goal_progress: doc.int_field("goalProgress").unwrap_or(0).clamp(0, 100) as u32,
        })
    }
}

fn parse_kind(s: &str) -> Option<TransactionKind> {
    match s {
        "income" => Some(TransactionKind::Income),
        "expense" => Some(TransactionKind::Expense),
        _ => None,
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, body: Value) -> Document {
        Document {
            id: id.to_string(),
            body,
        }
    }

    #[test]
    fn test_session_greeting_name() {
        assert_eq!(Session::Guest.greeting_name(), "Guest");

        let with_name =
            Session::authenticated("u1", "asha@example.com", Some("Asha".to_string()));
        assert_eq!(with_name.greeting_name(), "Asha");

        let email_only = Session::authenticated("u1", "asha@example.com", None);
        assert_eq!(email_only.greeting_name(), "asha");
    }

    #[test]
    fn test_goal_progress_rounds_and_clamps() {
        let mut goal = Goal::new("Trip", 3000, "2026-12-01");
        goal.current = 1000;
        assert_eq!(goal.progress_percent(), 33);

        goal.current = 2000;
        assert_eq!(goal.progress_percent(), 67);

        goal.current = 4500;
        assert_eq!(goal.progress_percent(), 100);
        assert!(goal.is_achieved());
        assert_eq!(goal.remaining(), 0);
    }

    #[test]
    fn test_goal_progress_zero_target_is_sentinel() {
        let goal = Goal::new("Empty", 0, "2026-12-01");
        assert_eq!(goal.progress_percent(), 0);
        assert!(!goal.is_achieved());
    }

    #[test]
    fn test_transaction_kind_derived_from_amount() {
        let income = doc("t1", json!({"name": "Salary", "amount": 2000}));
        let tx = Transaction::from_document(&income).unwrap();
        assert_eq!(tx.kind, TransactionKind::Income);
        assert_eq!(tx.category, "");

        let expense = doc("t2", json!({"name": "Coffee", "amount": -80}));
        let tx = Transaction::from_document(&expense).unwrap();
        assert_eq!(tx.kind, TransactionKind::Expense);
    }

    #[test]
    fn test_transaction_missing_name_is_rejected() {
        let bad = doc("t1", json!({"amount": 100}));
        assert!(Transaction::from_document(&bad).is_none());

        let bad_amount = doc("t2", json!({"name": "x", "amount": "lots"}));
        assert!(Transaction::from_document(&bad_amount).is_none());
    }

    #[test]
    fn test_bill_due_and_overdue() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let mut bill = Bill::new("Rent", 8000, today);
        assert!(bill.is_due_today(today));
        assert!(!bill.is_overdue(today));

        bill.due_date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert!(bill.is_overdue(today));

        bill.paid = true;
        assert!(!bill.is_overdue(today));
        assert!(!bill.is_due_today(today));
    }

    #[test]
    fn test_investment_decode_with_defaults() {
        let body = json!({"name": "Nifty Fund", "invested": 50000, "current": 58000});
        let inv = Investment::from_document(&doc("i1", body)).unwrap();
        assert_eq!(inv.risk, RiskTier::Low);
        assert!(!inv.is_demo);
        assert_eq!(inv.gain(), 8000);

        let body = json!({
            "name": "Crypto",
            "type": "Token",
            "invested": 1000,
            "current": 400,
            "risk": "High",
            "isDemo": true,
        });
        let inv = Investment::from_document(&doc("i2", body)).unwrap();
        assert_eq!(inv.risk, RiskTier::High);
        assert!(inv.is_demo);
        assert_eq!(inv.gain(), -600);
    }

    #[test]
    fn test_profile_summary_defaults_missing_fields_to_zero() {
        let summary = ProfileSummary::from_document(&doc("u1", json!({}))).unwrap();
        assert_eq!(summary, ProfileSummary::default());

        let body = json!({"balance": 12450, "goalProgress": 45});
        let summary = ProfileSummary::from_document(&doc("u1", body)).unwrap();
        assert_eq!(summary.balance, 12450);
        assert_eq!(summary.goal_progress, 45);
        assert_eq!(summary.spent_this_month, 0);
    }

    #[test]
    fn test_goal_body_round_trip() {
        let mut goal = Goal::new("Trip", 5000, "2026-12-01");
        goal.current = 1200;

        let body = goal.to_body();
        let decoded = Goal::from_document(&doc(&goal.id, body)).unwrap();
        assert_eq!(decoded, goal);
    }

    #[test]
    fn test_risk_tier_parse() {
        assert_eq!("low".parse::<RiskTier>().unwrap(), RiskTier::Low);
        assert_eq!("Medium".parse::<RiskTier>().unwrap(), RiskTier::Medium);
        assert!("extreme".parse::<RiskTier>().is_err());
    }
}
