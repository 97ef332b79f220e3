//! Goals and bills page controller
//!
//! Two live collections with optimistic mutations. A failed store write
//! rolls back the local splice and returns the error; the snapshot
//! stream is the source of truth otherwise.
//!
//! Guests get an empty read-only view. After sign-in, the first bills
//! snapshot drives one notification sweep for bills due today.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::models::{Bill, Goal, Session};
use crate::notify::{due_bill_alerts, Notifier};
use crate::store::{DocumentStore, Query, SortOrder, StoreResult};
use crate::view::{LiveQuery, OptimisticList, TaggedSnapshot, ViewPhase};

pub struct GoalsPage {
    store: Arc<dyn DocumentStore>,
    session: Session,
    goals: OptimisticList<Goal>,
    bills: OptimisticList<Bill>,
    live_goals: LiveQuery<Goal>,
    live_bills: LiveQuery<Bill>,
    goals_loaded: bool,
    bills_loaded: bool,
    alerts_sent: bool,
}

impl GoalsPage {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            live_goals: LiveQuery::new(store.clone(), "goals"),
            live_bills: LiveQuery::new(store.clone(), "bills"),
            store,
            session: Session::Guest,
            goals: OptimisticList::new(),
            bills: OptimisticList::new(),
            goals_loaded: false,
            bills_loaded: false,
            alerts_sent: false,
        }
    }

    /// React to a session transition. Both collections reload; the
    /// notification sweep re-arms.
    pub fn apply_session(
        &mut self,
        session: Session,
        goals_sink: mpsc::UnboundedSender<TaggedSnapshot>,
        bills_sink: mpsc::UnboundedSender<TaggedSnapshot>,
    ) -> StoreResult<()> {
        self.session = session.clone();
        self.goals.clear();
        self.bills.clear();
        self.goals_loaded = false;
        self.bills_loaded = false;
        self.alerts_sent = false;

        match &session {
            Session::Guest => {
                self.live_goals.teardown();
                self.live_bills.teardown();
                debug!("goals page showing empty guest view");
            }
            Session::Authenticated { .. } => {
                self.live_goals.resubscribe(&Query::new(), goals_sink)?;
                self.live_bills.resubscribe(
                    &Query::new().order_by("dueDate", SortOrder::Ascending),
                    bills_sink,
                )?;
            }
        }
        Ok(())
    }

    pub fn phase(&self) -> ViewPhase {
        match &self.session {
            Session::Guest => ViewPhase::Demo,
            Session::Authenticated { .. } if self.goals_loaded && self.bills_loaded => {
                ViewPhase::Authenticated
            }
            Session::Authenticated { .. } => ViewPhase::Loading,
        }
    }

    pub fn goals(&self) -> &[Goal] {
        self.goals.items()
    }

    pub fn bills(&self) -> &[Bill] {
        self.bills.items()
    }

    /// Feed a goals snapshot through.
    pub fn apply_goals_snapshot(&mut self, snapshot: &TaggedSnapshot) -> bool {
        match self.live_goals.decode(snapshot) {
            Some(goals) => {
                self.goals.reconcile(goals);
                self.goals_loaded = true;
                true
            }
            None => false,
        }
    }

    /// Feed a bills snapshot through. The first snapshot after sign-in
    /// emits one alert per unpaid bill due today.
    pub fn apply_bills_snapshot(
        &mut self,
        snapshot: &TaggedSnapshot,
        notifier: &dyn Notifier,
        today: NaiveDate,
    ) -> bool {
        let Some(bills) = self.live_bills.decode(snapshot) else {
            return false;
        };
        self.bills.reconcile(bills);
        self.bills_loaded = true;

        if !self.alerts_sent {
            self.alerts_sent = true;
            for alert in due_bill_alerts(self.bills.items(), today) {
                notifier.notify(&alert.title, &alert.body);
            }
        }
        true
    }

    /// Create a goal. The list shows it immediately; a failed write
    /// rolls it back.
    pub fn add_goal(&mut self, name: &str, target: i64, deadline: &str) -> Result<()> {
        self.require_signed_in()?;
        let name = name.trim();
        if name.is_empty() {
            bail!("Goal name cannot be empty");
        }
        if target <= 0 {
            bail!("Goal target must be positive");
        }
        if deadline.trim().is_empty() {
            bail!("Goal deadline cannot be empty");
        }

        let goal = Goal::new(name, target, deadline.trim());
        let body = goal.to_body();
        let token = self.goals.insert(goal);

        if let Err(e) = self.store.create("goals", body) {
            warn!(error = %e, "goal create failed, rolling back");
            self.goals.rollback(token);
            return Err(e).context("Failed to save goal");
        }
        Ok(())
    }

    /// Add savings toward a goal.
    pub fn add_savings(&mut self, goal_id: &str, amount: i64) -> Result<()> {
        self.require_signed_in()?;
        if amount <= 0 {
            bail!("Savings amount must be positive");
        }

        let token = self
            .goals
            .modify(goal_id, |g| g.current += amount)
            .context("Goal not found")?;
        let current = self.goals.get(goal_id).map(|g| g.current).unwrap_or(0);

        if let Err(e) = self
            .store
            .update("goals", goal_id, serde_json::json!({"current": current}))
        {
            warn!(error = %e, "savings update failed, rolling back");
            self.goals.rollback(token);
            return Err(e).context("Failed to save progress");
        }
        Ok(())
    }

    /// Create a bill.
    pub fn add_bill(&mut self, name: &str, amount: i64, due_date: NaiveDate) -> Result<()> {
        self.require_signed_in()?;
        let name = name.trim();
        if name.is_empty() {
            bail!("Bill name cannot be empty");
        }
        if amount <= 0 {
            bail!("Bill amount must be positive");
        }

        let bill = Bill::new(name, amount, due_date);
        let body = bill.to_body();
        let token = self.bills.insert(bill);

        if let Err(e) = self.store.create("bills", body) {
            warn!(error = %e, "bill create failed, rolling back");
            self.bills.rollback(token);
            return Err(e).context("Failed to save bill");
        }
        Ok(())
    }

    /// Mark a bill paid. Paid is terminal; marking an already-paid bill
    /// is a no-op.
    pub fn mark_paid(&mut self, bill_id: &str) -> Result<()> {
        self.require_signed_in()?;
        let bill = self.bills.get(bill_id).context("Bill not found")?;
        if bill.paid {
            return Ok(());
        }

        let token = self
            .bills
            .modify(bill_id, |b| b.paid = true)
            .context("Bill not found")?;

        if let Err(e) = self
            .store
            .update("bills", bill_id, serde_json::json!({"paid": true}))
        {
            warn!(error = %e, "bill update failed, rolling back");
            self.bills.rollback(token);
            return Err(e).context("Failed to mark bill paid");
        }
        Ok(())
    }

    fn require_signed_in(&self) -> Result<()> {
        if !self.session.is_authenticated() {
            bail!("Sign in to make changes");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LocalStore;
    use std::sync::Mutex;

    struct RecordingNotifier {
        sent: Mutex<Vec<String>>,
    }

    impl RecordingNotifier {
        fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, _title: &str, body: &str) {
            self.sent.lock().unwrap().push(body.to_string());
        }
    }

    struct Fixture {
        page: GoalsPage,
        goals_rx: mpsc::UnboundedReceiver<TaggedSnapshot>,
        bills_rx: mpsc::UnboundedReceiver<TaggedSnapshot>,
    }

    fn signed_in() -> Fixture {
        let store: Arc<dyn DocumentStore> = Arc::new(LocalStore::open_in_memory().unwrap());
        let mut page = GoalsPage::new(store);

        let (goals_tx, goals_rx) = mpsc::unbounded_channel();
        let (bills_tx, bills_rx) = mpsc::unbounded_channel();
        page.apply_session(
            Session::authenticated("u1", "a@b.com", None),
            goals_tx,
            bills_tx,
        )
        .unwrap();

        Fixture {
            page,
            goals_rx,
            bills_rx,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 28).unwrap()
    }

    #[tokio::test]
    async fn test_guest_view_is_empty_and_read_only() {
        let store: Arc<dyn DocumentStore> = Arc::new(LocalStore::open_in_memory().unwrap());
        let mut page = GoalsPage::new(store);

        let (goals_tx, _g) = mpsc::unbounded_channel();
        let (bills_tx, _b) = mpsc::unbounded_channel();
        page.apply_session(Session::Guest, goals_tx, bills_tx)
            .unwrap();

        assert_eq!(page.phase(), ViewPhase::Demo);
        assert!(page.goals().is_empty());
        assert!(page.add_goal("Trip", 1000, "2026-12-31").is_err());
    }

    #[tokio::test]
    async fn test_add_goal_appears_once_after_snapshot() {
        let mut fx = signed_in();
        fx.page.add_goal("Trip", 5000, "2026-12-31").unwrap();
        assert_eq!(fx.page.goals().len(), 1);

        // Initial empty snapshot, then the snapshot carrying the create.
        while let Ok(snapshot) = fx.goals_rx.try_recv() {
            fx.page.apply_goals_snapshot(&snapshot);
        }

        assert_eq!(fx.page.goals().len(), 1);
        assert_eq!(fx.page.goals()[0].name, "Trip");
    }

    #[tokio::test]
    async fn test_add_goal_validation() {
        let mut fx = signed_in();
        assert!(fx.page.add_goal("", 1000, "2026-12-31").is_err());
        assert!(fx.page.add_goal("Trip", 0, "2026-12-31").is_err());
        assert!(fx.page.add_goal("Trip", 1000, "  ").is_err());
        assert!(fx.page.goals().is_empty());
    }

    #[tokio::test]
    async fn test_add_savings_updates_progress() {
        let mut fx = signed_in();
        fx.page.add_goal("Trip", 5000, "2026-12-31").unwrap();
        let id = fx.page.goals()[0].id.clone();

        fx.page.add_savings(&id, 2500).unwrap();
        assert_eq!(fx.page.goals()[0].current, 2500);
        assert_eq!(fx.page.goals()[0].progress_percent(), 50);

        assert!(fx.page.add_savings(&id, 0).is_err());
        assert!(fx.page.add_savings("missing", 100).is_err());
    }

    #[tokio::test]
    async fn test_mark_paid_is_idempotent() {
        let mut fx = signed_in();
        fx.page.add_bill("Rent", 8000, today()).unwrap();
        let id = fx.page.bills()[0].id.clone();

        fx.page.mark_paid(&id).unwrap();
        assert!(fx.page.bills()[0].paid);

        // Second call is a no-op, not an error.
        fx.page.mark_paid(&id).unwrap();
        assert!(fx.page.bills()[0].paid);
    }

    #[tokio::test]
    async fn test_first_bills_snapshot_sends_due_alerts_once() {
        let store: Arc<dyn DocumentStore> = Arc::new(LocalStore::open_in_memory().unwrap());
        store
            .create(
                "bills",
                Bill::new("Rent", 8000, today()).to_body(),
            )
            .unwrap();

        let mut page = GoalsPage::new(store);
        let (goals_tx, _g) = mpsc::unbounded_channel();
        let (bills_tx, mut bills_rx) = mpsc::unbounded_channel();
        page.apply_session(
            Session::authenticated("u1", "a@b.com", None),
            goals_tx,
            bills_tx,
        )
        .unwrap();

        let notifier = RecordingNotifier::new();
        let snapshot = bills_rx.try_recv().unwrap();
        page.apply_bills_snapshot(&snapshot, &notifier, today());

        {
            let sent = notifier.sent.lock().unwrap();
            assert_eq!(sent.len(), 1);
            assert_eq!(sent[0], "Rent ₹8000 is due today!");
        }

        // Later snapshots do not re-alert.
        page.add_bill("Internet", 599, today()).unwrap();
        while let Ok(snapshot) = bills_rx.try_recv() {
            page.apply_bills_snapshot(&snapshot, &notifier, today());
        }
        assert_eq!(notifier.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_loading_until_both_snapshots() {
        let mut fx = signed_in();
        assert_eq!(fx.page.phase(), ViewPhase::Loading);

        let snapshot = fx.goals_rx.try_recv().unwrap();
        fx.page.apply_goals_snapshot(&snapshot);
        assert_eq!(fx.page.phase(), ViewPhase::Loading);

        let notifier = RecordingNotifier::new();
        let snapshot = fx.bills_rx.try_recv().unwrap();
        fx.page.apply_bills_snapshot(&snapshot, &notifier, today());
        assert_eq!(fx.page.phase(), ViewPhase::Authenticated);
    }
}
