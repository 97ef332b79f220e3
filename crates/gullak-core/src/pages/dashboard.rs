//! Dashboard page controller
//!
//! Headline numbers plus the user's recent transactions. Guests see the
//! fixed demo dataset; signed-in users get a one-shot profile read and a
//! live transaction feed ordered newest first.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use crate::models::{ProfileSummary, Session, Transaction, TransactionKind};
use crate::store::{DocumentStore, FromDocument, Query, SortOrder, StoreResult};
use crate::view::{demo, LiveQuery, TaggedSnapshot, ViewPhase, ViewState};

pub struct DashboardPage {
    store: Arc<dyn DocumentStore>,
    session: Session,
    state: ViewState<Transaction>,
    summary: ProfileSummary,
    live: LiveQuery<Transaction>,
}

impl DashboardPage {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            live: LiveQuery::new(store.clone(), "transactions"),
            store,
            session: Session::Guest,
            state: ViewState::new(),
            summary: ProfileSummary::default(),
        }
    }

    /// React to a session transition.
    ///
    /// Guests resolve to demo data immediately. A signed-in session
    /// stays in `Loading` until the first transaction snapshot arrives
    /// through `sink`.
    pub fn apply_session(
        &mut self,
        session: Session,
        sink: mpsc::UnboundedSender<TaggedSnapshot>,
    ) -> StoreResult<()> {
        self.state.begin_loading();
        self.session = session.clone();

        match &session {
            Session::Guest => {
                self.live.teardown();
                self.summary = demo::demo_summary();
                self.state.show_demo(demo::demo_transactions());
                debug!("dashboard showing demo data");
            }
            Session::Authenticated { id, .. } => {
                self.summary = self.load_summary(id)?;
                let query = Query::new()
                    .filter("userId", id.as_str())
                    .order_by("time", SortOrder::Descending);
                self.live.resubscribe(&query, sink)?;
            }
        }
        Ok(())
    }

    fn load_summary(&self, user_id: &str) -> StoreResult<ProfileSummary> {
        let docs = self
            .store
            .get_once("users", &Query::new().filter("userId", user_id))?;
        Ok(docs
            .first()
            .and_then(ProfileSummary::from_document)
            .unwrap_or_default())
    }

    /// Feed a transaction snapshot through. Returns `true` when the
    /// snapshot was current and the view updated.
    pub fn apply_snapshot(&mut self, snapshot: &TaggedSnapshot) -> bool {
        match self.live.decode(snapshot) {
            Some(transactions) => {
                self.state.show_authenticated(transactions);
                true
            }
            None => false,
        }
    }

    pub fn phase(&self) -> ViewPhase {
        self.state.phase()
    }

    pub fn summary(&self) -> &ProfileSummary {
        &self.summary
    }

    pub fn transactions(&self) -> &[Transaction] {
        self.state.entities()
    }

    pub fn greeting_name(&self) -> String {
        self.session.greeting_name()
    }

    /// Absolute amounts of the most recent expenses, up to seven, for
    /// the spending chart.
    pub fn weekly_expenses(&self) -> Vec<i64> {
        self.state
            .entities()
            .iter()
            .filter(|t| t.kind == TransactionKind::Expense)
            .take(7)
            .map(|t| t.amount.abs())
            .collect()
    }
}
