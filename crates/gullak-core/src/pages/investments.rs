//! Investments page controller
//!
//! Live per-user portfolio with optimistic mutations. An empty portfolio
//! can show placeholder demo holdings; demo entries never count toward
//! totals, never reach the store, and reject every mutation. Signed-in
//! users can ask the advisor one-shot portfolio questions; the replies
//! are kept newest first, capped at the last ten.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use tokio::sync::mpsc;
use tracing::warn;

use crate::advisor::{AdviceRequest, AdvisorError, FAILURE_REPLY};
use crate::models::{Investment, RiskTier, Session};
use crate::store::{DocumentStore, Query, SortOrder, StoreResult};
use crate::view::{demo, LiveQuery, OptimisticList, TaggedSnapshot, ViewPhase};

const AI_REPLY_LIMIT: usize = 10;

pub struct InvestmentsPage {
    store: Arc<dyn DocumentStore>,
    session: Session,
    list: OptimisticList<Investment>,
    live: LiveQuery<Investment>,
    loaded: bool,
    demo_shown: bool,
    ai_replies: Vec<String>,
}

impl InvestmentsPage {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            live: LiveQuery::new(store.clone(), "investments"),
            store,
            session: Session::Guest,
            list: OptimisticList::new(),
            loaded: false,
            demo_shown: false,
            ai_replies: Vec::new(),
        }
    }

    /// React to a session transition.
    pub fn apply_session(
        &mut self,
        session: Session,
        sink: mpsc::UnboundedSender<TaggedSnapshot>,
    ) -> StoreResult<()> {
        self.session = session.clone();
        self.list.clear();
        self.loaded = false;
        self.demo_shown = false;
        self.ai_replies.clear();

        match &session {
            Session::Guest => {
                self.live.teardown();
            }
            Session::Authenticated { id, .. } => {
                let query = Query::new()
                    .filter("userId", id.as_str())
                    .order_by("createdAt", SortOrder::Ascending);
                self.live.resubscribe(&query, sink)?;
            }
        }
        Ok(())
    }

    pub fn phase(&self) -> ViewPhase {
        match &self.session {
            Session::Guest => ViewPhase::Demo,
            Session::Authenticated { .. } if self.loaded => ViewPhase::Authenticated,
            Session::Authenticated { .. } => ViewPhase::Loading,
        }
    }

    /// Feed a portfolio snapshot through.
    pub fn apply_snapshot(&mut self, snapshot: &TaggedSnapshot) -> bool {
        match self.live.decode(snapshot) {
            Some(items) => {
                self.list.reconcile(items);
                self.loaded = true;
                // Real holdings displace the placeholders.
                if !self.list.is_empty() && !self.list.items().iter().all(|i| i.is_demo) {
                    self.demo_shown = false;
                }
                true
            }
            None => false,
        }
    }

    /// Show placeholder holdings on an empty, signed-in portfolio.
    pub fn show_demo_holdings(&mut self) -> Result<()> {
        self.require_signed_in()?;
        if !self.list.is_empty() {
            bail!("Portfolio is not empty");
        }
        self.list.replace(demo::demo_investments());
        self.demo_shown = true;
        Ok(())
    }

    /// The holdings currently on screen, placeholders included.
    pub fn investments(&self) -> &[Investment] {
        self.list.items()
    }

    /// Total invested across real holdings. Demo entries never count.
    pub fn total_invested(&self) -> i64 {
        self.real().map(|i| i.invested).sum()
    }

    /// Current value across real holdings.
    pub fn total_current(&self) -> i64 {
        self.real().map(|i| i.current).sum()
    }

    /// Overall return percentage, or `None` when nothing is invested.
    pub fn returns_percent(&self) -> Option<f64> {
        let invested = self.total_invested();
        if invested == 0 {
            return None;
        }
        let gain = (self.total_current() - invested) as f64;
        Some(gain / invested as f64 * 100.0)
    }

    /// One holding's share of the real portfolio by invested amount.
    pub fn allocation_percent(&self, id: &str) -> Option<f64> {
        let total = self.total_invested();
        if total == 0 {
            return None;
        }
        let item = self.list.get(id).filter(|i| !i.is_demo)?;
        Some(item.invested as f64 / total as f64 * 100.0)
    }

    fn real(&self) -> impl Iterator<Item = &Investment> {
        self.list.items().iter().filter(|i| !i.is_demo)
    }

    /// Add a holding. Placeholders clear the moment a real one exists.
    pub fn add(
        &mut self,
        name: &str,
        kind: &str,
        invested: i64,
        current: i64,
        risk: RiskTier,
    ) -> Result<()> {
        let user_id = self.require_signed_in()?;
        let name = name.trim();
        if name.is_empty() {
            bail!("Investment name cannot be empty");
        }
        if invested <= 0 {
            bail!("Invested amount must be positive");
        }

        if self.demo_shown {
            self.list.clear();
            self.demo_shown = false;
        }

        let investment = Investment::new(name, kind, invested, current.max(0), risk);
        let body = investment.to_body(&user_id, Utc::now());
        let token = self.list.insert(investment);

        if let Err(e) = self.store.create("investments", body) {
            warn!(error = %e, "investment create failed, rolling back");
            self.list.rollback(token);
            return Err(e).context("Failed to save investment");
        }
        Ok(())
    }

    /// Add to an existing holding's invested and current amounts.
    pub fn add_savings(&mut self, id: &str, amount: i64) -> Result<()> {
        self.require_signed_in()?;
        if amount <= 0 {
            bail!("Amount must be positive");
        }
        self.reject_demo(id)?;

        let token = self
            .list
            .modify(id, |i| {
                i.invested += amount;
                i.current += amount;
            })
            .context("Investment not found")?;
        let (invested, current) = self
            .list
            .get(id)
            .map(|i| (i.invested, i.current))
            .unwrap_or_default();

        if let Err(e) = self.store.update(
            "investments",
            id,
            serde_json::json!({"invested": invested, "current": current}),
        ) {
            warn!(error = %e, "investment update failed, rolling back");
            self.list.rollback(token);
            return Err(e).context("Failed to save investment");
        }
        Ok(())
    }

    /// Sell part of a holding; amounts clamp at zero.
    pub fn sell(&mut self, id: &str, amount: i64) -> Result<()> {
        self.require_signed_in()?;
        if amount <= 0 {
            bail!("Amount must be positive");
        }
        self.reject_demo(id)?;

        let token = self
            .list
            .modify(id, |i| {
                i.invested = (i.invested - amount).max(0);
                i.current = (i.current - amount).max(0);
            })
            .context("Investment not found")?;
        let (invested, current) = self
            .list
            .get(id)
            .map(|i| (i.invested, i.current))
            .unwrap_or_default();

        if let Err(e) = self.store.update(
            "investments",
            id,
            serde_json::json!({"invested": invested, "current": current}),
        ) {
            warn!(error = %e, "investment update failed, rolling back");
            self.list.rollback(token);
            return Err(e).context("Failed to save investment");
        }
        Ok(())
    }

    /// Delete a holding.
    pub fn delete(&mut self, id: &str) -> Result<()> {
        self.require_signed_in()?;
        self.reject_demo(id)?;

        let token = self.list.remove(id).context("Investment not found")?;
        if let Err(e) = self.store.delete("investments", id) {
            warn!(error = %e, "investment delete failed, rolling back");
            self.list.rollback(token);
            return Err(e).context("Failed to delete investment");
        }
        Ok(())
    }

    /// Start an advisor question about the portfolio.
    pub fn begin_ask(&self, question: &str) -> Result<AdviceRequest> {
        let user_id = self.require_signed_in()?;
        let question = question.trim();
        if question.is_empty() {
            bail!("Question cannot be empty");
        }
        Ok(AdviceRequest::for_portfolio(&user_id, question))
    }

    /// Record the advisor's answer and return it. A failed request
    /// records the failure text instead.
    pub fn resolve_ask(&mut self, outcome: Result<String, AdvisorError>) -> &str {
        let reply = match outcome {
            Ok(advice) => advice,
            Err(_) => FAILURE_REPLY.to_string(),
        };
        self.ai_replies.insert(0, reply);
        self.ai_replies.truncate(AI_REPLY_LIMIT);
        &self.ai_replies[0]
    }

    /// Advisor replies so far, newest first.
    pub fn ai_replies(&self) -> &[String] {
        &self.ai_replies
    }

    fn reject_demo(&self, id: &str) -> Result<()> {
        if self.list.get(id).is_some_and(|i| i.is_demo) {
            bail!("Demo investments cannot be modified.");
        }
        Ok(())
    }

    fn require_signed_in(&self) -> Result<String> {
        match self.session.user_id() {
            Some(id) => Ok(id.to_string()),
            None => bail!("Sign in to manage investments"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LocalStore;

    struct Fixture {
        page: InvestmentsPage,
        rx: mpsc::UnboundedReceiver<TaggedSnapshot>,
    }

    impl Fixture {
        fn drain(&mut self) {
            while let Ok(snapshot) = self.rx.try_recv() {
                self.page.apply_snapshot(&snapshot);
            }
        }
    }

    fn signed_in() -> Fixture {
        let store: Arc<dyn DocumentStore> = Arc::new(LocalStore::open_in_memory().unwrap());
        let mut page = InvestmentsPage::new(store);

        let (tx, rx) = mpsc::unbounded_channel();
        page.apply_session(Session::authenticated("u1", "a@b.com", None), tx)
            .unwrap();

        Fixture { page, rx }
    }

    #[tokio::test]
    async fn test_add_and_totals() {
        let mut fx = signed_in();
        fx.page
            .add("Nifty Index", "Mutual Fund", 10_000, 11_000, RiskTier::Medium)
            .unwrap();
        fx.page
            .add("Gold ETF", "ETF", 5_000, 4_500, RiskTier::Low)
            .unwrap();
        fx.drain();

        assert_eq!(fx.page.investments().len(), 2);
        assert_eq!(fx.page.total_invested(), 15_000);
        assert_eq!(fx.page.total_current(), 15_500);

        let returns = fx.page.returns_percent().unwrap();
        assert!((returns - 3.333).abs() < 0.01);
    }

    #[tokio::test]
    async fn test_returns_sentinel_when_nothing_invested() {
        let fx = signed_in();
        assert_eq!(fx.page.returns_percent(), None);
    }

    #[tokio::test]
    async fn test_demo_holdings_excluded_from_totals() {
        let mut fx = signed_in();
        fx.drain();
        fx.page.show_demo_holdings().unwrap();

        assert_eq!(fx.page.investments().len(), 2);
        assert_eq!(fx.page.total_invested(), 0);
        assert_eq!(fx.page.returns_percent(), None);
    }

    #[tokio::test]
    async fn test_demo_holdings_reject_mutations() {
        let mut fx = signed_in();
        fx.drain();
        fx.page.show_demo_holdings().unwrap();

        let err = fx.page.sell("demo-1", 100).unwrap_err();
        assert_eq!(err.to_string(), "Demo investments cannot be modified.");
        assert!(fx.page.delete("demo-2").is_err());
        assert!(fx.page.add_savings("demo-1", 100).is_err());
    }

    #[tokio::test]
    async fn test_adding_real_holding_clears_placeholders() {
        let mut fx = signed_in();
        fx.drain();
        fx.page.show_demo_holdings().unwrap();

        fx.page
            .add("Nifty Index", "Mutual Fund", 10_000, 10_000, RiskTier::Medium)
            .unwrap();

        assert_eq!(fx.page.investments().len(), 1);
        assert!(!fx.page.investments()[0].is_demo);
    }

    #[tokio::test]
    async fn test_sell_clamps_at_zero() {
        let mut fx = signed_in();
        fx.page
            .add("Nifty Index", "Mutual Fund", 1_000, 900, RiskTier::Medium)
            .unwrap();
        let id = fx.page.investments()[0].id.clone();

        fx.page.sell(&id, 5_000).unwrap();
        assert_eq!(fx.page.investments()[0].invested, 0);
        assert_eq!(fx.page.investments()[0].current, 0);
    }

    #[tokio::test]
    async fn test_delete_removes_holding() {
        let mut fx = signed_in();
        fx.page
            .add("Nifty Index", "Mutual Fund", 1_000, 1_000, RiskTier::Medium)
            .unwrap();
        let id = fx.page.investments()[0].id.clone();

        fx.page.delete(&id).unwrap();
        fx.drain();
        assert!(fx.page.investments().is_empty());
    }

    #[tokio::test]
    async fn test_guest_cannot_mutate() {
        let store: Arc<dyn DocumentStore> = Arc::new(LocalStore::open_in_memory().unwrap());
        let mut page = InvestmentsPage::new(store);
        let (tx, _rx) = mpsc::unbounded_channel();
        page.apply_session(Session::Guest, tx).unwrap();

        assert!(page
            .add("Nifty Index", "Mutual Fund", 1_000, 1_000, RiskTier::Medium)
            .is_err());
        assert!(page.show_demo_holdings().is_err());
    }

    #[tokio::test]
    async fn test_sign_out_clears_portfolio() {
        let mut fx = signed_in();
        fx.page
            .add("Nifty Index", "Mutual Fund", 1_000, 1_000, RiskTier::Medium)
            .unwrap();
        fx.page.resolve_ask(Ok("Diversify.".to_string()));
        fx.drain();

        let (tx, _rx) = mpsc::unbounded_channel();
        fx.page.apply_session(Session::Guest, tx).unwrap();
        assert!(fx.page.investments().is_empty());
        assert!(fx.page.ai_replies().is_empty());
        assert_eq!(fx.page.phase(), ViewPhase::Demo);
    }

    #[tokio::test]
    async fn test_ask_requires_session_and_text() {
        let store: Arc<dyn DocumentStore> = Arc::new(LocalStore::open_in_memory().unwrap());
        let page = InvestmentsPage::new(store);
        assert!(page.begin_ask("Should I rebalance?").is_err());

        let fx = signed_in();
        assert!(fx.page.begin_ask("   ").is_err());

        let request = fx.page.begin_ask("Should I rebalance?").unwrap();
        assert_eq!(request.query.as_deref(), Some("Should I rebalance?"));
        assert_eq!(request.user_id.as_deref(), Some("u1"));
    }

    #[tokio::test]
    async fn test_ask_replies_newest_first_capped_at_ten() {
        let mut fx = signed_in();
        for i in 0..12 {
            fx.page.resolve_ask(Ok(format!("advice {i}")));
        }
        assert_eq!(fx.page.ai_replies().len(), 10);
        assert_eq!(fx.page.ai_replies()[0], "advice 11");
        assert_eq!(fx.page.ai_replies()[9], "advice 2");
    }

    #[tokio::test]
    async fn test_ask_failure_records_failure_text() {
        let mut fx = signed_in();
        let reply = fx.page.resolve_ask(Err(AdvisorError::NotConfigured));
        assert_eq!(reply, FAILURE_REPLY);
        assert_eq!(fx.page.ai_replies(), [FAILURE_REPLY]);
    }
}
