//! Investment command handlers

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;

use gullak_core::models::RiskTier;
use gullak_core::pages::InvestmentsPage;
use gullak_core::view::TaggedSnapshot;
use gullak_core::{AdvisorClient, Config, DocumentStore, Session};

use crate::output::Output;

/// The investments page plus its snapshot channel.
pub struct OpenPage {
    page: InvestmentsPage,
    rx: mpsc::UnboundedReceiver<TaggedSnapshot>,
}

impl OpenPage {
    fn drain(&mut self) {
        while let Ok(snapshot) = self.rx.try_recv() {
            self.page.apply_snapshot(&snapshot);
        }
    }
}

/// Open the page for the session and load the initial snapshot.
pub fn open(store: Arc<dyn DocumentStore>, session: Session) -> Result<OpenPage> {
    let mut page = InvestmentsPage::new(store);
    let (tx, rx) = mpsc::unbounded_channel();
    page.apply_session(session, tx)?;

    let mut open = OpenPage { page, rx };
    open.drain();
    Ok(open)
}

/// List holdings with totals
pub fn list(open: &mut OpenPage, output: &Output) -> Result<()> {
    open.drain();
    output.print_investments(
        open.page.investments(),
        open.page.total_invested(),
        open.page.total_current(),
        open.page.returns_percent(),
    );
    Ok(())
}

/// Add a holding
pub fn create(
    open: &mut OpenPage,
    name: &str,
    kind: &str,
    invested: i64,
    current: i64,
    risk: &str,
    output: &Output,
) -> Result<()> {
    let risk: RiskTier = risk
        .parse()
        .map_err(|e: String| anyhow::anyhow!("{}. Use low, medium, or high.", e))?;

    open.page.add(name, kind, invested, current, risk)?;
    open.drain();
    output.success(&format!("Added '{}'", name.trim()));
    Ok(())
}

/// Add to a holding
pub fn save(open: &mut OpenPage, id: &str, amount: i64, output: &Output) -> Result<()> {
    let id = resolve(open, id)?;
    open.page.add_savings(&id, amount)?;
    open.drain();
    output.success(&format!("Added ₹{}", crate::output::rupees(amount)));
    Ok(())
}

/// Sell part of a holding
pub fn sell(open: &mut OpenPage, id: &str, amount: i64, output: &Output) -> Result<()> {
    let id = resolve(open, id)?;
    open.page.sell(&id, amount)?;
    open.drain();
    output.success(&format!("Sold ₹{}", crate::output::rupees(amount)));
    Ok(())
}

/// Delete a holding
pub fn delete(open: &mut OpenPage, id: &str, output: &Output) -> Result<()> {
    let id = resolve(open, id)?;
    open.page.delete(&id)?;
    open.drain();
    output.success("Investment deleted");
    Ok(())
}

/// Fill an empty portfolio with demo holdings
pub fn demo(open: &mut OpenPage, output: &Output) -> Result<()> {
    open.page.show_demo_holdings()?;
    output.message("Showing demo holdings. They are read-only and excluded from totals.");
    list(open, output)
}

/// Ask the advisor about the portfolio
pub async fn ask(
    open: &mut OpenPage,
    config: &Config,
    question: &str,
    output: &Output,
) -> Result<()> {
    let request = open.page.begin_ask(question)?;

    // Failures land in the reply history as the failure text, the same
    // way chat absorbs them.
    let outcome = match AdvisorClient::from_config(config) {
        Ok(client) => client.ask(&request).await,
        Err(e) => Err(e),
    };
    let reply = open.page.resolve_ask(outcome);
    output.print_advice(reply);
    Ok(())
}

fn resolve(open: &OpenPage, prefix: &str) -> Result<String> {
    super::resolve_id(
        open.page.investments().iter().map(|i| i.id.as_str()),
        prefix,
    )
}
