//! Goal and bill command handlers

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use tokio::sync::mpsc;

use gullak_core::notify::{ConsoleNotifier, Notifier, Permission};
use gullak_core::pages::GoalsPage;
use gullak_core::view::TaggedSnapshot;
use gullak_core::{Config, DocumentStore, Session};

use crate::output::Output;

/// The goals page plus its snapshot channels, drained after every
/// mutation so output reflects the store.
pub struct OpenPage {
    page: GoalsPage,
    goals_rx: mpsc::UnboundedReceiver<TaggedSnapshot>,
    bills_rx: mpsc::UnboundedReceiver<TaggedSnapshot>,
    notifier: Box<dyn Notifier>,
    today: NaiveDate,
}

impl OpenPage {
    fn drain(&mut self) {
        while let Ok(snapshot) = self.goals_rx.try_recv() {
            self.page.apply_goals_snapshot(&snapshot);
        }
        while let Ok(snapshot) = self.bills_rx.try_recv() {
            self.page
                .apply_bills_snapshot(&snapshot, self.notifier.as_ref(), self.today);
        }
    }
}

/// Open the page for the session and load the initial snapshots. Due
/// bill alerts fire here, once.
pub fn open(
    store: Arc<dyn DocumentStore>,
    session: Session,
    config: &Config,
    _output: &Output,
) -> Result<OpenPage> {
    let permission = if config.notifications_enabled {
        Permission::Granted
    } else {
        Permission::Denied
    };

    let mut page = GoalsPage::new(store);
    let (goals_tx, goals_rx) = mpsc::unbounded_channel();
    let (bills_tx, bills_rx) = mpsc::unbounded_channel();
    page.apply_session(session, goals_tx, bills_tx)?;

    let mut open = OpenPage {
        page,
        goals_rx,
        bills_rx,
        notifier: Box::new(ConsoleNotifier::new(permission)),
        today: Local::now().date_naive(),
    };
    open.drain();
    Ok(open)
}

/// List goals
pub fn list(open: &mut OpenPage, output: &Output) -> Result<()> {
    open.drain();
    output.print_goals(open.page.goals());
    Ok(())
}

/// Create a goal
pub fn create(
    open: &mut OpenPage,
    name: &str,
    target: i64,
    deadline: &str,
    output: &Output,
) -> Result<()> {
    open.page.add_goal(name, target, deadline)?;
    open.drain();
    output.success(&format!("Added goal '{}'", name.trim()));
    Ok(())
}

/// Add savings toward a goal
pub fn save(open: &mut OpenPage, id: &str, amount: i64, output: &Output) -> Result<()> {
    let id = super::resolve_id(open.page.goals().iter().map(|g| g.id.as_str()), id)?;
    open.page.add_savings(&id, amount)?;
    open.drain();

    let goal = open.page.goals().iter().find(|g| g.id == id);
    match goal {
        Some(g) if g.is_achieved() => {
            output.success(&format!("'{}' reached its target 🎉", g.name))
        }
        Some(g) => output.success(&format!(
            "Saved ₹{} toward '{}' ({}%)",
            crate::output::rupees(amount),
            g.name,
            g.progress_percent()
        )),
        None => output.success("Savings recorded"),
    }
    Ok(())
}

/// List bills
pub fn bill_list(open: &mut OpenPage, output: &Output) -> Result<()> {
    open.drain();
    output.print_bills(open.page.bills(), open.today);
    Ok(())
}

/// Create a bill
pub fn bill_create(
    open: &mut OpenPage,
    name: &str,
    amount: i64,
    due: &str,
    output: &Output,
) -> Result<()> {
    let due: NaiveDate = due
        .parse()
        .with_context(|| format!("Invalid due date '{}'. Use YYYY-MM-DD.", due))?;
    open.page.add_bill(name, amount, due)?;
    open.drain();
    output.success(&format!("Added bill '{}'", name.trim()));
    Ok(())
}

/// Mark a bill paid
pub fn bill_pay(open: &mut OpenPage, id: &str, output: &Output) -> Result<()> {
    let id = super::resolve_id(open.page.bills().iter().map(|b| b.id.as_str()), id)?;
    open.page.mark_paid(&id)?;
    open.drain();
    output.success("Bill marked paid");
    Ok(())
}
