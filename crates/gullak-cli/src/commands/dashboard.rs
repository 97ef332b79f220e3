//! Dashboard command handler

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;

use gullak_core::pages::DashboardPage;
use gullak_core::{DocumentStore, Session};

use crate::output::Output;

/// Show the dashboard for the session.
pub fn show(store: Arc<dyn DocumentStore>, session: Session, output: &Output) -> Result<()> {
    let mut page = DashboardPage::new(store);

    let (tx, mut rx) = mpsc::unbounded_channel();
    page.apply_session(session, tx)?;

    // The local store delivers synchronously, so the first snapshot is
    // already queued.
    while let Ok(snapshot) = rx.try_recv() {
        page.apply_snapshot(&snapshot);
    }

    output.message(&format!("Hi, {} 👋", page.greeting_name()));
    output.print_dashboard(page.summary(), page.transactions());
    Ok(())
}
