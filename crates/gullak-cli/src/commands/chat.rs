//! Chat command handler

use anyhow::{bail, Result};

use gullak_core::pages::ChatPage;
use gullak_core::{AdvisorClient, Config, Session};

use crate::output::Output;

/// Ask the advisor one question and print the transcript.
pub async fn ask(
    config: &Config,
    session: Session,
    message: &str,
    output: &Output,
) -> Result<()> {
    let mut page = ChatPage::new(session);

    let Some((turn, request)) = page.begin(message) else {
        bail!("Message cannot be empty");
    };

    // Transport and configuration failures resolve to the failure text
    // in the transcript rather than aborting the command.
    let outcome = match AdvisorClient::from_config(config) {
        Ok(client) => client.ask(&request).await,
        Err(e) => Err(e),
    };
    page.resolve(turn, outcome);

    output.print_chat(page.messages());
    Ok(())
}
