//! Community command handlers

use std::sync::Arc;

use anyhow::{bail, Result};
use tokio::sync::mpsc;

use gullak_core::pages::CommunityPage;
use gullak_core::view::TaggedSnapshot;
use gullak_core::{DocumentStore, Session};

use crate::output::Output;

/// The community page plus its snapshot channels.
pub struct OpenPage {
    page: CommunityPage,
    channels_rx: mpsc::UnboundedReceiver<TaggedSnapshot>,
    messages_rx: Option<mpsc::UnboundedReceiver<TaggedSnapshot>>,
}

impl OpenPage {
    fn drain(&mut self) {
        while let Ok(snapshot) = self.channels_rx.try_recv() {
            self.page.apply_channels_snapshot(&snapshot);
        }
        if let Some(rx) = self.messages_rx.as_mut() {
            while let Ok(snapshot) = rx.try_recv() {
                self.page.apply_messages_snapshot(&snapshot);
            }
        }
    }

    fn select(&mut self, channel: &str) -> Result<()> {
        let id = self.resolve_channel(channel)?;
        let (tx, rx) = mpsc::unbounded_channel();
        self.page.select_channel(&id, tx)?;
        self.messages_rx = Some(rx);
        self.drain();
        Ok(())
    }

    /// Accepts a channel id prefix or an exact channel name.
    fn resolve_channel(&self, needle: &str) -> Result<String> {
        if let Some(channel) = self.page.channels().iter().find(|c| c.name == needle) {
            return Ok(channel.id.clone());
        }
        super::resolve_id(self.page.channels().iter().map(|c| c.id.as_str()), needle)
            .map_err(|_| anyhow::anyhow!("No channel matches '{}'", needle))
    }
}

/// Open the page and load the channel list.
pub fn open(store: Arc<dyn DocumentStore>, session: Session) -> Result<OpenPage> {
    let mut page = CommunityPage::new(store);
    let (tx, channels_rx) = mpsc::unbounded_channel();
    page.open(session, tx)?;

    let mut open = OpenPage {
        page,
        channels_rx,
        messages_rx: None,
    };
    open.drain();
    Ok(open)
}

/// List channels
pub fn channels(open: &mut OpenPage, output: &Output) -> Result<()> {
    open.drain();
    output.print_channels(open.page.channels());
    Ok(())
}

/// Create a channel
pub fn create(open: &mut OpenPage, name: &str, output: &Output) -> Result<()> {
    open.page.create_channel(name)?;
    open.drain();
    output.success(&format!("Created channel '{}'", name.trim()));
    Ok(())
}

/// Show a channel's messages
pub fn messages(open: &mut OpenPage, channel: &str, output: &Output) -> Result<()> {
    open.select(channel)?;
    output.print_channel_messages(open.page.messages());
    Ok(())
}

/// Post a message to a channel
pub fn post(open: &mut OpenPage, channel: &str, text: &str, output: &Output) -> Result<()> {
    if text.trim().is_empty() {
        bail!("Message cannot be empty");
    }
    open.select(channel)?;
    open.page.send_message(text)?;
    open.drain();
    output.success("Message posted");
    Ok(())
}
