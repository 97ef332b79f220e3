//! Community page controller
//!
//! A channel list (newest first) and one message stream for the selected
//! channel (oldest first). Switching channels tears down the old message
//! subscription before opening the new one, so a queued snapshot from
//! the previous channel can never land in the new view.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::models::{Channel, ChannelMessage, Session};
use crate::store::{DocumentStore, Query, SortOrder, StoreResult};
use crate::view::{LiveQuery, TaggedSnapshot};

pub struct CommunityPage {
    store: Arc<dyn DocumentStore>,
    session: Session,
    channels: Vec<Channel>,
    messages: Vec<ChannelMessage>,
    selected: Option<String>,
    live_channels: LiveQuery<Channel>,
    live_messages: LiveQuery<ChannelMessage>,
}

impl CommunityPage {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            live_channels: LiveQuery::new(store.clone(), "channels"),
            live_messages: LiveQuery::new(store.clone(), "channel_messages"),
            store,
            session: Session::Guest,
            channels: Vec::new(),
            messages: Vec::new(),
            selected: None,
        }
    }

    /// Open the channel list. Channels are shared; the subscription does
    /// not depend on the session.
    pub fn open(
        &mut self,
        session: Session,
        channels_sink: mpsc::UnboundedSender<TaggedSnapshot>,
    ) -> StoreResult<()> {
        self.session = session;
        self.channels.clear();
        self.messages.clear();
        self.selected = None;
        self.live_messages.teardown();

        self.live_channels.resubscribe(
            &Query::new().order_by("createdAt", SortOrder::Descending),
            channels_sink,
        )
    }

    /// Switch the message stream to a channel.
    pub fn select_channel(
        &mut self,
        channel_id: &str,
        messages_sink: mpsc::UnboundedSender<TaggedSnapshot>,
    ) -> StoreResult<()> {
        debug!(channel_id, "switching channel");
        self.selected = Some(channel_id.to_string());
        self.messages.clear();

        self.live_messages.resubscribe(
            &Query::new()
                .filter("channelId", channel_id)
                .order_by("createdAt", SortOrder::Ascending),
            messages_sink,
        )
    }

    pub fn apply_channels_snapshot(&mut self, snapshot: &TaggedSnapshot) -> bool {
        match self.live_channels.decode(snapshot) {
            Some(channels) => {
                self.channels = channels;
                true
            }
            None => false,
        }
    }

    pub fn apply_messages_snapshot(&mut self, snapshot: &TaggedSnapshot) -> bool {
        match self.live_messages.decode(snapshot) {
            Some(messages) => {
                self.messages = messages;
                true
            }
            None => false,
        }
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn messages(&self) -> &[ChannelMessage] {
        &self.messages
    }

    pub fn selected_channel(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Create a channel owned by the current user.
    pub fn create_channel(&mut self, name: &str) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            bail!("Channel name cannot be empty");
        }

        let owner = self.session.email().unwrap_or("Anonymous");
        self.store
            .create(
                "channels",
                serde_json::json!({
                    "name": name,
                    "owner": owner,
                    "createdAt": Utc::now().to_rfc3339(),
                }),
            )
            .context("Failed to create channel")
    }

    /// Post a message to the selected channel.
    pub fn send_message(&mut self, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            bail!("Message cannot be empty");
        }
        let channel_id = self.selected.clone().context("No channel selected")?;

        let user = self.session.email().unwrap_or("Anonymous");
        if let Err(e) = self.store.create(
            "channel_messages",
            serde_json::json!({
                "channelId": channel_id,
                "text": text,
                "user": user,
                "createdAt": Utc::now().to_rfc3339(),
            }),
        ) {
            warn!(error = %e, "message send failed");
            return Err(e).context("Failed to send message");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LocalStore;

    struct Fixture {
        page: CommunityPage,
        channels_rx: mpsc::UnboundedReceiver<TaggedSnapshot>,
    }

    fn open_page() -> Fixture {
        let store: Arc<dyn DocumentStore> = Arc::new(LocalStore::open_in_memory().unwrap());
        let mut page = CommunityPage::new(store);

        let (tx, channels_rx) = mpsc::unbounded_channel();
        page.open(Session::authenticated("u1", "a@b.com", None), tx)
            .unwrap();

        Fixture { page, channels_rx }
    }

    #[tokio::test]
    async fn test_channel_list_newest_first() {
        let mut fx = open_page();
        fx.page.create_channel("Savings Tips").unwrap();
        fx.page.create_channel("Tax Talk").unwrap();

        // Timestamps may collide within a tick; order by createdAt still
        // resolves because creation times are RFC 3339 strings.
        while let Ok(snapshot) = fx.channels_rx.try_recv() {
            fx.page.apply_channels_snapshot(&snapshot);
        }

        assert_eq!(fx.page.channels().len(), 2);
        assert_eq!(fx.page.channels()[0].owner, "a@b.com");
    }

    #[tokio::test]
    async fn test_switching_channels_drops_stale_messages() {
        let mut fx = open_page();
        let a = fx.page.create_channel("Channel A").unwrap();
        let b = fx.page.create_channel("Channel B").unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        fx.page.select_channel(&a, tx.clone()).unwrap();
        fx.page.send_message("hello from A").unwrap();

        // Drain channel A's snapshots, keeping the last for staleness.
        let mut stale = None;
        while let Ok(snapshot) = rx.try_recv() {
            stale = Some(snapshot);
        }
        let stale = stale.unwrap();

        fx.page.select_channel(&b, tx).unwrap();

        // The queued snapshot from channel A must not surface in B.
        assert!(!fx.page.apply_messages_snapshot(&stale));

        let fresh = rx.recv().await.unwrap();
        // Skip anything still tagged with the old generation.
        if fx.page.apply_messages_snapshot(&fresh) {
            assert!(fx.page.messages().is_empty());
        }
    }

    #[tokio::test]
    async fn test_messages_scoped_to_channel() {
        let mut fx = open_page();
        let a = fx.page.create_channel("Channel A").unwrap();
        let b = fx.page.create_channel("Channel B").unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        fx.page.select_channel(&a, tx.clone()).unwrap();
        fx.page.send_message("only in A").unwrap();

        fx.page.select_channel(&b, tx).unwrap();
        let mut last = None;
        while let Ok(snapshot) = rx.try_recv() {
            if fx.page.apply_messages_snapshot(&snapshot) {
                last = Some(fx.page.messages().len());
            }
        }

        assert_eq!(last, Some(0));
    }

    #[tokio::test]
    async fn test_send_requires_selected_channel() {
        let mut fx = open_page();
        assert!(fx.page.send_message("hello").is_err());
        assert!(fx.page.create_channel("  ").is_err());
    }

    #[tokio::test]
    async fn test_guest_posts_as_anonymous() {
        let store: Arc<dyn DocumentStore> = Arc::new(LocalStore::open_in_memory().unwrap());
        let mut page = CommunityPage::new(store);
        let (tx, mut channels_rx) = mpsc::unbounded_channel();
        page.open(Session::Guest, tx).unwrap();

        page.create_channel("Open Floor").unwrap();
        while let Ok(snapshot) = channels_rx.try_recv() {
            page.apply_channels_snapshot(&snapshot);
        }

        assert_eq!(page.channels()[0].owner, "Anonymous");
    }
}
