//! Album buffering.
//!
//! Telegram delivers an album as one message per item, all carrying the same
//! `media_group_id`. The first item to arrive opens a collection window;
//! items that arrive inside it are relayed together with it as one turn.

use std::{collections::HashMap, sync::Mutex, time::Duration};

use teloxide::types::{MediaKind, Message, MessageKind};

/// How long the first album item waits for its siblings.
pub const MEDIA_GROUP_WINDOW: Duration = Duration::from_millis(1500);

/// Albums waiting for their collection window to close, keyed by group id.
pub struct MediaGroups {
    window: Duration,
    pending: Mutex<HashMap<String, Vec<Message>>>,
}

impl Default for MediaGroups {
    fn default() -> Self {
        Self::new(MEDIA_GROUP_WINDOW)
    }
}

impl MediaGroups {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: Mutex::new(HashMap::new()),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Buffer `msg` under `group_id`. Returns `true` when it opened the group;
    /// the caller then owns collecting it with [`Self::take`].
    pub(crate) fn push(&self, group_id: &str, msg: Message) -> bool {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        match pending.get_mut(group_id) {
            Some(items) => {
                items.push(msg);
                false
            },
            None => {
                pending.insert(group_id.to_string(), vec![msg]);
                true
            },
        }
    }

    /// Close the group and return its items in message order.
    pub(crate) fn take(&self, group_id: &str) -> Vec<Message> {
        let mut items = self
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(group_id)
            .unwrap_or_default();
        items.sort_by_key(|m| m.id.0);
        items
    }
}

/// The album a message belongs to, if any.
pub(crate) fn media_group_id(msg: &Message) -> Option<String> {
    let MessageKind::Common(common) = &msg.kind else {
        return None;
    };
    let id = match &common.media_kind {
        MediaKind::Photo(p) => p.media_group_id.as_ref(),
        MediaKind::Document(d) => d.media_group_id.as_ref(),
        MediaKind::Audio(a) => a.media_group_id.as_ref(),
        MediaKind::Video(v) => v.media_group_id.as_ref(),
        _ => None,
    };
    id.map(ToString::to_string)
}
