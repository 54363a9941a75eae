use super::notification_models::{Notification, TrackedMessage};
use dashmap::DashMap;

// Cap how many messages we keep in memory so we don't grow unbounded.
const MAX_TRACKED_MESSAGES: usize = 5_000;

/// Remembers recent guild messages and turns edits/deletes into notifications.
pub struct AuditService {
    // Message ID -> snapshot
    message_cache: DashMap<u64, TrackedMessage>,
    capacity: usize,
}

impl Default for AuditService {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditService {
    pub fn new() -> Self {
        Self::with_capacity(MAX_TRACKED_MESSAGES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            message_cache: DashMap::new(),
            capacity,
        }
    }

    pub fn remember_message(&self, message: TrackedMessage) {
        self.message_cache.insert(message.message_id, message);

        // Simple eviction: drop an arbitrary entry once we cross the cap.
        if self.message_cache.len() > self.capacity {
            if let Some(first_key) = self.message_cache.iter().next().map(|entry| *entry.key()) {
                self.message_cache.remove(&first_key);
            }
        }
    }

    pub fn tracked_count(&self) -> usize {
        self.message_cache.len()
    }

    /// Forget a deleted message and describe what was lost.
    ///
    /// `fallback` is used when the message was never tracked.
    pub fn message_deleted(
        &self,
        message_id: u64,
        guild_id: u64,
        fallback: Option<TrackedMessage>,
    ) -> Option<Notification> {
        let snapshot = self
            .message_cache
            .remove(&message_id)
            .map(|(_, msg)| msg)
            .or(fallback)?;

        if snapshot.guild_id != guild_id {
            return None;
        }

        Some(Notification::MessageDeleted {
            guild_id,
            channel_id: snapshot.channel_id,
            author_id: snapshot.author_id,
            author_name: snapshot.author_name,
            content: snapshot.content,
            attachments: snapshot.attachments,
        })
    }

    /// Record new content for a message and describe the change.
    ///
    /// Returns `None` when the content did not change or nothing is known about
    /// the previous version.
    pub fn message_edited(
        &self,
        message_id: u64,
        guild_id: u64,
        new_content: &str,
        fallback: Option<TrackedMessage>,
    ) -> Option<Notification> {
        let mut snapshot = self
            .message_cache
            .get(&message_id)
            .map(|m| m.clone())
            .or(fallback)?;

        if snapshot.guild_id != guild_id || snapshot.content == new_content {
            return None;
        }

        let event = Notification::MessageEdited {
            guild_id,
            channel_id: snapshot.channel_id,
            author_id: snapshot.author_id,
            author_name: snapshot.author_name.clone(),
            before_content: snapshot.content.clone(),
            after_content: new_content.to_string(),
        };

        snapshot.content = new_content.to_string();
        self.remember_message(snapshot);
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(id: u64, content: &str) -> TrackedMessage {
        TrackedMessage {
            message_id: id,
            guild_id: 1,
            channel_id: 2,
            author_id: 3,
            author_name: "kynd".to_string(),
            content: content.to_string(),
            attachments: vec![],
        }
    }

    #[test]
    fn delete_uses_and_forgets_snapshot() {
        let audit = AuditService::new();
        audit.remember_message(message(10, "hello"));

        let event = audit.message_deleted(10, 1, None).unwrap();

        assert!(matches!(
            event,
            Notification::MessageDeleted { ref content, .. } if content == "hello"
        ));
        assert_eq!(audit.tracked_count(), 0);
        assert!(audit.message_deleted(10, 1, None).is_none());
    }

    #[test]
    fn delete_falls_back_to_cached_copy() {
        let audit = AuditService::new();
        let event = audit.message_deleted(11, 1, Some(message(11, "from cache")));
        assert!(event.is_some());
    }

    #[test]
    fn delete_in_other_guild_is_ignored() {
        let audit = AuditService::new();
        audit.remember_message(message(12, "hello"));
        assert!(audit.message_deleted(12, 99, None).is_none());
    }

    #[test]
    fn edit_reports_before_and_after_then_updates_snapshot() {
        let audit = AuditService::new();
        audit.remember_message(message(20, "first"));

        let event = audit.message_edited(20, 1, "second", None).unwrap();
        assert_eq!(
            event,
            Notification::MessageEdited {
                guild_id: 1,
                channel_id: 2,
                author_id: 3,
                author_name: "kynd".to_string(),
                before_content: "first".to_string(),
                after_content: "second".to_string(),
            }
        );

        // Same content again is not an edit (embed-only updates look like this).
        assert!(audit.message_edited(20, 1, "second", None).is_none());
    }

    #[test]
    fn cache_is_bounded() {
        let audit = AuditService::with_capacity(3);
        for id in 0..10 {
            audit.remember_message(message(id, "x"));
        }
        assert_eq!(audit.tracked_count(), 3);
    }
}
