use chrono::{DateTime, Utc};

/// Something worth telling the operators about, stripped of Discord types.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    GuildJoined {
        guild_id: u64,
        guild_name: String,
        member_count: u64,
    },
    GuildLeft {
        guild_id: u64,
        guild_name: Option<String>,
    },
    MemberJoined {
        guild_id: u64,
        user_id: u64,
        user_tag: String,
        created_at: Option<DateTime<Utc>>,
    },
    MemberLeft {
        guild_id: u64,
        user_id: u64,
        user_tag: String,
        /// Known when the member was still cached at removal.
        joined_at: Option<DateTime<Utc>>,
    },
    MemberBanned {
        guild_id: u64,
        user_id: u64,
        user_tag: String,
    },
    MemberUnbanned {
        guild_id: u64,
        user_id: u64,
        user_tag: String,
    },
    MessageDeleted {
        guild_id: u64,
        channel_id: u64,
        author_id: u64,
        author_name: String,
        content: String,
        attachments: Vec<String>,
    },
    MessageEdited {
        guild_id: u64,
        channel_id: u64,
        author_id: u64,
        author_name: String,
        before_content: String,
        after_content: String,
    },
}

impl Notification {
    pub fn guild_id(&self) -> u64 {
        match self {
            Notification::GuildJoined { guild_id, .. }
            | Notification::GuildLeft { guild_id, .. }
            | Notification::MemberJoined { guild_id, .. }
            | Notification::MemberLeft { guild_id, .. }
            | Notification::MemberBanned { guild_id, .. }
            | Notification::MemberUnbanned { guild_id, .. }
            | Notification::MessageDeleted { guild_id, .. }
            | Notification::MessageEdited { guild_id, .. } => *guild_id,
        }
    }

    /// One-line description used for the diagnostic log.
    pub fn summary(&self) -> String {
        match self {
            Notification::GuildJoined {
                guild_id,
                guild_name,
                member_count,
            } => format!(
                "Joined guild '{}' ({}) with {} members",
                guild_name, guild_id, member_count
            ),
            Notification::GuildLeft {
                guild_id,
                guild_name,
            } => match guild_name {
                Some(name) => format!("Left guild '{}' ({})", name, guild_id),
                None => format!("Left guild {}", guild_id),
            },
            Notification::MemberJoined {
                user_tag,
                user_id,
                created_at,
                ..
            } => match created_at {
                Some(created) => format!(
                    "{} ({}) joined, account age {} days",
                    user_tag,
                    user_id,
                    account_age_days(*created, Utc::now())
                ),
                None => format!("{} ({}) joined", user_tag, user_id),
            },
            Notification::MemberLeft {
                user_tag,
                user_id,
                joined_at,
                ..
            } => match joined_at {
                Some(joined) => format!(
                    "{} ({}) left after {} days",
                    user_tag,
                    user_id,
                    account_age_days(*joined, Utc::now())
                ),
                None => format!("{} ({}) left", user_tag, user_id),
            },
            Notification::MemberBanned {
                user_tag, user_id, ..
            } => format!("{} ({}) was banned", user_tag, user_id),
            Notification::MemberUnbanned {
                user_tag, user_id, ..
            } => format!("{} ({}) was unbanned", user_tag, user_id),
            Notification::MessageDeleted {
                author_name,
                channel_id,
                content,
                attachments,
                ..
            } => {
                let mut line = format!(
                    "Message by {} deleted in {}: {:?}",
                    author_name, channel_id, content
                );
                if !attachments.is_empty() {
                    line.push_str(&format!(" [attachments: {}]", attachments.join(", ")));
                }
                line
            }
            Notification::MessageEdited {
                author_name,
                channel_id,
                before_content,
                after_content,
                ..
            } => format!(
                "Message by {} edited in {}: {:?} -> {:?}",
                author_name, channel_id, before_content, after_content
            ),
        }
    }
}

pub fn account_age_days(created_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - created_at).num_days().max(0)
}

/// Minimal snapshot of a message kept in memory so deletions and edits can be
/// audited even after Serenity's cache has evicted the original.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedMessage {
    pub message_id: u64,
    pub guild_id: u64,
    pub channel_id: u64,
    pub author_id: u64,
    pub author_name: String,
    pub content: String,
    pub attachments: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn summaries_name_guild_and_user() {
        let joined = Notification::GuildJoined {
            guild_id: 1,
            guild_name: "The Armory".to_string(),
            member_count: 120,
        };
        let banned = Notification::MemberBanned {
            guild_id: 1,
            user_id: 2,
            user_tag: "spammer#0001".to_string(),
        };

        assert_eq!(joined.guild_id(), 1);
        assert_eq!(
            joined.summary(),
            "Joined guild 'The Armory' (1) with 120 members"
        );
        assert_eq!(banned.summary(), "spammer#0001 (2) was banned");
    }

    #[test]
    fn left_guild_without_name_uses_id() {
        let left = Notification::GuildLeft {
            guild_id: 5,
            guild_name: None,
        };
        assert_eq!(left.summary(), "Left guild 5");
    }

    #[test]
    fn member_left_mentions_tenure_when_known() {
        let joined_at = Utc::now() - chrono::Duration::days(30);
        let cached = Notification::MemberLeft {
            guild_id: 1,
            user_id: 2,
            user_tag: "regular#0002".to_string(),
            joined_at: Some(joined_at),
        };
        let uncached = Notification::MemberLeft {
            guild_id: 1,
            user_id: 2,
            user_tag: "regular#0002".to_string(),
            joined_at: None,
        };

        assert_eq!(cached.summary(), "regular#0002 (2) left after 30 days");
        assert_eq!(uncached.summary(), "regular#0002 (2) left");
    }

    #[test]
    fn account_age_counts_whole_days() {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 11, 12, 0, 0).unwrap();

        assert_eq!(account_age_days(created, now), 10);
        assert_eq!(account_age_days(now, created), 0);
    }
}
