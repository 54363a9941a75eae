use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TwitchError {
    #[error("Twitch API error: {0}")]
    Api(String),
    #[error("Twitch request failed: {0}")]
    Http(String),
}

/// A Twitch account as returned by the Helix users endpoint.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TwitchUser {
    pub id: String,
    pub login: String,
    pub display_name: String,
    /// "partner", "affiliate" or empty.
    #[serde(default)]
    pub broadcaster_type: String,
}

/// One subscription of a user to the configured broadcaster.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TwitchSubscription {
    pub user_id: String,
    pub tier: String,
}

#[async_trait]
pub trait TwitchApi: Send + Sync {
    /// Resolve a login or numeric id to a user. `None` when no such user exists.
    async fn get_user(&self, viewer: &str) -> Result<Option<TwitchUser>, TwitchError>;

    /// Subscriptions `user_id` holds on the broadcaster channel. Empty when not subscribed.
    async fn get_subscriptions(&self, user_id: &str)
        -> Result<Vec<TwitchSubscription>, TwitchError>;
}

/// Normalized result of a viewer lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerLookup {
    NotFound {
        viewer: String,
    },
    Found {
        user: TwitchUser,
        subscribed: bool,
        numeric_input: bool,
    },
}

pub struct TwitchInfoService<C: TwitchApi> {
    client: C,
}

impl<C: TwitchApi> TwitchInfoService<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub async fn lookup(&self, viewer: &str) -> Result<ViewerLookup, TwitchError> {
        let viewer = viewer.trim();
        let user = match self.client.get_user(viewer).await? {
            Some(user) => user,
            None => {
                return Ok(ViewerLookup::NotFound {
                    viewer: viewer.to_string(),
                })
            }
        };

        let subscriptions = self.client.get_subscriptions(&user.id).await?;
        tracing::debug!(
            user_id = %user.id,
            subscriptions = subscriptions.len(),
            tier = subscriptions.first().map(|s| s.tier.as_str()),
            "Resolved Twitch viewer"
        );

        Ok(ViewerLookup::Found {
            user,
            subscribed: !subscriptions.is_empty(),
            numeric_input: is_numeric(viewer),
        })
    }
}

impl ViewerLookup {
    pub fn render(&self) -> String {
        match self {
            ViewerLookup::NotFound { viewer } => {
                format!("The Twitch channel **{}** does not exist.", viewer)
            }
            ViewerLookup::Found {
                user,
                subscribed,
                numeric_input,
            } => {
                let name = display_name(user);
                let mut text = if *numeric_input {
                    format!("{} => **{}**", user.id, name)
                } else {
                    format!("{} => **{}**", name, user.id)
                };
                if !user.broadcaster_type.is_empty() {
                    text.push('\n');
                    text.push_str(&capitalize(&user.broadcaster_type));
                }
                text.push_str(&format!("\nSubscribed: **{}**", subscribed));
                text
            }
        }
    }
}

pub fn is_numeric(viewer: &str) -> bool {
    !viewer.is_empty() && viewer.chars().all(|c| c.is_ascii_digit())
}

/// Display name, with the login appended when the two differ beyond casing.
pub fn display_name(user: &TwitchUser) -> String {
    if user.display_name.to_lowercase() == user.login.to_lowercase() {
        user.display_name.clone()
    } else {
        format!("{} ({})", user.display_name, user.login)
    }
}

pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeTwitch {
        users: Vec<TwitchUser>,
        subscribed_ids: Vec<String>,
        subscription_queries: AtomicUsize,
    }

    impl FakeTwitch {
        fn new(users: Vec<TwitchUser>, subscribed_ids: &[&str]) -> Self {
            Self {
                users,
                subscribed_ids: subscribed_ids.iter().map(|s| s.to_string()).collect(),
                subscription_queries: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TwitchApi for FakeTwitch {
        async fn get_user(&self, viewer: &str) -> Result<Option<TwitchUser>, TwitchError> {
            Ok(self
                .users
                .iter()
                .find(|u| u.id == viewer || u.login == viewer.to_lowercase())
                .cloned())
        }

        async fn get_subscriptions(
            &self,
            user_id: &str,
        ) -> Result<Vec<TwitchSubscription>, TwitchError> {
            self.subscription_queries.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .subscribed_ids
                .iter()
                .filter(|id| id.as_str() == user_id)
                .map(|id| TwitchSubscription {
                    user_id: id.clone(),
                    tier: "1000".to_string(),
                })
                .collect())
        }
    }

    fn user(id: &str, login: &str, display: &str, kind: &str) -> TwitchUser {
        TwitchUser {
            id: id.to_string(),
            login: login.to_string(),
            display_name: display.to_string(),
            broadcaster_type: kind.to_string(),
        }
    }

    #[tokio::test]
    async fn missing_viewer_stops_before_subscription_query() {
        let service = TwitchInfoService::new(FakeTwitch::new(vec![], &[]));

        let lookup = service.lookup("nobody").await.unwrap();

        assert_eq!(
            lookup.render(),
            "The Twitch channel **nobody** does not exist."
        );
        assert_eq!(
            service.client.subscription_queries.load(Ordering::SeqCst),
            0
        );
    }

    #[tokio::test]
    async fn numeric_input_maps_id_to_name() {
        let service = TwitchInfoService::new(FakeTwitch::new(
            vec![user("12826", "twitch", "Twitch", "")],
            &["12826"],
        ));

        let text = service.lookup("12826").await.unwrap().render();

        assert_eq!(text, "12826 => **Twitch**\nSubscribed: **true**");
    }

    #[tokio::test]
    async fn login_input_maps_name_to_id() {
        let service = TwitchInfoService::new(FakeTwitch::new(
            vec![user("141981764", "twitchdev", "TwitchDev", "partner")],
            &[],
        ));

        let text = service.lookup("TwitchDev").await.unwrap().render();

        assert_eq!(
            text,
            "TwitchDev => **141981764**\nPartner\nSubscribed: **false**"
        );
        assert_eq!(
            service.client.subscription_queries.load(Ordering::SeqCst),
            1
        );
    }

    #[test]
    fn display_name_appends_login_when_localized() {
        assert_eq!(display_name(&user("1", "dbkynd", "DBKynd", "")), "DBKynd");
        assert_eq!(
            display_name(&user("2", "someone", "誰か", "")),
            "誰か (someone)"
        );
    }

    #[test]
    fn helpers_behave_on_edge_input() {
        assert!(is_numeric("0123"));
        assert!(!is_numeric(""));
        assert!(!is_numeric("12a"));
        assert_eq!(capitalize("affiliate"), "Affiliate");
        assert_eq!(capitalize(""), "");
    }
}
