use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::core::twitch::twitch_service::is_numeric;
use crate::core::twitch::{TwitchApi, TwitchError, TwitchSubscription, TwitchUser};

/// Credentials for the Helix API. The token must carry `channel:read:subscriptions`
/// for the broadcaster.
#[derive(Debug, Clone)]
pub struct HelixCredentials {
    pub client_id: String,
    pub access_token: String,
    pub broadcaster_id: String,
}

/// Minimal Twitch Helix client covering user and subscription lookups.
pub struct HelixClient {
    client: Client,
    base_url: String,
    broadcaster_id: String,
}

/// Every Helix list endpoint wraps its records in `data`.
#[derive(Debug, Deserialize)]
struct HelixPage<T> {
    data: Vec<T>,
}

impl HelixClient {
    pub fn new(credentials: HelixCredentials) -> Result<Self, TwitchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Client-Id",
            HeaderValue::from_str(&credentials.client_id)
                .map_err(|e| TwitchError::Api(e.to_string()))?,
        );
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&format!("Bearer {}", credentials.access_token))
                .map_err(|e| TwitchError::Api(e.to_string()))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| TwitchError::Http(e.to_string()))?;

        Ok(Self {
            client,
            base_url: "https://api.twitch.tv/helix".to_string(),
            broadcaster_id: credentials.broadcaster_id,
        })
    }

    async fn get_page<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<Vec<T>>, TwitchError> {
        let url = format!("{}/{}", self.base_url, path);
        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| TwitchError::Http(e.to_string()))?;

        match resp.status() {
            // Helix answers 400 for logins that cannot exist.
            StatusCode::BAD_REQUEST => Ok(None),
            status if status.is_success() => {
                let body = resp
                    .text()
                    .await
                    .map_err(|e| TwitchError::Http(e.to_string()))?;
                parse_page(&body).map(Some)
            }
            status => Err(TwitchError::Api(format!(
                "Twitch returned {} for {}",
                status, path
            ))),
        }
    }
}

fn parse_page<T: for<'de> Deserialize<'de>>(body: &str) -> Result<Vec<T>, TwitchError> {
    serde_json::from_str::<HelixPage<T>>(body)
        .map(|page| page.data)
        .map_err(|e| TwitchError::Api(format!("Unexpected Twitch response: {}", e)))
}

#[async_trait]
impl TwitchApi for HelixClient {
    async fn get_user(&self, viewer: &str) -> Result<Option<TwitchUser>, TwitchError> {
        let key = if is_numeric(viewer) { "id" } else { "login" };
        let users: Vec<TwitchUser> = self
            .get_page("users", &[(key, viewer)])
            .await?
            .unwrap_or_default();
        Ok(users.into_iter().next())
    }

    async fn get_subscriptions(
        &self,
        user_id: &str,
    ) -> Result<Vec<TwitchSubscription>, TwitchError> {
        let query = [
            ("broadcaster_id", self.broadcaster_id.as_str()),
            ("user_id", user_id),
        ];
        match self.get_page("subscriptions", &query).await? {
            Some(subscriptions) => Ok(subscriptions),
            None => Err(TwitchError::Api(
                "Twitch rejected the subscription query".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_users_page() {
        let body = r#"{"data":[{"id":"141981764","login":"twitchdev","display_name":"TwitchDev",
            "type":"","broadcaster_type":"partner","description":"Supporting third-party developers",
            "view_count":5980557,"created_at":"2016-12-14T20:32:28Z"}]}"#;

        let users: Vec<TwitchUser> = parse_page(body).unwrap();

        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, "141981764");
        assert_eq!(users[0].login, "twitchdev");
        assert_eq!(users[0].broadcaster_type, "partner");
    }

    #[test]
    fn decodes_subscriptions_page() {
        let body = r#"{"data":[{"broadcaster_id":"141981764","broadcaster_login":"twitchdev",
            "broadcaster_name":"TwitchDev","gifter_id":"","gifter_login":"","gifter_name":"",
            "is_gift":false,"tier":"1000","plan_name":"Channel Subscription (twitchdev)",
            "user_id":"527115020","user_name":"twitchgaming","user_login":"twitchgaming"}],
            "pagination":{},"total":1,"points":1}"#;

        let subs: Vec<TwitchSubscription> = parse_page(body).unwrap();

        assert_eq!(subs[0].user_id, "527115020");
        assert_eq!(subs[0].tier, "1000");
    }

    #[test]
    fn empty_data_means_no_records() {
        let subs: Vec<TwitchSubscription> = parse_page(r#"{"data":[],"pagination":{}}"#).unwrap();
        assert!(subs.is_empty());
    }

    #[test]
    fn malformed_body_is_an_api_error() {
        let result: Result<Vec<TwitchUser>, _> = parse_page("not json");
        assert!(matches!(result, Err(TwitchError::Api(_))));
    }
}
