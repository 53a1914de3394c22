//! Lazy fetching and caching of remote option lists.
//!
//! Choices whose options live behind an endpoint are backfilled on
//! demand. A failed fetch is logged and swallowed; it leaves no cache
//! entry, so the next call retries.

use crate::choice::{ChoiceOption, PendingChoice};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tomekeeper::{ChoiceClient, RawOption};

/// Fetches and caches option lists for pending choices.
pub struct OptionResolver {
    client: Arc<dyn ChoiceClient>,
    /// Choice id -> raw options as fetched.
    cache: Mutex<HashMap<String, Vec<RawOption>>>,
    /// Choice ids with a fetch currently awaiting.
    in_flight: Mutex<HashSet<String>>,
}

impl OptionResolver {
    pub fn new(client: Arc<dyn ChoiceClient>) -> Self {
        Self {
            client,
            cache: Mutex::new(HashMap::new()),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn has_cached(&self, choice_id: &str) -> bool {
        self.cache
            .lock()
            .expect("lock poisoned")
            .contains_key(choice_id)
    }

    /// Fetch the option list for a choice unless it is inline, has no
    /// endpoint, is already cached, or is already being fetched.
    ///
    /// The in-flight marker is set before the await and cleared on
    /// both outcomes. Failures are logged and swallowed.
    pub async fn fetch_options_if_needed(&self, choice: &PendingChoice) {
        if !choice.options.is_empty() {
            return;
        }
        let Some(endpoint) = choice.options_endpoint.as_deref() else {
            return;
        };
        if self.has_cached(&choice.id) {
            return;
        }
        {
            let mut in_flight = self.in_flight.lock().expect("lock poisoned");
            if !in_flight.insert(choice.id.clone()) {
                return;
            }
        }

        let result = self.client.fetch_options(endpoint).await;

        self.in_flight
            .lock()
            .expect("lock poisoned")
            .remove(&choice.id);

        match result {
            Ok(options) => {
                self.cache
                    .lock()
                    .expect("lock poisoned")
                    .insert(choice.id.clone(), options);
            }
            Err(err) => {
                tracing::warn!(choice_id = %choice.id, error = %err, "option fetch failed");
            }
        }
    }

    /// Options normalized for display.
    ///
    /// Inline options pass through unchanged; fetched raw options are
    /// flattened, a nested skill or proficiency-type record taking
    /// precedence over flat fields.
    pub fn display_options(&self, choice: &PendingChoice) -> Vec<ChoiceOption> {
        if !choice.options.is_empty() {
            return choice.options.clone();
        }
        let cache = self.cache.lock().expect("lock poisoned");
        match cache.get(&choice.id) {
            Some(raw) => raw.iter().filter_map(flatten_option).collect(),
            None => Vec::new(),
        }
    }
}

/// Flatten one raw record to the display shape. Records with neither a
/// nested reference nor flat fields are dropped.
fn flatten_option(raw: &RawOption) -> Option<ChoiceOption> {
    if let Some(named) = raw.skill.as_ref().or(raw.proficiency_type.as_ref()) {
        return Some(ChoiceOption {
            id: named.id.clone(),
            name: named.name.clone(),
            description: raw.description.clone(),
        });
    }
    match (&raw.id, &raw.name) {
        (Some(id), Some(name)) => Some(ChoiceOption {
            id: id.clone(),
            name: name.clone(),
            description: raw.description.clone(),
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choice::{ChoiceKind, ChoiceSource};
    use crate::testing::MockClient;
    use std::time::Duration;
    use tomekeeper::NamedRef;

    fn remote_choice(id: &str, endpoint: &str) -> PendingChoice {
        PendingChoice {
            id: id.to_string(),
            kind: ChoiceKind::Language,
            subtype: None,
            source: ChoiceSource::Race,
            quantity: 1,
            remaining: 1,
            selected: Vec::new(),
            options: Vec::new(),
            options_endpoint: Some(endpoint.to_string()),
        }
    }

    #[tokio::test]
    async fn test_fetch_populates_cache_once() {
        let client = Arc::new(MockClient::new());
        client.queue_options(
            "/api/v2/languages/",
            vec![MockClient::flat_option("elvish", "Elvish")],
        );
        let resolver = OptionResolver::new(client.clone());
        let choice = remote_choice("langs", "/api/v2/languages/");

        resolver.fetch_options_if_needed(&choice).await;
        assert!(resolver.has_cached("langs"));

        // Cached entry short-circuits a second call.
        resolver.fetch_options_if_needed(&choice).await;
        assert_eq!(client.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_inline_options_skip_the_fetch() {
        let client = Arc::new(MockClient::new());
        let resolver = OptionResolver::new(client.clone());
        let mut choice = remote_choice("langs", "/api/v2/languages/");
        choice.options.push(ChoiceOption {
            id: "elvish".to_string(),
            name: "Elvish".to_string(),
            description: None,
        });

        resolver.fetch_options_if_needed(&choice).await;
        assert_eq!(client.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_endpoint_is_a_noop() {
        let client = Arc::new(MockClient::new());
        let resolver = OptionResolver::new(client.clone());
        let mut choice = remote_choice("langs", "/api/v2/languages/");
        choice.options_endpoint = None;

        resolver.fetch_options_if_needed(&choice).await;
        assert_eq!(client.fetch_count(), 0);
        assert!(!resolver.has_cached("langs"));
    }

    #[tokio::test]
    async fn test_concurrent_fetches_deduplicate() {
        let client =
            Arc::new(MockClient::new().with_fetch_delay(Duration::from_millis(20)));
        client.queue_options(
            "/api/v2/languages/",
            vec![MockClient::flat_option("elvish", "Elvish")],
        );
        let resolver = OptionResolver::new(client.clone());
        let choice = remote_choice("langs", "/api/v2/languages/");

        tokio::join!(
            resolver.fetch_options_if_needed(&choice),
            resolver.fetch_options_if_needed(&choice),
        );

        assert_eq!(client.fetch_count(), 1);
        assert!(resolver.has_cached("langs"));
    }

    #[tokio::test]
    async fn test_failed_fetch_is_swallowed_and_retried() {
        let client = Arc::new(MockClient::new());
        client.fail_endpoint("/api/v2/languages/");
        let resolver = OptionResolver::new(client.clone());
        let choice = remote_choice("langs", "/api/v2/languages/");

        resolver.fetch_options_if_needed(&choice).await;
        assert!(!resolver.has_cached("langs"));
        assert_eq!(client.fetch_count(), 1);

        // No cache entry, so the next call tries again.
        client.restore_endpoint("/api/v2/languages/");
        client.queue_options(
            "/api/v2/languages/",
            vec![MockClient::flat_option("elvish", "Elvish")],
        );
        resolver.fetch_options_if_needed(&choice).await;
        assert_eq!(client.fetch_count(), 2);
        assert!(resolver.has_cached("langs"));
    }

    #[tokio::test]
    async fn test_display_options_flatten_both_shapes() {
        let client = Arc::new(MockClient::new());
        client.queue_options(
            "/api/v2/proficiencies/",
            vec![
                RawOption {
                    skill: Some(NamedRef {
                        id: "athletics".to_string(),
                        name: "Athletics".to_string(),
                    }),
                    // Nested record wins over the flat fields.
                    id: Some("raw-1".to_string()),
                    name: Some("Raw One".to_string()),
                    ..RawOption::default()
                },
                MockClient::flat_option("smiths-tools", "Smith's Tools"),
                // Neither shape: dropped.
                RawOption::default(),
            ],
        );
        let resolver = OptionResolver::new(client);
        let choice = remote_choice("profs", "/api/v2/proficiencies/");

        resolver.fetch_options_if_needed(&choice).await;
        let options = resolver.display_options(&choice);

        assert_eq!(options.len(), 2);
        assert_eq!(options[0].id, "athletics");
        assert_eq!(options[0].name, "Athletics");
        assert_eq!(options[1].id, "smiths-tools");
    }

    #[tokio::test]
    async fn test_display_options_prefer_inline() {
        let client = Arc::new(MockClient::new());
        let resolver = OptionResolver::new(client);
        let mut choice = remote_choice("langs", "/api/v2/languages/");
        choice.options.push(ChoiceOption {
            id: "elvish".to_string(),
            name: "Elvish".to_string(),
            description: Some("Script: Elvish".to_string()),
        });

        let options = resolver.display_options(&choice);
        assert_eq!(options, choice.options);
    }
}
