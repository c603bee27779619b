//! Mention autocomplete: a static candidate list filtered locally, or a
//! host lookup re-run on every query change.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::host::{HostError, MentionProvider};
use crate::model::{Mention, Position};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentionCandidate {
    pub id: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_label: Option<String>,
}

impl MentionCandidate {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            secondary_label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.secondary_label = Some(label.into());
        self
    }

    pub fn to_mention(&self) -> Mention {
        Mention {
            user_id: self.id.clone(),
            display_name: self.display_name.clone(),
        }
    }

    fn matches(&self, needle: &str) -> bool {
        self.display_name.to_lowercase().contains(needle)
            || self
                .secondary_label
                .as_ref()
                .is_some_and(|label| label.to_lowercase().contains(needle))
    }
}

/// Where candidates come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MentionSource {
    Static { candidates: Vec<MentionCandidate> },
    /// The host answers each query through a [`MentionProvider`].
    Async,
}

impl Default for MentionSource {
    fn default() -> Self {
        MentionSource::Static {
            candidates: Vec::new(),
        }
    }
}

/// Case-insensitive substring match on name or secondary label.
pub fn filter_candidates(candidates: &[MentionCandidate], query: &str) -> Vec<MentionCandidate> {
    let needle = query.trim().to_lowercase();
    candidates
        .iter()
        .filter(|c| needle.is_empty() || c.matches(&needle))
        .cloned()
        .collect()
}

/// A lookup the host must run, tagged so a late answer can be recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionQuery {
    pub ticket: Uuid,
    pub generation: u64,
    pub text: String,
}

/// Runs a lookup. Failures are logged and yield no candidates.
pub async fn fetch_candidates(
    provider: &dyn MentionProvider,
    query: &MentionQuery,
) -> Vec<MentionCandidate> {
    match provider.search(&query.text).await {
        Ok(candidates) => candidates,
        Err(err) => {
            log::warn!("mention lookup for {:?} failed: {err}", query.text);
            Vec::new()
        }
    }
}

#[derive(Debug, Clone)]
pub struct MentionPicker {
    ticket: Uuid,
    source: MentionSource,
    query: String,
    generation: u64,
    candidates: Vec<MentionCandidate>,
    trigger: Option<Position>,
}

impl MentionPicker {
    /// Opens with an empty query. `trigger` is the caret right after an
    /// inline `@`, when that is what opened the picker.
    pub fn open(source: MentionSource, trigger: Option<Position>) -> Self {
        let candidates = match &source {
            MentionSource::Static { candidates } => candidates.clone(),
            MentionSource::Async => Vec::new(),
        };
        Self {
            ticket: Uuid::new_v4(),
            source,
            query: String::new(),
            generation: 0,
            candidates,
            trigger,
        }
    }

    pub fn ticket(&self) -> Uuid {
        self.ticket
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn candidates(&self) -> &[MentionCandidate] {
        &self.candidates
    }

    pub fn trigger(&self) -> Option<&Position> {
        self.trigger.as_ref()
    }

    /// Updates the search text. Static sources refilter immediately; async
    /// sources return the lookup to run.
    pub fn set_query(&mut self, text: &str) -> Option<MentionQuery> {
        self.query = text.to_string();
        self.generation += 1;
        match &self.source {
            MentionSource::Static { candidates } => {
                self.candidates = filter_candidates(candidates, text);
                None
            }
            MentionSource::Async => Some(MentionQuery {
                ticket: self.ticket,
                generation: self.generation,
                text: text.to_string(),
            }),
        }
    }

    /// Applies lookup results unless they answer an older query or another
    /// picker. Returns whether they were used.
    pub fn receive(
        &mut self,
        query: &MentionQuery,
        result: Result<Vec<MentionCandidate>, HostError>,
    ) -> bool {
        if query.ticket != self.ticket || query.generation != self.generation {
            log::debug!("dropping stale mention results for {:?}", query.text);
            return false;
        }
        self.candidates = result.unwrap_or_else(|err| {
            log::warn!("mention lookup for {:?} failed: {err}", query.text);
            Vec::new()
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn team() -> Vec<MentionCandidate> {
        vec![
            MentionCandidate::new("u1", "Ada Lovelace").with_label("ada@example.com"),
            MentionCandidate::new("u2", "Grace Hopper").with_label("Compilers"),
            MentionCandidate::new("u3", "Alan Turing"),
        ]
    }

    #[rstest]
    #[case("", &["u1", "u2", "u3"])]
    #[case("ADA", &["u1"])]
    #[case("compil", &["u2"])]
    #[case("an", &["u3"])]
    #[case("zzz", &[])]
    fn filters_on_name_and_label(#[case] query: &str, #[case] ids: &[&str]) {
        let found: Vec<_> = filter_candidates(&team(), query)
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(found, ids);
    }

    #[test]
    fn static_picker_filters_without_lookup() {
        let mut picker = MentionPicker::open(MentionSource::Static { candidates: team() }, None);
        assert_eq!(picker.candidates().len(), 3);
        assert_eq!(picker.set_query("grace"), None);
        assert_eq!(picker.candidates()[0].id, "u2");
    }

    #[test]
    fn stale_async_results_are_dropped() {
        let mut picker = MentionPicker::open(MentionSource::Async, None);
        let first = picker.set_query("a").unwrap();
        let second = picker.set_query("al").unwrap();

        assert!(!picker.receive(&first, Ok(team())));
        assert!(picker.candidates().is_empty());
        assert!(picker.receive(&second, Ok(vec![team()[2].clone()])));
        assert_eq!(picker.candidates()[0].display_name, "Alan Turing");
    }

    #[test]
    fn results_for_another_picker_are_dropped() {
        let mut picker = MentionPicker::open(MentionSource::Async, None);
        let mut other = MentionPicker::open(MentionSource::Async, None);
        let query = other.set_query("a").unwrap();
        picker.set_query("a");
        assert!(!picker.receive(&query, Ok(team())));
    }

    #[test]
    fn lookup_error_gives_no_candidates() {
        let mut picker = MentionPicker::open(MentionSource::Async, None);
        let query = picker.set_query("a").unwrap();
        assert!(picker.receive(&query, Err(HostError::Lookup("offline".into()))));
        assert!(picker.candidates().is_empty());
    }

    struct Failing;

    #[async_trait(?Send)]
    impl MentionProvider for Failing {
        async fn search(&self, _query: &str) -> Result<Vec<MentionCandidate>, HostError> {
            Err(HostError::Lookup("down".into()))
        }
    }

    #[test]
    fn fetch_swallows_errors() {
        let mut picker = MentionPicker::open(MentionSource::Async, None);
        let query = picker.set_query("x").unwrap();
        assert!(block_on(fetch_candidates(&Failing, &query)).is_empty());
    }
}
