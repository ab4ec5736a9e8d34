//! Fallback search across query variants, languages and sources.
//!
//! The fact-check API matches queries almost literally, so an empty answer
//! often means "wrong phrasing" rather than "never checked". The
//! [`Aggregator`] works around it in stages:
//!
//! 1. **Direct**: the query as typed, in the selected language. Any result
//!    ends the search here.
//! 2. **Expansion**: every `(language, variant)` pair not tried yet, with
//!    languages ordered `selected → alternate → auto`. Unique results are
//!    accumulated until [`AggregatorSettings::early_stop`] is reached.
//! 3. **Regional**: if everything above came back empty, the regional crawl
//!    runs once.
//!
//! In regional mode the crawl runs first and stages 1-2 only run when it
//! finds nothing. Results keep discovery order; nothing is ranked.

use crate::config::AggregatorSettings;
use crate::error::SearchError;
use crate::models::{ClaimRecord, SearchResult};
use crate::sources::{PrimarySource, RegionalSearch};
use itertools::Itertools;
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

/// Language tried second: English for Spanish searches, Spanish otherwise.
pub fn alternate_language(selected: &str) -> &'static str {
    if selected == "es" { "en" } else { "es" }
}

/// `selected → alternate → auto`, without repeats.
pub fn language_order(selected: &str) -> Vec<String> {
    [selected, alternate_language(selected), "auto"]
        .into_iter()
        .unique()
        .map(str::to_string)
        .collect()
}

/// Unique records collected during one run, in first-seen order.
#[derive(Debug, Default)]
struct Accumulator {
    seen: HashSet<(String, String)>,
    results: Vec<ClaimRecord>,
}

impl Accumulator {
    /// Append the records not seen before; returns how many were new.
    fn extend(&mut self, records: Vec<ClaimRecord>) -> usize {
        let before = self.results.len();
        for record in records {
            if self.seen.insert(record.identity_key()) {
                self.results.push(record);
            }
        }
        self.results.len() - before
    }

    fn len(&self) -> usize {
        self.results.len()
    }

    fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

pub struct Aggregator<'a, P, R> {
    primary: &'a P,
    regional: &'a R,
    settings: &'a AggregatorSettings,
}

impl<'a, P, R> Aggregator<'a, P, R>
where
    P: PrimarySource + Sync,
    R: RegionalSearch + Sync,
{
    pub fn new(primary: &'a P, regional: &'a R, settings: &'a AggregatorSettings) -> Self {
        Self {
            primary,
            regional,
            settings,
        }
    }

    /// Run the staged search for `query`.
    ///
    /// # Arguments
    ///
    /// * `query` - The claim as typed; surrounding whitespace is ignored
    /// * `language` - Preferred language code or `"auto"`; blank means `"en"`
    /// * `regional_mode` - Consult the regional source before the primary one
    ///
    /// # Returns
    ///
    /// The unique records found, in discovery order. Finding nothing is a
    /// success with an empty list.
    ///
    /// # Errors
    ///
    /// [`SearchError::MissingParameter`] for a blank query and
    /// [`SearchError::MissingCredential`] when the primary source has no key.
    /// Other failures of individual attempts are logged and skipped.
    #[instrument(level = "info", skip(self))]
    pub async fn search(
        &self,
        query: &str,
        language: &str,
        regional_mode: bool,
    ) -> Result<SearchResult, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::MissingParameter("q"));
        }
        let language = match language.trim() {
            "" => "en",
            l => l,
        };

        let mut acc = Accumulator::default();
        if regional_mode {
            self.regional_once(query, &mut acc).await;
            if acc.is_empty() {
                self.primary_path(query, language, &mut acc).await?;
            }
        } else {
            self.primary_path(query, language, &mut acc).await?;
            if acc.is_empty() {
                self.regional_once(query, &mut acc).await;
            }
        }

        info!(count = acc.len(), "Aggregated search complete");
        Ok(SearchResult {
            query: query.to_string(),
            results: acc.results,
        })
    }

    async fn regional_once(&self, query: &str, acc: &mut Accumulator) {
        let found = self.regional.search(query).await;
        let added = acc.extend(found.results);
        debug!(added, "Regional source consulted");
    }

    /// Stages 1 and 2: direct attempt, then variant/language expansion.
    async fn primary_path(
        &self,
        query: &str,
        language: &str,
        acc: &mut Accumulator,
    ) -> Result<(), SearchError> {
        let mut attempted: HashSet<(String, String)> = HashSet::new();

        attempted.insert((language.to_string(), query.to_string()));
        if let Some(records) = self.attempt(query, language).await? {
            acc.extend(records);
            if !acc.is_empty() {
                return Ok(());
            }
        }

        for lang in language_order(language) {
            for variant in self.settings.variants(query) {
                if !attempted.insert((lang.clone(), variant.clone())) {
                    continue;
                }
                if let Some(records) = self.attempt(&variant, &lang).await? {
                    let added = acc.extend(records);
                    debug!(%lang, %variant, added, total = acc.len(), "Variant attempt");
                    // A zero threshold would stop before anything was found.
                    if acc.len() >= self.settings.early_stop.max(1) {
                        info!(total = acc.len(), "Early stop threshold reached");
                        return Ok(());
                    }
                }
            }
        }

        Ok(())
    }

    /// One primary call. `Ok(None)` means the attempt failed and was skipped.
    async fn attempt(
        &self,
        query: &str,
        language: &str,
    ) -> Result<Option<Vec<ClaimRecord>>, SearchError> {
        match self.primary.search(query, language).await {
            Ok(found) => Ok(Some(found.results)),
            Err(e) if e.is_recoverable() => {
                warn!(%query, %language, error = %e, "Primary attempt failed; skipping");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn record(title: &str, url: &str) -> ClaimRecord {
        ClaimRecord {
            title: title.to_string(),
            review_url: url.to_string(),
            rating: "False".to_string(),
            ..Default::default()
        }
    }

    /// Primary source answering from a `(query, language)` table.
    #[derive(Default)]
    struct ScriptedPrimary {
        answers: HashMap<(String, String), Vec<ClaimRecord>>,
        failing: HashSet<(String, String)>,
        missing_key: bool,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedPrimary {
        fn answer(mut self, query: &str, lang: &str, records: Vec<ClaimRecord>) -> Self {
            self.answers.insert((query.to_string(), lang.to_string()), records);
            self
        }

        fn fail(mut self, query: &str, lang: &str) -> Self {
            self.failing.insert((query.to_string(), lang.to_string()));
            self
        }

        fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl PrimarySource for ScriptedPrimary {
        async fn search(&self, query: &str, language: &str) -> Result<SearchResult, SearchError> {
            let key = (query.to_string(), language.to_string());
            self.calls.lock().unwrap().push(key.clone());
            if self.missing_key {
                return Err(SearchError::MissingCredential);
            }
            if self.failing.contains(&key) {
                return Err(SearchError::Upstream {
                    status: 503,
                    body: "unavailable".to_string(),
                });
            }
            Ok(SearchResult {
                query: query.to_string(),
                results: self.answers.get(&key).cloned().unwrap_or_default(),
            })
        }
    }

    #[derive(Default)]
    struct ScriptedRegional {
        records: Vec<ClaimRecord>,
        calls: Mutex<usize>,
    }

    impl ScriptedRegional {
        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    impl RegionalSearch for ScriptedRegional {
        async fn search(&self, query: &str) -> SearchResult {
            *self.calls.lock().unwrap() += 1;
            SearchResult {
                query: query.to_string(),
                results: self.records.clone(),
            }
        }
    }

    #[test]
    fn test_accumulator_keeps_one_per_title_and_url() {
        let mut acc = Accumulator::default();
        let mut unrated = record("Same", "https://x.test/1");
        unrated.rating.clear();

        assert_eq!(acc.extend(vec![record("Same", "https://x.test/1"), unrated]), 1);
        assert_eq!(acc.extend(vec![record("Same", "https://x.test/2")]), 1);
        assert_eq!(acc.len(), 2);
        assert_eq!(acc.results[0].rating, "False", "first seen wins, no merging");
    }

    #[test]
    fn test_language_order() {
        assert_eq!(language_order("en"), vec!["en", "es", "auto"]);
        assert_eq!(language_order("es"), vec!["es", "en", "auto"]);
        assert_eq!(language_order("auto"), vec!["auto", "es"]);
    }

    #[tokio::test]
    async fn test_direct_hit_skips_expansion_and_regional() {
        let primary = ScriptedPrimary::default().answer(
            "the earth is flat",
            "en",
            vec![record("Is the Earth flat?", "https://snopes.test/flat")],
        );
        let regional = ScriptedRegional::default();
        let settings = AggregatorSettings::default();

        let result = Aggregator::new(&primary, &regional, &settings)
            .search("the earth is flat", "en", false)
            .await
            .unwrap();

        assert_eq!(result.results.len(), 1);
        assert_eq!(primary.calls().len(), 1);
        assert_eq!(regional.calls(), 0);
    }

    #[tokio::test]
    async fn test_all_empty_tries_every_pair_then_regional_once() {
        let primary = ScriptedPrimary::default();
        let regional = ScriptedRegional {
            records: vec![record("Dubawa: flat earth", "https://dubawa.test/1")],
            ..Default::default()
        };
        let settings = AggregatorSettings::default();

        let result = Aggregator::new(&primary, &regional, &settings)
            .search("the earth is flat", "en", false)
            .await
            .unwrap();

        let variants = settings.variants("the earth is flat").len();
        assert_eq!(primary.calls().len(), 3 * variants);
        let unique: HashSet<_> = primary.calls().into_iter().collect();
        assert_eq!(unique.len(), primary.calls().len(), "no pair tried twice");
        assert_eq!(regional.calls(), 1);
        assert_eq!(result.results.len(), 1);
        assert_eq!(result.results[0].title, "Dubawa: flat earth");
    }

    #[tokio::test]
    async fn test_expansion_dedups_and_stops_at_threshold() {
        let q = "fuel price";
        let shared = record("Fuel price claim", "https://x.test/shared");
        let primary = ScriptedPrimary::default()
            .answer("\"fuel price\"", "en", vec![shared.clone(), record("A", "https://x.test/a")])
            .answer("fuel price fact-check", "en", vec![shared.clone(), record("B", "https://x.test/b")])
            .answer("fuel price false", "en", vec![record("C", "https://x.test/c")])
            .answer("fuel price misinformation", "en", vec![record("D", "https://x.test/d")])
            .answer("fuel price verificación", "en", vec![record("E", "https://x.test/e")])
            .answer("fuel price falso", "en", vec![record("F", "https://x.test/f")]);
        let regional = ScriptedRegional::default();
        let settings = AggregatorSettings {
            early_stop: 5,
            ..AggregatorSettings::default()
        };

        let result = Aggregator::new(&primary, &regional, &settings)
            .search(q, "en", false)
            .await
            .unwrap();

        let titles: Vec<_> = result.results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Fuel price claim", "A", "B", "C", "D"]);
        // Direct attempt, then four variants; the plain query in "en" is not retried.
        assert_eq!(primary.calls().len(), 5);
        assert_eq!(primary.calls()[0], ("fuel price".to_string(), "en".to_string()));
        assert_eq!(regional.calls(), 0);
    }

    #[tokio::test]
    async fn test_zero_threshold_does_not_stop_empty_expansion() {
        let primary = ScriptedPrimary::default();
        let regional = ScriptedRegional::default();
        let settings = AggregatorSettings {
            early_stop: 0,
            ..AggregatorSettings::default()
        };

        let result = Aggregator::new(&primary, &regional, &settings)
            .search("claim", "en", false)
            .await
            .unwrap();

        assert!(result.results.is_empty());
        assert_eq!(primary.calls().len(), 3 * settings.variants("claim").len());
        assert_eq!(regional.calls(), 1);
    }

    #[tokio::test]
    async fn test_regional_mode_uses_regional_first() {
        let primary = ScriptedPrimary::default();
        let regional = ScriptedRegional {
            records: vec![record("Local check", "https://africacheck.test/1")],
            ..Default::default()
        };
        let settings = AggregatorSettings::default();

        let result = Aggregator::new(&primary, &regional, &settings)
            .search("claim", "en", true)
            .await
            .unwrap();

        assert_eq!(result.results.len(), 1);
        assert_eq!(regional.calls(), 1);
        assert!(primary.calls().is_empty());
    }

    #[tokio::test]
    async fn test_regional_mode_falls_back_to_primary_without_second_crawl() {
        let primary = ScriptedPrimary::default().answer("claim", "en", vec![record("Global", "https://g.test/1")]);
        let regional = ScriptedRegional::default();
        let settings = AggregatorSettings::default();

        let result = Aggregator::new(&primary, &regional, &settings)
            .search("claim", "en", true)
            .await
            .unwrap();

        assert_eq!(result.results[0].title, "Global");
        assert_eq!(regional.calls(), 1);
    }

    #[tokio::test]
    async fn test_upstream_failures_are_skipped() {
        let primary = ScriptedPrimary::default()
            .fail("claim", "en")
            .answer("\"claim\"", "en", vec![record("Quoted", "https://g.test/q")]);
        let regional = ScriptedRegional::default();
        let settings = AggregatorSettings::default();

        let result = Aggregator::new(&primary, &regional, &settings)
            .search("claim", "en", false)
            .await
            .unwrap();

        assert_eq!(result.results[0].title, "Quoted");
        assert_eq!(regional.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_credential_aborts() {
        let primary = ScriptedPrimary {
            missing_key: true,
            ..Default::default()
        };
        let regional = ScriptedRegional::default();
        let settings = AggregatorSettings::default();

        let err = Aggregator::new(&primary, &regional, &settings)
            .search("claim", "en", false)
            .await
            .unwrap_err();

        assert!(matches!(err, SearchError::MissingCredential));
        assert_eq!(primary.calls().len(), 1);
        assert_eq!(regional.calls(), 0);
    }

    #[tokio::test]
    async fn test_blank_query_is_rejected() {
        let primary = ScriptedPrimary::default();
        let regional = ScriptedRegional::default();
        let settings = AggregatorSettings::default();

        let err = Aggregator::new(&primary, &regional, &settings)
            .search("   ", "en", false)
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::MissingParameter("q")));
        assert!(primary.calls().is_empty());
    }
}
