use crate::debounce::Debouncer;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use viaro_core::routes::{BusRoute, RouteCatalog};
use viaro_core::search::CitySuggestion;

/// Which half of the journey an autocomplete field feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchField {
    Origin,
    Destination,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Quiet period after the last keystroke before the catalog is queried.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Queries shorter than this never reach the catalog.
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,
    /// Upper bound on suggestions shown per field.
    #[serde(default = "default_suggestion_cap")]
    pub suggestion_cap: usize,
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_min_query_len() -> usize {
    2
}

fn default_suggestion_cap() -> usize {
    20
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            min_query_len: default_min_query_len(),
            suggestion_cap: default_suggestion_cap(),
        }
    }
}

/// Everything one autocomplete field tracks, held together so the flags can
/// never drift apart across parallel maps.
#[derive(Debug)]
struct FieldState {
    query: String,
    suggestions: Vec<CitySuggestion>,
    is_open: bool,
    is_loading: bool,
    /// Bumped on every keystroke, pick and dismiss; a lookup result is
    /// dropped unless it still carries the current value.
    seq: u64,
    debouncer: Debouncer,
}

impl FieldState {
    fn new(delay: Duration) -> Self {
        Self {
            query: String::new(),
            suggestions: Vec::new(),
            is_open: false,
            is_loading: false,
            seq: 0,
            debouncer: Debouncer::new(delay),
        }
    }
}

/// Snapshot of one field handed to the UI.
#[derive(Debug, Clone, Serialize)]
pub struct AutocompleteView {
    pub query: String,
    pub suggestions: Vec<CitySuggestion>,
    pub is_open: bool,
    pub is_loading: bool,
}

struct ResolverInner {
    catalog: Arc<dyn RouteCatalog>,
    config: ResolverConfig,
    origin: Mutex<FieldState>,
    destination: Mutex<FieldState>,
}

impl ResolverInner {
    fn field(&self, field: SearchField) -> MutexGuard<'_, FieldState> {
        let slot = match field {
            SearchField::Origin => &self.origin,
            SearchField::Destination => &self.destination,
        };
        // A panicked lookup task must not wedge the field forever.
        slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn run_lookup(inner: Arc<ResolverInner>, field: SearchField, query: String, seq: u64) {
        let lookup = inner.catalog.list_routes().await;
        let suggestions = match lookup {
            Ok(routes) => suggestions_for(&routes, &query, inner.config.suggestion_cap),
            Err(err) => {
                tracing::warn!("Route lookup failed for {:?} field: {}", field, err);
                Vec::new()
            }
        };

        let mut state = inner.field(field);
        if state.seq != seq {
            return; // a newer query superseded this lookup while it was in flight
        }
        state.is_loading = false;
        state.is_open = !suggestions.is_empty();
        state.suggestions = suggestions;
    }
}

/// Debounced city autocomplete over the route network, one independent state
/// per search field.
#[derive(Clone)]
pub struct CityResolver {
    inner: Arc<ResolverInner>,
}

impl CityResolver {
    pub fn new(catalog: Arc<dyn RouteCatalog>, config: ResolverConfig) -> Self {
        let delay = Duration::from_millis(config.debounce_ms);
        Self {
            inner: Arc::new(ResolverInner {
                catalog,
                config,
                origin: Mutex::new(FieldState::new(delay)),
                destination: Mutex::new(FieldState::new(delay)),
            }),
        }
    }

    /// Record a keystroke. Short queries close the dropdown without touching
    /// the catalog; longer ones (re)arm the debounce timer.
    pub fn note_input(&self, field: SearchField, text: &str) {
        let mut state = self.inner.field(field);
        state.query = text.to_string();
        state.seq = state.seq.wrapping_add(1);

        if text.chars().count() < self.inner.config.min_query_len {
            state.debouncer.cancel();
            state.suggestions.clear();
            state.is_open = false;
            state.is_loading = false;
            return;
        }

        let seq = state.seq;
        let query = text.to_string();
        let inner = Arc::clone(&self.inner);
        state.is_loading = true;
        state.debouncer.schedule(async move {
            ResolverInner::run_lookup(inner, field, query, seq).await;
        });
    }

    /// Commit a suggestion into the field. Returns the chosen city, or `None`
    /// if the id is not currently in the dropdown.
    pub fn pick_suggestion(
        &self,
        field: SearchField,
        suggestion_id: &str,
    ) -> Option<CitySuggestion> {
        let mut state = self.inner.field(field);
        let picked = state
            .suggestions
            .iter()
            .find(|suggestion| suggestion.id == suggestion_id)
            .cloned()?;
        state.query = picked.name.clone();
        state.suggestions.clear();
        state.is_open = false;
        state.is_loading = false;
        state.seq = state.seq.wrapping_add(1);
        state.debouncer.cancel();
        Some(picked)
    }

    /// Close the dropdown and drop its suggestions, leaving the typed text
    /// alone (focus left the field).
    pub fn dismiss(&self, field: SearchField) {
        let mut state = self.inner.field(field);
        state.suggestions.clear();
        state.is_open = false;
        state.is_loading = false;
        state.seq = state.seq.wrapping_add(1);
        state.debouncer.cancel();
    }

    pub fn view(&self, field: SearchField) -> AutocompleteView {
        let state = self.inner.field(field);
        AutocompleteView {
            query: state.query.clone(),
            suggestions: state.suggestions.clone(),
            is_open: state.is_open,
            is_loading: state.is_loading,
        }
    }
}

/// Case-insensitive substring match over every city named by the route
/// network, deduplicated, capped.
fn suggestions_for(routes: &[BusRoute], query: &str, cap: usize) -> Vec<CitySuggestion> {
    let needle = query.to_lowercase();
    let mut seen = HashSet::new();
    let mut matches = Vec::new();
    for city in routes
        .iter()
        .flat_map(|route| [route.source.as_str(), route.destination.as_str()])
    {
        if matches.len() == cap {
            break;
        }
        let folded = city.to_lowercase();
        if !folded.contains(&needle) || !seen.insert(folded) {
            continue;
        }
        matches.push(CitySuggestion::from_name(city));
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingCatalog {
        routes: Vec<BusRoute>,
        calls: AtomicUsize,
        delays: Mutex<VecDeque<Duration>>,
    }

    impl CountingCatalog {
        fn new(routes: Vec<BusRoute>) -> Self {
            Self {
                routes,
                calls: AtomicUsize::new(0),
                delays: Mutex::new(VecDeque::new()),
            }
        }

        fn with_delays(routes: Vec<BusRoute>, delays: Vec<Duration>) -> Self {
            let catalog = Self::new(routes);
            *catalog.delays.lock().unwrap() = delays.into();
            catalog
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RouteCatalog for CountingCatalog {
        async fn list_routes(
            &self,
        ) -> Result<Vec<BusRoute>, Box<dyn std::error::Error + Send + Sync>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let delay = self.delays.lock().unwrap().pop_front();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            Ok(self.routes.clone())
        }
    }

    struct FailingCatalog;

    #[async_trait]
    impl RouteCatalog for FailingCatalog {
        async fn list_routes(
            &self,
        ) -> Result<Vec<BusRoute>, Box<dyn std::error::Error + Send + Sync>> {
            Err("catalog offline".into())
        }
    }

    fn sample_routes() -> Vec<BusRoute> {
        vec![
            BusRoute::new("New Delhi", "Mumbai"),
            BusRoute::new("Mumbai", "Pune"),
            BusRoute::new("Ahmedabad", "Mumbai"),
            BusRoute::new("Bangalore", "Chennai"),
        ]
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_query_closes_without_lookup() {
        let catalog = Arc::new(CountingCatalog::new(sample_routes()));
        let resolver = CityResolver::new(catalog.clone(), ResolverConfig::default());

        resolver.note_input(SearchField::Origin, "m");
        tokio::time::sleep(ms(500)).await;

        let view = resolver.view(SearchField::Origin);
        assert!(!view.is_open);
        assert!(view.suggestions.is_empty());
        assert_eq!(catalog.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_query_clears_previous_suggestions() {
        let catalog = Arc::new(CountingCatalog::new(sample_routes()));
        let resolver = CityResolver::new(catalog.clone(), ResolverConfig::default());

        resolver.note_input(SearchField::Origin, "mum");
        tokio::time::sleep(ms(400)).await;
        assert!(resolver.view(SearchField::Origin).is_open);

        resolver.note_input(SearchField::Origin, "m");
        let view = resolver.view(SearchField::Origin);
        assert!(!view.is_open);
        assert!(view.suggestions.is_empty());
        assert_eq!(catalog.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_keystrokes_collapse_to_one_lookup() {
        let catalog = Arc::new(CountingCatalog::new(sample_routes()));
        let resolver = CityResolver::new(catalog.clone(), ResolverConfig::default());

        resolver.note_input(SearchField::Origin, "mu");
        tokio::time::sleep(ms(100)).await;
        resolver.note_input(SearchField::Origin, "mum");
        tokio::time::sleep(ms(100)).await;
        resolver.note_input(SearchField::Origin, "mumb");
        tokio::time::sleep(ms(400)).await;

        assert_eq!(catalog.calls(), 1);
        let view = resolver.view(SearchField::Origin);
        assert!(view.is_open);
        assert_eq!(view.suggestions.len(), 1);
        assert_eq!(view.suggestions[0].name, "Mumbai");
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_keystrokes_trigger_separate_lookups() {
        let catalog = Arc::new(CountingCatalog::new(sample_routes()));
        let resolver = CityResolver::new(catalog.clone(), ResolverConfig::default());

        resolver.note_input(SearchField::Origin, "mu");
        tokio::time::sleep(ms(400)).await;
        resolver.note_input(SearchField::Origin, "mum");
        tokio::time::sleep(ms(400)).await;

        assert_eq!(catalog.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_query_wins_over_slow_lookup() {
        let catalog = Arc::new(CountingCatalog::with_delays(
            sample_routes(),
            vec![ms(600), ms(0)],
        ));
        let resolver = CityResolver::new(catalog.clone(), ResolverConfig::default());

        resolver.note_input(SearchField::Origin, "de");
        tokio::time::sleep(ms(350)).await; // first lookup is now stuck in the catalog
        resolver.note_input(SearchField::Origin, "mum");
        tokio::time::sleep(ms(1000)).await;

        let view = resolver.view(SearchField::Origin);
        assert_eq!(view.query, "mum");
        assert!(view.suggestions.iter().all(|s| s.name == "Mumbai"));
        assert!(view.is_open);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loading_flag_tracks_lookup_flight() {
        let catalog = Arc::new(CountingCatalog::with_delays(sample_routes(), vec![ms(200)]));
        let resolver = CityResolver::new(catalog.clone(), ResolverConfig::default());

        resolver.note_input(SearchField::Origin, "mum");
        tokio::time::sleep(ms(350)).await;
        assert!(resolver.view(SearchField::Origin).is_loading);

        tokio::time::sleep(ms(250)).await;
        let view = resolver.view(SearchField::Origin);
        assert!(!view.is_loading);
        assert!(view.is_open);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pick_suggestion_fills_query_and_closes() {
        let catalog = Arc::new(CountingCatalog::new(sample_routes()));
        let resolver = CityResolver::new(catalog.clone(), ResolverConfig::default());

        resolver.note_input(SearchField::Destination, "pun");
        tokio::time::sleep(ms(400)).await;

        let view = resolver.view(SearchField::Destination);
        let id = view.suggestions[0].id.clone();
        let picked = resolver.pick_suggestion(SearchField::Destination, &id).unwrap();
        assert_eq!(picked.name, "Pune");

        let after = resolver.view(SearchField::Destination);
        assert_eq!(after.query, "Pune");
        assert!(!after.is_open);
        assert!(after.suggestions.is_empty());

        assert!(resolver
            .pick_suggestion(SearchField::Destination, "nowhere")
            .is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_keeps_text_and_closes() {
        let catalog = Arc::new(CountingCatalog::new(sample_routes()));
        let resolver = CityResolver::new(catalog.clone(), ResolverConfig::default());

        resolver.note_input(SearchField::Origin, "mum");
        tokio::time::sleep(ms(400)).await;
        assert!(resolver.view(SearchField::Origin).is_open);

        resolver.dismiss(SearchField::Origin);
        let view = resolver.view(SearchField::Origin);
        assert!(!view.is_open);
        assert!(view.suggestions.is_empty(), "dismissal drops the list");
        assert_eq!(view.query, "mum");
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_mid_flight_stays_closed() {
        let catalog = Arc::new(CountingCatalog::with_delays(sample_routes(), vec![ms(500)]));
        let resolver = CityResolver::new(catalog.clone(), ResolverConfig::default());

        resolver.note_input(SearchField::Origin, "mum");
        tokio::time::sleep(ms(320)).await;
        resolver.dismiss(SearchField::Origin);
        tokio::time::sleep(ms(600)).await;

        let view = resolver.view(SearchField::Origin);
        assert!(!view.is_open);
        assert!(view.suggestions.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fields_do_not_share_state() {
        let catalog = Arc::new(CountingCatalog::new(sample_routes()));
        let resolver = CityResolver::new(catalog.clone(), ResolverConfig::default());

        resolver.note_input(SearchField::Origin, "mum");
        resolver.note_input(SearchField::Destination, "chen");
        tokio::time::sleep(ms(400)).await;

        let origin = resolver.view(SearchField::Origin);
        let destination = resolver.view(SearchField::Destination);
        assert_eq!(origin.suggestions[0].name, "Mumbai");
        assert_eq!(destination.suggestions[0].name, "Chennai");
        assert_eq!(catalog.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_suggestions_are_deduped_and_case_folded() {
        let catalog = Arc::new(CountingCatalog::new(sample_routes()));
        let resolver = CityResolver::new(catalog.clone(), ResolverConfig::default());

        resolver.note_input(SearchField::Origin, "MUM");
        tokio::time::sleep(ms(400)).await;

        let view = resolver.view(SearchField::Origin);
        assert_eq!(view.suggestions.len(), 1, "Mumbai appears on three routes");
        assert_eq!(view.suggestions[0].name, "Mumbai");
    }

    #[tokio::test(start_paused = true)]
    async fn test_suggestion_cap_is_enforced() {
        let catalog = Arc::new(CountingCatalog::new(vec![
            BusRoute::new("Mumbai", "Mumbra"),
            BusRoute::new("Navi Mumbai", "Mussoorie"),
        ]));
        let config = ResolverConfig {
            suggestion_cap: 2,
            ..ResolverConfig::default()
        };
        let resolver = CityResolver::new(catalog.clone(), config);

        resolver.note_input(SearchField::Origin, "mu");
        tokio::time::sleep(ms(400)).await;

        assert_eq!(resolver.view(SearchField::Origin).suggestions.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_catalog_failure_degrades_to_empty() {
        let resolver = CityResolver::new(Arc::new(FailingCatalog), ResolverConfig::default());

        resolver.note_input(SearchField::Origin, "mum");
        tokio::time::sleep(ms(400)).await;

        let view = resolver.view(SearchField::Origin);
        assert!(!view.is_open);
        assert!(view.suggestions.is_empty());
        assert!(!view.is_loading);
    }
}
