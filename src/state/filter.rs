/// Catalog discovery filter and search debouncing
///
/// The catalog is narrowed by exactly one predicate at a time: a free-text
/// search, or a region, category or country pick. Selecting any predicate
/// replaces whatever was active before; an empty value clears everything.

use std::time::Duration;

/// Quiet interval a search keystroke must survive before it is emitted.
pub const SEARCH_QUIET_INTERVAL: Duration = Duration::from_millis(300);

/// The single active catalog predicate.
///
/// Mutual exclusivity is structural: this is one value, not four fields, so
/// setting one predicate cannot leave another behind.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TileFilter {
    /// No constraint; the catalog decides ordering and limit
    #[default]
    None,
    /// Free-text search over the catalog
    Query(String),
    Region(String),
    Category(String),
    Country(String),
}

impl TileFilter {
    fn wrap(make: impl FnOnce(String) -> TileFilter, value: impl Into<String>) -> TileFilter {
        let value = value.into();
        if value.is_empty() {
            TileFilter::None
        } else {
            make(value)
        }
    }

    pub fn set_query(&mut self, text: impl Into<String>) {
        *self = Self::wrap(TileFilter::Query, text);
    }

    pub fn set_region(&mut self, region: impl Into<String>) {
        *self = Self::wrap(TileFilter::Region, region);
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        *self = Self::wrap(TileFilter::Category, category);
    }

    pub fn set_country(&mut self, country: impl Into<String>) {
        *self = Self::wrap(TileFilter::Country, country);
    }

    /// The outbound query parameter for `GET /api/tiles`, if any.
    pub fn query_param(&self) -> Option<(&'static str, &str)> {
        match self {
            TileFilter::None => None,
            TileFilter::Query(q) => Some(("q", q)),
            TileFilter::Region(r) => Some(("region", r)),
            TileFilter::Category(c) => Some(("category", c)),
            TileFilter::Country(c) => Some(("country", c)),
        }
    }

    /// The region to show as picked in the region list, if the active
    /// predicate is a region.
    pub fn region(&self) -> Option<&str> {
        match self {
            TileFilter::Region(r) => Some(r),
            _ => None,
        }
    }

    pub fn category(&self) -> Option<&str> {
        match self {
            TileFilter::Category(c) => Some(c),
            _ => None,
        }
    }

    pub fn country(&self) -> Option<&str> {
        match self {
            TileFilter::Country(c) => Some(c),
            _ => None,
        }
    }
}

/// Collapses rapid search keystrokes into a single query emission.
///
/// Every keystroke records the new text and bumps a generation counter; the
/// caller schedules a [`SEARCH_QUIET_INTERVAL`] timer tagged with that
/// generation. When a timer fires, only the one matching the current
/// generation emits; timers superseded by later keystrokes are ignored.
#[derive(Debug, Default)]
pub struct SearchDebouncer {
    text: String,
    generation: u64,
}

impl SearchDebouncer {
    /// Record a keystroke. Returns the generation the caller should tag its
    /// timer with; any previously scheduled timer is implicitly cancelled
    /// because its generation no longer matches.
    pub fn keystroke(&mut self, text: impl Into<String>) -> u64 {
        self.text = text.into();
        self.generation += 1;
        self.generation
    }

    /// A timer fired. Emits the pending text if no later keystroke arrived
    /// in the meantime.
    pub fn elapsed(&self, generation: u64) -> Option<&str> {
        if generation == self.generation {
            Some(&self.text)
        } else {
            None
        }
    }

    /// The text as currently typed, for echoing into the input widget.
    pub fn text(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_active_predicate() {
        let mut filter = TileFilter::default();
        assert_eq!(filter, TileFilter::None);

        filter.set_query("lake");
        filter.set_region("Europe");
        filter.set_category("Agriculture");
        filter.set_country("Italy");

        // Only the last setter survives, whatever the sequence was
        assert_eq!(filter, TileFilter::Country("Italy".into()));
        assert_eq!(filter.query_param(), Some(("country", "Italy")));

        filter.set_query("forest");
        assert_eq!(filter, TileFilter::Query("forest".into()));
        assert_eq!(filter.region(), None);
        assert_eq!(filter.country(), None);
    }

    #[test]
    fn test_empty_value_clears() {
        let mut filter = TileFilter::default();
        filter.set_region("Europe");
        filter.set_region("");
        assert_eq!(filter, TileFilter::None);
        assert_eq!(filter.query_param(), None);

        filter.set_query("");
        assert_eq!(filter, TileFilter::None);
    }

    #[test]
    fn test_query_param_per_predicate() {
        let mut filter = TileFilter::default();

        filter.set_query("alps");
        assert_eq!(filter.query_param(), Some(("q", "alps")));

        filter.set_region("Europe");
        assert_eq!(filter.query_param(), Some(("region", "Europe")));

        filter.set_category("Forest");
        assert_eq!(filter.query_param(), Some(("category", "Forest")));
    }

    #[test]
    fn test_debounce_emits_last_value_once() {
        let mut debouncer = SearchDebouncer::default();

        // Three keystrokes inside the quiet interval
        let g1 = debouncer.keystroke("v");
        let g2 = debouncer.keystroke("ve");
        let g3 = debouncer.keystroke("ven");

        // Timers for superseded keystrokes fire into the void
        assert_eq!(debouncer.elapsed(g1), None);
        assert_eq!(debouncer.elapsed(g2), None);

        // Only the timer matching the last keystroke emits, with its value
        assert_eq!(debouncer.elapsed(g3), Some("ven"));
    }

    #[test]
    fn test_debounce_restarts_per_keystroke() {
        let mut debouncer = SearchDebouncer::default();

        let g1 = debouncer.keystroke("a");
        assert_eq!(debouncer.elapsed(g1), Some("a"));

        // A quiet period later, a new keystroke starts a fresh cycle
        let g2 = debouncer.keystroke("ab");
        assert_eq!(debouncer.elapsed(g1), None);
        assert_eq!(debouncer.elapsed(g2), Some("ab"));
    }
}
