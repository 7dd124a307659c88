//! Client-side search and pagination over the currently loaded server page.
//!
//! Filtering never reaches past the page the registry last returned, and the
//! page count shown to the user is derived from the filtered subset of that
//! page alone.

use crate::model::plugin::PluginSummary;

/// Search term and client page number. Both are local to the view and
/// independent of server paging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchState {
    pub term: String,
    /// 1-based.
    pub current_page: usize,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            term: String::new(),
            current_page: 1,
        }
    }
}

impl SearchState {
    /// Pull `current_page` back into `[1, total_pages]`.
    pub fn clamp_page(&mut self, total_pages: usize) {
        self.current_page = self.current_page.clamp(1, total_pages.max(1));
    }
}

/// Case-insensitive substring match against name, description, or owner.
pub fn matches(plugin: &PluginSummary, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }

    let needle = term.to_lowercase();
    [&plugin.name, &plugin.description, &plugin.owner]
        .into_iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

pub fn total_pages(filtered_count: usize, items_per_page: usize) -> usize {
    filtered_count.div_ceil(items_per_page.max(1)).max(1)
}

/// What the user currently sees after filtering and slicing.
#[derive(Debug)]
pub struct PageView<'a> {
    /// Visible entries, each paired with its index into the loaded server page.
    pub visible: Vec<(usize, &'a PluginSummary)>,
    pub filtered_count: usize,
    pub total_pages: usize,
    pub current_page: usize,
}

impl PageView<'_> {
    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

/// Filter `items` by `search.term` and cut out the slice for `search.current_page`.
///
/// A page past the end yields an empty slice; callers clamp first if they care.
pub fn compute_view<'a>(
    items: &'a [PluginSummary],
    search: &SearchState,
    items_per_page: usize,
) -> PageView<'a> {
    let per_page = items_per_page.max(1);
    let filtered: Vec<(usize, &PluginSummary)> = items
        .iter()
        .enumerate()
        .filter(|(_, plugin)| matches(plugin, &search.term))
        .collect();

    let filtered_count = filtered.len();
    let total_pages = total_pages(filtered_count, per_page);
    let current_page = search.current_page.max(1);
    let start = (current_page - 1).saturating_mul(per_page);

    let visible = filtered.into_iter().skip(start).take(per_page).collect();

    PageView {
        visible,
        filtered_count,
        total_pages,
        current_page,
    }
}

/// Statistic line shown above the grid.
pub fn stats_line(term: &str, filtered_count: usize, total_count: u64) -> String {
    if term.is_empty() {
        let noun = if total_count == 1 { "plugin" } else { "plugins" };
        format!("{total_count} {noun} available")
    } else {
        let noun = if filtered_count == 1 {
            "plugin"
        } else {
            "plugins"
        };
        format!("found {filtered_count} matching {noun}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixture::fixture_plugins;

    fn plugin(name: &str, description: &str, owner: &str) -> PluginSummary {
        PluginSummary {
            full_name: format!("{owner}/{name}"),
            name: name.to_string(),
            owner: owner.to_string(),
            description: description.to_string(),
            language: None,
            html_url: String::new(),
            stargazers_count: 0,
            forks_count: 0,
            updated_at: None,
        }
    }

    fn filter_items<'a>(items: &'a [PluginSummary], term: &str) -> Vec<&'a PluginSummary> {
        items.iter().filter(|item| matches(item, term)).collect()
    }

    fn many(count: usize) -> Vec<PluginSummary> {
        (0..count)
            .map(|i| plugin(&format!("plugin_{i}"), "", "owner"))
            .collect()
    }

    #[test]
    fn empty_term_keeps_everything() {
        let items = fixture_plugins();
        let filtered = filter_items(&items, "");
        assert_eq!(filtered.len(), items.len());
        assert!(filtered.iter().zip(&items).all(|(a, b)| *a == b));
    }

    #[test]
    fn match_is_case_insensitive_across_fields() {
        let item = plugin("yoapi_plugin_log", "Request LOGGING", "WaveYo");
        assert!(matches(&item, "LOG"));
        assert!(matches(&item, "logging"));
        assert!(matches(&item, "waveyo"));
        assert!(!matches(&item, "metrics"));
    }

    #[test]
    fn search_never_expands() {
        let items = fixture_plugins();
        for term in ["y", "plugin", "zzz", "Wave", "demo"] {
            assert!(filter_items(&items, term).len() <= items.len());
        }
    }

    #[test]
    fn filtering_is_idempotent() {
        let items = fixture_plugins();
        let once: Vec<PluginSummary> = filter_items(&items, "log").into_iter().cloned().collect();
        let twice = filter_items(&once, "log");
        assert_eq!(twice.len(), once.len());
        assert!(twice.iter().zip(&once).all(|(a, b)| *a == b));
    }

    #[test]
    fn total_pages_is_at_least_one() {
        assert_eq!(total_pages(0, 12), 1);
        assert_eq!(total_pages(12, 12), 1);
        assert_eq!(total_pages(13, 12), 2);
        assert_eq!(total_pages(50, 12), 5);
    }

    #[test]
    fn fixture_fits_one_page() {
        let items = fixture_plugins();
        let view = compute_view(&items, &SearchState::default(), 12);
        assert_eq!(view.total_pages, 1);
        assert_eq!(view.visible.len(), 3);
        assert!(!view.has_prev());
        assert!(!view.has_next());
    }

    #[test]
    fn log_search_shows_one_match() {
        let items = vec![
            plugin("yoapi_plugin_log", "", "WaveYo"),
            plugin("yoapi_plugin_utils", "", "WaveYo"),
        ];
        let search = SearchState {
            term: "log".to_string(),
            current_page: 1,
        };
        let view = compute_view(&items, &search, 12);
        assert_eq!(view.visible.len(), 1);
        assert_eq!(view.visible[0].1.name, "yoapi_plugin_log");
        assert_eq!(stats_line(&search.term, view.filtered_count, 2), "found 1 matching plugin");
    }

    #[test]
    fn visible_slice_is_bounded_and_indexed_into_source() {
        let items = many(10);
        let search = SearchState {
            term: String::new(),
            current_page: 3,
        };
        let view = compute_view(&items, &search, 4);
        assert_eq!(view.total_pages, 3);
        let indices: Vec<usize> = view.visible.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![8, 9]);

        for page in 1..=3 {
            let search = SearchState {
                term: String::new(),
                current_page: page,
            };
            assert!(compute_view(&items, &search, 4).visible.len() <= 4);
        }
    }

    #[test]
    fn page_past_end_is_empty_until_clamped() {
        let items = many(30);
        let mut search = SearchState {
            term: "plugin_2".to_string(),
            current_page: 3,
        };
        let view = compute_view(&items, &search, 12);
        assert_eq!(view.total_pages, 1);
        assert!(view.visible.is_empty());

        search.clamp_page(view.total_pages);
        assert_eq!(search.current_page, 1);
        assert!(!compute_view(&items, &search, 12).visible.is_empty());
    }

    #[test]
    fn clamp_never_goes_below_one() {
        let mut search = SearchState {
            term: String::new(),
            current_page: 0,
        };
        search.clamp_page(0);
        assert_eq!(search.current_page, 1);
    }

    #[test]
    fn stats_line_without_term_uses_server_total() {
        assert_eq!(stats_line("", 12, 50), "50 plugins available");
        assert_eq!(stats_line("", 1, 1), "1 plugin available");
        assert_eq!(stats_line("x", 0, 50), "found 0 matching plugins");
    }
}
