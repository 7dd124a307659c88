use chrono::{DateTime, TimeZone, Utc};

use crate::model::plugin::PluginSummary;

/// Bundled stand-in for the registry, served when `registry.use_fixture_data` is set.
pub fn fixture_plugins() -> Vec<PluginSummary> {
    vec![
        entry(
            "yoapi_plugin_demoapi",
            "Minimal example plugin exposing a demo endpoint",
            Some("Python"),
            (42, 7),
            timestamp(2025, 5, 20),
        ),
        entry(
            "yoapi_plugin_log",
            "Structured request logging with rotating files",
            Some("Python"),
            (18, 3),
            timestamp(2025, 4, 2),
        ),
        entry(
            "yoapi_plugin_utils",
            "Shared helpers for writing YoAPI plugins",
            None,
            (9, 1),
            timestamp(2025, 1, 11),
        ),
    ]
}

fn entry(
    name: &str,
    description: &str,
    language: Option<&str>,
    (stars, forks): (u64, u64),
    updated_at: Option<DateTime<Utc>>,
) -> PluginSummary {
    let owner = "WaveYo";
    PluginSummary {
        full_name: format!("{owner}/{name}"),
        name: name.to_string(),
        owner: owner.to_string(),
        description: description.to_string(),
        language: language.map(str::to_string),
        html_url: format!("https://github.com/{owner}/{name}"),
        stargazers_count: stars,
        forks_count: forks,
        updated_at,
    }
}

fn timestamp(year: i32, month: u32, day: u32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn fixture_names_are_unique_and_well_formed() {
        let plugins = fixture_plugins();
        let names: HashSet<_> = plugins.iter().map(|p| p.full_name.as_str()).collect();
        assert_eq!(names.len(), plugins.len());
        for plugin in &plugins {
            assert_eq!(plugin.full_name, format!("{}/{}", plugin.owner, plugin.name));
            assert!(plugin.updated_at.is_some());
        }
    }
}
