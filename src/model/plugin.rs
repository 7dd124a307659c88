use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Deserializer};

/// One entry in the plugin directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PluginSummary {
    /// `owner/name`, unique across the registry.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub full_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub owner: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub html_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stargazers_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub forks_count: u64,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl PluginSummary {
    /// Fill in `full_name` from `owner` and `name` when the registry left it out.
    pub fn normalize(mut self) -> Self {
        if self.full_name.is_empty() && !self.owner.is_empty() && !self.name.is_empty() {
            self.full_name = format!("{}/{}", self.owner, self.name);
        }
        self
    }

    /// Last-updated timestamp rendered as a date in the local timezone.
    pub fn updated_label(&self) -> String {
        self.updated_at
            .map(|ts| ts.with_timezone(&Local).format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// One server page of results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageResult {
    pub items: Vec<PluginSummary>,
    pub total_count: u64,
    pub has_next_page: bool,
}

/// Registry response envelope as it arrives on the wire.
#[derive(Debug, Default, Deserialize)]
pub struct RawPage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<PluginSummary>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_next_page: bool,
}

impl From<RawPage> for PageResult {
    fn from(raw: RawPage) -> Self {
        Self {
            items: raw.items.into_iter().map(PluginSummary::normalize).collect(),
            total_count: raw.total_count,
            has_next_page: raw.has_next_page,
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    null_as_default(deserializer)
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|text| {
        DateTime::parse_from_rfc3339(&text)
            .map(|ts| ts.with_timezone(&Utc))
            .ok()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_are_defaulted() {
        let page: PageResult = serde_json::from_str::<RawPage>("{}").unwrap().into();
        assert!(page.items.is_empty());
        assert_eq!(page.total_count, 0);
        assert!(!page.has_next_page);
    }

    #[test]
    fn item_with_partial_fields_parses() {
        let body = r#"{
            "items": [{ "name": "yoapi_plugin_log", "owner": "WaveYo", "description": null }],
            "total_count": 1
        }"#;
        let page: PageResult = serde_json::from_str::<RawPage>(body).unwrap().into();
        let item = &page.items[0];
        assert_eq!(item.full_name, "WaveYo/yoapi_plugin_log");
        assert_eq!(item.description, "");
        assert_eq!(item.language, None);
        assert_eq!(item.stargazers_count, 0);
        assert_eq!(item.updated_at, None);
        assert_eq!(item.updated_label(), "unknown");
    }

    #[test]
    fn explicit_full_name_is_kept() {
        let body = r#"{ "items": [{ "full_name": "a/b", "name": "c", "owner": "d" }] }"#;
        let page: PageResult = serde_json::from_str::<RawPage>(body).unwrap().into();
        assert_eq!(page.items[0].full_name, "a/b");
    }

    #[test]
    fn updated_at_parses_rfc3339_and_tolerates_garbage() {
        let body = r#"{ "items": [
            { "name": "a", "updated_at": "2025-03-14T09:26:53Z" },
            { "name": "b", "updated_at": "last tuesday" }
        ] }"#;
        let page: PageResult = serde_json::from_str::<RawPage>(body).unwrap().into();
        let ts = page.items[0].updated_at.unwrap();
        assert_eq!(ts.to_rfc3339(), "2025-03-14T09:26:53+00:00");
        assert_eq!(page.items[1].updated_at, None);
    }

    #[test]
    fn wrong_envelope_type_is_a_decode_error() {
        assert!(serde_json::from_str::<RawPage>(r#"{ "items": "nope" }"#).is_err());
        assert!(serde_json::from_str::<RawPage>("not json").is_err());
    }
}
