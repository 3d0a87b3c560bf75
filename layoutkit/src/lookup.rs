//! Remote option sources for `lookup` and `checkbox` fields.
//!
//! Options are fetched through a [`Transport`]. Fetch failures never reach the
//! caller: they are logged and the option list degrades to empty. Lookup
//! searches are debounced so only the latest query in a burst hits the network.

use std::{
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use url::form_urlencoded;

use crate::{
    model::Properties,
    transport::{Transport, fetch},
};

/// Default debounce window for lookup searches, in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

fn default_search_field() -> String {
    "q".to_string()
}

fn default_debounce() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

/// Which response keys hold an option's label and value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ResultMap {
    pub label: String,
    pub value: String,
}

/// Properties of a `lookup` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LookupProperties {
    pub fetch_action: String,
    /// Query parameter name used for searches.
    #[serde(default = "default_search_field")]
    pub search_field: String,
    #[serde(default)]
    pub result_map: Vec<ResultMap>,
    #[serde(default)]
    pub multiple: bool,
    #[serde(default)]
    pub allow_search: bool,
    #[serde(default)]
    pub allow_add_new: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_action: Option<String>,
    /// Debounce window in milliseconds.
    #[serde(default = "default_debounce")]
    pub debounce: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub disabled: bool,
}

impl LookupProperties {
    pub fn new(fetch_action: impl Into<String>) -> Self {
        Self {
            fetch_action: fetch_action.into(),
            search_field: default_search_field(),
            result_map: Vec::new(),
            multiple: false,
            allow_search: false,
            allow_add_new: false,
            create_action: None,
            debounce: DEFAULT_DEBOUNCE_MS,
            placeholder: None,
            disabled: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LookupOption {
    pub label: String,
    pub value: String,
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn non_null<'a>(item: &'a Properties, key: &str) -> Option<&'a Value> {
    item.get(key).filter(|v| !v.is_null())
}

/// Map a raw response item to an option.
///
/// The first `result_map` pair whose label and value keys are both present
/// wins. Otherwise the item's own `label` (or `value`) and `value` are used.
pub fn resolve_mapped_option(item: &Properties, result_map: &[ResultMap]) -> LookupOption {
    for map in result_map {
        if let (Some(label), Some(value)) = (item.get(&map.label), item.get(&map.value)) {
            return LookupOption {
                label: text_of(label),
                value: text_of(value),
            };
        }
    }

    LookupOption {
        label: non_null(item, "label")
            .or_else(|| non_null(item, "value"))
            .map(text_of)
            .unwrap_or_default(),
        value: non_null(item, "value").map(text_of).unwrap_or_default(),
    }
}

/// `fetch_action` with `search_field=<query>` appended; no query for an empty search.
pub fn search_url(fetch_action: &str, search_field: &str, query: Option<&str>) -> String {
    match query.filter(|q| !q.is_empty()) {
        Some(q) => {
            let sep = if fetch_action.contains('?') { '&' } else { '?' };
            let encoded = form_urlencoded::Serializer::new(String::new())
                .append_pair(search_field, q)
                .finish();
            format!("{fetch_action}{sep}{encoded}")
        }
        None => fetch_action.to_string(),
    }
}

/// Fetch and map lookup options. Failures are logged and yield no options.
pub async fn fetch_options<X>(transport: &X, props: &LookupProperties, query: Option<&str>) -> Vec<LookupOption>
where
    X: Transport + ?Sized,
{
    let url = search_url(&props.fetch_action, &props.search_field, query);
    match fetch::<Vec<Properties>, _>(transport, &url).await {
        Ok(items) => items
            .iter()
            .map(|item| resolve_mapped_option(item, &props.result_map))
            .collect(),
        Err(e) => {
            warn!("Failed to fetch options: {e}");
            Vec::new()
        }
    }
}

/// Coalesces bursts of calls: only a call not followed by another within the
/// window runs.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    generation: Arc<AtomicU64>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Wait out the window, then run `task` unless a newer call arrived
    /// meanwhile. Superseded calls return `None` without polling `task`.
    pub async fn call<F: Future>(&self, task: F) -> Option<F::Output> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.window).await;

        if self.generation.load(Ordering::SeqCst) != ticket {
            debug!("debounced call {ticket} superseded");
            return None;
        }
        Some(task.await)
    }
}

/// Option list of one lookup field.
#[derive(Debug, Clone)]
pub struct LookupSource {
    props: LookupProperties,
    debouncer: Debouncer,
    options: Vec<LookupOption>,
}

impl LookupSource {
    pub fn new(props: LookupProperties) -> Self {
        let debouncer = Debouncer::new(Duration::from_millis(props.debounce));
        Self {
            props,
            debouncer,
            options: Vec::new(),
        }
    }

    pub fn properties(&self) -> &LookupProperties {
        &self.props
    }

    pub fn options(&self) -> &[LookupOption] {
        &self.options
    }

    /// Initial unfiltered fetch.
    pub async fn load<X: Transport + ?Sized>(&mut self, transport: &X) -> &[LookupOption] {
        self.options = fetch_options(transport, &self.props, None).await;
        &self.options
    }

    /// Debounced search. Returns `None` when a newer search superseded this one.
    pub async fn search<X: Transport + ?Sized>(&self, transport: &X, query: &str) -> Option<Vec<LookupOption>> {
        self.debouncer
            .call(fetch_options(transport, &self.props, Some(query)))
            .await
    }

    /// Replace the current options, typically with a search result.
    pub fn set_options(&mut self, options: Vec<LookupOption>) {
        self.options = options;
    }

    /// Create a new option from free text.
    ///
    /// Only when adding is allowed, a create endpoint is set and `label` is
    /// non-empty. The created option is appended to the list.
    pub async fn add_new<X: Transport + ?Sized>(&mut self, transport: &X, label: &str) -> Option<LookupOption> {
        if !self.props.allow_add_new || label.is_empty() {
            return None;
        }
        let url = self.props.create_action.as_deref()?;

        match transport.post(url, &json!({ "label": label })).await {
            Ok(Value::Object(item)) => {
                let option = resolve_mapped_option(&item, &self.props.result_map);
                self.options.push(option.clone());
                Some(option)
            }
            Ok(other) => {
                warn!("Failed to create lookup item: unexpected response {other}");
                None
            }
            Err(e) => {
                warn!("Failed to create lookup item: {e}");
                None
            }
        }
    }
}

/// One checkbox option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CheckboxOption {
    pub label: String,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
}

/// Properties of a `checkbox` field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckboxProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_action: Option<String>,
    #[serde(default)]
    pub options: Vec<CheckboxOption>,
    #[serde(default)]
    pub checked: bool,
    #[serde(default)]
    pub disabled: bool,
}

impl CheckboxProperties {
    /// A group renders several options; otherwise the field is a single toggle.
    pub fn is_group(&self) -> bool {
        self.fetch_action.is_some() || !self.options.is_empty()
    }
}

/// Checkbox options: fetched from `fetch_action` when set, else the static list.
/// A failed fetch is logged and yields no options.
pub async fn fetch_checkbox_options<X>(transport: &X, props: &CheckboxProperties) -> Vec<CheckboxOption>
where
    X: Transport + ?Sized,
{
    let Some(url) = props.fetch_action.as_deref() else {
        return props.options.clone();
    };
    fetch::<Vec<CheckboxOption>, _>(transport, url)
        .await
        .unwrap_or_else(|e| {
            warn!("Failed to fetch checkbox options: {e}");
            Vec::new()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{ErrorSet, testing::StubTransport};

    fn item(v: Value) -> Properties {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_properties_defaults() {
        let p: LookupProperties = serde_json::from_value(json!({"fetchAction": "/users"})).unwrap();
        assert_eq!(p.search_field, "q");
        assert_eq!(p.debounce, 300);
        assert_eq!(p, LookupProperties::new("/users"));
    }

    #[test]
    fn test_resolve_mapped_option() {
        let map = vec![
            ResultMap {
                label: "title".into(),
                value: "uuid".into(),
            },
            ResultMap {
                label: "name".into(),
                value: "id".into(),
            },
        ];
        let opt = resolve_mapped_option(&item(json!({"name": "Ann", "id": 7})), &map);
        assert_eq!(
            opt,
            LookupOption {
                label: "Ann".into(),
                value: "7".into()
            }
        );

        let opt = resolve_mapped_option(&item(json!({"value": "v"})), &map);
        assert_eq!(opt.label, "v");
        assert_eq!(opt.value, "v");

        let opt = resolve_mapped_option(&item(json!({})), &[]);
        assert_eq!(opt.label, "");
    }

    #[test]
    fn test_search_url() {
        assert_eq!(search_url("/users", "q", None), "/users");
        assert_eq!(search_url("/users", "q", Some("")), "/users");
        assert_eq!(search_url("/users", "name", Some("a&b")), "/users?name=a%26b");
        assert_eq!(search_url("/users?active=1", "q", Some("x")), "/users?active=1&q=x");
    }

    #[tokio::test]
    async fn test_fetch_failure_is_empty() {
        let t = StubTransport::new();
        let opts = fetch_options(&t, &LookupProperties::new("/missing"), None).await;
        assert!(opts.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounced_search_keeps_latest() {
        let t = StubTransport::new()
            .on_get("/users?q=a", json!([{"label": "A", "value": "1"}]))
            .on_get("/users?q=ab", json!([{"label": "AB", "value": "2"}]));
        let source = LookupSource::new(LookupProperties::new("/users"));

        let (first, second) = tokio::join!(source.search(&t, "a"), source.search(&t, "ab"));
        assert_eq!(first, None);
        assert_eq!(second.unwrap()[0].label, "AB");

        let urls: Vec<_> = t.calls().into_iter().map(|c| c.1).collect();
        assert_eq!(urls, ["/users?q=ab"]);
    }

    #[tokio::test]
    async fn test_add_new() {
        let t = StubTransport::new()
            .on_get("/tags", json!([{"label": "red", "value": "r"}]))
            .on_post("/tags/new", Ok(json!({"label": "blue", "value": "b"})));

        let mut props = LookupProperties::new("/tags");
        props.allow_add_new = true;
        props.create_action = Some("/tags/new".into());
        let mut source = LookupSource::new(props);

        assert_eq!(source.load(&t).await.len(), 1);
        assert_eq!(source.add_new(&t, "").await, None);
        let created = source.add_new(&t, "blue").await.unwrap();
        assert_eq!(created.value, "b");
        assert_eq!(source.options().len(), 2);
        assert_eq!(t.calls().last().unwrap().2, Some(json!({"label": "blue"})));
    }

    #[tokio::test]
    async fn test_add_new_disabled_or_failing() {
        let t = StubTransport::new().on_post("/tags/new", Err(ErrorSet::single("label", "taken")));
        let mut source = LookupSource::new(LookupProperties::new("/tags"));
        assert_eq!(source.add_new(&t, "x").await, None);
        assert!(t.calls().is_empty());

        let mut props = LookupProperties::new("/tags");
        props.allow_add_new = true;
        props.create_action = Some("/tags/new".into());
        let mut source = LookupSource::new(props);
        assert_eq!(source.add_new(&t, "x").await, None);
        assert!(source.options().is_empty());
    }

    #[tokio::test]
    async fn test_checkbox_options() {
        let t = StubTransport::new().on_get("/perms", json!([{"label": "Read", "value": "r"}]));

        let fetched = CheckboxProperties {
            fetch_action: Some("/perms".into()),
            ..Default::default()
        };
        assert!(fetched.is_group());
        assert_eq!(fetch_checkbox_options(&t, &fetched).await[0].label, "Read");

        let broken = CheckboxProperties {
            fetch_action: Some("/gone".into()),
            ..Default::default()
        };
        assert!(fetch_checkbox_options(&t, &broken).await.is_empty());

        let single = CheckboxProperties::default();
        assert!(!single.is_group());
        assert!(fetch_checkbox_options(&t, &single).await.is_empty());
    }
}
