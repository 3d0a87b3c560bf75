use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Value, json};

use crate::model::{
    Properties,
    renderer_config::{CssValue, DisplayHints, LayoutHints},
};

const BORDER: &str = "1px solid #d9d9d9";
const SHADOW: &str = "0 2px 8px rgba(0,0,0,0.1)";

/// Inline style properties derived from wrapper hints, keyed by camelCase CSS
/// property name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StyleHints(BTreeMap<String, Value>);

impl StyleHints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate layout and display hints, then apply `custom` on top.
    ///
    /// Unset, zero and empty hints produce nothing, except `opacity` which is
    /// emitted whenever present. Custom styles are copied verbatim.
    pub fn from_config(
        layout: Option<&LayoutHints>,
        display: Option<&DisplayHints>,
        custom: &BTreeMap<String, CssValue>,
    ) -> Self {
        let mut s = Self::new();

        if let Some(layout) = layout {
            if let Some(d) = layout.display.as_deref().filter(|d| !d.is_empty()) {
                s.set("display", json!(d));
            }
            if let Some(spacing) = layout.spacing.as_ref().filter(|v| v.is_set()) {
                s.set("margin", spacing.to_value());
                s.set("padding", spacing.to_value());
            }
            if let Some(a) = layout.alignment.as_deref().filter(|a| !a.is_empty()) {
                s.set("textAlign", json!(a));
            }
        }

        if let Some(display) = display {
            if display.show_border == Some(true) {
                s.set("border", json!(BORDER));
            }
            if display.show_shadow == Some(true) {
                s.set("boxShadow", json!(SHADOW));
            }
            if let Some(c) = display.background_color.as_deref().filter(|c| !c.is_empty()) {
                s.set("backgroundColor", json!(c));
            }
            if let Some(c) = display.text_color.as_deref().filter(|c| !c.is_empty()) {
                s.set("color", json!(c));
            }
            if let Some(r) = display.border_radius.as_ref().filter(|r| r.is_set()) {
                s.set("borderRadius", r.to_value());
            }
            if let Some(o) = display.opacity {
                s.set("opacity", json!(o));
            }
        }

        for (k, v) in custom {
            s.set(k, v.to_value());
        }
        s
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `self` overlaid with `over`; keys in `over` win.
    pub fn merged(&self, over: &StyleHints) -> StyleHints {
        let mut out = self.clone();
        out.0.extend(over.0.iter().map(|(k, v)| (k.clone(), v.clone())));
        out
    }

    pub fn to_properties(&self) -> Properties {
        self.0.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}
