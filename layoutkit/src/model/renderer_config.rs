use std::{collections::BTreeMap, fmt, str::FromStr};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::descriptor::UiNode;

/// Presentation wrapper around a nested node.
///
/// Only the layout, display, responsive and accessibility hints are
/// interpreted; `interaction` and `animation` are carried for external
/// renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RendererConfig {
    /// Wrapped node.
    pub component_detail: UiNode,
    /// Rendering mode such as `default`, `compact` or `card`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutHints>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction: Option<InteractionHints>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<DisplayHints>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsive: Option<ResponsiveHints>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub css_classes: Vec<String>,
    /// Inline style overrides, applied last.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_styles: BTreeMap<String, CssValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessibility: Option<AccessibilityHints>,
}

impl RendererConfig {
    /// Wrap a node with no hints.
    pub fn wrap(node: impl Into<UiNode>) -> Self {
        Self {
            component_detail: node.into(),
            mode: None,
            layout: None,
            interaction: None,
            display: None,
            responsive: None,
            animation: None,
            css_classes: Vec::new(),
            custom_styles: BTreeMap::new(),
            accessibility: None,
        }
    }

    /// Whether the wrapper asks to be hidden on `viewport`.
    pub fn hidden_on(&self, viewport: Viewport) -> bool {
        self.responsive
            .as_ref()
            .is_some_and(|r| r.hidden_on.contains(&viewport))
    }

    /// Layout and display hints with the breakpoint override for `viewport` applied.
    pub fn effective_hints(
        &self,
        viewport: Option<Viewport>,
    ) -> (Option<LayoutHints>, Option<DisplayHints>) {
        let mut layout = self.layout.clone();
        let mut display = self.display.clone();

        let over = viewport.and_then(|v| {
            self.responsive
                .as_ref()
                .and_then(|r| r.breakpoints.as_ref())
                .and_then(|b| b.get(v))
        });

        if let Some(over) = over {
            if let Some(l) = &over.layout {
                layout = Some(layout.unwrap_or_default().overlay(l));
            }
            if let Some(d) = &over.display {
                display = Some(display.unwrap_or_default().overlay(d));
            }
        }
        (layout, display)
    }
}

/// A CSS length or keyword: either a number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum CssValue {
    Number(f64),
    Text(String),
}

impl CssValue {
    pub fn to_value(&self) -> Value {
        match self {
            CssValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            CssValue::Text(s) => Value::String(s.clone()),
        }
    }

    /// Zero and empty values count as unset.
    pub fn is_set(&self) -> bool {
        match self {
            CssValue::Number(n) => *n != 0.0,
            CssValue::Text(s) => !s.is_empty(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LayoutHints {
    /// `block`, `inline`, `flex`, `grid`, ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<CssValue>,
    /// `left`, `center`, `right` or `justify`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<String>,
}

impl LayoutHints {
    fn overlay(self, other: &LayoutHints) -> LayoutHints {
        LayoutHints {
            display: other.display.clone().or(self.display),
            columns: other.columns.or(self.columns),
            spacing: other.spacing.clone().or(self.spacing),
            alignment: other.alignment.clone().or(self.alignment),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct InteractionHints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clickable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hoverable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draggable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyboard_navigable: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DisplayHints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_border: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_shadow: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<CssValue>,
    /// Opacity level between 0 and 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl DisplayHints {
    fn overlay(self, other: &DisplayHints) -> DisplayHints {
        DisplayHints {
            show_border: other.show_border.or(self.show_border),
            show_shadow: other.show_shadow.or(self.show_shadow),
            background_color: other.background_color.clone().or(self.background_color),
            text_color: other.text_color.clone().or(self.text_color),
            border_radius: other.border_radius.clone().or(self.border_radius),
            opacity: other.opacity.or(self.opacity),
        }
    }
}

/// Screen size class used for responsive hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Viewport {
    Mobile,
    Tablet,
    Desktop,
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Viewport::Mobile => "mobile",
            Viewport::Tablet => "tablet",
            Viewport::Desktop => "desktop",
        };
        f.write_str(s)
    }
}

impl FromStr for Viewport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mobile" => Ok(Viewport::Mobile),
            "tablet" => Ok(Viewport::Tablet),
            "desktop" => Ok(Viewport::Desktop),
            other => Err(format!("unknown viewport: {other}")),
        }
    }
}

/// Per-viewport override of layout and display hints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BreakpointOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutHints>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<DisplayHints>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Breakpoints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<BreakpointOverride>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tablet: Option<BreakpointOverride>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desktop: Option<BreakpointOverride>,
}

impl Breakpoints {
    pub fn get(&self, viewport: Viewport) -> Option<&BreakpointOverride> {
        match viewport {
            Viewport::Mobile => self.mobile.as_ref(),
            Viewport::Tablet => self.tablet.as_ref(),
            Viewport::Desktop => self.desktop.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ResponsiveHints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakpoints: Option<Breakpoints>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hidden_on: Vec<Viewport>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AccessibilityHints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aria_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aria_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_index: Option<i32>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn config() -> RendererConfig {
        serde_json::from_value(json!({
            "componentDetail": {"name": "layout"},
            "layout": {"display": "flex", "spacing": 0, "alignment": "left"},
            "responsive": {
                "breakpoints": {"mobile": {"layout": {"display": "block"}}},
                "hiddenOn": ["tablet"]
            },
            "display": {"backgroundColor": "#f0f2f5"}
        }))
        .unwrap()
    }

    #[test]
    fn test_breakpoint_override() {
        let cfg = config();

        let (layout, display) = cfg.effective_hints(Some(Viewport::Mobile));
        let layout = layout.unwrap();
        assert_eq!(layout.display.as_deref(), Some("block"));
        assert_eq!(layout.alignment.as_deref(), Some("left"));
        assert_eq!(display.unwrap().background_color.as_deref(), Some("#f0f2f5"));

        let (layout, _) = cfg.effective_hints(Some(Viewport::Desktop));
        assert_eq!(layout.unwrap().display.as_deref(), Some("flex"));
    }

    #[test]
    fn test_hidden_on() {
        let cfg = config();
        assert!(cfg.hidden_on(Viewport::Tablet));
        assert!(!cfg.hidden_on(Viewport::Mobile));
    }

    #[test]
    fn test_viewport_from_str() {
        assert_eq!("Mobile".parse::<Viewport>(), Ok(Viewport::Mobile));
        assert!("watch".parse::<Viewport>().is_err());
    }
}
