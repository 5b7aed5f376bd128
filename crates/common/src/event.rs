//! Action events
//!
//! One [`ActionEvent`] describes a single captured user interaction. The wire
//! shape is camelCase JSON as posted by the browser recorder.

use crate::locator::Locator;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of element the interaction targeted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "Option<String>")]
pub enum ElementType {
    Button,
    Label,
    Input,
    Radio,
    Checkbox,
    Password,
    Select,
    Textarea,
    Link,
    Paragraph,
    Div,
    Span,
    Element,
    #[default]
    Unknown,
}

impl ElementType {
    pub const ALL: [ElementType; 14] = [
        ElementType::Button,
        ElementType::Label,
        ElementType::Input,
        ElementType::Radio,
        ElementType::Checkbox,
        ElementType::Password,
        ElementType::Select,
        ElementType::Textarea,
        ElementType::Link,
        ElementType::Paragraph,
        ElementType::Div,
        ElementType::Span,
        ElementType::Element,
        ElementType::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Button => "button",
            ElementType::Label => "label",
            ElementType::Input => "input",
            ElementType::Radio => "radio",
            ElementType::Checkbox => "checkbox",
            ElementType::Password => "password",
            ElementType::Select => "select",
            ElementType::Textarea => "textarea",
            ElementType::Link => "link",
            ElementType::Paragraph => "paragraph",
            ElementType::Div => "div",
            ElementType::Span => "span",
            ElementType::Element => "element",
            ElementType::Unknown => "unknown",
        }
    }
}

// Unrecognised or missing element types read as `unknown`.
impl From<Option<String>> for ElementType {
    fn from(s: Option<String>) -> Self {
        s.and_then(|s| s.parse().ok()).unwrap_or_default()
    }
}

impl FromStr for ElementType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::UnknownVariant {
                kind: "element type",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionType {
    Click,
    DoubleClick,
    SendKeys,
    Select,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Click => "click",
            ActionType::DoubleClick => "doubleClick",
            ActionType::SendKeys => "sendKeys",
            ActionType::Select => "select",
        }
    }
}

impl FromStr for ActionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "click" => Ok(ActionType::Click),
            "doubleClick" | "double-click" => Ok(ActionType::DoubleClick),
            "sendKeys" | "send-keys" => Ok(ActionType::SendKeys),
            "select" => Ok(ActionType::Select),
            _ => Err(Error::UnknownVariant {
                kind: "action type",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single captured interaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionEvent {
    /// Producer capture time (ISO-8601); the relay fills it in when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    #[serde(default)]
    pub element_type: ElementType,

    pub action_type: ActionType,

    /// Locator expression plus action invocation, e.g.
    /// `driver.findElement(By.id("q")).click();`
    ///
    /// Older recorders send it as `seleniumCode`. A record carrying both
    /// names is malformed and fails to decode.
    #[serde(default, alias = "seleniumCode")]
    pub generated_code: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

impl ActionEvent {
    /// Build an event the way a recorder does: the generated code is rendered
    /// from the locator and the action.
    pub fn record(
        element_type: ElementType,
        action_type: ActionType,
        locator: &Locator,
        value: Option<String>,
    ) -> Self {
        let generated_code = locator.action_snippet(action_type, value.as_deref().unwrap_or(""));
        Self {
            timestamp: None,
            element_type,
            action_type,
            generated_code,
            value,
            element_label: None,
            href: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.element_label = Some(label.into());
        self
    }

    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Label with surrounding whitespace removed, if any is left
    pub fn label(&self) -> Option<&str> {
        self.element_label
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
    }
}

/// An event as held by a viewer: the raw line it arrived as, the decoded
/// record, and the locator parsed once from its generated code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedAction {
    pub raw: String,
    pub event: ActionEvent,
    pub locator: Option<Locator>,
}

impl RecordedAction {
    /// Parse one line of relay output
    pub fn parse(line: &str) -> Result<Self> {
        let event: ActionEvent = serde_json::from_str(line)?;
        Ok(Self::from_event(line.to_string(), event))
    }

    pub fn from_event(raw: String, event: ActionEvent) -> Self {
        let locator = Locator::find_in(&event.generated_code);
        Self {
            raw,
            event,
            locator,
        }
    }
}
