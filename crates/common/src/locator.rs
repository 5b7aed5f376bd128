//! Locator expressions
//!
//! Recorded events carry their element locator embedded in a free-text code
//! snippet such as `driver.findElement(By.id("pwd")).sendKeys("x");`. The
//! snippet is the wire format; this module parses it once into a tagged
//! [`Locator`] and renders snippets back out for producers.
//!
//! Grammar: `By.<strategy>(<q><value><q>)` where `<q>` is `"` or `'`. The
//! first match in the snippet wins.

use crate::event::ActionType;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

static LOCATOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"By\.(\w+)\(["'](.+?)["']\)"#).expect("locator pattern is valid")
});

/// Locator strategy (`By.<strategy>`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LocatorStrategy {
    Id,
    Name,
    CssSelector,
    XPath,
    /// Any other identifier-like strategy, kept verbatim
    Other(String),
}

impl LocatorStrategy {
    pub fn as_str(&self) -> &str {
        match self {
            LocatorStrategy::Id => "id",
            LocatorStrategy::Name => "name",
            LocatorStrategy::CssSelector => "cssSelector",
            LocatorStrategy::XPath => "xpath",
            LocatorStrategy::Other(s) => s,
        }
    }
}

impl From<&str> for LocatorStrategy {
    fn from(s: &str) -> Self {
        match s {
            "id" => LocatorStrategy::Id,
            "name" => LocatorStrategy::Name,
            "cssSelector" => LocatorStrategy::CssSelector,
            "xpath" => LocatorStrategy::XPath,
            other => LocatorStrategy::Other(other.to_string()),
        }
    }
}

impl From<String> for LocatorStrategy {
    fn from(s: String) -> Self {
        LocatorStrategy::from(s.as_str())
    }
}

impl From<LocatorStrategy> for String {
    fn from(s: LocatorStrategy) -> Self {
        s.as_str().to_string()
    }
}

impl FromStr for LocatorStrategy {
    type Err = Error;

    /// Lenient parse for command-line input: accepts the canonical names plus
    /// `css` / `css-selector`. Anything else must look like an identifier.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "css" | "css-selector" => Ok(LocatorStrategy::CssSelector),
            "xPath" => Ok(LocatorStrategy::XPath),
            _ if !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') => {
                Ok(LocatorStrategy::from(s))
            }
            _ => Err(Error::UnknownVariant {
                kind: "locator strategy",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for LocatorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed `(strategy, value)` pair identifying a page element
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    pub strategy: LocatorStrategy,
    pub value: String,
}

impl Locator {
    pub fn new(strategy: LocatorStrategy, value: impl Into<String>) -> Self {
        Self {
            strategy,
            value: value.into(),
        }
    }

    /// Find the first locator expression embedded in a code snippet
    pub fn find_in(code: &str) -> Option<Self> {
        let caps = LOCATOR_RE.captures(code)?;
        let strategy = caps.get(1)?.as_str();
        let value = caps.get(2)?.as_str();
        Some(Self::new(LocatorStrategy::from(strategy), value))
    }

    /// Render the snippet a recorder emits for `action` on this element.
    ///
    /// `value` is the typed text for `sendKeys` and the option text for
    /// `select`; it is ignored otherwise.
    pub fn action_snippet(&self, action: ActionType, value: &str) -> String {
        match action {
            ActionType::Click => format!("driver.findElement({}).click();", self),
            ActionType::DoubleClick => format!(
                "Actions actions = new Actions(driver);\nactions.doubleClick(driver.findElement({})).perform();",
                self
            ),
            ActionType::SendKeys => {
                format!("driver.findElement({}).sendKeys(\"{}\");", self, value)
            }
            ActionType::Select => format!(
                "new Select(driver.findElement({})).selectByVisibleText(\"{}\");",
                self, value
            ),
        }
    }
}

impl FromStr for Locator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::find_in(s).ok_or_else(|| Error::LocatorNotFound(s.to_string()))
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "By.{}(\"{}\")", self.strategy, self.value)
    }
}
