//! Locator strategies and the [`Locator`] triple.
//!
//! A [`Locator`] names zero, one, or many UI nodes by a strategy ([`By`]), a
//! strategy-specific value, and an optional position in the result set.
//!
//! # Example
//!
//! ```
//! use pomelo::by::{By, Locator};
//!
//! let login = Locator::new(By::AccessibilityId, "login-button").unwrap();
//! assert_eq!(login.index(), None);
//!
//! // Third row of a list, using `find_elements()[2]`.
//! let row = Locator::new(By::ClassName, "Cell").unwrap().with_index(2);
//! assert_eq!(row.index(), Some(2));
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Element location strategies understood by WebDriver and Appium servers.
///
/// The string form ([`By::as_str`]) is the value sent on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum By {
    Id,
    XPath,
    LinkText,
    PartialLinkText,
    Name,
    TagName,
    ClassName,
    CssSelector,
    /// Accessibility identifier (iOS `accessibilityIdentifier`, Android `content-desc`).
    AccessibilityId,
    AndroidUiAutomator,
    AndroidViewTag,
    AndroidDataMatcher,
    AndroidViewMatcher,
    IosPredicate,
    IosClassChain,
    Image,
    Custom,
}

impl By {
    /// Every strategy, in declaration order.
    pub const ALL: [By; 17] = [
        By::Id,
        By::XPath,
        By::LinkText,
        By::PartialLinkText,
        By::Name,
        By::TagName,
        By::ClassName,
        By::CssSelector,
        By::AccessibilityId,
        By::AndroidUiAutomator,
        By::AndroidViewTag,
        By::AndroidDataMatcher,
        By::AndroidViewMatcher,
        By::IosPredicate,
        By::IosClassChain,
        By::Image,
        By::Custom,
    ];

    /// The wire name of this strategy.
    pub fn as_str(&self) -> &'static str {
        match self {
            By::Id => "id",
            By::XPath => "xpath",
            By::LinkText => "link text",
            By::PartialLinkText => "partial link text",
            By::Name => "name",
            By::TagName => "tag name",
            By::ClassName => "class name",
            By::CssSelector => "css selector",
            By::AccessibilityId => "accessibility id",
            By::AndroidUiAutomator => "-android uiautomator",
            By::AndroidViewTag => "-android viewtag",
            By::AndroidDataMatcher => "-android datamatcher",
            By::AndroidViewMatcher => "-android viewmatcher",
            By::IosPredicate => "-ios predicate string",
            By::IosClassChain => "-ios class chain",
            By::Image => "-image",
            By::Custom => "-custom",
        }
    }
}

impl fmt::Display for By {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for By {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        By::ALL
            .iter()
            .copied()
            .find(|by| by.as_str() == s)
            .ok_or_else(|| Error::Config(format!("The set \"by\" strategy \"{}\" is undefined.", s)))
    }
}

impl TryFrom<String> for By {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<By> for String {
    fn from(by: By) -> Self {
        by.as_str().to_string()
    }
}

/// An immutable `(strategy, value, index)` triple.
///
/// `index == None` means "first match" (`find_element`); `Some(i)` means
/// positional match against the full result set (`find_elements()[i]`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    by: By,
    value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    index: Option<usize>,
}

impl Locator {
    /// Creates a first-match locator.
    ///
    /// Returns [`Error::Config`] if `value` is empty.
    pub fn new(by: By, value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(Error::Config(format!(
                "The locator value for \"{}\" must not be empty.",
                by
            )));
        }
        Ok(Self { by, value, index: None })
    }

    /// Parses the strategy from its wire name, e.g. `"accessibility id"`.
    pub fn parse(by: &str, value: impl Into<String>) -> Result<Self> {
        Self::new(by.parse()?, value)
    }

    /// Returns the same locator bound to position `index` of the result set.
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn by(&self) -> By {
        self.by
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// The default human-readable remark used in diagnostics.
    pub fn describe(&self) -> String {
        match self.index {
            Some(index) => format!("{}={}[{}]", self.by, self.value, index),
            None => format!("{}={}", self.by, self.value),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_round_trips_through_wire_name() {
        for by in By::ALL {
            assert_eq!(by.as_str().parse::<By>().unwrap(), by);
        }
    }

    #[test]
    fn test_unknown_strategy_is_config_error() {
        let err = "by magic".parse::<By>().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("by magic"));
    }

    #[test]
    fn test_empty_value_rejected() {
        let err = Locator::new(By::Id, "").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_describe_includes_index() {
        let locator = Locator::new(By::XPath, "//cell").unwrap();
        assert_eq!(locator.describe(), "xpath=//cell");
        assert_eq!(locator.with_index(3).describe(), "xpath=//cell[3]");
    }

    #[test]
    fn test_parse_mobile_strategy() {
        let locator = Locator::parse("-ios class chain", "**/XCUIElementTypeCell").unwrap();
        assert_eq!(locator.by(), By::IosClassChain);
        assert_eq!(locator.value(), "**/XCUIElementTypeCell");
    }

    #[test]
    fn test_locator_serde_uses_wire_names() {
        let locator = Locator::new(By::AccessibilityId, "ok").unwrap().with_index(1);
        let json = serde_json::to_string(&locator).unwrap();
        assert!(json.contains("\"accessibility id\""));
        let back: Locator = serde_json::from_str(&json).unwrap();
        assert_eq!(back, locator);
    }
}
