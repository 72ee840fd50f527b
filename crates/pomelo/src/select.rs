//! `<select>` dropdown support.
//!
//! [`Select`] wraps the handle of a `<select>` element and exposes option
//! lookup and (de)selection. Options are matched the way WebDriver clients
//! do it: by the `value` attribute, by the `index` attribute (not by
//! counting), or by visible text.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::by::By;
use crate::driver::{AutomationDriver, ElementHandle};
use crate::error::{Error, Result};

/// A `<select>` element and its multi-selection flag.
#[derive(Clone)]
pub struct Select {
    driver: Arc<dyn AutomationDriver>,
    element: ElementHandle,
    multiple: bool,
}

impl Select {
    /// Wraps `element`, which must be a `<select>`.
    ///
    /// Returns [`Error::Select`] for any other tag.
    pub async fn new(driver: Arc<dyn AutomationDriver>, element: ElementHandle) -> Result<Self> {
        let tag = driver.tag_name(&element).await?;
        if !tag.eq_ignore_ascii_case("select") {
            return Err(Error::Select(format!(
                "Select only works on <select> elements, not on <{}>",
                tag
            )));
        }
        let multiple = driver
            .attribute(&element, "multiple")
            .await?
            .is_some_and(|value| value != "false");
        Ok(Self { driver, element, multiple })
    }

    pub fn element(&self) -> &ElementHandle {
        &self.element
    }

    pub fn is_multiple(&self) -> bool {
        self.multiple
    }

    /// Every `<option>` below the select.
    pub async fn options(&self) -> Result<Vec<ElementHandle>> {
        Ok(self
            .driver
            .find_child_elements(&self.element, By::TagName, "option")
            .await?)
    }

    pub async fn all_selected_options(&self) -> Result<Vec<ElementHandle>> {
        let mut selected = Vec::new();
        for option in self.options().await? {
            if self.driver.is_selected(&option).await? {
                selected.push(option);
            }
        }
        Ok(selected)
    }

    /// The first selected option, or the current option of a single select.
    pub async fn first_selected_option(&self) -> Result<ElementHandle> {
        for option in self.options().await? {
            if self.driver.is_selected(&option).await? {
                return Ok(option);
            }
        }
        Err(Error::Select("No options are selected".to_string()))
    }

    /// Selects every option whose `value` attribute equals `value`.
    pub async fn select_by_value(&self, value: &str) -> Result<()> {
        let matched = self.matching(Match::Value(value)).await?;
        if matched.is_empty() {
            return Err(Error::Select(format!("Cannot locate option with value: {}", value)));
        }
        for option in matched {
            self.set_selected(&option, true).await?;
            if !self.multiple {
                break;
            }
        }
        Ok(())
    }

    /// Selects the option whose `index` attribute equals `index`.
    pub async fn select_by_index(&self, index: usize) -> Result<()> {
        match self.matching(Match::Index(index)).await?.first() {
            Some(option) => self.set_selected(option, true).await,
            None => Err(Error::Select(format!(
                "Could not locate element with index {}",
                index
            ))),
        }
    }

    /// Selects every option whose trimmed text equals `text`.
    pub async fn select_by_visible_text(&self, text: &str) -> Result<()> {
        let matched = self.matching(Match::Text(text)).await?;
        if matched.is_empty() {
            return Err(Error::Select(format!(
                "Could not locate element with visible text: {}",
                text
            )));
        }
        for option in matched {
            self.set_selected(&option, true).await?;
            if !self.multiple {
                break;
            }
        }
        Ok(())
    }

    /// Clears every selected option of a multi-select.
    pub async fn deselect_all(&self) -> Result<()> {
        self.require_multiple("deselect all options")?;
        for option in self.options().await? {
            self.set_selected(&option, false).await?;
        }
        Ok(())
    }

    pub async fn deselect_by_value(&self, value: &str) -> Result<()> {
        self.require_multiple("deselect options")?;
        self.deselect_matching(Match::Value(value)).await
    }

    pub async fn deselect_by_index(&self, index: usize) -> Result<()> {
        self.require_multiple("deselect options")?;
        self.deselect_matching(Match::Index(index)).await
    }

    pub async fn deselect_by_visible_text(&self, text: &str) -> Result<()> {
        self.require_multiple("deselect options")?;
        self.deselect_matching(Match::Text(text)).await
    }

    fn require_multiple(&self, action: &str) -> Result<()> {
        if self.multiple {
            Ok(())
        } else {
            Err(Error::Select(format!("You may only {} of a multi-select", action)))
        }
    }

    async fn deselect_matching(&self, criterion: Match<'_>) -> Result<()> {
        let matched = self.matching(criterion).await?;
        if matched.is_empty() {
            return Err(Error::Select(format!("Could not locate option with {}", criterion)));
        }
        for option in matched {
            self.set_selected(&option, false).await?;
        }
        Ok(())
    }

    async fn matching(&self, criterion: Match<'_>) -> Result<Vec<ElementHandle>> {
        let mut matched = Vec::new();
        for option in self.options().await? {
            let hit = match criterion {
                Match::Value(value) => {
                    self.driver.attribute(&option, "value").await?.as_deref() == Some(value)
                }
                Match::Index(index) => {
                    self.driver.attribute(&option, "index").await?.as_deref()
                        == Some(index.to_string().as_str())
                }
                Match::Text(text) => self.driver.text(&option).await?.trim() == text,
            };
            if hit {
                matched.push(option);
            }
        }
        debug!(%criterion, matched = matched.len(), "options matched");
        Ok(matched)
    }

    /// Clicks `option` if its selection state differs from `selected`.
    async fn set_selected(&self, option: &ElementHandle, selected: bool) -> Result<()> {
        if self.driver.is_selected(option).await? != selected {
            self.driver.click(option).await?;
        }
        Ok(())
    }
}

impl fmt::Debug for Select {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Select")
            .field("element", &self.element)
            .field("multiple", &self.multiple)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy)]
enum Match<'a> {
    Value(&'a str),
    Index(usize),
    Text(&'a str),
}

impl fmt::Display for Match<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Match::Value(value) => write!(f, "value: {}", value),
            Match::Index(index) => write!(f, "index: {}", index),
            Match::Text(text) => write!(f, "visible text: {}", text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_display() {
        assert_eq!(Match::Value("fr").to_string(), "value: fr");
        assert_eq!(Match::Index(2).to_string(), "index: 2");
        assert_eq!(Match::Text("French").to_string(), "visible text: French");
    }
}
