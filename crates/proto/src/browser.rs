use serde::{Deserialize, Serialize};

use crate::error::AutomationError;

/// Browser family a session can be launched with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    Chrome,
    Firefox,
}

impl BrowserKind {
    /// Parses a browser name, case-insensitively.
    ///
    /// Anything outside `chrome`/`firefox` is rejected here, before any
    /// launch work happens.
    pub fn parse(name: &str) -> Result<Self, AutomationError> {
        match name.to_ascii_lowercase().as_str() {
            "chrome" => Ok(Self::Chrome),
            "firefox" => Ok(Self::Firefox),
            _ => Err(AutomationError::UnsupportedBrowser(name.to_string())),
        }
    }

    /// Canonical lowercase name, used as the session id prefix.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chrome => "chrome",
            Self::Firefox => "firefox",
        }
    }
}

impl std::fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named way of addressing a page element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocatorStrategy {
    Id,
    Css,
    XPath,
    Name,
    Tag,
    Class,
}

impl LocatorStrategy {
    /// Resolves a symbolic strategy name, case-insensitively.
    ///
    /// This is the only validation locators get; the locator value itself is
    /// passed through to the engine untouched.
    pub fn parse(name: &str) -> Result<Self, AutomationError> {
        match name.to_ascii_lowercase().as_str() {
            "id" => Ok(Self::Id),
            "css" => Ok(Self::Css),
            "xpath" => Ok(Self::XPath),
            "name" => Ok(Self::Name),
            "tag" => Ok(Self::Tag),
            "class" => Ok(Self::Class),
            _ => Err(AutomationError::UnsupportedLocatorStrategy(
                name.to_string(),
            )),
        }
    }

    /// Canonical lowercase strategy name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Css => "css",
            Self::XPath => "xpath",
            Self::Name => "name",
            Self::Tag => "tag",
            Self::Class => "class",
        }
    }
}

impl std::fmt::Display for LocatorStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved strategy plus its unvalidated value string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locator {
    pub strategy: LocatorStrategy,
    pub value: String,
}

impl Locator {
    /// Builds a locator from a resolved strategy and a raw value.
    pub fn new(strategy: LocatorStrategy, value: impl Into<String>) -> Self {
        Self {
            strategy,
            value: value.into(),
        }
    }

    /// Parses the strategy name and pairs it with the value.
    pub fn parse(strategy: &str, value: impl Into<String>) -> Result<Self, AutomationError> {
        Ok(Self::new(LocatorStrategy::parse(strategy)?, value))
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}='{}'", self.strategy, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn browser_kind_parse_is_case_insensitive() {
        assert_eq!(BrowserKind::parse("Chrome").unwrap(), BrowserKind::Chrome);
        assert_eq!(
            BrowserKind::parse("FIREFOX").unwrap(),
            BrowserKind::Firefox
        );
    }

    #[test]
    fn browser_kind_rejects_unknown_names() {
        let err = BrowserKind::parse("safari").unwrap_err();
        assert!(matches!(err, AutomationError::UnsupportedBrowser(_)));
    }

    #[test]
    fn strategy_parse_covers_all_supported_names() {
        for (name, expected) in [
            ("id", LocatorStrategy::Id),
            ("CSS", LocatorStrategy::Css),
            ("XPath", LocatorStrategy::XPath),
            ("name", LocatorStrategy::Name),
            ("tag", LocatorStrategy::Tag),
            ("Class", LocatorStrategy::Class),
        ] {
            assert_eq!(LocatorStrategy::parse(name).unwrap(), expected);
        }
    }

    #[test]
    fn strategy_parse_fails_closed() {
        let err = LocatorStrategy::parse("link_text").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unsupported locator strategy: link_text"
        );
    }

    #[test]
    fn locator_display_pairs_strategy_and_value() {
        let locator = Locator::parse("css", "#login > button").unwrap();
        assert_eq!(locator.to_string(), "css='#login > button'");
    }
}
