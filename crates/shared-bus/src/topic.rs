//! # Topic Filters
//!
//! MQTT topic filter matching used by subscriptions.

use crate::error::BusError;

const LEVEL_SEPARATOR: char = '/';
const SINGLE_LEVEL: &str = "+";
const MULTI_LEVEL: &str = "#";

/// Check whether a concrete topic matches an MQTT topic filter.
///
/// Filters starting with a wildcard never match `$`-prefixed topics.
#[must_use]
pub fn topic_matches(filter: &str, topic: &str) -> bool {
    if topic.starts_with('$') && (filter.starts_with('+') || filter.starts_with('#')) {
        return false;
    }

    let mut filter_levels = filter.split(LEVEL_SEPARATOR);
    let mut topic_levels = topic.split(LEVEL_SEPARATOR);

    loop {
        match (filter_levels.next(), topic_levels.next()) {
            (Some(MULTI_LEVEL), _) => return true,
            (Some(SINGLE_LEVEL), Some(_)) => {}
            (Some(f), Some(t)) if f == t => {}
            (None, None) => return true,
            _ => return false,
        }
    }
}

/// Check that a topic can be published to.
pub fn validate_publish_topic(topic: &str) -> Result<(), BusError> {
    if topic.is_empty() || topic.contains(['+', '#']) {
        return Err(BusError::InvalidTopic(topic.to_string()));
    }
    Ok(())
}

/// A validated topic filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TopicFilter {
    pattern: String,
}

impl TopicFilter {
    /// Validate and wrap a filter.
    ///
    /// `#` must be the last level and occupy it alone; `+` must occupy a
    /// whole level.
    pub fn new(pattern: impl Into<String>) -> Result<Self, BusError> {
        let pattern = pattern.into();
        if pattern.is_empty() {
            return Err(BusError::InvalidFilter(pattern));
        }

        let levels: Vec<&str> = pattern.split(LEVEL_SEPARATOR).collect();
        let last = levels.len() - 1;
        for (i, level) in levels.iter().enumerate() {
            let has_multi = level.contains('#');
            let has_single = level.contains('+');
            if (has_multi && (*level != MULTI_LEVEL || i != last))
                || (has_single && *level != SINGLE_LEVEL)
            {
                return Err(BusError::InvalidFilter(pattern));
            }
        }

        Ok(Self { pattern })
    }

    /// Check whether `topic` matches this filter.
    #[must_use]
    pub fn matches(&self, topic: &str) -> bool {
        topic_matches(&self.pattern, topic)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.pattern
    }
}
