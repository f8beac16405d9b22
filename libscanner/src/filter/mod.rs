//! Include/exclude tag filtering.
//!
//! Patterns are regular expressions matched anywhere in the tag (unanchored
//! search). A tag survives when it matches at least one include pattern (or
//! there are none) and no exclude pattern.

use crate::error::{Result, ScanError};
use regex::Regex;

#[cfg(test)]
mod tests;

/// Compiled include and exclude pattern sets.
#[derive(Debug, Clone, Default)]
pub struct TagFilter {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl TagFilter {
    /// Compiles the given patterns.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first pattern that fails to compile.
    ///
    /// # Examples
    ///
    /// ```
    /// use libscanner::TagFilter;
    ///
    /// let filter = TagFilter::new(&["^4[0-9]"], &["-testing$"]).unwrap();
    /// let tags = vec!["40".to_string(), "41-testing".to_string(), "latest".to_string()];
    /// assert_eq!(filter.apply(&tags), vec!["40".to_string()]);
    /// ```
    pub fn new<I, E>(include: &[I], exclude: &[E]) -> Result<Self>
    where
        I: AsRef<str>,
        E: AsRef<str>,
    {
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    /// Returns true when neither axis constrains anything.
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    /// Returns true when `tag` passes both pattern sets.
    pub fn matches(&self, tag: &str) -> bool {
        let included = self.include.is_empty() || self.include.iter().any(|re| re.is_match(tag));
        let excluded = self.exclude.iter().any(|re| re.is_match(tag));
        included && !excluded
    }

    /// Keeps matching tags, preserving input order and duplicates.
    pub fn apply(&self, tags: &[String]) -> Vec<String> {
        tags.iter()
            .filter(|tag| self.matches(tag))
            .cloned()
            .collect()
    }
}

fn compile<P: AsRef<str>>(patterns: &[P]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p.as_ref()).map_err(|e| {
                ScanError::validation_with_source(
                    format!("Invalid tag pattern '{}'", p.as_ref()),
                    e,
                )
            })
        })
        .collect()
}

/// Filters `tags` in one go.
///
/// # Examples
///
/// ```
/// use libscanner::filter::filter_tags;
///
/// let tags = vec!["a".to_string(), "b".to_string(), "c".to_string()];
/// let kept = filter_tags(&tags, &["a|b"], &[] as &[&str]).unwrap();
/// assert_eq!(kept, vec!["a".to_string(), "b".to_string()]);
/// ```
pub fn filter_tags<I, E>(tags: &[String], include: &[I], exclude: &[E]) -> Result<Vec<String>>
where
    I: AsRef<str>,
    E: AsRef<str>,
{
    Ok(TagFilter::new(include, exclude)?.apply(tags))
}
