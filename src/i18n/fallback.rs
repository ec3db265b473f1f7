//! Accepted-locale set construction.
//!
//! Given a site's display policy and locale configuration, builds the
//! ordered, deduplicated set of language tags whose values are acceptable
//! for display. The empty tag (untagged values) is always an implicit
//! member of a non-empty set: untagged content carries no language
//! commitment and must never be silently hidden.

use crate::i18n::{expand, DisplayPolicy};
use tracing::debug;

/// An ordered set of accepted language tags for one (site, property)
/// decision.
///
/// The set is split in two segments with a fixed walk order:
/// primary tags (base locale plus the policy-specific expansion, in
/// contributed order), then required languages, then the empty tag.
/// An empty set is the "skip filtering" signal for policy `all`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocaleSet {
    primary: Vec<String>,
    required: Vec<String>,
}

impl LocaleSet {
    /// The empty set: downstream skips partitioning and filtering entirely.
    pub fn empty() -> LocaleSet {
        LocaleSet::default()
    }

    /// Build the accepted-locale set for a site.
    ///
    /// - `All` yields the empty set (no filtering contract at all).
    /// - A restrictive or reordering policy with an empty base locale is a
    ///   configuration error; it degrades to the empty set rather than
    ///   hiding every tagged value.
    /// - Otherwise: base locale, then the policy expansion (`expand` for
    ///   the ISO variants, the explicit chain for the fallback variants),
    ///   then the required languages. Duplicates keep their first position.
    pub fn for_site(
        policy: DisplayPolicy,
        base_locale: &str,
        fallbacks: &[String],
        required: &[String],
    ) -> LocaleSet {
        if policy == DisplayPolicy::All {
            return LocaleSet::empty();
        }
        if base_locale.is_empty() {
            debug!(
                policy = policy.as_str(),
                "site has no locale, treating policy as 'all'"
            );
            return LocaleSet::empty();
        }

        let mut set = LocaleSet::empty();
        match policy {
            DisplayPolicy::Site | DisplayPolicy::AllSite => {
                set.push_primary(base_locale);
            }
            DisplayPolicy::SiteIso | DisplayPolicy::AllIso => {
                for code in expand(base_locale) {
                    set.push_primary(&code);
                }
            }
            DisplayPolicy::SiteFallback | DisplayPolicy::AllFallback => {
                set.push_primary(base_locale);
                for tag in fallbacks {
                    set.push_primary(tag);
                }
            }
            DisplayPolicy::All => unreachable!("handled above"),
        }
        for tag in required {
            set.push_required(tag);
        }
        set
    }

    fn push_primary(&mut self, tag: &str) {
        if !tag.is_empty() && !self.primary.iter().any(|t| t == tag) {
            self.primary.push(tag.to_string());
        }
    }

    fn push_required(&mut self, tag: &str) {
        if !tag.is_empty()
            && !self.primary.iter().any(|t| t == tag)
            && !self.required.iter().any(|t| t == tag)
        {
            self.required.push(tag.to_string());
        }
    }

    /// Primary tags: base locale plus the policy expansion, in order.
    pub fn primary(&self) -> &[String] {
        &self.primary
    }

    /// Required languages, minus any tag already in the primary segment.
    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// Whether this is the "skip filtering" signal.
    pub fn is_empty(&self) -> bool {
        self.primary.is_empty() && self.required.is_empty()
    }

    /// Whether values tagged `tag` are acceptable. The empty tag always is
    /// (for a non-empty set).
    pub fn contains(&self, tag: &str) -> bool {
        tag.is_empty()
            || self.primary.iter().any(|t| t == tag)
            || self.required.iter().any(|t| t == tag)
    }

    /// Walk every accepted tag in preference order: primary, required,
    /// then the empty tag.
    pub fn walk(&self) -> impl Iterator<Item = &str> {
        self.primary
            .iter()
            .chain(self.required.iter())
            .map(String::as_str)
            .chain(std::iter::once(""))
    }
}
