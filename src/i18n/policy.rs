//! Display policy: which languages' values a site shows.
//!
//! Persisted as a plain string in the site settings. Unknown strings never
//! fail: they parse to `None` and the settings layer falls back to
//! [`DisplayPolicy::All`], rewriting the stored value so the
//! misconfiguration heals itself on the next read.

use serde::{Deserialize, Serialize};

/// Per-site policy controlling which languages' values are shown for a
/// localizable property.
///
/// The `All*` variants keep every value but reorder it (site-matching
/// languages first); the `Site*` variants actually restrict what is shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayPolicy {
    /// Show every value untouched. The default, and the fail-open target.
    #[default]
    All,
    /// Show all values, site language first.
    AllSite,
    /// Show all values, site language and its ISO-639-3 relatives first.
    AllIso,
    /// Show all values, site language and its fallback chain first.
    AllFallback,
    /// Show only values in the site language.
    Site,
    /// Show only values in the site language or its ISO-639-3 relatives.
    SiteIso,
    /// Show the first matching language of the fallback chain.
    SiteFallback,
}

impl DisplayPolicy {
    /// Parse a persisted policy string.
    ///
    /// Returns `None` for anything unrecognized; the caller decides how to
    /// fail open (see [`crate::site::Site::load`]).
    pub fn parse(value: &str) -> Option<DisplayPolicy> {
        match value {
            "all" => Some(DisplayPolicy::All),
            "all_site" => Some(DisplayPolicy::AllSite),
            "all_iso" => Some(DisplayPolicy::AllIso),
            "all_fallback" => Some(DisplayPolicy::AllFallback),
            "site" => Some(DisplayPolicy::Site),
            "site_iso" => Some(DisplayPolicy::SiteIso),
            "site_fallback" => Some(DisplayPolicy::SiteFallback),
            _ => None,
        }
    }

    /// The persisted string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayPolicy::All => "all",
            DisplayPolicy::AllSite => "all_site",
            DisplayPolicy::AllIso => "all_iso",
            DisplayPolicy::AllFallback => "all_fallback",
            DisplayPolicy::Site => "site",
            DisplayPolicy::SiteIso => "site_iso",
            DisplayPolicy::SiteFallback => "site_fallback",
        }
    }

    /// Whether this policy hides values in non-accepted languages.
    pub fn is_restrictive(&self) -> bool {
        matches!(
            self,
            DisplayPolicy::Site | DisplayPolicy::SiteIso | DisplayPolicy::SiteFallback
        )
    }

    /// Whether this policy only reorders values without hiding any.
    pub fn is_informational(&self) -> bool {
        matches!(
            self,
            DisplayPolicy::AllSite | DisplayPolicy::AllIso | DisplayPolicy::AllFallback
        )
    }
}
