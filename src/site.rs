//! Per-site display configuration.
//!
//! A site's locale behavior lives in four per-site settings: its base
//! locale, its display policy, an explicit fallback chain, and the
//! languages that must always be shown. The site itself (identifier, slug)
//! is owned by the host platform; this struct is the read-only input the
//! filtering core works from.

use crate::db::{Database, StoreError};
use crate::i18n::{DisplayPolicy, LocaleSet};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Per-site setting keys.
pub const LOCALE_SETTING: &str = "lingua_locale";
pub const DISPLAY_VALUES_SETTING: &str = "lingua_display_values";
pub const FALLBACKS_SETTING: &str = "lingua_fallbacks";
pub const REQUIRED_LANGUAGES_SETTING: &str = "lingua_required_languages";

/// A site's locale configuration, as the display pipeline consumes it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub slug: String,
    /// Base locale tag; empty means the site has no language.
    pub locale: String,
    pub policy: DisplayPolicy,
    /// Admin-configured ordered fallback chain for `site_fallback`.
    pub fallbacks: Vec<String>,
    /// Languages always shown regardless of the primary filtering rule.
    pub required: Vec<String>,
}

impl Site {
    /// A site with no locale configuration: policy `all`, nothing filtered.
    pub fn new(slug: impl Into<String>) -> Site {
        Site {
            slug: slug.into(),
            ..Site::default()
        }
    }

    /// Load a site's configuration from the settings store.
    ///
    /// Fails with [`StoreError::SiteNotFound`] for an unknown slug. An
    /// unrecognized persisted policy string is not an error: the policy
    /// falls open to `all` and the stored value is rewritten, so the
    /// misconfiguration heals itself.
    pub fn load(db: &Database, slug: &str) -> Result<Site, StoreError> {
        let locale: String = db
            .get_site_setting(slug, LOCALE_SETTING)?
            .unwrap_or_default();
        let fallbacks: Vec<String> = db
            .get_site_setting(slug, FALLBACKS_SETTING)?
            .unwrap_or_default();
        let required: Vec<String> = db
            .get_site_setting(slug, REQUIRED_LANGUAGES_SETTING)?
            .unwrap_or_default();

        let policy = match db
            .get_site_setting::<String>(slug, DISPLAY_VALUES_SETTING)?
        {
            None => DisplayPolicy::default(),
            Some(raw) => match DisplayPolicy::parse(&raw) {
                Some(policy) => policy,
                None => {
                    warn!(slug, value = raw.as_str(), "unknown display policy, resetting to 'all'");
                    db.set_site_setting(
                        slug,
                        DISPLAY_VALUES_SETTING,
                        &DisplayPolicy::All.as_str(),
                    )?;
                    DisplayPolicy::All
                }
            },
        };

        Ok(Site {
            slug: slug.to_string(),
            locale,
            policy,
            fallbacks,
            required,
        })
    }

    /// Persist this configuration to the settings store.
    pub fn save(&self, db: &Database) -> Result<(), StoreError> {
        db.set_site_setting(&self.slug, LOCALE_SETTING, &self.locale)?;
        db.set_site_setting(&self.slug, DISPLAY_VALUES_SETTING, &self.policy.as_str())?;
        db.set_site_setting(&self.slug, FALLBACKS_SETTING, &self.fallbacks)?;
        db.set_site_setting(&self.slug, REQUIRED_LANGUAGES_SETTING, &self.required)?;
        Ok(())
    }

    /// The accepted-locale set for this site's configuration.
    pub fn locale_set(&self) -> LocaleSet {
        LocaleSet::for_site(self.policy, &self.locale, &self.fallbacks, &self.required)
    }
}
