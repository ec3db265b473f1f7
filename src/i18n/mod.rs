//! Internationalization (i18n) primitives for multi-site value display.
//!
//! This module contains the locale-facing building blocks used when a
//! resource is rendered on a site:
//!
//! - `expander`: ISO-639-3 macro-language expansion for a base locale
//! - `policy`: the per-site display policy enum
//! - `fallback`: builds the ordered set of accepted locale tags for a site
//! - `filter`: partitions and filters a property's localized values
//!
//! # Example
//!
//! ```rust,ignore
//! use lingua_switch::i18n::{DisplayPolicy, LocaleSet, ValueCache};
//!
//! // Accepted locales for a Norwegian site that also shows macro-relatives
//! let set = LocaleSet::for_site(DisplayPolicy::SiteIso, "nb", &[], &[]);
//!
//! // Request-scoped cache, owned by the caller
//! let mut cache = ValueCache::new();
//! ```

mod expander;
mod fallback;
mod filter;
mod policy;

pub use expander::expand;
pub use fallback::LocaleSet;
pub use filter::{
    partition_by_language, select_display_subset, LocalizedValue, ResourceId, ValueCache,
};
pub use policy::DisplayPolicy;
