//! Cross-site translation relationships and locale-driven value filtering
//! for a multi-site content platform.
//!
//! Three concerns live here:
//!
//! - **Value display** ([`display::resolve_display_values`]): given a
//!   resource property's localized values and a site's display policy,
//!   compute the ordered, filtered values to show, with a request-scoped
//!   cache so repeated listeners on the same resource share one partition.
//! - **Site groups** ([`display::save_site_groups`],
//!   [`display::list_site_groups`]): parse free-text group definitions into
//!   a validated partition of sites considered mutual-translation
//!   candidates.
//! - **Page relations** ([`db::Database::replace_relations`]): maintain the
//!   undirected "this page translates that page" graph as canonical
//!   `(low, high)` pairs, replaced atomically on every page save.
//!
//! This is a library: no routing, rendering, or authentication happens
//! here. The host supplies the current site, the raw values, and the
//! selected related pages; storage is a shared SQLite handle.

pub mod db;
pub mod display;
pub mod groups;
pub mod i18n;
pub mod site;

pub use db::{Database, StoreError};
pub use display::{
    list_site_groups, resolve_display_values, save_site_groups, site_group_of,
    SITE_GROUPS_SETTING,
};
pub use groups::{format_groups, natural_cmp, GroupEntry, SiteGroups};
pub use i18n::{DisplayPolicy, LocaleSet, LocalizedValue, ResourceId, ValueCache};
pub use site::Site;
