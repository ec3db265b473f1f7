//! Composed operations the host application calls.
//!
//! Ties the pure pieces together: locale-set construction plus value
//! filtering for resource display, and the settings-save / settings-read
//! flows for site groups.

use crate::db::Database;
use crate::groups::{self, SiteGroups};
use crate::i18n::{select_display_subset, LocalizedValue, ResourceId, ValueCache};
use crate::site::Site;
use anyhow::{Context, Result};
use tracing::debug;

/// Global settings key for the persisted group table.
pub const SITE_GROUPS_SETTING: &str = "lingua_site_groups";

/// The ordered, filtered values to display for one resource property on
/// one site.
///
/// Policy `all` short-circuits to the raw values untouched; every other
/// policy goes through the cached per-property partition. `cache` is the
/// request-scoped [`ValueCache`] owned by the caller.
pub fn resolve_display_values(
    cache: &mut ValueCache,
    site: &Site,
    resource_id: ResourceId,
    term: &str,
    raw_values: &[LocalizedValue],
) -> Vec<LocalizedValue> {
    let locales = site.locale_set();
    if locales.is_empty() {
        return raw_values.to_vec();
    }
    select_display_subset(cache, resource_id, term, raw_values, site.policy, &locales)
}

/// Resolve free-text group definitions against the current site list and
/// persist the result. Returns the stored (multi-member) partition.
pub fn save_site_groups(db: &Database, free_text: &str) -> Result<SiteGroups> {
    let known = db.list_site_slugs().context("Failed to list sites")?;
    let resolved = groups::resolve_for_storage(free_text, &known);
    db.set_setting(SITE_GROUPS_SETTING, &resolved)
        .context("Failed to persist site groups")?;
    debug!(groups = resolved.len(), "saved site groups");
    Ok(resolved)
}

/// The full partition of sites into groups, with singletons synthesized
/// for every site no stored group claims.
pub fn list_site_groups(db: &Database) -> Result<SiteGroups> {
    let known = db.list_site_slugs().context("Failed to list sites")?;
    let stored: SiteGroups = db
        .get_setting(SITE_GROUPS_SETTING)
        .context("Failed to read site groups")?
        .unwrap_or_default();
    Ok(groups::resolve_for_display(&stored, &known))
}

/// The group one site belongs to. A site outside every stored group, or a
/// slug the directory does not know, is its own group of one.
pub fn site_group_of(db: &Database, slug: &str) -> Result<Vec<String>> {
    let all = list_site_groups(db)?;
    Ok(all
        .get(slug)
        .map(<[String]>::to_vec)
        .unwrap_or_else(|| vec![slug.to_string()]))
}
