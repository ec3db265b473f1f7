//! Localized-value partitioning and display filtering.
//!
//! A resource's representation triggers value filtering from several
//! independent listeners during one request, so the per-property language
//! partition is cached in a [`ValueCache`] owned by the caller and scoped
//! to that request. The cache is plain request state, not a process-wide
//! static: create it lazily, thread it by `&mut`, drop it with the request.

use crate::i18n::{DisplayPolicy, LocaleSet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Opaque resource identifier, as issued by the host platform.
pub type ResourceId = i64;

/// One value of a resource property, tagged with a language.
///
/// The payload is never inspected or transformed here; an empty `lang`
/// means "no language specified".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalizedValue {
    #[serde(default)]
    pub lang: String,
    pub value: serde_json::Value,
}

impl LocalizedValue {
    pub fn new(lang: impl Into<String>, value: serde_json::Value) -> LocalizedValue {
        LocalizedValue {
            lang: lang.into(),
            value,
        }
    }

    /// Convenience constructor for a plain text value.
    pub fn text(lang: impl Into<String>, text: &str) -> LocalizedValue {
        LocalizedValue::new(lang, serde_json::Value::String(text.to_string()))
    }

    /// Whether the value carries a language tag.
    pub fn is_tagged(&self) -> bool {
        !self.lang.is_empty()
    }
}

/// Per-property partition of values by language tag, in first-seen order.
#[derive(Debug, Clone)]
struct Partition {
    groups: Vec<(String, Vec<LocalizedValue>)>,
}

impl Partition {
    fn compute(raw: &[LocalizedValue]) -> Partition {
        let mut groups: Vec<(String, Vec<LocalizedValue>)> = Vec::new();
        for value in raw {
            match groups.iter_mut().find(|(lang, _)| *lang == value.lang) {
                Some((_, group)) => group.push(value.clone()),
                None => groups.push((value.lang.clone(), vec![value.clone()])),
            }
        }
        Partition { groups }
    }

    fn group(&self, tag: &str) -> Option<&[LocalizedValue]> {
        self.groups
            .iter()
            .find(|(lang, _)| lang == tag)
            .map(|(_, group)| group.as_slice())
    }

    /// A property with at most the untagged group is not actually
    /// multilingual (identifiers, numbers) and bypasses filtering.
    fn is_multilingual(&self) -> bool {
        self.groups.iter().any(|(lang, _)| !lang.is_empty())
    }
}

/// Request-scoped cache of per-property partitions.
///
/// Keyed by `(resource id, property term)`. Not safe for concurrent
/// mutation; confine it to one logical request and discard it afterward.
#[derive(Debug, Default)]
pub struct ValueCache {
    partitions: HashMap<(ResourceId, String), Partition>,
}

impl ValueCache {
    pub fn new() -> ValueCache {
        ValueCache::default()
    }

    /// Whether the partition for a property has already been computed.
    pub fn is_cached(&self, resource_id: ResourceId, term: &str) -> bool {
        self.partitions
            .keys()
            .any(|(id, t)| *id == resource_id && t == term)
    }

    fn partition_for(
        &mut self,
        resource_id: ResourceId,
        term: &str,
        raw: &[LocalizedValue],
    ) -> &Partition {
        let key = (resource_id, term.to_string());
        self.partitions.entry(key).or_insert_with(|| {
            debug!(resource_id, term, values = raw.len(), "partitioning values");
            Partition::compute(raw)
        })
    }
}

/// Reconstruct the ordered "all languages" list for one property.
///
/// With an empty locale set (policy `all`) this is the identity. Otherwise
/// accepted languages come first in the set's walk order; languages outside
/// the set follow in first-seen order for a reordering policy and are
/// dropped for a restrictive one. A property with no language metadata at
/// all is returned unchanged.
pub fn partition_by_language(
    cache: &mut ValueCache,
    resource_id: ResourceId,
    term: &str,
    raw: &[LocalizedValue],
    locales: &LocaleSet,
    policy: DisplayPolicy,
) -> Vec<LocalizedValue> {
    if locales.is_empty() {
        return raw.to_vec();
    }

    let partition = cache.partition_for(resource_id, term, raw);
    if !partition.is_multilingual() {
        return raw.to_vec();
    }

    let mut ordered = Vec::with_capacity(raw.len());
    for tag in locales.walk() {
        if let Some(group) = partition.group(tag) {
            ordered.extend_from_slice(group);
        }
    }
    if !policy.is_restrictive() {
        for (lang, group) in &partition.groups {
            if !locales.contains(lang) {
                ordered.extend_from_slice(group);
            }
        }
    }
    ordered
}

/// Compute the display subset of one property's values under a policy.
///
/// - `all` and the `all_*` reordering policies return the full
///   reconstruction of [`partition_by_language`], as does any property
///   that is not actually multilingual.
/// - `site` / `site_iso` return every accepted language group in walk
///   order.
/// - `site_fallback` returns the first non-empty group among the primary
///   tags, plus every required-language group in full, plus the untagged
///   group.
pub fn select_display_subset(
    cache: &mut ValueCache,
    resource_id: ResourceId,
    term: &str,
    raw: &[LocalizedValue],
    policy: DisplayPolicy,
    locales: &LocaleSet,
) -> Vec<LocalizedValue> {
    if locales.is_empty() || !policy.is_restrictive() {
        return partition_by_language(cache, resource_id, term, raw, locales, policy);
    }

    let multilingual = cache.partition_for(resource_id, term, raw).is_multilingual();
    if !multilingual {
        return raw.to_vec();
    }

    match policy {
        DisplayPolicy::Site | DisplayPolicy::SiteIso => {
            partition_by_language(cache, resource_id, term, raw, locales, policy)
        }
        DisplayPolicy::SiteFallback => {
            let partition = cache.partition_for(resource_id, term, raw);
            let mut selected = Vec::new();
            // Show one language: the most specific primary tag with values.
            for tag in locales.primary() {
                if let Some(group) = partition.group(tag) {
                    if !group.is_empty() {
                        selected.extend_from_slice(group);
                        break;
                    }
                }
            }
            // Required languages are always shown in full.
            for tag in locales.required() {
                if let Some(group) = partition.group(tag) {
                    selected.extend_from_slice(group);
                }
            }
            if let Some(group) = partition.group("") {
                selected.extend_from_slice(group);
            }
            selected
        }
        _ => unreachable!("non-restrictive policies handled above"),
    }
}
