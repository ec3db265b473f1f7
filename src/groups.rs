//! Site translation groups.
//!
//! Editors define groups of mutually translated sites as free text, one
//! group per line, slugs separated by spaces or commas. Resolution turns
//! that text into a validated partition of the known sites: invalid tokens
//! are dropped silently, a slug belongs to at most one group (first group
//! wins), and singleton lines carry no information and are discarded from
//! storage. The read side re-validates stored groups against the current
//! site list and synthesizes one-element groups for unclaimed sites, so
//! callers always see a full partition.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::OnceLock;

static TOKEN_SPLIT: OnceLock<Regex> = OnceLock::new();

fn token_split() -> &'static Regex {
    TOKEN_SPLIT.get_or_init(|| Regex::new(r"[\s,]+").expect("valid token pattern"))
}

/// Compare two slugs with numeric awareness, so "site2" sorts before
/// "site10". Case-insensitive, with the raw byte order as tie-breaker.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();
    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(lc), Some(rc)) => {
                if lc.is_ascii_digit() && rc.is_ascii_digit() {
                    let ln = take_number(&mut left);
                    let rn = take_number(&mut right);
                    match ln.cmp(&rn) {
                        Ordering::Equal => {}
                        other => return other,
                    }
                } else {
                    let lc_fold = lc.to_ascii_lowercase();
                    let rc_fold = rc.to_ascii_lowercase();
                    match lc_fold.cmp(&rc_fold) {
                        Ordering::Equal => {
                            left.next();
                            right.next();
                        }
                        other => return other,
                    }
                }
            }
        }
    }
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars>) -> u128 {
    let mut n: u128 = 0;
    while let Some(c) = chars.peek().copied() {
        if let Some(digit) = c.to_digit(10) {
            n = n.saturating_mul(10).saturating_add(digit as u128);
            chars.next();
        } else {
            break;
        }
    }
    n
}

/// One site's entry in the group table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupEntry {
    pub slug: String,
    pub members: Vec<String>,
}

/// A partition of site slugs into translation groups.
///
/// Every member slug keys its own entry pointing at the identical, naturally
/// sorted member list; entries themselves are naturally sorted by key. The
/// storage form keeps only multi-member groups, the display form is the full
/// partition including synthesized singletons.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteGroups {
    entries: Vec<GroupEntry>,
}

impl SiteGroups {
    /// The group a slug belongs to, if it has an entry.
    pub fn get(&self, slug: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|entry| entry.slug == slug)
            .map(|entry| entry.members.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &GroupEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build the keyed table from whole groups: one entry per member,
    /// naturally sorted by key.
    fn from_groups(groups: Vec<Vec<String>>) -> SiteGroups {
        let mut entries: Vec<GroupEntry> = Vec::new();
        for members in groups {
            for slug in &members {
                entries.push(GroupEntry {
                    slug: slug.clone(),
                    members: members.clone(),
                });
            }
        }
        entries.sort_by(|a, b| natural_cmp(&a.slug, &b.slug));
        SiteGroups { entries }
    }
}

/// Clean one candidate member list against the pool of available slugs.
///
/// Deduplicates, drops unknown and already-claimed slugs, and sorts the
/// survivors naturally. Shared by the storage and display resolvers.
fn clean_members<'a, I>(candidates: I, pool: &HashSet<&str>) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut members: Vec<String> = Vec::new();
    for token in candidates {
        let token = token.trim();
        if token.is_empty() || !pool.contains(token) {
            continue;
        }
        if !members.iter().any(|m| m == token) {
            members.push(token.to_string());
        }
    }
    members.sort_by(|a, b| natural_cmp(a, b));
    members
}

/// Parse free-text group definitions into the storage-form partition.
///
/// One group per line, slugs separated by whitespace or commas. Unknown
/// slugs are dropped, a slug consumed by an earlier line is unavailable to
/// later ones, and lines that clean down to a single member are discarded.
/// Running the resolver twice on identical input yields identical output.
pub fn resolve_for_storage(free_text: &str, known_slugs: &[String]) -> SiteGroups {
    let text = free_text.replace("\r\n", "\n").replace('\r', "\n");
    let mut pool: HashSet<&str> = known_slugs.iter().map(String::as_str).collect();

    let mut groups: Vec<Vec<String>> = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let members = clean_members(token_split().split(line), &pool);
        if members.len() > 1 {
            for member in &members {
                pool.remove(member.as_str());
            }
            groups.push(members);
        }
    }

    SiteGroups::from_groups(groups)
}

/// Re-validate stored groups against the current site list and return the
/// full partition for read purposes.
///
/// Members that no longer exist are removed, groups that fall to one member
/// are dropped, and every site not claimed by a surviving group gets a
/// synthesized one-element group. Every known site appears exactly once.
pub fn resolve_for_display(stored: &SiteGroups, known_slugs: &[String]) -> SiteGroups {
    let mut pool: HashSet<&str> = known_slugs.iter().map(String::as_str).collect();

    let mut keys: Vec<&GroupEntry> = stored.entries.iter().collect();
    keys.sort_by(|a, b| natural_cmp(&a.slug, &b.slug));

    let mut groups: Vec<Vec<String>> = Vec::new();
    for entry in keys {
        if !pool.contains(entry.slug.as_str()) {
            continue;
        }
        let members = clean_members(entry.members.iter().map(String::as_str), &pool);
        if members.len() > 1 {
            for member in &members {
                pool.remove(member.as_str());
            }
            groups.push(members);
        }
    }

    // Everything left unclaimed is its own group of one.
    for slug in known_slugs {
        if pool.contains(slug.as_str()) {
            groups.push(vec![slug.clone()]);
        }
    }

    SiteGroups::from_groups(groups)
}

/// Render a group table back to the free-text form, one group per line,
/// members separated by spaces. Each distinct group is emitted once.
pub fn format_groups(groups: &SiteGroups) -> String {
    let mut lines = Vec::new();
    for entry in &groups.entries {
        // Every member keys the identical group; emit it at its first member.
        if entry.members.first().map(String::as_str) == Some(entry.slug.as_str()) {
            lines.push(entry.members.join(" "));
        }
    }
    lines.join("\n")
}
