//! ISO-639-3 macro-language expansion.
//!
//! Maps a base locale to the set of language codes considered linguistically
//! equivalent to it: the macro-language code, its individual members, and the
//! two/three-letter aliases. The table is static and initialized once; it is
//! never mutated after startup.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Groups of equivalent language codes.
///
/// Each inner slice is one equivalence class: a macro-language with its
/// individual members, or a plain two-letter/three-letter alias pair. The
/// order within a slice is the order codes are emitted by [`expand`], most
/// generic first.
const CODE_GROUPS: &[&[&str]] = &[
    // Macro-languages and their individual members.
    &["ar", "ara", "arb"],
    &["az", "aze", "azj", "azb"],
    &["et", "est", "ekk", "vro"],
    &["fa", "fas", "per", "pes", "prs"],
    &["gn", "grn", "gug"],
    &["ku", "kur", "kmr", "ckb", "sdh"],
    &["lv", "lav", "lvs", "ltg"],
    &["mn", "mon", "khk", "mvf"],
    &["ms", "msa", "may", "zsm", "zlm"],
    &["no", "nor", "nb", "nob", "nn", "nno"],
    &["om", "orm", "gaz", "hae"],
    &["ps", "pus", "pst", "pbt", "pbu"],
    &["qu", "que", "quy", "quz"],
    &["sc", "srd", "sro", "src", "sdn", "sdc"],
    &["sh", "hbs", "sr", "srp", "hr", "hrv", "bs", "bos"],
    &["sq", "sqi", "alb", "als", "aln"],
    &["sw", "swa", "swh", "swc"],
    &["uz", "uzb", "uzn", "uzs"],
    &["yi", "yid", "ydd", "yih"],
    &["zh", "zho", "chi", "cmn", "yue", "wuu", "hak", "nan", "gan", "hsn"],
    // Common two-letter / three-letter aliases.
    &["cs", "ces", "cze"],
    &["de", "deu", "ger"],
    &["el", "ell", "gre"],
    &["en", "eng"],
    &["es", "spa"],
    &["fi", "fin"],
    &["fr", "fra", "fre"],
    &["it", "ita"],
    &["ja", "jpn"],
    &["nl", "nld", "dut"],
    &["pl", "pol"],
    &["pt", "por"],
    &["ru", "rus"],
    &["sv", "swe"],
    &["tr", "tur"],
    &["uk", "ukr"],
];

/// Lookup from any member code to its equivalence class.
static CODE_INDEX: OnceLock<HashMap<&'static str, &'static [&'static str]>> = OnceLock::new();

fn code_index() -> &'static HashMap<&'static str, &'static [&'static str]> {
    CODE_INDEX.get_or_init(|| {
        let mut index = HashMap::new();
        for group in CODE_GROUPS {
            for code in *group {
                index.insert(*code, *group);
            }
        }
        index
    })
}

/// Reduce a locale tag to the bare language subtag used for lookup.
///
/// "fr-FR", "fr_FR" and "FR" all reduce to "fr". An empty tag stays empty.
fn language_subtag(locale: &str) -> String {
    locale
        .split(['-', '_'])
        .next()
        .unwrap_or("")
        .to_ascii_lowercase()
}

/// Expand a base locale to all codes considered equivalent to it.
///
/// The caller's literal tag is always the first element. For a known
/// macro-language relation the remaining members follow in table order; for
/// an unknown code the result is the trivial singleton. The result never
/// contains duplicates.
pub fn expand(locale: &str) -> Vec<String> {
    let mut result = vec![locale.to_string()];
    let subtag = language_subtag(locale);
    if let Some(group) = code_index().get(subtag.as_str()) {
        for code in *group {
            if *code != locale {
                result.push((*code).to_string());
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_unknown_code_is_singleton() {
        assert_eq!(expand("xx"), vec!["xx".to_string()]);
    }

    #[test]
    fn test_expand_empty_is_singleton() {
        assert_eq!(expand(""), vec!["".to_string()]);
    }

    #[test]
    fn test_expand_norwegian_macro() {
        let codes = expand("nb");
        assert_eq!(codes[0], "nb");
        assert!(codes.contains(&"no".to_string()));
        assert!(codes.contains(&"nn".to_string()));
        assert!(codes.contains(&"nob".to_string()));
        assert!(codes.contains(&"nno".to_string()));
    }

    #[test]
    fn test_expand_includes_input_exactly_once() {
        let codes = expand("no");
        assert_eq!(codes.iter().filter(|c| *c == "no").count(), 1);
        assert_eq!(codes[0], "no");
    }

    #[test]
    fn test_expand_two_letter_alias() {
        let codes = expand("fr");
        assert_eq!(codes, vec!["fr", "fra", "fre"]);
    }

    #[test]
    fn test_expand_strips_region_subtag() {
        let codes = expand("fr-FR");
        // The literal tag comes first, then the equivalents of "fr".
        assert_eq!(codes[0], "fr-FR");
        assert!(codes.contains(&"fr".to_string()));
        assert!(codes.contains(&"fra".to_string()));
    }

    #[test]
    fn test_expand_underscore_region_subtag() {
        let codes = expand("zh_CN");
        assert!(codes.contains(&"cmn".to_string()));
        assert!(codes.contains(&"yue".to_string()));
    }

    #[test]
    fn test_expand_is_deterministic() {
        assert_eq!(expand("sr"), expand("sr"));
    }

    #[test]
    fn test_expand_serbo_croatian_members_share_group() {
        let from_sr = expand("sr");
        let from_hr = expand("hr");
        assert!(from_sr.contains(&"hr".to_string()));
        assert!(from_hr.contains(&"sr".to_string()));
    }
}
