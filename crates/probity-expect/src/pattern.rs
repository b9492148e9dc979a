//! Key/value patterns over loosely structured text
//!
//! An occurrence `key => value` is found when the key starts at a word
//! boundary and is followed by `=>` and a value. A value opening with a
//! single quote runs to the closing quote; a bare value runs to the next
//! comma or whitespace. The expected value must match the whole occurrence
//! value: `*` in it matches any run of characters, everything else is
//! literal.

use regex::Regex;

const WILDCARD: &str = ".*";

/// Compiled pattern for one expected pair
#[derive(Debug, Clone)]
pub struct PairPattern {
    key: String,
    value: String,
    occurrence: Option<Regex>,
    expected: Option<Regex>,
}

impl PairPattern {
    /// Compile a pattern; `wildcards` enables `*` in the value
    #[must_use]
    pub fn new(key: &str, value: &str, wildcards: bool) -> Self {
        let value_pat = if wildcards {
            value
                .split('*')
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(WILDCARD)
        } else {
            regex::escape(value)
        };

        let occurrence = Regex::new(&format!(
            r"(?m)(?:^|[^\w]){}\s*=>\s*('(?:[^'\\]|\\.)*'|[^'\s,][^\s,]*)",
            regex::escape(key)
        ));
        let expected = Regex::new(&format!("(?s)^{value_pat}$"));

        if let Err(ref e) = expected {
            tracing::warn!("pattern for '{}' falls back to substring search: {}", key, e);
        }

        Self {
            key: key.to_string(),
            value: value.to_string(),
            occurrence: occurrence.ok(),
            expected: expected.ok(),
        }
    }

    /// Key being looked for
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Expected value as written
    #[inline]
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether the pair occurs in `text`
    #[must_use]
    pub fn is_found_in(&self, text: &str) -> bool {
        match (&self.occurrence, &self.expected) {
            (Some(occurrence), Some(expected)) => occurrence
                .captures_iter(text)
                .filter_map(|caps| caps.get(1))
                .any(|raw| expected.is_match(&unquote(raw.as_str()))),
            _ => text.contains(&format!("{} => '{}'", self.key, self.value)),
        }
    }

    /// First value the text shows for this key, quotes stripped
    #[must_use]
    pub fn observed_in(&self, text: &str) -> Option<String> {
        let caps = self.occurrence.as_ref()?.captures(text)?;
        Some(unquote(caps.get(1)?.as_str()))
    }
}

/// Strip surrounding single quotes and undo backslash escapes
fn unquote(raw: &str) -> String {
    let Some(inner) = raw.strip_prefix('\'').and_then(|r| r.strip_suffix('\'')) else {
        return raw.to_string();
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.extend(chars.next()),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTPUT: &str = "cisco_bgp { '2 default':\n  ensure => 'present',\n  timer_bgp_keepalive => '60',\n  shutdown => false,\n  router_id => '1.1.1.1'\n}\n";

    #[test]
    fn quoted_and_bare_values() {
        assert!(PairPattern::new("ensure", "present", true).is_found_in(OUTPUT));
        assert!(PairPattern::new("shutdown", "false", true).is_found_in(OUTPUT));
        assert!(PairPattern::new("router_id", "1.1.1.1", true).is_found_in(OUTPUT));
    }

    #[test]
    fn value_prefix_does_not_match() {
        assert!(!PairPattern::new("timer_bgp_keepalive", "6", true).is_found_in(OUTPUT));
        assert!(!PairPattern::new("timer_bgp_keepalive", "600", true).is_found_in(OUTPUT));
    }

    #[test]
    fn key_suffix_does_not_match() {
        assert!(!PairPattern::new("keepalive", "60", true).is_found_in(OUTPUT));
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        // '.' must not match arbitrary characters.
        assert!(!PairPattern::new("router_id", "1x1.1.1", true).is_found_in(OUTPUT));
    }

    #[test]
    fn wildcard_value() {
        assert!(PairPattern::new("router_id", "1.*", true).is_found_in(OUTPUT));
        assert!(!PairPattern::new("router_id", "1.*", false).is_found_in(OUTPUT));
    }

    #[test]
    fn quoted_value_must_match_whole() {
        let text = "thing { 'x':\n  description => 'core uplink',\n  empty => '',\n}\n";
        assert!(PairPattern::new("description", "core uplink", true).is_found_in(text));
        assert!(!PairPattern::new("description", "core", true).is_found_in(text));
        assert!(!PairPattern::new("description", "uplink", true).is_found_in(text));
        assert!(!PairPattern::new("description", "", true).is_found_in(text));
        assert!(PairPattern::new("description", "core*", true).is_found_in(text));
        assert!(PairPattern::new("empty", "", true).is_found_in(text));
        assert!(!PairPattern::new("empty", "x", true).is_found_in(text));
    }

    #[test]
    fn escaped_quotes_are_unescaped() {
        let text = "  note => 'it\\'s',\n";
        assert!(PairPattern::new("note", "it's", true).is_found_in(text));
        assert_eq!(PairPattern::new("note", "x", true).observed_in(text).as_deref(), Some("it's"));
    }

    #[test]
    fn later_occurrence_counts() {
        let text = "  vrf => 'red',\n  vrf => 'blue',\n";
        assert!(PairPattern::new("vrf", "blue", true).is_found_in(text));
    }

    #[test]
    fn observed_value() {
        let p = PairPattern::new("timer_bgp_keepalive", "30", true);
        assert_eq!(p.observed_in(OUTPUT).as_deref(), Some("60"));
        assert_eq!(PairPattern::new("missing", "x", true).observed_in(OUTPUT), None);
    }
}
