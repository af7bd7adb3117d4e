//! Include/exclude name filtering for discovered modules.

use webassets_core::ModuleName;

/// A `*`-wildcard include/exclude filter over module names.
///
/// An empty include list accepts everything. Exclude takes precedence over
/// include when both match the same name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameFilter {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl NameFilter {
    /// Accept every module.
    pub fn all() -> NameFilter {
        NameFilter::default()
    }

    pub fn new(include: Vec<String>, exclude: Vec<String>) -> NameFilter {
        NameFilter { include, exclude }
    }

    pub fn accepts(&self, module: &ModuleName) -> bool {
        if self.exclude.iter().any(|p| wildcard_match(p, &module.0)) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|p| wildcard_match(p, &module.0))
    }
}

/// Glob-lite matching: `*` matches any run of characters, everything else
/// matches literally.
fn wildcard_match(pattern: &str, name: &str) -> bool {
    fn inner(pattern: &[u8], name: &[u8]) -> bool {
        match pattern.split_first() {
            None => name.is_empty(),
            Some((b'*', rest)) => {
                (0..=name.len()).any(|skip| inner(rest, &name[skip..]))
            }
            Some((ch, rest)) => name.split_first().is_some_and(|(n, tail)| n == ch && inner(rest, tail)),
        }
    }
    inner(pattern.as_bytes(), name.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(name: &str) -> ModuleName {
        ModuleName::from(name)
    }

    #[test]
    fn empty_filter_accepts_all() {
        assert!(NameFilter::all().accepts(&m("jquery")));
    }

    #[test]
    fn include_only_restricts() {
        let filter = NameFilter::new(vec!["prototype".into()], vec![]);
        assert!(filter.accepts(&m("prototype")));
        assert!(!filter.accepts(&m("jquery")));
    }

    #[test]
    fn exclude_beats_include() {
        let filter = NameFilter::new(vec!["*".into()], vec!["jquery".into()]);
        assert!(!filter.accepts(&m("jquery")));
        assert!(filter.accepts(&m("prototype")));
    }

    #[test]
    fn wildcard_patterns() {
        assert!(wildcard_match("*", "anything"));
        assert!(wildcard_match("jq*", "jquery"));
        assert!(wildcard_match("*query", "jquery"));
        assert!(wildcard_match("j*y", "jquery"));
        assert!(!wildcard_match("jq*", "prototype"));
        assert!(wildcard_match("jquery", "jquery"));
        assert!(!wildcard_match("jquery", "jquery2"));
    }
}
