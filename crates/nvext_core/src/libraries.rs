//! Link library selection
//!
//! Build drivers append the host language runtime (e.g. `python3.9`) to every extension's
//! library list. nvcc resolves that runtime through its own host link step, so a plain
//! `-lpython3.9` must not be emitted. The exclusion is expressed as rules rather than
//! inferred ad hoc at the call site.

/// One exclusion rule for library names
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryRule {
    /// Library name equals the given string
    Exact(String),
    /// Library name starts with the given string
    Prefix(String),
}

impl LibraryRule {
    pub fn matches(&self, library: &str) -> bool {
        match self {
            LibraryRule::Exact(name) => library == name,
            LibraryRule::Prefix(prefix) => library.starts_with(prefix.as_str()),
        }
    }
}

/// Set of rules deciding which requested libraries get a `-l` flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryFilter {
    excluded: Vec<LibraryRule>,
}

impl Default for LibraryFilter {
    /// Excludes the Python runtime, which every extension driver injects
    fn default() -> Self {
        Self {
            excluded: vec![LibraryRule::Prefix("python".to_string())],
        }
    }
}

impl LibraryFilter {
    /// Filter that passes every library through
    pub fn allow_all() -> Self {
        Self { excluded: Vec::new() }
    }

    pub fn exclude(mut self, rule: LibraryRule) -> Self {
        self.excluded.push(rule);
        self
    }

    pub fn rules(&self) -> &[LibraryRule] {
        &self.excluded
    }

    pub fn is_excluded(&self, library: &str) -> bool {
        self.excluded.iter().any(|rule| rule.matches(library))
    }

    /// Libraries that should be linked explicitly, in request order
    pub fn select<'a>(&'a self, libraries: &'a [String]) -> impl Iterator<Item = &'a str> + 'a {
        libraries
            .iter()
            .map(String::as_str)
            .filter(move |lib| !self.is_excluded(lib))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn libs(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_drops_python_runtime() {
        let filter = LibraryFilter::default();
        let requested = libs(&["cublas", "python3.9", "python", "curand"]);
        let selected: Vec<_> = filter.select(&requested).collect();
        assert_eq!(selected, vec!["cublas", "curand"]);
    }

    #[test]
    fn test_exact_rule_does_not_match_prefix() {
        let filter = LibraryFilter::allow_all().exclude(LibraryRule::Exact("m".to_string()));
        assert!(filter.is_excluded("m"));
        assert!(!filter.is_excluded("mkl"));
    }

    #[test]
    fn test_allow_all_keeps_everything() {
        let requested = libs(&["python3.11", "cudart"]);
        assert_eq!(LibraryFilter::allow_all().select(&requested).count(), 2);
    }
}
