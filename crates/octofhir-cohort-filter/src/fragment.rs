//! Fragment grammar: `frag(&frag)*` with `frag = key=value`

/// One `key=value` fragment of a filter string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterFragment<'a> {
    pub key: &'a str,
    /// Everything after the first `=`, empty when there is none
    pub value: &'a str,
}

impl<'a> FilterFragment<'a> {
    pub fn parse(fragment: &'a str) -> Self {
        match fragment.split_once('=') {
            Some((key, value)) => Self { key, value },
            None => Self {
                key: fragment,
                value: "",
            },
        }
    }
}

impl std::fmt::Display for FilterFragment<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Split a filter string into fragments, skipping empty ones
pub fn split_filter(filter: &str) -> Vec<FilterFragment<'_>> {
    filter
        .split('&')
        .filter(|f| !f.is_empty())
        .map(FilterFragment::parse)
        .collect()
}

/// Assembles a filter string
///
/// Absent or empty values are skipped, so no `key=` fragment is ever written.
#[derive(Debug, Clone, Default)]
pub struct FilterBuilder {
    fragments: Vec<String>,
}

impl FilterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pre-assembled fragment (or several joined by `&`)
    pub fn push_raw(&mut self, fragment: impl Into<String>) -> &mut Self {
        let fragment = fragment.into();
        if !fragment.is_empty() {
            self.fragments.push(fragment);
        }
        self
    }

    /// Append `key=value` when there is a value
    pub fn push(&mut self, key: &str, value: Option<String>) -> &mut Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.fragments.push(format!("{}={}", key, value));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn finish(self) -> String {
        self.fragments.join("&")
    }
}
