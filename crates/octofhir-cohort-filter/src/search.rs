//! Free-text search terms

use url::form_urlencoded;

/// URL-encode a search term (spaces become `+`)
pub fn encode_search(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    Some(form_urlencoded::byte_serialize(text.as_bytes()).collect())
}

/// Inverse of [`encode_search`]
pub fn decode_search(value: &str) -> String {
    form_urlencoded::parse(value.as_bytes())
        .next()
        .map(|(term, rest)| {
            // a literal `=` survives parsing as the key/value separator
            if rest.is_empty() && !value.contains('=') {
                term.into_owned()
            } else {
                format!("{}={}", term, rest)
            }
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("insuffisance cardiaque", "insuffisance+cardiaque")]
    #[case("réa & soins", "r%C3%A9a+%26+soins")]
    #[case("a=b", "a%3Db")]
    #[case("plain", "plain")]
    fn test_search_round_trip(#[case] text: &str, #[case] encoded: &str) {
        assert_eq!(encode_search(text).as_deref(), Some(encoded));
        assert_eq!(decode_search(encoded), text);
    }

    #[test]
    fn test_empty_search() {
        assert_eq!(encode_search(""), None);
        assert_eq!(decode_search(""), "");
    }
}
