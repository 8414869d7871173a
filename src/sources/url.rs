//! Query rewriting for per-source URLs.
//!
//! Source URLs arrive from the catalog with `limit` and `offset` already
//! baked in, so pagination is a literal substitution of the first
//! `limit=<digits>` / `offset=<digits>` occurrence. URLs without the
//! parameter are left as they are.

use std::sync::LazyLock;

use regex::Regex;

static LIMIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"limit=\d+").unwrap());
static OFFSET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"offset=\d+").unwrap());

pub fn with_limit(url: &str, limit: u32) -> String {
    LIMIT.replace(url, format!("limit={limit}")).into_owned()
}

pub fn with_offset(url: &str, offset: u32) -> String {
    OFFSET.replace(url, format!("offset={offset}")).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HREF: &str = "http://www.omgoa.com/scripts/herald.py?limit=10&offset=0";

    #[test]
    fn test_limit_is_replaced() {
        assert_eq!(
            with_limit(HREF, 5),
            "http://www.omgoa.com/scripts/herald.py?limit=5&offset=0"
        );
    }

    #[test]
    fn test_offset_is_replaced() {
        assert_eq!(
            with_offset(HREF, 20),
            "http://www.omgoa.com/scripts/herald.py?limit=10&offset=20"
        );
    }

    #[test]
    fn test_only_first_occurrence_is_replaced() {
        assert_eq!(
            with_offset("http://x.example/?offset=0&b=offset=3", 10),
            "http://x.example/?offset=10&b=offset=3"
        );
    }

    #[test]
    fn test_url_without_parameters_is_unchanged() {
        let url = "http://x.example/feed";
        assert_eq!(with_limit(url, 5), url);
        assert_eq!(with_offset(url, 10), url);
    }
}
