use serde::Deserialize;

use crate::app::Result;

/// One row of a source page: `[date, title, url, id]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "HeadlineRow")]
pub struct Headline {
    /// `yyyymmdd`
    pub date: String,
    pub title: String,
    pub url: String,
    /// Stable identity for list rendering
    pub id: String,
}

impl Headline {
    pub fn new(
        date: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            title: title.into(),
            url: url.into(),
            id: id.into(),
        }
    }

    /// Text handed to a share target.
    pub fn share_message(&self, publication: &str) -> String {
        format!("{} ({}) {}", self.title, publication, self.url)
    }
}

// The feed scripts emit dates and ids as either strings or bare numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

impl From<Scalar> for String {
    fn from(value: Scalar) -> Self {
        match value {
            Scalar::Text(s) => s,
            Scalar::Number(n) => n.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct HeadlineRow(Scalar, String, String, Scalar);

impl From<HeadlineRow> for Headline {
    fn from(row: HeadlineRow) -> Self {
        let HeadlineRow(date, title, url, id) = row;
        Self {
            date: date.into(),
            title,
            url,
            id: id.into(),
        }
    }
}

/// Body of a per-source endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HeadlinePage {
    #[serde(default)]
    pub result: Vec<Headline>,
}

impl HeadlinePage {
    pub fn from_json(body: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_string_rows() {
        let body = br#"{"result": [["20240102", "Monsoon arrives", "http://x.example/1", "42"]]}"#;
        let page = HeadlinePage::from_json(body).unwrap();
        assert_eq!(
            page.result,
            vec![Headline::new("20240102", "Monsoon arrives", "http://x.example/1", "42")]
        );
    }

    #[test]
    fn test_decodes_numeric_date_and_id() {
        let body = br#"{"result": [[20240102, "Title", "http://x.example/1", 7]]}"#;
        let page = HeadlinePage::from_json(body).unwrap();
        assert_eq!(page.result[0].date, "20240102");
        assert_eq!(page.result[0].id, "7");
    }

    #[test]
    fn test_empty_and_missing_result_are_empty_pages() {
        assert!(HeadlinePage::from_json(br#"{"result": []}"#).unwrap().result.is_empty());
        assert!(HeadlinePage::from_json(br#"{}"#).unwrap().result.is_empty());
    }

    #[test]
    fn test_short_row_is_an_error() {
        assert!(HeadlinePage::from_json(br#"{"result": [["20240102", "Title"]]}"#).is_err());
    }

    #[test]
    fn test_share_message() {
        let headline = Headline::new("20240102", "Ferry resumes", "http://x.example/f", "1");
        assert_eq!(
            headline.share_message("Herald"),
            "Ferry resumes (Herald) http://x.example/f"
        );
    }
}
