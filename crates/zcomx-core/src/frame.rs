//! Messages exchanged with an embedding parent frame
//!
//! The reader tells its parent to tear it down with `close`, and a parent can
//! point an embedded reader at another book with `switch`. Messages travel as
//! JSON (`{"action": "switch", "url": "..."}`) or as the bare strings `close`
//! and `switch:<url>`.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum FrameMessage {
    /// Reader asks its parent to close it
    Close,
    /// Parent redirects the reader to another page list
    Switch { url: String },
}

impl FrameMessage {
    /// Parse either wire form
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();

        if raw.starts_with('{') {
            return Ok(serde_json::from_str(raw)?);
        }

        if raw.eq_ignore_ascii_case("close") {
            return Ok(Self::Close);
        }

        if let Some(url) = raw.strip_prefix("switch:") {
            let url = url.trim();
            if url.is_empty() {
                return Err(Error::Other("switch message without a URL".to_string()));
            }
            return Ok(Self::Switch { url: url.to_string() });
        }

        Err(Error::Other(format!("Unknown frame message: {}", raw)))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_strings() {
        assert_eq!(FrameMessage::parse("close").unwrap(), FrameMessage::Close);
        assert_eq!(FrameMessage::parse(" CLOSE\n").unwrap(), FrameMessage::Close);
        assert_eq!(
            FrameMessage::parse("switch:https://zco.mx/books/7/pages.json").unwrap(),
            FrameMessage::Switch {
                url: "https://zco.mx/books/7/pages.json".to_string()
            }
        );
    }

    #[test]
    fn test_parse_json() {
        assert_eq!(
            FrameMessage::parse(r#"{"action": "close"}"#).unwrap(),
            FrameMessage::Close
        );
        assert_eq!(
            FrameMessage::parse(r#"{"action": "switch", "url": "b.json"}"#).unwrap(),
            FrameMessage::Switch { url: "b.json".to_string() }
        );
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(FrameMessage::parse("resize").is_err());
        assert!(FrameMessage::parse("switch:").is_err());
        assert!(matches!(
            FrameMessage::parse(r#"{"action": "open"}"#),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn test_close_serialization() {
        assert_eq!(FrameMessage::Close.to_json().unwrap(), r#"{"action":"close"}"#);
    }
}
