//! Decoding of the endpoint's reply body into bot text.
use serde_json::Value;
use thiserror::Error;

/// Bot text used when a successful reply carries no usable text.
pub const NOT_UNDERSTOOD_TEXT: &str = "Desculpe, não entendi.";

#[derive(Error, Debug)]
pub enum ReplyDecodeError {
    #[error("Reply body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("Reply body is JSON null")]
    NullBody,
}

/// Picks the bot text out of a reply body.
///
/// Fields in `preference` are tried in order and the first one holding a non-blank
/// string wins. When none does, including bodies that are not objects, the caller
/// uses `fallback`. Only bodies that are not JSON at all, or are `null`, are errors.
#[derive(Debug, Clone, Copy)]
pub struct ReplyDecoder {
    preference: &'static [&'static str],
    fallback: &'static str,
}

impl ReplyDecoder {
    pub const fn new(preference: &'static [&'static str], fallback: &'static str) -> Self {
        Self {
            preference,
            fallback,
        }
    }

    /// Text of the first usable field, or `None` when the body has none.
    pub fn decode(&self, body: &str) -> Result<Option<String>, ReplyDecodeError> {
        let value: Value = serde_json::from_str(body)?;
        if value.is_null() {
            return Err(ReplyDecodeError::NullBody);
        }

        Ok(self
            .preference
            .iter()
            .filter_map(|field| value.get(field).and_then(Value::as_str))
            .find(|text| !text.trim().is_empty())
            .map(str::to_string))
    }

    pub fn fallback(&self) -> &'static str {
        self.fallback
    }
}

impl Default for ReplyDecoder {
    /// `response`, then `message`, then [`NOT_UNDERSTOOD_TEXT`].
    fn default() -> Self {
        Self::new(&["response", "message"], NOT_UNDERSTOOD_TEXT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoded(decoder: &ReplyDecoder, body: &str) -> Option<String> {
        decoder.decode(body).unwrap()
    }

    #[test]
    fn test_decode_prefers_response_field() {
        let decoder = ReplyDecoder::default();
        assert_eq!(
            decoded(&decoder, r#"{"response": "from response", "message": "from message"}"#)
                .as_deref(),
            Some("from response")
        );
    }

    #[test]
    fn test_decode_falls_back_to_message_field() {
        let decoder = ReplyDecoder::default();
        assert_eq!(
            decoded(&decoder, r#"{"message": "only message"}"#).as_deref(),
            Some("only message")
        );
        assert_eq!(
            decoded(&decoder, r#"{"response": "", "message": "blank response"}"#).as_deref(),
            Some("blank response")
        );
    }

    #[test]
    fn test_decode_keeps_text_verbatim() {
        let decoder = ReplyDecoder::default();
        assert_eq!(
            decoded(&decoder, r#"{"response": "  X  "}"#).as_deref(),
            Some("  X  ")
        );
    }

    #[test]
    fn test_decode_reports_unusable_bodies_as_none() {
        let decoder = ReplyDecoder::default();
        for body in [
            "{}",
            r#"{"response": "   "}"#,
            r#"{"response": 42, "message": null}"#,
            r#"{"id": "1", "createdAt": "2024-12-06"}"#,
            "[]",
            r#""plain string""#,
        ] {
            assert_eq!(decoded(&decoder, body), None, "{body}");
        }
        assert_eq!(decoder.fallback(), NOT_UNDERSTOOD_TEXT);
    }

    #[test]
    fn test_decode_rejects_invalid_and_null_bodies() {
        let decoder = ReplyDecoder::default();
        assert!(matches!(
            decoder.decode("<html>oops</html>"),
            Err(ReplyDecodeError::InvalidJson(_))
        ));
        assert!(matches!(
            decoder.decode(""),
            Err(ReplyDecodeError::InvalidJson(_))
        ));
        assert!(matches!(
            decoder.decode("null"),
            Err(ReplyDecodeError::NullBody)
        ));
    }

    #[test]
    fn test_custom_preference_order() {
        let decoder = ReplyDecoder::new(&["answer"], "nothing");
        assert_eq!(
            decoded(&decoder, r#"{"answer": "yes"}"#).as_deref(),
            Some("yes")
        );
        assert_eq!(decoded(&decoder, r#"{"response": "no"}"#), None);
        assert_eq!(decoder.fallback(), "nothing");
    }
}
