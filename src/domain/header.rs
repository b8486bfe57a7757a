//! Node header decoding: `<TAG><id>[<dir><ref>]<text>`.

use once_cell::sync::Lazy;
use regex::Regex;

static HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Z]{2})([0-9]+)(?:([<>])([0-9]+))?").expect("header pattern is valid")
});

/// Fields decoded from the body of an opening line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header<'a> {
    pub tag: &'a str,
    pub id: Option<u64>,
    pub reference: Option<u64>,
    pub forward: bool,
    /// Literal text following the header
    pub text: &'a str,
}

/// Split an opening line body into header fields and literal text.
///
/// A body without a well-formed header is all text. The direction marker
/// is only taken together with its reference digits; `IC1>` leaves `>` in
/// the text.
pub fn decode(body: &str) -> Header<'_> {
    let plain = Header {
        text: body,
        ..Header::default()
    };

    let Some(caps) = HEADER_RE.captures(body) else {
        return plain;
    };
    let (Some(whole), Some(tag), Some(id)) = (caps.get(0), caps.get(1), caps.get(2)) else {
        return plain;
    };
    let Ok(id) = id.as_str().parse::<u64>() else {
        return plain;
    };
    let reference = match caps.get(4).map(|m| m.as_str().parse::<u64>()) {
        None => None,
        Some(Ok(r)) => Some(r),
        Some(Err(_)) => return plain,
    };

    Header {
        tag: tag.as_str(),
        id: Some(id),
        reference,
        forward: caps.get(3).is_some_and(|m| m.as_str() == ">"),
        text: &body[whole.end()..],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_full_header_when_decoding_then_extracts_all_fields() {
        let h = decode("DC2>1when the rain stops,");
        assert_eq!(h.tag, "DC");
        assert_eq!(h.id, Some(2));
        assert_eq!(h.reference, Some(1));
        assert!(h.forward);
        assert_eq!(h.text, "when the rain stops,");
    }

    #[test]
    fn given_backward_marker_when_decoding_then_forward_stays_false() {
        let h = decode("PP4<3running");
        assert_eq!(h.reference, Some(3));
        assert!(!h.forward);
        assert_eq!(h.text, "running");
    }

    #[test]
    fn given_header_only_when_decoding_then_text_is_empty() {
        let h = decode("IC1");
        assert_eq!(h.tag, "IC");
        assert_eq!(h.id, Some(1));
        assert_eq!(h.text, "");
    }

    #[test]
    fn given_marker_without_digits_when_decoding_then_marker_stays_in_text() {
        let h = decode("IC1>gone");
        assert_eq!(h.id, Some(1));
        assert_eq!(h.reference, None);
        assert!(!h.forward);
        assert_eq!(h.text, ">gone");
    }

    #[test]
    fn given_malformed_header_when_decoding_then_body_is_text() {
        for body in ["Ic1 text", "IC text", "ICX1", " IC1x", "I1x"] {
            let h = decode(body);
            assert_eq!(h.tag, "", "{body}");
            assert_eq!(h.id, None);
            assert_eq!(h.text, body);
        }
    }

    #[test]
    fn given_overflowing_id_when_decoding_then_body_is_text() {
        let body = "IC99999999999999999999999 text";
        let h = decode(body);
        assert_eq!(h.tag, "");
        assert_eq!(h.text, body);
    }
}
