//! Native event message protocol
//!
//! The native surface emits one message per event: fields joined by `|`,
//! the first field naming the event kind. The fifth field (index 4) is a
//! trailing payload that may itself contain the delimiter, so everything
//! from index 4 onward belongs to it.

use log::{debug, trace};
use serde::Serialize;
use serde_json::Value;

use crate::callbacks::ViewerCallbacks;
use crate::error::ViewerError;

pub const FIELD_DELIMITER: char = '|';

/// Index of the trailing payload field
pub const PAYLOAD_FIELD: usize = 4;

/// Page dimensions reported on load
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

/// Event kinds understood by the decoder
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    LoadComplete,
    PageChanged,
    Error,
    PageSingleTap,
    ScaleChanged,
    LinkPressed,
}

impl EventKind {
    /// Exact, case-sensitive match on the wire tag
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "loadComplete" => Some(Self::LoadComplete),
            "pageChanged" => Some(Self::PageChanged),
            "error" => Some(Self::Error),
            "pageSingleTap" => Some(Self::PageSingleTap),
            "scaleChanged" => Some(Self::ScaleChanged),
            "linkPressed" => Some(Self::LinkPressed),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LoadComplete => "loadComplete",
            Self::PageChanged => "pageChanged",
            Self::Error => "error",
            Self::PageSingleTap => "pageSingleTap",
            Self::ScaleChanged => "scaleChanged",
            Self::LinkPressed => "linkPressed",
        }
    }
}

/// A decoded native event
#[derive(Clone, Debug, PartialEq)]
pub enum ParsedEvent {
    LoadComplete {
        page_count: f64,
        size: PageSize,
        extra: Option<Value>,
    },
    PageChanged {
        page: f64,
        page_count: f64,
    },
    Error {
        message: String,
    },
    PageSingleTap {
        page: f64,
        x: f64,
        y: f64,
    },
    ScaleChanged {
        scale: f64,
    },
    LinkPressed {
        url: String,
    },
    /// Unrecognized kind; no callback fires
    Unknown {
        kind: String,
    },
}

impl ParsedEvent {
    #[must_use]
    pub fn kind(&self) -> Option<EventKind> {
        match self {
            Self::LoadComplete { .. } => Some(EventKind::LoadComplete),
            Self::PageChanged { .. } => Some(EventKind::PageChanged),
            Self::Error { .. } => Some(EventKind::Error),
            Self::PageSingleTap { .. } => Some(EventKind::PageSingleTap),
            Self::ScaleChanged { .. } => Some(EventKind::ScaleChanged),
            Self::LinkPressed { .. } => Some(EventKind::LinkPressed),
            Self::Unknown { .. } => None,
        }
    }
}

/// Split a raw message into at most five fields.
///
/// Equivalent to splitting on every delimiter and re-joining fields 4.. with
/// the delimiter whenever there are more than five.
#[must_use]
pub fn split_fields(raw: &str) -> Vec<&str> {
    raw.splitn(PAYLOAD_FIELD + 1, FIELD_DELIMITER).collect()
}

/// Convert a wire field to a number.
///
/// Absent fields are `NaN`, blank fields are `0`, and anything that is not a
/// plain decimal literal is `NaN`.
#[must_use]
pub fn parse_number(field: Option<&str>) -> f64 {
    let Some(text) = field.map(str::trim) else {
        return f64::NAN;
    };
    if text.is_empty() {
        return 0.0;
    }
    let decimal = text
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
    if !decimal {
        return f64::NAN;
    }
    text.parse().unwrap_or(f64::NAN)
}

/// Decode one native message.
///
/// Fails only when a `loadComplete` payload is present but is not valid JSON.
pub fn decode(raw: &str) -> Result<ParsedEvent, ViewerError> {
    let fields = split_fields(raw);
    let field = |idx: usize| fields.get(idx).copied();
    let number = |idx: usize| parse_number(field(idx));
    let tag = field(0).unwrap_or_default();

    let Some(kind) = EventKind::from_tag(tag) else {
        return Ok(ParsedEvent::Unknown {
            kind: tag.to_string(),
        });
    };

    let event = match kind {
        EventKind::LoadComplete => {
            let extra = match field(PAYLOAD_FIELD) {
                Some(payload) if !payload.is_empty() => {
                    Some(serde_json::from_str::<Value>(payload)?)
                }
                _ => None,
            };
            ParsedEvent::LoadComplete {
                page_count: number(1),
                size: PageSize {
                    width: number(2),
                    height: number(3),
                },
                extra,
            }
        }
        EventKind::PageChanged => ParsedEvent::PageChanged {
            page: number(1),
            page_count: number(2),
        },
        EventKind::Error => ParsedEvent::Error {
            message: field(1).unwrap_or_default().to_string(),
        },
        EventKind::PageSingleTap => ParsedEvent::PageSingleTap {
            page: number(1),
            x: number(2),
            y: number(3),
        },
        EventKind::ScaleChanged => ParsedEvent::ScaleChanged { scale: number(1) },
        EventKind::LinkPressed => ParsedEvent::LinkPressed {
            url: field(1).unwrap_or_default().to_string(),
        },
    };

    trace!("Decoded {} message", kind.as_str());
    Ok(event)
}

/// Forward a decoded event to the matching host callback.
///
/// `path` is the currently published document path, handed to
/// `on_load_complete`. Returns whether a callback fired.
pub fn dispatch(event: ParsedEvent, path: &str, callbacks: &mut dyn ViewerCallbacks) -> bool {
    match event {
        ParsedEvent::LoadComplete {
            page_count,
            size,
            extra,
        } => callbacks.on_load_complete(page_count, path, size, extra),
        ParsedEvent::PageChanged { page, page_count } => {
            callbacks.on_page_changed(page, page_count)
        }
        ParsedEvent::Error { message } => callbacks.on_error(&ViewerError::native(message)),
        ParsedEvent::PageSingleTap { page, x, y } => callbacks.on_page_single_tap(page, x, y),
        ParsedEvent::ScaleChanged { scale } => callbacks.on_scale_changed(scale),
        ParsedEvent::LinkPressed { url } => callbacks.on_press_link(&url),
        ParsedEvent::Unknown { kind } => {
            debug!("Ignoring native message of unknown kind {kind:?}");
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn load_complete_without_payload() {
        let event = decode("loadComplete|12|300|400|").unwrap();
        assert_eq!(
            event,
            ParsedEvent::LoadComplete {
                page_count: 12.0,
                size: PageSize {
                    width: 300.0,
                    height: 400.0
                },
                extra: None,
            }
        );
    }

    #[test]
    fn load_complete_payload_keeps_embedded_delimiters() {
        let event = decode(r#"loadComplete|3|595|842|{"title":"a|b","toc":[]}"#).unwrap();
        let ParsedEvent::LoadComplete { extra, .. } = event else {
            panic!("expected loadComplete, got {event:?}");
        };
        assert_eq!(extra, Some(json!({"title": "a|b", "toc": []})));
    }

    #[test]
    fn malformed_payload_is_a_protocol_error() {
        let result = decode("loadComplete|3|595|842|{not json");
        assert!(matches!(result, Err(ViewerError::ProtocolParse(_))));
    }

    #[test]
    fn link_with_pipes_below_rejoin_threshold_is_split() {
        // four fields: no re-join, url is only field 1
        let event = decode("linkPressed|https://example.com/a|b|c").unwrap();
        assert_eq!(
            event,
            ParsedEvent::LinkPressed {
                url: "https://example.com/a".to_string()
            }
        );
    }

    #[test]
    fn rejoin_applies_only_past_five_fields() {
        assert_eq!(split_fields("a|b|c|d|e"), vec!["a", "b", "c", "d", "e"]);
        assert_eq!(split_fields("a|b|c|d|e|f|g"), vec!["a", "b", "c", "d", "e|f|g"]);
        assert_eq!(split_fields("a|b|c|d||"), vec!["a", "b", "c", "d", "|"]);
        assert_eq!(split_fields(""), vec![""]);
    }

    #[test]
    fn scale_changed_parses_decimal() {
        assert_eq!(
            decode("scaleChanged|1.5").unwrap(),
            ParsedEvent::ScaleChanged { scale: 1.5 }
        );
    }

    #[test]
    fn page_events() {
        assert_eq!(
            decode("pageChanged|4|12").unwrap(),
            ParsedEvent::PageChanged {
                page: 4.0,
                page_count: 12.0
            }
        );
        assert_eq!(
            decode("pageSingleTap|2|10.5|20").unwrap(),
            ParsedEvent::PageSingleTap {
                page: 2.0,
                x: 10.5,
                y: 20.0
            }
        );
    }

    #[test]
    fn error_message_is_taken_verbatim() {
        assert_eq!(
            decode("error|cannot open /tmp/a.pdf").unwrap(),
            ParsedEvent::Error {
                message: "cannot open /tmp/a.pdf".to_string()
            }
        );
        assert_eq!(
            decode("error").unwrap(),
            ParsedEvent::Error {
                message: String::new()
            }
        );
    }

    #[test]
    fn unknown_kinds_are_not_dispatched() {
        let event = decode("bogusKind|1|2").unwrap();
        assert_eq!(
            event,
            ParsedEvent::Unknown {
                kind: "bogusKind".to_string()
            }
        );
        assert!(event.kind().is_none());

        struct Panicking;
        impl ViewerCallbacks for Panicking {
            fn on_error(&mut self, _error: &ViewerError) {
                panic!("no callback expected");
            }
        }
        assert!(!dispatch(event, "/tmp/a.pdf", &mut Panicking));
    }

    #[test]
    fn tags_match_exactly() {
        assert!(matches!(
            decode("LoadComplete|1|2|3").unwrap(),
            ParsedEvent::Unknown { .. }
        ));
        assert!(matches!(
            decode(" error|x").unwrap(),
            ParsedEvent::Unknown { .. }
        ));
    }

    #[test]
    fn number_conversion() {
        assert_eq!(parse_number(Some("42")), 42.0);
        assert_eq!(parse_number(Some(" 7 ")), 7.0);
        assert_eq!(parse_number(Some("-2.5e1")), -25.0);
        assert_eq!(parse_number(Some("")), 0.0);
        assert!(parse_number(Some("abc")).is_nan());
        assert!(parse_number(Some("inf")).is_nan());
        assert!(parse_number(None).is_nan());
    }

    #[test]
    fn missing_numeric_fields_are_nan() {
        let ParsedEvent::PageChanged { page, page_count } = decode("pageChanged|3").unwrap() else {
            panic!("expected pageChanged");
        };
        assert_eq!(page, 3.0);
        assert!(page_count.is_nan());
    }
}
