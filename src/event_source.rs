use anyhow::{Context, Result};
use std::io::BufRead;

use crate::protocol::{EventKind, FIELD_DELIMITER};

/// Trait for abstracting native event message sources to enable testing
pub trait MessageSource {
    /// Read the next message, `None` once the stream is exhausted
    fn next_message(&mut self) -> Result<Option<String>>;
}

/// Messages read one per line, e.g. from a captured native log or stdin
pub struct LineMessageSource<R: BufRead> {
    reader: R,
    line_number: usize,
}

impl<R: BufRead> LineMessageSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
        }
    }
}

impl<R: BufRead> MessageSource for LineMessageSource<R> {
    fn next_message(&mut self) -> Result<Option<String>> {
        loop {
            let mut line = String::new();
            let read = self
                .reader
                .read_line(&mut line)
                .with_context(|| format!("reading message line {}", self.line_number + 1))?;
            if read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let message = line.trim_end_matches(['\r', '\n']);
            // blank lines separate bursts in captured logs
            if !message.is_empty() {
                return Ok(Some(message.to_string()));
            }
        }
    }
}

/// Simulated message source for testing
pub struct SimulatedMessageSource {
    pub(crate) messages: Vec<String>,
    current_index: usize,
}

impl SimulatedMessageSource {
    pub fn new(messages: Vec<String>) -> Self {
        Self {
            messages,
            current_index: 0,
        }
    }

    /// Helper method to build a message from its kind and fields
    pub fn message(kind: EventKind, fields: &[&str]) -> String {
        let mut message = kind.as_str().to_string();
        for field in fields {
            message.push(FIELD_DELIMITER);
            message.push_str(field);
        }
        message
    }

    /// Helper method to create a loadComplete message
    pub fn load_complete(page_count: u32, width: u32, height: u32) -> String {
        format!("loadComplete|{page_count}|{width}|{height}|")
    }

    /// Helper method to create a pageChanged message
    pub fn page_changed(page: u32, page_count: u32) -> String {
        format!("pageChanged|{page}|{page_count}")
    }
}

impl MessageSource for SimulatedMessageSource {
    fn next_message(&mut self) -> Result<Option<String>> {
        let message = self.messages.get(self.current_index).cloned();
        if message.is_some() {
            self.current_index += 1;
        }
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_message_source() {
        let messages = vec![
            SimulatedMessageSource::load_complete(12, 300, 400),
            SimulatedMessageSource::page_changed(2, 12),
            SimulatedMessageSource::message(EventKind::LinkPressed, &["https://a.b/c"]),
        ];

        let mut source = SimulatedMessageSource::new(messages);

        assert_eq!(
            source.next_message().unwrap().as_deref(),
            Some("loadComplete|12|300|400|")
        );
        assert_eq!(
            source.next_message().unwrap().as_deref(),
            Some("pageChanged|2|12")
        );
        assert_eq!(
            source.next_message().unwrap().as_deref(),
            Some("linkPressed|https://a.b/c")
        );

        // No more messages
        assert_eq!(source.next_message().unwrap(), None);
    }

    #[test]
    fn test_line_message_source_skips_blank_lines() {
        let input = "scaleChanged|1.5\r\n\npageChanged|1|3\n";
        let mut source = LineMessageSource::new(input.as_bytes());

        assert_eq!(
            source.next_message().unwrap().as_deref(),
            Some("scaleChanged|1.5")
        );
        assert_eq!(
            source.next_message().unwrap().as_deref(),
            Some("pageChanged|1|3")
        );
        assert_eq!(source.next_message().unwrap(), None);
    }
}
