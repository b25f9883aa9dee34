//! Diagnostics produced by the client, kept apart from how they are shown.
//!
//! Operations append to a `MessageLog` while they run and drain it into the
//! caller's `Printer` before returning, so output from one operation always
//! arrives in the order it was produced.

use crate::printer::Printer;

/// Severity of a [`Message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Print,
    Warning,
    Debug,
}

/// A classified line of output from the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    kind: MessageKind,
    text: String,
}

impl Message {
    pub fn new(kind: MessageKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_print(&self) -> bool {
        self.kind == MessageKind::Print
    }

    pub fn is_warning(&self) -> bool {
        self.kind == MessageKind::Warning
    }

    pub fn is_debug(&self) -> bool {
        self.kind == MessageKind::Debug
    }

    /// Send to the sink matching this message's kind. `Print` goes to `info`.
    pub fn deliver(&self, printer: &dyn Printer) {
        match self.kind {
            MessageKind::Print => printer.info(&self.text),
            MessageKind::Warning => printer.warn(&self.text),
            MessageKind::Debug => printer.debug(&self.text),
        }
    }

    /// Like `deliver`, but a `Print` message goes to `always` so verbosity
    /// settings cannot hide it.
    pub fn deliver_always(&self, printer: &dyn Printer) {
        match self.kind {
            MessageKind::Print => printer.always(&self.text),
            _ => self.deliver(printer),
        }
    }
}

/// Append-only, ordered collection of messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageLog {
    messages: Vec<Message>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn print(&mut self, text: impl Into<String>) {
        self.push(Message::new(MessageKind::Print, text));
    }

    pub fn warn(&mut self, text: impl Into<String>) {
        self.push(Message::new(MessageKind::Warning, text));
    }

    pub fn debug(&mut self, text: impl Into<String>) {
        self.push(Message::new(MessageKind::Debug, text));
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Deliver every message in emission order and empty the log.
    pub fn drain_to(&mut self, printer: &dyn Printer) {
        for message in self.messages.drain(..) {
            message.deliver(printer);
        }
    }
}

impl IntoIterator for MessageLog {
    type Item = Message;
    type IntoIter = std::vec::IntoIter<Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.into_iter()
    }
}
