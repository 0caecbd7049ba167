//! Accumulation buffer for multi-line MOTD replies.

/// Collects `RPL_MOTD` lines between `RPL_MOTDSTART` and `RPL_ENDOFMOTD`.
#[derive(Clone, Debug, Default)]
pub struct MotdBuffer {
    text: String,
}

impl MotdBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop anything collected so far.
    pub fn reset(&mut self) {
        self.text.clear();
    }

    /// Append one line's content, trimmed, followed by a newline.
    pub fn push_line(&mut self, content: &str) {
        self.text.push_str(content.trim());
        self.text.push('\n');
    }

    /// Append the closing line and take the whole MOTD, trimmed.
    ///
    /// The buffer is empty afterwards.
    pub fn finish(&mut self, last: &str) -> String {
        self.text.push_str(last);
        let motd = self.text.trim().to_string();
        self.text.clear();
        motd
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Text collected so far, untrimmed.
    pub fn as_str(&self) -> &str {
        &self.text
    }
}
