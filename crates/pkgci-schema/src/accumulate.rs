use crate::types::ArrayField;

/// Collects the body of a parenthesized array across physical lines.
///
/// Fragments are joined with a single space. On [`close`](Self::close) the
/// buffer is cut at its first `)` and split into words; the buffer is then
/// reset so the next array starts empty.
#[derive(Debug, Default)]
pub struct ArrayAccumulator {
    target: Option<ArrayField>,
    buffer: String,
}

impl ArrayAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new array. `None` means the identifier is not tracked and the
    /// body is consumed without being stored.
    pub fn open(&mut self, target: Option<ArrayField>) {
        self.target = target;
        self.buffer.clear();
    }

    pub fn feed(&mut self, fragment: &str) {
        if !self.buffer.is_empty() {
            self.buffer.push(' ');
        }
        self.buffer.push_str(fragment);
    }

    pub fn target(&self) -> Option<ArrayField> {
        self.target
    }

    /// Finish the current array, returning its target and tokens.
    pub fn close(&mut self) -> (Option<ArrayField>, Vec<String>) {
        let body = match self.buffer.find(')') {
            Some(pos) => &self.buffer[..pos],
            None => self.buffer.as_str(),
        };
        let tokens = tokenize(body);
        self.buffer.clear();
        (self.target.take(), tokens)
    }
}

/// Split an array body into words, dropping surrounding quotes.
///
/// Quoting is not interpreted: `'foo bar'` yields `foo` and `bar`.
pub fn tokenize(body: &str) -> Vec<String> {
    body.split_whitespace()
        .map(|word| word.trim_matches(|c: char| c == '\'' || c == '"' || c.is_whitespace()))
        .filter(|word| !word.is_empty())
        .map(str::to_owned)
        .collect()
}
