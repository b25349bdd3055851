use crate::EncodeOptions;

/// Line-oriented output buffer with cached indentation strings.
pub(crate) struct Writer {
    buffer: String,
    pub(crate) options: EncodeOptions,
    indent_unit: String,
    indent_cache: Vec<String>,
}

impl Writer {
    pub fn new(options: EncodeOptions) -> Self {
        let indent_unit = " ".repeat(options.indent.get_spaces());
        Self {
            buffer: String::new(),
            options,
            indent_unit,
            indent_cache: vec![String::new()],
        }
    }

    pub fn finish(self) -> String {
        self.buffer
    }

    pub fn write_indent(&mut self, depth: usize) {
        if depth == 0 {
            return;
        }
        if depth >= self.indent_cache.len() {
            self.extend_indent_cache(depth);
        }
        self.buffer.push_str(&self.indent_cache[depth]);
    }

    /// `text` on its own line at `depth`.
    pub fn write_line(&mut self, depth: usize, text: &str) {
        self.write_indent(depth);
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }

    /// `tag text`, or the bare tag when `text` is empty.
    pub fn write_tagged_line(&mut self, depth: usize, tag: &str, text: &str) {
        self.write_indent(depth);
        self.buffer.push_str(tag);
        if !text.is_empty() {
            self.buffer.push(' ');
            self.buffer.push_str(text);
        }
        self.buffer.push('\n');
    }

    /// `key: text`, or `key:` when `text` is empty.
    pub fn write_key_line(&mut self, depth: usize, key: &str, text: &str) {
        self.write_indent(depth);
        self.buffer.push_str(key);
        self.buffer.push(':');
        if !text.is_empty() {
            self.buffer.push(' ');
            self.buffer.push_str(text);
        }
        self.buffer.push('\n');
    }

    fn extend_indent_cache(&mut self, depth: usize) {
        while self.indent_cache.len() <= depth {
            let next = match self.indent_cache.last() {
                Some(prev) => format!("{prev}{}", self.indent_unit),
                None => String::new(),
            };
            self.indent_cache.push(next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    fn test_indent_cache_grows_on_demand() {
        let mut writer = Writer::new(EncodeOptions::new().with_indent_by(3));
        writer.write_line(2, "x");
        writer.write_line(0, "y");
        writer.write_line(1, "z");
        assert_eq!(writer.finish(), "      x\ny\n   z\n");
    }

    #[rstest::rstest]
    fn test_tagged_lines() {
        let mut writer = Writer::new(EncodeOptions::default());
        writer.write_tagged_line(0, ">", "text");
        writer.write_tagged_line(1, "-", "");
        writer.write_key_line(1, "key", "value");
        writer.write_key_line(1, "empty", "");
        assert_eq!(writer.finish(), "> text\n  -\n  key: value\n  empty:\n");
    }
}
