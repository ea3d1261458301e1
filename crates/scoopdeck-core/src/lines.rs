//! Line splitting for child process output.

/// Buffers output chunks and releases them as lines.
///
/// The whole pending buffer is flushed as soon as it contains any `\r` or
/// `\n`: every `\r?\n`-separated segment is emitted, including empty ones and
/// a trailing segment that has no terminator of its own. Without a
/// terminator nothing is emitted and the chunk waits for the next one.
#[derive(Debug, Default)]
pub struct LineSplitter {
    pending: String,
}

impl LineSplitter {
    /// Create a new splitter with an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return the lines it released.
    pub fn feed(&mut self, chunk: &str) -> Vec<String> {
        self.pending.push_str(chunk);

        if !self.pending.contains(['\r', '\n']) {
            return Vec::new();
        }

        let buffer = std::mem::take(&mut self.pending);
        let mut lines: Vec<String> = buffer.split('\n').map(str::to_string).collect();

        // only a `\r` directly before `\n` belongs to the terminator
        let last = lines.len() - 1;
        for line in &mut lines[..last] {
            if line.ends_with('\r') {
                line.pop();
            }
        }
        lines
    }

    /// Text retained since the last flush.
    pub fn pending(&self) -> &str {
        &self.pending
    }

    /// Drop any retained text.
    pub fn reset(&mut self) {
        self.pending.clear();
    }
}
