//! A scan position over a mutable argument sequence.
//!
//! The cursor tracks three things:
//! - `index`: the argument being scanned
//! - `offset`: a byte offset inside that argument, always on a `char` boundary
//! - `write`: where the next kept (positional) argument goes
//!
//! Kept arguments are swapped down into `write`, so after a full pass the
//! positionals sit at the front in their original order and `finish()` cuts
//! off everything else. `write <= index` holds at all times.

pub(crate) struct Cursor<'v> {
    args: &'v mut Vec<String>,
    index: usize,
    offset: usize,
    write: usize,
}

impl<'v> Cursor<'v> {
    /// Start scanning at `start`; earlier slots are never touched.
    pub(crate) fn new(args: &'v mut Vec<String>, start: usize) -> Self {
        Self {
            args,
            index: start,
            offset: 0,
            write: start,
        }
    }

    pub(crate) fn is_exhausted(&self) -> bool {
        self.index >= self.args.len()
    }

    /// The argument under the cursor (empty once exhausted).
    pub(crate) fn current(&self) -> &str {
        self.args.get(self.index).map(String::as_str).unwrap_or("")
    }

    /// Peek at the character `delta` positions past the offset.
    pub(crate) fn char_at(&self, delta: usize) -> Option<char> {
        self.remainder().chars().nth(delta)
    }

    /// The current argument from the offset to its end.
    pub(crate) fn remainder(&self) -> &str {
        &self.current()[self.offset..]
    }

    pub(crate) fn offset(&self) -> usize {
        self.offset
    }

    /// Move forward `by` characters, rolling over to the next argument when
    /// the current one runs out.
    pub(crate) fn advance(&mut self, by: usize) {
        let rest = self.remainder();
        let step = rest
            .char_indices()
            .nth(by)
            .map_or(rest.len(), |(at, _)| at);
        self.offset += step;
        if self.offset >= self.current().len() {
            self.next_argument();
        }
    }

    /// Keep the current argument: move it down to the write slot.
    pub(crate) fn save_current(&mut self) {
        debug_assert!(!self.is_exhausted());
        if self.write < self.index {
            self.args.swap(self.write, self.index);
        }
        self.write += 1;
        self.next_argument();
    }

    /// Drop the current argument (it was consumed as an option or a value).
    pub(crate) fn pop(&mut self) {
        self.next_argument();
    }

    /// Cut the sequence down to the kept arguments.
    pub(crate) fn finish(self) {
        self.args.truncate(self.write);
    }

    fn next_argument(&mut self) {
        self.index += 1;
        self.offset = 0;
    }
}
