//! Splitting command lines into arguments.
//!
//! The grammar is deliberately tiny: words are separated by runs of the space
//! character and nothing else. There is no quoting, escaping or expansion.

use crate::command::SpawnError;
use log::debug;
use std::ffi::CString;

const DELIMITER: char = ' ';

/// Split `line` into at most `max_tokens` space-delimited words.
///
/// Consecutive spaces collapse, so no empty tokens are produced. Words beyond
/// `max_tokens` are dropped without error. A word consisting of a lone space is
/// turned into an empty string so it can never reach a spawned program.
pub fn tokenize(line: &str, max_tokens: usize) -> Vec<String> {
    words(line)
        .take(max_tokens)
        .map(|word| {
            if word == " " {
                String::new()
            } else {
                word.to_owned()
            }
        })
        .collect()
}

fn words(line: &str) -> impl Iterator<Item = &str> {
    line.split(DELIMITER).filter(|word| !word.is_empty())
}

/// Reusable, sentinel-terminated argument buffer.
///
/// Holds `capacity() + 1` slots. The first [`len`](ArgVector::len) slots carry
/// the command name and its arguments, and the slot right after them is always
/// `None`. [`clear`](ArgVector::clear) resets every slot, so a short command never
/// sees leftovers from a longer one.
#[derive(Debug, Clone)]
pub struct ArgVector {
    slots: Vec<Option<String>>,
    len: usize,
}

impl ArgVector {
    /// Create an empty vector that accepts up to `max_args` arguments.
    pub fn with_capacity(max_args: usize) -> Self {
        Self {
            slots: vec![None; max_args + 1],
            len: 0,
        }
    }

    /// Maximum number of arguments, not counting the sentinel.
    pub fn capacity(&self) -> usize {
        self.slots.len() - 1
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Replace the contents with the words of `line` and return how many were stored.
    pub fn fill(&mut self, line: &str) -> usize {
        self.clear();
        let capacity = self.capacity();
        for (slot, token) in self.slots.iter_mut().zip(tokenize(line, capacity)) {
            *slot = Some(token);
            self.len += 1;
        }
        if self.len == capacity {
            let dropped = words(line).skip(capacity).count();
            if dropped > 0 {
                debug!("dropped {} argument(s) beyond the limit of {}", dropped, capacity);
            }
        }
        debug_assert!(self.slots[self.len].is_none());
        self.len
    }

    /// Reset every slot to `None`.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.len = 0;
    }

    /// The command name, if any.
    pub fn program(&self) -> Option<&str> {
        self.args().next()
    }

    /// Live arguments in order, command name first.
    pub fn args(&self) -> impl Iterator<Item = &str> {
        self.slots[..self.len].iter().flatten().map(String::as_str)
    }

    /// All slots including the sentinel and the unused tail.
    pub fn slots(&self) -> &[Option<String>] {
        &self.slots
    }

    /// Convert the live arguments into C strings for `execvp`.
    pub fn to_c_strings(&self) -> Result<Vec<CString>, SpawnError> {
        if self.is_empty() {
            return Err(SpawnError::NoCommand);
        }
        self.args()
            .map(|arg| CString::new(arg).map_err(|_| SpawnError::InvalidArgument(arg.to_owned())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(line: &str, max: usize) -> Vec<String> {
        tokenize(line, max)
    }

    #[test]
    fn test_tokenize_keeps_order() {
        assert_eq!(toks("ls -l /tmp", 32), vec!["ls", "-l", "/tmp"]);
    }

    #[test]
    fn test_tokenize_collapses_space_runs() {
        assert_eq!(toks("  echo    a  b ", 32), vec!["echo", "a", "b"]);
    }

    #[test]
    fn test_tokenize_empty_and_blank_lines() {
        assert!(toks("", 32).is_empty());
        assert!(toks("     ", 32).is_empty());
    }

    #[test]
    fn test_tokenize_only_splits_on_spaces() {
        assert_eq!(toks("printf a\tb", 32), vec!["printf", "a\tb"]);
        assert_eq!(toks("echo 'a b'", 32), vec!["echo", "'a", "b'"]);
    }

    #[test]
    fn test_tokenize_caps_token_count() {
        let line = (0..50).map(|i| i.to_string()).collect::<Vec<_>>().join(" ");
        let tokens = toks(&line, 32);
        assert_eq!(tokens.len(), 32);
        assert_eq!(tokens.first().map(String::as_str), Some("0"));
        assert_eq!(tokens.last().map(String::as_str), Some("31"));
    }

    #[test]
    fn test_tokenize_never_yields_lone_space() {
        for line in [" ", "a  b", "   x   ", "a \u{a0} b"] {
            assert!(toks(line, 32).iter().all(|t| t != " "), "line {line:?}");
        }
    }

    #[test]
    fn test_arg_vector_is_sentinel_terminated() {
        let mut argv = ArgVector::with_capacity(4);
        assert_eq!(argv.fill("echo hi"), 2);
        assert_eq!(argv.slots().len(), 5);
        assert_eq!(argv.slots()[2], None);
        assert_eq!(argv.program(), Some("echo"));
    }

    #[test]
    fn test_arg_vector_full_still_has_sentinel() {
        let mut argv = ArgVector::with_capacity(3);
        assert_eq!(argv.fill("a b c d e"), 3);
        assert_eq!(argv.args().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(argv.slots()[3], None);
    }

    #[test]
    fn test_arg_vector_no_stale_tokens_after_shorter_command() {
        let mut argv = ArgVector::with_capacity(8);
        argv.fill("one two three four five");
        argv.clear();
        assert!(argv.slots().iter().all(Option::is_none));

        argv.fill("ls");
        assert_eq!(argv.len(), 1);
        assert!(argv.slots()[1..].iter().all(Option::is_none));
    }

    #[test]
    fn test_arg_vector_fill_resets_previous_contents() {
        let mut argv = ArgVector::with_capacity(8);
        argv.fill("one two three");
        argv.fill("four");
        assert_eq!(argv.args().collect::<Vec<_>>(), vec!["four"]);
        assert!(argv.slots()[1..].iter().all(Option::is_none));
    }

    #[test]
    fn test_to_c_strings() {
        let mut argv = ArgVector::with_capacity(4);
        assert!(matches!(argv.to_c_strings(), Err(SpawnError::NoCommand)));

        argv.fill("echo hi");
        let c_args = argv.to_c_strings().unwrap();
        assert_eq!(c_args[0].as_bytes(), b"echo");
        assert_eq!(c_args[1].as_bytes(), b"hi");

        argv.fill("echo a\0b");
        assert!(matches!(
            argv.to_c_strings(),
            Err(SpawnError::InvalidArgument(ref arg)) if arg == "a\0b"
        ));
    }
}
