use anyhow::{Context, Result};
use log::{debug, warn};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{BufRead, Write};

/// Source of command lines for the shell loop.
pub trait LineSource {
    /// Show `prompt` and read one line without its terminator.
    ///
    /// Returns `Ok(None)` at end of input. Sources that draw the prompt themselves
    /// ignore `out`; the others write the prompt there.
    fn read_line(&mut self, prompt: &str, out: &mut dyn Write) -> Result<Option<String>>;
}

/// Interactive source backed by a rustyline editor with in-memory history.
pub struct EditorSource {
    editor: DefaultEditor,
}

impl EditorSource {
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new().context("failed to initialize line editor")?;
        Ok(Self { editor })
    }
}

impl LineSource for EditorSource {
    fn read_line(&mut self, prompt: &str, out: &mut dyn Write) -> Result<Option<String>> {
        out.flush()?;
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim_matches(' ').is_empty() {
                    self.editor.add_history_entry(line.as_str())?;
                }
                Ok(Some(line))
            }
            // Ctrl-C at the prompt discards the line instead of ending the session.
            Err(ReadlineError::Interrupted) => {
                debug!("prompt interrupted");
                Ok(Some(String::new()))
            }
            Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(err).context("failed to read command line"),
        }
    }
}

/// Plain source for piped input, scripts and tests.
pub struct ReaderSource<R> {
    reader: R,
}

impl<R: BufRead> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for ReaderSource<R> {
    fn read_line(&mut self, prompt: &str, out: &mut dyn Write) -> Result<Option<String>> {
        write!(out, "{}", prompt)?;
        out.flush()?;

        let mut bytes = Vec::new();
        let read = self
            .reader
            .read_until(b'\n', &mut bytes)
            .context("failed to read command line")?;
        if read == 0 {
            return Ok(None);
        }
        if bytes.ends_with(b"\n") {
            bytes.pop();
            if bytes.ends_with(b"\r") {
                bytes.pop();
            }
        }
        match String::from_utf8(bytes) {
            Ok(line) => Ok(Some(line)),
            // A garbled line is dropped so the shell simply prompts again.
            Err(err) => {
                warn!("ignoring input line that is not valid UTF-8: {}", err.utf8_error());
                Ok(Some(String::new()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_reader_source_strips_terminators_and_prompts() {
        let mut source = ReaderSource::new(Cursor::new("echo hi\nls -l\r\n\nlast"));
        let mut out = Vec::new();

        let mut lines = Vec::new();
        while let Some(line) = source.read_line("$ ", &mut out).unwrap() {
            lines.push(line);
        }

        assert_eq!(lines, vec!["echo hi", "ls -l", "", "last"]);
        assert_eq!(String::from_utf8(out).unwrap(), "$ ".repeat(5));
    }

    #[test]
    fn test_reader_source_turns_invalid_utf8_into_blank_line() {
        let mut source = ReaderSource::new(Cursor::new(b"echo \xff\ntrue\n".to_vec()));
        let mut out = Vec::new();
        assert_eq!(source.read_line("$ ", &mut out).unwrap(), Some(String::new()));
        assert_eq!(source.read_line("$ ", &mut out).unwrap(), Some("true".to_string()));
        assert_eq!(source.read_line("$ ", &mut out).unwrap(), None);
    }

    #[test]
    fn test_reader_source_eof_on_empty_input() {
        let mut source = ReaderSource::new(Cursor::new(""));
        let mut out = Vec::new();
        assert_eq!(source.read_line("> ", &mut out).unwrap(), None);
    }
}
