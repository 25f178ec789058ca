use anyhow::{Result, bail};
use argh::FromArgs;

/// Default number of arguments accepted per command, command name included.
pub const DEFAULT_MAX_ARGS: usize = 32;

/// Default number of characters kept from each input line.
pub const DEFAULT_LINE_LIMIT: usize = 1024;

/// What the shell does when the OS refuses to create a new process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpawnFailurePolicy {
    /// Report the failure and end the session with a non-zero status.
    #[default]
    Exit,
    /// Report the failure and read the next command.
    Continue,
}

#[derive(FromArgs, Debug)]
/// Run programs one at a time and report their CPU time and involuntary context switches.
pub struct Options {
    #[argh(option, default = "DEFAULT_MAX_ARGS")]
    /// maximum number of arguments per command, including the command name; extra words are ignored.
    pub max_args: usize,

    #[argh(option, default = "DEFAULT_LINE_LIMIT")]
    /// maximum number of characters read from one input line.
    pub line_limit: usize,

    #[argh(option, default = "String::from(\"$ \")")]
    /// prompt printed before each command.
    pub prompt: String,

    #[argh(option, default = "String::from(\"quit\")")]
    /// line that ends the session.
    pub quit_word: String,

    #[argh(switch)]
    /// keep reading commands when a new process cannot be created.
    pub keep_going: bool,

    #[argh(switch)]
    /// read plain lines from stdin even when it is a terminal.
    pub plain: bool,

    #[argh(switch, short = 'v')]
    /// log spawned processes and waits to stderr.
    pub verbose: bool,
}

/// Validated settings for one shell session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    pub max_args: usize,
    pub line_limit: usize,
    pub prompt: String,
    pub quit_word: String,
    pub on_spawn_failure: SpawnFailurePolicy,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            max_args: DEFAULT_MAX_ARGS,
            line_limit: DEFAULT_LINE_LIMIT,
            prompt: "$ ".to_string(),
            quit_word: "quit".to_string(),
            on_spawn_failure: SpawnFailurePolicy::Exit,
        }
    }
}

impl TryFrom<&Options> for ShellConfig {
    type Error = anyhow::Error;

    fn try_from(options: &Options) -> Result<Self> {
        if options.max_args == 0 {
            bail!("--max-args must be at least 1");
        }
        if options.line_limit == 0 {
            bail!("--line-limit must be at least 1");
        }
        if options.quit_word.is_empty() {
            bail!("--quit-word must not be empty");
        }
        if options.line_limit < options.quit_word.chars().count() {
            bail!(
                "--line-limit {} is too short to ever read the quit word {:?}",
                options.line_limit,
                options.quit_word
            );
        }
        Ok(Self {
            max_args: options.max_args,
            line_limit: options.line_limit,
            prompt: options.prompt.clone(),
            quit_word: options.quit_word.clone(),
            on_spawn_failure: if options.keep_going {
                SpawnFailurePolicy::Continue
            } else {
                SpawnFailurePolicy::Exit
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Options {
        Options::from_args(&["rusage_shell"], args).expect("valid options")
    }

    #[test]
    fn test_defaults_match_default_config() {
        let options = parse(&[]);
        assert!(!options.plain);
        assert!(!options.verbose);
        let config = ShellConfig::try_from(&options).unwrap();
        assert_eq!(config, ShellConfig::default());
    }

    #[test]
    fn test_overrides() {
        let options = parse(&[
            "--max-args",
            "4",
            "--line-limit",
            "80",
            "--prompt",
            "> ",
            "--quit-word",
            "exit",
            "--keep-going",
            "-v",
        ]);
        assert!(options.verbose);
        let config = ShellConfig::try_from(&options).unwrap();
        assert_eq!(config.max_args, 4);
        assert_eq!(config.line_limit, 80);
        assert_eq!(config.prompt, "> ");
        assert_eq!(config.quit_word, "exit");
        assert_eq!(config.on_spawn_failure, SpawnFailurePolicy::Continue);
    }

    #[test]
    fn test_rejects_zero_limits() {
        assert!(ShellConfig::try_from(&parse(&["--max-args", "0"])).is_err());
        assert!(ShellConfig::try_from(&parse(&["--line-limit", "0"])).is_err());
    }

    #[test]
    fn test_rejects_empty_quit_word() {
        assert!(ShellConfig::try_from(&parse(&["--quit-word", ""])).is_err());
    }

    #[test]
    fn test_line_limit_must_fit_quit_word() {
        assert!(ShellConfig::try_from(&parse(&["--line-limit", "3"])).is_err());
        let config = ShellConfig::try_from(&parse(&["--line-limit", "4"])).unwrap();
        assert_eq!(config.line_limit, 4);
        assert!(ShellConfig::try_from(&parse(&["--line-limit", "2", "--quit-word", "q"])).is_ok());
    }

    #[test]
    fn test_unknown_flag_is_early_exit() {
        assert!(Options::from_args(&["rusage_shell"], &["--bogus"]).is_err());
    }
}
