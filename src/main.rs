use anyhow::Result;
use rusage_shell::config::{Options, ShellConfig};
use rusage_shell::input::{EditorSource, LineSource, ReaderSource};
use rusage_shell::{ForkExecLauncher, Interpreter, UsageCollector, logging};
use std::io::IsTerminal;

fn run(options: &Options) -> Result<()> {
    let config = ShellConfig::try_from(options)?;
    let mut input: Box<dyn LineSource> = if options.plain || !std::io::stdin().is_terminal() {
        Box::new(ReaderSource::new(std::io::stdin().lock()))
    } else {
        Box::new(EditorSource::new()?)
    };

    let mut sh = Interpreter::new(config, ForkExecLauncher, UsageCollector);
    sh.repl(input.as_mut(), &mut std::io::stdout())
}

fn main() {
    let options: Options = argh::from_env();
    logging::init(options.verbose);

    if let Err(err) = run(&options) {
        log::error!("{:#}", err);
        std::process::exit(1);
    }
}
