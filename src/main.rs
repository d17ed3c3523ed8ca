use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::Parser;
use log::debug;

use crate::shell::{LineSource, Shell};
use crate::utils::config::Config;
use crate::utils::log::init_logger;

mod shell;
mod utils;

/// pipesh - run command lines with pipes, && / ||, ; / & and redirections
#[derive(Parser, Debug)]
#[command(name = "pipesh", version, about)]
struct Args {
    /// Do not print prompts or greetings
    #[arg(short, long)]
    quiet: bool,

    /// Read command lines from this file instead of the terminal
    script: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = Config::new()?;
    init_logger(&config)?;
    debug!("配置加载成功 {}", config.config_dir.display());

    let input = match &args.script {
        Some(path) => LineSource::script(path)?,
        None if io::stdin().is_terminal() => LineSource::interactive(&config)?,
        None => LineSource::stdin(),
    };

    let mut shell = Shell::new(&config, input, args.quiet);
    shell.run()
}
