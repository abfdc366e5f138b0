use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser as ClapParser;
use log::debug;
use simplelog::{Config as LogConfig, LevelFilter, SimpleLogger};

use brook::{Evaluator, Parser, Scanner};

#[derive(ClapParser)]
#[command(name = "brook", version = brook::VERSION, about = "The brook scripting language")]
struct Opt {
    /// Script file to run
    script: PathBuf,

    /// Print the token sequence as JSON instead of running
    #[arg(long)]
    dump_tokens: bool,

    /// Print the AST as JSON instead of running
    #[arg(long)]
    dump_ast: bool,

    /// Show debug output
    #[arg(short, long)]
    debug: bool,
}

fn init_logging(debug: bool) -> Result<()> {
    let filter = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Error
    };

    match SimpleLogger::init(filter, LogConfig::default()) {
        Ok(_) => Ok(()),
        Err(e) => bail!("Failed to init logger: {}", e),
    }
}

fn run(opts: &Opt) -> Result<()> {
    let source = fs::read_to_string(&opts.script)
        .with_context(|| format!("Failed to read {}", opts.script.display()))?;

    let tokens = Scanner::new(&source).scan_tokens()?;
    debug!("scanned {} tokens", tokens.len());
    if opts.dump_tokens {
        println!("{}", serde_json::to_string_pretty(&tokens)?);
        return Ok(());
    }

    let program = Parser::new(tokens).parse()?;
    debug!("parsed {} top-level statements", program.body.len());
    if opts.dump_ast {
        println!("{}", serde_json::to_string_pretty(&program)?);
        return Ok(());
    }

    let stdout = io::stdout();
    let mut sink = stdout.lock();
    let result = Evaluator::new(&mut sink).execute(&program)?;
    sink.flush()?;
    debug!("program finished with {}", result);

    Ok(())
}

fn main() -> Result<()> {
    let opts = Opt::parse();
    init_logging(opts.debug)?;
    run(&opts)
}
