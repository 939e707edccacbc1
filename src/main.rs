use std::path::PathBuf;
use std::process;

use rtv::app::{Options, Target};
use tracing_subscriber::EnvFilter;

const HELP: &str = "rtv - Browse Reddit from the terminal.

Usage: rtv [OPTIONS]

  -s, --subreddit NAME   Print a subreddit listing (default: front)
  -l, --link URL         Print a submission and its comments
      --subscriptions    Print your subscribed subreddits
  -q, --query TEXT       Search instead of listing
  -o, --order ORDER      Sort order for the listing or comments
  -n, --count N          Number of records to print (default: 10)
  -w, --width COLS       Wrap to COLS columns instead of the terminal width
  -c, --config PATH      Read configuration from PATH
      --version, -V      Show version and exit
      --help,    -h      Show this help message

Set RTV_LOG (e.g. RTV_LOG=debug) to enable logging on stderr.";

enum Command {
    Exit,
    Run(Options),
}

fn main() {
    init_tracing();

    let options = match parse_args(std::env::args().skip(1)) {
        Ok(Command::Exit) => return,
        Ok(Command::Run(options)) => options,
        Err(err) => {
            eprintln!("error: {err}\n\nRun `rtv --help` for usage.");
            process::exit(2);
        }
    };

    if let Err(err) = rtv::run(options) {
        eprintln!("error: {err:?}");
        process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("RTV_LOG").unwrap_or_else(|_| EnvFilter::new("off"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Command, String> {
    let mut options = Options::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => {
                println!("rtv {}", rtv::VERSION);
                return Ok(Command::Exit);
            }
            "--help" | "-h" => {
                println!("{HELP}");
                return Ok(Command::Exit);
            }
            "--subreddit" | "-s" => {
                options.target = Target::Subreddit(value(&arg, args.next())?);
            }
            "--link" | "-l" => {
                options.target = Target::Submission(value(&arg, args.next())?);
            }
            "--subscriptions" => options.target = Target::Subscriptions,
            "--query" | "-q" => options.query = Some(value(&arg, args.next())?),
            "--order" | "-o" => options.order = Some(value(&arg, args.next())?),
            "--count" | "-n" => options.count = number(&arg, args.next())?,
            "--width" | "-w" => options.width = Some(number(&arg, args.next())?),
            "--config" | "-c" => {
                options.config_file = Some(PathBuf::from(value(&arg, args.next())?));
            }
            other => return Err(format!("unexpected argument {other:?}")),
        }
    }
    Ok(Command::Run(options))
}

fn value(flag: &str, next: Option<String>) -> Result<String, String> {
    next.ok_or_else(|| format!("{flag} requires a value"))
}

fn number(flag: &str, next: Option<String>) -> Result<usize, String> {
    let raw = value(flag, next)?;
    raw.parse()
        .map_err(|_| format!("{flag} expects a number, got {raw:?}"))
}
