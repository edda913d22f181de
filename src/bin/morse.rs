//! Command-line Morse code synthesizer.

use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use morsel::{CODE_TABLE, OutputTarget, Timing, ToneBuffer, render, sink};

/// Render text as audible Morse code.
#[derive(Parser, Debug)]
#[command(name = "morse", version, about)]
struct Args {
    /// Character speed in words per minute
    #[arg(short = 'c', long, default_value_t = 18)]
    char_wpm: u32,

    /// Overall speed in words per minute; at most the character speed
    #[arg(short = 'w', long = "wpm", default_value_t = 12)]
    total_wpm: u32,

    /// Tone frequency in hertz
    #[arg(short = 'f', long, default_value_t = 750)]
    freq: u32,

    /// Write a WAV file here instead of playing the default device
    #[arg(short = 'o', long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Rotate device writes through a fixed buffer pool instead of the
    /// blocking queue
    #[arg(long, conflicts_with = "output")]
    buffered: bool,

    /// Echo each text to standard output after rendering it
    #[arg(short, long)]
    echo: bool,

    /// Log timing and device details to standard error
    #[arg(short, long)]
    verbose: bool,

    /// Texts to render in order; with none given, standard input is rendered
    /// line by line as it arrives
    text: Vec<String>,
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "morse=debug,morsel=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    // Bad parameters must fail before a device is opened or a file created.
    Timing::validate_speeds(args.char_wpm, args.total_wpm)?;

    let target = match (&args.output, args.buffered) {
        (Some(path), _) => OutputTarget::File(path.clone()),
        (None, true) => OutputTarget::DoubleBuffered,
        (None, false) => OutputTarget::Blocking,
    };
    let mut out = sink::open(&target).context("cannot open output")?;
    let timing = Timing::configure(out.sample_rate(), args.char_wpm, args.total_wpm)?;
    let tones = ToneBuffer::build(args.freq, &timing)?;
    debug!("{} WPM ({} WPM chars)", args.total_wpm, args.char_wpm);

    if args.text.is_empty() {
        for line in io::stdin().lock().lines() {
            let line = line.context("cannot read standard input")?;
            render(&line, CODE_TABLE, &timing, &tones, out.as_mut())?;
            if args.echo {
                println!("{line}");
            }
        }
    } else {
        for text in &args.text {
            render(text, CODE_TABLE, &timing, &tones, out.as_mut())?;
            if args.echo {
                println!("{text}");
            }
        }
    }
    Ok(())
}
