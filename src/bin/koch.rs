//! Koch-method Morse code trainer.
//!
//! Each round plays a randomly generated drill through the `morse`
//! synthesizer in a child process while the user transcribes it, then scores
//! the transcription. Scoring at least 90 percent unlocks the next
//! character of the progression.

use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use morsel::trainer::{KOCH_LETTERS, WordGenerator, score_transcript};

/// Words played per drill, per word-per-minute of overall speed.
const DRILL_MINUTES: usize = 5;

/// Lead-in before the drill starts playing.
const LEAD_IN: Duration = Duration::from_secs(1);

/// Practice Morse code reception with the Koch method.
#[derive(Parser, Debug)]
#[command(name = "koch", version, about)]
struct Args {
    /// Character speed in words per minute
    #[arg(short = 'c', long, default_value_t = 20)]
    char_wpm: u32,

    /// Overall speed in words per minute; a faster overall speed raises the
    /// character speed to match
    #[arg(short = 'w', long = "wpm", default_value_t = 15)]
    total_wpm: u32,

    /// Synthesizer to spawn for playback (default: `morse` next to this
    /// executable)
    #[arg(long, value_name = "PATH")]
    morse_bin: Option<PathBuf>,

    /// Starting level: how many characters of the progression are unlocked
    #[arg(default_value_t = 2)]
    level: usize,
}

/// A drill playing in a child synthesizer. Dropping it stops playback and
/// reaps the child.
struct Playback {
    child: Child,
}

impl Playback {
    fn start(bin: &Path, char_wpm: u32, total_wpm: u32, text: &str) -> Result<Self> {
        let child = Command::new(bin)
            .arg("-c")
            .arg(char_wpm.to_string())
            .arg("-w")
            .arg(total_wpm.to_string())
            .arg(text)
            .spawn()
            .with_context(|| format!("cannot start synthesizer {}", bin.display()))?;
        debug!("playing through pid {}", child.id());
        Ok(Playback { child })
    }

    /// The exit status if the synthesizer already finished on its own,
    /// `None` if it was still playing (it gets stopped on drop).
    fn finish(mut self) -> Option<ExitStatus> {
        self.child.try_wait().ok().flatten()
    }
}

impl Drop for Playback {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn sibling_morse() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("cannot locate this executable")?;
    let dir = exe
        .parent()
        .context("this executable has no parent directory")?;
    Ok(dir.join("morse"))
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    // One speed knob may push past the other; raise the character speed
    // rather than reject, so "-w 25" alone still works.
    let char_wpm = args.char_wpm.max(args.total_wpm);
    let morse_bin = match args.morse_bin {
        Some(path) => path,
        None => sibling_morse()?,
    };
    let mut level = args.level.clamp(1, KOCH_LETTERS.len());

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        println!("Letters: {}", &KOCH_LETTERS[..level]);
        println!("(press Enter to start)");
        if lines.next().transpose()?.is_none() {
            break;
        }

        let drill = WordGenerator::new(level).drill(DRILL_MINUTES * args.total_wpm as usize);
        thread::sleep(LEAD_IN);
        let playback = Playback::start(&morse_bin, char_wpm, args.total_wpm, &drill)?;
        let started = Instant::now();
        let Some(answer) = lines.next().transpose()? else {
            break;
        };
        let elapsed = started.elapsed();
        let status = playback.finish();

        println!("{drill}");
        println!("{} seconds", elapsed.as_secs());
        if let Some(status) = status {
            if !status.success() {
                println!("synthesizer exited with {status}; no audio, round not scored");
                continue;
            }
        }
        let score = score_transcript(&drill, &answer);
        println!("{score}%");
        if score >= 90 && level < KOCH_LETTERS.len() {
            level += 1;
        }
    }
    Ok(())
}
