use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result, bail};
use midiscore::prelude::*;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Clone, Copy, clap::ValueEnum)]
enum Mode {
    /// Two tracks become the two hands, anything else is split at middle C
    Smart,
    /// One staff per track
    Preserve,
    /// Everything is split at middle C
    Piano,
}

impl From<Mode> for ImportMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Smart => ImportMode::Smart,
            Mode::Preserve => ImportMode::PreserveOriginal,
            Mode::Piano => ImportMode::ForcePiano,
        }
    }
}

/// Convert Standard MIDI Files into quantized JSON scores
#[derive(clap::Parser)]
struct Args {
    /// MIDI files or directories holding them
    #[arg(required = true)]
    input: Vec<PathBuf>,
    /// Output file, for a single input
    #[arg(short, long, conflicts_with = "output_dir")]
    output: Option<PathBuf>,
    /// Output directory; each score is written as `<name>.json`
    #[arg(short = 'O', long)]
    output_dir: Option<PathBuf>,
    /// How tracks become staves
    #[arg(short, long, value_enum, default_value_t = Mode::Smart)]
    mode: Mode,
    /// Keep channel 10 tracks and notes
    #[arg(long, default_value_t = false)]
    keep_drums: bool,
    /// Keep tracks without notes
    #[arg(long, default_value_t = false)]
    keep_empty: bool,
    /// Maximum number of staves
    #[arg(long, default_value_t = MidiImportOptions::DEFAULT_MAX_TRACKS)]
    max_tracks: usize,
    /// Hold notes while the sustain pedal is down
    #[arg(long, default_value_t = false)]
    sustain: bool,
    /// Allow dotted note values
    #[arg(long, default_value_t = false)]
    dotted: bool,
    /// Indent the JSON output
    #[arg(long, default_value_t = false)]
    pretty: bool,
    /// Show extra debugging info
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

impl Args {
    fn options(&self) -> MidiImportOptions {
        MidiImportOptions::default()
            .with_mode(self.mode.into())
            .with_skip_percussion(!self.keep_drums)
            .with_skip_empty_tracks(!self.keep_empty)
            .with_max_tracks(self.max_tracks)
            .with_sustain_pedal(self.sustain)
            .with_dotted_durations(self.dotted)
    }
}

const MIDI_EXTENSIONS: [&str; 2] = ["mid", "midi"];

fn is_midi(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| MIDI_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

fn find_midi_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }
        let mut found = Vec::new();
        for entry in WalkDir::new(input) {
            let entry = entry.with_context(|| format!("scanning {}", input.display()))?;
            if entry.file_type().is_file() && is_midi(entry.path()) {
                found.push(entry.into_path());
            }
        }
        found.sort();
        files.extend(found);
    }
    Ok(files)
}

fn convert(path: &Path, out: Option<&Path>, args: &Args) -> Result<()> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let result = import_smf(&bytes, &args.options());

    let json = if args.pretty {
        serde_json::to_string_pretty(&result)
    } else {
        serde_json::to_string(&result)
    }
    .context("serializing score")?;

    match out {
        Some(out) => {
            fs::write(out, json).with_context(|| format!("writing {}", out.display()))?
        }
        None => println!("{json}"),
    }

    match result {
        ImportResult::Success { score, warnings } => {
            tracing::info!(
                file = %path.display(),
                tracks = score.tracks.len(),
                measures = score.measure_count(),
                warnings = warnings.len(),
                "converted"
            );
            Ok(())
        }
        ImportResult::Failure { message } => bail!("{}: {message}", path.display()),
    }
}

fn output_path(file: &Path, args: &Args) -> Option<PathBuf> {
    match (&args.output, &args.output_dir) {
        (Some(out), _) => Some(out.clone()),
        (None, Some(dir)) => file
            .file_stem()
            .map(|stem| dir.join(format!("{}.json", stem.to_string_lossy()))),
        (None, None) => None,
    }
}

fn run(args: &Args) -> Result<usize> {
    let files = find_midi_files(&args.input)?;
    if files.is_empty() {
        bail!("no MIDI files found");
    }
    if args.output.is_some() && files.len() > 1 {
        bail!("--output takes a single input; use --output-dir for several");
    }
    if let Some(dir) = &args.output_dir {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }

    let mut failed = 0;
    for file in &files {
        if let Err(e) = convert(file, output_path(file, args).as_deref(), args) {
            tracing::error!("{e:#}");
            failed += 1;
        }
    }
    if files.len() > 1 {
        tracing::info!(total = files.len(), failed, "done");
    }
    Ok(failed)
}

fn main() -> ExitCode {
    let args: Args = clap::Parser::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

#[test]
fn directories_are_searched_recursively() {
    let dir = tempfile::TempDir::new().unwrap();
    let nested = dir.path().join("book").join("etudes");
    fs::create_dir_all(&nested).unwrap();
    for path in [
        dir.path().join("a.mid"),
        nested.join("b.MIDI"),
        nested.join("notes.txt"),
    ] {
        fs::write(path, b"").unwrap();
    }

    let found = find_midi_files(&[dir.path().to_path_buf()]).unwrap();
    assert_eq!(found, vec![dir.path().join("a.mid"), nested.join("b.MIDI")]);
}

#[test]
fn failed_conversion_names_the_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("broken.mid");
    fs::write(&path, b"RIFF").unwrap();
    let args: Args = clap::Parser::parse_from(["smf2score", "-O", "out", "broken.mid"]);

    let err = convert(&path, Some(&dir.path().join("broken.json")), &args).unwrap_err();
    assert!(err.to_string().contains("broken.mid"), "{err:#}");
    let missing = convert(&dir.path().join("missing.mid"), None, &args).unwrap_err();
    assert!(format!("{missing:#}").starts_with("reading "), "{missing:#}");
}
