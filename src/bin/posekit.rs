//! Posekit CLI - Command-line interface for the pose analysis engine
//!
//! Commands:
//! - analyze: Process recorded pose frames into posture/rep analyses
//! - validate: Validate pose frame input and report landmark coverage

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use posekit::filter::{FilteredFrame, REP_COUNTING_LANDMARKS};
use posekit::session::{DetectionSession, SessionConfig};
use posekit::summary::SummaryEncoder;
use posekit::types::{Exercise, PoseFrame};
use posekit::ENGINE_VERSION;

/// Posekit - pose analysis for posture feedback and rep counting
#[derive(Parser)]
#[command(name = "posekit")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Analyze recorded pose frames for posture and repetitions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process recorded pose frames into per-frame analyses
    Analyze {
        /// Input file path (use - for stdin), NDJSON with one frame per line
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// Exercises to track
        #[arg(long, value_enum)]
        exercise: Vec<ExerciseArg>,

        /// Disable the posture rules (rep counting only)
        #[arg(long)]
        no_posture: bool,

        /// Write the session summary JSON to this path
        #[arg(long)]
        summary: Option<PathBuf>,
    },

    /// Validate pose frame input and report landmark coverage
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one analysis per line)
    Ndjson,
    /// JSON array of analyses
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExerciseArg {
    PushUp,
    Squat,
}

impl From<ExerciseArg> for Exercise {
    fn from(arg: ExerciseArg) -> Self {
        match arg {
            ExerciseArg::PushUp => Exercise::PushUp,
            ExerciseArg::Squat => Exercise::Squat,
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Engine error: {0}")]
    Engine(#[from] posekit::EngineError),

    #[error("No frames in input")]
    NoFrames,

    #[error("{0} invalid frame(s) in input")]
    ValidationFailed(usize),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("posekit: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Analyze {
            input,
            output,
            output_format,
            exercise,
            no_posture,
            summary,
        } => cmd_analyze(
            &input,
            &output,
            output_format,
            &exercise,
            no_posture,
            summary.as_deref(),
        ),

        Commands::Validate { input, json } => cmd_validate(&input, json),
    }
}

fn read_input(input: &Path) -> Result<String, CliError> {
    if input.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            eprintln!("posekit: reading frames from terminal; pipe NDJSON or press Ctrl-D");
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn parse_frames(data: &str) -> Result<Vec<PoseFrame>, CliError> {
    let mut frames = Vec::new();
    for line in data.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        frames.push(serde_json::from_str(trimmed)?);
    }
    Ok(frames)
}

fn cmd_analyze(
    input: &Path,
    output: &Path,
    output_format: OutputFormat,
    exercises: &[ExerciseArg],
    no_posture: bool,
    summary_path: Option<&Path>,
) -> Result<(), CliError> {
    let frames = parse_frames(&read_input(input)?)?;
    if frames.is_empty() {
        return Err(CliError::NoFrames);
    }

    let config = SessionConfig {
        // Batch replay has no speech engine; feedback is text-only
        voice_enabled: false,
        exercises: exercises.iter().map(|&e| e.into()).collect(),
        posture_enabled: !no_posture,
    };
    let mut session = DetectionSession::new(config);

    let mut analyses = Vec::with_capacity(frames.len());
    for frame in &frames {
        analyses.push(session.process_frame(frame, false));
    }

    let output_data = match output_format {
        OutputFormat::Ndjson => {
            let mut lines = Vec::with_capacity(analyses.len());
            for analysis in &analyses {
                lines.push(serde_json::to_string(analysis)?);
            }
            let mut data = lines.join("\n");
            data.push('\n');
            data
        }
        OutputFormat::Json => serde_json::to_string_pretty(&analyses)?,
    };

    if output.to_string_lossy() == "-" {
        let mut stdout = io::stdout();
        write!(stdout, "{output_data}")?;
        stdout.flush()?;
    } else {
        fs::write(output, output_data)?;
    }

    let summary_json = SummaryEncoder::new().encode_to_json(&session)?;
    if let Some(path) = summary_path {
        fs::write(path, summary_json)?;
    } else {
        eprintln!("{summary_json}");
    }

    Ok(())
}

#[derive(serde::Serialize)]
struct ValidationReport {
    total_lines: usize,
    valid_frames: usize,
    invalid_frames: usize,
    frames_with_rep_landmarks: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    line: usize,
    error: String,
}

fn cmd_validate(input: &Path, json: bool) -> Result<(), CliError> {
    let data = read_input(input)?;

    let mut report = ValidationReport {
        total_lines: 0,
        valid_frames: 0,
        invalid_frames: 0,
        frames_with_rep_landmarks: 0,
        errors: Vec::new(),
    };

    for (index, line) in data.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        report.total_lines += 1;

        match serde_json::from_str::<PoseFrame>(trimmed) {
            Ok(frame) => {
                report.valid_frames += 1;
                let filtered = FilteredFrame::from_frame(&frame);
                if filtered.has_all(&REP_COUNTING_LANDMARKS) {
                    report.frames_with_rep_landmarks += 1;
                }
            }
            Err(e) => {
                report.invalid_frames += 1;
                report.errors.push(ValidationErrorDetail {
                    line: index + 1,
                    error: e.to_string(),
                });
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Frames parsed:           {}", report.valid_frames);
        println!("Frames invalid:          {}", report.invalid_frames);
        println!(
            "Frames rep-countable:    {}",
            report.frames_with_rep_landmarks
        );

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!("  - line {}: {}", err.line, err.error);
            }
        }
    }

    if report.invalid_frames > 0 {
        Err(CliError::ValidationFailed(report.invalid_frames))
    } else {
        Ok(())
    }
}
