use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};

use readtogether_core::pipeline::batch_executor::{BatchExecutor, EvaluationItem};
use readtogether_core::pipeline::evaluate_reading_use_case::{
    EvaluateReadingUseCase, ReadingSource,
};
use readtogether_core::pipeline::evaluation_logger::StdoutEvaluationLogger;
use readtogether_core::pipeline::infrastructure::threaded_batch_executor::ThreadedBatchExecutor;
use readtogether_core::reading::domain::audio_clip::AudioClip;
use readtogether_core::reading::domain::reading_coach::ReadingCoach;
use readtogether_core::reading::domain::speech_transcriber::SpeechTranscriber;
use readtogether_core::reading::infrastructure::openai_coach::OpenAiCoach;
use readtogether_core::reading::infrastructure::openai_transcriber::OpenAiTranscriber;
use readtogether_core::shared::constants::MAX_GRADE_LEVEL;
use readtogether_core::shared::settings::Settings;

/// Scores a student's read-aloud attempt against the target passage.
#[derive(Parser)]
#[command(name = "readtogether")]
struct Cli {
    /// Settings file (defaults to the platform config directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

const ONE_TRANSCRIPT_SOURCE: &str = "Give exactly one of --transcript or --transcript-text";

/// Where the transcript comes from; exactly one source is required.
#[derive(Args)]
#[group(required = true, multiple = false)]
struct TranscriptInput {
    /// Text file holding the transcript.
    #[arg(long)]
    transcript: Option<PathBuf>,

    /// Transcript given inline.
    #[arg(long)]
    transcript_text: Option<String>,
}

impl TranscriptInput {
    fn read(self) -> Result<String, Box<dyn std::error::Error>> {
        match (self.transcript, self.transcript_text) {
            (Some(path), None) => read_text(&path),
            (None, Some(text)) => Ok(text),
            _ => Err(ONE_TRANSCRIPT_SOURCE.into()),
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Score a transcript against a target passage and print the word list.
    Evaluate {
        /// Text file holding the target passage.
        #[arg(long)]
        target: PathBuf,

        #[command(flatten)]
        input: TranscriptInput,
    },

    /// Transcribe an audio recording and print the text.
    Transcribe {
        /// Audio file (webm, wav, mp3, m4a, ogg, flac).
        audio: PathBuf,
    },

    /// Score a transcript and ask the coach for feedback.
    Coach {
        #[arg(long)]
        target: PathBuf,

        #[arg(long)]
        transcript: PathBuf,

        /// School grade of the reader (0 = kindergarten).
        #[arg(long)]
        grade: Option<u8>,
    },

    /// Transcribe a recording, score it, and coach the reader.
    Read {
        #[arg(long)]
        target: PathBuf,

        #[arg(long)]
        audio: PathBuf,

        /// School grade of the reader (0 = kindergarten).
        #[arg(long)]
        grade: Option<u8>,

        /// Skip coaching feedback.
        #[arg(long)]
        no_coach: bool,
    },

    /// Score many readings from a JSON Lines file of {id, target, transcript}.
    Batch {
        input: PathBuf,

        /// Worker threads (defaults to the settings value).
        #[arg(long)]
        workers: Option<usize>,
    },

    /// Print the effective settings.
    Config,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli.command)?;
    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };

    match cli.command {
        Command::Evaluate { target, input } => {
            let target = read_text(&target)?;
            let transcript = input.read()?;
            let use_case = EvaluateReadingUseCase::new(None, None, settings.grade_level);
            let result = use_case.evaluate(&target, &transcript);
            log::info!(
                "Accuracy {:.1}% ({} misread)",
                result.accuracy,
                result.misread_count()
            );
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Transcribe { audio } => {
            let transcriber = OpenAiTranscriber::new(&settings, Settings::api_key())?;
            let clip = AudioClip::from_path(&audio)?;
            println!("{}", transcriber.transcribe(&clip)?);
        }
        Command::Coach {
            target,
            transcript,
            grade,
        } => {
            let coach: Box<dyn ReadingCoach> =
                Box::new(OpenAiCoach::new(&settings, Settings::api_key())?);
            let use_case = EvaluateReadingUseCase::new(
                None,
                Some(coach),
                grade.unwrap_or(settings.grade_level),
            );
            let report = use_case.run(
                &read_text(&target)?,
                ReadingSource::Transcript(read_text(&transcript)?),
                &mut StdoutEvaluationLogger::default(),
            )?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Read {
            target,
            audio,
            grade,
            no_coach,
        } => {
            let transcriber: Box<dyn SpeechTranscriber> =
                Box::new(OpenAiTranscriber::new(&settings, Settings::api_key())?);
            let coach: Option<Box<dyn ReadingCoach>> = if no_coach {
                None
            } else {
                Some(Box::new(OpenAiCoach::new(&settings, Settings::api_key())?))
            };
            let use_case = EvaluateReadingUseCase::new(
                Some(transcriber),
                coach,
                grade.unwrap_or(settings.grade_level),
            );
            let mut logger = StdoutEvaluationLogger::default();
            let report = use_case.run(
                &read_text(&target)?,
                ReadingSource::Audio(AudioClip::from_path(&audio)?),
                &mut logger,
            )?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Batch { input, workers } => {
            let items = parse_batch(&read_text(&input)?)?;
            let executor = ThreadedBatchExecutor::new(workers.unwrap_or(settings.batch_workers));
            let mut logger = StdoutEvaluationLogger::default();
            for outcome in executor.execute(items, &mut logger)? {
                println!("{}", serde_json::to_string(&outcome)?);
            }
        }
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
    }

    Ok(())
}

fn validate(command: &Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Evaluate { target, input } => {
            require_file(target)?;
            match (&input.transcript, &input.transcript_text) {
                (Some(path), None) => require_file(path)?,
                (None, Some(_)) => {}
                _ => return Err(ONE_TRANSCRIPT_SOURCE.into()),
            }
        }
        Command::Transcribe { audio } => require_file(audio)?,
        Command::Coach {
            target,
            transcript,
            grade,
        } => {
            require_file(target)?;
            require_file(transcript)?;
            validate_grade(*grade)?;
        }
        Command::Read {
            target,
            audio,
            grade,
            ..
        } => {
            require_file(target)?;
            require_file(audio)?;
            validate_grade(*grade)?;
        }
        Command::Batch { input, workers } => {
            require_file(input)?;
            if *workers == Some(0) {
                return Err("Workers must be at least 1".into());
            }
        }
        Command::Config => {}
    }
    Ok(())
}

fn validate_grade(grade: Option<u8>) -> Result<(), Box<dyn std::error::Error>> {
    match grade {
        Some(g) if g > MAX_GRADE_LEVEL => {
            Err(format!("Grade must be between 0 and {MAX_GRADE_LEVEL}, got {g}").into())
        }
        _ => Ok(()),
    }
}

fn require_file(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !path.is_file() {
        return Err(format!("File not found: {}", path.display()).into());
    }
    Ok(())
}

fn read_text(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    fs::read_to_string(path).map_err(|e| -> Box<dyn std::error::Error> {
        format!("Failed to read {}: {e}", path.display()).into()
    })
}

/// Parses JSON Lines input, skipping blank lines.
fn parse_batch(input: &str) -> Result<Vec<EvaluationItem>, Box<dyn std::error::Error>> {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            serde_json::from_str::<EvaluationItem>(line).map_err(
                |e| -> Box<dyn std::error::Error> {
                    format!("Invalid batch entry on line {}: {e}", n + 1).into()
                },
            )
        })
        .collect()
}
