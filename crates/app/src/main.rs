use std::fmt;

use exam_core::model::{ChapterId, CourseId, StudentId};
use services::{AppServices, Clock};
use tracing_subscriber::{EnvFilter, fmt as log_fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod console;
mod demo;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidId { flag: &'static str, raw: String },
    InvalidDbUrl { raw: String },
    MissingChapter,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidId { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::MissingChapter => write!(f, "take requires --chapter <id>"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_id(flag: &'static str, raw: String) -> Result<u64, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidId { flag, raw })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Take,
    Progress,
    Seed,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "take" => Some(Self::Take),
            "progress" => Some(Self::Progress),
            "seed" => Some(Self::Seed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    student_id: StudentId,
    student_name: Option<String>,
    course_id: CourseId,
    chapter_id: Option<ChapterId>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("LMS_DB_URL").unwrap_or_else(|_| "sqlite://exams.sqlite3".into());
        let mut student_id = StudentId::new(1);
        let mut student_name = None;
        let mut course_id = CourseId::new(1);
        let mut chapter_id = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--student" => {
                    let value = require_value(args, "--student")?;
                    student_id = StudentId::new(parse_id("--student", value)?);
                }
                "--name" => {
                    student_name = Some(require_value(args, "--name")?);
                }
                "--course" => {
                    let value = require_value(args, "--course")?;
                    course_id = CourseId::new(parse_id("--course", value)?);
                }
                "--chapter" => {
                    let value = require_value(args, "--chapter")?;
                    chapter_id = Some(ChapterId::new(parse_id("--chapter", value)?));
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            student_id,
            student_name,
            course_id,
            chapter_id,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- seed     [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- take     --chapter <id> [--course <id>] [--student <id>] [--name <name>]");
    eprintln!("  cargo run -p app -- progress [--course <id>] [--student <id>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://exams.sqlite3");
    eprintln!("  --course 1 --student 1");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  LMS_DB_URL, LMS_SUBMISSIONS_URL, LMS_FEEDBACK_DELAY_MS, RUST_LOG");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            log_fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);

    let cmd = match argv.next() {
        None => {
            print_usage();
            return Ok(());
        }
        Some(first) if first == "--help" || first == "-h" => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(&first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let services = AppServices::new_sqlite(&args.db_url, Clock::system()).await?;

    match cmd {
        Command::Seed => {
            let summary = demo::seed(services.storage()).await?;
            println!(
                "seeded course {} with {} chapters and {} questions into {}",
                summary.course_id, summary.chapters, summary.questions, args.db_url
            );
            Ok(())
        }
        Command::Take => {
            let chapter_id = args.chapter_id.ok_or(ArgsError::MissingChapter)?;
            console::take(
                &services,
                args.student_id,
                args.student_name.clone(),
                args.course_id,
                chapter_id,
            )
            .await
        }
        Command::Progress => console::progress(&services, args.student_id, args.course_id).await,
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
