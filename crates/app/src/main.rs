use std::fmt;

use exam_core::model::{ExamId, ExamResult, UserId};
use services::{Clock, DashboardService, ExamLoopService, ExamSession, NavDirection};
use storage::seed::{self, GENERAL_KNOWLEDGE_EXAM, SAMPLE_STUDENT, SAMPLE_TEACHER};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidExamId { raw: String },
    InvalidStudentId { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidExamId { raw } => write!(f, "invalid --exam-id value: {raw}"),
            ArgsError::InvalidStudentId { raw } => write!(f, "invalid --student-id value: {raw}"),
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

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- demo       [--exam-id <id>] [--student-id <id>]");
    eprintln!("  cargo run -p app -- dashboards [--student-id <id>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --exam-id 1      (General Knowledge Quiz)");
    eprintln!("  --student-id 1   (John Smith)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  EXAM_DEMO_EXAM_ID, EXAM_DEMO_STUDENT_ID");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Demo,
    Dashboards,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "demo" => Some(Self::Demo),
            "dashboards" => Some(Self::Dashboards),
            _ => None,
        }
    }
}

struct Args {
    exam_id: ExamId,
    student_id: UserId,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut exam_id = std::env::var("EXAM_DEMO_EXAM_ID")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .map_or(GENERAL_KNOWLEDGE_EXAM, ExamId::new);
        let mut student_id = std::env::var("EXAM_DEMO_STUDENT_ID")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .map_or(SAMPLE_STUDENT, UserId::new);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--exam-id" => {
                    let value = require_value(args, "--exam-id")?;
                    let parsed: u64 = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidExamId { raw: value.clone() })?;
                    exam_id = ExamId::new(parsed);
                }
                "--student-id" => {
                    let value = require_value(args, "--student-id")?;
                    let parsed: u64 = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidStudentId { raw: value.clone() })?;
                    student_id = UserId::new(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            exam_id,
            student_id,
        })
    }
}

/// Walk a scripted attempt through the session: answer every question with
/// its first option, flag one for review, let the clock tick a little, then
/// confirm the submission.
async fn run_demo(
    exam_loop: &ExamLoopService,
    args: &Args,
) -> Result<ExamResult, Box<dyn std::error::Error>> {
    let mut session = exam_loop.start_exam(args.exam_id, args.student_id).await?;
    println!(
        "Started \"{}\" for {} ({} questions, {} minutes)",
        session.exam().title(),
        session.student_name(),
        session.exam().question_count(),
        session.exam().duration_minutes(),
    );

    let question_count = session.exam().question_count();
    for index in 0..question_count {
        session.jump_to(index);
        let question = session.current_question();
        let question_id = question.id();
        println!("  Q{}: {}", index + 1, question.prompt());
        session.select_answer(question_id, 0);
    }

    // Flag the second question, go back to review it, then clear the flag.
    if let Some(flagged) = session.exam().question_at(1).map(|q| q.id()) {
        session.toggle_flag(flagged);
        session.navigate(NavDirection::Previous);
        session.toggle_flag(flagged);
    }

    for _ in 0..3 {
        if let Some(result) = exam_loop.tick(&mut session).await? {
            // Would only happen with a sub-3-second exam.
            return Ok(result);
        }
    }

    print_progress(&session);
    session.request_submit();
    let result = exam_loop.confirm_submit(&mut session).await?;
    Ok(result)
}

fn print_progress(session: &ExamSession) {
    let progress = session.progress();
    println!(
        "Progress: {}/{} answered, {} flagged, {}s remaining",
        progress.answered, progress.total, progress.flagged, progress.remaining_seconds,
    );
}

fn print_result(result: &ExamResult) {
    println!();
    println!("Result for {}:", result.student_name());
    println!(
        "  score {}/{} ({:.1}%), {} min",
        result.score(),
        result.total_points(),
        result.percentage(),
        result.time_taken_minutes(),
    );
    for record in result.answers() {
        let mark = if record.is_correct { "+" } else { "-" };
        println!(
            "  {mark} question {} -> option {}",
            record.question_id, record.selected_answer,
        );
    }
}

async fn print_dashboards(
    dashboards: &DashboardService,
    student_id: UserId,
) -> Result<(), Box<dyn std::error::Error>> {
    let student = dashboards.student_overview(student_id).await?;
    println!();
    println!("Student dashboard:");
    println!("  {} exams available", student.available_exams);
    println!(
        "  {} completed, {:.1}% average",
        student.completed_exams, student.average_percentage,
    );
    for item in &student.recent_results {
        println!(
            "  recent: {} ({:.1}%)",
            item.exam_title.as_deref().unwrap_or("(removed exam)"),
            item.percentage,
        );
    }

    let teacher = dashboards.teacher_overview(SAMPLE_TEACHER).await?;
    println!();
    println!("Teacher dashboard:");
    println!(
        "  {} exams ({} active), {} questions",
        teacher.total_exams, teacher.active_exams, teacher.questions_created,
    );
    println!(
        "  {} attempts, {:.1}% class average",
        teacher.total_attempts, teacher.class_average_percentage,
    );

    let history = dashboards.result_history(student_id).await?;
    println!();
    println!(
        "History: {} taken, {} passed, {:.1}% average, {} min total",
        history.exams_taken, history.passed, history.average_percentage, history.total_time_minutes,
    );

    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Default behavior: run the demo when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Demo,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Demo,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let args = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = seed::in_memory_with_sample_data().await?;
    let dashboards = DashboardService::with_storage(&storage);

    match cmd {
        Command::Demo => {
            let exam_loop = ExamLoopService::with_storage(Clock::system(), &storage);
            let result = run_demo(&exam_loop, &args).await?;
            print_result(&result);
            print_dashboards(&dashboards, args.student_id).await?;
        }
        Command::Dashboards => {
            print_dashboards(&dashboards, args.student_id).await?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
