//! quizdoc CLI - compose quizzes and export them to PDF

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;

use quizdoc::inspect::inspect;
use quizdoc::{
    ComposeRequest, ExportOptions, LayoutMetrics, MemoryStore, PageGeometry, QuestionType,
    QuizDoc, QuizStore,
};

#[derive(Parser)]
#[command(name = "quizdoc")]
#[command(version)]
#[command(about = "Compose quizzes from a question bank and export them to PDF", long_about = None)]
struct Cli {
    /// Question bank file
    #[arg(long, global = true, env = "QUIZDOC_BANK", default_value = "bank.json")]
    bank: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Draw questions into a new quiz
    Compose {
        /// Quiz title
        #[arg(value_name = "TITLE")]
        title: String,

        /// Number of questions to draw
        #[arg(short = 'n', long, default_value = "10")]
        count: usize,

        /// Quiz description
        #[arg(short, long)]
        description: Option<String>,

        /// Restrict to a subject
        #[arg(long)]
        subject: Option<i64>,

        /// Restrict to a topic
        #[arg(long)]
        topic: Option<i64>,

        /// Restrict to question types (repeatable)
        #[arg(long = "type", value_enum)]
        types: Vec<TypeArg>,

        /// RNG seed for a reproducible draw
        #[arg(long)]
        seed: Option<u64>,

        /// Fail instead of drawing fewer questions than requested
        #[arg(long)]
        strict: bool,

        /// Also export the new quiz to this file
        #[arg(short, long, value_name = "FILE")]
        export: Option<PathBuf>,

        /// Include the answer key when exporting
        #[arg(long, requires = "export")]
        answers: bool,
    },

    /// Export a stored quiz to PDF
    Export {
        /// Quiz id
        #[arg(value_name = "QUIZ_ID")]
        quiz_id: i64,

        /// Output file (quiz-<id>.pdf if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Append an answer key page instead of ruled lines
        #[arg(short, long)]
        answers: bool,

        /// Page size
        #[arg(long, value_enum, default_value = "letter")]
        page_size: PageSize,

        /// Use tighter line spacing
        #[arg(long)]
        compact: bool,
    },

    /// List stored quizzes
    List {
        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Verify an exported document's cross-reference table
    Inspect {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum TypeArg {
    ShortAnswer,
    MultipleChoice,
    TrueFalse,
    Essay,
}

impl From<TypeArg> for QuestionType {
    fn from(arg: TypeArg) -> Self {
        match arg {
            TypeArg::ShortAnswer => QuestionType::ShortAnswer,
            TypeArg::MultipleChoice => QuestionType::MultipleChoice,
            TypeArg::TrueFalse => QuestionType::TrueFalse,
            TypeArg::Essay => QuestionType::Essay,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum PageSize {
    /// US Letter (612 x 792 pt)
    Letter,
    /// ISO A4 (595 x 842 pt)
    A4,
}

impl From<PageSize> for PageGeometry {
    fn from(size: PageSize) -> Self {
        match size {
            PageSize::Letter => PageGeometry::letter(),
            PageSize::A4 => PageGeometry::a4(),
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compose {
            title,
            count,
            description,
            subject,
            topic,
            types,
            seed,
            strict,
            export,
            answers,
        } => {
            let mut request = ComposeRequest::new(title, count)
                .with_types(types.into_iter().map(QuestionType::from));
            if let Some(description) = description {
                request = request.with_description(description);
            }
            if let Some(subject) = subject {
                request = request.with_subject(subject);
            }
            if let Some(topic) = topic {
                request = request.with_topic(topic);
            }

            let mut builder = QuizDoc::new()
                .with_answer_lines(!answers)
                .with_answer_key(answers);
            if let Some(seed) = seed {
                builder = builder.with_seed(seed);
            }
            if strict {
                builder = builder.strict();
            }

            cmd_compose(&cli.bank, &builder, &request, export.as_deref())
        }
        Commands::Export {
            quiz_id,
            output,
            answers,
            page_size,
            compact,
        } => {
            let mut options =
                ExportOptions::from_include_answers(answers).with_geometry(page_size.into());
            if compact {
                options = options.with_metrics(LayoutMetrics::compact());
            }
            cmd_export(&cli.bank, quiz_id, output.as_deref(), &options)
        }
        Commands::List { json } => cmd_list(&cli.bank, json),
        Commands::Inspect { input } => cmd_inspect(&input),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn open_bank(path: &Path) -> Result<MemoryStore, Box<dyn std::error::Error>> {
    let store = MemoryStore::open(path)
        .map_err(|e| format!("Cannot open question bank {}: {}", path.display(), e))?;
    log::debug!("Opened question bank {}", path.display());
    Ok(store)
}

fn cmd_compose(
    bank: &Path,
    builder: &QuizDoc,
    request: &ComposeRequest,
    export: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_bank(bank)?;
    let composed = builder.compose(&store, &store, request)?;
    store.save(bank)?;

    for warning in &composed.warnings {
        println!("{}: {}", "Warning".yellow().bold(), warning);
    }

    println!(
        "{} quiz {} \"{}\" with {} questions",
        "Created".green(),
        composed.quiz.id.to_string().bold(),
        composed.quiz.title,
        composed.question_count()
    );
    for (link, question) in composed.links.iter().zip(&composed.questions) {
        println!("  {} {}", format!("{:>3}.", link.order_index).dimmed(), question.text);
    }

    if let Some(path) = export {
        let pdf = builder.export(&store, composed.quiz.id)?;
        fs::write(path, &pdf)?;
        println!("{} {}", "Saved to".green(), path.display());
    }

    Ok(())
}

fn cmd_export(
    bank: &Path,
    quiz_id: i64,
    output: Option<&Path>,
    options: &ExportOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_bank(bank)?;
    let pdf = quizdoc::export_quiz_with_options(&store, quiz_id, options)?;

    let path = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(format!("quiz-{}.pdf", quiz_id)));
    fs::write(&path, &pdf)?;

    println!(
        "{} {} ({} pages, {} bytes)",
        "Saved to".green(),
        path.display(),
        options.page_count(),
        pdf.len()
    );

    Ok(())
}

fn cmd_list(bank: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_bank(bank)?;
    let quizzes = store.quizzes()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&quizzes)?);
        return Ok(());
    }

    if quizzes.is_empty() {
        println!("{}", "No quizzes yet".yellow());
        return Ok(());
    }

    println!("{}", "Quizzes".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for quiz in &quizzes {
        let count = store.quiz_links(quiz.id)?.len();
        println!(
            "{:>4}  {}  {} {}",
            quiz.id.to_string().bold(),
            quiz.created_at.format("%Y-%m-%d %H:%M"),
            quiz.title,
            format!("({} questions)", count).dimmed()
        );
        if let Some(ref description) = quiz.description {
            println!("      {}", description.dimmed());
        }
    }

    Ok(())
}

fn cmd_inspect(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    let report = inspect(&data)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), report.version);
    println!("{}: {}", "Objects".bold(), report.object_count());
    println!("{}: {}", "startxref".bold(), report.startxref);

    println!();
    println!("{}", "Cross-Reference Table".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for (number, entry) in report.entries.iter().enumerate() {
        let flag = if entry.in_use { "n".green() } else { "f".dimmed() };
        println!(
            "{:>4}  {:010} {:05} {}",
            number, entry.byte_offset, entry.generation, flag
        );
    }

    println!();
    for stream in &report.streams {
        println!(
            "{} {}: /Length {}",
            "Stream".bold(),
            stream.object,
            stream.declared_length
        );
    }
    println!("\n{}", "All offsets verified".green().bold());

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "quizdoc".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Quiz composition and PDF export tool");
    println!();
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_compose() {
        let cli = Cli::try_parse_from([
            "quizdoc", "--bank", "b.json", "compose", "Mechanics", "-n", "3", "--subject", "1",
            "--topic", "1", "--type", "true-false",
        ])
        .unwrap();

        assert_eq!(cli.bank, PathBuf::from("b.json"));
        match cli.command {
            Commands::Compose {
                title,
                count,
                subject,
                types,
                ..
            } => {
                assert_eq!(title, "Mechanics");
                assert_eq!(count, 3);
                assert_eq!(subject, Some(1));
                assert!(types == vec![TypeArg::TrueFalse]);
            }
            _ => panic!("expected compose"),
        }
    }

    #[test]
    fn test_answers_requires_export() {
        assert!(Cli::try_parse_from(["quizdoc", "compose", "T", "--answers"]).is_err());
    }

    #[test]
    fn test_compose_then_export() {
        let dir = tempfile::tempdir().unwrap();
        let bank = dir.path().join("bank.json");
        let pdf = dir.path().join("out.pdf");
        fs::write(
            &bank,
            r#"{
                "subjects": [{"id": 1, "name": "Physics"}],
                "topics": [{"id": 1, "subjectId": 1, "name": "Mechanics"}],
                "questions": [
                    {"id": 1, "text": "F = ?", "answer": "ma", "subjectId": 1, "topicId": 1},
                    {"id": 2, "text": "Unit of force?", "answer": "newton", "subjectId": 1, "topicId": 1}
                ]
            }"#,
        )
        .unwrap();

        let request = ComposeRequest::new("Forces", 2);
        cmd_compose(&bank, &QuizDoc::new(), &request, None).unwrap();
        cmd_export(&bank, 1, Some(&pdf), &ExportOptions::from_include_answers(true)).unwrap();

        let data = fs::read(&pdf).unwrap();
        assert_eq!(inspect(&data).unwrap().streams.len(), 2);
        assert!(cmd_inspect(&pdf).is_ok());
    }
}
