//! weekgantt CLI - Weekly Gantt Schedules
//!
//! Command-line interface for inspecting timelines and saved project
//! documents, and for creating new ones.

mod render;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use weekgantt_core::document::{Document, LoadedDocument};
use weekgantt_core::timeline::generate_timeline;
use weekgantt_core::{Locale, ProjectConfig};
use weekgantt_editor::{EditorSession, ViewState, DEFAULT_CELL_WIDTH};

#[derive(Parser)]
#[command(name = "weekgantt")]
#[command(author, version, about = "Weekly Gantt schedule tool", long_about = None)]
struct Cli {
    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the week/month structure for a start date and span
    Timeline {
        /// First day of the schedule (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        start: Option<NaiveDate>,

        /// Span in months (1-36)
        #[arg(long, value_name = "N")]
        months: Option<u32>,

        /// Month label language (vi, en)
        #[arg(long, env = "WEEKGANTT_LANG")]
        lang: Option<Locale>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Draw a saved project as a Gantt chart
    Show {
        /// Project document
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Month index to collapse (repeatable)
        #[arg(long = "collapse-month", value_name = "N")]
        collapse_months: Vec<usize>,

        /// Main task id whose sub-items are hidden (repeatable)
        #[arg(long = "collapse-group", value_name = "ID")]
        collapse_groups: Vec<String>,

        /// Week column width in pixels (16-64)
        #[arg(long, env = "WEEKGANTT_CELL_WIDTH", default_value_t = DEFAULT_CELL_WIDTH)]
        cell_width: u32,

        /// Display language, overriding the document
        #[arg(long, env = "WEEKGANTT_LANG")]
        lang: Option<Locale>,

        /// Reference day for the today marker (defaults to the local date)
        #[arg(long, value_name = "DATE")]
        today: Option<NaiveDate>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Create a new project document
    New {
        /// Output file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Project title
        #[arg(long)]
        title: Option<String>,

        /// First day of the schedule (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        start: Option<NaiveDate>,

        /// Span in months (1-36)
        #[arg(long, value_name = "N")]
        months: Option<u32>,

        /// Display language (vi, en)
        #[arg(long, env = "WEEKGANTT_LANG")]
        lang: Option<Locale>,

        /// Fill the project with a small example plan
        #[arg(long)]
        sample: bool,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Load a project document and report fields that fell back to defaults
    Check {
        /// Project document
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    match cli.command {
        Some(Commands::Timeline {
            start,
            months,
            lang,
            format,
        }) => cmd_timeline(start, months, lang, format),
        Some(Commands::Show {
            file,
            collapse_months,
            collapse_groups,
            cell_width,
            lang,
            today,
            format,
        }) => {
            let view = ViewState {
                collapsed_months: collapse_months.into_iter().collect(),
                collapsed_groups: collapse_groups.into_iter().collect(),
                ..ViewState::default()
            }
            .with_cell_width(cell_width);
            let today = today.unwrap_or_else(|| Local::now().date_naive());
            cmd_show(&file, view, lang, today, format)
        }
        Some(Commands::New {
            file,
            title,
            start,
            months,
            lang,
            sample,
            force,
        }) => {
            let mut config = ProjectConfig::default();
            if let Some(title) = title {
                config = config.project_title(title);
            }
            if let Some(start) = start {
                config = config.start_date(start);
            }
            if let Some(months) = months {
                config = config.duration_months(months);
            }
            if let Some(lang) = lang {
                config = config.lang(lang);
            }
            cmd_new(&file, config, sample, force)
        }
        Some(Commands::Check { file }) => cmd_check(&file),
        None => {
            println!("weekgantt - Weekly Gantt schedules");
            println!("Run with --help for usage information");
            Ok(())
        }
    }
}

// =============================================================================
// Commands
// =============================================================================

fn cmd_timeline(
    start: Option<NaiveDate>,
    months: Option<u32>,
    lang: Option<Locale>,
    format: OutputFormat,
) -> Result<()> {
    let defaults = ProjectConfig::default();
    let timeline = generate_timeline(
        start.unwrap_or(defaults.start_date),
        weekgantt_core::clamp_duration_months(months.unwrap_or(defaults.duration_months)),
        lang.unwrap_or(defaults.lang),
    );

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&timeline)?);
        return Ok(());
    }

    println!(
        "{} weeks in {} months (+{} padding columns)",
        timeline.total_weeks(),
        timeline.months.len(),
        timeline.padding_columns
    );
    for month in &timeline.months {
        println!();
        println!("{} ({} weeks)", month.label, month.count);
        for week in &timeline.weeks[month.weeks()] {
            let marker = if week.is_month_end { " |" } else { "" };
            println!("  W{:<3} {}{}", week.index, week.date, marker);
        }
    }
    Ok(())
}

fn cmd_show(
    file: &Path,
    view: ViewState,
    lang: Option<Locale>,
    today: NaiveDate,
    format: OutputFormat,
) -> Result<()> {
    let loaded = load(file)?;
    let mut config = loaded.config;
    if let Some(lang) = lang {
        config.lang = lang;
    }
    let session = EditorSession::new(config, loaded.tasks.unwrap_or_default()).with_view(view);

    match format {
        OutputFormat::Text => print!("{}", render::render_text(&session, today)),
        OutputFormat::Json => {
            let report = render::report(&session, today);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

fn cmd_new(file: &Path, config: ProjectConfig, sample: bool, force: bool) -> Result<()> {
    if file.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", file.display());
    }

    let mut session = EditorSession::new(config, Vec::new());
    if sample {
        build_sample(&mut session);
    }
    let document = session.to_document();
    document
        .write_file(file)
        .with_context(|| format!("Failed to write {}", file.display()))?;

    println!("Created: {}", file.display());
    println!(
        "  {} tasks, {} months from {}",
        document.tasks.len(),
        document.config.duration_months,
        document.config.start_date
    );
    Ok(())
}

fn cmd_check(file: &Path) -> Result<()> {
    let loaded = load(file)?;

    println!("Checking: {}", file.display());
    match &loaded.version {
        Some(version) => println!("  version {version}"),
        None => println!("  no version tag"),
    }
    let task_count = loaded.tasks.as_ref().map_or(0, Vec::len);
    println!(
        "  {task_count} tasks, {} months from {}",
        loaded.config.duration_months, loaded.config.start_date
    );

    if loaded.is_clean() {
        println!("OK");
    } else {
        println!("{} field(s) fell back to defaults:", loaded.fallbacks.len());
        for fallback in &loaded.fallbacks {
            println!("  - {fallback}");
        }
    }
    Ok(())
}

// =============================================================================
// Helpers
// =============================================================================

fn load(file: &Path) -> Result<LoadedDocument> {
    Document::read_file(file).with_context(|| format!("Failed to load {}", file.display()))
}

/// A small plan exercising groups, sub-items and payments
fn build_sample(session: &mut EditorSession) {
    use weekgantt_editor::TaskEdit;

    let lang = session.config().lang;
    let add_main = |session: &mut EditorSession, vi: &str, en: &str, start: i32, weeks: u32| {
        let id = session.add_task();
        session.update(&id, &TaskEdit::Name(Locale::Vi, vi.to_string()));
        session.update(&id, &TaskEdit::Name(Locale::En, en.to_string()));
        session.update(&id, &TaskEdit::StartWeek(start));
        session.update(&id, &TaskEdit::Duration(weeks));
        id
    };

    let survey = add_main(session, "Khảo sát", "Survey", 0, 2);
    let design = add_main(session, "Thiết kế", "Design", 2, 4);
    let build = add_main(session, "Triển khai", "Implementation", 6, 8);

    for (parent, vi, en) in [
        (&design, "Thiết kế sơ bộ", "Concept design"),
        (&design, "Thiết kế chi tiết", "Detailed design"),
        (&build, "Thi công", "Construction"),
    ] {
        if let Some(sub) = session.add_sub(parent) {
            session.update(&sub, &TaskEdit::Name(Locale::Vi, vi.to_string()));
            session.update(&sub, &TaskEdit::Name(Locale::En, en.to_string()));
            session.update(&sub, &TaskEdit::Duration(2));
        }
    }
    session.update(&survey, &TaskEdit::Progress(100));
    session.update(&build, &TaskEdit::Onsite(true));

    let advance = session.add_payment();
    session.update(&advance, &TaskEdit::Name(Locale::Vi, "Tạm ứng".to_string()));
    session.update(&advance, &TaskEdit::Name(Locale::En, "Advance".to_string()));
    session.update(&advance, &TaskEdit::StartWeek(1));

    tracing::debug!(%lang, tasks = session.tasks().len(), "sample plan built");
}
