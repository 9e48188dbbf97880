use std::{
    fs,
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    document::Document,
    load_settings,
    page::{Page, RowElement},
    HttpStudentApi, PageEvent, StudentController, TokenTransport,
};
use shared::{domain::StudentId, protocol::StudentForm};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Drives the student dashboard workflows against a saved page snapshot.
#[derive(Parser, Debug)]
struct Args {
    /// Page snapshot (JSON) to load and update.
    #[arg(long, default_value = "dashboard.json")]
    page: PathBuf,
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    token_transport: Option<TokenTransport>,
    /// Run the workflow but leave the snapshot file untouched.
    #[arg(long)]
    dry_run: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the student table.
    Show,
    /// Submit the add-student form.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        marks: String,
    },
    /// Edit a student's marks and save with Enter.
    Edit { student_id: i64, marks: String },
    /// Delete a student after confirmation.
    Delete {
        student_id: i64,
        /// Answer the confirmation prompt with yes.
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let args = Args::parse();

    let mut settings = load_settings().context("failed to load settings")?;
    if let Some(url) = args.server_url.clone() {
        settings.server_url = url;
    }
    if let Some(transport) = args.token_transport {
        settings.token_transport = transport;
    }

    let mut page = read_page(&args.page)?;
    if let Command::Show = args.command {
        print_table(&page);
        return Ok(());
    }
    if let Command::Delete { yes, .. } = args.command {
        page.set_confirm_handler(Box::new(move |message| yes || prompt_yes_no(message)));
    }
    if let Command::Add {
        name,
        subject,
        marks,
    } = &args.command
    {
        page.open_create_dialog(StudentForm {
            name: name.clone(),
            subject_name: subject.clone(),
            marks: marks.clone(),
        });
    }

    let api = HttpStudentApi::new(&settings);
    let controller = StudentController::initialize(page, api, &settings)
        .context("failed to initialize dashboard controller")?;

    let settle_for = match &args.command {
        Command::Show => Duration::ZERO,
        Command::Add { .. } => {
            controller.dispatch(PageEvent::SubmitCreate).await;
            controller.context().reload_delay
        }
        Command::Edit { student_id, marks } => {
            let id = StudentId(*student_id);
            controller.dispatch(PageEvent::EditClicked(id)).await;
            controller
                .with_page_mut(|page| {
                    if let Some(row) = page.row_mut(id) {
                        row.set_input_value(marks);
                    }
                })
                .await;
            controller
                .dispatch(PageEvent::KeyPressed {
                    student_id: id,
                    key: "Enter".into(),
                })
                .await;
            Duration::ZERO
        }
        Command::Delete { student_id, .. } => {
            controller
                .dispatch(PageEvent::DeleteClicked(StudentId(*student_id)))
                .await;
            controller.context().row_exit
        }
    };

    // Notifications are read before any auto-dismiss timer can fire.
    let messages = controller.with_page(Document::messages).await;
    for (severity, message) in &messages {
        println!("[{}] {message}", severity.css_class());
    }

    if !settle_for.is_zero() {
        tokio::time::sleep(settle_for + Duration::from_millis(50)).await;
    }

    let snapshot = controller
        .with_page_mut(|page| {
            if page.reload_count > 0 {
                info!("page reload requested; re-render the snapshot from the server");
            }
            page.notifications.clear();
            page.prompts.clear();
            serde_json::to_string_pretty(page)
        })
        .await
        .context("failed to serialize page snapshot")?;

    if args.dry_run {
        info!("dry run, snapshot not written");
    } else {
        fs::write(&args.page, snapshot)
            .with_context(|| format!("failed to write page snapshot '{}'", args.page.display()))?;
    }
    Ok(())
}

fn read_page(path: &Path) -> Result<Document> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read page snapshot '{}'", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse page snapshot '{}'", path.display()))
}

fn prompt_yes_no(message: &str) -> bool {
    print!("{message} [y/N] ");
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

fn print_table(page: &Document) {
    if let Some(count) = &page.count_indicator {
        println!("{count}");
    }
    for row in &page.rows {
        let grade = row.badge.map(|b| b.grade.label()).unwrap_or("-");
        println!(
            "{:>5}  {:<24} {:<16} {:>6}  {}",
            row.student_id.0,
            row.display_name(),
            row.subject_name,
            row.marks_text,
            grade
        );
    }
}
