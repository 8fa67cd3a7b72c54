use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "ted", version, about = "Terminal text editor with multiple buffers")]
struct Cli {
    /// Files to open; a missing file becomes a new unsaved document bound
    /// to that path.
    files: Vec<std::path::PathBuf>,

    /// Read-only pager mode: editing keys are disabled and Esc exits.
    #[arg(long)]
    view: bool,
}

/// The editor owns the terminal, so logs go to a file, and only when
/// TED_LOG names one. RUST_LOG filters as usual.
fn init_logging() {
    let Ok(path) = std::env::var("TED_LOG") else {
        return;
    };
    let Ok(file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
    else {
        return;
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
}

fn main() -> std::process::ExitCode {
    init_logging();
    let cli = Cli::parse();

    let mut ws = editor_state::workspace::Workspace::new();
    for path in &cli.files {
        if let Err(e) = ws.open_or_create(path) {
            eprintln!("{}: {}", path.display(), e);
            return std::process::ExitCode::FAILURE;
        }
    }

    // Nothing named on the command line: start with an empty document, or
    // ingest piped stdin under a synthetic name. Key input keeps working
    // afterwards because the event source reads the controlling terminal.
    if ws.is_empty() {
        use std::io::IsTerminal;
        let seeded = if std::io::stdin().is_terminal() {
            ws.new_untitled().map_err(std::io::Error::other)
        } else {
            io::file::read_stdin().and_then(|bytes| {
                let doc = editor_state::document::Document::from_bytes("<stdin>", &bytes)
                    .map_err(std::io::Error::other)?;
                ws.add(doc);
                Ok(())
            })
        };
        if let Err(e) = seeded {
            eprintln!("ted: {e}");
            return std::process::ExitCode::FAILURE;
        }
    }

    tracing::info!(documents = ws.len(), view_only = cli.view, "editor starting");
    let options = ui::Options {
        view_only: cli.view,
    };
    match ui::run(&mut ws, &options) {
        Ok(()) => {
            tracing::info!("editor exiting");
            std::process::ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("ted: {e}");
            std::process::ExitCode::FAILURE
        }
    }
}
