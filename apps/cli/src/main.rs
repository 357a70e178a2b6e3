use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use vlprj_project::{
    compose_project_text, save_project, CollaboratorError, ComposeOptions, ExtensionStrip,
    PassthroughFormatter, ProjectSession, ProjectSnapshotStore, ProjectTree, WriterConfig,
    WriterConfigStore,
};

#[derive(Parser)]
#[command(
    name = "vlprj",
    about = "Writes VLisp project files from project tree snapshots",
    author,
    version
)]
struct Cli {
    /// 輸出設定檔（JSON）。 / Writer configuration file (JSON).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    /// 顯示除錯訊息。 / Enable debug logging.
    #[arg(long, short, global = true, conflicts_with = "quiet")]
    verbose: bool,
    /// 僅顯示錯誤。 / Only log errors.
    #[arg(long, short, global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 輸出未排版的專案檔文字。 / Print the raw project file text.
    Render(RenderArgs),
    /// 寫入專案檔並重新載入專案。 / Write the project file and reopen the project.
    Save(SaveArgs),
}

#[derive(Args)]
struct ComposeArgs {
    /// 專案樹快照（JSON）。 / Project tree snapshot (JSON).
    #[arg(value_name = "SNAPSHOT")]
    snapshot: PathBuf,

    /// 標頭使用的日期；預設為今天。 / Date written in the header; defaults to today.
    #[arg(long, value_name = "YYYY-MM-DD")]
    date: Option<NaiveDate>,

    /// 副檔名移除方式，覆寫設定檔。 / Extension stripping mode, overriding the config file.
    #[arg(long, value_enum, value_name = "MODE")]
    strip: Option<StripChoice>,
}

#[derive(Args)]
struct RenderArgs {
    #[command(flatten)]
    compose: ComposeArgs,

    /// 寫入檔案而非標準輸出。 / Write to a file instead of stdout.
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct SaveArgs {
    #[command(flatten)]
    compose: ComposeArgs,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StripChoice {
    FixedWidth,
    LastDot,
}

impl From<StripChoice> for ExtensionStrip {
    fn from(choice: StripChoice) -> Self {
        match choice {
            StripChoice::FixedWidth => ExtensionStrip::FixedWidth,
            StripChoice::LastDot => ExtensionStrip::LastDot,
        }
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if quiet {
        builder.filter_level(log::LevelFilter::Error);
    } else if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn run() -> Result<()> {
    let Cli {
        config,
        verbose,
        quiet,
        command,
    } = Cli::parse();
    init_logging(verbose, quiet);

    let config = load_config(config.as_deref())?;
    match command {
        Commands::Render(args) => execute_render(args, &config),
        Commands::Save(args) => execute_save(args, &config),
    }
}

fn load_config(path: Option<&Path>) -> Result<WriterConfig> {
    match path {
        Some(path) => {
            let store = WriterConfigStore::load(path)?;
            log::debug!("using writer config {}", store.path().display());
            Ok(store.into_config())
        }
        None => Ok(WriterConfig::default()),
    }
}

fn compose_options(args: &ComposeArgs, config: &WriterConfig) -> ComposeOptions {
    let saved_on = args.date.unwrap_or_else(|| Local::now().date_naive());
    let options = ComposeOptions::from_config(config, saved_on);
    match args.strip {
        Some(choice) => options.with_extension_strip(choice.into()),
        None => options,
    }
}

fn execute_render(args: RenderArgs, config: &WriterConfig) -> Result<()> {
    let store = ProjectSnapshotStore::new(&args.compose.snapshot);
    let tree = store.load_required()?;
    let options = compose_options(&args.compose, config);
    let text = compose_project_text(&tree, &options)
        .with_context(|| format!("failed to compose project '{}'", tree.project_name))?;

    match args.output {
        Some(output) => {
            fs::write(&output, text.as_bytes())
                .with_context(|| format!("failed to write {}", output.display()))?;
            println!("Rendered project '{}' to {}", tree.project_name, output.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}

fn execute_save(args: SaveArgs, config: &WriterConfig) -> Result<()> {
    let store = ProjectSnapshotStore::new(&args.compose.snapshot);
    let mut session = ProjectSession::new();
    session.open(store.load_required()?);
    let options = compose_options(&args.compose, config);

    // The project file is not parsed back; the snapshot stays the source of the tree.
    let mut reload_snapshot = |project_file: &Path| -> Result<ProjectTree, CollaboratorError> {
        let written = fs::metadata(project_file)?;
        if written.len() == 0 {
            return Err(format!("{} is empty after writing", project_file.display()).into());
        }
        Ok(store.load_required()?)
    };

    let tree = save_project(&mut session, &options, &PassthroughFormatter, &mut reload_snapshot)?;
    if tree.source_files.is_empty() {
        log::warn!("project '{}' has no source files", tree.project_name);
    }
    println!(
        "Saved project '{}' to {}",
        tree.project_name,
        tree.project_file_path.display()
    );
    Ok(())
}
