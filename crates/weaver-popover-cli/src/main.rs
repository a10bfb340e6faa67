use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use miette::{IntoDiagnostic, Result, WrapErr};
use weaver_popover::{
    Formatter, FormattingKind, HostEditor, PopoverConfig, Position, RopeEditor,
    SelectionController,
};

#[derive(Parser)]
#[command(version, about = "Detect and toggle inline markdown formatting on a selection", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to config file
    #[arg(long, global = true, env = "POPOVER_CONFIG")]
    config: Option<PathBuf>,

    /// Log decisions at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report which formatting the selection already carries
    Classify {
        /// Markdown file
        file: PathBuf,

        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Add or remove one kind of formatting on the selection
    Toggle {
        /// Markdown file
        file: PathBuf,

        /// bold, italic, strikeout or highlight
        #[arg(short, long)]
        kind: FormattingKind,

        #[command(flatten)]
        selection: SelectionArgs,

        /// Write the result back to the file instead of printing it
        #[arg(long)]
        in_place: bool,
    },
}

#[derive(Args)]
struct SelectionArgs {
    /// Selection start as zero-based LINE:CH
    #[arg(long)]
    from: Position,

    /// Selection end as zero-based LINE:CH
    #[arg(long)]
    to: Position,
}

fn main() -> Result<()> {
    init_miette();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    let mut controller = SelectionController::new(Formatter::new(&config.format));

    match cli.command {
        Commands::Classify { file, selection } => {
            let mut host = Some(open_editor(&file, &selection)?);
            if let Some(state) = controller.on_selection_observed(&mut host) {
                for (kind, active) in state.iter() {
                    println!("{kind}: {active}");
                }
            }
        }
        Commands::Toggle {
            file,
            kind,
            selection,
            in_place,
        } => {
            let mut host = Some(open_editor(&file, &selection)?);
            if controller.on_toggle_requested(&mut host, kind).is_none() {
                return Err(miette::miette!(
                    help = "select some text, and make sure its markers are balanced",
                    "nothing to toggle between {} and {}",
                    selection.from,
                    selection.to
                ));
            }
            let restored = controller.run_deferred(&mut host);

            let Some(editor) = host else {
                return Ok(());
            };
            if in_place {
                fs::write(&file, editor.content())
                    .into_diagnostic()
                    .wrap_err_with(|| format!("failed to write {}", file.display()))?;
            } else {
                print!("{}", editor.content());
            }
            if let Some(range) = restored {
                eprintln!("selection: {range}");
            }
        }
    }

    Ok(())
}

/// Load the editor and select the requested range.
fn open_editor(file: &Path, selection: &SelectionArgs) -> Result<RopeEditor> {
    let content = fs::read_to_string(file)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read {}", file.display()))?;

    let mut editor = RopeEditor::from_str(&content);
    let from = editor.check_position(selection.from)?;
    let to = editor.check_position(selection.to)?;
    editor.set_selection(from, to);
    Ok(editor)
}

fn load_config(explicit: Option<&Path>) -> Result<PopoverConfig> {
    if let Some(path) = explicit {
        return Ok(PopoverConfig::load(path)?);
    }
    match default_config_path() {
        Some(path) if path.exists() => Ok(PopoverConfig::load(&path)?),
        _ => {
            tracing::debug!("no config file, using defaults");
            Ok(PopoverConfig::default())
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("weaver").join("popover.toml"))
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .init();
}

fn init_miette() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))
    .expect("couldn't set the miette hook");
    miette::set_panic_hook();
}
