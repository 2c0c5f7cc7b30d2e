//! CLI entry point for `remotegate`.

use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};

use remotegate::config::{self, Config};
use remotegate::model::address::Sender;
use remotegate::model::message::ShowImages;
use remotegate::parser::eml;
use remotegate::parser::mime::ParsedMessage;
use remotegate::remote::{
    pattern, Action, RemoteContentTransformer, RemoteInjected, RewriteStrategy, TransformOptions,
    View,
};

#[derive(Parser)]
#[command(
    name = "remotegate",
    version,
    about = "Decide and apply the remote-content policy of HTML email bodies"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (overrides $REMOTEGATE_CONFIG and the default location)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Message overrides shared by `transform` and `check`.
#[derive(clap::Args)]
struct MessageArgs {
    /// `.eml` message or bare `.html` body
    path: PathBuf,

    /// Render as the print view (always loads remote content)
    #[arg(long)]
    print: bool,

    /// Prior per-message decision: unset, shown, hidden
    #[arg(long, value_name = "STATE", value_parser = parse_show_images)]
    show_images: Option<ShowImages>,

    /// Override the sender (e.g. "Name <user@example.com>")
    #[arg(long, value_name = "ADDR")]
    sender: Option<String>,

    /// Treat the message as end-to-end encrypted
    #[arg(long)]
    encrypted: bool,

    /// Emit a JSON report instead of plain output
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply the policy and print the resulting body or injection events
    Transform {
        #[command(flatten)]
        message: MessageArgs,

        /// Render action; "user.inject" reports references instead of rewriting
        #[arg(short, long, value_name = "TAG")]
        action: Option<String>,

        /// Rewrite strategy for the automatic path: markup or dom
        #[arg(long, value_name = "STRATEGY")]
        strategy: Option<RewriteStrategy>,

        /// Write the body here instead of stdout
        #[arg(short, long, value_name = "FILE", conflicts_with = "json")]
        output: Option<PathBuf>,
    },
    /// Show the decision and the escaped references without changing anything
    Check {
        #[command(flatten)]
        message: MessageArgs,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn parse_show_images(s: &str) -> Result<ShowImages, String> {
    ShowImages::from_code(s).ok_or_else(|| format!("invalid state '{s}' (unset, shown, hidden)"))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => config::load_config_from(path),
        None => config::load_config(),
    };

    // Configure logging: stderr + optional log file
    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    match cli.command {
        Commands::Transform {
            message,
            action,
            strategy,
            output,
        } => cmd_transform(
            &config,
            &message,
            action.as_deref(),
            strategy,
            output.as_deref(),
        ),
        Commands::Check { message } => cmd_check(&config, &message),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    // Try to set up file logging
    let log_file = config::log_file_path(config);
    let log_dir = log_file.parent().unwrap_or_else(|| Path::new("."));
    let file_name = log_file.file_name().unwrap_or_else(|| "remotegate.log".as_ref());
    if std::fs::create_dir_all(log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(log_dir, file_name);
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        // Fall back to stderr only
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "remotegate", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}

/// Load the message and apply the command-line overrides.
fn load(args: &MessageArgs) -> anyhow::Result<ParsedMessage> {
    if !args.path.exists() {
        anyhow::bail!("File not found: {}", args.path.display());
    }

    let mut parsed = eml::load_message(&args.path)?;
    if let Some(raw) = &args.sender {
        parsed.message.sender = Sender::parse(raw);
    }
    if args.encrypted {
        parsed.message.is_encrypted = true;
    }
    if let Some(state) = args.show_images {
        parsed.message.show_images = state;
    }
    Ok(parsed)
}

fn view(args: &MessageArgs) -> View {
    if args.print {
        View::Printer
    } else {
        View::Message
    }
}

/// Apply the policy and print the body or the injection events.
fn cmd_transform(
    config: &Config,
    args: &MessageArgs,
    action: Option<&str>,
    strategy: Option<RewriteStrategy>,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let ParsedMessage {
        mut html,
        mut message,
    } = load(args)?;

    let mut transformer = RemoteContentTransformer::from_config(config);
    if let Some(strategy) = strategy {
        transformer = transformer.with_strategy(strategy);
    }

    let options = TransformOptions::new(action.map(Action::parse), view(args));
    let mut events: Vec<RemoteInjected> = Vec::new();
    let outcome = transformer.transform(
        &mut html,
        &mut message,
        &options,
        &mut |event: RemoteInjected| events.push(event),
    )?;

    tracing::info!(
        path = %args.path.display(),
        show = outcome.decision.show,
        matches = outcome.matches,
        events = events.len(),
        "Transformed message"
    );

    if args.json {
        let envelopes: Vec<_> = events.iter().map(RemoteInjected::envelope).collect();
        let report = serde_json::json!({
            "outcome": outcome,
            "message": message,
            "events": envelopes,
            "html": html.inner_html(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if matches!(options.action, Some(Action::UserInject)) {
        for event in &events {
            println!("{}", serde_json::to_string(&event.envelope())?);
        }
        return Ok(());
    }

    match output {
        Some(path) => {
            std::fs::write(path, html.inner_html())?;
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{}", html.inner_html()),
    }
    Ok(())
}

/// Print the decision and every escaped reference, read-only.
fn cmd_check(config: &Config, args: &MessageArgs) -> anyhow::Result<()> {
    let ParsedMessage { html, message } = load(args)?;

    let transformer = RemoteContentTransformer::from_config(config);
    let decision = transformer.policy().decide(&message, view(args));
    let found: Vec<_> = pattern::find_iter(html.inner_html()).collect();

    if args.json {
        let references: Vec<_> = found
            .iter()
            .map(|m| serde_json::json!({ "offset": m.start, "attribute": m.text }))
            .collect();
        let report = serde_json::json!({
            "sender": message.sender.address,
            "encrypted": message.is_encrypted,
            "showImages": message.show_images,
            "decision": decision,
            "references": references,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let sender = if message.sender.is_unknown() {
        "(unknown)".to_string()
    } else {
        message.sender.to_string()
    };
    println!("{:<14} {}", "Sender:", sender);
    println!("{:<14} {}", "Encrypted:", if message.is_encrypted { "yes" } else { "no" });
    println!("{:<14} {}", "Show images:", message.show_images);
    match decision.grant {
        Some(grant) => println!("{:<14} yes ({grant:?})", "Remote:"),
        None => println!("{:<14} no", "Remote:"),
    }
    println!("{:<14} {}", "References:", found.len());
    for m in &found {
        println!("  @{:<8} {}", m.start, m.text);
    }
    Ok(())
}
