mod commands;
mod core;
mod publish;
mod release;
mod ui;
mod utils;

use clap::{Parser, Subcommand};
use core::error::{SlipError, print_error};

/// Push-button releases and staging publishes for managed-runtime projects
#[derive(Parser)]
#[command(name = "slipway")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Initialize slipway configuration for a project
  Init {
    /// Overwrite an existing slipway.toml
    #[arg(long)]
    force: bool,
  },

  /// Run the release sequence (clean-tree check, push, release tool, push)
  Release {
    /// Show the sequence without executing anything
    #[arg(long)]
    dry_run: bool,
    /// Additional arguments forwarded verbatim to the release tool
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    tool_args: Vec<String>,
  },

  /// Run the CI publish pipeline (build and upload to the staging index)
  Publish {
    /// Output the run report in JSON format
    #[arg(long)]
    json: bool,
    /// Show the pipeline without executing anything
    #[arg(long)]
    dry_run: bool,
  },
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn main() {
  let cli = Cli::parse();

  let exec = core::exec::SystemExec;

  let start_dir = match std::env::current_dir() {
    Ok(dir) => dir,
    Err(e) => {
      eprintln!("Error: Failed to get current directory: {}", e);
      std::process::exit(core::error::ExitCode::System.as_i32());
    }
  };

  // init must work outside a repository too; fall back to the current
  // directory as the project root when there is no working tree to resolve
  let ctx = match core::context::ProjectContext::build(&exec, &start_dir) {
    Ok(ctx) => ctx,
    Err(e) => {
      if matches!(cli.command, Commands::Init { .. }) {
        core::context::ProjectContext {
          root: start_dir,
          config: None,
        }
      } else {
        handle_error(e);
      }
    }
  };

  let result = match cli.command {
    Commands::Init { force } => commands::run_init(&ctx, force),
    Commands::Release { dry_run, tool_args } => commands::run_release(&ctx, &exec, tool_args, dry_run),
    Commands::Publish { json, dry_run } => commands::run_publish(&ctx, &exec, json, dry_run),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: SlipError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
