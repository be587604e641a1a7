mod commands;
mod error;
mod util;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

use crate::commands::{categories, stories, tags, tasks, users, Context};
use crate::error::{exit_code_for, not_found, report_error};
use fictag_config as config;
use fictag_store::{paths, Store};

#[derive(Debug, Parser)]
#[command(name = "fictag", version, about = "fictag CLI")]
struct Cli {
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    json: bool,
    #[arg(long, short, global = true)]
    verbose: bool,
    /// Act as this user
    #[arg(long = "as", global = true, value_name = "USERNAME")]
    actor: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(subcommand)]
    User(users::UserCommand),
    #[command(subcommand)]
    Category(categories::CategoryCommand),
    #[command(subcommand)]
    Story(stories::StoryCommand),
    #[command(subcommand)]
    Tag(tags::TagCommand),
    #[command(subcommand)]
    Tasks(tasks::TaskCommand),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    init_logging(verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, verbose);
            exit_code_for(&err)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        db_path,
        config: config_path,
        json,
        verbose,
        actor,
        command,
    } = cli;

    let app_config = config::load(config_path.clone()).with_context(|| "load config")?;
    if verbose {
        match config::resolve_config_path(config_path) {
            Ok(path) => {
                if path.exists() {
                    debug!(path = %path.display(), "config resolved");
                } else {
                    debug!(path = %path.display(), "config missing, using defaults");
                }
            }
            Err(err) => {
                debug!(error = %err, "config unavailable");
            }
        }
    }
    let db_path = paths::resolve_db_path(db_path).with_context(|| "resolve database path")?;
    debug!(path = %db_path.display(), "database path resolved");

    let store = Store::open(&db_path)
        .with_context(|| format!("open database {}", db_path.display()))?;
    store.migrate().with_context(|| "run migrations")?;

    let actor = match actor {
        Some(username) => Some(
            store
                .users()
                .get_by_username(&username)?
                .ok_or_else(|| not_found(format!("user {username}")))?,
        ),
        None => None,
    };

    let ctx = Context {
        store: &store,
        json,
        config: &app_config,
        actor: actor.as_ref(),
    };

    match command {
        Command::User(cmd) => match cmd {
            users::UserCommand::Add(args) => users::add_user(&ctx, args),
            users::UserCommand::Ls(args) => users::list_users(&ctx, args),
        },
        Command::Category(cmd) => match cmd {
            categories::CategoryCommand::Add(args) => categories::add_category(&ctx, args),
            categories::CategoryCommand::Ls(args) => categories::list_categories(&ctx, args),
        },
        Command::Story(cmd) => match cmd {
            stories::StoryCommand::Add(args) => stories::add_story(&ctx, args),
            stories::StoryCommand::Publish(args) => stories::publish_story(&ctx, args),
            stories::StoryCommand::Tags(args) => stories::show_story_tags(&ctx, args),
            stories::StoryCommand::SetTags(args) => stories::set_story_tags(&ctx, args),
            stories::StoryCommand::Log(args) => stories::story_log(&ctx, args),
        },
        Command::Tag(cmd) => match cmd {
            tags::TagCommand::Add(args) => tags::add_tag(&ctx, args),
            tags::TagCommand::Edit(args) => tags::edit_tag(&ctx, args),
            tags::TagCommand::Rm(args) => tags::remove_tag(&ctx, args),
            tags::TagCommand::Show(args) => tags::show_tag(&ctx, args),
            tags::TagCommand::Ls(args) => tags::list_tags(&ctx, args),
            tags::TagCommand::Search(args) => tags::search_tags(&ctx, args),
            tags::TagCommand::Resolve(args) => tags::resolve_tags(&ctx, args),
            tags::TagCommand::Aliases(args) => tags::list_aliases(&ctx, args),
            tags::TagCommand::Recount(args) => tags::recount_tags(&ctx, args),
        },
        Command::Tasks(cmd) => match cmd {
            tasks::TaskCommand::Ls(args) => tasks::list_tasks(&ctx, args),
        },
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
}
