use clap::Parser;
use directories::ProjectDirs;
use servingctl::api::{self, ServiceInput, ServingApi};
use servingctl::client::gitops::GitOpsClient;
use servingctl::commands::config::ConfigAction;
use servingctl::commands::CmdResult;
use servingctl::config::{OutputFormat, ServingConfig};
use servingctl::error::{Result, ServingError};
use servingctl::logging;
use servingctl::model::Kind;
use std::path::{Path, PathBuf};

mod args;
mod print;
use args::{Cli, Commands, RevisionCommand, RouteCommand, ServiceCommand};

const CONFIG_DIR_ENV: &str = "SERVINGCTL_CONFIG_DIR";
const TARGET_ENV: &str = "SERVINGCTL_TARGET";

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

struct AppContext {
    api: ServingApi<GitOpsClient>,
    output: OutputFormat,
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(logging::select_level(cli.log_level.as_deref(), cli.verbose)?);

    let config_dir = config_dir()?;
    let settings = ServingConfig::load(&config_dir)?;
    tracing::debug!(config_dir = %config_dir.display(), "configuration loaded");

    match &cli.command {
        Commands::Config { key, value } => handle_config(&config_dir, key.clone(), value.clone()),
        Commands::Service(command) => handle_service(&cli, settings, command),
        Commands::Revision(command) => handle_revision(&cli, settings, command),
        Commands::Route(command) => handle_route(&cli, settings, command),
    }
}

fn init_context(cli: &Cli, settings: ServingConfig, all_namespaces: bool) -> Result<AppContext> {
    let namespace = if all_namespaces {
        String::new()
    } else {
        settings.resolve_namespace(cli.namespace.as_deref())
    };
    let output: OutputFormat = match &cli.output {
        Some(format) => format.parse()?,
        None => settings.output,
    };
    let root = resolve_target(cli.target.as_deref(), &settings)?;
    tracing::debug!(root = %root.display(), namespace, "using gitops mode");

    Ok(AppContext {
        api: ServingApi::new(GitOpsClient::new(namespace, root), settings),
        output,
    })
}

fn config_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    ProjectDirs::from("dev", "servingctl", "servingctl")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| ServingError::Config("could not determine config directory".into()))
}

fn resolve_target(flag: Option<&Path>, settings: &ServingConfig) -> Result<PathBuf> {
    flag.map(Path::to_path_buf)
        .or_else(|| std::env::var_os(TARGET_ENV).map(PathBuf::from))
        .or_else(|| settings.target.clone())
        .ok_or_else(|| {
            ServingError::Config(format!(
                "no storage root: pass --target, set {} or run `servingctl config target <DIR>`",
                TARGET_ENV
            ))
        })
}

fn handle_service(cli: &Cli, settings: ServingConfig, command: &ServiceCommand) -> Result<()> {
    let all_namespaces = matches!(
        command,
        ServiceCommand::List {
            all_namespaces: true,
            ..
        }
    );
    let ctx = init_context(cli, settings, all_namespaces)?;

    match command {
        ServiceCommand::Create {
            name,
            image,
            env,
            labels,
            force,
            wait,
        } => {
            let input = ServiceInput {
                image: Some(image.clone()),
                env: env.clone(),
                labels: labels.clone(),
            };
            let result = ctx.api.create_service(name, &input, *force, *wait)?;
            finish(&result)
        }
        ServiceCommand::Update {
            name,
            image,
            env,
            labels,
            wait,
        } => {
            let input = ServiceInput {
                image: image.clone(),
                env: env.clone(),
                labels: labels.clone(),
            };
            let result = ctx.api.update_service(name, &input, *wait)?;
            finish(&result)
        }
        ServiceCommand::Describe { name } => handle_describe(&ctx, Kind::Service, name),
        ServiceCommand::List { labels, .. } => handle_list(&ctx, Kind::Service, labels),
        ServiceCommand::Delete { names, wait } => handle_delete(&ctx, Kind::Service, names, *wait),
    }
}

fn handle_revision(cli: &Cli, settings: ServingConfig, command: &RevisionCommand) -> Result<()> {
    let all_namespaces = matches!(
        command,
        RevisionCommand::List {
            all_namespaces: true
        }
    );
    let ctx = init_context(cli, settings, all_namespaces)?;

    match command {
        RevisionCommand::List { .. } => handle_list::<String>(&ctx, Kind::Revision, &[]),
        RevisionCommand::Describe { name } => handle_describe(&ctx, Kind::Revision, name),
        RevisionCommand::Delete { names, wait } => {
            handle_delete(&ctx, Kind::Revision, names, *wait)
        }
    }
}

fn handle_route(cli: &Cli, settings: ServingConfig, command: &RouteCommand) -> Result<()> {
    let all_namespaces = matches!(
        command,
        RouteCommand::List {
            all_namespaces: true
        }
    );
    let ctx = init_context(cli, settings, all_namespaces)?;

    match command {
        RouteCommand::List { .. } => handle_list::<String>(&ctx, Kind::Route, &[]),
        RouteCommand::Describe { name } => handle_describe(&ctx, Kind::Route, name),
    }
}

fn handle_describe(ctx: &AppContext, kind: Kind, name: &str) -> Result<()> {
    let result = ctx.api.describe(kind, name)?;
    print::print_resources(&result.affected, ctx.output)?;
    Ok(())
}

fn handle_list<I: AsRef<str>>(ctx: &AppContext, kind: Kind, selectors: &[I]) -> Result<()> {
    let result = ctx.api.list(kind, selectors)?;
    if let Some(list) = &result.listed {
        print::print_list(kind, list, ctx.output)?;
    }
    finish(&result)
}

fn handle_delete(ctx: &AppContext, kind: Kind, names: &[String], wait: bool) -> Result<()> {
    let result = ctx.api.delete(kind, names, wait)?;
    finish(&result)
}

fn handle_config(config_dir: &Path, key: Option<String>, value: Option<String>) -> Result<()> {
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(key), None) => ConfigAction::ShowKey(key),
        (Some(key), Some(value)) => ConfigAction::Set(key, value),
    };
    let show_all = matches!(action, ConfigAction::ShowAll);

    let result = api::config(config_dir, action)?;
    if show_all {
        if let Some(config) = &result.config {
            print::print_config(config)?;
        }
    }
    finish(&result)
}

/// Prints the messages, then fails if any object in a multi-object command failed.
fn finish(result: &CmdResult) -> Result<()> {
    print::print_messages(&result.messages);
    result.check()
}
