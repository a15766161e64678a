use super::render::{
    print_messages, render_config, render_intake, render_listing, render_summary, render_tree,
};
use super::setup::{Cli, Commands, EditArgs, ExportCommand, FolderCommand, StructureCommand};
use clap::Parser;
use directories::ProjectDirs;
use docket::api::{
    CmdResult, ConfigAction, DocketApi, DocketPaths, FolderAction, IncomingFile, Intent,
};
use docket::config::DocketConfig;
use docket::error::{DocketError, Result};
use docket::intake::{RecordedResult, RecordedResults};
use docket::model::{EntryPatch, MetaPatch};
use docket::store::fs::FileStore;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const HOME_ENV: &str = "DOCKET_HOME";

struct AppContext {
    api: DocketApi<FileStore>,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let mut ctx = init_context()?;

    match cli.command {
        Commands::Tree { all } => handle_tree(&ctx, all),
        Commands::Folder(cmd) => handle_folder(&mut ctx, cmd),
        Commands::Structure(cmd) => handle_structure(&mut ctx, cmd),
        Commands::Upload { node, files } => handle_upload(&mut ctx, node, files),
        Commands::Classify { results } => handle_classify(&mut ctx, results),
        Commands::List => handle_list(&ctx),
        Commands::Edit(args) => handle_edit(&mut ctx, args),
        Commands::Remove { indexes, all, yes } => handle_remove(&mut ctx, indexes, all, yes),
        Commands::Finalize => handle_finalize(&mut ctx),
        Commands::Summary => handle_summary(&ctx),
        Commands::Export(cmd) => handle_export(&ctx, cmd),
        Commands::Reset { hard, yes } => handle_reset(&mut ctx, hard, yes),
        Commands::Config { key, value } => handle_config(&mut ctx, key, value),
        Commands::Init => handle_init(&mut ctx),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "docket=debug" } else { "docket=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn workspace_dir() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os(HOME_ENV) {
        return Ok(PathBuf::from(home));
    }
    ProjectDirs::from("com", "docket", "docket")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| {
            DocketError::Store(format!(
                "Could not determine a data directory; set {}",
                HOME_ENV
            ))
        })
}

fn init_context() -> Result<AppContext> {
    let root = workspace_dir()?;
    debug!(workspace = %root.display(), "using workspace");
    let config = DocketConfig::load(&root)?;
    let store = FileStore::new(root.clone());
    let api = DocketApi::new(store, DocketPaths { root }, config);
    Ok(AppContext { api })
}

fn intent(yes: bool) -> Intent {
    if yes {
        Intent::Confirmed
    } else {
        Intent::Preview
    }
}

/// Prints the preview messages plus a hint on how to go ahead.
fn print_preview(result: &CmdResult, intent: Intent) {
    print_messages(&result.messages);
    if intent == Intent::Preview && !result.messages.is_empty() {
        println!("Re-run with --yes to proceed.");
    }
}

fn read_incoming(path: &Path) -> Result<IncomingFile> {
    let bytes = fs::read(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| DocketError::Api(format!("Not a file: {}", path.display())))?;
    Ok(IncomingFile { file_name, bytes })
}

/// Writes `contents` to `path`, or prints it when no path is given.
fn emit(contents: &str, path: Option<PathBuf>) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(&path, contents)?;
            println!("Wrote {}", path.display());
        }
        None => println!("{}", contents),
    }
    Ok(())
}

fn handle_tree(ctx: &AppContext, all: bool) -> Result<()> {
    let result = ctx.api.tree(all)?;
    print!("{}", render_tree(&result.tree));
    print_messages(&result.messages);
    Ok(())
}

fn handle_folder(ctx: &mut AppContext, cmd: FolderCommand) -> Result<()> {
    let (action, intent) = match cmd {
        FolderCommand::Add { parent, name } => (FolderAction::Add { parent, name }, None),
        FolderCommand::Rename { id, name } => (FolderAction::Rename { id, name }, None),
        FolderCommand::Remove { id, yes } => (
            FolderAction::Remove {
                id,
                intent: intent(yes),
            },
            Some(intent(yes)),
        ),
        FolderCommand::Up { id } => (FolderAction::Up(id), None),
        FolderCommand::Down { id } => (FolderAction::Down(id), None),
        FolderCommand::Toggle { id } => (FolderAction::Toggle(id), None),
    };
    let result = ctx.api.folders(action)?;
    match intent {
        Some(intent) => print_preview(&result, intent),
        None => print_messages(&result.messages),
    }
    Ok(())
}

fn handle_structure(ctx: &mut AppContext, cmd: StructureCommand) -> Result<()> {
    match cmd {
        StructureCommand::Export { file } => {
            let result = ctx.api.export_structure()?;
            if let Some(json) = &result.output {
                emit(json, file)?;
            }
            print_messages(&result.messages);
        }
        StructureCommand::Import { file } => {
            let json = fs::read_to_string(&file)?;
            let result = ctx.api.import_structure(&json)?;
            print_messages(&result.messages);
        }
    }
    Ok(())
}

fn handle_upload(ctx: &mut AppContext, node: String, files: Vec<PathBuf>) -> Result<()> {
    let incoming = files
        .iter()
        .map(|p| read_incoming(p))
        .collect::<Result<Vec<_>>>()?;
    let result = ctx.api.upload(&node, incoming, None)?;
    print_messages(&result.messages);
    Ok(())
}

/// Replays recorded OCR and classifier output. Each record's `file` is read
/// relative to the directory of the results file.
fn handle_classify(ctx: &mut AppContext, results: PathBuf) -> Result<()> {
    let records: Vec<RecordedResult> = serde_json::from_str(&fs::read_to_string(&results)?)?;
    let base = results.parent().unwrap_or_else(|| Path::new("."));
    let incoming = records
        .iter()
        .map(|r| read_incoming(&base.join(&r.file)))
        .collect::<Result<Vec<_>>>()?;

    let recorded = RecordedResults::new(records);
    let result = ctx.api.classify(incoming, &recorded, &recorded)?;
    if let Some(report) = &result.intake {
        print!("{}", render_intake(report));
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_list(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.list()?;
    print!(
        "{}",
        render_listing(&result.listed_entries, &result.listed_documents)
    );
    print_messages(&result.messages);
    Ok(())
}

fn handle_edit(ctx: &mut AppContext, args: EditArgs) -> Result<()> {
    let patch = EntryPatch {
        node_id: args.node,
        meta: MetaPatch {
            title: args.title,
            issuer: args.issuer,
            number: args.number,
            date: args.date,
        },
    };
    let result = ctx.api.edit(&args.index, patch)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_remove(ctx: &mut AppContext, indexes: Vec<String>, all: bool, yes: bool) -> Result<()> {
    if all {
        let result = ctx.api.remove_all(intent(yes))?;
        print_preview(&result, intent(yes));
        return Ok(());
    }
    if indexes.is_empty() {
        return Err(DocketError::Api(
            "Give the indexes to remove, or --all".to_string(),
        ));
    }
    let result = ctx.api.remove(&indexes)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_finalize(ctx: &mut AppContext) -> Result<()> {
    let result = ctx.api.finalize()?;
    for doc in &result.affected_documents {
        println!("{:<16}{}", doc.code, doc.file_name);
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_summary(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.summary()?;
    print!("{}", render_summary(&result.summary));
    print_messages(&result.messages);
    Ok(())
}

fn handle_export(ctx: &AppContext, cmd: ExportCommand) -> Result<()> {
    let result = match cmd {
        ExportCommand::Archive { output } => ctx.api.export_archive(output)?,
        ExportCommand::Manifest { output } => {
            let result = ctx.api.export_manifest()?;
            if let Some(json) = &result.output {
                emit(json, output)?;
            }
            result
        }
    };
    print_messages(&result.messages);
    Ok(())
}

fn handle_reset(ctx: &mut AppContext, hard: bool, yes: bool) -> Result<()> {
    let result = if hard {
        ctx.api.hard_reset(intent(yes))?
    } else {
        ctx.api.reset(intent(yes))?
    };
    print_preview(&result, intent(yes));
    Ok(())
}

fn handle_config(ctx: &mut AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(k), None) => ConfigAction::ShowKey(k),
        (Some(k), Some(v)) => ConfigAction::Set(k, v),
    };
    let show_all = matches!(action, ConfigAction::ShowAll);
    let result = ctx.api.config(action)?;
    if show_all {
        if let Some(config) = &result.config {
            print!("{}", render_config(config));
        }
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_init(ctx: &mut AppContext) -> Result<()> {
    let result = ctx.api.init()?;
    print_messages(&result.messages);
    Ok(())
}
