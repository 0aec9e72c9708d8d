//! `endevor sync classify|run`: reconcile the result of a workspace sync.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;

use endevor_core::{
    store,
    utils::{edit_root_folder_path, format_with_new_lines, parse_file_path},
};
use endevor_sync::{
    classify_plain_response, classify_sync_response, load_response, parse_response,
    with_timeout, ExternalWorkspaceResponse, WorkspaceResponse, WorkspaceResponseStatus,
    WorkspaceSyncResponse,
};

/// Classify the result of a workspace sync.
#[derive(Subcommand, Debug)]
pub enum SyncCommand {
    /// Classify a saved sync result (JSON). Use `-` to read stdin.
    Classify(ClassifyArgs),

    /// Run an external sync program and classify the JSON it prints.
    Run(RunArgs),
}

#[derive(Args, Debug)]
pub struct OutputArgs {
    /// Report only the overall status and messages, ignoring element actions.
    #[arg(long)]
    pub plain: bool,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,

    /// Workspace root. Element files under its edit folder are shown relative
    /// to that folder.
    #[arg(long, value_name = "DIR")]
    pub workspace: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Path of the sync result, or `-` for stdin.
    pub input: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Seconds to wait for the program. Defaults to `sync_timeout_secs` from settings.
    #[arg(long)]
    pub timeout: Option<u64>,

    #[command(flatten)]
    pub output: OutputArgs,

    /// Program and arguments, after `--`.
    #[arg(last = true, required = true, num_args = 1..)]
    pub command: Vec<String>,
}

pub fn run(cmd: SyncCommand) -> Result<()> {
    match cmd {
        SyncCommand::Classify(args) => {
            let external = read_input(&args.input)?;
            report(&external, &args.output)
        }
        SyncCommand::Run(args) => {
            let external = run_program(&args)?;
            report(&external, &args.output)
        }
    }
}

fn read_input(input: &Path) -> Result<ExternalWorkspaceResponse> {
    if input.as_os_str() == "-" {
        let mut json = String::new();
        std::io::stdin()
            .read_to_string(&mut json)
            .context("failed to read sync result from stdin")?;
        return parse_response(&json).context("failed to decode sync result from stdin");
    }
    load_response(input).with_context(|| format!("failed to load sync result {}", input.display()))
}

fn run_program(args: &RunArgs) -> Result<ExternalWorkspaceResponse> {
    let timeout = match args.timeout {
        Some(secs) => Duration::from_secs(secs),
        None => Duration::from_secs(
            store::load_settings()
                .context("failed to load settings")?
                .sync_timeout_secs,
        ),
    };
    let (program, program_args) = args
        .command
        .split_first()
        .context("provide the sync program after `--`")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let output = runtime.block_on(async {
        let mut command = tokio::process::Command::new(program);
        command.args(program_args).kill_on_drop(true);
        with_timeout(timeout, command.output()).await
    });

    let output = match output {
        Ok(result) => result.with_context(|| format!("failed to run '{program}'"))?,
        Err(timed_out) => bail!("sync program '{program}' did not finish: {timed_out}"),
    };
    tracing::debug!(status = %output.status, "sync program exited");

    let stdout = String::from_utf8_lossy(&output.stdout);
    if stdout.trim().is_empty() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "sync program '{program}' exited with {} and printed no result{}",
            output.status,
            format_with_new_lines(&stderr.lines().collect::<Vec<_>>())
        );
    }
    parse_response(&stdout).with_context(|| format!("failed to decode output of '{program}'"))
}

fn report(external: &ExternalWorkspaceResponse, output: &OutputArgs) -> Result<()> {
    if output.plain {
        let response = classify_plain_response(external);
        print_plain(&response, output.json)?;
        return finish(response.status);
    }
    let response = classify_sync_response(external);
    let edit_root = match &output.workspace {
        Some(workspace) => {
            let settings = store::load_settings().context("failed to load settings")?;
            Some(edit_root_folder_path(workspace, &settings.edit_folder))
        }
        None => None,
    };
    print_sync(&response, output.json, edit_root.as_deref())?;
    finish(response.status())
}

/// Fail the process when the user has to act on the outcome.
fn finish(status: WorkspaceResponseStatus) -> Result<()> {
    match status {
        WorkspaceResponseStatus::Error => bail!("workspace sync finished with errors"),
        WorkspaceResponseStatus::Conflict => {
            bail!("workspace sync needs manual merges before it can complete")
        }
        WorkspaceResponseStatus::NoChanges
        | WorkspaceResponseStatus::Success
        | WorkspaceResponseStatus::Warning => Ok(()),
    }
}

fn print_plain(response: &WorkspaceResponse, json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(response).context("failed to serialize response")?
        );
        return Ok(());
    }
    println!("{}", headline(response.status));
    print_messages(&response.messages);
    Ok(())
}

fn print_sync(
    response: &WorkspaceSyncResponse,
    json: bool,
    edit_root: Option<&Path>,
) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(response).context("failed to serialize response")?
        );
        return Ok(());
    }

    println!("{}", headline(response.status()));
    print_messages(response.messages());
    match response {
        WorkspaceSyncResponse::Conflict {
            conflict_details, ..
        } => {
            if !conflict_details.is_empty() {
                println!("Manual merge required:");
            }
            for detail in conflict_details {
                println!(
                    "  ⇄  {}  {}",
                    detail.element,
                    file_label(&detail.file_uri, edit_root)
                );
            }
        }
        WorkspaceSyncResponse::Error { error_details, .. } => {
            if !error_details.is_empty() {
                println!("Failed elements:");
            }
            for detail in error_details {
                println!(
                    "  ✗  {} {}  {}",
                    detail.operation,
                    detail.element,
                    file_label(&detail.file_uri, edit_root)
                );
                for message in &detail.error_messages {
                    println!("       {}", message.trim());
                }
            }
        }
        WorkspaceSyncResponse::NoChanges { .. }
        | WorkspaceSyncResponse::Success { .. }
        | WorkspaceSyncResponse::Warning { .. } => {}
    }
    Ok(())
}

/// `NAME.ext in <dir>`, with `<dir>` relative to the edit folder when it lies
/// inside it.
fn file_label(file: &Path, edit_root: Option<&Path>) -> String {
    let parsed = parse_file_path(file);
    let dir = edit_root
        .and_then(|root| parsed.path.strip_prefix(root).ok())
        .unwrap_or(parsed.path.as_path());
    format!(
        "{}{} in {}",
        parsed.file_name,
        parsed.file_extension.as_deref().unwrap_or_default(),
        dir.display()
    )
}

fn print_messages(messages: &[String]) {
    for message in messages {
        println!("  {message}");
    }
}

fn headline(status: WorkspaceResponseStatus) -> String {
    match status {
        WorkspaceResponseStatus::NoChanges => format!("{} nothing to sync", "✓".bright_black()),
        WorkspaceResponseStatus::Success => format!("{} workspace synced", "✓".green().bold()),
        WorkspaceResponseStatus::Warning => {
            format!("{} workspace synced with warnings", "!".yellow().bold())
        }
        WorkspaceResponseStatus::Conflict => {
            format!("{} workspace has unresolved conflicts", "⇄".magenta().bold())
        }
        WorkspaceResponseStatus::Error => format!("{} workspace sync failed", "✗".red().bold()),
    }
}
