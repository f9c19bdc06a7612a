//! pawz-journal - command-line front end for the OpenPawz memory journal
//!
//! Runs agent tool commands, user edits and every history/integrity
//! operation against a SQLite-backed project.

mod cli;
mod output;

use clap::{CommandFactory, Parser};
use cli::{Cli, Commands, ContentArgs};
use log::{debug, error};
use openpawz_journal::atoms::constants::MEMORY_ROOT;
use openpawz_journal::{
    EditOutcome, EngineError, EngineResult, JournalConfig, MemoryJournal, RollbackOutcome, SqliteMemoryStore,
    ToolCommand,
};
use std::io::Read;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!("{}", e);
        eprintln!("pawz-journal: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> EngineResult<()> {
    let config = match &cli.config {
        Some(path) => JournalConfig::load_or_default(path)?,
        None => JournalConfig::load_default()?,
    };

    let level = if cli.verbose { "debug" } else { config.log_level.as_str() };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "pawz-journal", &mut std::io::stdout());
        return Ok(());
    }

    let db_path = cli.db.clone().unwrap_or_else(|| config.resolved_db_path());
    let project = cli.project.clone().unwrap_or_else(|| config.default_project.clone());
    debug!("[cli] db={:?} project={}", db_path, project);

    let store = Arc::new(SqliteMemoryStore::open(&db_path)?);
    let journal = MemoryJournal::new(store).with_replay_warnings_logged(config.surface_delete_warnings);
    let json = cli.json;

    match cli.command {
        Commands::View { path, range } => {
            let view_range = match range.as_deref() {
                Some([start, end]) => Some([*start, *end]),
                Some(_) => return Err("--range takes START and END".into()),
                None => None,
            };
            let path = path.unwrap_or_else(|| MEMORY_ROOT.to_string());
            run_tool(&journal, &project, ToolCommand::View { path, view_range }, json).await
        }
        Commands::Create { path, content } => {
            let file_text = read_content(content)?;
            run_tool(&journal, &project, ToolCommand::Create { path, file_text }, json).await
        }
        Commands::StrReplace { path, old, new } => {
            run_tool(&journal, &project, ToolCommand::StrReplace { path, old_str: old, new_str: new }, json).await
        }
        Commands::Insert { path, line, text } => {
            run_tool(
                &journal,
                &project,
                ToolCommand::Insert { path, insert_line: line, insert_text: text },
                json,
            )
            .await
        }
        Commands::Delete { path } => run_tool(&journal, &project, ToolCommand::Delete { path }, json).await,
        Commands::Rename { old_path, new_path } => {
            run_tool(&journal, &project, ToolCommand::Rename { old_path, new_path }, json).await
        }

        Commands::Edit { path, content } => {
            let text = read_content(content)?;
            let outcome = journal.user_edit(&project, &path, &text).await?;
            if json {
                return Ok(output::print_json(&outcome)?);
            }
            match outcome {
                EditOutcome::Saved { version } => println!("Saved {} (version {})", path, version),
                EditOutcome::Unchanged => println!("{} unchanged; nothing journaled", path),
            }
            Ok(())
        }
        Commands::Rm { path } => {
            let version = journal.user_delete(&project, &path).await?;
            if json {
                return Ok(output::print_json(&serde_json::json!({ "version": version }))?);
            }
            println!("Deleted {} (version {})", path, version);
            Ok(())
        }

        Commands::Log => {
            let history = journal.history(&project).await?;
            if json {
                return Ok(output::print_json(&history)?);
            }
            output::print_history(&history);
            Ok(())
        }
        Commands::Show { version, path } => {
            let diff = journal.inspect_version(&project, version, &path).await?;
            if json {
                return Ok(output::print_json(&diff)?);
            }
            output::print_version_diff(&diff);
            Ok(())
        }
        Commands::Cat { version, path } => {
            let replay = journal.snapshot_at(&project, version).await?;
            if let Some(path) = path {
                let content = replay
                    .fs
                    .content(&path)
                    .ok_or_else(|| EngineError::FileNotPresentAtVersion { path: path.clone(), version })?;
                if json {
                    return Ok(output::print_json(&replay.fs.get(&path))?);
                }
                println!("{}", content);
                return Ok(());
            }
            if json {
                return Ok(output::print_json(&replay)?);
            }
            output::print_snapshot(version, &replay);
            Ok(())
        }
        Commands::Rollback { path, version } => {
            let outcome = journal.rollback_file(&project, &path, version).await?;
            if json {
                return Ok(output::print_json(&outcome)?);
            }
            match outcome {
                RollbackOutcome::RolledBack { version: new_version } => {
                    println!("Restored {} to version {} (now version {})", path, version, new_version)
                }
                RollbackOutcome::Unchanged => println!("{} already matches version {}", path, version),
            }
            Ok(())
        }

        Commands::Verify { repair, yes } => {
            let report = journal.verify(&project).await?;
            if !repair || report.is_consistent() {
                if json {
                    return Ok(output::print_json(&report)?);
                }
                output::print_verify(&report);
                return Ok(());
            }
            if !yes {
                output::print_verify(&report);
                println!("Re-run with --repair --yes to overwrite live memory with the journal replay.");
                return Ok(());
            }
            let repaired = journal.restore_from_journal(&project, &report).await?;
            if json {
                return Ok(output::print_json(&repaired)?);
            }
            println!("Repaired {} path(s):", repaired.total());
            output::print_fs_diff(&repaired);
            Ok(())
        }
        Commands::Clear { yes } => {
            if !yes && !json {
                println!("This deletes all memory and history for project {}. Re-run with --yes.", project);
            }
            let cleared = journal.clear_all(&project, yes).await?;
            if cleared && !json {
                println!("Cleared project {}", project);
            } else if json {
                output::print_json(&serde_json::json!({ "cleared": cleared }))?;
            }
            Ok(())
        }

        Commands::Completions { .. } => Ok(()),
    }
}

async fn run_tool(
    journal: &MemoryJournal<SqliteMemoryStore>,
    project: &str,
    command: ToolCommand,
    json: bool,
) -> EngineResult<()> {
    let outcome = journal.apply_command(project, command).await?;
    if json {
        return Ok(output::print_json(&outcome)?);
    }
    if outcome.is_error {
        return Err(EngineError::tool("memory", outcome.content));
    }
    println!("{}", outcome.content);
    Ok(())
}

fn read_content(args: ContentArgs) -> EngineResult<String> {
    if let Some(text) = args.text {
        return Ok(text);
    }
    if let Some(path) = args.file {
        return Ok(std::fs::read_to_string(path)?);
    }
    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}
