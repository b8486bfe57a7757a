//! Command dispatch: one function per subcommand

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use colored::Colorize;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, instrument};

use crate::application::services::LayoutOverrides;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{Hover, Mark, RecordView, TreeNodeConvert};
use crate::infrastructure::{InfraResult, ServiceContainer};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see `sse --help`".to_string(),
        ));
    };

    // commands that need no settings
    match command {
        Commands::Completion { shell } => return completion(*shell),
        Commands::Config {
            command: ConfigCommands::Template,
        } => {
            output::info(&Settings::template());
            return Ok(());
        }
        _ => {}
    }

    let settings = Settings::load(cli.corpus_dir.as_deref())?;
    debug!(corpus_dir = %settings.corpus_dir.display(), "settings loaded");
    let container = ServiceContainer::new(settings)?;

    match command {
        Commands::Config { command } => config(&container, command),
        Commands::Check { file } => check(&container, file),
        Commands::CheckDir { dir } => check_dir(&container, dir),
        Commands::Tree { file } => tree(&container, file),
        Commands::Json { file } => json_records(&container, file),
        Commands::Layout {
            file,
            cap,
            bar_height,
        } => layout(
            &container,
            file,
            LayoutOverrides {
                word_cap: *cap,
                bar_height: *bar_height,
            },
        ),
        Commands::Excerpt { file } => excerpt(&container, file),
        Commands::Meta { file } => meta(&container, file),
        Commands::Hover {
            file,
            record,
            node,
            word,
        } => hover(&container, file, *record, *node, *word),
        Commands::Completion { .. } => Ok(()),
    }
}

fn to_json(value: &impl Serialize) -> InfraResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}

fn config(container: &ServiceContainer, command: &ConfigCommands) -> CliResult<()> {
    let settings = &container.settings;
    match command {
        ConfigCommands::Show => {
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            let describe = |path: &Path| {
                if container.fs.exists(path) {
                    format!("{} (exists)", path.display())
                } else {
                    format!("{} (not found)", path.display())
                }
            };
            match global_config_path() {
                Some(path) => output::action("Global", &describe(&path)),
                None => output::action("Global", &"(no config directory)"),
            }
            output::action("Local", &describe(&local_config_path(&settings.corpus_dir)));
        }
        ConfigCommands::Template => output::info(&Settings::template()),
    }
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn check(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    let corpus = container.corpus.load(file)?;
    output::success(&format!(
        "{}: {} records",
        corpus.path.display(),
        corpus.records.len()
    ));
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn check_dir(container: &ServiceContainer, dir: &Path) -> CliResult<()> {
    let checks = container.corpus.check_dir(dir)?;
    output::header(&format!("Checking {} files", checks.len()));

    let mut failed = 0;
    for check in &checks {
        match &check.result {
            Ok(n) => output::success_detail(&format!("{} ({n} records)", check.path.display())),
            Err(e) => {
                failed += 1;
                output::failure(&check.path.display());
                for line in e.to_string().lines() {
                    output::detail(&format!("  {line}"));
                }
            }
        }
    }

    if failed > 0 {
        return Err(CliError::Failures {
            failed,
            total: checks.len(),
        });
    }
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn tree(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    let corpus = container.corpus.load(file)?;
    for (i, record) in corpus.records.iter().enumerate() {
        output::header(&format!("[{}] line {}: {}", i + 1, record.line, record.sentence.trim()));
        output::info(&record.tree.to_tree_string());
        output::detail(&format!(
            "{} tagged nodes, depth {}",
            record.tree.tagged_count(),
            record.tree.max_level()
        ));
    }
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn json_records(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    let corpus = container.corpus.load(file)?;
    let views: Vec<RecordView> = corpus.records.iter().map(RecordView::from).collect();
    output::info(&to_json(&views)?);
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn layout(container: &ServiceContainer, file: &Path, overrides: LayoutOverrides) -> CliResult<()> {
    if let Some(h) = overrides.bar_height {
        if !h.is_finite() || h <= 0.0 {
            return Err(CliError::InvalidArgs(format!(
                "--bar-height must be positive, got {h}"
            )));
        }
    }
    let corpus = container.corpus.load(file)?;
    let cap = corpus.effective_word_cap(
        overrides
            .word_cap
            .unwrap_or(container.corpus.layout_config().word_cap),
    );
    let results = container.corpus.layout(&corpus, overrides)?;

    let mut failed = 0;
    let entries: Vec<_> = corpus
        .records
        .iter()
        .zip(&results)
        .map(|(record, result)| match result {
            Ok(model) => json!({ "line": record.line, "layout": model }),
            Err(e) => {
                failed += 1;
                json!({ "line": record.line, "error": e.to_string() })
            }
        })
        .collect();
    let doc = json!({ "wordCap": cap, "records": entries });
    output::info(&to_json(&doc)?);

    if failed > 0 {
        output::warning(&format!("{failed} records could not be laid out"));
    }
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn excerpt(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    let corpus = container.corpus.load(file)?;
    for paragraph in container.corpus.excerpt(&corpus) {
        output::info(&paragraph);
    }
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn meta(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    let source = container.corpus.read_source(file)?;
    if source.metadata.is_empty() {
        output::warning(&"no metadata header");
    }
    for (key, value) in &source.metadata {
        output::action(key, value);
    }
    if source.original.is_some() {
        output::detail(&"(original text attached)");
    }
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn hover(
    container: &ServiceContainer,
    file: &Path,
    record: usize,
    node: Option<u64>,
    word: Option<usize>,
) -> CliResult<()> {
    let corpus = container.corpus.load(file)?;
    let view = container.corpus.hover(&corpus, record, node, word)?;
    output::info(&render_hover(&view));
    if !view.comment.is_empty() {
        output::detail(&view.comment);
    }
    Ok(())
}

/// Sentence with the hovered subtree emphasised and its marked runs styled.
fn render_hover(view: &Hover) -> String {
    let mut out = view.before.dimmed().to_string();
    for segment in &view.segments {
        let styled = match segment.mark {
            Mark::None => segment.text.green(),
            Mark::Child => segment.text.green().bold(),
            Mark::Cursor => segment.text.green().underline(),
        };
        out.push_str(&styled.to_string());
    }
    out.push_str(&view.after.dimmed().to_string());
    out
}
