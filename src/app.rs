use std::io::{BufRead, Write};
use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{error::ErrorKind, Parser};
use colored::Colorize;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::decode::{StrictDecoder, TokenGrouper};
use crate::model::{self, Feature, ModelError};
use crate::output::{self, OutputFormat};
use crate::pagination::{self, Transition};
use crate::view::{self, FeatureView, RenderOptions, SampleGroupSession};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("no input file given (pass FILE or set `input` in the config)")]
    NoInput,

    #[error("feature has no sample groups")]
    NoSampleGroups,

    #[error("sample group {index} does not exist, feature has {count}")]
    GroupOutOfRange { index: usize, count: usize },

    #[error("failed to write output: {path}: {source}")]
    WriteOutput {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("terminal i/o failed: {source}")]
    Terminal {
        #[source]
        source: std::io::Error,
    },
}

impl From<String> for AppError {
    fn from(message: String) -> Self {
        AppError::Invalid(message)
    }
}

fn status_line(tag: &str, message: &str, no_color: bool) {
    let tag = if no_color {
        tag.to_string()
    } else {
        match tag {
            "WRN" => tag.bold().yellow().to_string(),
            "ERR" => tag.bold().red().to_string(),
            _ => tag.bold().blue().to_string(),
        }
    };
    eprintln!("[{tag}] {message}");
}

pub fn report_error(err: &AppError, no_color: bool) {
    status_line("ERR", &err.to_string(), no_color);
}

fn format_kv_line(label: &str, value: &str) {
    eprintln!(":: {:<10}: {}", label, value);
}

fn format_bool(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[derive(Clone, Debug)]
struct RunConfig {
    input: PathBuf,
    output: Option<String>,
    output_format: OutputFormat,
    page_size: NonZeroUsize,
    page: usize,
    group: Option<usize>,
    show_pending: bool,
    interactive: bool,
    no_color: bool,
    verbose: u8,
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, AppError> {
    validation::validate(&args)?;

    let no_color = if args.color {
        false
    } else {
        args.no_color || cfg.no_color.unwrap_or(false)
    };

    let input = args
        .input
        .or(cfg.input)
        .map(|p| config::expand_tilde(&p))
        .ok_or(AppError::NoInput)?;

    let page_size_raw = args
        .page_size
        .or(cfg.page_size)
        .unwrap_or(pagination::DEFAULT_PAGE_SIZE);
    let page_size = NonZeroUsize::new(page_size_raw)
        .ok_or_else(|| "invalid page_size, expected positive integer".to_string())?;
    let page = args.page.or(cfg.page).unwrap_or(1).max(1);

    let output = args.output.or(cfg.output);
    let output_format_raw = args.output_format.or(cfg.output_format);
    let output_format = match output_format_raw.as_deref() {
        Some(raw) => OutputFormat::parse(raw)
            .ok_or_else(|| format!("invalid output_format '{raw}', expected text, json, or html"))?,
        None => output
            .as_deref()
            .and_then(output::infer_format_from_path)
            .unwrap_or(OutputFormat::Text),
    };

    let interactive = args.interactive || cfg.interactive.unwrap_or(false);
    if interactive && output.is_some() {
        return Err(AppError::Invalid(
            "interactive mode cannot write to an output file".to_string(),
        ));
    }

    Ok(RunConfig {
        input,
        output,
        output_format,
        page_size,
        page,
        group: args.group.or(cfg.group),
        show_pending: args
            .show_pending
            .or(cfg.show_pending)
            .unwrap_or(false),
        interactive,
        no_color,
        verbose: args.verbose,
    })
}

fn select_feature_groups(feature: &Feature, group: Option<usize>) -> Result<Feature, AppError> {
    let Some(index) = group else {
        return Ok(feature.clone());
    };
    let count = feature.sample_groups.len();
    let selected = feature
        .sample_groups
        .get(index)
        .cloned()
        .ok_or(AppError::GroupOutOfRange { index, count })?;
    Ok(Feature {
        sample_groups: vec![selected],
        ..feature.clone()
    })
}

fn build_view(feature: &Feature, run: &RunConfig) -> FeatureView {
    let options = RenderOptions {
        show_pending: run.show_pending,
    };
    view::render_feature(
        feature,
        run.page,
        run.page_size,
        &TokenGrouper::utf8(),
        options,
    )
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    Go(Transition),
    Help,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    let cmd = line.trim().to_ascii_lowercase();
    match cmd.as_str() {
        "n" | "next" | ">" => Some(Command::Go(Transition::Next)),
        "p" | "prev" | "previous" | "<" => Some(Command::Go(Transition::Previous)),
        "q" | "quit" | "exit" => Some(Command::Quit),
        "h" | "help" | "?" => Some(Command::Help),
        other => other
            .parse::<usize>()
            .ok()
            .map(|page| Command::Go(Transition::JumpTo(page))),
    }
}

const INTERACTIVE_HELP: &str = "commands: n (next), p (previous), <number> (jump), q (quit)";

fn run_interactive<D, R, W>(
    session: &mut SampleGroupSession<'_, D>,
    mut input: R,
    out: &mut W,
    color: bool,
) -> std::io::Result<()>
where
    D: StrictDecoder,
    R: BufRead,
    W: Write,
{
    write!(out, "{}", output::render_group_text(&session.view(), color))?;
    writeln!(out, "{INTERACTIVE_HELP}")?;
    let mut line = String::new();
    loop {
        write!(out, "> ")?;
        out.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }
        match parse_command(&line) {
            Some(Command::Quit) => break,
            Some(Command::Help) => writeln!(out, "{INTERACTIVE_HELP}")?,
            Some(Command::Go(transition)) => match session.apply(transition) {
                Ok(_) => write!(out, "{}", output::render_group_text(&session.view(), color))?,
                Err(e) => writeln!(out, "{e}")?,
            },
            None => writeln!(out, "unknown command '{}'; {INTERACTIVE_HELP}", line.trim())?,
        }
    }
    Ok(())
}

fn run(run: RunConfig) -> Result<(), AppError> {
    if run.no_color {
        colored::control::set_override(false);
    }

    if run.verbose > 0 {
        format_kv_line("Input", &run.input.display().to_string());
        format_kv_line("Page", &run.page.to_string());
        format_kv_line("Page size", &run.page_size.to_string());
        format_kv_line(
            "Group",
            &run.group
                .map(|g| g.to_string())
                .unwrap_or_else(|| "all".to_string()),
        );
        format_kv_line("Pending", format_bool(run.show_pending));
        format_kv_line("Output", run.output.as_deref().unwrap_or("stdout"));
        eprintln!();
    }

    let feature = model::load_feature(&run.input)?;
    if feature.sample_groups.is_empty() {
        status_line("WRN", "feature has no sample groups", run.no_color);
    }

    if run.interactive {
        let index = run.group.unwrap_or(0);
        let count = feature.sample_groups.len();
        if count == 0 {
            return Err(AppError::NoSampleGroups);
        }
        let group = feature
            .sample_groups
            .get(index)
            .ok_or(AppError::GroupOutOfRange { index, count })?;
        let mut session = SampleGroupSession::new(&feature, group, run.page_size).options(
            RenderOptions {
                show_pending: run.show_pending,
            },
        );
        let start = run.page.min(session.pager().max_page());
        session
            .apply(Transition::JumpTo(start))
            .map_err(|e| AppError::Invalid(e.to_string()))?;
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        return run_interactive(&mut session, stdin.lock(), &mut stdout, !run.no_color)
            .map_err(|source| AppError::Terminal { source });
    }

    let feature = select_feature_groups(&feature, run.group)?;
    let view = build_view(&feature, &run);

    match run.output.as_ref() {
        Some(path) => {
            let rendered = output::render(&view, run.output_format, false);
            std::fs::write(path, rendered).map_err(|source| AppError::WriteOutput {
                path: path.clone(),
                source,
            })?;
            status_line("INF", &format!("wrote {path}"), run.no_color);
        }
        None => {
            let rendered = output::render(&view, run.output_format, !run.no_color);
            let mut stdout = std::io::stdout();
            stdout
                .write_all(&rendered)
                .and_then(|_| stdout.flush())
                .map_err(|source| AppError::Terminal { source })?;
        }
    }
    Ok(())
}

pub fn run_cli() -> Result<(), AppError> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                let _ = e.print();
                return Ok(());
            }
            _ => return Err(AppError::Invalid(e.to_string())),
        },
    };

    init_tracing(args.verbose);

    if args.init_config {
        let path = match args.config.as_deref() {
            Some(p) => config::expand_tilde(p),
            None => config::default_config_path()
                .ok_or_else(|| "could not determine home directory".to_string())?,
        };
        if config::ensure_default_config_file(&path)? {
            status_line("INF", &format!("wrote {}", path.display()), args.no_color);
        } else {
            status_line(
                "WRN",
                &format!("config already exists: {}", path.display()),
                args.no_color,
            );
        }
        return Ok(());
    }

    let cfg = match args.config.as_deref() {
        Some(path) => config::load_config(&config::expand_tilde(path), false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run_cfg = build_run_config(args, cfg)?;
    tracing::debug!(?run_cfg, "resolved run config");
    run(run_cfg)
}
