use clap::{error::ErrorKind, Parser};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing_subscriber::EnvFilter;

use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::output::{self, OutputFormat};
use crate::paginator::{self, StopReason};
use crate::runner::{CollectResult, Options, Runner};

fn format_kv_line(label: &str, value: &str) {
    eprintln!(":: {:<12}: {}", label, value);
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
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,pagecollect={level}")));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Clone, Debug)]
struct RunConfig {
    options: Options,
    output: Option<String>,
    output_format: OutputFormat,
    no_color: bool,
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let origin = args
        .origin
        .or(cfg.origin)
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .ok_or_else(|| "origin is required (--origin or `origin` in config)".to_string())?;
    paginator::parse_origin(&origin).map_err(|e| e.to_string())?;

    let mut cli_paths = args.paths;
    cli_paths.extend(args.path);
    let paths = if cli_paths.iter().any(|p| !p.trim().is_empty()) {
        cli_paths
    } else {
        cfg.paths.unwrap_or_default()
    };
    let input_file = args
        .input_file
        .or(cfg.input_file)
        .map(|p| config::expand_tilde_string(&p));
    if paths.iter().all(|p| p.trim().is_empty()) && input_file.is_none() {
        return Err("at least one path (or --input-file) is required".to_string());
    }

    let page_param = args
        .page_param
        .or(cfg.page_param)
        .unwrap_or_else(|| paginator::DEFAULT_PAGE_PARAM.to_string());
    let page_size_param = args
        .page_size_param
        .or(cfg.page_size_param)
        .unwrap_or_else(|| paginator::DEFAULT_PAGE_SIZE_PARAM.to_string());
    let page_size = args.page_size.or(cfg.page_size);
    let max_pages = args.max_pages.or(cfg.max_pages);

    let defaults = Options::default();
    let rate = args.rate.or(cfg.rate).unwrap_or(defaults.rate);
    let concurrency = args
        .concurrency
        .or(cfg.concurrency)
        .unwrap_or(defaults.concurrency);
    let timeout_seconds = args
        .timeout
        .or(cfg.timeout)
        .unwrap_or(defaults.timeout_seconds);

    let proxy = args.proxy.or(cfg.proxy).filter(|p| !p.trim().is_empty());
    let header = args.header.or(cfg.header).filter(|h| !h.trim().is_empty());
    if let Some(raw) = header.as_deref() {
        crate::utils::parse_header(raw).map_err(|e| format!("invalid header '{raw}': {e}"))?;
    }
    let follow_redirects = args.follow_redirects || cfg.follow_redirects.unwrap_or(false);

    let output = args
        .output
        .or(cfg.output)
        .map(|p| config::expand_tilde_string(&p));
    let output_format_raw = args.output_format.or(cfg.output_format);
    let output_format = match output_format_raw.as_deref() {
        Some(raw) => OutputFormat::parse(raw).ok_or_else(|| {
            format!("invalid output format '{raw}', expected text, json or jsonl")
        })?,
        None => output
            .as_deref()
            .and_then(output::infer_format_from_path)
            .unwrap_or(OutputFormat::Jsonl),
    };
    let no_color = args.no_color || cfg.no_color.unwrap_or(false);

    Ok(RunConfig {
        options: Options {
            origin,
            paths,
            input_file,
            page_param,
            page_size_param,
            page_size,
            max_pages,
            rate,
            concurrency,
            timeout_seconds,
            proxy,
            header,
            follow_redirects,
        },
        output,
        output_format,
        no_color,
    })
}

fn print_settings(run: &RunConfig) {
    let o = &run.options;
    format_kv_line("Origin", &o.origin);
    if !o.paths.is_empty() {
        format_kv_line("Paths", &o.paths.join(", "));
    }
    if let Some(input_file) = o.input_file.as_deref() {
        format_kv_line("Input file", input_file);
    }
    format_kv_line("Page param", &o.page_param);
    if let Some(size) = o.page_size {
        format_kv_line("Page size", &format!("{}={}", o.page_size_param, size));
    }
    if let Some(max) = o.max_pages {
        format_kv_line("Max pages", &max.to_string());
    }
    format_kv_line("Rate", &format!("{}/s", o.rate));
    format_kv_line("Concurrency", &o.concurrency.to_string());
    format_kv_line("Timeout", &format!("{}s", o.timeout_seconds));
    if let Some(proxy) = o.proxy.as_deref() {
        format_kv_line("Proxy", proxy);
    }
    format_kv_line("Redirects", format_bool(o.follow_redirects));
    format_kv_line("Output", run.output.as_deref().unwrap_or("stdout"));
    eprintln!();
}

fn print_summary(result: &CollectResult) {
    for r in result.paths.iter() {
        let stop = match r.outcome.stop {
            StopReason::Status(_) => r.outcome.stop.label().dimmed(),
            _ => r.outcome.stop.label().yellow(),
        };
        let count = format!("{} records", r.outcome.records.len());
        let marker = if r.outcome.diagnostics.is_empty() {
            "+".green()
        } else {
            "!".yellow()
        };
        eprintln!(
            "[{}] {} {} ({} pages, {})",
            marker,
            r.path.bold(),
            count.cyan(),
            r.outcome.pages,
            stop
        );
        for d in r.outcome.diagnostics.iter() {
            eprintln!(
                "    {} page {} {}: {}",
                "dropped".yellow(),
                d.page,
                d.kind.label(),
                d.message
            );
        }
    }
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    print_settings(&run);

    let pb = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] {bar:40} {pos}/{len} paths",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let runner = Runner::new(run.options.clone())
        .map_err(|e| e.to_string())?
        .with_progress(pb.clone());
    let result = runner.run().await.map_err(|e| e.to_string());
    pb.finish_and_clear();
    let result = result?;

    print_summary(&result);

    let records = output::build_records(&result.paths);
    let rendered = output::render(run.output_format, &records);

    match run.output.as_ref() {
        Some(outfile_path) => {
            let mut outfile = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(outfile_path)
                .await
                .map_err(|e| format!("failed to open output file: {e}"))?;
            outfile
                .write_all(&rendered)
                .await
                .map_err(|e| format!("failed to write output file: {e}"))?;
        }
        None => {
            let mut stdout = tokio::io::stdout();
            stdout
                .write_all(&rendered)
                .await
                .map_err(|e| format!("failed to write to stdout: {e}"))?;
            stdout
                .flush()
                .await
                .map_err(|e| format!("failed to write to stdout: {e}"))?;
        }
    }

    eprintln!();
    eprintln!(
        ":: Completed :: {} records from {} paths in {}ms ::",
        result.total_records(),
        result.paths.len(),
        result.elapsed.as_millis()
    );

    Ok(())
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                let _ = e.print();
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    init_tracing(args.verbose);

    if args.init_config {
        let path = match args.config.as_deref() {
            Some(p) => config::expand_tilde(p),
            None => config::default_config_path()
                .ok_or_else(|| "cannot determine home directory".to_string())?,
        };
        config::ensure_default_config_file(&path)?;
        eprintln!(":: Config written to {}", path.display());
        return Ok(());
    }

    let cfg = match args.config.as_deref() {
        Some(p) => config::load_config(&config::expand_tilde(p), false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;
    if run.no_color {
        colored::control::set_override(false);
    }

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))
}
