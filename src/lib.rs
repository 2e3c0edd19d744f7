pub mod aggregate;
pub mod category;
pub mod cli;
pub mod columns;
pub mod config;
pub mod data;
pub mod decode;
pub mod error;
pub mod io_utils;
pub mod report;
pub mod rowset;
pub mod schema;
pub mod source;
pub mod table;

use std::{env, fs, sync::OnceLock};

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{LevelFilter, debug, info, warn};

use crate::{
    category::CategorySelection,
    cli::{BackendArgs, Cli, Commands, OutputFormat},
    config::{AuthConfig, Config},
    report::ReportOptions,
    source::{
        DriveSource, FileSource, FolderSource, ListingCache, LogicalSource,
        auth::{AccessToken, ApiKey, Authenticator, ServiceAccount, TokenFile},
    },
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("feedback_lens", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Detect(args) => handle_detect(&args),
        Commands::Files(args) => handle_files(&args),
        Commands::Report(args) => handle_report(&args),
    }
}

fn handle_detect(args: &cli::DetectArgs) -> Result<()> {
    let mut rows = Vec::with_capacity(args.inputs.len());
    let mut failures = 0usize;
    for input in &args.inputs {
        let name = input.display().to_string();
        let bytes = fs::read(input).with_context(|| format!("Reading input file {input:?}"))?;
        match decode::decode(&bytes) {
            Ok(set) => {
                let tag = schema::classify(set.columns());
                let reason = columns::resolve_reason(tag, set.columns());
                let comment = columns::resolve_comment(set.columns());
                debug!("Columns of {input:?}: {:?}", set.columns());
                rows.push(vec![
                    name,
                    set.len().to_string(),
                    tag.to_string(),
                    reason.unwrap_or_default(),
                    comment.unwrap_or_default(),
                ]);
            }
            Err(err) => {
                warn!("Could not decode {input:?}: {err}");
                failures += 1;
                rows.push(vec![
                    name,
                    String::new(),
                    format!("error: {err}"),
                    String::new(),
                    String::new(),
                ]);
            }
        }
    }

    let headers = ["file", "rows", "schema", "reason", "comment"]
        .map(str::to_string)
        .to_vec();
    print!("{}", table::render_table(&headers, &rows));
    if failures > 0 {
        bail!("{failures} of {} file(s) could not be decoded", args.inputs.len());
    }
    info!("Detected schemas for {} file(s)", args.inputs.len());
    Ok(())
}

fn handle_files(args: &cli::FilesArgs) -> Result<()> {
    let config = load_config(&args.backend)?;
    let cache = open_listing(&args.backend, &config)?;
    let files = cache.files()?;

    let rows = files
        .iter()
        .map(|file| {
            let feeds = LogicalSource::ALL_SOURCES
                .iter()
                .filter(|source| source.selects(&file.name))
                .map(LogicalSource::display_name)
                .collect::<Vec<_>>()
                .join(", ");
            let quarterly = LogicalSource::ALL_SOURCES
                .iter()
                .filter(|source| source.matches_quarterly(&file.name))
                .map(LogicalSource::display_name)
                .collect::<Vec<_>>()
                .join(", ");
            vec![file.name.clone(), file.id.clone(), feeds, quarterly]
        })
        .collect::<Vec<_>>();
    let headers = ["name", "id", "sources", "quarterly"]
        .map(str::to_string)
        .to_vec();
    print!("{}", table::render_table(&headers, &rows));
    info!(
        "Listed {} CSV file(s) in collection '{}'",
        files.len(),
        cache.collection()
    );
    Ok(())
}

fn handle_report(args: &cli::ReportArgs) -> Result<()> {
    let config = load_config(&args.backend)?;
    let cache = open_listing(&args.backend, &config)?;
    let files = cache.files()?;
    if files.is_empty() {
        bail!(
            "No CSV files found in collection '{}'",
            cache.collection()
        );
    }

    info!("Aggregating feedback source '{}'", args.source);
    let aggregation = aggregate::aggregate(args.source, &files, |id| cache.fetch(id))?;
    let quarterly = aggregate::aggregate_quarterly(args.source, &files, |id| cache.fetch(id));

    let category_limit = if args.all_categories {
        None
    } else {
        Some(args.category_limit.unwrap_or_else(|| config.category_limit()))
    };
    let options = ReportOptions {
        selection: args
            .category
            .parse::<CategorySelection>()
            .unwrap_or_default(),
        category_limit,
        sample_rows: args.sample_rows.unwrap_or_else(|| config.sample_rows()),
    };
    let report = report::build_report(aggregation, quarterly, &options);

    match args.format {
        OutputFormat::Table => print!("{}", report::render_text(&report)),
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&report).context("Serializing report as JSON")?;
            println!("{json}");
        }
    }
    info!(
        "{} of {} record(s) match category '{}'",
        report.matching_records, report.total_records, report.selection
    );
    Ok(())
}

fn load_config(args: &BackendArgs) -> Result<Config> {
    match &args.config {
        Some(path) => Config::load(path),
        None => Ok(Config::default()),
    }
}

/// Picks the backend: command-line flags first, then the config file; a local
/// folder wins over Drive at the same level.
fn open_listing(
    args: &BackendArgs,
    config: &Config,
) -> Result<ListingCache<Box<dyn FileSource>>> {
    if let Some(folder) = &args.folder {
        return Ok(folder_listing(folder, args, config));
    }
    if let Some(folder_id) = &args.drive_folder {
        let api_base = config.drive.as_ref().and_then(|d| d.api_base.clone());
        let auth = match (cli_authenticator(args)?, &config.drive) {
            (Some(auth), _) => auth,
            (None, Some(drive)) => config_authenticator(&drive.auth)?,
            (None, None) => bail!(
                "Drive access needs --service-account, --access-token, --token-file, or --api-key"
            ),
        };
        return Ok(drive_listing(
            folder_id,
            auth,
            api_base,
            config.collection.as_deref(),
        ));
    }
    if let Some(folder) = &config.folder {
        return Ok(folder_listing(folder, args, config));
    }
    if let Some(drive) = &config.drive {
        let auth = match cli_authenticator(args)? {
            Some(auth) => auth,
            None => config_authenticator(&drive.auth)?,
        };
        return Ok(drive_listing(
            &drive.folder_id,
            auth,
            drive.api_base.clone(),
            args.collection.as_deref().or(config.collection.as_deref()),
        ));
    }
    bail!("No file source configured; pass --folder or --drive-folder, or set one in --config")
}

fn folder_listing(
    folder: &std::path::Path,
    args: &BackendArgs,
    config: &Config,
) -> ListingCache<Box<dyn FileSource>> {
    let collection = args
        .collection
        .clone()
        .or_else(|| config.collection.clone())
        .unwrap_or_default();
    debug!("Using folder source {folder:?}, collection '{collection}'");
    ListingCache::new(
        Box::new(FolderSource::new(folder)) as Box<dyn FileSource>,
        collection,
    )
}

fn drive_listing(
    folder_id: &str,
    auth: Box<dyn Authenticator>,
    api_base: Option<String>,
    ignored_collection: Option<&str>,
) -> ListingCache<Box<dyn FileSource>> {
    if let Some(collection) = ignored_collection {
        warn!("Ignoring collection '{collection}'; Drive lists folder '{folder_id}'");
    }
    debug!(
        "Using Drive folder '{folder_id}' with {} authentication",
        auth.describe()
    );
    let source = match api_base {
        Some(base) => DriveSource::with_api_base(auth, base),
        None => DriveSource::new(auth),
    };
    ListingCache::new(Box::new(source) as Box<dyn FileSource>, folder_id)
}

fn cli_authenticator(args: &BackendArgs) -> Result<Option<Box<dyn Authenticator>>> {
    if let Some(path) = &args.service_account {
        return Ok(Some(Box::new(ServiceAccount::from_file(path)?)));
    }
    if let Some(path) = &args.token_file {
        return Ok(Some(Box::new(TokenFile::new(path))));
    }
    if let Some(token) = &args.access_token {
        return Ok(Some(Box::new(AccessToken::new(token.clone()))));
    }
    Ok(args
        .api_key
        .as_ref()
        .map(|key| Box::new(ApiKey::new(key.clone())) as Box<dyn Authenticator>))
}

fn config_authenticator(auth: &AuthConfig) -> Result<Box<dyn Authenticator>> {
    Ok(match auth {
        AuthConfig::AccessToken { env } => Box::new(AccessToken::new(read_env(env)?)),
        AuthConfig::TokenFile { path } => Box::new(TokenFile::new(path)),
        AuthConfig::ApiKey { env } => Box::new(ApiKey::new(read_env(env)?)),
        AuthConfig::ServiceAccount { path } => Box::new(ServiceAccount::from_file(path)?),
    })
}

fn read_env(name: &str) -> Result<String> {
    env::var(name).with_context(|| format!("Reading environment variable {name}"))
}
