use serde::Serialize;
use std::io::{Read, Write};
use std::path::Path;
use std::str::FromStr;
use tessera::{
    BadgeConfig, BadgeRenderer, BadgeRequest, BadgeStore, SVG_MEDIA_TYPE, SourceAsset, SourceKind,
};

mod store;

use store::FsBadgeStore;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    MissingStore,
    Io(std::io::Error),
    Badge(tessera::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::MissingStore => write!(
                f,
                "No badge store configured: pass --store <dir> or set storeRoot in --config"
            ),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Badge(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<tessera::Error> for CliError {
    fn from(value: tessera::Error) -> Self {
        Self::Badge(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy)]
enum Command {
    Normalize,
    Upload,
    Render,
    List,
    Rename,
    Delete,
}

#[derive(Debug, Default)]
struct Args {
    command: Option<Command>,
    input: Option<String>,
    config: Option<String>,
    store: Option<String>,
    owner: Option<String>,
    name: Option<String>,
    rename_to: Option<String>,
    badges: Option<String>,
    rows: Option<usize>,
    cols: Option<usize>,
    fit: bool,
    source_kind: Option<SourceKind>,
    out: Option<String>,
    pretty: bool,
    verbose: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredOut<'a> {
    scope: &'a str,
    name: &'a str,
    media_type: &'a str,
    width: f64,
    height: f64,
    path: String,
}

#[derive(Serialize)]
struct ListOut<'a> {
    scope: &'a str,
    badges: Vec<String>,
}

#[derive(Serialize)]
struct RenameOut<'a> {
    scope: &'a str,
    from: &'a str,
    to: &'a str,
}

#[derive(Serialize)]
struct DeleteOut<'a> {
    scope: &'a str,
    deleted: &'a str,
}

fn usage() -> &'static str {
    "tessera-cli\n\
\n\
USAGE:\n\
  tessera-cli normalize [--name <unique-name>] [--type png|jpg|svg] [--out <path>] <path>|-\n\
  tessera-cli upload [--store <dir>] --owner <scope> [--name <name>] [--type png|jpg|svg] [--pretty] <path>|-\n\
  tessera-cli render [--store <dir>] [--owner <scope>] --badge <a,b,c> [--row <n>] [--col <n>] [--fit] [--out <path>]\n\
  tessera-cli list [--store <dir>] [--owner <scope>] [--pretty]\n\
  tessera-cli rename [--store <dir>] --owner <scope> --name <name> --to <new-name>\n\
  tessera-cli delete [--store <dir>] --owner <scope> --name <name>\n\
\n\
GLOBAL OPTIONS:\n\
  --config <path>   JSON badge configuration (normalizationHeight, rowHeight, gap, cornerRadius, defaultScope, storeRoot)\n\
  --verbose         log debug events to stderr (otherwise TESSERA_LOG, default warn)\n\
\n\
NOTES:\n\
  - If <path> is '-', input is read from stdin and --type is required.\n\
  - --name defaults to the input file name without its extension.\n\
  - render and normalize print SVG to stdout by default; use --out to write a file.\n\
  - A --row or --col of 0 means \"infer from the badge count\".\n\
  - Badges are stored as <store>/<scope>/<name>.svg; shared badges live in the default scope.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "normalize" if args.command.is_none() => args.command = Some(Command::Normalize),
            "upload" if args.command.is_none() => args.command = Some(Command::Upload),
            "render" if args.command.is_none() => args.command = Some(Command::Render),
            "list" if args.command.is_none() => args.command = Some(Command::List),
            "rename" if args.command.is_none() => args.command = Some(Command::Rename),
            "delete" if args.command.is_none() => args.command = Some(Command::Delete),
            "--fit" => args.fit = true,
            "--pretty" => args.pretty = true,
            "--verbose" | "-v" => args.verbose = true,
            "--config" => args.config = Some(value(&mut it)?),
            "--store" => args.store = Some(value(&mut it)?),
            "--owner" | "--user" => args.owner = Some(value(&mut it)?),
            "--name" => args.name = Some(value(&mut it)?),
            "--to" => args.rename_to = Some(value(&mut it)?),
            "--badge" => args.badges = Some(value(&mut it)?),
            "--out" => args.out = Some(value(&mut it)?),
            "--row" => args.rows = Some(count(&value(&mut it)?)?),
            "--col" => args.cols = Some(count(&value(&mut it)?)?),
            "--type" => {
                let kind = value(&mut it)?;
                args.source_kind = Some(
                    SourceKind::from_extension(&kind).map_err(|_| CliError::Usage(usage()))?,
                );
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn value<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<String, CliError> {
    it.next().cloned().ok_or(CliError::Usage(usage()))
}

fn count(raw: &str) -> Result<usize, CliError> {
    usize::from_str(raw.trim()).map_err(|_| CliError::Usage(usage()))
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        std::env::var("TESSERA_LOG")
            .ok()
            .and_then(|raw| tracing::Level::from_str(raw.trim()).ok())
            .unwrap_or(tracing::Level::WARN)
    };
    // Stdout carries the rendered document.
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .try_init();
}

fn load_config(args: &Args) -> Result<BadgeConfig, CliError> {
    let mut config = match args.config.as_deref() {
        Some(path) => BadgeConfig::from_path(Path::new(path))?,
        None => BadgeConfig::default(),
    };
    if let Some(store) = args.store.as_deref() {
        config.store_root = Some(store.into());
    }
    Ok(config)
}

fn open_store(config: &BadgeConfig) -> Result<FsBadgeStore, CliError> {
    let root = config.store_root.as_deref().ok_or(CliError::MissingStore)?;
    let store = FsBadgeStore::new(root);
    tracing::debug!(root = %store.root().display(), "opened badge store");
    Ok(store)
}

fn required(value: &Option<String>) -> Result<&str, CliError> {
    value.as_deref().ok_or(CliError::Usage(usage()))
}

fn read_input(input: Option<&str>) -> Result<Vec<u8>, CliError> {
    match input {
        None => Err(CliError::Usage(usage())),
        Some("-") => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read(path)?),
    }
}

fn read_asset(args: &Args) -> Result<SourceAsset, CliError> {
    let input = args.input.as_deref();
    let kind = match (args.source_kind, input) {
        (Some(kind), _) => kind,
        (None, Some(path)) if path != "-" => SourceKind::from_file_name(path)?,
        _ => return Err(CliError::Usage(usage())),
    };
    Ok(SourceAsset::new(kind, read_input(input)?))
}

fn badge_name(args: &Args) -> Result<String, CliError> {
    if let Some(name) = args.name.as_deref() {
        return Ok(name.trim().to_string());
    }
    args.input
        .as_deref()
        .filter(|path| *path != "-")
        .and_then(|path| Path::new(path).file_stem())
        .and_then(|stem| stem.to_str())
        .map(|stem| stem.trim().to_string())
        .ok_or(CliError::Usage(usage()))
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    if pretty {
        serde_json::to_writer_pretty(&mut stdout, value)?;
    } else {
        serde_json::to_writer(&mut stdout, value)?;
    }
    writeln!(stdout)?;
    Ok(())
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            if !text.ends_with('\n') {
                writeln!(stdout)?;
            }
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let Some(command) = args.command else {
        return Err(CliError::Usage(usage()));
    };
    let renderer = BadgeRenderer::new().with_config(load_config(&args)?);
    let config = &renderer.config;

    match command {
        Command::Normalize => {
            let asset = read_asset(&args)?;
            let name = badge_name(&args)?;
            let fragment = renderer.normalize(&asset, &name)?;
            write_text(fragment.markup(), args.out.as_deref())
        }
        Command::Upload => {
            let store = open_store(config)?;
            let owner = required(&args.owner)?.trim();
            let name = badge_name(&args)?;
            let asset = read_asset(&args)?;
            let fragment = renderer.upload(&store, owner, &name, &asset)?;
            let out = StoredOut {
                scope: owner,
                name: &name,
                media_type: SVG_MEDIA_TYPE,
                width: fragment.width(),
                height: fragment.height(),
                path: store.path_of(owner, &name)?.display().to_string(),
            };
            write_json(&out, args.pretty)
        }
        Command::Render => {
            let store = open_store(config)?;
            let badges = required(&args.badges)?;
            let request = BadgeRequest::parse(
                badges,
                args.owner.as_deref(),
                args.rows,
                args.cols,
                Some(args.fit),
            )?;
            let svg = renderer.render_request(&store, &request)?;
            write_text(&svg, args.out.as_deref())
        }
        Command::List => {
            let store = open_store(config)?;
            let scope = args
                .owner
                .as_deref()
                .map(str::trim)
                .unwrap_or(&config.default_scope);
            let out = ListOut {
                scope,
                badges: store.list(scope)?,
            };
            write_json(&out, args.pretty)
        }
        Command::Rename => {
            let store = open_store(config)?;
            let owner = required(&args.owner)?.trim();
            let from = required(&args.name)?.trim();
            let to = required(&args.rename_to)?.trim();
            tessera::upload::rename(&store, config, owner, from, to)?;
            write_json(&RenameOut { scope: owner, from, to }, args.pretty)
        }
        Command::Delete => {
            let store = open_store(config)?;
            let owner = required(&args.owner)?.trim();
            let name = required(&args.name)?.trim();
            tessera::upload::delete(&store, config, owner, name)?;
            write_json(&DeleteOut { scope: owner, deleted: name }, args.pretty)
        }
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };
    init_logging(args.verbose);

    match run(args) {
        Ok(()) => {}
        Err(err @ (CliError::Usage(_) | CliError::MissingStore)) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
        Err(err @ CliError::Badge(tessera::Error::FragmentNotFound { .. })) => {
            eprintln!("{err}");
            std::process::exit(3);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
