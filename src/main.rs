use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use log::{LevelFilter, error, info, warn};
use serde::Serialize;
use simplelog::{Config, WriteLogger};

use pdfbridge::callbacks::{CallSink, HostCall};
use pdfbridge::event_source::{LineMessageSource, MessageSource};
use pdfbridge::props::NativeProps;
use pdfbridge::viewer::{
    CapabilityProbe, FixedProbe, NativeSurface, Platform, SilentProbe, SurfaceKind, Viewer,
};
use pdfbridge::{AssetId, AssetRegistry, SourceDescriptor, panic_handler, settings};

#[derive(Parser, Debug)]
#[command(
    name = "pdfbridge",
    version,
    about = "Replay native PDF viewer messages against a document source"
)]
struct Cli {
    /// Source descriptor: JSON object, asset number, or a bare uri
    #[arg(long)]
    source: String,

    /// Bundled asset as ID=URI; repeat for more
    #[arg(long = "asset", value_name = "ID=URI", value_parser = parse_asset)]
    assets: Vec<(AssetId, String)>,

    /// Platform to emulate (defaults to the configured one)
    #[arg(long, value_enum)]
    platform: Option<PlatformArg>,

    /// Answer of the preferred-backend capability probe
    #[arg(long, value_enum, default_value_t = ProbeArg::Yes)]
    probe: ProbeArg,

    /// File with one native message per line; stdin when omitted
    #[arg(long)]
    messages: Option<PathBuf>,

    /// Settings file to use instead of the user config
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value = "pdfbridge.log")]
    log_file: PathBuf,

    /// Log at debug level regardless of settings
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PlatformArg {
    Android,
    Ios,
    Other,
}

impl From<PlatformArg> for Platform {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Android => Platform::Android,
            PlatformArg::Ios => Platform::Ios,
            PlatformArg::Other => Platform::Other,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ProbeArg {
    Yes,
    No,
    /// The probe never answers
    Silent,
}

#[derive(Serialize)]
struct SurfacePatch<'a> {
    surface: SurfaceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    view: Option<&'static str>,
    props: &'a NativeProps,
}

/// Surface that prints every property patch it receives
struct PrintingSurface {
    kind: SurfaceKind,
    view: Option<&'static str>,
}

impl PrintingSurface {
    fn new(platform: Platform, kind: SurfaceKind) -> Self {
        let view = match kind {
            SurfaceKind::PrimaryNative => platform.native_view_name(),
            SurfaceKind::FallbackGeneric => None,
        };
        Self { kind, view }
    }
}

impl NativeSurface for PrintingSurface {
    fn set_native_props(&mut self, props: NativeProps) {
        print_json(&SurfacePatch {
            surface: self.kind,
            view: self.view,
            props: &props,
        });
    }

    fn detach(&mut self) {
        info!("{:?} surface detached", self.kind);
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(line) => {
            let mut stdout = io::stdout().lock();
            if let Err(e) = writeln!(stdout, "{line}") {
                error!("Failed to write output: {e}");
            }
        }
        Err(e) => error!("Failed to serialize output: {e}"),
    }
}

fn print_call(call: HostCall) {
    print_json(&call);
}

fn parse_source(raw: &str) -> Result<SourceDescriptor> {
    let trimmed = raw.trim();
    if trimmed.starts_with('{') || trimmed.parse::<u32>().is_ok() {
        serde_json::from_str(trimmed).with_context(|| format!("invalid source descriptor {raw:?}"))
    } else {
        Ok(SourceDescriptor::uri(trimmed))
    }
}

fn parse_asset(raw: &str) -> Result<(AssetId, String), String> {
    let (id, uri) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ID=URI, got {raw:?}"))?;
    let id = id
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid asset id {id:?}: {e}"))?;
    if uri.is_empty() {
        return Err(format!("asset {id} has an empty uri"));
    }
    Ok((AssetId(id), uri.to_string()))
}

fn init_logging(log_file: &Path, verbose: bool) -> Result<()> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        settings::get_log_level().to_filter()
    };
    let file = File::create(log_file)
        .with_context(|| format!("creating log file {}", log_file.display()))?;
    WriteLogger::init(level, Config::default(), file)?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.config {
        Some(path) => {
            if !settings::load_settings_from_path(path) {
                bail!("could not load settings from {}", path.display());
            }
        }
        None => settings::load_settings(),
    }

    init_logging(&cli.log_file, cli.verbose)?;
    panic_handler::initialize_panic_handler();
    info!("Starting pdfbridge");

    let platform = cli
        .platform
        .map(Platform::from)
        .unwrap_or_else(settings::get_platform);
    let descriptor = parse_source(&cli.source)?;

    let mut assets = AssetRegistry::new();
    for (id, uri) in cli.assets {
        assets.insert(id, uri);
    }

    let probe: Box<dyn CapabilityProbe> = match cli.probe {
        ProbeArg::Yes => Box::new(FixedProbe(true)),
        ProbeArg::No => Box::new(FixedProbe(false)),
        ProbeArg::Silent => Box::new(SilentProbe),
    };
    let mut viewer = Viewer::new(platform, descriptor, Box::new(CallSink(print_call)))
        .with_props(settings::get_default_props())
        .with_assets(Box::new(assets))
        .with_probe(probe);

    viewer.mount();
    for outcome in viewer.poll() {
        if let Err(err) = outcome {
            error!("Source resolution failed: {err}");
            bail!("source resolution failed: {err}");
        }
    }

    match viewer.attach_surface(|kind| Box::new(PrintingSurface::new(platform, kind))) {
        Some(kind) => info!("Rendering {} on {kind:?}", viewer.path()),
        None => warn!("Nothing to render on {platform:?}"),
    }

    let mut source: Box<dyn MessageSource> = match &cli.messages {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("opening messages file {}", path.display()))?;
            Box::new(LineMessageSource::new(BufReader::new(file)))
        }
        None => Box::new(LineMessageSource::new(io::stdin().lock())),
    };

    while let Some(message) = source.next_message()? {
        viewer
            .handle_native_message(&message)
            .with_context(|| format!("decoding native message {message:?}"))?;
    }

    viewer.unmount();
    panic_handler::flush_stdout();
    info!("Shutting down pdfbridge");
    Ok(())
}
