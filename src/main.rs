use anyhow::Context;
use hquery::{Element, Query};
use std::io::Read;
use std::path::PathBuf;
use tracing::{info, span, Level};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: hq [--trace] [--first] [--attr NAME] <SELECTOR> [FILE]";

struct Args {
    pub selector: String,
    pub input: Option<PathBuf>,
    pub attr: Option<String>,
    pub first: bool,
    pub trace: bool,
}

fn main() -> anyhow::Result<()> {
    let args = parse_args().context(USAGE)?;
    if args.trace {
        tracing_subscriber::fmt::fmt()
            .with_span_events(FmtSpan::ACTIVE)
            .with_max_level(Level::DEBUG)
            .with_env_filter(EnvFilter::from_default_env())
            .finish()
            .init();
        info!("Logger initialized");
    }

    let text = read_input(args.input.as_ref())?;
    let query = Query::parse(&text)?;
    let found = query.find(&args.selector)?;
    if args.first {
        println!("{}", render(found.first(), args.attr.as_deref())?);
        return Ok(());
    }
    for element in found.iter() {
        println!("{}", render(element, args.attr.as_deref())?);
    }
    Ok(())
}

fn parse_args() -> Result<Args, pico_args::Error> {
    let mut pargs = pico_args::Arguments::from_env();
    let args = Args {
        trace: pargs.contains(["--trace", "-t"]),
        first: pargs.contains(["--first", "-1"]),
        attr: pargs.opt_value_from_str(["--attr", "-a"])?,
        selector: pargs.free_from_str()?,
        input: pargs.opt_free_from_str()?,
    };
    Ok(args)
}

/// Read the whole document from a file, or stdin when no file is given
fn read_input(path: Option<&PathBuf>) -> anyhow::Result<String> {
    let span = span!(Level::DEBUG, "Loading document");
    let _enter = span.enter();
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Could not read stdin")?;
            Ok(text)
        }
    }
}

/// The line printed for one match: an attribute value if asked for, else its text
fn render(element: Element, attr: Option<&str>) -> hquery::Result<String> {
    match attr {
        Some(name) => Ok(element.attr(name)?.unwrap_or_default().to_string()),
        None => element.text(),
    }
}
