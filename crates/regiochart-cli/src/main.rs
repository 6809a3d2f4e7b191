use regiochart::render::raster::{RasterError, RasterOptions, svg_to_png};
use regiochart::render::{ChartRender, RenderOptions, SvgRenderOptions, sanitize_svg_id};
use regiochart_core::{ChartRequest, normalize};
use serde::Serialize;
use std::io::{Read, Write};
use std::str::FromStr;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Request(regiochart_core::Error),
    Render(regiochart_render::Error),
    Raster(RasterError),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Request(err) => write!(f, "{err}"),
            CliError::Render(err) => write!(f, "{err}"),
            CliError::Raster(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<regiochart_core::Error> for CliError {
    fn from(value: regiochart_core::Error) -> Self {
        Self::Request(value)
    }
}

impl From<regiochart_render::Error> for CliError {
    fn from(value: regiochart_render::Error) -> Self {
        Self::Render(value)
    }
}

impl From<RasterError> for CliError {
    fn from(value: RasterError) -> Self {
        Self::Raster(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    Normalize,
    #[default]
    Layout,
    Table,
    Render,
}

#[derive(Debug, Clone, Copy, Default)]
enum RenderFormat {
    #[default]
    Svg,
    Png,
}

impl FromStr for RenderFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    stacked: bool,
    viewport_width: Option<f64>,
    viewport_height: Option<f64>,
    render_format: RenderFormat,
    render_scale: f32,
    background: Option<String>,
    diagram_id: Option<String>,
    title: Option<String>,
    out: Option<String>,
}

fn usage() -> &'static str {
    "regiochart-cli\n\
\n\
USAGE:\n\
  regiochart-cli normalize [--pretty] [<path>|-]\n\
  regiochart-cli [layout] [--pretty] [--stacked] [--viewport-width <w>] [--viewport-height <h>] [<path>|-]\n\
  regiochart-cli table [--pretty] [--stacked] [<path>|-]\n\
  regiochart-cli render [--format svg|png] [--scale <n>] [--background <css-color>] [--stacked] [--viewport-width <w>] [--viewport-height <h>] [--id <chart-id>] [--title <text>] [--out <path>] [<path>|-]\n\
\n\
NOTES:\n\
  - Input is a JSON chart request; if <path> is omitted or '-', it is read from stdin.\n\
  - --stacked and --viewport-* override the request's `config`.\n\
  - layout prints the chart geometry, or {\"noData\":true} when nothing is renderable.\n\
  - render prints SVG to stdout by default; use --out to write a file.\n\
  - PNG output defaults to writing next to the input file (or ./out.png for stdin).\n\
"
}

fn next_f64<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<f64, CliError> {
    let Some(v) = it.next() else {
        return Err(CliError::Usage(usage()));
    };
    let v = v.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
    if !(v.is_finite() && v > 0.0) {
        return Err(CliError::Usage(usage()));
    }
    Ok(v)
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args {
        render_scale: 1.0,
        background: Some("white".to_string()),
        ..Default::default()
    };

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "normalize" => args.command = Command::Normalize,
            "layout" => args.command = Command::Layout,
            "table" => args.command = Command::Table,
            "render" => args.command = Command::Render,
            "--pretty" => args.pretty = true,
            "--stacked" => args.stacked = true,
            "--format" => {
                let Some(fmt) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.render_format = fmt
                    .parse::<RenderFormat>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--scale" => args.render_scale = next_f64(&mut it)? as f32,
            "--background" => {
                let Some(bg) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                let bg = bg.trim();
                args.background = (!bg.is_empty()).then(|| bg.to_string());
            }
            "--viewport-width" => args.viewport_width = Some(next_f64(&mut it)?),
            "--viewport-height" => args.viewport_height = Some(next_f64(&mut it)?),
            "--id" => {
                let Some(id) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.diagram_id = Some(sanitize_svg_id(id));
            }
            "--title" => {
                let Some(title) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.title = Some(title.clone());
            }
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            "-" if args.input.is_none() => args.input = Some("-".to_string()),
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

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
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
        None | Some("-") => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn default_raster_out_path(input: Option<&str>, ext: &str) -> std::path::PathBuf {
    match input {
        Some(path) if path != "-" => std::path::PathBuf::from(path).with_extension(ext),
        _ => std::path::PathBuf::from(format!("out.{ext}")),
    }
}

fn apply_overrides(request: &mut ChartRequest, args: &Args) {
    if args.stacked {
        request.config.stacked = true;
    }
    if let Some(w) = args.viewport_width {
        request.config.viewport_width = w;
    }
    if let Some(h) = args.viewport_height {
        request.config.viewport_height = h;
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;
    let mut request = ChartRequest::from_json_str(&text)?;
    apply_overrides(&mut request, &args);
    let options = RenderOptions::default();

    match args.command {
        Command::Normalize => write_json(&normalize(&request), args.pretty),
        Command::Layout => {
            let result = regiochart::render::render(&request, &options);
            let value = regiochart::render::render_to_json_value(&result)?;
            write_json(&value, args.pretty)
        }
        Command::Table => match regiochart::render::render(&request, &options) {
            ChartRender::Chart(geometry) => write_json(&geometry.table, args.pretty),
            ChartRender::NoData => write_json(&serde_json::json!({ "noData": true }), args.pretty),
        },
        Command::Render => {
            let svg_options = SvgRenderOptions {
                diagram_id: args.diagram_id.clone(),
                title: args.title.clone(),
                ..Default::default()
            };
            let svg = regiochart_render::render_svg(&request, &options, &svg_options);

            match args.render_format {
                RenderFormat::Svg => write_text(&svg, args.out.as_deref()),
                RenderFormat::Png => {
                    let raster = RasterOptions {
                        scale: args.render_scale,
                        background: args.background.clone(),
                    };
                    let bytes = svg_to_png(&svg, &raster)?;
                    let out = args.out.clone().unwrap_or_else(|| {
                        default_raster_out_path(args.input.as_deref(), "png")
                            .to_string_lossy()
                            .to_string()
                    });
                    if out == "-" {
                        std::io::stdout().lock().write_all(&bytes)?;
                    } else {
                        std::fs::write(out, bytes)?;
                    }
                    Ok(())
                }
            }
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

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
