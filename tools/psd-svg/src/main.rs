use anyhow::{Context, Result, anyhow};
use clap::{ArgAction, Parser, ValueEnum};
use fern::colors::{Color, ColoredLevelConfig};
use layer_types::LayerPath;
use psd_svg::{Session, parse_document, parse_layer_path};
use rendering::preview::{PreviewOptions, render_png};
use rendering::{RenderParams, TextRenderMode};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use text_raster::{FontCache, GlyphRasterizer};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TextMode {
	/// Draw text layers as SVG text
	Primitive,
	/// Draw text layers from their rasterized canvases
	Raster,
}

impl From<TextMode> for TextRenderMode {
	fn from(mode: TextMode) -> Self {
		match mode {
			TextMode::Primitive => TextRenderMode::Primitive,
			TextMode::Raster => TextRenderMode::Raster,
		}
	}
}

#[derive(Parser)]
#[command(name = "psd-svg")]
#[command(about = "Render a decoded layered image document to SVG, optionally editing its text layers first")]
struct Args {
	/// Document JSON as produced by the layer decoder
	document: PathBuf,

	/// Output SVG file (defaults to stdout)
	#[arg(short, long)]
	output: Option<PathBuf>,

	/// Also rasterize the SVG to this PNG file
	#[arg(long)]
	png: Option<PathBuf>,

	/// Replace the string of a text layer, addressed by dot separated child indices (e.g. `0.2=Hello`)
	#[arg(long, value_name = "PATH=TEXT", value_parser = parse_edit)]
	edit: Vec<(LayerPath, String)>,

	/// Load a font file for a family, used to redraw edited text and for the PNG preview
	#[arg(long, value_name = "FAMILY=FILE", value_parser = parse_font)]
	font: Vec<(String, PathBuf)>,

	/// How text layers are drawn
	#[arg(long, value_enum, default_value = "primitive")]
	text_mode: TextMode,

	/// List the editable text layers and exit
	#[arg(long)]
	list_text: bool,

	/// Increase log verbosity (-v for debug, -vv for trace)
	#[arg(short, long, action = ArgAction::Count)]
	verbose: u8,
}

fn parse_edit(argument: &str) -> Result<(LayerPath, String)> {
	let (path, text) = argument.split_once('=').ok_or_else(|| anyhow!("expected PATH=TEXT"))?;
	let path = parse_layer_path(path).ok_or_else(|| anyhow!("invalid layer path `{path}`"))?;
	Ok((path, text.to_string()))
}

fn parse_font(argument: &str) -> Result<(String, PathBuf)> {
	let (family, file) = argument.split_once('=').ok_or_else(|| anyhow!("expected FAMILY=FILE"))?;
	Ok((family.to_string(), PathBuf::from(file)))
}

fn setup_logging(verbose: u8) -> Result<()> {
	let colors = ColoredLevelConfig::new().debug(Color::Magenta).info(Color::Green).error(Color::Red);
	let level = match verbose {
		0 => log::LevelFilter::Info,
		1 => log::LevelFilter::Debug,
		_ => log::LevelFilter::Trace,
	};

	// Stdout may carry the SVG, so logs go to stderr
	fern::Dispatch::new()
		.chain(std::io::stderr())
		.level(level)
		.format(move |out, message, record| {
			out.finish(format_args!(
				"[{}]{} {}",
				// This will color the log level only, not the whole line. Just a touch.
				colors.color(record.level()),
				chrono::Utc::now().format("[%Y-%m-%d %H:%M:%S]"),
				message
			))
		})
		.apply()
		.context("Failed to install the logger")
}

fn main() -> Result<()> {
	let args = Args::parse();
	setup_logging(args.verbose)?;

	let mut fonts = FontCache::new();
	let mut preview = PreviewOptions { system_fonts: true, ..Default::default() };
	for (family, file) in &args.font {
		let data = fs::read(file).with_context(|| format!("Failed to read font file {}", file.display()))?;
		log::debug!("Loaded font \"{family}\" from {}", file.display());
		preview.fonts.push(Arc::new(data.clone()));
		fonts.insert(family.as_str(), data);
	}

	let params = RenderParams { text_mode: args.text_mode.into() };
	let mut session = Session::new(GlyphRasterizer::new(fonts), params);

	let json = fs::read_to_string(&args.document).with_context(|| format!("Failed to read {}", args.document.display()))?;
	let ticket = session.begin_load();
	let document = parse_document(&json).with_context(|| format!("Failed to parse {}", args.document.display()))?;
	session.finish_load(ticket, Some(document));

	if args.list_text {
		let mut stdout = std::io::stdout().lock();
		for (path, text) in session.text_layers() {
			let path = path.iter().map(ToString::to_string).collect::<Vec<_>>().join(".");
			writeln!(stdout, "{path}\t{text}")?;
		}
		return Ok(());
	}

	for (path, text) in &args.edit {
		session.edit_text(path, text).with_context(|| format!("Failed to edit the text of layer {path:?}"))?;
	}

	let scene = session.render_resolved().context("No document is loaded")?;
	let counts = scene.count_primitives();
	log::info!("Rendered {} images and {} text primitives", counts.images, counts.texts);
	let svg = scene.to_svg();

	match &args.output {
		Some(output) => fs::write(output, &svg).with_context(|| format!("Failed to write {}", output.display()))?,
		None => std::io::stdout().lock().write_all(svg.as_bytes())?,
	}

	if let Some(png) = &args.png {
		let data = render_png(&svg, &preview).context("Failed to render the PNG preview")?;
		fs::write(png, data).with_context(|| format!("Failed to write {}", png.display()))?;
		log::info!("Wrote preview to {}", png.display());
	}

	Ok(())
}
