// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path;

use decora::{EffectGraph, EffectId, FilterContext, Input, Options};

macro_rules! timed {
    ($args:expr, $name:expr, $task:expr) => {
        if $args.perf {
            let now = std::time::Instant::now();
            let res = $task;
            println!("{}: {:.2}ms", $name, now.elapsed().as_micros() as f64 / 1000.0);
            res
        } else {
            $task
        }
    };
}

fn main() {
    if let Err(e) = process() {
        eprintln!("Error: {}.", e);
        std::process::exit(1);
    }
}

fn process() -> Result<(), String> {
    let args = match collect_args() {
        Ok(args) => args,
        Err(e) => {
            println!("{}", HELP);
            return Err(e.to_string());
        }
    };

    if !args.quiet {
        if let Ok(()) = log::set_logger(&LOGGER) {
            log::set_max_level(log::LevelFilter::Warn);
        }
    }

    let pixmap = timed!(args, "Reading", {
        tiny_skia::Pixmap::load_png(&args.input).map_err(|e| e.to_string())
    })?;

    let (graph, root) = build_graph(&args, pixmap)?;
    let fctx = FilterContext::new(Options::default());

    let img = timed!(args, "Filtering", render(&args, &graph, root, &fctx))?;
    timed!(args, "Saving", img.save_png(&args.output).map_err(|e| e.to_string()))
}

const HELP: &str = "\
decora applies image effects to a PNG file.

USAGE:
  decora [OPTIONS] <in-png> <out-png>

  decora --blur 4 in.png out.png
  decora --drop-shadow 8 --shadow-offset 4,4 in.png out.png

OPTIONS:
      --help                    Prints this help
  -V, --version                 Prints version

  --blur RADIUS                 Applies a gaussian blur
                                [possible values: 0..63]
  --box-blur SIZE               Applies a three pass box blur
                                [possible values: 0..255]
  --motion-blur RADIUS          Applies a motion blur
                                [possible values: 0..63]
  --angle DEGREES               Sets the motion blur angle
                                [default: 0]
  --drop-shadow RADIUS          Adds a drop shadow
                                [possible values: 0..63]
  --shadow-color COLOR          Sets the drop shadow color
                                Examples: red, #fff, #000000a0
                                [default: black]
  --shadow-offset DX,DY         Sets the drop shadow offset
                                [default: 0,0]
  --hue VALUE                   Shifts hue [possible values: -1..1]
  --saturation VALUE            Changes saturation [possible values: -1..1]
  --brightness VALUE            Changes brightness [possible values: -1..1]
  --contrast VALUE              Changes contrast [possible values: 0.25..4]
  --sepia LEVEL                 Applies a sepia tone [possible values: 0..1]
  --reflection FRACTION         Adds a reflection of the bottom part
                                [possible values: 0..1]
  -s, --scale FACTOR            Scales the result
                                [default: 1]

  --perf                        Prints performance stats
  --quiet                       Disables warnings

ARGS:
  <in-png>                      Input file
  <out-png>                     Output file
";

#[derive(Debug)]
struct Args {
    blur: Option<f32>,
    box_blur: Option<u32>,
    motion_blur: Option<f32>,
    angle: f32,
    drop_shadow: Option<f32>,
    shadow_color: Option<svgtypes::Color>,
    shadow_offset: (f32, f32),
    hue: f32,
    saturation: f32,
    brightness: f32,
    contrast: f32,
    sepia: Option<f32>,
    reflection: Option<f32>,
    scale: f32,

    perf: bool,
    quiet: bool,

    input: path::PathBuf,
    output: path::PathBuf,
}

fn collect_args() -> Result<Args, pico_args::Error> {
    let mut input = pico_args::Arguments::from_env();

    if input.contains("--help") {
        print!("{}", HELP);
        std::process::exit(0);
    }

    if input.contains(["-V", "--version"]) {
        println!("{}", env!("CARGO_PKG_VERSION"));
        std::process::exit(0);
    }

    Ok(Args {
        blur:           input.opt_value_from_str("--blur")?,
        box_blur:       input.opt_value_from_str("--box-blur")?,
        motion_blur:    input.opt_value_from_str("--motion-blur")?,
        angle:          input.opt_value_from_str("--angle")?.unwrap_or(0.0),
        drop_shadow:    input.opt_value_from_str("--drop-shadow")?,
        shadow_color:   input.opt_value_from_str("--shadow-color")?,
        shadow_offset:  input.opt_value_from_fn("--shadow-offset", parse_offset)?.unwrap_or((0.0, 0.0)),
        hue:            input.opt_value_from_str("--hue")?.unwrap_or(0.0),
        saturation:     input.opt_value_from_str("--saturation")?.unwrap_or(0.0),
        brightness:     input.opt_value_from_str("--brightness")?.unwrap_or(0.0),
        contrast:       input.opt_value_from_str("--contrast")?.unwrap_or(1.0),
        sepia:          input.opt_value_from_str("--sepia")?,
        reflection:     input.opt_value_from_str("--reflection")?,
        scale:          input.opt_value_from_fn(["-s", "--scale"], parse_scale)?.unwrap_or(1.0),

        perf:           input.contains("--perf"),
        quiet:          input.contains("--quiet"),

        input:          input.free_from_str()?,
        output:         input.free_from_str()?,
    })
}

fn parse_offset(s: &str) -> Result<(f32, f32), String> {
    let mut parts = s.split(',');
    let mut next = || -> Result<f32, String> {
        parts
            .next()
            .ok_or("expected DX,DY")?
            .trim()
            .parse()
            .map_err(|_| "invalid offset".to_string())
    };

    let dx = next()?;
    let dy = next()?;
    Ok((dx, dy))
}

fn parse_scale(s: &str) -> Result<f32, String> {
    let n: f32 = s.parse().map_err(|_| "invalid scale factor")?;

    if n > 0.0 && n.is_finite() {
        Ok(n)
    } else {
        Err("SCALE should be positive".to_string())
    }
}

fn to_skia_color(c: svgtypes::Color) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(c.red, c.green, c.blue, c.alpha)
}

fn build_graph(args: &Args, pixmap: tiny_skia::Pixmap) -> Result<(EffectGraph, EffectId), String> {
    let mut graph = EffectGraph::new();
    let source = decora::Source::new(pixmap);
    let mut last = add(&mut graph, decora::Identity::new(Some(source)), &[])?;

    if let Some(radius) = args.blur {
        let blur = decora::GaussianBlur::new(radius).map_err(|e| e.to_string())?;
        last = add(&mut graph, blur, &[last.into()])?;
    }

    if let Some(size) = args.box_blur {
        let blur = decora::BoxBlur::new(size, size, 3).map_err(|e| e.to_string())?;
        last = add(&mut graph, blur, &[last.into()])?;
    }

    if let Some(radius) = args.motion_blur {
        let blur = decora::MotionBlur::new(radius, args.angle).map_err(|e| e.to_string())?;
        last = add(&mut graph, blur, &[last.into()])?;
    }

    if let Some(radius) = args.drop_shadow {
        let mut shadow = decora::DropShadow::new();
        shadow.set_radius(radius).map_err(|e| e.to_string())?;
        shadow
            .set_offset(args.shadow_offset.0, args.shadow_offset.1)
            .map_err(|e| e.to_string())?;
        if let Some(color) = args.shadow_color {
            shadow.set_color(to_skia_color(color));
        }

        last = add(&mut graph, shadow, &[last.into(), last.into()])?;
    }

    let mut adjust = decora::ColorAdjust::new();
    adjust.set_hue(args.hue).map_err(|e| e.to_string())?;
    adjust.set_saturation(args.saturation).map_err(|e| e.to_string())?;
    adjust.set_brightness(args.brightness).map_err(|e| e.to_string())?;
    adjust.set_contrast(args.contrast).map_err(|e| e.to_string())?;
    if adjust != decora::ColorAdjust::default() {
        last = add(&mut graph, adjust, &[last.into()])?;
    }

    if let Some(level) = args.sepia {
        let sepia = decora::SepiaTone::new(level).map_err(|e| e.to_string())?;
        last = add(&mut graph, sepia, &[last.into()])?;
    }

    if let Some(fraction) = args.reflection {
        let mut reflection = decora::Reflection::new();
        reflection.set_fraction(fraction).map_err(|e| e.to_string())?;
        last = add(&mut graph, reflection, &[last.into()])?;
    }

    Ok((graph, last))
}

fn add<E: Into<decora::Effect>>(
    graph: &mut EffectGraph,
    effect: E,
    inputs: &[Input],
) -> Result<EffectId, String> {
    graph.add(effect, inputs).map_err(|e| e.to_string())
}

fn render(
    args: &Args,
    graph: &EffectGraph,
    root: EffectId,
    fctx: &FilterContext,
) -> Result<tiny_skia::Pixmap, String> {
    let ts = tiny_skia::Transform::from_scale(args.scale, args.scale);
    let bounds = graph.bounds(root, &ts, None).round_out();
    if bounds.is_empty() {
        return Err("result is empty".to_string());
    }

    let mut pixmap = tiny_skia::Pixmap::new(bounds.width(), bounds.height())
        .ok_or_else(|| "result is too big".to_string())?;

    // Render the result bounds at the canvas origin.
    let ts = ts.post_translate(-(bounds.x() as f32), -(bounds.y() as f32));
    let clip = decora::IntRect::from_xywh(0, 0, bounds.width(), bounds.height());
    let mut renderer = decora::CanvasRenderer::new(pixmap.as_mut());
    graph.render(root, fctx, &ts, Some(clip), None, &mut renderer);

    Ok(pixmap)
}

/// A simple stderr logger.
static LOGGER: SimpleLogger = SimpleLogger;
struct SimpleLogger;
impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::LevelFilter::Warn
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            let target = if !record.target().is_empty() {
                record.target()
            } else {
                record.module_path().unwrap_or_default()
            };

            let line = record.line().unwrap_or(0);

            match record.level() {
                log::Level::Error => eprintln!("Error (in {}:{}): {}", target, line, record.args()),
                log::Level::Warn  => eprintln!("Warning (in {}:{}): {}", target, line, record.args()),
                log::Level::Info  => eprintln!("Info (in {}:{}): {}", target, line, record.args()),
                log::Level::Debug => eprintln!("Debug (in {}:{}): {}", target, line, record.args()),
                log::Level::Trace => eprintln!("Trace (in {}:{}): {}", target, line, record.args()),
            }
        }
    }

    fn flush(&self) {}
}
