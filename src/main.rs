use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use sukashi::settings::{
    is_supported_input, parse_color, AnchorPreset, ExportSettings, NamingMode, OutputFormat,
    ResizeMode, WatermarkMode, WatermarkSettings,
};
use sukashi::store::{JsonFileStore, SettingsRecord, SettingsStore, LAST_KEY};
use sukashi::{export_single, run_batch, BatchEvent};

/// Sukashi - watermark images and export them in batch
#[derive(Parser, Debug)]
#[command(name = "sukashi")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the settings/template store
    #[arg(long, default_value = "templates.json", global = true)]
    store: PathBuf,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Watermark and export a single image.
    Single {
        /// Input image file
        input: PathBuf,

        #[command(flatten)]
        wm: WatermarkArgs,

        #[command(flatten)]
        exp: ExportArgs,
    },
    /// Watermark and export a list of images on a background worker.
    Batch {
        /// Input image files, attempted in the order given
        inputs: Vec<PathBuf>,

        /// Add every supported image from this directory (sorted by name)
        #[arg(long)]
        input_dir: Option<PathBuf>,

        #[command(flatten)]
        wm: WatermarkArgs,

        #[command(flatten)]
        exp: ExportArgs,
    },
    /// Manage saved setting templates.
    Template {
        #[command(subcommand)]
        action: TemplateAction,
    },
}

#[derive(Subcommand, Debug)]
enum TemplateAction {
    /// Save the given flags as a named template.
    Save {
        name: String,

        #[command(flatten)]
        wm: WatermarkArgs,

        #[command(flatten)]
        exp: ExportArgs,
    },
    /// List template names.
    List,
    /// Print a template as JSON.
    Show { name: String },
    /// Delete a template.
    Delete { name: String },
}

#[derive(Args, Debug)]
struct WatermarkArgs {
    /// Load watermark/export settings from a saved template first
    #[arg(long)]
    template: Option<String>,

    /// Watermark mode: text or image
    #[arg(long)]
    mode: Option<WatermarkMode>,

    /// Watermark text
    #[arg(long)]
    text: Option<String>,

    /// Font file for the watermark text
    #[arg(long)]
    font: Option<PathBuf>,

    /// Font size in pixels
    #[arg(long)]
    font_size: Option<u32>,

    /// Text color: #RGB, #RRGGBB, r,g,b or a color name
    #[arg(long, value_parser = parse_color_arg)]
    color: Option<[u8; 3]>,

    /// Text opacity percentage (0-100)
    #[arg(long)]
    opacity: Option<i32>,

    /// Stroke width in pixels
    #[arg(long)]
    stroke_width: Option<u32>,

    /// Stroke color
    #[arg(long, value_parser = parse_color_arg)]
    stroke_color: Option<[u8; 3]>,

    /// Draw a drop shadow behind the text
    #[arg(long)]
    shadow: bool,

    /// Shadow offset as dx,dy
    #[arg(long, value_parser = parse_i32_pair)]
    shadow_offset: Option<(i32, i32)>,

    /// Watermark image file (image mode)
    #[arg(long)]
    wm_image: Option<PathBuf>,

    /// Watermark scale relative to the base's shorter side (0.01-5.0)
    #[arg(long)]
    scale: Option<f32>,

    /// Watermark image opacity percentage (0-100)
    #[arg(long)]
    wm_opacity: Option<i32>,

    /// Rotation in degrees
    #[arg(long)]
    rotation: Option<f32>,

    /// Placement preset, e.g. bottom-right or center
    #[arg(long)]
    position: Option<AnchorPreset>,

    /// Edge padding for preset placement as x,y
    #[arg(long, value_parser = parse_u32_pair)]
    offset: Option<(u32, u32)>,

    /// Normalized free position as x,y in [0,1]; overrides the preset
    #[arg(long, value_parser = parse_f32_pair)]
    free_pos: Option<(f32, f32)>,
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Output directory
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Allow writing into the source directory
    #[arg(long)]
    allow_overwrite_dir: bool,

    /// Naming mode: keep, prefix or suffix
    #[arg(long)]
    naming: Option<NamingMode>,

    /// Prefix for prefix naming
    #[arg(long)]
    prefix: Option<String>,

    /// Suffix for suffix naming
    #[arg(long)]
    suffix: Option<String>,

    /// Output format: jpeg or png
    #[arg(long)]
    format: Option<OutputFormat>,

    /// JPEG quality (0-100)
    #[arg(long)]
    quality: Option<i32>,

    /// Resize mode: none, width, height or percent
    #[arg(long)]
    resize_mode: Option<ResizeMode>,

    /// Pixels for width/height resize, percentage for percent resize
    #[arg(long)]
    resize_value: Option<i32>,
}

fn parse_color_arg(s: &str) -> Result<[u8; 3], String> {
    parse_color(s)
}

fn parse_u32_pair(s: &str) -> Result<(u32, u32), String> {
    let (a, b) = split_pair(s)?;
    Ok((
        a.parse().map_err(|_| bad_pair(s))?,
        b.parse().map_err(|_| bad_pair(s))?,
    ))
}

fn parse_i32_pair(s: &str) -> Result<(i32, i32), String> {
    let (a, b) = split_pair(s)?;
    Ok((
        a.parse().map_err(|_| bad_pair(s))?,
        b.parse().map_err(|_| bad_pair(s))?,
    ))
}

fn parse_f32_pair(s: &str) -> Result<(f32, f32), String> {
    let (a, b) = split_pair(s)?;
    Ok((
        a.parse().map_err(|_| bad_pair(s))?,
        b.parse().map_err(|_| bad_pair(s))?,
    ))
}

fn split_pair(s: &str) -> Result<(&str, &str), String> {
    s.split_once(',')
        .map(|(a, b)| (a.trim(), b.trim()))
        .ok_or_else(|| bad_pair(s))
}

fn bad_pair(s: &str) -> String {
    format!("expected two comma-separated values, got '{}'", s)
}

fn main() -> ExitCode {
    // Initialize logging subsystem
    sukashi::logging::init_subscriber().expect("Failed to initialize logging subsystem");

    let cli = Cli::parse();
    let mut store = JsonFileStore::new(&cli.store);

    match cli.cmd {
        Command::Single { input, wm, exp } => {
            let (wm_settings, exp_settings) = build_settings(&wm, &exp, &store);
            run_single(&input, &wm_settings, &exp_settings, &mut store)
        }
        Command::Batch {
            inputs,
            input_dir,
            wm,
            exp,
        } => {
            let (wm_settings, exp_settings) = build_settings(&wm, &exp, &store);
            run_batch_cmd(inputs, input_dir, wm_settings, exp_settings, &mut store)
        }
        Command::Template { action } => run_template(action, &mut store),
    }
}

fn run_single(
    input: &Path,
    wm: &WatermarkSettings,
    exp: &ExportSettings,
    store: &mut JsonFileStore,
) -> ExitCode {
    let outcome = export_single(input, wm, exp);
    remember_last(store, wm, exp);

    if outcome.ok {
        println!("{}", outcome.detail);
        ExitCode::SUCCESS
    } else {
        eprintln!("error: {}", outcome.detail);
        ExitCode::FAILURE
    }
}

fn run_batch_cmd(
    mut files: Vec<PathBuf>,
    input_dir: Option<PathBuf>,
    wm: WatermarkSettings,
    exp: ExportSettings,
    store: &mut JsonFileStore,
) -> ExitCode {
    if let Some(dir) = input_dir {
        match collect_dir(&dir) {
            Ok(mut found) => files.append(&mut found),
            Err(err) => {
                eprintln!("error: cannot read input directory: {}", err);
                return ExitCode::FAILURE;
            }
        }
    }

    if files.is_empty() {
        eprintln!("error: no input files");
        return ExitCode::FAILURE;
    }

    tracing::info!(
        files = files.len(),
        output_dir = %exp.output_dir.display(),
        format = exp.format.as_str(),
        "starting batch export"
    );

    remember_last(store, &wm, &exp);

    let summary = run_batch(files, wm, exp, |event| match event {
        BatchEvent::Progress {
            index,
            total,
            path,
            ok,
            detail,
        } => {
            let status = if *ok { "ok" } else { "failed" };
            println!("[{}/{}] {} {}: {}", index, total, status, path.display(), detail);
        }
        BatchEvent::Finished {
            success_count,
            total,
        } => {
            println!("done: {}/{} exported", success_count, total);
        }
    });

    if summary.success_count == summary.total {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run_template(action: TemplateAction, store: &mut JsonFileStore) -> ExitCode {
    match action {
        TemplateAction::Save { name, wm, exp } => {
            let (wm_settings, exp_settings) = build_settings(&wm, &exp, store);
            let record = SettingsRecord {
                watermark: wm_settings,
                export: exp_settings,
            };
            if let Err(err) = store.save(&name, &record) {
                eprintln!("error: failed to save template: {}", err);
                return ExitCode::FAILURE;
            }
            println!("saved template '{}'", name);
            ExitCode::SUCCESS
        }
        TemplateAction::List => match store.keys() {
            Ok(keys) => {
                for key in keys {
                    println!("{}", key);
                }
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("error: {}", err);
                ExitCode::FAILURE
            }
        },
        TemplateAction::Show { name } => match store.load(&name) {
            Ok(Some(record)) => match serde_json::to_string_pretty(&record) {
                Ok(json) => {
                    println!("{}", json);
                    ExitCode::SUCCESS
                }
                Err(err) => {
                    eprintln!("error: {}", err);
                    ExitCode::FAILURE
                }
            },
            Ok(None) => {
                eprintln!("error: no template named '{}'", name);
                ExitCode::FAILURE
            }
            Err(err) => {
                eprintln!("error: {}", err);
                ExitCode::FAILURE
            }
        },
        TemplateAction::Delete { name } => match store.delete(&name) {
            Ok(true) => {
                println!("deleted template '{}'", name);
                ExitCode::SUCCESS
            }
            Ok(false) => {
                eprintln!("error: no template named '{}'", name);
                ExitCode::FAILURE
            }
            Err(err) => {
                eprintln!("error: {}", err);
                ExitCode::FAILURE
            }
        },
    }
}

/// Build effective settings: template (when named) over defaults, then
/// command-line flags over that.
fn build_settings(
    wm_args: &WatermarkArgs,
    exp_args: &ExportArgs,
    store: &JsonFileStore,
) -> (WatermarkSettings, ExportSettings) {
    let (mut wm, mut exp) = match &wm_args.template {
        Some(name) => match store.load(name) {
            Ok(Some(record)) => (record.watermark, record.export),
            Ok(None) => {
                tracing::warn!(template = %name, "template not found, using defaults");
                (WatermarkSettings::default(), ExportSettings::default())
            }
            Err(err) => {
                tracing::warn!(error = %err, "template store unreadable, using defaults");
                (WatermarkSettings::default(), ExportSettings::default())
            }
        },
        None => (WatermarkSettings::default(), ExportSettings::default()),
    };

    if let Some(v) = wm_args.mode {
        wm.mode = v;
    }
    if let Some(v) = &wm_args.text {
        wm.text = v.clone();
    }
    if let Some(v) = &wm_args.font {
        wm.text_style.font_path = Some(v.clone());
    }
    if let Some(v) = wm_args.font_size {
        wm.text_style.font_size = v;
    }
    if let Some(v) = wm_args.color {
        wm.text_style.color = v;
    }
    if let Some(v) = wm_args.opacity {
        wm.text_style.opacity = v;
    }
    if let Some(v) = wm_args.stroke_width {
        wm.text_style.stroke_width = v;
    }
    if let Some(v) = wm_args.stroke_color {
        wm.text_style.stroke_color = v;
    }
    if wm_args.shadow {
        wm.text_style.shadow = true;
    }
    if let Some(v) = wm_args.shadow_offset {
        wm.text_style.shadow_offset = v;
    }
    if let Some(v) = &wm_args.wm_image {
        wm.image_style.path = Some(v.clone());
    }
    if let Some(v) = wm_args.scale {
        wm.image_style.scale = v;
    }
    if let Some(v) = wm_args.wm_opacity {
        wm.image_style.opacity = v;
    }
    if let Some(v) = wm_args.rotation {
        wm.rotation = v;
    }
    if let Some(v) = wm_args.position {
        wm.position = v;
    }
    if let Some(v) = wm_args.offset {
        wm.offset = v;
    }
    if let Some(v) = wm_args.free_pos {
        wm.free_pos = Some(v);
    }

    if let Some(v) = &exp_args.out_dir {
        exp.output_dir = v.clone();
    }
    if exp_args.allow_overwrite_dir {
        exp.prevent_overwrite = false;
    }
    if let Some(v) = exp_args.naming {
        exp.naming_mode = v;
    }
    if let Some(v) = &exp_args.prefix {
        exp.prefix = v.clone();
    }
    if let Some(v) = &exp_args.suffix {
        exp.suffix = v.clone();
    }
    if let Some(v) = exp_args.format {
        exp.format = v;
    }
    if let Some(v) = exp_args.quality {
        exp.jpeg_quality = v;
    }
    if let Some(v) = exp_args.resize_mode {
        exp.resize_mode = v;
    }
    if let Some(v) = exp_args.resize_value {
        exp.resize_value = v;
    }

    (wm, exp)
}

/// Every supported image in `dir`, sorted by name for a deterministic order.
fn collect_dir(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && is_supported_input(p))
        .collect();
    files.sort();
    Ok(files)
}

fn remember_last(store: &mut JsonFileStore, wm: &WatermarkSettings, exp: &ExportSettings) {
    let record = SettingsRecord {
        watermark: wm.clone(),
        export: exp.clone(),
    };
    if let Err(err) = store.save(LAST_KEY, &record) {
        tracing::warn!(error = %err, "could not persist last-used settings");
    }
}
