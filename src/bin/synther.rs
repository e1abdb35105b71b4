use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "synther", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the randomized animation, write the dataset manifest, and bake
    /// the keyframed scene.
    Generate(GenerateArgs),
    /// Generate loxodrome camera-path points as JSON.
    Path(PathArgs),
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Input scene JSON.
    #[arg(long)]
    scene: PathBuf,

    /// Generation config JSON.
    #[arg(long)]
    config: PathBuf,

    /// Where to write the baked scene JSON (omit to skip).
    #[arg(long = "out-scene")]
    out_scene: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct PathArgs {
    /// Sweep only down to the equator instead of the full sphere.
    #[arg(long)]
    half: bool,

    /// Output JSON path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Generate(args) => cmd_generate(args),
        Command::Path(args) => cmd_path(args),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> anyhow::Result<T> {
    let f = File::open(path).with_context(|| format!("open {what} '{}'", path.display()))?;
    let r = BufReader::new(f);
    serde_json::from_reader(r).with_context(|| format!("parse {what} JSON"))
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let mut scene: synther::Scene = read_json(&args.scene, "scene")?;
    let config: synther::GeneratorConfig = read_json(&args.config, "config")?;

    let mut generator = synther::DatasetGenerator::new(&mut scene, config)?;
    let mut host = synther::BakeRenderHost::new();
    generator.run(&mut scene, &mut host)?;

    eprintln!(
        "baked {} frames ({}..={})",
        host.rendered_frames.len(),
        generator.frame_range().first.0,
        generator.frame_range().last.0
    );

    if let Some(out_scene) = args.out_scene {
        if let Some(parent) = out_scene.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
        let f = File::create(&out_scene)
            .with_context(|| format!("create baked scene '{}'", out_scene.display()))?;
        serde_json::to_writer_pretty(f, &scene).with_context(|| "write baked scene JSON")?;
        eprintln!("wrote {}", out_scene.display());
    }

    Ok(())
}

fn cmd_path(args: PathArgs) -> anyhow::Result<()> {
    let spec = if args.half {
        synther::LoxodromeSpec::half_sphere()
    } else {
        synther::LoxodromeSpec::default()
    };
    let points = synther::loxodrome_points(&spec)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let f = File::create(&args.out)
        .with_context(|| format!("create path output '{}'", args.out.display()))?;
    serde_json::to_writer_pretty(f, &points).with_context(|| "write path JSON")?;

    eprintln!("wrote {} points to {}", points.len(), args.out.display());
    Ok(())
}
