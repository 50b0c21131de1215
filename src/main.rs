//! Render a YAML scene file to an image
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::{debug, info, warn, LevelFilter};

use phong_tracer::cameras::Camera;
use phong_tracer::error::Result;
use phong_tracer::output::{ImageWriter, PixelSink};
use phong_tracer::scene::{Scene, SceneFile};
use phong_tracer::tracer::RayTracer;

/// Log levels selectable on the command line
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}
impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "phong-tracer")]
#[command(about = "Recursive Phong ray tracer")]
struct Args {
    /// Scene file with a `scene` and a `camera` section
    scene: PathBuf,

    /// Image width in pixels
    #[arg(long, default_value_t = 500)]
    width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 500)]
    height: u32,

    /// Worker threads, all cores when not given
    #[arg(short, long)]
    threads: Option<usize>,

    /// Output image, the format follows the extension
    #[arg(short, long, default_value = "output.png")]
    output: PathBuf,

    /// Set the logging level
    #[arg(long, value_enum, default_value = "info")]
    log_level: LogLevel,
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.clone().into())
        .init();

    if let Some(threads) = args.threads {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
        {
            warn!("Keeping the default thread pool: {}", e);
        }
    }

    let file = SceneFile::load(&args.scene)?;
    let scene = Scene::from_config(file.scene)?;
    let camera = Camera::from_config(file.camera)?;
    info!(
        "Rendering {:?} to {} at {}x{}",
        scene.name,
        args.output.display(),
        args.width,
        args.height
    );

    let tracer = RayTracer::new(&scene);
    let mut writer = ImageWriter::new(&args.output, args.width, args.height);
    camera.render_image(&tracer, &mut writer)?;
    debug!("Shaded {} hits", tracer.evaluations());
    writer.write()
}
