//! CLI application for face shape classification.
//!
//! Usage:
//!   face-shape <image>                            # Human-readable output
//!   face-shape <image> --json                     # JSON output
//!   face-shape <image> --overlay guidelines.png   # Also draw the guidelines
//!   face-shape <image> --from-landmarks face.json # Skip detection

use std::path::PathBuf;

use clap::Parser;
use face_shape::{
    analyze, render_overlay, Analysis, AnalyzerConfig, BoundingBox, DlibProvider, FaceShape,
    LandmarkProvider, OverlayStyle, RecordedLandmarks, Result, TracingReporter,
};
use image::GenericImageView;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "face-shape")]
#[command(author, version, about = "Face shape classification from facial landmarks", long_about = None)]
struct Args {
    /// Input image file
    #[arg(required = true)]
    image: PathBuf,

    /// Output as JSON
    #[arg(short, long)]
    json: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Face detector model path
    #[arg(long, default_value = "seeta_fd_frontal_v1.0.bin")]
    detector: PathBuf,

    /// Landmark model path (dlib .dat/.dat.bz2, or a .bin cache)
    #[arg(long, default_value = "shape_predictor_68_face_landmarks.dat.bz2")]
    landmarks: PathBuf,

    /// Use landmarks from a JSON file instead of running detection
    #[arg(long, conflicts_with = "save_model_cache")]
    from_landmarks: Option<PathBuf>,

    /// Write the located landmarks as JSON
    #[arg(long)]
    save_landmarks: Option<PathBuf>,

    /// Write the loaded landmark model as a .bin cache
    #[arg(long)]
    save_model_cache: Option<PathBuf>,

    /// Settings file (JSON); flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Largest length difference, in pixels, treated as equal
    #[arg(long)]
    tolerance: Option<f32>,

    /// Minimum face size for detection
    #[arg(long)]
    min_face_size: Option<u32>,

    /// Write the image with the guidelines drawn on it
    #[arg(long)]
    overlay: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Output structure for JSON serialization
#[derive(Serialize)]
struct Output<'a> {
    image: String,
    width: u32,
    height: u32,
    tolerance: f32,
    face_box: BoundingBox,
    #[serde(flatten)]
    analysis: &'a Analysis,
    labels: Vec<FaceShape>,
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn default_level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &Args) -> Result<AnalyzerConfig> {
    let mut config = match args.config {
        Some(ref path) => AnalyzerConfig::load(path)?,
        None => AnalyzerConfig::default(),
    };

    if let Some(tolerance) = args.tolerance {
        config.classifier.tolerance = tolerance;
    }
    if let Some(min_face_size) = args.min_face_size {
        config.detector.min_face_size = min_face_size;
    }
    Ok(config)
}

fn provider(args: &Args, config: &AnalyzerConfig) -> Result<Box<dyn LandmarkProvider>> {
    if let Some(ref path) = args.from_landmarks {
        info!(path = %path.display(), "using recorded landmarks");
        return Ok(Box::new(RecordedLandmarks::load(path)?));
    }

    let provider = DlibProvider::open(&args.detector, &args.landmarks, &config.detector)?;
    if let Some(ref path) = args.save_model_cache {
        provider.predictor().save(path)?;
        info!(path = %path.display(), "landmark model cache written");
    }
    Ok(Box::new(provider))
}

fn run(args: &Args) -> Result<()> {
    let config = load_config(args)?;
    let mut provider = provider(args, &config)?;

    info!(path = %args.image.display(), "loading image");
    let img = image::open(&args.image)?;
    let (width, height) = img.dimensions();

    let landmarks = provider.locate(&img)?;
    if let Some(ref path) = args.save_landmarks {
        landmarks.save(path)?;
        info!(path = %path.display(), "landmarks written");
    }

    let analysis = analyze(&landmarks, &config.classifier, &mut TracingReporter)?;

    if let Some(ref path) = args.overlay {
        let style = OverlayStyle {
            scale_bar: Some(config.classifier.tolerance),
            ..Default::default()
        };
        render_overlay(&img, &analysis.guidelines, &style).save(path)?;
        info!(path = %path.display(), "overlay written");
    }

    let output = Output {
        image: args.image.display().to_string(),
        width,
        height,
        tolerance: config.classifier.tolerance,
        face_box: landmarks.face_box,
        analysis: &analysis,
        labels: analysis.classification.labels(),
    };

    let output_str = if args.json {
        serde_json::to_string_pretty(&output)?
    } else {
        format_human_readable(&output)
    };

    if let Some(ref path) = args.output {
        std::fs::write(path, &output_str)?;
        info!(path = %path.display(), "output written");
    } else {
        println!("{}", output_str);
    }

    Ok(())
}

fn format_human_readable(output: &Output) -> String {
    let mut s = String::new();
    let analysis = output.analysis;

    s.push_str(&format!("Image: {} ({}x{})\n", output.image, output.width, output.height));
    s.push_str(&format!(
        "Face box: {:.0}x{:.0} at ({:.0}, {:.0})\n",
        output.face_box.width, output.face_box.height, output.face_box.x, output.face_box.y
    ));

    s.push_str("\nGuidelines:\n");
    for line in analysis.guidelines.iter() {
        s.push_str(&format!(
            "  {:<12} ({:>6.1}, {:>6.1}) -> ({:>6.1}, {:>6.1})  {:>7.1} px\n",
            format!("{}:", line.kind),
            line.start.x,
            line.start.y,
            line.end.x,
            line.end.y,
            line.length()
        ));
    }

    s.push_str(&format!("\nFace width:   {:.1} px\n", analysis.face_width));
    s.push_str(&format!("Width/length: {:.3}\n", analysis.width_to_length));
    s.push_str(&format!("Tolerance:    {:.1} px\n\n", output.tolerance));

    if output.labels.is_empty() {
        s.push_str("No face shape rule matched\n");
    }
    for label in &output.labels {
        s.push_str(&format!("You have {} {} face\n", article(*label), label));
    }

    s
}

fn article(shape: FaceShape) -> &'static str {
    match shape {
        FaceShape::Oval | FaceShape::Oblong => "an",
        _ => "a",
    }
}
