//! GUI application for inspecting face shape guidelines.
//!
//! Run with: cargo run --features gui --bin face-shape-gui

use std::path::PathBuf;

use eframe::egui;
use face_shape::{
    analyze, render_overlay, Analysis, AnalyzerConfig, Classification, DlibProvider,
    GuidelineLengths, Guidelines, LandmarkProvider, OverlayStyle, Reporter,
};
use image::{DynamicImage, RgbaImage};
use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1024.0, 768.0]),
        ..Default::default()
    };

    eframe::run_native(
        "face-shape - Face Shape Guidelines",
        options,
        Box::new(|cc| Ok(Box::new(FaceShapeApp::new(cc)))),
    )
}

/// Collects the measurements of a run as lines for the side panel.
#[derive(Default)]
struct PanelReporter {
    lines: Vec<String>,
}

impl Reporter for PanelReporter {
    fn guidelines(&mut self, guidelines: &Guidelines) {
        for line in guidelines.iter() {
            self.lines.push(format!(
                "{}: ({:.0}, {:.0}) -> ({:.0}, {:.0})",
                line.kind, line.start.x, line.start.y, line.end.x, line.end.y
            ));
        }
    }

    fn lengths(&mut self, lengths: &GuidelineLengths) {
        self.lines.push(format!("Forehead: {:.1} px", lengths.forehead));
        self.lines.push(format!("Ear:      {:.1} px", lengths.ear));
        self.lines.push(format!("Jaw:      {:.1} px", lengths.jaw));
        self.lines.push(format!("Length:   {:.1} px", lengths.face_length));
    }

    fn classification(&mut self, classification: &Classification) {
        if classification.is_empty() {
            self.lines.push("No face shape rule matched".to_string());
        }
        for label in classification.labels() {
            self.lines.push(format!("Face shape: {}", label));
        }
    }
}

struct FaceShapeApp {
    // Image state
    original_image: Option<DynamicImage>,
    display_texture: Option<egui::TextureHandle>,
    image_path: Option<PathBuf>,

    // Models
    provider: Option<DlibProvider>,

    // Results
    analysis: Option<Analysis>,
    report: Vec<String>,
    status: String,

    // Settings
    config: AnalyzerConfig,
    landmark_model_path: String,
    face_detector_model_path: String,
}

impl FaceShapeApp {
    fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self {
            original_image: None,
            display_texture: None,
            image_path: None,
            provider: None,
            analysis: None,
            report: Vec::new(),
            status: "Load an image and models to begin".to_string(),
            config: AnalyzerConfig::default(),
            landmark_model_path: "dlib-models/shape_predictor_68_face_landmarks.dat.bz2"
                .to_string(),
            face_detector_model_path: "seeta_fd_frontal_v1.0.bin".to_string(),
        }
    }

    fn load_models(&mut self) {
        match DlibProvider::open(
            &self.face_detector_model_path,
            &self.landmark_model_path,
            &self.config.detector,
        ) {
            Ok(provider) => {
                self.status = format!(
                    "Models loaded ({} landmarks)",
                    provider.predictor().num_landmarks()
                );
                self.provider = Some(provider);
            }
            Err(e) => {
                self.status = format!("Failed to load models: {}", e);
            }
        }
    }

    fn load_image(&mut self, path: PathBuf) {
        match image::open(&path) {
            Ok(img) => {
                self.original_image = Some(img);
                self.image_path = Some(path.clone());
                self.analysis = None;
                self.report.clear();
                self.display_texture = None;
                self.status = format!("Loaded: {}", path.display());
            }
            Err(e) => {
                self.status = format!("Failed to load image: {}", e);
            }
        }
    }

    fn classify(&mut self) {
        let Some(ref img) = self.original_image else {
            self.status = "No image loaded".to_string();
            return;
        };

        let Some(ref mut provider) = self.provider else {
            self.status = "Models not loaded".to_string();
            return;
        };

        let mut reporter = PanelReporter::default();
        let result = provider
            .locate(img)
            .and_then(|landmarks| analyze(&landmarks, &self.config.classifier, &mut reporter));

        match result {
            Ok(analysis) => {
                self.analysis = Some(analysis);
                self.status = "Classified".to_string();
            }
            Err(e) => {
                self.analysis = None;
                self.status = format!("Classification failed: {}", e);
            }
        }
        self.report = reporter.lines;

        // Clear texture to force redraw
        self.display_texture = None;
    }

    fn render_results(&mut self, ctx: &egui::Context) {
        let Some(ref img) = self.original_image else {
            return;
        };

        let rgba = match self.analysis {
            Some(ref analysis) => {
                let style = OverlayStyle {
                    scale_bar: Some(self.config.classifier.tolerance),
                    ..Default::default()
                };
                render_overlay(img, &analysis.guidelines, &style)
            }
            None => img.to_rgba8(),
        };

        self.display_texture = Some(ctx.load_texture("result", to_color_image(&rgba), Default::default()));
    }
}

fn to_color_image(rgba: &RgbaImage) -> egui::ColorImage {
    let (width, height) = rgba.dimensions();
    egui::ColorImage::from_rgba_unmultiplied([width as usize, height as usize], rgba.as_raw())
}

impl eframe::App for FaceShapeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("menu").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Image...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Images", &["png", "jpg", "jpeg", "bmp", "gif"])
                            .pick_file()
                        {
                            self.load_image(path);
                        }
                        ui.close_menu();
                    }
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });
        });

        egui::SidePanel::left("controls").min_width(250.0).show(ctx, |ui| {
            ui.heading("Models");
            ui.separator();

            ui.label("Face Detector Model:");
            ui.text_edit_singleline(&mut self.face_detector_model_path);
            ui.label("Landmark Model:");
            ui.text_edit_singleline(&mut self.landmark_model_path);
            ui.add(
                egui::Slider::new(&mut self.config.detector.min_face_size, 10..=200)
                    .text("Min Face Size"),
            );
            if ui.button("Load Models").clicked() {
                self.load_models();
            }
            ui.add_space(16.0);

            ui.heading("Classification");
            ui.separator();

            ui.add(
                egui::Slider::new(&mut self.config.classifier.tolerance, 0.0..=100.0)
                    .text("Tolerance (px)"),
            );
            if ui.button("Classify").clicked() {
                self.classify();
            }
            ui.add_space(16.0);

            ui.heading("Status");
            ui.separator();
            ui.label(&self.status);

            if !self.report.is_empty() {
                ui.add_space(8.0);
                for line in &self.report {
                    ui.monospace(line);
                }
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.original_image.is_some() && self.display_texture.is_none() {
                self.render_results(ctx);
            }

            if let Some(ref texture) = self.display_texture {
                let available_size = ui.available_size();
                let texture_size = texture.size_vec2();

                // Scale to fit
                let scale = (available_size.x / texture_size.x)
                    .min(available_size.y / texture_size.y)
                    .min(1.0);
                let display_size = texture_size * scale;

                ui.centered_and_justified(|ui| {
                    ui.image((texture.id(), display_size));
                });
            } else {
                ui.centered_and_justified(|ui| {
                    ui.heading("Drag and drop an image or use File > Open");
                });
            }
        });

        // Handle drag and drop
        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|file| file.path.clone())
                .collect()
        });
        if let Some(path) = dropped.into_iter().last() {
            self.load_image(path);
        }
    }
}
