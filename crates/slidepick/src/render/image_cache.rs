use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};

use anyhow::{Context, Result};
use eframe::egui;

/// Cap on thumbnail downloads.
const MAX_IMAGE_BYTES: u64 = 32 * 1024 * 1024;

/// Where a thumbnail is fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    File(PathBuf),
    Url(String),
}

/// Resolve a slide path: absolute URLs are used as-is, existing files are
/// read from disk, and anything else is treated as a server path.
pub fn resolve_source(path: &str, base_dir: &Path, server_url: &str) -> ImageSource {
    if path.starts_with("http://") || path.starts_with("https://") {
        return ImageSource::Url(path.to_string());
    }
    let local = base_dir.join(path.trim_start_matches('/'));
    if Path::new(path).is_absolute() && Path::new(path).exists() {
        ImageSource::File(PathBuf::from(path))
    } else if local.exists() {
        ImageSource::File(local)
    } else {
        let separator = if path.starts_with('/') { "" } else { "/" };
        ImageSource::Url(format!(
            "{}{separator}{path}",
            server_url.trim_end_matches('/')
        ))
    }
}

pub enum ImageState<'a> {
    Loading,
    Ready(&'a egui::TextureHandle),
    Failed,
}

enum Entry {
    Loading,
    Ready(egui::TextureHandle),
    Failed,
}

/// Slide thumbnails decoded off the UI thread and uploaded as textures.
pub struct ImageCache {
    base_dir: PathBuf,
    server_url: String,
    entries: HashMap<String, Entry>,
    tx: Sender<(String, Result<egui::ColorImage>)>,
    rx: Receiver<(String, Result<egui::ColorImage>)>,
}

impl ImageCache {
    pub fn new(base_dir: PathBuf, server_url: &str) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            base_dir,
            server_url: server_url.to_string(),
            entries: HashMap::new(),
            tx,
            rx,
        }
    }

    /// Texture for `path`, starting a background load on first request.
    pub fn get(&mut self, ctx: &egui::Context, path: &str) -> ImageState<'_> {
        self.poll(ctx);
        if !self.entries.contains_key(path) {
            self.entries.insert(path.to_string(), Entry::Loading);
            self.spawn_load(ctx.clone(), path.to_string());
        }
        match self.entries.get(path) {
            Some(Entry::Ready(texture)) => ImageState::Ready(texture),
            Some(Entry::Failed) => ImageState::Failed,
            Some(Entry::Loading) | None => ImageState::Loading,
        }
    }

    fn poll(&mut self, ctx: &egui::Context) {
        while let Ok((path, result)) = self.rx.try_recv() {
            let entry = match result {
                Ok(image) => Entry::Ready(ctx.load_texture(
                    format!("thumb:{path}"),
                    image,
                    egui::TextureOptions::LINEAR,
                )),
                Err(e) => {
                    tracing::warn!(%path, "thumbnail unavailable: {e:#}");
                    Entry::Failed
                }
            };
            self.entries.insert(path, entry);
        }
    }

    fn spawn_load(&self, ctx: egui::Context, path: String) {
        let source = resolve_source(&path, &self.base_dir, &self.server_url);
        let tx = self.tx.clone();
        let spawned = std::thread::Builder::new()
            .name("thumbnail".into())
            .spawn(move || {
                let result = load(&source);
                let _ = tx.send((path, result));
                ctx.request_repaint();
            });
        if let Err(e) = spawned {
            tracing::error!("failed to start thumbnail loader: {e}");
        }
    }
}

fn load(source: &ImageSource) -> Result<egui::ColorImage> {
    let bytes = match source {
        ImageSource::File(path) => {
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?
        }
        ImageSource::Url(url) => {
            let mut response = ureq::get(url)
                .call()
                .with_context(|| format!("Failed to fetch {url}"))?;
            let mut bytes = Vec::new();
            response
                .body_mut()
                .as_reader()
                .take(MAX_IMAGE_BYTES)
                .read_to_end(&mut bytes)
                .with_context(|| format!("Failed to read {url}"))?;
            bytes
        }
    };
    decode(&bytes)
}

fn decode(bytes: &[u8]) -> Result<egui::ColorImage> {
    let image = image::load_from_memory(bytes)
        .context("Unsupported image data")?
        .into_rgba8();
    let (w, h) = image.dimensions();
    Ok(egui::ColorImage::from_rgba_unmultiplied(
        [w as usize, h as usize],
        image.as_raw(),
    ))
}
