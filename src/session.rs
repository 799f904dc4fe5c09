// ============================================================================
// Session: the application context the event loop drives
// ============================================================================
//
// Owns everything that lives for the whole run: the immutable configuration,
// the image list, the interaction controller (and through it the active
// selection), the exporter and the decoded pixels of the current image.
// The GUI holds exactly one `Session` and feeds it `InputEvent`s in order.

use std::collections::HashMap;

use image::DynamicImage;

use crate::cli::Config;
use crate::controller::{Action, InputEvent, InteractionController, Outcome};
use crate::error::{ConfigError, ExportError, LoadError, SessionError};
use crate::export::Exporter;
use crate::geometry::ImageBounds;
use crate::io;
use crate::navigator::{ImageNavigator, ImageRef};
use crate::selection::SelectionSet;

/// Result of one handled event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    /// Pointer/click handled by the controller.
    Edit(Outcome),
    /// Patches written for the current image.
    Saved(usize),
    /// A different image is now current.
    ImageChanged,
    /// Navigation hit the first/last image; nothing changed.
    StayedPut,
    Quit,
}

impl Response {
    pub fn is_quit(&self) -> bool {
        matches!(self, Response::Quit)
    }
}

pub struct Session {
    config: Config,
    navigator: ImageNavigator,
    controller: InteractionController,
    exporter: Exporter,
    pixels: Option<DynamicImage>,
    /// Bumped whenever `pixels` is replaced, so views know to re-upload.
    generation: u64,
}

impl Session {
    /// Scan the images directory and set up the first image (not decoded
    /// yet; call [`Session::load_current`]).
    pub fn open(config: Config) -> Result<Self, ConfigError> {
        let images = io::discover_images(&config.images_path)?;
        warn_on_shared_stems(&images);
        crate::log_info!(
            "Found {} image(s) in {}",
            images.len(),
            config.images_path.display()
        );

        let navigator = ImageNavigator::new(images)
            .ok_or_else(|| ConfigError::NoImages(config.images_path.clone()))?;
        let controller = InteractionController::new(config.patch_size, navigator.current().bounds());
        let exporter = Exporter::new(&config.output_path, config.format, config.quality);

        Ok(Self {
            config,
            navigator,
            controller,
            exporter,
            pixels: None,
            generation: 0,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn navigator(&self) -> &ImageNavigator {
        &self.navigator
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn current_image(&self) -> &ImageRef {
        self.navigator.current()
    }

    pub fn selection(&self) -> &SelectionSet {
        self.controller.selection()
    }

    pub fn pixels(&self) -> Option<&DynamicImage> {
        self.pixels.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Decode the current image. On failure the image stays listed but
    /// cannot be edited usefully or saved until it decodes.
    pub fn load_current(&mut self) -> Result<(), LoadError> {
        self.generation += 1;
        let image = self.navigator.current();
        crate::log_info!(
            "Displaying image {} ({})",
            image.path.display(),
            self.navigator.position_label()
        );

        match io::load_image(&image.path) {
            Ok(pixels) => {
                // The decoded size wins over the header size if they disagree.
                let bounds = ImageBounds::new(pixels.width(), pixels.height());
                self.controller.reset(bounds);
                self.pixels = Some(pixels);
                Ok(())
            }
            Err(e) => {
                self.controller.reset(image.bounds());
                self.pixels = None;
                crate::log_err!("{}", e);
                Err(e)
            }
        }
    }

    /// Process one input event. Errors are runtime failures (export or
    /// decode) that the caller reports before carrying on.
    pub fn handle(&mut self, event: InputEvent) -> Result<Response, SessionError> {
        match self.controller.handle(event) {
            Outcome::Action(action) => self.perform(action),
            outcome => {
                log_outcome(&outcome);
                Ok(Response::Edit(outcome))
            }
        }
    }

    fn perform(&mut self, action: Action) -> Result<Response, SessionError> {
        match action {
            Action::Save => Ok(Response::Saved(self.save()?)),
            Action::Next => self.navigate(ImageNavigator::advance),
            Action::Previous => self.navigate(ImageNavigator::retreat),
            Action::Quit => {
                if !self.selection().is_empty() {
                    crate::log_info!(
                        "Quitting with {} unsaved patch(es) on {}",
                        self.selection().len(),
                        self.current_image().file_name()
                    );
                }
                Ok(Response::Quit)
            }
        }
    }

    fn save(&self) -> Result<usize, ExportError> {
        let image = self.navigator.current();
        let pixels = self
            .pixels
            .as_ref()
            .ok_or_else(|| ExportError::NotLoaded(image.path.clone()))?;

        match self.exporter.save(image, pixels, self.controller.selection()) {
            Ok(count) => {
                crate::log_info!("Patches saved for {}: {}", image.file_name(), count);
                Ok(count)
            }
            Err(e) => {
                crate::log_err!("Save failed for {}: {}", image.file_name(), e);
                Err(e)
            }
        }
    }

    fn navigate(&mut self, step: fn(&mut ImageNavigator) -> bool) -> Result<Response, SessionError> {
        if !step(&mut self.navigator) {
            return Ok(Response::StayedPut);
        }
        let dropped = self.selection().len();
        if dropped > 0 {
            crate::log_info!("Discarding {} unsaved patch(es)", dropped);
        }
        self.load_current()?;
        Ok(Response::ImageChanged)
    }
}

fn log_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Added(r) => {
            crate::log_info!("Added patch at ({}, {})", r.x, r.y);
        }
        Outcome::Removed(r) => {
            crate::log_info!("Removed patch at ({}, {})", r.x, r.y);
        }
        _ => {}
    }
}

/// Patches are named after the source stem, so `a.jpg` and `a.png` would
/// write over each other's patches.
fn warn_on_shared_stems(images: &[ImageRef]) {
    let mut seen: HashMap<String, &ImageRef> = HashMap::new();
    for image in images {
        if let Some(first) = seen.insert(image.stem(), image) {
            crate::log_warn!(
                "{} and {} share the name '{}'; their patches will overwrite each other",
                first.file_name(),
                image.file_name(),
                image.stem()
            );
        }
    }
}
