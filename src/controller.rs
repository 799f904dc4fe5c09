// ============================================================================
// Interaction controller: hover preview, click to commit, keys to act
// ============================================================================
//
// Flat two-state machine:
//
//   Idle  --pointer moved-->  Hover  (preview recomputed on every move)
//   Hover --pointer left--->  Idle   (preview cleared)
//
// Clicks and moves mutate the selection and report an outcome; key presses
// are turned into an `Action` that the session carries out (save, navigate,
// quit). Nothing in here is fallible; a rejected click is an expected,
// frequent user action, not an error.

use crate::geometry::{ImageBounds, PatchRect, Point, clamp_anchor, is_valid_placement};
use crate::selection::SelectionSet;

/// Raw input, already converted to image-space pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    PointerMoved(Point),
    PointerLeft,
    LeftClick,
    MiddleClick(Point),
    Key(KeyCommand),
    /// Window close button; treated exactly like `q`.
    CloseRequested,
}

/// The four bound keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    /// `s`
    Save,
    /// `d`
    Next,
    /// `a`
    Previous,
    /// `q`
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Hover,
}

/// What the controller did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    PreviewUpdated(PatchRect),
    PreviewCleared,
    Added(PatchRect),
    /// Preview overlaps an accepted patch or does not fit the image.
    Rejected(PatchRect),
    /// Left click with no preview on screen.
    Ignored,
    Removed(PatchRect),
    NothingToRemove,
    /// Work the controller cannot do itself.
    Action(Action),
}

/// Requests handed back to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Save,
    Next,
    Previous,
    Quit,
}

impl From<KeyCommand> for Action {
    fn from(key: KeyCommand) -> Self {
        match key {
            KeyCommand::Save => Action::Save,
            KeyCommand::Next => Action::Next,
            KeyCommand::Previous => Action::Previous,
            KeyCommand::Quit => Action::Quit,
        }
    }
}

/// Owns the active selection set and the preview rectangle.
#[derive(Debug, Clone)]
pub struct InteractionController {
    patch_size: u32,
    bounds: ImageBounds,
    state: InteractionState,
    preview: Option<PatchRect>,
    selection: SelectionSet,
}

impl InteractionController {
    pub fn new(patch_size: u32, bounds: ImageBounds) -> Self {
        Self {
            patch_size,
            bounds,
            state: InteractionState::Idle,
            preview: None,
            selection: SelectionSet::new(),
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn preview(&self) -> Option<PatchRect> {
        self.preview
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn bounds(&self) -> ImageBounds {
        self.bounds
    }

    pub fn patch_size(&self) -> u32 {
        self.patch_size
    }

    /// Drop all unsaved patches and the preview, and switch to a new image.
    pub fn reset(&mut self, bounds: ImageBounds) {
        self.selection.clear();
        self.preview = None;
        self.state = InteractionState::Idle;
        self.bounds = bounds;
    }

    pub fn handle(&mut self, event: InputEvent) -> Outcome {
        match event {
            InputEvent::PointerMoved(p) => self.pointer_moved(p),
            InputEvent::PointerLeft => {
                self.preview = None;
                self.state = InteractionState::Idle;
                Outcome::PreviewCleared
            }
            InputEvent::LeftClick => self.commit_preview(),
            InputEvent::MiddleClick(p) => match self.selection.remove_at(p) {
                Some(rect) => Outcome::Removed(rect),
                None => Outcome::NothingToRemove,
            },
            InputEvent::Key(key) => Outcome::Action(key.into()),
            InputEvent::CloseRequested => Outcome::Action(Action::Quit),
        }
    }

    fn pointer_moved(&mut self, pointer: Point) -> Outcome {
        let anchor = clamp_anchor(pointer, self.patch_size, self.bounds);
        let rect = PatchRect::at(anchor, self.patch_size);
        self.preview = Some(rect);
        self.state = InteractionState::Hover;
        Outcome::PreviewUpdated(rect)
    }

    fn commit_preview(&mut self) -> Outcome {
        let Some(rect) = self.preview else {
            return Outcome::Ignored;
        };
        if is_valid_placement(&rect, self.selection.all(), self.bounds) {
            self.selection.add(rect);
            Outcome::Added(rect)
        } else {
            Outcome::Rejected(rect)
        }
    }
}
