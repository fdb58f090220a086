//! The GeoPin state machine.
//!
//! Tracks the single active pin and its note composer through
//! `Idle -> Dropped -> Editing` and back. All state lives in an
//! explicitly constructed [`PinMachine`] value; there is no ambient
//! context.
//!
//! Saves are asynchronous while the machine is not, so every save
//! captures a draft generation at entry and presents it again on
//! completion. Cancelling, re-dropping, or finishing a save bumps the
//! generation, which turns completions of superseded saves into no-ops.

use tracing::debug;

use loci_core::{Coordinates, Error, GeoPin, Result};

/// The note text being composed, with the last save failure attached.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Draft {
    /// Text as last submitted to save.
    pub text: String,
    /// User-facing reason the last save failed.
    pub error: Option<String>,
}

/// Composer state over the active pin.
#[derive(Debug, Clone, PartialEq)]
pub enum PinState {
    /// No active pin.
    Idle,
    /// A pin is dropped; the composer is closed.
    Dropped { pin: GeoPin },
    /// A pin is dropped and a note is being composed.
    Editing { pin: GeoPin, draft: Draft },
}

/// State machine for the active pin and its draft note.
#[derive(Debug)]
pub struct PinMachine {
    state: PinState,
    generation: u64,
}

impl PinMachine {
    pub fn new() -> Self {
        Self {
            state: PinState::Idle,
            generation: 0,
        }
    }

    /// The current state, for the embedding UI.
    pub fn state(&self) -> &PinState {
        &self.state
    }

    /// The active pin, in any state that has one.
    pub fn active_pin(&self) -> Option<&GeoPin> {
        match &self.state {
            PinState::Idle => None,
            PinState::Dropped { pin } | PinState::Editing { pin, .. } => Some(pin),
        }
    }

    /// Whether a save begun at `generation` is still the current draft.
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    /// Drop a pin, replacing any prior pin and discarding any draft.
    ///
    /// Valid from every state. The new pin starts without a marker; an
    /// in-flight save for the discarded draft becomes stale.
    pub fn drop_pin(&mut self, coordinates: Coordinates) -> GeoPin {
        self.generation += 1;
        let pin = GeoPin::at(coordinates);
        debug!(%coordinates, "Pin dropped");
        self.state = PinState::Dropped { pin: pin.clone() };
        pin
    }

    /// Attach the embedder's marker handle to the active pin.
    pub fn attach_marker(&mut self, marker_ref: impl Into<String>) -> Result<()> {
        match &mut self.state {
            PinState::Dropped { pin } | PinState::Editing { pin, .. } => {
                pin.marker_ref = Some(marker_ref.into());
                Ok(())
            }
            PinState::Idle => Err(Error::Validation("No active pin.".to_string())),
        }
    }

    /// Open the note composer for the dropped pin.
    ///
    /// A no-op when already editing; an error without a pin.
    pub fn start_note(&mut self) -> Result<()> {
        match &self.state {
            PinState::Dropped { pin } => {
                let pin = pin.clone();
                debug!("Composer opened");
                self.state = PinState::Editing {
                    pin,
                    draft: Draft::default(),
                };
                Ok(())
            }
            PinState::Editing { .. } => Ok(()),
            PinState::Idle => Err(Error::Validation(
                "No active pin. Drop a pin first.".to_string(),
            )),
        }
    }

    /// Return to `Idle` from any state.
    ///
    /// Discards the draft and pin marker; an in-flight save for the
    /// discarded draft becomes stale. Also the Escape-key handler.
    pub fn cancel(&mut self) {
        self.generation += 1;
        if !matches!(self.state, PinState::Idle) {
            debug!("Pin and draft discarded");
        }
        self.state = PinState::Idle;
    }

    /// Record the text being saved and hand back the completion token.
    ///
    /// Valid only while editing. Clears any prior save failure from the
    /// draft and returns the generation the completion must present,
    /// together with the pin the note belongs to.
    pub fn begin_save(&mut self, text: &str) -> Result<(u64, GeoPin)> {
        match &mut self.state {
            PinState::Editing { pin, draft } => {
                draft.text = text.to_string();
                draft.error = None;
                Ok((self.generation, pin.clone()))
            }
            PinState::Dropped { .. } => Err(Error::Validation(
                "Note composer is not open.".to_string(),
            )),
            PinState::Idle => Err(Error::Validation(
                "No active pin. Drop a pin first.".to_string(),
            )),
        }
    }

    /// Apply a successful save completion.
    ///
    /// Moves to `Idle` and returns `true` when the generation is still
    /// current; a stale completion is discarded and returns `false`.
    pub fn complete_save(&mut self, generation: u64) -> bool {
        if !self.is_current(generation) {
            debug!(generation, "Discarding stale save completion");
            return false;
        }
        self.generation += 1;
        debug!("Save applied");
        self.state = PinState::Idle;
        true
    }

    /// Apply a failed save completion.
    ///
    /// Attaches the reason to the draft and stays in `Editing` when the
    /// generation is still current; a stale failure is discarded and
    /// returns `false`.
    pub fn fail_save(&mut self, generation: u64, reason: &str) -> bool {
        if !self.is_current(generation) {
            debug!(generation, "Discarding stale save failure");
            return false;
        }
        if let PinState::Editing { draft, .. } = &mut self.state {
            draft.error = Some(reason.to_string());
            true
        } else {
            false
        }
    }
}

impl Default for PinMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn udaipur() -> Coordinates {
        Coordinates::new(24.5854, 73.7125).unwrap()
    }

    #[test]
    fn test_starts_idle() {
        let machine = PinMachine::new();
        assert_eq!(*machine.state(), PinState::Idle);
        assert!(machine.active_pin().is_none());
    }

    #[test]
    fn test_drop_pin_transitions_to_dropped() {
        let mut machine = PinMachine::new();
        let pin = machine.drop_pin(udaipur());
        assert_eq!(pin.coordinates, udaipur());
        assert!(pin.marker_ref.is_none());
        assert!(matches!(machine.state(), PinState::Dropped { .. }));
    }

    #[test]
    fn test_drop_pin_replaces_pin_and_clears_marker() {
        let mut machine = PinMachine::new();
        machine.drop_pin(udaipur());
        machine.attach_marker("marker-1").unwrap();

        let other = Coordinates::new(10.0, 20.0).unwrap();
        let pin = machine.drop_pin(other);
        assert_eq!(pin.coordinates, other);
        assert!(pin.marker_ref.is_none());
    }

    #[test]
    fn test_drop_pin_from_editing_discards_draft() {
        let mut machine = PinMachine::new();
        machine.drop_pin(udaipur());
        machine.start_note().unwrap();

        machine.drop_pin(udaipur());
        assert!(matches!(machine.state(), PinState::Dropped { .. }));
    }

    #[test]
    fn test_attach_marker_requires_pin() {
        let mut machine = PinMachine::new();
        assert!(matches!(
            machine.attach_marker("m"),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_marker_survives_opening_the_composer() {
        let mut machine = PinMachine::new();
        machine.drop_pin(udaipur());
        machine.attach_marker("marker-7").unwrap();
        machine.start_note().unwrap();

        let pin = machine.active_pin().unwrap();
        assert_eq!(pin.marker_ref.as_deref(), Some("marker-7"));
    }

    #[test]
    fn test_start_note_requires_pin() {
        let mut machine = PinMachine::new();
        assert!(matches!(machine.start_note(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_start_note_is_a_noop_while_editing() {
        let mut machine = PinMachine::new();
        machine.drop_pin(udaipur());
        machine.start_note().unwrap();
        let (generation, _) = machine.begin_save("draft text").unwrap();

        machine.start_note().unwrap();

        // The draft survived and its generation is unchanged.
        assert!(machine.is_current(generation));
        match machine.state() {
            PinState::Editing { draft, .. } => assert_eq!(draft.text, "draft text"),
            other => panic!("expected Editing, got {:?}", other),
        }
    }

    #[test]
    fn test_cancel_returns_to_idle_from_any_state() {
        let mut machine = PinMachine::new();
        machine.cancel();
        assert_eq!(*machine.state(), PinState::Idle);

        machine.drop_pin(udaipur());
        machine.cancel();
        assert_eq!(*machine.state(), PinState::Idle);

        machine.drop_pin(udaipur());
        machine.start_note().unwrap();
        machine.cancel();
        assert_eq!(*machine.state(), PinState::Idle);
    }

    #[test]
    fn test_begin_save_requires_editing() {
        let mut machine = PinMachine::new();
        assert!(matches!(
            machine.begin_save("text"),
            Err(Error::Validation(_))
        ));

        machine.drop_pin(udaipur());
        assert!(matches!(
            machine.begin_save("text"),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_begin_save_clears_previous_error() {
        let mut machine = PinMachine::new();
        machine.drop_pin(udaipur());
        machine.start_note().unwrap();

        let (generation, _) = machine.begin_save("first try").unwrap();
        machine.fail_save(generation, "rejected");

        let (_, _) = machine.begin_save("second try").unwrap();
        match machine.state() {
            PinState::Editing { draft, .. } => {
                assert_eq!(draft.text, "second try");
                assert!(draft.error.is_none());
            }
            other => panic!("expected Editing, got {:?}", other),
        }
    }

    #[test]
    fn test_complete_save_moves_to_idle() {
        let mut machine = PinMachine::new();
        machine.drop_pin(udaipur());
        machine.start_note().unwrap();
        let (generation, pin) = machine.begin_save("note").unwrap();
        assert_eq!(pin.coordinates, udaipur());

        assert!(machine.complete_save(generation));
        assert_eq!(*machine.state(), PinState::Idle);
    }

    #[test]
    fn test_fail_save_attaches_reason_and_stays_editing() {
        let mut machine = PinMachine::new();
        machine.drop_pin(udaipur());
        machine.start_note().unwrap();
        let (generation, _) = machine.begin_save("note").unwrap();

        assert!(machine.fail_save(generation, "Note cannot be empty."));
        match machine.state() {
            PinState::Editing { draft, .. } => {
                assert_eq!(draft.error.as_deref(), Some("Note cannot be empty."));
            }
            other => panic!("expected Editing, got {:?}", other),
        }
    }

    #[test]
    fn test_cancel_invalidates_inflight_save() {
        let mut machine = PinMachine::new();
        machine.drop_pin(udaipur());
        machine.start_note().unwrap();
        let (generation, _) = machine.begin_save("note").unwrap();

        machine.cancel();

        assert!(!machine.complete_save(generation));
        assert_eq!(*machine.state(), PinState::Idle);
        assert!(!machine.fail_save(generation, "late failure"));
        assert_eq!(*machine.state(), PinState::Idle);
    }

    #[test]
    fn test_redrop_invalidates_inflight_save() {
        let mut machine = PinMachine::new();
        machine.drop_pin(udaipur());
        machine.start_note().unwrap();
        let (generation, _) = machine.begin_save("note").unwrap();

        let other = Coordinates::new(10.0, 20.0).unwrap();
        machine.drop_pin(other);

        // The late completion neither transitions state nor attaches an
        // error to the new pin's eventual draft.
        assert!(!machine.complete_save(generation));
        assert!(!machine.fail_save(generation, "late failure"));
        match machine.state() {
            PinState::Dropped { pin } => assert_eq!(pin.coordinates, other),
            other => panic!("expected Dropped, got {:?}", other),
        }
    }

    #[test]
    fn test_completed_save_invalidates_duplicate_completion() {
        let mut machine = PinMachine::new();
        machine.drop_pin(udaipur());
        machine.start_note().unwrap();

        let (first, _) = machine.begin_save("note").unwrap();
        let (second, _) = machine.begin_save("note").unwrap();
        assert_eq!(first, second);

        assert!(machine.complete_save(first));
        // The duplicate completion arrives after the draft is gone.
        assert!(!machine.complete_save(second));
        assert_eq!(*machine.state(), PinState::Idle);
    }
}
