use crate::controller::{ConfirmOutcome, TrialController, TrialError};
use crate::outcome::TrialOutcome;
use overlap_timing::Timer;

/// Pointer input already mapped into canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up,
}

impl<T: Timer> TrialController<T> {
    /// Routes one pointer event. Presses are offered to both sliders, and a
    /// press on the confirm button is a confirm attempt whose outcome is
    /// returned. Input after completion is ignored.
    pub fn handle_pointer<O: TrialOutcome + ?Sized>(
        &mut self,
        event: PointerEvent,
        outcome: &mut O,
    ) -> Result<Option<ConfirmOutcome>, TrialError> {
        if self.is_complete() {
            return Ok(None);
        }

        match event {
            PointerEvent::Down { x, y } => {
                let (size, overlap) = self.controls_mut();
                size.pointer_down(x, y);
                overlap.pointer_down(x, y);
                if self.confirm_button().contains(x, y) {
                    return self.confirm(outcome).map(Some);
                }
            }
            PointerEvent::Move { x, .. } => {
                let (size, overlap) = self.controls_mut();
                size.pointer_move(x);
                overlap.pointer_move(x);
            }
            PointerEvent::Up => {
                let (size, overlap) = self.controls_mut();
                size.pointer_up();
                overlap.pointer_up();
            }
        }
        Ok(None)
    }
}
