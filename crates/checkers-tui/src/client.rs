//! Client orchestrator: connects networking, session state, and the TUI.
//!
//! Owns the event loop and drives:
//! - [`checkers_client::client_controller::ClientController`] for session dispatch
//! - [`crate::tui::Tui`] for rendering and input

use tokio::time::Duration;

use crate::tui::{Tui, UserIntent};
use checkers_client::client_controller::{ClientController, PollResult};

/// Open the game session at `url` and run until the user quits.
pub async fn start_client(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut ctrl = ClientController::connect_ws(url).await?;

    let mut tui = Tui::setup()?;
    let result = run_event_loop(&mut tui, &mut ctrl).await;
    tui.teardown()?;
    result
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

async fn run_event_loop(
    tui: &mut Tui,
    ctrl: &mut ClientController,
) -> Result<(), Box<dyn std::error::Error>> {
    let input_interval = Duration::from_millis(50);

    loop {
        tui.render(&ctrl.state)?;

        // After a disconnect the session is inert; keep the notice up until
        // the user quits.
        if !ctrl.state.connected {
            if tui.poll_and_handle_input(&ctrl.state)? == UserIntent::Quit {
                break;
            }
            tokio::time::sleep(input_interval).await;
            continue;
        }

        tokio::select! {
            poll = ctrl.recv() => {
                match poll {
                    PollResult::Updated(changed) => {
                        if changed.turn {
                            tui.on_turn_changed(&ctrl.state);
                        }
                    }
                    // Already logged by the session state.
                    PollResult::Rejected(_) => {}
                    PollResult::Disconnected | PollResult::Empty => {}
                }
            }

            _ = tokio::time::sleep(input_interval) => {
                match tui.poll_and_handle_input(&ctrl.state)? {
                    UserIntent::Quit => break,
                    UserIntent::Click(pos) => {
                        ctrl.click(pos);
                    }
                    UserIntent::Skip => {
                        ctrl.skip();
                    }
                    UserIntent::Feedback(text, category) => {
                        ctrl.add_message(text, category);
                    }
                    UserIntent::None => {}
                }
            }
        }
    }

    Ok(())
}
