//! Rock Dice entry point
//!
//! The core has no window of its own. Natively this runs a scripted headless
//! session through the fixed-step driver and logs the outcome, which is handy
//! for checking a settings file or a seed.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use rock_dice::Settings;
    use rock_dice::consts::SIM_DT;
    use rock_dice::renderer::RenderSnapshot;
    use rock_dice::sim::{GamePhase, GameState, InputEvent, TickInput, advance};

    /// Frames to wait for dice or the scoring animation before giving up
    const SETTLE_FRAMES: u32 = 2000;

    pub fn run() -> Result<(), Box<dyn std::error::Error>> {
        let settings = match std::env::args().nth(1) {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        let mut state = GameState::new(settings)?;
        let mut snapshot = RenderSnapshot::new();

        while !state.phase.is_over() {
            let hands_before = state.level.hands_remaining;

            frame(&mut state, &mut snapshot, InputEvent::Roll)?;
            wait_while(&mut state, &mut snapshot, |s| s.phase == GamePhase::Rolling)?;

            frame(&mut state, &mut snapshot, InputEvent::HeldAll)?;
            log::info!(
                "Holding {} ({} rocks tinted)",
                snapshot.best_hand_name(),
                state.rocks.held_rock_count()
            );

            frame(&mut state, &mut snapshot, InputEvent::Score)?;
            wait_while(&mut state, &mut snapshot, |s| s.phase == GamePhase::Scoring)?;

            if state.level.hands_remaining == hands_before {
                log::warn!("Hand was not played; stopping");
                break;
            }
        }

        log::info!(
            "Level {} ended {:?} after {} ticks: {} points, {} rocks left",
            state.level_index,
            state.phase,
            state.time_ticks,
            state.level.points,
            state.level.rocks_remaining
        );
        for violation in state.check_invariants() {
            log::error!("Invariant violated: {violation}");
        }
        Ok(())
    }

    fn frame(
        state: &mut GameState,
        snapshot: &mut RenderSnapshot,
        event: InputEvent,
    ) -> Result<(), Box<dyn std::error::Error>> {
        advance(state, &TickInput::new(event, None), SIM_DT)?;
        snapshot.capture(state);
        Ok(())
    }

    fn wait_while(
        state: &mut GameState,
        snapshot: &mut RenderSnapshot,
        busy: impl Fn(&GameState) -> bool,
    ) -> Result<(), Box<dyn std::error::Error>> {
        for _ in 0..SETTLE_FRAMES {
            if !busy(state) {
                return Ok(());
            }
            frame(state, snapshot, InputEvent::None)?;
        }
        log::warn!("Still {:?} after {SETTLE_FRAMES} frames", state.phase);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Rock Dice (headless) starting...");

    if let Err(e) = headless::run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The web host drives `sim::advance` itself
}
