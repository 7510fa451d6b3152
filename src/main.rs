/// Entry point and game loop.
///
/// The loop owns the clock. Each frame it:
///   1. drains keyboard and gamepad actions into the controller
///   2. completes the in-flight roll once its animation time is up
///   3. advances the controller's reset clock
///   4. plays sounds for new events and redraws

mod ui;

use std::time::{Duration, Instant};

use anyhow::Context;
use log::info;

use blockroll::config::GameConfig;
use blockroll::sim::controller::LevelController;
use blockroll::sim::level::load_sequence;
use ui::gamepad::GamepadState;
use ui::input::{Action, InputState};
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = GameConfig::load();
    let levels = load_sequence(&config.levels_dir).context("no playable levels")?;
    info!("{} levels: {}", levels.len(), levels.names().collect::<Vec<_>>().join(", "));
    let mut ctl = LevelController::new(levels, config.timing.delays(), config.start_level);

    let mut renderer = Renderer::new();
    renderer.init().context("terminal init failed")?;

    let sound = SoundEngine::new();

    let result = game_loop(&mut ctl, &mut renderer, sound.as_ref(), &config);
    let cleanup = renderer.cleanup().context("terminal cleanup failed");
    result?;
    cleanup?;

    println!();
    println!("Thanks for playing Block Roll!");
    println!("Reached level {} of {}.", ctl.level_index() + 1, ctl.level_count());
    Ok(())
}

fn game_loop(
    ctl: &mut LevelController,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> anyhow::Result<()> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    if gp.connected {
        info!("gamepad connected");
    }

    let tick_rate = config.timing.tick_rate();
    let roll_time = config.timing.roll_duration();
    let mut roll_started: Option<Instant> = None;
    let mut last_tick = Instant::now();

    loop {
        let actions: Vec<Action> = kb.drain_events().iter()
            .chain(gp.update().iter())
            .copied()
            .collect();

        for action in actions {
            match action {
                Action::Quit => {
                    info!("quit at level {}", ctl.level_index() + 1);
                    return Ok(());
                }
                Action::Restart => {
                    ctl.restart_level();
                    roll_started = None;
                }
                Action::Skip => {
                    ctl.skip_level();
                    roll_started = None;
                }
                Action::Roll(dir) => {
                    // Rejected requests (busy or not playing) are simply dropped
                    if ctl.submit_move(dir).is_accepted() {
                        roll_started = Some(Instant::now());
                    }
                }
            }
        }

        if roll_started.is_some_and(|t| t.elapsed() >= roll_time) {
            ctl.on_move_animation_complete();
            roll_started = None;
        }

        let now = Instant::now();
        let dt = now - last_tick;
        if dt >= tick_rate {
            last_tick = now;
            if ctl.advance(dt).is_some() {
                roll_started = None;
            }
            for event in ctl.take_events() {
                if let Some(sfx) = sound {
                    sfx.on_event(&event);
                }
            }
            renderer.render(ctl).context("render failed")?;
        }

        std::thread::sleep(FRAME_SLEEP);
    }
}
