use thiserror::Error;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use blokito_core::Action;

/// Failure surfaced by the external engine module, carrying whatever text the
/// thrown value had.
#[derive(Error, Debug)]
#[error("{0}")]
pub(crate) struct EngineError(String);

impl EngineError {
    fn from_js(value: JsValue) -> Self {
        let text = value
            .dyn_ref::<js_sys::Error>()
            .map(|err| String::from(err.message()))
            .unwrap_or_else(|| format!("{value:?}"));
        Self(text)
    }
}

pub(crate) type Result<T> = core::result::Result<T, EngineError>;

/// Operations the harness drives on the engine. The loaded wasm module is the
/// one real implementation; tests substitute a recording double.
///
/// Every action is a zero-argument mutation the engine accepts in any
/// simulation phase. `tick` is the only call that can fault.
pub(crate) trait Engine {
    fn tick(&mut self, delta_ms: f64) -> Result<()>;
    fn resize(&mut self);
    fn move_left(&mut self);
    fn move_right(&mut self);
    fn rotate(&mut self);
    fn soft_drop(&mut self);
    fn hard_drop(&mut self);
    fn hold(&mut self);
    fn hide_menu(&mut self);
    fn show_game(&mut self);
    fn resume_game(&mut self);
    fn board_size(&self) -> (u32, u32);
}

/// Routes one recognized action to exactly one engine call.
pub(crate) fn apply_action<E: Engine>(engine: &mut E, action: Action) {
    match action {
        Action::MoveLeft => engine.move_left(),
        Action::MoveRight => engine.move_right(),
        Action::Rotate => engine.rotate(),
        Action::SoftDrop => engine.soft_drop(),
        Action::HardDrop => engine.hard_drop(),
        Action::Hold => engine.hold(),
    }
}

#[wasm_bindgen(module = "blokito-engine")]
extern "C" {
    /// Compiles and instantiates the engine's wasm payload. Nothing else in
    /// the module may be touched until this settles.
    #[wasm_bindgen(catch)]
    async fn init() -> core::result::Result<JsValue, JsValue>;

    type Game;

    #[wasm_bindgen(constructor, catch)]
    fn new() -> core::result::Result<Game, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn tick(this: &Game, delta_ms: f64) -> core::result::Result<(), JsValue>;

    #[wasm_bindgen(method)]
    fn resize(this: &Game);

    #[wasm_bindgen(method)]
    fn move_left(this: &Game);

    #[wasm_bindgen(method)]
    fn move_right(this: &Game);

    #[wasm_bindgen(method)]
    fn rotate(this: &Game);

    #[wasm_bindgen(method)]
    fn soft_drop(this: &Game);

    #[wasm_bindgen(method)]
    fn hard_drop(this: &Game);

    #[wasm_bindgen(method)]
    fn hold(this: &Game);

    #[wasm_bindgen(method)]
    fn hide_menu(this: &Game);

    #[wasm_bindgen(method)]
    fn show_game(this: &Game);

    #[wasm_bindgen(method)]
    fn resume_game(this: &Game);

    #[wasm_bindgen(method, getter)]
    fn width(this: &Game) -> u32;

    #[wasm_bindgen(method, getter)]
    fn height(this: &Game) -> u32;
}

/// Exclusive handle over the loaded engine. Constructed once per session and
/// never rebuilt; resizes reach it as presentation updates only.
pub(crate) struct WasmEngine {
    game: Game,
}

/// Acquires the engine module and waits for its initialization entry point,
/// then constructs the handle. Any rejection aborts the boot.
pub(crate) async fn load() -> Result<WasmEngine> {
    init().await.map_err(EngineError::from_js)?;
    let game = Game::new().map_err(EngineError::from_js)?;
    Ok(WasmEngine { game })
}

impl Engine for WasmEngine {
    fn tick(&mut self, delta_ms: f64) -> Result<()> {
        self.game.tick(delta_ms).map_err(EngineError::from_js)
    }

    fn resize(&mut self) {
        self.game.resize();
    }

    fn move_left(&mut self) {
        self.game.move_left();
    }

    fn move_right(&mut self) {
        self.game.move_right();
    }

    fn rotate(&mut self) {
        self.game.rotate();
    }

    fn soft_drop(&mut self) {
        self.game.soft_drop();
    }

    fn hard_drop(&mut self) {
        self.game.hard_drop();
    }

    fn hold(&mut self) {
        self.game.hold();
    }

    fn hide_menu(&mut self) {
        self.game.hide_menu();
    }

    fn show_game(&mut self) {
        self.game.show_game();
    }

    fn resume_game(&mut self) {
        self.game.resume_game();
    }

    fn board_size(&self) -> (u32, u32) {
        (self.game.width(), self.game.height())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Engine double that records every call in order.
    #[derive(Default)]
    pub(crate) struct RecordingEngine {
        pub(crate) calls: Vec<&'static str>,
        pub(crate) fail_ticks: bool,
    }

    impl Engine for RecordingEngine {
        fn tick(&mut self, _delta_ms: f64) -> Result<()> {
            self.calls.push("tick");
            if self.fail_ticks {
                Err(EngineError("tick exploded".into()))
            } else {
                Ok(())
            }
        }

        fn resize(&mut self) {
            self.calls.push("resize");
        }

        fn move_left(&mut self) {
            self.calls.push("move_left");
        }

        fn move_right(&mut self) {
            self.calls.push("move_right");
        }

        fn rotate(&mut self) {
            self.calls.push("rotate");
        }

        fn soft_drop(&mut self) {
            self.calls.push("soft_drop");
        }

        fn hard_drop(&mut self) {
            self.calls.push("hard_drop");
        }

        fn hold(&mut self) {
            self.calls.push("hold");
        }

        fn hide_menu(&mut self) {
            self.calls.push("hide_menu");
        }

        fn show_game(&mut self) {
            self.calls.push("show_game");
        }

        fn resume_game(&mut self) {
            self.calls.push("resume_game");
        }

        fn board_size(&self) -> (u32, u32) {
            (10, 20)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingEngine;
    use super::*;

    #[test]
    fn every_action_makes_exactly_one_engine_call() {
        let actions = [
            (Action::MoveLeft, "move_left"),
            (Action::MoveRight, "move_right"),
            (Action::Rotate, "rotate"),
            (Action::SoftDrop, "soft_drop"),
            (Action::HardDrop, "hard_drop"),
            (Action::Hold, "hold"),
        ];

        for (action, expected) in actions {
            let mut engine = RecordingEngine::default();
            apply_action(&mut engine, action);
            assert_eq!(engine.calls, [expected]);
        }
    }

    #[test]
    fn faulting_tick_reports_the_thrown_text() {
        let mut engine = RecordingEngine {
            fail_ticks: true,
            ..Default::default()
        };

        let err = engine.tick(16.0).unwrap_err();
        assert_eq!(err.to_string(), "tick exploded");
    }
}
