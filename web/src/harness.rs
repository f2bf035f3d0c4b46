use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo::events::EventListener;
use gloo::render::{AnimationFrame, request_animation_frame};
use gloo::timers::future::TimeoutFuture;
use gloo::utils::{document, document_element, window};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, HtmlCanvasElement, HtmlElement, KeyboardEvent};

use blokito_core::{FrameClock, UiPhase, action_for_key, canvas_size, cell_size};

use crate::engine::{self, Engine, apply_action};

const MENU_TRANSITION_DELAY_MS: u32 = 500;

/// Loads the engine module and hands control to the harness. A rejection
/// during acquisition or init aborts the boot before anything is wired up.
pub(crate) async fn boot() -> engine::Result<()> {
    let engine = engine::load().await?;
    Harness::start(engine);
    Ok(())
}

/// Owns the engine for the lifetime of the page and orchestrates everything
/// around it: the animation-frame loop, keyboard dispatch, layout
/// synchronization, and the timed menu hand-off.
pub(crate) struct Harness<E: Engine + 'static> {
    engine: RefCell<E>,
    phase: Cell<UiPhase>,
    clock: RefCell<FrameClock>,
    frame: RefCell<Option<AnimationFrame>>,
    listeners: RefCell<Vec<EventListener>>,
    container: Element,
    canvas: HtmlCanvasElement,
    root: HtmlElement,
}

impl<E: Engine + 'static> Harness<E> {
    pub(crate) fn start(engine: E) {
        let harness = Rc::new(Self::new(engine));
        harness.sync_layout();
        harness.install_listeners();
        harness.schedule_frame();
        log::debug!("harness started");
    }

    fn new(engine: E) -> Self {
        let document = document();
        let container = document
            .query_selector(".game-container")
            .expect("query for `.game-container` failed")
            .expect("Could not find `.game-container` element");
        let canvas = document
            .query_selector(".game-canvas")
            .expect("query for `.game-canvas` failed")
            .expect("Could not find `.game-canvas` element")
            .dyn_into::<HtmlCanvasElement>()
            .expect("`.game-canvas` element is not a canvas");
        let root = document_element()
            .dyn_into::<HtmlElement>()
            .expect("document element is not an html element");

        Self {
            engine: RefCell::new(engine),
            phase: Cell::new(UiPhase::default()),
            clock: RefCell::new(FrameClock::new()),
            frame: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
            container,
            canvas,
            root,
        }
    }

    /// Recomputes the on-screen cell size from the container's current box
    /// and the engine's fixed board, then pushes it into the canvas backing
    /// store and the `--cell-size` style variable. Safe to call at any time;
    /// touches presentation only, never simulation state.
    fn sync_layout(&self) {
        let board = self.engine.borrow().board_size();
        let container = (
            self.container.client_width().max(0) as u32,
            self.container.client_height().max(0) as u32,
        );
        let cell = cell_size(container, board);
        let (canvas_w, canvas_h) = canvas_size(board, cell);

        self.canvas.set_width(canvas_w);
        self.canvas.set_height(canvas_h);
        self.root
            .style()
            .set_property("--cell-size", &format!("{cell}px"))
            .expect("Could not set `--cell-size` on the document element");
        self.engine.borrow_mut().resize();

        log::trace!("layout: container {container:?}, cell {cell}px, canvas {canvas_w}x{canvas_h}");
    }

    fn install_listeners(self: &Rc<Self>) {
        let mut listeners = Vec::new();

        let harness = Rc::clone(self);
        listeners.push(EventListener::new(&window(), "resize", move |_| {
            harness.sync_layout();
        }));

        let harness = Rc::clone(self);
        listeners.push(EventListener::new(&document(), "keydown", move |event| {
            let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            dispatch_key(&mut *harness.engine.borrow_mut(), &event.code());
        }));

        let start_control = document()
            .query_selector(".start-button")
            .expect("query for `.start-button` failed");
        match start_control {
            Some(control) => {
                let harness = Rc::clone(self);
                listeners.push(EventListener::new(&control, "click", move |_| {
                    harness.start_menu_transition();
                }));
            }
            None => log::debug!("no `.start-button` control; menu hand-off disabled"),
        }

        *self.listeners.borrow_mut() = listeners;
    }

    fn schedule_frame(self: &Rc<Self>) {
        let harness = Rc::clone(self);
        let handle = request_animation_frame(move |timestamp| {
            harness.on_frame(timestamp);
        });
        *self.frame.borrow_mut() = Some(handle);
    }

    /// One iteration of the render loop. The loop has no stop condition: a
    /// faulting tick is logged and the next frame is scheduled anyway, so a
    /// single bad frame never kills the session.
    fn on_frame(self: &Rc<Self>, timestamp: f64) {
        self.frame.borrow_mut().take();

        let delta_ms = self.clock.borrow_mut().tick(timestamp);
        if let Err(err) = self.engine.borrow_mut().tick(delta_ms) {
            log::error!("frame update failed: {err}");
        }

        self.schedule_frame();
    }

    /// Kicks off the timed menu hand-off, at most once. Activations while a
    /// hand-off is in flight (or after it finished) are ignored.
    fn start_menu_transition(self: &Rc<Self>) {
        let Some(next) = self.phase.get().begin_transition() else {
            log::debug!("start activated while hand-off already in flight");
            return;
        };
        self.phase.set(next);

        let harness = Rc::clone(self);
        spawn_local(async move {
            run_menu_transition(&harness.engine, TimeoutFuture::new).await;
            harness.phase.set(harness.phase.get().finish_transition());
            log::debug!("menu hand-off complete");
        });
    }
}

/// Looks up the key binding and drives exactly one engine action for it.
/// Unbound keys touch nothing.
fn dispatch_key<E: Engine>(engine: &mut E, code: &str) {
    let Some(action) = action_for_key(code) else {
        return;
    };
    log::trace!("{code} -> {action:?}");
    apply_action(engine, action);
}

/// Menu-to-game hand-off: hide the menu, wait, reveal the game, wait, then
/// unpause the simulation. Runs alongside the already-live frame loop.
async fn run_menu_transition<E, S, F>(engine: &RefCell<E>, mut sleep: S)
where
    E: Engine,
    S: FnMut(u32) -> F,
    F: Future<Output = ()>,
{
    engine.borrow_mut().hide_menu();
    sleep(MENU_TRANSITION_DELAY_MS).await;
    engine.borrow_mut().show_game();
    sleep(MENU_TRANSITION_DELAY_MS).await;
    engine.borrow_mut().resume_game();
}
