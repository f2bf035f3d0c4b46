use clap::Parser;
use wasm_bindgen::prelude::*;

mod engine;
mod harness;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,
}

#[wasm_bindgen(start)]
pub fn run_app() {
    use gloo::utils::window;

    #[cfg(feature = "console_error_panic_hook")]
    {
        console_error_panic_hook::set_once();
    }

    let location_hash = window()
        .location()
        .hash()
        .unwrap_or_else(|_| "".to_string());

    let args = Args::try_parse_from(location_hash.split(['#', '&'])).expect("Could not parse args");
    if let Some(log_level) = args.verbose.log_level() {
        console_log::init_with_level(log_level).expect("Error initializing logger");
    }

    log::debug!("App started");
    wasm_bindgen_futures::spawn_local(async {
        if let Err(err) = harness::boot().await {
            log::error!("engine failed to start: {err}");
        }
    });
}
