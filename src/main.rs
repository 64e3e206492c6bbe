mod api;
mod app;
mod cache;
mod error;
mod logger;
mod ui;
mod utils;
mod view;

fn main() {
    // Config loading logs its own warnings, so the logger goes in first.
    crate::logger::setup(crate::logger::DEFAULT_LEVEL);
    let config = crate::app::Config::load();
    crate::logger::setup(&config.log_level);
    if let Err(e) = crate::utils::RUNTIME.block_on(crate::app::run(config)) {
        log::error!("{e}");
        eprintln!("airtable-inbox: {e}");
        std::process::exit(1);
    }
}
