mod app;
mod audio;
mod config;
mod library;
mod metadata;
mod mpris;
mod playlist;
mod queue;
mod runtime;
mod session;
mod store;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    colog::init();
    runtime::run()
}
