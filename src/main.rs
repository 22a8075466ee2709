mod app;
mod auth;
mod config;
mod feed;
mod forms;
mod hearts;
mod loader;
mod message;
mod motion;
mod player;
mod reels;
mod root;
mod share;
mod state;
mod toast;
mod ui;

use config::Config;
use state::App;

fn main() -> iced::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("reelsify=info"))
        .init();

    let config = Config::load();
    log::info!("Reelsify starting, data dir {}", config.data_dir.display());
    let window_size = iced::Size::new(config.window_width, config.window_height);

    iced::application(move || App::boot(config.clone()), App::update, App::view)
        .title("Reelsify")
        .subscription(App::subscription)
        .window_size(window_size)
        .run()
}
