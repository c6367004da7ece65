mod app;
mod asset;
mod catalog;
mod config;
mod export;
mod scale;
mod thumbnail;
mod view_model;

fn main() -> iced::Result {
    env_logger::init();
    app::run()
}
