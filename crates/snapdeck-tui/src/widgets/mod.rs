mod after_deck;
mod help;
mod slides;
mod status_bar;

pub use after_deck::AfterDeckWidget;
pub use help::HelpWidget;
pub use slides::SlidesWidget;
pub use status_bar::StatusBarWidget;
