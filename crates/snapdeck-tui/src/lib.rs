pub mod app;
pub mod backdrop;
pub mod deck;
pub mod event;
pub mod host;
pub mod input;
pub mod scroll;
pub mod theme;
pub mod widgets;

pub use app::App;
pub use deck::DeckFile;
pub use theme::Theme;
