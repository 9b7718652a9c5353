//! UI Components

pub mod amount_dialog;
pub mod city_selector;
pub mod footer;
pub mod loading;
pub mod message_dialog;
pub mod navbar;

pub use amount_dialog::AmountDialog;
pub use city_selector::CitySelector;
pub use footer::Footer;
pub use loading::Loading;
pub use message_dialog::MessageDialog;
pub use navbar::Navbar;
