//! Browser-driven UI suite
//!
//! Each case opens a fresh browser session through a W3C WebDriver server,
//! discovers the BMC web interface among the candidate URLs, drives the login
//! form and inspects the resulting page. The browser is closed after every
//! case regardless of its outcome.

pub mod browser;
pub mod cases;
pub mod driver;
pub mod error;
pub mod login;
pub mod runner;
pub mod settings;
pub mod webdriver;

#[cfg(test)]
pub(crate) mod testing;

pub use browser::{Browser, BrowserLauncher, ElementRef, Locator};
pub use cases::{run_ui_case, UiCase, UiContext};
pub use driver::DriverProcess;
pub use error::{Result, WebUiError};
pub use runner::WebUiSuite;
pub use settings::UiSettings;
pub use webdriver::{WebDriverClient, WebDriverSession};
