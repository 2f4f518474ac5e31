pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod html;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::LocalStorage;
pub use config::Settings;
pub use core::{
    engine::RenderEngine,
    pipeline::RenderPipeline,
    renderer::{render_html, RatingRenderer, RenderOptions},
};
pub use html::Document;
pub use utils::error::{RenderError, Result};
