pub mod engine;
pub mod number;
pub mod pipeline;
pub mod renderer;
pub mod report;

pub use crate::domain::model::{RenderSummary, SkipReason, WidgetOutcome};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
