pub mod charts;
pub mod summary;
pub mod svg;

pub use charts::{render_charts, Chart};
pub use summary::{preview, summarize, Summary};
