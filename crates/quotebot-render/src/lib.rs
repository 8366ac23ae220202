//! Chart and table rendering for quotebot
//!
//! This crate turns market data into Discord-ready PNG images. A [`Figure`]
//! is a JSON chart description (plotly-shaped) that is handed to an
//! out-of-process rendering backend over stdin/stdout; the resulting raster
//! is composited onto a branded template and cropped before delivery.

pub mod backend;
pub mod compose;
pub mod error;
pub mod figure;
pub mod layout;
pub mod plots;
pub mod table;

pub use backend::{
    Backend, DEFAULT_TIMEOUT, ProcessTransport, RenderRequest, RenderResult, RenderTransport,
};
pub use compose::{ChartTemplates, autocrop, compose_table};
pub use error::{RenderError, Result};
pub use figure::{Figure, ImageFormat};
pub use layout::{AxisUpdate, LayoutUpdate, Margin};
pub use plots::PlotsResponse;
pub use table::{ColumnFormat, TableRenderSpec, TableSpec, magnitude_color, numerize, stripe_fills};
