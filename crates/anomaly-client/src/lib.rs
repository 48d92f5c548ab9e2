//! Where anomaly grids come from.
//!
//! [`AnomalySource`] is the seam between the renderer and the outside world.
//! Two implementations are provided:
//! - [`HttpAnomalySource`]: the anomaly service's REST endpoint
//! - [`MockAnomalySource`]: an offline synthetic field for demos and tests
//!
//! [`RequestGate`] discards responses that were overtaken by a newer request.

pub mod config;
pub mod gate;
pub mod http;
pub mod mock;
pub mod source;

pub use config::ClientConfig;
pub use gate::{RequestGate, Ticket};
pub use http::HttpAnomalySource;
pub use mock::MockAnomalySource;
pub use source::AnomalySource;
