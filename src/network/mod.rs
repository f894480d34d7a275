//! Transport layer
//!
//! The direct route streams a response through reqwest; the proxied route
//! speaks raw HTTP/1.1 over a tunnel opened by a [`Connector`]. Both feed
//! the same bounded [`ResponseBuffer`].

mod accumulator;
mod client;
mod error;
mod proxy;
mod user_agent;

pub use accumulator::{FillMode, Phase, ResponseBuffer};
pub use client::HttpClient;
pub use error::TransportError;
pub use proxy::{fetch_via_proxy, Connection, Connector, DisabledProxy, TunnelConnector};
pub use user_agent::{accept_html, accept_json, default_user_agent};
