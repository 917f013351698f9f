//! `supplydesk-client` — reqwest gateway to the SupplyDesk REST service.
//!
//! Implements the console's [`Gateway`](supplydesk_console::Gateway) seams
//! over JSON/HTTP. Status 409 on a delete is reported as a conflict so the
//! console can show the kind's "still referenced" message.

pub mod http;
pub mod wire;

pub use http::{HttpGateway, Resource, status_error};
