// gsa-api: Async Rust client for the search appliance administration feeds
//
// Feeds hold entries; entries hold named string properties carried as
// `<gsa:content name="...">` extensions. `GsaClient` speaks the HTTP side,
// `Entry`/`Feed` the Atom side, and `codec` owns property escaping.

pub mod auth;
pub mod client;
pub mod codec;
pub mod entry;
pub mod error;
pub mod feed;
pub mod terms;
pub mod transport;
mod xml;

pub use client::{Endpoint, GsaClient, percent_encode};
pub use codec::Extension;
pub use entry::Entry;
pub use error::Error;
pub use feed::Feed;
pub use transport::{TlsMode, TransportConfig};
