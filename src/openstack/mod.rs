pub mod client;
pub mod pagination;
pub mod services;
pub mod transport;
pub mod types;

pub use client::{EndpointOpts, Interface, ProviderClient, ServiceCatalog, ServiceClient};
pub use pagination::{Page, Pager};
pub use transport::{HttpTransport, Request, Transport};
