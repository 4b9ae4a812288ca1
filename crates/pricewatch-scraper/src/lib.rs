pub mod adapter;
mod artifact;
pub mod browser;
pub mod error;
pub mod fetch;
pub mod locate;
pub mod normalize;

pub use adapter::SiteAdapter;
pub use browser::{BrowserSession, EvasionConfig};
pub use error::ScrapeError;
pub use fetch::PageFetcher;
pub use locate::{Extract, LocatorChain, LocatorEntry};
pub use normalize::normalize_price;
