pub mod media;
pub mod tenor;

pub use media::HttpMediaFetcher;
pub use tenor::TenorClient;
