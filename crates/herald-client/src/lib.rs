pub mod news_api;
pub mod writer;

pub use news_api::NewsApiFetcher;
pub use writer::JsonFileWriter;
