pub mod source_fetcher;
