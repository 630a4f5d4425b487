pub mod local_file_fetcher;
pub mod ytdlp_fetcher;
