pub mod info;
pub mod ytdlp;

pub use info::MediaInfo;
pub use ytdlp::download;
