mod text_received;
mod web_app_data_received;

pub use text_received::text_received;
pub use web_app_data_received::web_app_data_received;
