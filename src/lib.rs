pub mod breakpoint;
pub mod clustering;
pub mod dashboard;
pub mod environment;
pub mod fetch;
pub mod interchange;
pub mod logging;
pub mod recommender;

pub const TARGET_WEB_REQUEST: &str = "web_request";
pub const TARGET_PIPELINE: &str = "pipeline";
