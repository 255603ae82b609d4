pub mod analytics;
pub mod config;
pub mod conversation;
pub mod emotion;
pub mod enhancer;
pub mod fusion;
pub mod replay;
pub mod session;
pub mod suggest;
pub mod summary;
pub mod util;
pub mod wellbeing;
