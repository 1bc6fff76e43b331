pub mod chat;
pub mod config_cmd;
pub mod doctor;
pub mod models;
pub mod onboard;
pub mod serve;
