pub mod profile;
pub mod time;
