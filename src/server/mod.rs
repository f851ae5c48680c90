pub mod listener;
pub mod reaper;
pub mod tls;
