pub mod agenda;
pub mod directory;
pub mod feed;
pub mod realtime;
pub mod resolver;
pub mod store;
pub mod study;

mod util;

pub const USER_AGENT: &str = concat!("mentoria/", env!("CARGO_PKG_VERSION"));
