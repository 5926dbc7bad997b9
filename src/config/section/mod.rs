//! Configuration section definitions.
//!
//! Each module corresponds to a section in `folio.toml`:
//!
//! | Module    | TOML Section | Purpose                               |
//! |-----------|--------------|---------------------------------------|
//! | `content` | `[content]`  | Article directory and file filtering  |
//! | `serve`   | `[serve]`    | HTTP and WebSocket server             |
//! | `site`    | `[site]`     | Site metadata                         |
//! | `watch`   | `[watch]`    | Watcher timing                        |

mod content;
mod serve;
mod site;
mod watch;

pub use content::ContentConfig;
pub use serve::ServeConfig;
pub use site::SiteConfig;
pub use watch::WatchConfig;
