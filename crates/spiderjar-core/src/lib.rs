pub mod config;
pub mod logging;

pub mod blacklist;
pub mod cache;
pub mod checksum;
pub mod clock;
pub mod diagnostics;
pub mod environment;
pub mod fallback;
pub mod fetch;
pub mod mirrors;
pub mod resolver;
pub mod result;
pub mod retry;

pub use resolver::SpiderJarResolver;
pub use result::{JarOrigin, ResolutionResult, ResolutionStatus};
