//! libcurl-backed `JarFetcher`.
//!
//! Runs in the current thread; call from `spawn_blocking` if used from async code.

use std::time::Duration;

use super::{FetchError, JarFetcher};
use crate::config::FetchConfig;

/// Blocking GET client built on the curl crate's `Easy` handle.
#[derive(Debug, Clone)]
pub struct CurlFetcher {
    connect_timeout: Duration,
    user_agent: String,
    max_bytes: usize,
}

impl CurlFetcher {
    pub fn new(connect_timeout: Duration, user_agent: impl Into<String>, max_bytes: usize) -> Self {
        Self {
            connect_timeout,
            user_agent: user_agent.into(),
            max_bytes,
        }
    }

    pub fn from_config(cfg: &FetchConfig) -> Self {
        Self::new(
            Duration::from_secs(cfg.connect_timeout_secs),
            cfg.user_agent.clone(),
            cfg.max_jar_bytes,
        )
    }
}

impl From<curl::Error> for FetchError {
    fn from(e: curl::Error) -> Self {
        if e.is_operation_timedout() {
            return FetchError::Timeout(e.to_string());
        }
        if e.is_couldnt_connect()
            || e.is_couldnt_resolve_host()
            || e.is_couldnt_resolve_proxy()
            || e.is_ssl_connect_error()
            || e.is_read_error()
            || e.is_recv_error()
            || e.is_send_error()
            || e.is_got_nothing()
            || e.is_partial_file()
        {
            return FetchError::Connection(e.to_string());
        }
        FetchError::Transport(e.to_string())
    }
}

impl JarFetcher for CurlFetcher {
    fn get(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, FetchError> {
        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.get(true)?;
        easy.follow_location(true)?;
        easy.max_redirections(5)?;
        easy.connect_timeout(self.connect_timeout.min(timeout))?;
        easy.timeout(timeout)?;
        easy.useragent(&self.user_agent)?;

        // Mirrors behind CDNs sometimes serve stale gzip variants; ask for the raw bytes.
        let mut list = curl::easy::List::new();
        list.append("Accept: */*")?;
        list.append("Accept-Encoding: identity")?;
        list.append("Cache-Control: no-cache")?;
        easy.http_headers(list)?;

        let limit = self.max_bytes;
        let mut body: Vec<u8> = Vec::new();
        let mut overflow = false;
        let performed = {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                if body.len() + data.len() > limit {
                    overflow = true;
                    return Ok(0); // abort transfer
                }
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()
        };
        if overflow {
            return Err(FetchError::TooLarge { limit });
        }
        performed?;

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(FetchError::Http(code));
        }
        Ok(body)
    }
}
