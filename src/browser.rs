//! Headless Chrome session via chromiumoxide

use crate::driver::PageDriver;
use anyhow::{anyhow, bail, Context, Result};
use chromiumoxide::element::Element;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};
use tracing::debug;

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Poll interval for `wait_for_selector`
const SELECTOR_POLL_MS: u64 = 100;

/// A browser with exactly one tab.
///
/// Owned by the command that launched it and passed by reference to every
/// crawl step. Call [`BrowserSession::close`] on every exit path.
pub struct BrowserSession {
    browser: Browser,
    page: Page,
}

impl BrowserSession {
    /// Launch headless Chrome and open a blank tab
    pub async fn launch() -> Result<Self> {
        let config = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-setuid-sandbox")
            .arg("--no-first-run")
            .arg("--headless=new")
            .build()
            .map_err(|e| anyhow!("Browser config error: {}", e))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("Failed to launch Chrome. Is Chrome/Chromium installed?")?;

        // Spawn handler in background
        tokio::spawn(async move { while handler.next().await.is_some() {} });

        let page = browser.new_page("about:blank").await?;
        page.execute(
            chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams::new(
                USER_AGENT,
            ),
        )
        .await?;

        debug!("browser launched");
        Ok(Self { browser, page })
    }

    /// Close the browser
    pub async fn close(mut self) -> Result<()> {
        self.browser.close().await?;
        debug!("browser closed");
        Ok(())
    }

    /// Heuristic HTTP status from the page title.
    /// chromiumoxide doesn't expose the response status of a `goto`.
    async fn title_status(&self) -> u16 {
        match self.page.get_title().await {
            Ok(Some(title)) => status_from_title(&title),
            _ => 200,
        }
    }
}

impl PageDriver for BrowserSession {
    type Node = Element;

    async fn navigate(&self, url: &str, timeout_ms: u64) -> Result<()> {
        match timeout(Duration::from_millis(timeout_ms), self.page.goto(url)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                let message = e.to_string();
                bail!("{}: {}", classify_error(&message), message);
            }
            Err(_) => bail!("Navigation timeout after {} ms", timeout_ms),
        }

        let status = self.title_status().await;
        if status >= 400 {
            bail!("HTTP {}", status);
        }
        Ok(())
    }

    async fn wait_for_load(&self, timeout_ms: u64) -> Result<()> {
        match timeout(
            Duration::from_millis(timeout_ms),
            self.page.wait_for_navigation(),
        )
        .await
        {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(anyhow!("Page did not finish loading: {}", e)),
            Err(_) => bail!("Page did not finish loading within {} ms", timeout_ms),
        }
    }

    async fn wait_for_selector(&self, selector: &str, timeout_ms: u64) -> Result<()> {
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                bail!("Timed out after {} ms waiting for {}", timeout_ms, selector);
            }
            sleep(Duration::from_millis(SELECTOR_POLL_MS)).await;
        }
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<Element>> {
        self.page
            .find_elements(selector)
            .await
            .with_context(|| format!("Failed to query {}", selector))
    }

    async fn click(&self, node: &Element, timeout_ms: u64) -> Result<()> {
        match timeout(Duration::from_millis(timeout_ms), node.click()).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(anyhow!("Click failed: {}", e)),
            Err(_) => bail!("Click timed out after {} ms", timeout_ms),
        }
    }

    async fn content(&self) -> Result<String> {
        self.page
            .content()
            .await
            .context("Failed to get page content")
    }

    async fn pause(&self, ms: u64) {
        sleep(Duration::from_millis(ms)).await;
    }
}

fn status_from_title(title: &str) -> u16 {
    let t_lower = title.to_lowercase();
    if t_lower.contains("404") || t_lower.contains("not found") {
        return 404;
    }
    if t_lower.contains("403") || t_lower.contains("forbidden") || t_lower.contains("access denied")
    {
        return 403;
    }
    if t_lower.contains("500") || t_lower.contains("internal server error") {
        return 500;
    }
    200
}

fn classify_error(error: &str) -> &'static str {
    if error.contains("ERR_NAME_NOT_RESOLVED") {
        "DNS_FAILED"
    } else if error.contains("ERR_CONNECTION_REFUSED") {
        "CONNECTION_REFUSED"
    } else if error.contains("ERR_CONNECTION_TIMED_OUT") {
        "TIMEOUT"
    } else if error.contains("ERR_CERT") || error.contains("SSL") {
        "SSL_ERROR"
    } else {
        "NETWORK_ERROR"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_error() {
        assert_eq!(classify_error("net::ERR_NAME_NOT_RESOLVED"), "DNS_FAILED");
        assert_eq!(classify_error("ERR_CONNECTION_REFUSED"), "CONNECTION_REFUSED");
        assert_eq!(classify_error("random error"), "NETWORK_ERROR");
    }

    #[test]
    fn test_status_from_title() {
        assert_eq!(status_from_title("Page not found - Microsoft Learn"), 404);
        assert_eq!(status_from_title("Access Denied"), 403);
        assert_eq!(
            status_from_title("Items - List Items - REST API (Fabric Core)"),
            200
        );
    }
}
