//! menu command: Print the API navigation menu
//!
//! Exploratory helper: lists the text of every entry in the articles page's
//! table of contents as rendered on first load (nothing is expanded).

use crate::browser::BrowserSession;
use crate::driver::PageDriver;
use crate::toc::{self, MENU_SELECTOR};
use anyhow::{Context, Result};
use clap::Args;

#[derive(Args)]
pub struct MenuArgs {
    /// Articles index page holding the navigation tree
    #[arg(long, env = "FABRIC_IDS_URL", default_value = toc::ARTICLES_URL)]
    pub url: String,

    /// How long to wait for the menu to render, in milliseconds
    #[arg(long, default_value = "5000")]
    pub timeout: u64,
}

/// Configuration for menu
pub struct MenuConfig {
    pub url: String,
    pub nav_timeout_ms: u64,
    pub render_timeout_ms: u64,
}

/// Run the menu command
pub async fn run_menu(args: MenuArgs) -> Result<()> {
    let config = MenuConfig {
        url: args.url,
        nav_timeout_ms: 30_000,
        render_timeout_ms: args.timeout,
    };

    let session = BrowserSession::launch().await?;
    let items = list_menu(&session, &config).await;
    session.close().await?;

    match items? {
        Some(items) => {
            for item in items {
                println!("{}", item);
            }
        }
        None => println!("No {} element found.", MENU_SELECTOR),
    }

    Ok(())
}

/// Load the index and read its menu entries. `None` when the menu list
/// is not in the rendered page.
pub async fn list_menu<D: PageDriver>(
    driver: &D,
    config: &MenuConfig,
) -> Result<Option<Vec<String>>> {
    driver
        .navigate(&config.url, config.nav_timeout_ms)
        .await
        .with_context(|| format!("Failed to open {}", config.url))?;
    driver
        .wait_for_selector(MENU_SELECTOR, config.render_timeout_ms)
        .await?;

    let html = driver.content().await?;
    Ok(toc::menu_items(&html, MENU_SELECTOR))
}
