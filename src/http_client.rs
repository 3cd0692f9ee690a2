use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

const USER_AGENT: &str = concat!("fightcard_terminal/", env!("CARGO_PKG_VERSION"));

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Process-wide client. The first caller's timeout sticks.
pub fn http_client(timeout: Duration) -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build http client")
    })
}
