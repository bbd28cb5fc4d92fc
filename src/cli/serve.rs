//! Line-delimited tool server
//!
//! Reads one JSON [`ToolRequest`] per stdin line and writes one
//! [`ToolResponse`] per stdout line, in order.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use conduit_mcp::error::{Error, Result};
use conduit_mcp::session::SessionMode;
use conduit_mcp::tools::{self, ToolRequest, ToolResponse};

use crate::cli::{CommandContext, GlobalOptions};

pub async fn run(opts: &GlobalOptions, stateless: bool) -> Result<()> {
    let mode = if stateless {
        SessionMode::Stateless
    } else {
        SessionMode::Stateful
    };

    let ctx = CommandContext::new(opts, mode == SessionMode::Stateful)?;
    let process_token = match mode {
        SessionMode::Stateful => ctx.config.token.clone(),
        SessionMode::Stateless => None,
    };
    let provider = mode.provider(ctx.factory, process_token);
    log::info!("Serving tool requests in {} mode", mode);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<ToolRequest>(line) {
            Ok(request) => tools::handle(provider.as_ref(), request).await,
            Err(err) => ToolResponse::failure(&Error::Json(err)),
        };

        let mut out = serde_json::to_string(&response)?;
        out.push('\n');
        stdout.write_all(out.as_bytes()).await?;
        stdout.flush().await?;
    }

    Ok(())
}
