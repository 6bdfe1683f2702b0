use std::{io::Write, time::Duration};

use anyhow::Result;
use tokio::select;
use tokio_util::sync::CancellationToken;

use crate::{tracker::manager::SessionManager, utils::clock::Clock};

const REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Re-renders the manager's status line in place once per second until the
/// process receives Ctrl-C or stdout goes away (e.g. a closed pipe). The
/// loop only reads the current session, never mutates it.
pub async fn run_status_line(manager: &SessionManager, clock: &dyn Clock) -> Result<()> {
    let shutdown = CancellationToken::new();

    // Runs alongside the render loop; a render error must not wait for it.
    tokio::spawn(detect_shutdown(shutdown.clone()));

    render_loop(manager, clock, &shutdown, &mut std::io::stdout()).await
}

async fn render_loop(
    manager: &SessionManager,
    clock: &dyn Clock,
    shutdown: &CancellationToken,
    out: &mut impl Write,
) -> Result<()> {
    let mut tick = clock.instant();
    loop {
        // Carriage return plus erase-to-end keeps the line in place.
        write!(out, "\r\x1b[K{}", manager.status_line())?;
        out.flush()?;

        tick += REFRESH_INTERVAL;
        select! {
            // Cancellation always ends the loop, so no ticker outlives the
            // command.
            _ = shutdown.cancelled() => {
                writeln!(out)?;
                return Ok(());
            }
            _ = clock.sleep_until(tick) => ()
        }
    }
}

/// Cancels the token once the process receives Ctrl-C.
async fn detect_shutdown(cancellation: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        cancellation.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Write};

    use anyhow::Result;
    use tempfile::{tempdir, TempDir};
    use tokio_util::sync::CancellationToken;

    use super::render_loop;
    use crate::{
        storage::{history::HistoryStorage, settings::Settings},
        tracker::manager::SessionManager,
        utils::clock::DefaultClock,
    };

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    async fn manager_in(dir: &TempDir) -> Result<SessionManager> {
        let storage = HistoryStorage::new(dir.path().to_owned())?;
        let settings = Settings::load(dir.path()).await;
        Ok(SessionManager::load(storage, settings, Box::new(DefaultClock)).await)
    }

    #[tokio::test]
    async fn cancellation_ends_the_loop_after_the_current_render() -> Result<()> {
        let dir = tempdir()?;
        let manager = manager_in(&dir).await?;
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        let mut out = Vec::new();
        render_loop(&manager, &DefaultClock, &shutdown, &mut out).await?;

        let rendered = String::from_utf8(out)?;
        assert!(rendered.contains("No active session"));
        assert!(rendered.ends_with('\n'));
        Ok(())
    }

    #[tokio::test]
    async fn render_error_ends_the_loop_immediately() -> Result<()> {
        let dir = tempdir()?;
        let manager = manager_in(&dir).await?;
        // Never cancelled: only the write error can end the loop.
        let shutdown = CancellationToken::new();

        let result = render_loop(&manager, &DefaultClock, &shutdown, &mut BrokenPipe).await;
        assert!(result.is_err());
        Ok(())
    }
}
