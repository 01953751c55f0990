//! X11 idle detection through the `xprintidle` utility

use std::{env, path::PathBuf, time::Duration};
use futures::future::BoxFuture;
use tokio::process::Command;
use tracing::{debug, info};

use super::idle::{IdleChecker, IdleError};

/// Idle checker that shells out to `xprintidle`, which prints milliseconds since
/// the last input event
#[derive(Debug, Clone)]
pub struct XprintIdle {
    binary: Option<PathBuf>,
}

impl XprintIdle {
    /// Locate `xprintidle` on `PATH`; without it every query reports unsupported
    pub fn detect() -> Self {
        let binary = find_in_path("xprintidle");
        match &binary {
            Some(path) => info!("Using {} for idle detection", path.display()),
            None => info!("xprintidle not found, idle detection unavailable"),
        }
        Self { binary }
    }

    pub fn is_available(&self) -> bool {
        self.binary.is_some()
    }
}

impl XprintIdle {
    async fn query(&self) -> Result<Duration, IdleError> {
        let binary = self.binary.as_ref().ok_or(IdleError::Unsupported)?;

        // An abandoned query takes the child process down with it
        let output = Command::new(binary)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| IdleError::Query(format!("Failed to execute xprintidle: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(IdleError::Query(format!("xprintidle failed: {}", stderr.trim())));
        }

        let idle = parse_idle_millis(&String::from_utf8_lossy(&output.stdout))?;
        debug!("User idle for {}ms", idle.as_millis());
        Ok(idle)
    }
}

impl IdleChecker for XprintIdle {
    fn idle_duration(&self) -> BoxFuture<'_, Result<Duration, IdleError>> {
        Box::pin(self.query())
    }
}

/// Parse `xprintidle` output; negative readings clamp to zero
pub fn parse_idle_millis(output: &str) -> Result<Duration, IdleError> {
    let value = output.trim();
    let millis: i64 = value
        .parse()
        .map_err(|e| IdleError::Query(format!("parse idle milliseconds {:?}: {}", value, e)))?;
    Ok(Duration::from_millis(millis.max(0) as u64))
}

fn find_in_path(name: &str) -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_milliseconds() {
        assert_eq!(parse_idle_millis("1500\n").unwrap(), Duration::from_millis(1500));
    }

    #[test]
    fn negative_readings_clamp_to_zero() {
        assert_eq!(parse_idle_millis("-20").unwrap(), Duration::ZERO);
    }

    #[test]
    fn garbage_is_a_transient_error() {
        let err = parse_idle_millis("not a number").unwrap_err();
        assert!(!err.is_unsupported());
    }

    #[tokio::test]
    async fn missing_binary_is_unsupported() {
        let checker = XprintIdle { binary: None };
        assert_eq!(checker.idle_duration().await, Err(IdleError::Unsupported));
    }

    #[cfg(unix)]
    fn fake_xprintidle(dir: &std::path::Path, body: &str) -> XprintIdle {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("xprintidle");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        XprintIdle { binary: Some(path) }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn reads_idle_time_from_the_binary() {
        let dir = tempfile::tempdir().unwrap();
        let checker = fake_xprintidle(dir.path(), "echo 4200");
        assert_eq!(checker.idle_duration().await, Ok(Duration::from_millis(4200)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_binary_is_a_transient_error() {
        let dir = tempfile::tempdir().unwrap();
        let checker = fake_xprintidle(dir.path(), "echo 'no display' >&2; exit 1");
        let err = checker.idle_duration().await.unwrap_err();
        assert_eq!(err, IdleError::Query("xprintidle failed: no display".to_string()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn hung_binary_is_abandoned_at_the_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let checker = fake_xprintidle(dir.path(), "exec sleep 30");

        let started = std::time::Instant::now();
        let result = tokio::time::timeout(Duration::from_millis(200), checker.idle_duration()).await;
        assert!(result.is_err());
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
