use super::{single_error, CollectError, ErrorSet};
use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::{debug, warn};

pub async fn probe_boot_time(uptime_path: &Path) -> Result<SystemTime, ErrorSet> {
    let context = format!("read {}", uptime_path.display());

    let content = match tokio::fs::read_to_string(uptime_path).await {
        Ok(content) => content,
        Err(err) => {
            warn!(path = %uptime_path.display(), error = %err, "uptime read failed");
            return Err(single_error(context, err));
        }
    };
    let now = SystemTime::now();

    match boot_time_from_uptime(&content, now) {
        Ok(boot_time) => {
            debug!(path = %uptime_path.display(), "boot time derived from uptime");
            Ok(boot_time)
        }
        Err(err) => {
            warn!(path = %uptime_path.display(), error = %err, "uptime parse failed");
            Err(single_error(context, err))
        }
    }
}

pub fn boot_time_from_uptime(content: &str, now: SystemTime) -> Result<SystemTime, CollectError> {
    let bad_output = || CollectError::BadOutput(content.trim().to_string());

    let seconds: f64 = content
        .split_whitespace()
        .next()
        .and_then(|field| field.parse().ok())
        .ok_or_else(bad_output)?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(bad_output());
    }

    let uptime = Duration::try_from_secs_f64(seconds).map_err(|_| bad_output())?;
    now.checked_sub(uptime).ok_or_else(bad_output)
}
