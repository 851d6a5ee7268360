use crate::collectors::boot::probe_boot_time;
use crate::collectors::kernels::scan_kernels;
use crate::collectors::{single_error, ErrorSet, KernelImage, KernelInventory, KernelScan};
use crate::config::{Config, KernelsConfig};
use crate::perfdata::{Perfdata, Threshold};
use crate::plugin::{CheckResult, Status};
use std::time::{Duration, SystemTime};
use tokio::task::JoinError;
use tracing::{debug, info};

pub async fn run_check(cfg: &Config) -> CheckResult {
    match gather(cfg).await {
        Ok((boot_time, kernels)) => evaluate(boot_time, &kernels, &cfg.kernels),
        Err(errors) => CheckResult::failed(errors),
    }
}

pub async fn gather(cfg: &Config) -> Result<(SystemTime, KernelInventory), ErrorSet> {
    let boot_task = {
        let uptime_path = cfg.uptime_path.clone();
        tokio::spawn(async move { probe_boot_time(&uptime_path).await })
    };
    let kernels_task = {
        let kernels_cfg = cfg.kernels.clone();
        tokio::spawn(async move { scan_kernels(&kernels_cfg).await })
    };

    let (boot, kernels) = tokio::join!(boot_task, kernels_task);
    merge(
        settle(boot, "boot time task"),
        settle(kernels, "kernel scan task"),
    )
}

fn settle<T>(joined: Result<Result<T, ErrorSet>, JoinError>, context: &str) -> Result<T, ErrorSet> {
    joined.unwrap_or_else(|err| Err(single_error(context, err)))
}

pub fn merge(
    boot: Result<SystemTime, ErrorSet>,
    kernels: Result<KernelScan, ErrorSet>,
) -> Result<(SystemTime, KernelInventory), ErrorSet> {
    let mut errors = ErrorSet::new();

    let boot_time = match boot {
        Ok(boot_time) => Some(boot_time),
        Err(boot_errors) => {
            errors.extend(boot_errors);
            None
        }
    };
    // Inserted after the boot errors: on a duplicate context the inventory's entry wins.
    let inventory = match kernels {
        Ok(scan) => {
            errors.extend(scan.errors);
            Some(scan.kernels)
        }
        Err(scan_errors) => {
            errors.extend(scan_errors);
            None
        }
    };

    match (boot_time, inventory) {
        (Some(boot_time), Some(inventory)) if errors.is_empty() => Ok((boot_time, inventory)),
        _ => {
            info!(errors = errors.len(), "data gathering failed");
            Err(errors)
        }
    }
}

pub fn evaluate(boot_time: SystemTime, kernels: &KernelInventory, cfg: &KernelsConfig) -> CheckResult {
    let count = Perfdata::new("kernels", kernels.len() as f64)
        .warn(Threshold::at_least(1.0))
        .min(0.0);

    let Some(latest) = latest_kernel(kernels) else {
        return CheckResult::new(
            Status::Warning,
            format!("No kernels found (ls {})", cfg.search_paths()),
            vec![count],
        );
    };

    let mtime_diff = micros_between(latest.mtime, boot_time);
    let ctime_diff = latest.ctime.map(|ctime| micros_between(ctime, boot_time));
    let diff = ctime_diff.unwrap_or(mtime_diff);
    debug!(kernel = ?latest.name, mtime_diff, ?ctime_diff, "newest kernel selected");

    let (status, output) = if diff < 0 {
        (
            Status::Ok,
            "No kernels have been installed since boot".to_string(),
        )
    } else {
        let since_boot = Duration::from_secs(diff.unsigned_abs() / 1_000_000);
        (
            Status::Critical,
            format!(
                "The kernel '{}' has been installed {} after boot",
                cfg.dir.join(&latest.name).display(),
                humantime::format_duration(since_boot)
            ),
        )
    };

    let installed_after_boot = Threshold::inside(0.0, f64::INFINITY);
    let mut perfdata = vec![Perfdata::new("mtime_boot_diff", mtime_diff as f64)
        .unit("us")
        .crit(installed_after_boot)];
    if let Some(ctime_diff) = ctime_diff {
        perfdata.push(
            Perfdata::new("ctime_boot_diff", ctime_diff as f64)
                .unit("us")
                .crit(installed_after_boot),
        );
    }
    perfdata.push(count);

    CheckResult::new(status, output, perfdata)
}

// Name order plus strict `>` means the smallest name wins an exact mtime tie.
fn latest_kernel(kernels: &KernelInventory) -> Option<&KernelImage> {
    kernels.values().fold(None, |latest, kernel| match latest {
        Some(current) if kernel.mtime <= current.mtime => Some(current),
        _ => Some(kernel),
    })
}

fn micros_between(later: SystemTime, earlier: SystemTime) -> i64 {
    match later.duration_since(earlier) {
        Ok(elapsed) => i64::try_from(elapsed.as_micros()).unwrap_or(i64::MAX),
        Err(err) => -i64::try_from(err.duration().as_micros()).unwrap_or(i64::MAX),
    }
}
