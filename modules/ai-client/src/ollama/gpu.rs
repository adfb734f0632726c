use std::time::Duration;

use tracing::{info, warn};

/// Layer count offloaded when no GPU can be queried.
pub const DEFAULT_GPU_LAYERS: u32 = 8;

/// Query `nvidia-smi` for total GPU memory and pick how many model layers to
/// offload. Falls back to [`DEFAULT_GPU_LAYERS`] when no GPU is detected.
pub async fn detect_gpu_layers() -> u32 {
    let probe = tokio::time::timeout(
        Duration::from_secs(10),
        tokio::process::Command::new("nvidia-smi")
            .args([
                "--query-gpu=memory.total,memory.free",
                "--format=csv,noheader,nounits",
            ])
            .output(),
    )
    .await;

    match probe {
        Ok(Ok(output)) if output.status.success() => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            match parse_memory_line(&stdout) {
                Some((total_mb, free_mb)) => {
                    info!(total_mb, free_mb, "GPU detected");
                    layers_for_memory(total_mb)
                }
                None => {
                    warn!(output = %stdout.trim(), "Unrecognised nvidia-smi output");
                    DEFAULT_GPU_LAYERS
                }
            }
        }
        _ => {
            warn!("No NVIDIA GPU detected");
            DEFAULT_GPU_LAYERS
        }
    }
}

/// Parse the first `total, free` line of the csv output (MiB).
fn parse_memory_line(stdout: &str) -> Option<(u64, u64)> {
    let line = stdout.lines().next()?;
    let mut parts = line.split(',').map(|p| p.trim().parse::<u64>());
    let total = parts.next()?.ok()?;
    let free = parts.next()?.ok()?;
    Some((total, free))
}

pub fn layers_for_memory(total_mb: u64) -> u32 {
    match total_mb {
        m if m >= 16_000 => 32,
        m if m >= 12_000 => 24,
        m if m >= 8_000 => 16,
        _ => DEFAULT_GPU_LAYERS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_tiers_follow_total_memory() {
        assert_eq!(layers_for_memory(24_000), 32);
        assert_eq!(layers_for_memory(16_000), 32);
        assert_eq!(layers_for_memory(12_288), 24);
        assert_eq!(layers_for_memory(8_192), 16);
        assert_eq!(layers_for_memory(4_096), 8);
    }

    #[test]
    fn parses_first_gpu_line() {
        assert_eq!(parse_memory_line("12288, 11000\n8192, 8000\n"), Some((12288, 11000)));
        assert_eq!(parse_memory_line("N/A, N/A"), None);
        assert_eq!(parse_memory_line(""), None);
    }
}
