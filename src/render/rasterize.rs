//! External rasterization of the map document.
//!
//! Writes a one-shot driver script, invokes the configured headless-browser
//! command once, and removes the script again. Failures here never fail the
//! run: the CSV and HTML artifacts already exist, so the caller downgrades
//! any error to a warning.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use tokio::process::Command;

/// Name of the transient driver script written next to the artifacts.
const DRIVER_SCRIPT: &str = "map_driver.js";

/// Rasterizes the map HTML document to an image file.
///
/// Both paths must be inside `dir`; the driver script and the external
/// command run with `dir` as working directory so the document's relative
/// asset references (ammap.js, worldHigh.svg) resolve.
///
/// # Errors
///
/// Returns an error if the command cannot be spawned (typically: rasterizer
/// not installed) or exits non-zero. The run is expected to continue either
/// way.
pub async fn rasterize(dir: &Path, html_name: &str, image_name: &str, command: &str) -> Result<()> {
    let script = format!(
        "var page = require('webpage').create();\n\
         page.open({html}, function() {{\n\
           page.render({image});\n\
           phantom.exit();\n\
         }});\n",
        html = serde_json::json!(html_name),
        image = serde_json::json!(image_name),
    );

    let script_path = dir.join(DRIVER_SCRIPT);
    std::fs::write(&script_path, script)
        .with_context(|| format!("Failed to write driver script {}", script_path.display()))?;

    debug!("Invoking rasterizer: {} {}", command, DRIVER_SCRIPT);
    let output = Command::new(command)
        .arg(DRIVER_SCRIPT)
        .current_dir(dir)
        .output()
        .await;

    // The one-shot script is transient either way.
    if let Err(e) = std::fs::remove_file(&script_path) {
        debug!("Could not remove driver script: {e}");
    }

    let output = output.with_context(|| format!("Failed to run rasterizer '{command}'"))?;
    if !output.status.success() {
        return Err(anyhow!(
            "rasterizer '{}' exited with {}: {}",
            command,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }

    info!("Map image generated @ {}", dir.join(image_name).display());
    Ok(())
}
