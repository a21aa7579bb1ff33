//! `restart` and `delete`: the lifecycle operations available on an existing
//! query record once it has been submitted.

use anyhow::{bail, Context as _, Result};
use goes_lib::prelude::*;

use crate::context::Context;

/// Execute the `restart` command: resets a query to `recibido` and re-runs it
/// in the background.
pub(crate) async fn restart(ctx: &Context, id: uuid::Uuid) -> Result<()> {
    let record = goes_store::restart(&ctx.store, id)
        .await
        .context("no se pudo reiniciar la consulta")?;

    spawn_background(id)?;

    println!("Consulta {id} reiniciada (estado: {}).", record.estado);
    println!("Revisar estado con: goes-retrieve status {id}");
    Ok(())
}

/// Execute the `delete` command: removes the record and, with `purge`, its
/// destination directory too.
pub(crate) async fn delete(ctx: &Context, id: uuid::Uuid, purge: bool, force: bool) -> Result<()> {
    let record = ctx.store.load(id).await.context("consulta no encontrada")?;

    if purge && record.estado == QueryStatus::Procesando && !force {
        bail!("la consulta aun esta en proceso; usar --force para eliminar de todos modos");
    }

    if purge {
        let dest = ctx.config.download_path.join(id.to_string());
        if dest.exists() {
            std::fs::remove_dir_all(&dest)
                .with_context(|| format!("no se pudo eliminar {}", dest.display()))?;
        }
    }

    ctx.store.delete(id).await?;
    println!("Consulta {id} eliminada.");
    Ok(())
}

/// Re-executes the current binary with `--daemon-run <id>`, detached from this
/// process's stdio.
fn spawn_background(id: uuid::Uuid) -> Result<()> {
    let exe = std::env::current_exe().context("could not determine current executable")?;
    std::process::Command::new(exe)
        .arg("--daemon-run")
        .arg(id.to_string())
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .context("failed to spawn background process")?;
    Ok(())
}
