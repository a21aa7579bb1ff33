//! `status`: shows one query's detail, or lists recent queries, with an
//! optional watch mode that refreshes on an interval.

use anyhow::{Context as _, Result};
use goes_lib::prelude::*;

use crate::context::Context;

/// Execute the `status` command.
pub(crate) async fn status(
    ctx: &Context,
    id: Option<uuid::Uuid>,
    all: bool,
    follow: Option<u64>,
) -> Result<()> {
    if let Some(interval) = follow {
        return watch(ctx, id, all, interval).await;
    }

    match id {
        Some(id) => show_detail(ctx, id).await,
        None => list(ctx, all).await,
    }
}

async fn show_detail(ctx: &Context, id: uuid::Uuid) -> Result<()> {
    let record = ctx.store.load(id).await.context("consulta no encontrada")?;

    println!("Consulta: {}", record.id);
    println!("Estado:   {}", record.estado);
    println!("Progreso: {}%", record.progreso);
    println!("Mensaje:  {}", record.mensaje);
    println!(
        "Creada:   {}",
        record.timestamp_creacion.format("%Y-%m-%d %H:%M:%S")
    );
    println!(
        "Actualizada: {}",
        record.timestamp_actualizacion.format("%Y-%m-%d %H:%M:%S")
    );
    if let Some(usuario) = &record.usuario {
        println!("Usuario:  {usuario}");
    }

    if let Some(report) = &record.resultados {
        println!("\nResultados:");
        println!(
            "  Total: {} archivos ({:.1} MB) en {}",
            report.total_archivos,
            report.total_mb,
            report.ruta_destino.display()
        );
        println!(
            "  Lustre: {} archivos, S3: {} archivos",
            report.fuentes.lustre.total, report.fuentes.s3.total
        );
        if report.consulta_recuperacion.is_some() {
            println!("  Hay una consulta de recuperacion disponible para objetivos no obtenidos.");
        }
    }

    Ok(())
}

async fn list(ctx: &Context, all: bool) -> Result<()> {
    let mut records = ctx.store.list().await?;

    if !all {
        records.retain(|r| !r.estado.is_terminal() || is_recent(r));
    }

    if records.is_empty() {
        println!("No hay consultas.");
        if !all {
            println!("Usar --all para ver el historial completo.");
        }
        return Ok(());
    }

    println!(
        "{:<36} {:<12} {:<9} {:<20}",
        "CONSULTA", "ESTADO", "PROGRESO", "CREADA"
    );
    println!("{}", "-".repeat(82));

    for record in &records {
        println!(
            "{:<36} {:<12} {:>7}% {:<20}",
            record.id,
            record.estado.to_string(),
            record.progreso,
            record.timestamp_creacion.format("%Y-%m-%d %H:%M"),
        );
    }

    println!("\nTotal: {} consulta(s)", records.len());
    Ok(())
}

fn is_recent(record: &QueryRecord) -> bool {
    record.timestamp_creacion > chrono::Utc::now() - chrono::Duration::hours(24)
}

async fn watch(ctx: &Context, id: Option<uuid::Uuid>, all: bool, interval_secs: u64) -> Result<()> {
    use std::io::Write;

    let interval = std::time::Duration::from_secs(interval_secs);

    loop {
        print!("\x1B[2J\x1B[1;1H");
        std::io::stdout().flush()?;

        println!(
            "Observando consultas (actualiza cada {interval_secs}s, Ctrl+C para salir)\n"
        );

        match id {
            Some(id) => show_detail(ctx, id).await?,
            None => list(ctx, all).await?,
        }

        tokio::time::sleep(interval).await;
    }
}
