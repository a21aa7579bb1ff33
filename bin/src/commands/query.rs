//! `submit` and `validate`: building a request from CLI arguments, gating it,
//! and (for `submit`) running or scheduling the retrieval pipeline.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context as _, Result};
use clap::Args;
use goes_lib::prelude::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::context::Context;

/// Arguments shared by `submit` and `validate`: everything needed to build a
/// [`Request`].
#[derive(Args, Debug)]
pub(crate) struct QueryArgs {
    /// Satellite name or alias (defaults to the catalog default, GOES-East).
    #[arg(long)]
    satelite: Option<String>,

    /// Sensor id: abi, suvi, or glm (defaults to abi).
    #[arg(long)]
    sensor: Option<String>,

    /// Processing level: L1b or L2 (defaults to L1b).
    #[arg(long)]
    nivel: Option<String>,

    /// Geographic domain: fd (full disk) or conus.
    #[arg(long)]
    dominio: String,

    /// Product code, or ALL. Repeat for multiple; required for L2.
    #[arg(long = "producto")]
    productos: Vec<String>,

    /// Band code (01-16), or ALL. Repeat for multiple.
    #[arg(long = "banda")]
    bandas: Vec<String>,

    /// A date and its time ranges, as `FECHA:RANGO[,RANGO...]`, e.g.
    /// `20231026:12:00,13:00-14:00` or `20231001-20231003:00:00`. Repeat for
    /// multiple dates.
    #[arg(long = "fecha", required = true)]
    fechas: Vec<String>,

    /// Requester identifier, stored with the record.
    #[arg(long)]
    usuario: Option<String>,
}

fn build_request(args: &QueryArgs) -> Result<Request> {
    let mut fechas: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for entry in &args.fechas {
        let (date_key, ranges) = entry
            .split_once(':')
            .with_context(|| format!("malformed --fecha '{entry}', expected FECHA:RANGO"))?;
        let ranges: Vec<String> = ranges.split(',').map(str::trim).map(str::to_string).collect();
        fechas.entry(date_key.to_string()).or_default().extend(ranges);
    }

    Ok(Request {
        sat: args.satelite.clone(),
        sensor: args.sensor.clone(),
        nivel: args.nivel.clone(),
        dominio: args.dominio.clone(),
        productos: (!args.productos.is_empty()).then(|| args.productos.clone()),
        bandas: (!args.bandas.is_empty()).then(|| args.bandas.clone()),
        fechas,
        creado_por: args.usuario.clone(),
        descripcion: None,
    })
}

/// Normalizes and gates the request; prints the rejection reason and returns
/// an error if the query would be refused.
fn normalize_and_gate(ctx: &Context, args: &QueryArgs) -> Result<(CanonicalQuery, GateResult)> {
    let request = build_request(args)?;
    let query = normalize(&request, &ctx.catalog).context("request failed validation")?;
    let gate = evaluate(&query, &ctx.config);
    Ok((query, gate))
}

/// `validate`: runs the acceptance gate without persisting anything.
pub(crate) fn validate(ctx: &Context, args: &QueryArgs) -> Result<()> {
    let (_query, gate) = normalize_and_gate(ctx, args)?;

    println!(
        "Estimado: {} archivos, {:.1} MB ({:.2} GB)",
        gate.estimate.file_count, gate.estimate.total_size_mb, gate.estimate.total_size_gb
    );

    if let Some(rejection) = gate.rejection {
        bail!("la consulta seria rechazada: {rejection}");
    }

    println!("La consulta seria aceptada.");
    Ok(())
}

/// `submit`: persists an accepted query and either runs it in the foreground
/// (showing live progress) or schedules it as a background process.
pub(crate) async fn submit(ctx: &Context, args: &QueryArgs, background: bool) -> Result<()> {
    let (query, gate) = normalize_and_gate(ctx, args)?;

    if let Some(rejection) = gate.rejection {
        bail!("consulta rechazada: {rejection}");
    }

    println!(
        "Estimado: {} archivos, {:.1} MB",
        gate.estimate.file_count, gate.estimate.total_size_mb
    );

    let id = uuid::Uuid::new_v4();
    let now = chrono::Utc::now();
    let record = QueryRecord::new(id, query, now);
    ctx.store.save(&record).await?;

    if background {
        spawn_background(id)?;
        println!("Consulta {id} programada en segundo plano.");
        println!("Revisar estado con: goes-retrieve status {id}");
        return Ok(());
    }

    run_foreground(ctx, id).await
}

/// Re-executes the current binary with `--daemon-run <id>`, detached from
/// this process's stdio, so the retrieval pipeline survives the CLI exiting.
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

/// Runs the pipeline in-process, polling the store for progress.
async fn run_foreground(ctx: &Context, id: uuid::Uuid) -> Result<()> {
    let store: Arc<dyn QueryStore> = Arc::new(ctx.store.clone());
    let config = Arc::new(ctx.config.clone());
    let s3_client = Arc::new(goes_remote::build_client(&config.remote).await);

    let handle = tokio::spawn(goes_engine::run(
        store.clone(),
        s3_client,
        config,
        id,
    ));

    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/100 {msg}")
            .expect("valid progress template")
            .progress_chars("=>-"),
    );

    loop {
        tokio::time::sleep(Duration::from_millis(800)).await;
        let record = store.load(id).await?;
        bar.set_position(u64::from(record.progreso));
        bar.set_message(record.mensaje.clone());
        if record.estado.is_terminal() {
            break;
        }
    }

    handle.await.context("pipeline task panicked")?;

    let record = store.load(id).await?;
    match record.estado {
        QueryStatus::Completado => {
            bar.finish_with_message("completado");
            if let Some(report) = &record.resultados {
                println!(
                    "Total: {} archivos ({:.1} MB) en {}",
                    report.total_archivos,
                    report.total_mb,
                    report.ruta_destino.display()
                );
            }
            Ok(())
        }
        QueryStatus::Error => {
            bar.abandon_with_message("error");
            bail!("{}", record.mensaje);
        }
        QueryStatus::Recibido | QueryStatus::Procesando => {
            bail!("la consulta no termino: {}", record.mensaje)
        }
    }
}
