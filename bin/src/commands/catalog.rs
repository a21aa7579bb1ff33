//! `catalog`: prints the valid satellites, sensors, levels, domains, products,
//! and bands the normalizer accepts.

use anyhow::Result;

use crate::context::Context;

/// Execute the `catalog` command.
pub(crate) fn show(ctx: &Context) -> Result<()> {
    let catalog = &ctx.catalog;

    println!("Satelites: {}", catalog.valid_satellites().join(", "));
    println!("Sensores:  {}", catalog.valid_sensors().join(", "));
    println!("Niveles:   {}", catalog.valid_levels().join(", "));
    println!("Dominios:  {}", catalog.valid_domains().join(", "));
    println!("Productos: {}", catalog.valid_products().join(", "));
    println!("Bandas:    {}", catalog.valid_bands().join(", "));

    Ok(())
}
