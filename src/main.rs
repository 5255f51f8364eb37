mod archive;
mod args;
mod blocks;
mod cmd;
mod context;
mod error;
mod launch;
mod manifest;
mod result;
mod stage;
mod utils;

use args::{Action, Args};
use context::Context;
use log::{LevelFilter, debug};
use manifest::Manifest;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> result::Result<()> {
    let Args { verbose, action } = Args::parse()?;

    env_logger::Builder::from_default_env()
        .filter_level(if verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init();

    cliclack::intro("biobb-bioml")?;

    match action {
        Action::Launch { manifest, dry_run } => {
            let ctx = Context::new(manifest, verbose).with_dry_run(dry_run);
            launch_step(&ctx)?;
        }
        Action::Zip { output, sources } => {
            let entries = archive::zip_list(&output, &sources, true)?;
            for entry in &entries {
                debug!("{} <- {}", entry.name, entry.source.display());
            }
            cliclack::outro(format!(
                "Archived {} files into {}",
                entries.len(),
                output.display()
            ))?;
        }
    }

    Ok(())
}

fn launch_step(ctx: &Context) -> result::Result<()> {
    let manifest = {
        let spinner = cliclack::spinner();
        spinner.start("Loading step manifest...");
        match Manifest::load(ctx) {
            Ok(m) => {
                spinner.stop(format!("Loaded {} step", m.block.name()));
                m
            }
            Err(e) => {
                spinner.error("Failed to load step manifest");
                return Err(e);
            }
        }
    };

    if ctx.dry_run {
        launch::launch(ctx, &manifest.common, manifest.block.as_ref())?;
        cliclack::outro("Dry run, nothing was executed")?;
        return Ok(());
    }

    // the spinner would garble streamed tool output
    let spinner = (!ctx.verbose).then(cliclack::spinner);
    if let Some(spinner) = &spinner {
        spinner.start(format!("Running BioML.{}...", manifest.block.name()));
    }

    match launch::launch(ctx, &manifest.common, manifest.block.as_ref()) {
        Ok(_) => {
            if let Some(spinner) = &spinner {
                spinner.stop("Run completed");
            }
        }
        Err(e) => {
            if let Some(spinner) = &spinner {
                spinner.error("Run failed");
            }
            return Err(e);
        }
    }

    cliclack::outro(format!("{} finished successfully!", manifest.block.name()))?;
    Ok(())
}
