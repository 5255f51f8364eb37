use crate::archive;
use crate::blocks::BuildingBlock;
use crate::cmd;
use crate::context::Context;
use crate::error::Error;
use crate::manifest::CommonProperties;
use crate::result::Result;
use crate::stage::Stage;
use log::{debug, warn};

/// Full argument vector for `block`: `-m BioML.<name>` followed by its flags
pub fn command_line(block: &dyn BuildingBlock, stage: &Stage) -> Result<Vec<String>> {
    let mut args = vec!["-m".to_string(), format!("BioML.{}", block.name())];
    args.extend(block.arguments(stage)?);
    Ok(args)
}

/// Stage, run, copy back, archive and clean up one block
pub fn launch(ctx: &Context, common: &CommonProperties, block: &dyn BuildingBlock) -> Result<i32> {
    let stage = Stage::plan(ctx, common, block)?;
    let args = command_line(block, &stage)?;

    if ctx.dry_run {
        println!("{}", cmd::display(&common.executable, &args));
        return Ok(0);
    }

    stage.stage_files()?;
    block.prepare(&stage)?;

    debug!("Creating command line with parameters");
    let code = cmd::execute(ctx, &common.executable, &args)?;

    if code != 0 {
        warn!("Working directory kept at {}", stage.unique_dir.display());
        return Err(Error::CommandFailed(format!(
            "{} failed with exit code: {}",
            cmd::display(&common.executable, &args),
            code
        )));
    }

    stage.copy_to_host()?;

    // the summary record would interleave with the non-verbose spinner
    if let Some(request) = block.archive(&stage)? {
        archive::zip_list(&request.destination, &request.sources, ctx.verbose)?;
    }

    if common.remove_tmp {
        stage.remove()?;
    }

    Ok(code)
}
