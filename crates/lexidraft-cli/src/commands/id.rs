//! `lexidraft id`: show the identifier a title would be stored under.

use serde_json::json;

use lexidraft_core::domain::generate_id;

use crate::{cli::IdArgs, error::CliResult, output::OutputManager};

pub fn execute(args: IdArgs, output: &OutputManager) -> CliResult<()> {
    let id = generate_id(&args.title, args.version);

    if output.is_json() {
        output.json(&json!({ "title": args.title, "version": args.version, "templateId": id }))?;
    } else {
        output.result(&id)?;
    }
    Ok(())
}
