//! Profile picture handler.

use serde::Serialize;

use marquee_core::Backend;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Serialize)]
struct Photo {
    profile_picture: Option<String>,
}

pub async fn handle(backend: &Backend, global: &GlobalOpts) -> Result<(), CliError> {
    let profile_picture =
        util::with_spinner("Fetching photo…", global.quiet, backend.profile_picture()).await?;
    let photo = Photo { profile_picture };

    let out = output::render_single(
        &global.output,
        &photo,
        |p| {
            p.profile_picture
                .clone()
                .unwrap_or_else(|| "No profile picture set".into())
        },
        |p| p.profile_picture.clone().unwrap_or_default(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
