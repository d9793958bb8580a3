use anyhow::Result;
use famcal_core::store::{EventSource, StoreDocument};

use crate::render::render_event_details;

pub fn run(document: &StoreDocument, family: &str, event_id: &str) -> Result<()> {
    let event = document.find_event(family, event_id)?;
    let anchor = event.anchor_date()?;

    println!("{}", render_event_details(&event, anchor));

    Ok(())
}
