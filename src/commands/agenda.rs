use anyhow::Result;
use chrono::Local;
use famcal_core::store::{EventSource, StoreDocument};
use famcal_core::{DateWindow, expand_window};

use crate::render::render_agenda;

pub fn run(document: &StoreDocument, family: &str, window: &DateWindow) -> Result<()> {
    let events = document.family_events(family)?;
    let occurrences = expand_window(&events, window)?;

    println!("{}", render_agenda(&occurrences, Local::now().date_naive()));

    Ok(())
}
