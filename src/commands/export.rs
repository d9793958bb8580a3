use std::path::PathBuf;

use anyhow::{Context, Result};
use famcal_core::ics;
use famcal_core::store::{EventSource, StoreDocument, export_timezone};
use owo_colors::OwoColorize;

pub struct ExportOptions {
    pub tz: Option<String>,
    pub profile: Option<String>,
    /// `-` writes to stdout
    pub output: Option<String>,
    pub fallback_timezone: String,
}

pub fn run(document: &StoreDocument, family: &str, event_id: &str, options: &ExportOptions) -> Result<()> {
    let event = document.find_event(family, event_id)?;
    let timezone = export_timezone(document, options.tz.as_deref(), options.profile.as_deref())?
        .unwrap_or_else(|| options.fallback_timezone.clone());

    let content = ics::serialize(&event, &timezone)?;

    match options.output.as_deref() {
        Some("-") => print!("{}", content),
        output => {
            let path = output
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(ics::ics_filename(&event)));
            write_export(&path, &content)?;
            println!("{} {}", "Wrote".green(), path.display());
        }
    }

    Ok(())
}

fn write_export(path: &std::path::Path, content: &str) -> Result<()> {
    std::fs::write(path, content).with_context(|| format!("Could not write {}", path.display()))?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "wrote ics file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> StoreDocument {
        serde_json::from_value(serde_json::json!({
            "families": [{
                "id": "smiths",
                "events": [{
                    "id": "piano", "title": "Piano Lesson", "event_date": "2026-01-20",
                    "schedule_data": { "start_time": "16:00" }
                }]
            }],
            "profiles": [{ "id": "mom", "timezone": "Europe/Berlin" }]
        }))
        .unwrap()
    }

    fn options(output: &std::path::Path) -> ExportOptions {
        ExportOptions {
            tz: None,
            profile: Some("mom".into()),
            output: Some(output.to_string_lossy().into_owned()),
            fallback_timezone: "UTC".into(),
        }
    }

    #[test]
    fn writes_file_in_profile_zone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lesson.ics");

        run(&document(), "smiths", "piano", &options(&path)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("DTSTART;TZID=Europe/Berlin:20260120T160000\r\n"));
        assert!(content.contains("DTEND;TZID=Europe/Berlin:20260120T170000\r\n"));
    }

    #[test]
    fn unknown_event_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.ics");

        let err = run(&document(), "smiths", "nope", &options(&path)).unwrap_err();
        assert!(err.to_string().contains("nope"));
        assert!(!path.exists());
    }
}
