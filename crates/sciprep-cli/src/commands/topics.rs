//! The `sciprep topics` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use sciprep_core::catalog::initial_progress;
use sciprep_core::mastery_map::subject_tiles;
use sciprep_core::model::Subject;

pub fn execute(subject: Option<Subject>) -> Result<()> {
    let progress = initial_progress(chrono::Local::now().date_naive());
    let subjects = match subject {
        Some(subject) => vec![subject],
        None => Subject::ALL.to_vec(),
    };

    let mut table = Table::new();
    table.set_header(vec!["Id", "Topic", "Subject", "Status", "Description"]);
    for subject in subjects {
        for tile in subject_tiles(&progress, subject) {
            table.add_row(vec![
                Cell::new(tile.topic.id),
                Cell::new(tile.topic.name),
                Cell::new(subject.label()),
                Cell::new(tile.displayed),
                Cell::new(tile.topic.description),
            ]);
        }
    }

    println!("{table}");
    Ok(())
}
