//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `repokit_core` wiring end to end: config, logging, store, repository.
//! - Keep output deterministic; generated keys are never printed.

use log::info;
use repokit_core::db::open_with_config;
use repokit_core::{
    init_logging, Column, ColumnType, CoreConfig, Entity, EntityRepository, Filter,
    MinimalRepository, Paginator, Repository, SqliteStore, Store,
};
use rusqlite::types::Value;
use rusqlite::Row;
use std::error::Error;
use uuid::Uuid;

const DEMO_RECORDS: i64 = 7;
const PAGE_SIZE: u32 = 3;

struct Note {
    id: String,
    title: String,
    rank: i64,
}

impl Entity for Note {
    type Key = String;

    const TABLE: &'static str = "smoke_notes";
    const COLUMNS: &'static [Column] = &[
        Column::new("title", ColumnType::Text),
        Column::new("rank", ColumnType::Integer),
    ];

    fn key(&self) -> String {
        self.id.clone()
    }

    fn values(&self) -> Vec<Value> {
        vec![Value::Text(self.title.clone()), Value::Integer(self.rank)]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            rank: row.get("rank")?,
        })
    }
}

/// Deletes every note, printing each outcome. Returns the number of failures.
fn delete_all<S: Store>(repo: &EntityRepository<S, Note>, notes: &[Note]) -> usize {
    notes
        .iter()
        .map(|note| {
            let outcome = repo.delete(note);
            println!("delete rank={} result={outcome}", note.rank);
            outcome
        })
        .filter(|outcome| outcome.is_failed())
        .count()
}

fn main() -> Result<(), Box<dyn Error>> {
    println!("repokit_core version={}", repokit_core::core_version());

    let config = CoreConfig::from_env()?;
    if config.logging.dir.is_some() {
        init_logging(&config.logging)?;
    }

    let conn = open_with_config(&config.database)?;
    SqliteStore::new(&conn).ensure_table::<Note>()?;
    let repo = EntityRepository::<_, Note>::sqlite(&conn);
    let already_stored = repo.count()?;

    let mut notes: Vec<Note> = (1..=DEMO_RECORDS)
        .map(|rank| Note {
            id: Uuid::new_v4().to_string(),
            title: format!("note {rank}"),
            rank,
        })
        .collect();
    for note in &notes {
        println!("save rank={} result={}", note.rank, repo.save(note));
    }

    if let Some(first) = notes.first_mut() {
        first.title = "note 1 (edited)".to_string();
        println!("update rank={} result={}", first.rank, repo.update(first));
    }

    let stored = repo.count()? - already_stored;
    let high_rank = repo.count_where(&Filter::gt("rank", 4))?;
    println!("count new={stored} rank_gt_4={high_rank}");

    let page = repo.paged_where(&Filter::gt("rank", 0), 2, PAGE_SIZE)?;
    println!("paged page=2 size={PAGE_SIZE} returned={}", page.len());

    let listing = Paginator::new(repo.find_all(&Filter::all())?, 1, PAGE_SIZE, "/notes");
    println!(
        "paginator total_pages={} next={} previous={}",
        listing.total_pages,
        listing.next.as_deref().unwrap_or("-"),
        listing.previous.as_deref().unwrap_or("-")
    );

    let failed_deletes = delete_all(&repo, &notes);
    let status = if failed_deletes == 0 { "ok" } else { "degraded" };
    info!(
        "event=cli_smoke module=cli status={status} records={DEMO_RECORDS} failed_deletes={failed_deletes}"
    );
    println!("cleanup remaining={}", repo.count()? - already_stored);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{delete_all, Note};
    use repokit_core::db::open_db_in_memory;
    use repokit_core::{EntityRepository, MinimalRepository, SqliteStore};

    fn note(id: &str, rank: i64) -> Note {
        Note {
            id: id.to_string(),
            title: format!("note {rank}"),
            rank,
        }
    }

    #[test]
    fn delete_all_counts_failed_deletes() {
        let conn = open_db_in_memory().unwrap();
        SqliteStore::new(&conn).ensure_table::<Note>().unwrap();
        let repo = EntityRepository::<_, Note>::sqlite(&conn);

        let notes = vec![note("a", 1), note("b", 2), note("never-saved", 3)];
        assert!(repo.save(&notes[0]).is_success());
        assert!(repo.save(&notes[1]).is_success());

        assert_eq!(delete_all(&repo, &notes), 1);
        assert!(repo.retrieve_all().unwrap().is_empty());
        assert_eq!(delete_all(&repo, &notes), 3);
    }
}
