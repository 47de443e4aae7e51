//! Database operations for the relational catalog store
//!
//! Handles SQLite initialization and CRUD operations for flashcard sets and
//! flashcards. Cards outlive their set: deleting a set only clears `set_id`.

use crate::models::{CardSet, Flashcard};
use rusqlite::{Connection, OptionalExtension, Result, params};
use std::path::Path;

/// Opens (creating if needed) the SQLite database at `path` with the catalog tables
pub fn init_database(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    init_schema(&conn)?;
    Ok(conn)
}

/// Creates the catalog tables on an open connection
pub fn init_schema(conn: &Connection) -> Result<()> {
    // SET NULL on set deletion only works with foreign keys enabled
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS flashcard_sets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        )",
        (),
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS flashcards (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            term TEXT NOT NULL,
            definition TEXT NOT NULL DEFAULT '',
            exclude INTEGER NOT NULL DEFAULT 0,
            set_id INTEGER,
            FOREIGN KEY (set_id) REFERENCES flashcard_sets(id) ON DELETE SET NULL
        )",
        (),
    )?;

    Ok(())
}

/// Creates a new flashcard set and returns its ID
pub fn new_set(name: &str, conn: &Connection) -> Result<i64> {
    conn.execute("INSERT INTO flashcard_sets (name) VALUES (?1)", params![name])?;
    tracing::debug!("Flashcard set '{}' created", name);
    Ok(conn.last_insert_rowid())
}

pub fn get_set_id(name: &str, conn: &Connection) -> Result<Option<i64>> {
    conn.query_row(
        "SELECT id FROM flashcard_sets WHERE name = ?1",
        params![name],
        |row| row.get(0),
    )
    .optional()
}

/// Adds a flashcard to the named set, creating the set if it does not exist
///
/// Returns the flashcard ID.
pub fn add_flashcard(set_name: &str, card: &Flashcard, conn: &Connection) -> Result<i64> {
    let set_id = match get_set_id(set_name, conn)? {
        Some(id) => id,
        None => new_set(set_name, conn)?,
    };

    conn.execute(
        "INSERT INTO flashcards (term, definition, exclude, set_id) VALUES (?1, ?2, ?3, ?4)",
        params![card.term, card.definition, card.exclude, set_id],
    )?;

    Ok(conn.last_insert_rowid())
}

/// Retrieves all flashcards of a set in insertion order
///
/// Returns vector of (flashcard_id, Flashcard) tuples
pub fn get_flashcards_for_set(set_id: i64, conn: &Connection) -> Result<Vec<(i64, Flashcard)>> {
    let mut stmt = conn.prepare(
        "SELECT id, term, definition, exclude FROM flashcards WHERE set_id = ?1 ORDER BY id",
    )?;

    let flashcards = stmt
        .query_map(params![set_id], |row| {
            Ok((
                row.get(0)?,
                Flashcard {
                    term: row.get(1)?,
                    definition: row.get(2)?,
                    exclude: row.get(3)?,
                },
            ))
        })?
        .collect::<Result<Vec<(i64, Flashcard)>>>()?;

    Ok(flashcards)
}

/// Flashcards whose set has been deleted
pub fn get_orphaned_flashcards(conn: &Connection) -> Result<Vec<Flashcard>> {
    let mut stmt = conn.prepare(
        "SELECT term, definition, exclude FROM flashcards WHERE set_id IS NULL ORDER BY id",
    )?;
    let flashcards = stmt
        .query_map([], |row| {
            Ok(Flashcard {
                term: row.get(0)?,
                definition: row.get(1)?,
                exclude: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<Flashcard>>>()?;
    Ok(flashcards)
}

/// Retrieves all set names in creation order
pub fn get_all_sets(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM flashcard_sets ORDER BY id")?;
    let sets = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<String>>>()?;
    Ok(sets)
}

/// Loads all sets with their flashcards into memory
pub fn load_all_sets(conn: &Connection) -> Result<Vec<CardSet>> {
    let mut stmt = conn.prepare("SELECT id, name FROM flashcard_sets ORDER BY id")?;
    let set_rows = stmt
        .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
        .collect::<Result<Vec<(i64, String)>>>()?;

    let mut sets = Vec::new();

    for (set_id, name) in set_rows {
        // IDs are only needed inside the store
        let cards = get_flashcards_for_set(set_id, conn)?
            .into_iter()
            .map(|(_, card)| card)
            .collect();

        sets.push(CardSet { name, cards });
    }

    Ok(sets)
}

/// Deletes a set. Its flashcards stay in the table with no set.
pub fn delete_set(name: &str, conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM flashcard_sets WHERE name = ?1", params![name])?;
    Ok(())
}

/// Replaces the cards of a set (creating it if needed) in one transaction
pub fn replace_set(set: &CardSet, conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction()?;

    let set_id = match get_set_id(&set.name, &tx)? {
        Some(id) => id,
        None => new_set(&set.name, &tx)?,
    };
    tx.execute("DELETE FROM flashcards WHERE set_id = ?1", params![set_id])?;

    for card in &set.cards {
        tx.execute(
            "INSERT INTO flashcards (term, definition, exclude, set_id) VALUES (?1, ?2, ?3, ?4)",
            params![card.term, card.definition, card.exclude, set_id],
        )?;
    }

    tx.commit()
}

/// Removes all sets and flashcards
pub fn flush_data(conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM flashcards", ())?;
    conn.execute("DELETE FROM flashcard_sets", ())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn test_add_and_load_sets() {
        let conn = test_connection();
        add_flashcard("Polish Vocabulary", &Flashcard::new("cześć", "hello"), &conn).unwrap();
        add_flashcard("Polish Vocabulary", &Flashcard::excluded("proszę", "please"), &conn)
            .unwrap();
        add_flashcard("Colors", &Flashcard::new("red", "czerwony"), &conn).unwrap();

        let sets = load_all_sets(&conn).unwrap();
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].name, "Polish Vocabulary");
        assert_eq!(
            sets[0].cards,
            vec![
                Flashcard::new("cześć", "hello"),
                Flashcard::excluded("proszę", "please")
            ]
        );
        assert_eq!(sets[1].name, "Colors");
        assert_eq!(get_all_sets(&conn).unwrap(), vec!["Polish Vocabulary", "Colors"]);
    }

    #[test]
    fn test_duplicate_set_name_rejected() {
        let conn = test_connection();
        new_set("Animals", &conn).unwrap();
        assert!(new_set("Animals", &conn).is_err());
    }

    #[test]
    fn test_cards_survive_set_deletion() {
        let conn = test_connection();
        add_flashcard("Animals", &Flashcard::new("dog", "pies"), &conn).unwrap();
        add_flashcard("Animals", &Flashcard::new("cat", "kot"), &conn).unwrap();

        delete_set("Animals", &conn).unwrap();

        assert!(load_all_sets(&conn).unwrap().is_empty());
        let orphans = get_orphaned_flashcards(&conn).unwrap();
        assert_eq!(orphans.len(), 2);
        assert_eq!(orphans[0].term, "dog");
    }

    #[test]
    fn test_replace_set() {
        let mut conn = test_connection();
        add_flashcard("Animals", &Flashcard::new("dog", "pies"), &conn).unwrap();

        let refreshed = CardSet::new(
            "Animals",
            vec![Flashcard::new("cow", "krowa"), Flashcard::excluded("cat", "kot")],
        );
        replace_set(&refreshed, &mut conn).unwrap();
        replace_set(&CardSet::new("Fruit", vec![Flashcard::new("apple", "jabłko")]), &mut conn)
            .unwrap();

        let sets = load_all_sets(&conn).unwrap();
        assert_eq!(sets[0], refreshed);
        assert_eq!(sets[1].name, "Fruit");
    }

    #[test]
    fn test_flush_data() {
        let conn = test_connection();
        add_flashcard("Animals", &Flashcard::new("dog", "pies"), &conn).unwrap();
        flush_data(&conn).unwrap();
        assert!(get_all_sets(&conn).unwrap().is_empty());
        assert!(get_orphaned_flashcards(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_init_database_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flashcards.db");
        {
            let conn = init_database(&path).unwrap();
            add_flashcard("Animals", &Flashcard::new("dog", "pies"), &conn).unwrap();
        }
        let conn = init_database(&path).unwrap();
        assert_eq!(load_all_sets(&conn).unwrap()[0].cards.len(), 1);
    }
}
