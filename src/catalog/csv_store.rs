//! Flat-file catalog: one `<set name>.csv` per set.
//!
//! Files start with a `Term,Definition,Exclude` header. Rows with fewer than
//! two fields are skipped and a missing `Exclude` column means "not excluded".

use crate::error::CatalogError;
use crate::models::{CardSet, Flashcard};
use std::fs;
use std::path::{Path, PathBuf};

const HEADER: [&str; 3] = ["Term", "Definition", "Exclude"];

type Result<T> = std::result::Result<T, CatalogError>;

pub fn parse_exclude(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "y"
    )
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn set_name_of(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(|stem| stem.to_string())
        .ok_or_else(|| CatalogError::InvalidSetFile(path.display().to_string()))
}

/// File for a set; path separators in the name become `_`.
pub fn set_path(dir: &Path, set_name: &str) -> PathBuf {
    dir.join(format!("{}.csv", set_name.replace(['/', '\\'], "_")))
}

/// Parses set rows from any reader, header row included.
pub fn parse_cards<R: std::io::Read>(reader: R) -> Result<Vec<Flashcard>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut cards = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.len() < 2 {
            continue;
        }
        cards.push(Flashcard {
            term: record[0].to_string(),
            definition: record[1].to_string(),
            exclude: record.get(2).is_some_and(parse_exclude),
        });
    }
    Ok(cards)
}

/// Reads one set; its name is the file name without `.csv`.
pub fn read_set(path: &Path) -> Result<CardSet> {
    let name = set_name_of(path)?;
    let file = fs::File::open(path)?;
    let cards = parse_cards(file)?;
    Ok(CardSet { name, cards })
}

/// Writes `set` to `<dir>/<name>.csv`, creating `dir` if needed.
pub fn write_set(dir: &Path, set: &CardSet) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = set_path(dir, &set.name);
    write_set_to(&path, set)?;
    Ok(path)
}

pub fn write_set_to(path: &Path, set: &CardSet) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(HEADER)?;
    for card in &set.cards {
        let exclude = if card.exclude { "True" } else { "False" };
        writer.write_record([card.term.as_str(), card.definition.as_str(), exclude])?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads every `.csv` file in `dir`, ordered by file name.
///
/// A missing directory is an empty catalog. Files that fail to parse are
/// skipped with a warning.
pub fn load_dir(dir: &Path) -> Result<Vec<CardSet>> {
    if !dir.exists() {
        tracing::info!("Set directory {} does not exist yet", dir.display());
        return Ok(Vec::new());
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_csv(path))
        .collect();
    paths.sort();

    let mut sets = Vec::new();
    for path in paths {
        match read_set(&path) {
            Ok(set) => sets.push(set),
            Err(e) => tracing::warn!("Skipping set file {}: {}", path.display(), e),
        }
    }
    tracing::debug!("Loaded {} sets from {}", sets.len(), dir.display());
    Ok(sets)
}

/// Copies a user-picked set file into `dir` and returns the parsed set.
pub fn import_file(src: &Path, dir: &Path) -> Result<CardSet> {
    if !is_csv(src) {
        return Err(CatalogError::InvalidSetFile(src.display().to_string()));
    }
    // Parse first so a broken file never lands in the catalog
    let set = read_set(src)?;
    fs::create_dir_all(dir)?;
    fs::copy(src, set_path(dir, &set.name))?;
    tracing::info!("Imported set '{}' with {} cards", set.name, set.cards.len());
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_set() -> CardSet {
        CardSet::new(
            "Polish Vocabulary",
            vec![
                Flashcard::new("cześć", "hello"),
                Flashcard::excluded("dziękuję", "thank you"),
                Flashcard::new("comma, inside", "quote \"inside\""),
            ],
        )
    }

    #[test]
    fn test_write_and_read_set() {
        let dir = tempfile::tempdir().unwrap();
        let set = create_test_set();

        let path = write_set(dir.path(), &set).unwrap();
        assert_eq!(path, dir.path().join("Polish Vocabulary.csv"));

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("Term,Definition,Exclude\n"));
        assert!(contents.contains("dziękuję,thank you,True"));

        assert_eq!(read_set(&path).unwrap(), set);
    }

    #[test]
    fn test_short_rows_skipped_and_missing_exclude() {
        let data = "Term,Definition,Exclude\nonly term\nA,1\nB,2,true\nC,3,False\n";
        let cards = parse_cards(data.as_bytes()).unwrap();
        assert_eq!(
            cards,
            vec![
                Flashcard::new("A", "1"),
                Flashcard::excluded("B", "2"),
                Flashcard::new("C", "3")
            ]
        );
    }

    #[test]
    fn test_parse_exclude() {
        assert!(parse_exclude("True"));
        assert!(parse_exclude(" yes "));
        assert!(parse_exclude("1"));
        assert!(!parse_exclude("False"));
        assert!(!parse_exclude(""));
        assert!(!parse_exclude("maybe"));
    }

    #[test]
    fn test_load_dir_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b_set.csv"), "Term,Definition\nB,2\n").unwrap();
        fs::write(dir.path().join("a_set.csv"), "Term,Definition\nA,1\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "not a set").unwrap();

        let sets = load_dir(dir.path()).unwrap();
        let names: Vec<&str> = sets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a_set", "b_set"]);
    }

    #[test]
    fn test_load_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_dir(&dir.path().join("nope")).unwrap().is_empty());
    }

    #[test]
    fn test_import_file() {
        let src_dir = tempfile::tempdir().unwrap();
        let data_dir = tempfile::tempdir().unwrap();
        let src = src_dir.path().join("Animals.csv");
        fs::write(&src, "Term,Definition,Exclude\ndog,pies,False\n").unwrap();

        let set = import_file(&src, &data_dir.path().join("sets")).unwrap();
        assert_eq!(set.name, "Animals");
        assert!(data_dir.path().join("sets").join("Animals.csv").exists());
    }

    #[test]
    fn test_set_path_sanitizes_separators() {
        let dir = Path::new("sets");
        assert_eq!(set_path(dir, "Either/Or"), dir.join("Either_Or.csv"));
    }

    #[test]
    fn test_import_rejects_non_csv() {
        let src_dir = tempfile::tempdir().unwrap();
        let src = src_dir.path().join("Animals.json");
        fs::write(&src, "{}").unwrap();
        assert!(matches!(
            import_file(&src, src_dir.path()),
            Err(CatalogError::InvalidSetFile(_))
        ));
    }
}
