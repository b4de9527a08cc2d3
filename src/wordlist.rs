use crate::validation::normalize_word;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Words found in a newline-delimited list, plus the lines that were skipped.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WordList {
    pub words: Vec<String>,
    pub rejected: Vec<String>,
}

impl WordList {
    fn push_line(&mut self, seen: &mut BTreeSet<String>, line: &str) {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return;
        }
        match normalize_word(line) {
            Ok(word) if seen.insert(word.clone()) => self.words.push(word),
            Ok(_) => {}
            Err(_) => self.rejected.push(line.to_string()),
        }
    }
}

/// Parse a word list: one word per line, `#` comments, duplicates dropped.
#[must_use]
pub fn load_words_from_str(data: &str) -> WordList {
    let mut list = WordList::default();
    let mut seen = BTreeSet::new();
    for line in data.lines() {
        list.push_line(&mut seen, line);
    }
    list
}

pub fn load_words_from_file<P: AsRef<Path>>(path: P) -> io::Result<WordList> {
    let reader = BufReader::new(File::open(path)?);
    let mut list = WordList::default();
    let mut seen = BTreeSet::new();
    for line in reader.lines() {
        list.push_line(&mut seen, &line?);
    }
    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_words_normalizes_and_dedups() {
        let list = load_words_from_str("crane\n  SLATE \n# seed words\n\nCrane\ntoolong\nab1de\n");
        assert_eq!(list.words, vec!["CRANE", "SLATE"]);
        assert_eq!(list.rejected, vec!["toolong", "ab1de"]);
    }

    #[test]
    fn test_load_words_from_missing_file() {
        assert!(load_words_from_file("/definitely/not/here.txt").is_err());
    }

    #[test]
    fn test_load_words_from_file() {
        let dir = std::env::temp_dir().join(format!("wordle-client-list-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("words.txt");
        std::fs::write(&path, "grana\napple\n").unwrap();
        let list = load_words_from_file(&path).unwrap();
        assert_eq!(list.words, vec!["GRANA", "APPLE"]);
        assert!(list.rejected.is_empty());
    }
}
