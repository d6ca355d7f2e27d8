// vocab.rs - WordPiece vocabulary: token <-> id lookup.
//
// Format: UTF-8 text, one token per line, id = zero-based line number.
// Parsing stops at the first empty line; whitespace-only lines are trimmed and kept.

use std::collections::HashMap;
use std::path::Path;

use crate::error::TokenizerError;

/// Immutable bidirectional token/id mapping. Ids are dense in `[0, len)`.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    token_to_id: HashMap<String, usize>,
    id_to_token: Vec<String>,
}

impl Vocabulary {
    /// Load a vocabulary file (e.g. `vocab.txt` shipped with the model).
    pub fn load(path: &Path) -> Result<Self, TokenizerError> {
        let text = std::fs::read_to_string(path).map_err(|source| TokenizerError::VocabLoad {
            path: path.to_path_buf(),
            source,
        })?;
        let vocab = Self::from_lines(text.lines())?;
        log::info!("Loaded vocabulary from {} ({} entries)", path.display(), vocab.len());
        Ok(vocab)
    }

    /// Build a vocabulary from lines in id order.
    pub fn from_lines<I, S>(lines: I) -> Result<Self, TokenizerError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut token_to_id = HashMap::new();
        let mut id_to_token = Vec::new();

        for (line_no, line) in lines.into_iter().enumerate() {
            let line = line.as_ref();
            if line.is_empty() {
                break;
            }
            // A whitespace-only line still takes an id (as the empty token).
            let token = line.trim();
            let id = id_to_token.len();
            if token_to_id.insert(token.to_string(), id).is_some() {
                return Err(TokenizerError::MalformedVocab {
                    line: line_no + 1,
                    reason: format!("duplicate token {token:?}"),
                });
            }
            id_to_token.push(token.to_string());
        }

        Ok(Self {
            token_to_id,
            id_to_token,
        })
    }

    pub fn len(&self) -> usize {
        self.id_to_token.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_token.is_empty()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.token_to_id.contains_key(token)
    }

    /// Token -> id. Callers substitute the unknown token before calling.
    pub fn lookup(&self, token: &str) -> Result<usize, TokenizerError> {
        self.token_to_id
            .get(token)
            .copied()
            .ok_or_else(|| TokenizerError::UnknownToken(token.to_string()))
    }

    /// Id -> token.
    pub fn reverse_lookup(&self, id: usize) -> Result<&str, TokenizerError> {
        self.id_to_token
            .get(id)
            .map(String::as_str)
            .ok_or(TokenizerError::IdOutOfRange {
                id,
                len: self.id_to_token.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_ids_follow_line_order() {
        let vocab = Vocabulary::from_lines(["[PAD]", "[UNK]", "hello", "##ing"]).unwrap();
        assert_eq!(vocab.len(), 4);
        assert_eq!(vocab.lookup("[PAD]").unwrap(), 0);
        assert_eq!(vocab.lookup("hello").unwrap(), 2);
        assert_eq!(vocab.reverse_lookup(3).unwrap(), "##ing");
    }

    #[test]
    fn test_round_trip_every_id() {
        let vocab = Vocabulary::from_lines(["a", "b", "c", "##d", "[SEP]"]).unwrap();
        for id in 0..vocab.len() {
            let token = vocab.reverse_lookup(id).unwrap();
            assert_eq!(vocab.lookup(token).unwrap(), id);
        }
    }

    #[test]
    fn test_stops_at_first_blank_line() {
        let vocab = Vocabulary::from_lines(["a", "b", "", "c"]).unwrap();
        assert_eq!(vocab.len(), 2);
        assert!(!vocab.contains("c"));
    }

    #[test]
    fn test_whitespace_only_line_keeps_ids() {
        let vocab =
            Vocabulary::from_lines(["[PAD]", "\u{00A0}", "[UNK]", "[CLS]", "[SEP]", "the"]).unwrap();
        assert_eq!(vocab.len(), 6);
        assert_eq!(vocab.reverse_lookup(1).unwrap(), "");
        assert_eq!(vocab.lookup("[CLS]").unwrap(), 3);
        assert_eq!(vocab.lookup("the").unwrap(), 5);
    }

    #[test]
    fn test_trims_lines() {
        let vocab = Vocabulary::from_lines(["  hello \r", "world"]).unwrap();
        assert_eq!(vocab.lookup("hello").unwrap(), 0);
    }

    #[test]
    fn test_duplicate_is_malformed() {
        let err = Vocabulary::from_lines(["a", "b", "a"]).unwrap_err();
        assert!(matches!(err, TokenizerError::MalformedVocab { line: 3, .. }));
    }

    #[test]
    fn test_unknown_and_out_of_range() {
        let vocab = Vocabulary::from_lines(["a"]).unwrap();
        assert!(matches!(vocab.lookup("zzz"), Err(TokenizerError::UnknownToken(t)) if t == "zzz"));
        assert!(matches!(
            vocab.reverse_lookup(1),
            Err(TokenizerError::IdOutOfRange { id: 1, len: 1 })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[PAD]\n[UNK]\n[CLS]\n[SEP]\nthe").unwrap();
        let vocab = Vocabulary::load(file.path()).unwrap();
        assert_eq!(vocab.len(), 5);
        assert_eq!(vocab.lookup("the").unwrap(), 4);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Vocabulary::load(&dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, TokenizerError::VocabLoad { .. }));
    }
}
