use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Abbreviation used at the start of each verse line, paired with the book's
/// full name, in canonical order.
pub const BOOKS: [(&str, &str); 66] = [
    ("Ge", "Genesis"),
    ("Exo", "Exodus"),
    ("Lev", "Leviticus"),
    ("Num", "Numbers"),
    ("Deu", "Deuteronomy"),
    ("Josh", "Joshua"),
    ("Jdgs", "Judges"),
    ("Ruth", "Ruth"),
    ("1Sm", "1 Samuel"),
    ("2Sm", "2 Samuel"),
    ("1Ki", "1 Kings"),
    ("2Ki", "2 Kings"),
    ("1Chr", "1 Chronicles"),
    ("2Chr", "2 Chronicles"),
    ("Ezra", "Ezra"),
    ("Neh", "Nehemiah"),
    ("Est", "Esther"),
    ("Job", "Job"),
    ("Psa", "Psalms"),
    ("Prv", "Proverbs"),
    ("Eccl", "Ecclesiastes"),
    ("SSol", "Song of Solomon"),
    ("Isa", "Isaiah"),
    ("Jer", "Jeremiah"),
    ("Lam", "Lamentations"),
    ("Eze", "Ezekiel"),
    ("Dan", "Daniel"),
    ("Hos", "Hosea"),
    ("Joel", "Joel"),
    ("Amos", "Amos"),
    ("Obad", "Obadiah"),
    ("Jonah", "Jonah"),
    ("Mic", "Micah"),
    ("Nahum", "Nahum"),
    ("Hab", "Habakkuk"),
    ("Zep", "Zephaniah"),
    ("Hag", "Haggai"),
    ("Zec", "Zechariah"),
    ("Mal", "Malachi"),
    ("Mat", "Matthew"),
    ("Mark", "Mark"),
    ("Luke", "Luke"),
    ("John", "John"),
    ("Acts", "Acts"),
    ("Rom", "Romans"),
    ("1Cor", "1 Corinthians"),
    ("2Cor", "2 Corinthians"),
    ("Gal", "Galatians"),
    ("Eph", "Ephesians"),
    ("Phi", "Philippians"),
    ("Col", "Colossians"),
    ("1Th", "1 Thessalonians"),
    ("2Th", "2 Thessalonians"),
    ("1Tim", "1 Timothy"),
    ("2Tim", "2 Timothy"),
    ("Titus", "Titus"),
    ("Phmn", "Philemon"),
    ("Heb", "Hebrews"),
    ("Jas", "James"),
    ("1Pet", "1 Peter"),
    ("2Pet", "2 Peter"),
    ("1Jn", "1 John"),
    ("2Jn", "2 John"),
    ("3Jn", "3 John"),
    ("Jude", "Jude"),
    ("Rev", "Revelation"),
];

// Lower-cased abbreviations, full names and space-free full names.
static BOOK_LOOKUP: Lazy<HashMap<String, &'static str>> = Lazy::new(|| {
    let mut lookup = HashMap::with_capacity(BOOKS.len() * 3);
    for (abbreviation, name) in BOOKS {
        lookup.insert(abbreviation.to_lowercase(), name);
        lookup.insert(name.to_lowercase(), name);
        lookup.insert(name.replace(' ', "").to_lowercase(), name);
    }
    lookup
});

/// Resolves an abbreviation or full book name, ignoring case, to the full name
pub fn canonical_book(name: &str) -> Option<&'static str> {
    let key: String = name.split_whitespace().collect::<Vec<_>>().join(" ");
    BOOK_LOOKUP.get(&key.to_lowercase()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_book() {
        assert_eq!(canonical_book("Num"), Some("Numbers"));
        assert_eq!(canonical_book("numbers"), Some("Numbers"));
        assert_eq!(canonical_book("1Sm"), Some("1 Samuel"));
        assert_eq!(canonical_book("1 samuel"), Some("1 Samuel"));
        assert_eq!(canonical_book("1Samuel"), Some("1 Samuel"));
        assert_eq!(canonical_book("Song  of Solomon"), Some("Song of Solomon"));
        assert_eq!(canonical_book("Rom"), Some("Romans"));
        assert_eq!(canonical_book("Hezekiah"), None);
    }

    #[test]
    fn test_books_are_unique() {
        let mut names: Vec<_> = BOOKS.iter().map(|(_, name)| *name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 66);
    }
}
