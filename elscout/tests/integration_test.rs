use anyhow::Result;
use elscout::source::{TextSource, VerseText};
use elscout::{
    scan, Delta, Direction, GridIndex, GridMatcher, Layout, LetterStream, MatchKind, Normalization,
    Position, SearchError, StrideSweeper, SweepOptions,
};
use std::collections::HashSet;
use std::fs;
use std::num::NonZeroUsize;
use tempfile::tempdir;

const HOLY_OF_HOLIES: &str = "קדש הקדשים";
const THE_BREASTPLATE: &str = "החושן";

const STRIDE: usize = 22;
const OFFSET: usize = 48;

// Letters that appear in neither query
const FILLER: &[char] = &[
    'א', 'ב', 'ג', 'ז', 'ט', 'כ', 'ל', 'מ', 'נ', 'ס', 'ע', 'פ', 'צ', 'ר', 'ת',
];

/// A stream shaped like the Numbers 4:11-20 table: 22 columns after skipping
/// 48 letters, "Holy of Holies" spelled across the end of row 21, and "the
/// Breastplate" running down the last column from row 7.
fn table_stream() -> LetterStream {
    let placed = STRIDE * 25;
    let mut symbols: Vec<char> = (0..OFFSET + placed)
        .map(|i| FILLER[i % FILLER.len()])
        .collect();

    let holy_start = 21 * STRIDE + 18;
    for (i, c) in HOLY_OF_HOLIES.chars().filter(|c| !c.is_whitespace()).enumerate() {
        symbols[OFFSET + holy_start + i] = c;
    }
    for (i, c) in THE_BREASTPLATE.chars().enumerate() {
        symbols[OFFSET + (7 + i) * STRIDE + 21] = c;
    }

    LetterStream::from_symbols(symbols)
}

fn table() -> GridIndex {
    GridIndex::build(&table_stream(), STRIDE, OFFSET).unwrap()
}

/// The same table, but with ה, ו and ש scattered all over it. Only ח and ן
/// stay unique to the planted column.
fn crowded_table() -> GridIndex {
    let mut symbols: Vec<char> = (0..OFFSET + STRIDE * 25)
        .map(|i| match i {
            i if i % 4 == 0 => 'ה',
            i if i % 3 == 0 => 'ו',
            i if i % 7 == 0 => 'ש',
            i => FILLER[i % FILLER.len()],
        })
        .collect();
    for (i, c) in THE_BREASTPLATE.chars().enumerate() {
        symbols[OFFSET + (7 + i) * STRIDE + 21] = c;
    }
    GridIndex::build(&LetterStream::from_symbols(symbols), STRIDE, OFFSET).unwrap()
}

fn keys(cells: &[(i64, i64)]) -> Vec<Position> {
    cells.iter().map(|&(col, row)| Position::new(col, row)).collect()
}

#[test]
fn test_table_geometry() {
    let grid = table();
    assert_eq!(grid.cols(), 22);
    assert_eq!(grid.rows(), 25);
    assert_eq!(grid.len(), table_stream().len() - OFFSET);
}

#[test]
fn test_holy_of_holies_wraps_rows() -> Result<()> {
    let grid = table();
    let matches = grid.find(HOLY_OF_HOLIES)?;

    assert_eq!(matches.len(), 1);
    assert_eq!(
        matches[0].positions,
        keys(&[
            (18, 21),
            (19, 21),
            (20, 21),
            (21, 21),
            (0, 22),
            (1, 22),
            (2, 22),
            (3, 22),
            (4, 22),
        ])
    );
    assert_eq!(matches[0].kind, MatchKind::Literal);
    assert!(matches[0].is_well_formed(grid.cols()));
    Ok(())
}

#[test]
fn test_breastplate_runs_down_last_column() -> Result<()> {
    let grid = table();
    let matches = grid.find(THE_BREASTPLATE)?;

    assert_eq!(matches.len(), 1);
    assert_eq!(
        matches[0].positions,
        keys(&[(21, 7), (21, 8), (21, 9), (21, 10), (21, 11)])
    );
    assert_eq!(matches[0].kind, MatchKind::Grid);
    assert_eq!(matches[0].delta, Delta::new(0, 1));
    Ok(())
}

#[test]
fn test_breastplate_in_crowded_table() -> Result<()> {
    let grid = crowded_table();
    let count = |c: char| grid.positions(c).len();
    assert_eq!(count('ח'), 1);
    assert_eq!(count('ן'), 1);
    assert!(count('ש') > 10);
    assert!(count('ש') < count('ה'));
    assert!(count('ו') * count('ש') > count('ה'));

    // ש-ן is the cheapest adjacent pair: one step per ש
    let matcher = GridMatcher::new(&grid);
    let matches = matcher.find(THE_BREASTPLATE)?;
    assert_eq!(
        matcher.metrics().get_stats().deltas_generated,
        count('ש') as u64
    );

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].kind, MatchKind::Grid);
    assert_eq!(matches[0].delta, Delta::new(0, 1));
    assert_eq!(
        matches[0].positions,
        keys(&[(21, 7), (21, 8), (21, 9), (21, 10), (21, 11)])
    );
    Ok(())
}

#[test]
fn test_repeated_symbol_query_on_large_grid() -> Result<()> {
    // 250 x 200 cells; 'a' fills column 0 and every fifth cell of row 0
    let (cols, rows) = (250, 200);
    let symbols = (0..cols * rows).map(|k| {
        let (col, row) = (k % cols, k / cols);
        if col == 0 || (row == 0 && col % 5 == 0) {
            'a'
        } else {
            'x'
        }
    });
    let grid = GridIndex::build(&LetterStream::from_symbols(symbols), cols, 0)?;
    assert_eq!(grid.len(), 50_000);

    let matcher = GridMatcher::new(&grid);
    let matches = matcher.find("aaa")?;
    let deltas = matcher.metrics().get_stats().deltas_generated;
    assert!(deltas > 0);
    assert!(deltas < (2 * cols as u64 - 1) * (2 * rows as u64 - 1));

    let mut sets = HashSet::new();
    for m in &matches {
        assert!(m.is_well_formed(cols), "{m:?}");
        assert!(m.positions.iter().all(|&p| grid.get(p) == Some('a')));
        assert!(sets.insert(m.position_set()), "duplicate match {m:?}");
    }

    // adjacent cells down column 0
    let vertical = matches
        .iter()
        .filter(|m| m.delta == Delta::new(0, 1) || m.delta == Delta::new(0, -1))
        .count();
    assert_eq!(vertical, rows - 2);
    Ok(())
}

#[test]
fn test_missing_symbol_does_not_abort_batch() {
    let grid = table();
    // final kaf never occurs in the table
    let queries = ["שלך", HOLY_OF_HOLIES, "אב", THE_BREASTPLATE];

    let mut found = 0;
    let mut skipped = 0;
    for query in queries {
        match grid.find(query) {
            Ok(matches) => found += matches.len(),
            Err(e) if e.is_query_error() => skipped += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(found, 2);
    assert_eq!(skipped, 2);

    assert!(matches!(
        grid.find("שלך"),
        Err(SearchError::SymbolNotFound { symbol: 'ך', .. })
    ));
    assert!(matches!(
        grid.find("אב"),
        Err(SearchError::TooShortQuery { len: 2, .. })
    ));
}

#[test]
fn test_every_match_is_well_formed() -> Result<()> {
    let text = "thequickbrownfoxjumpsoverthelazydogthenthecatsatonthemat";
    let stream = LetterStream::new(text, &Normalization::default());
    for stride in 2..9 {
        let grid = GridIndex::build(&stream, stride, 1)?;
        for query in ["the", "eht", "oat", "tan"] {
            let matches = match grid.find(query) {
                Ok(matches) => matches,
                Err(SearchError::SymbolNotFound { .. }) => continue,
                Err(e) => return Err(e.into()),
            };
            let mut sets = HashSet::new();
            for m in &matches {
                assert!(m.is_well_formed(stride), "{query} at stride {stride}: {m:?}");
                assert_eq!(m.positions.len(), 3);
                let spelled: String = m
                    .positions
                    .iter()
                    .map(|&p| grid.get(p).unwrap())
                    .collect();
                assert_eq!(spelled, query);
                assert!(sets.insert(m.position_set()), "duplicate match {m:?}");
            }
        }
    }
    Ok(())
}

#[test]
fn test_find_twice_gives_same_set() -> Result<()> {
    let grid = table();
    let first: HashSet<_> = grid.find(THE_BREASTPLATE)?.into_iter().collect();
    let second: HashSet<_> = grid.find(THE_BREASTPLATE)?.into_iter().collect();
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_sweep_finds_equidistant_sequence() -> Result<()> {
    let stream = LetterStream::new("aXXX bXXX cXXX dXXX", &Normalization::verbatim());
    let results = scan(&stream, "abc", 2, NonZeroUsize::new(4).unwrap())?;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].stride, 4);
    assert_eq!(results[0].offset, 0);
    assert_eq!(results[0].direction, Direction::Forward);
    assert_eq!(results[0].count, 1);
    Ok(())
}

#[test]
fn test_sweep_bound_does_not_change_results() -> Result<()> {
    let text = "In the beginning God created the heaven and the earth. And the earth was \
                without form, and void; and darkness was upon the face of the deep.";
    let stream = LetterStream::new(text, &Normalization::default());

    let mut runs = Vec::new();
    for workers in [1, 2, 16] {
        let sweeper = StrideSweeper::new(SweepOptions {
            max_concurrency: NonZeroUsize::new(workers).unwrap(),
            ..SweepOptions::default()
        });
        runs.push(sweeper.scan(&stream, "the")?);
    }
    assert!(!runs[0].is_empty());
    assert_eq!(runs[0], runs[1]);
    assert_eq!(runs[0], runs[2]);
    Ok(())
}

#[test]
fn test_verse_file_to_grid() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("kjv.txt");
    fs::write(
        &path,
        "KJV\n\
         Ge1:1 In the beginning God created the heaven and the earth.\n\
         Ge1:2 And the earth was without form, and void;\n",
    )?;

    let text = VerseText::load(&path)?;
    let stream = text.letter_stream("Genesis 1:1", "Genesis 1:2", &Normalization::default())?;
    let grid = GridIndex::build(&stream, 7, 0)?;

    // rows "inthebe", "ginning", "godcrea", ...
    let rendered = grid.render(Layout::LeftToRight);
    assert_eq!(rendered.lines().take(3).collect::<Vec<_>>(), ["inthebe", "ginning", "godcrea"]);

    let matches = grid.find("god")?;
    let god = matches
        .iter()
        .find(|m| m.positions == keys(&[(0, 2), (1, 2), (2, 2)]))
        .expect("god on row 2");
    assert_eq!(god.kind, MatchKind::Grid);
    assert_eq!(god.delta, Delta::new(1, 0));
    Ok(())
}
