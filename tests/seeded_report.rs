use library_demo::{
    clean_all_data, db, find_extrema, seed_if_empty, Counted, Report, ReportConfig, SeedConfig,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rusqlite::Connection;

fn seeded(seed: u64) -> Connection {
    let conn = db::open_in_memory().unwrap();
    let mut rng = StdRng::seed_from_u64(seed);
    seed_if_empty(&conn, &SeedConfig::default(), &mut rng)
        .unwrap()
        .expect("fresh database should be seeded");
    conn
}

fn render(conn: &Connection) -> String {
    let mut report = Report::new(Vec::new(), false);
    report.run(conn, &ReportConfig::default()).unwrap();
    String::from_utf8(report.into_inner()).unwrap()
}

#[test]
fn seeded_report_lists_every_section() {
    let conn = seeded(2024);
    let output = render(&conn);

    for heading in [
        "*** Library",
        "*** Authors with \"S\" in their name",
        "*** Books published before 1984",
        "*** Authors who have written multiple books",
        "*** Author(s) who wrote the most books (",
        "*** Author(s) who wrote the least books (",
        "*** Books read by ",
        "*** Reader(s) who read the most books (",
        "*** Reader(s) who read the least books (",
        "*** Author(s) whose books have been read the most (",
        "*** Top 3 most popular books",
        "*** Books with more than two readers",
        "*** Favorite author(s) of ",
    ] {
        assert!(output.contains(heading), "missing {heading:?} in:\n{output}");
    }
    assert!(output.contains("10 authors, 50 books, 50 readers"));
}

#[test]
fn same_seed_gives_same_report() {
    assert_eq!(render(&seeded(11)), render(&seeded(11)));
}

#[test]
fn reader_extrema_agree_with_the_store() {
    let conn = seeded(99);
    let counts = db::readers_with_book_counts(&conn).unwrap();
    let extrema = find_extrema(counts.iter().cloned().map(Counted::into_pair)).unwrap();

    assert!(extrema.min_count >= 3);
    assert!(extrema.max_count < 8);
    for counted in &counts {
        let in_max = extrema.max_group.contains(&counted.item);
        assert_eq!(in_max, counted.count == extrema.max_count);
        let in_min = extrema.min_group.contains(&counted.item);
        assert_eq!(in_min, counted.count == extrema.min_count);
    }
}

#[test]
fn cleaning_leaves_an_empty_but_reportable_store() {
    let conn = seeded(5);
    clean_all_data(&conn).unwrap();

    let output = render(&conn);
    assert!(output.contains("0 authors, 0 books, 0 readers"));
    assert!(output.contains("*** Reader(s) who read the most books\n(none)"));
}
