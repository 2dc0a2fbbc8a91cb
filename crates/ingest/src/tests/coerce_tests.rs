use super::*;
use crate::csv_reader::read_csv;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .expect("date")
        .and_hms_opt(0, 0, 0)
        .expect("time")
}

#[test]
fn parses_common_date_layouts() {
    assert_eq!(parse_datetime("2024-01-31"), Some(ymd(2024, 1, 31)));
    assert_eq!(parse_datetime("2024/01/31"), Some(ymd(2024, 1, 31)));
    assert_eq!(parse_datetime("01/31/2024"), Some(ymd(2024, 1, 31)));
    assert_eq!(parse_datetime("31.01.2024"), Some(ymd(2024, 1, 31)));
    assert_eq!(parse_datetime("20240131"), Some(ymd(2024, 1, 31)));
    assert_eq!(parse_datetime("2024-03"), Some(ymd(2024, 3, 1)));
    assert_eq!(parse_datetime("1999"), Some(ymd(1999, 1, 1)));
}

#[test]
fn parses_times_and_offsets() {
    let dt = parse_datetime("2024-01-31 13:45:10").expect("datetime");
    assert_eq!(dt.format("%H:%M:%S").to_string(), "13:45:10");

    let dt = parse_datetime("2024-01-31T13:45").expect("datetime");
    assert_eq!(dt.format("%H:%M").to_string(), "13:45");

    let dt = parse_datetime("2024-01-31T13:45:00+02:00").expect("rfc3339");
    assert_eq!(dt.format("%H:%M").to_string(), "11:45");
}

#[test]
fn rejects_text_that_is_not_a_date() {
    assert_eq!(parse_datetime("yesterday"), None);
    assert_eq!(parse_datetime("2024-13-01"), None);
    assert_eq!(parse_datetime(""), None);
}

#[test]
fn date_coercion_keeps_missing_and_fails_on_garbage() {
    let table = read_csv("date,value\n2024-01-01,1\n,2\n2024-01-03,3\n".as_bytes()).expect("csv");
    let dates = coerce_datetime(&table, "date").expect("dates");
    assert_eq!(dates, vec![Some(ymd(2024, 1, 1)), None, Some(ymd(2024, 1, 3))]);

    let table = read_csv("date,value\n2024-01-01,1\nsoon,2\n".as_bytes()).expect("csv");
    let err = coerce_datetime(&table, "date").expect_err("garbage");
    match err {
        IngestError::DateCoercion { row, value, .. } => {
            assert_eq!(row, 1);
            assert_eq!(value, "soon");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn integer_dates_are_read_through_their_digits() {
    let table = read_csv("day,value\n20240101,1\n20240102,2\n".as_bytes()).expect("csv");
    let dates = coerce_datetime(&table, "day").expect("dates");
    assert_eq!(dates[1], Some(ymd(2024, 1, 2)));
}

#[test]
fn numeric_coercion_counts_unreadable_cells() {
    let table =
        read_csv("date,value\n2024-01-01,1\n2024-01-02,n/a\n2024-01-03,abc\n2024-01-04,2.5\n".as_bytes())
            .expect("csv");
    let column = coerce_numeric(&table, "value").expect("numeric");
    assert_eq!(column.values, vec![Some(1.0), None, None, Some(2.5)]);
    assert_eq!(column.coerced, 1);
}

#[test]
fn unknown_column_is_reported() {
    let table = read_csv("date,value\n2024-01-01,1\n".as_bytes()).expect("csv");
    let err = coerce_numeric(&table, "sales").expect_err("unknown");
    assert!(matches!(err, IngestError::UnknownColumn(name) if name == "sales"));
}
