use outage_core::{ItemsPerPage, PageCursor, StalledPagination, Step};

fn cursor() -> PageCursor {
    PageCursor::new(ItemsPerPage::default())
}

#[test]
fn terminates_with_exactly_the_server_total() {
    let mut cursor = cursor();
    let pages = [100u64, 100, 50];
    let total = 250u64;

    let mut requested_offsets = vec![cursor.offset()];
    for (i, rows) in pages.iter().enumerate() {
        match cursor.advance(*rows, total).unwrap() {
            Step::Continue { next_offset } => {
                assert!(i < pages.len() - 1, "continued past the final page");
                // Never re-request an offset that is already satisfied.
                assert!(next_offset > *requested_offsets.last().unwrap());
                requested_offsets.push(next_offset);
            }
            Step::Done => assert_eq!(i, pages.len() - 1),
        }
    }
    assert_eq!(cursor.offset(), total);
    assert_eq!(requested_offsets, vec![0, 100, 200]);
}

#[test]
fn zero_total_is_an_empty_result_not_an_error() {
    let mut cursor = cursor();
    assert_eq!(cursor.advance(0, 0), Ok(Step::Done));
    assert_eq!(cursor.progress(), 0.0);
}

#[test]
fn empty_page_before_total_is_a_stalled_server() {
    let mut cursor = cursor();
    cursor.advance(100, 300).unwrap();

    // Bounded: a single advance reports the stall instead of looping.
    assert_eq!(
        cursor.advance(0, 300),
        Err(StalledPagination {
            offset: 100,
            total: 300
        })
    );
}

#[test]
fn stop_offset_caps_the_loop_below_the_server_total() {
    let mut cursor = PageCursor::new(ItemsPerPage::default())
        .starting_at(48)
        .with_stop_offset(168);

    assert_eq!(
        cursor.advance(100, 100_000).unwrap(),
        Step::Continue { next_offset: 148 }
    );
    assert_eq!(cursor.advance(100, 100_000).unwrap(), Step::Done);
}

#[test]
fn stop_offset_beyond_total_stops_at_the_total() {
    let mut cursor = PageCursor::new(ItemsPerPage::default()).with_stop_offset(500);
    assert_eq!(
        cursor.advance(100, 120).unwrap(),
        Step::Continue { next_offset: 100 }
    );
    assert_eq!(cursor.advance(20, 120).unwrap(), Step::Done);
    assert_eq!(cursor.offset(), 120);
}

#[test]
fn start_offset_past_the_total_finishes_immediately() {
    let mut cursor = PageCursor::new(ItemsPerPage::default()).starting_at(500);
    assert_eq!(cursor.advance(0, 120).unwrap(), Step::Done);
}

#[test]
fn progress_is_division_safe_and_monotonic() {
    let mut cursor = cursor();
    assert_eq!(cursor.progress(), 0.0);
    cursor.advance(100, 400).unwrap();
    assert_eq!(cursor.progress(), 0.25);
    cursor.advance(300, 400).unwrap();
    assert_eq!(cursor.progress(), 1.0);
}
