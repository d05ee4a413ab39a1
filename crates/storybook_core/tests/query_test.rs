use storybook_core::{ListQuery, SortKey, SortOrder};

#[test]
fn empty_query_is_newest_first() {
    assert_eq!(
        ListQuery::default().resolve(),
        (SortKey::CreatedAt, SortOrder::Desc)
    );
}

#[test]
fn allowed_keys_keep_requested_order() {
    assert_eq!(
        ListQuery::new("theme", "ASC").resolve(),
        (SortKey::Theme, SortOrder::Asc)
    );
    assert_eq!(
        ListQuery::new("createdAt", "asc").resolve(),
        (SortKey::CreatedAt, SortOrder::Asc)
    );
}

#[test]
fn unknown_key_ignores_requested_order() {
    assert_eq!(
        ListQuery::new("title; DROP TABLE books", "ASC").resolve(),
        (SortKey::CreatedAt, SortOrder::Desc)
    );
}

#[test]
fn unknown_order_defaults_to_descending() {
    assert_eq!(
        ListQuery::new("title", "sideways").resolve(),
        (SortKey::Title, SortOrder::Desc)
    );
}

#[test]
fn typed_query_round_trips_through_strings() {
    let query = ListQuery::sorted(SortKey::CreatedAt, SortOrder::Asc);
    assert_eq!(query.sort_by.as_deref(), Some("createdAt"));
    assert_eq!(query.resolve(), (SortKey::CreatedAt, SortOrder::Asc));
}
