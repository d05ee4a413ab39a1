use storybook_core::{Book, BookPatch, Page, PageUpdate, new_book_id};

fn sample_book() -> Book {
    Book {
        id: "book-1".to_string(),
        title: "Whiskers on the Moon".to_string(),
        theme: "a brave cat explores the moon".to_string(),
        target_age: "3-5".to_string(),
        moral_value: "courage".to_string(),
        cover_image_url: None,
        pages: vec![
            Page::new(3, "three", "p3"),
            Page::new(1, "one", "p1"),
            Page::new(2, "two", "p2"),
        ],
        created_at: None,
    }
}

#[test]
fn validate_rejects_duplicate_page_numbers() {
    let mut book = sample_book();
    book.pages.push(Page::new(2, "again", "again"));
    let err = book.validate_pages().unwrap_err();
    assert!(err.contains("duplicate"));
}

#[test]
fn validate_rejects_non_positive_page_numbers() {
    let mut book = sample_book();
    book.pages[0].page_number = 0;
    assert!(book.validate_pages().is_err());
}

#[test]
fn contiguity_is_reported_but_not_required() {
    let mut book = sample_book();
    assert!(book.has_contiguous_pages());
    book.pages.retain(|p| p.page_number != 2);
    assert!(!book.has_contiguous_pages());
    assert!(book.validate_pages().is_ok());
}

#[test]
fn incomplete_pages_lists_pages_without_images() {
    let mut book = sample_book();
    book.sort_pages();
    book.pages[1].image_url = Some("https://img/2.png".to_string());
    assert_eq!(book.incomplete_pages(), vec![1, 3]);
}

#[test]
fn empty_image_url_counts_as_incomplete() {
    let mut page = Page::new(1, "a", "b");
    page.image_url = Some(String::new());
    assert!(!page.is_complete());
}

#[test]
fn json_uses_camel_case_and_omits_missing_images() {
    let book = sample_book();
    let json = serde_json::to_value(&book).unwrap();
    assert_eq!(json["targetAge"], "3-5");
    assert_eq!(json["moralValue"], "courage");
    assert!(json.get("coverImageUrl").is_none());
    assert_eq!(json["pages"][0]["pageNumber"], 3);
    assert!(json["pages"][0].get("imageUrl").is_none());
}

#[test]
fn patch_keeps_fields_that_are_absent() {
    let mut book = sample_book();
    let patch = BookPatch {
        title: Some("Renamed".to_string()),
        ..Default::default()
    };
    patch.apply_to(&mut book);
    assert_eq!(book.title, "Renamed");
    assert_eq!(book.theme, "a brave cat explores the moon");
    assert_eq!(book.pages.len(), 3);
}

#[test]
fn patch_with_pages_replaces_and_sorts_them() {
    let mut book = sample_book();
    let patch = BookPatch {
        pages: Some(vec![Page::new(2, "b", "b"), Page::new(1, "a", "a")]),
        ..Default::default()
    };
    patch.apply_to(&mut book);
    let numbers: Vec<i32> = book.pages.iter().map(|p| p.page_number).collect();
    assert_eq!(numbers, vec![1, 2]);
}

#[test]
fn page_update_merges_into_page() {
    let mut book = sample_book();
    let update = PageUpdate {
        content: Some("edited".to_string()),
        ..Default::default()
    };
    update.apply_to(book.page_mut(1).unwrap());
    let page = book.page(1).unwrap();
    assert_eq!(page.content, "edited");
    assert_eq!(page.image_prompt, "p1");
}

#[test]
fn summary_drops_pages() {
    let book = sample_book();
    let summary = serde_json::to_value(book.summary()).unwrap();
    assert!(summary.get("pages").is_none());
    assert_eq!(summary["id"], "book-1");
}

#[test]
fn book_ids_are_short_and_unique() {
    let a = new_book_id();
    let b = new_book_id();
    assert_eq!(a.len(), 12);
    assert_ne!(a, b);
}
