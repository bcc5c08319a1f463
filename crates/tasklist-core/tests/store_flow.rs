use chrono::{Duration, TimeZone, Utc};
use tasklist_core::config::Config;
use tasklist_core::render::Renderer;
use tasklist_core::session::Session;
use tasklist_core::{Category, Draft, Field, FieldError, StoreError, TaskStore};

#[test]
fn create_edit_move_toggle_remove() {
    let t0 = Utc
        .with_ymd_and_hms(2026, 6, 1, 9, 0, 0)
        .single()
        .expect("valid now");

    let store = TaskStore::new();
    let (store, errors) = store
        .submit(&Draft::new("personal", "Groceries", "milk, eggs"), None, t0)
        .expect("create groceries");
    assert!(errors.is_empty());
    let (store, _) = store
        .submit(&Draft::new("personal", "Dentist", "call at 9"), None, t0)
        .expect("create dentist");
    let (store, _) = store
        .submit(&Draft::new("personal", "Laundry", "whites"), None, t0)
        .expect("create laundry");

    let dentist = store.sequence(Category::Personal)[1].id;

    let t1 = t0 + Duration::minutes(10);
    let (store, errors) = store
        .submit(&Draft::new("work", "Dentist", "book for team"), Some(dentist), t1)
        .expect("move dentist");
    assert!(errors.is_empty());

    let personal: Vec<_> = store
        .sequence(Category::Personal)
        .iter()
        .map(|task| task.title.as_str())
        .collect();
    assert_eq!(personal, ["Groceries", "Laundry"]);
    let moved = &store.sequence(Category::Work)[0];
    assert_eq!(moved.id, dentist);
    assert_eq!(moved.category, Category::Work);
    assert_eq!(moved.time.created_at, t0);
    assert_eq!(moved.time.updated_at, t1);

    let t2 = t1 + Duration::minutes(1);
    let store = store.toggle_done(dentist, t2).expect("toggle");
    let task = store.find(dentist).expect("dentist");
    assert_eq!(task.time.done_at, Some(t2));
    assert_eq!(task.time.updated_at, t1);

    let before = store.len();
    let store = store.remove(dentist).expect("remove");
    assert_eq!(store.len(), before - 1);
    assert!(store.sequence(Category::Work).is_empty());
    assert_eq!(store.remove(dentist), Err(StoreError::NotFound(dentist)));
}

#[test]
fn rejected_draft_reports_all_fields_at_once() {
    let store = TaskStore::new();
    let errors = store.validate(&Draft::new("", "", ""));
    assert_eq!(errors.get(Field::Category), Some(FieldError::CategoryRequired));
    assert_eq!(errors.get(Field::Title), Some(FieldError::TitleRequired));
    assert_eq!(
        errors.get(Field::Description),
        Some(FieldError::DescriptionRequired)
    );

    let (after, errors) = store
        .submit(&Draft::new("work", "x".repeat(21), "fine"), None, Utc::now())
        .expect("submit");
    assert_eq!(errors.get(Field::Title), Some(FieldError::TitleTooLong));
    assert_eq!(after, store);
}

#[test]
fn scripted_session() {
    let mut cfg = Config::default();
    cfg.apply_overrides(vec![("color".to_string(), "off".to_string())]);
    let renderer = Renderer::new(&cfg).expect("renderer");

    let script = "\
        # morning\n\
        add work | Standup | daily sync\n\
        add personal | Run | 5k\n\
        add home | Paint | fence\n\
        list work\n\
        bogus\n\
        quit\n\
        add work | Never | reached\n";

    let mut session = Session::default();
    let mut out = Vec::new();
    tasklist_core::run_loop(&mut session, &renderer, script.as_bytes(), &mut out, None)
        .expect("run loop");

    let text = String::from_utf8(out).expect("utf8");
    assert!(text.contains("unknown category"));
    assert!(text.contains("work (1)"));
    assert!(text.contains("Standup"));
    assert!(text.contains("error: unknown or ambiguous command: bogus"));
    assert!(!text.contains("Never"));

    assert_eq!(session.store().sequence(Category::Work).len(), 1);
    assert_eq!(session.store().sequence(Category::Personal).len(), 1);
}

#[test]
fn undecodable_line_is_skipped_and_session_survives() {
    let mut cfg = Config::default();
    cfg.apply_overrides(vec![("color".to_string(), "off".to_string())]);
    let renderer = Renderer::new(&cfg).expect("renderer");

    let input: &[u8] = b"add work | Kept | first\nadd work | A | \xff\xfe\nadd work | B | C\n";
    let mut session = Session::default();
    let mut out = Vec::new();
    tasklist_core::run_loop(&mut session, &renderer, input, &mut out, None)
        .expect("run loop keeps going");

    let text = String::from_utf8(out).expect("utf8");
    assert!(text.contains("error: input line is not valid UTF-8"));

    let titles: Vec<_> = session
        .store()
        .sequence(Category::Work)
        .iter()
        .map(|task| task.title.as_str())
        .collect();
    assert_eq!(titles, ["Kept", "B"]);
}
