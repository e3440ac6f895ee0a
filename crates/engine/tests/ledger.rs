use chrono::{DateTime, NaiveDate};
use sea_orm::{Database, DatabaseConnection};

use engine::{
    DEFAULT_PHOTO, Engine, EngineError, Entry, EntryDraft, EntryId, EntryKind, EntryPatch,
    EntryRef, FileSession, GateState, Loaded, MemorySession, Money, RecordKey, Registration,
    aggregate::{DateRange, KindFilter, ReportFilter},
};
use migration::MigratorTrait;

async fn database() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db
}

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = database().await;
    let engine = Engine::builder()
        .database(db.clone())
        .session(MemorySession::new())
        .build();
    (engine, db)
}

/// A second handle on the same store with its own, inactive session.
fn new_session(db: &DatabaseConnection) -> Engine {
    Engine::builder()
        .database(db.clone())
        .session(MemorySession::new())
        .build()
}

fn registration(pin: &str) -> Registration {
    Registration {
        name: "Asha Rao".to_string(),
        phone: "+91 98765 43210".to_string(),
        email: "asha@example.com".to_string(),
        pin: pin.to_string(),
        photo: None,
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn draft(kind: EntryKind, on: NaiveDate, description: &str, minor: i64) -> EntryDraft {
    EntryDraft {
        kind,
        date: on,
        description: description.to_string(),
        category: "General".to_string(),
        amount: Money::new(minor),
    }
}

#[tokio::test]
async fn fresh_store_is_unregistered() {
    let (engine, _db) = engine_with_db().await;
    assert_eq!(engine.state().await.unwrap(), GateState::Unregistered);
    assert_eq!(engine.login("1234").await, Err(EngineError::NotRegistered));
}

#[tokio::test]
async fn register_opens_session_with_empty_ledger() {
    let (engine, _db) = engine_with_db().await;

    let profile = engine.register(registration("5678")).await.unwrap();
    assert_eq!(profile.name, "Asha Rao");
    assert_eq!(profile.photo, DEFAULT_PHOTO);

    assert_eq!(engine.state().await.unwrap(), GateState::Active);
    assert!(engine.entries().await.unwrap().is_empty());
    assert_eq!(engine.profile().await.unwrap(), profile);
}

#[tokio::test]
async fn registration_rejects_malformed_pins() {
    let (engine, _db) = engine_with_db().await;

    assert_eq!(
        engine.register(registration("12a4")).await.unwrap_err(),
        EngineError::InvalidPin
    );
    assert_eq!(
        engine.register(registration("123")).await.unwrap_err(),
        EngineError::InvalidPin
    );
    assert_eq!(engine.state().await.unwrap(), GateState::Unregistered);

    engine.register(registration("5678")).await.unwrap();
    assert_eq!(
        engine.register(registration("1111")).await.unwrap_err(),
        EngineError::AlreadyRegistered
    );
}

#[tokio::test]
async fn pin_stored_as_salted_hash() {
    let (engine, _db) = engine_with_db().await;
    engine.register(registration("4321")).await.unwrap();

    let stored = engine
        .storage()
        .load::<serde_json::Value>(RecordKey::User)
        .await
        .unwrap();
    let Loaded::Present(json) = stored else {
        panic!("profile missing");
    };
    assert!(json["pin"].is_object());
    assert!(!json["pin"]["salt"].as_str().unwrap().is_empty());
    assert_eq!(json["pin"]["sha256"].as_str().unwrap().len(), 64);
}

#[tokio::test]
async fn login_requires_exact_pin() {
    let (engine, db) = engine_with_db().await;
    engine.register(registration("4321")).await.unwrap();

    let later = new_session(&db);
    assert_eq!(later.state().await.unwrap(), GateState::LoggedOut);
    assert_eq!(later.entries().await, Err(EngineError::NotAuthenticated));

    assert_eq!(later.login("04321").await, Err(EngineError::WrongPin));
    assert_eq!(later.login("432").await, Err(EngineError::WrongPin));
    assert_eq!(later.state().await.unwrap(), GateState::LoggedOut);

    later.login(" 4321 ").await.unwrap();
    assert_eq!(later.state().await.unwrap(), GateState::Active);
}

#[tokio::test]
async fn entries_round_trip_in_insertion_order() {
    let (engine, db) = engine_with_db().await;
    engine.register(registration("1234")).await.unwrap();

    let salary = engine
        .add_entry(draft(EntryKind::Income, date(2024, 1, 1), "Salary", 50_000_00))
        .await
        .unwrap();
    let rent = engine
        .add_entry(EntryDraft {
            category: "  Home ".to_string(),
            ..draft(EntryKind::Expense, date(2024, 1, 3), "Rent", 12_000_50)
        })
        .await
        .unwrap();
    let tea = engine
        .add_entry(draft(EntryKind::Expense, date(2023, 12, 30), "Tea", 20_00))
        .await
        .unwrap();

    let reopened = new_session(&db);
    reopened.login("1234").await.unwrap();
    let entries = reopened.entries().await.unwrap();
    assert_eq!(entries, vec![salary, rent.clone(), tea]);
    assert_eq!(entries[1].category, "Home");
    assert_eq!(entries[1].amount, Money::new(12_000_50));
}

#[tokio::test]
async fn delete_middle_entry_keeps_order() {
    let (engine, db) = engine_with_db().await;
    engine.register(registration("1234")).await.unwrap();

    let a = engine
        .add_entry(draft(EntryKind::Income, date(2024, 1, 1), "A", 100))
        .await
        .unwrap();
    let b = engine
        .add_entry(draft(EntryKind::Expense, date(2024, 1, 2), "B", 200))
        .await
        .unwrap();
    let c = engine
        .add_entry(draft(EntryKind::Expense, date(2024, 1, 3), "C", 300))
        .await
        .unwrap();

    let removed = engine.delete_entry(&EntryRef::Position(2)).await.unwrap();
    assert_eq!(removed, b);

    let reopened = new_session(&db);
    reopened.login("1234").await.unwrap();
    assert_eq!(reopened.entries().await.unwrap(), vec![a, c]);
}

#[tokio::test]
async fn update_keeps_id_and_position() {
    let (engine, _db) = engine_with_db().await;
    engine.register(registration("1234")).await.unwrap();

    let first = engine
        .add_entry(draft(EntryKind::Expense, date(2024, 1, 1), "Bus", 30_00))
        .await
        .unwrap();
    let second = engine
        .add_entry(draft(EntryKind::Expense, date(2024, 1, 2), "Lunch", 150_00))
        .await
        .unwrap();

    let updated = engine
        .update_entry(
            &EntryRef::Id(first.id),
            EntryPatch {
                kind: Some(EntryKind::Income),
                amount: Some(Money::new(35_00)),
                ..EntryPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.id, first.id);
    assert_eq!(updated.description, "Bus");

    let entries = engine.entries().await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0], updated);
    assert_eq!(entries[1], second);
}

#[tokio::test]
async fn unknown_entry_leaves_list_untouched() {
    let (engine, _db) = engine_with_db().await;
    engine.register(registration("1234")).await.unwrap();
    let only = engine
        .add_entry(draft(EntryKind::Income, date(2024, 1, 1), "Gift", 500_00))
        .await
        .unwrap();

    let err = engine
        .update_entry(
            &EntryRef::Position(5),
            EntryPatch {
                description: Some("ghost".to_string()),
                ..EntryPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let missing: EntryRef = "ffffffff-ffff-4fff-bfff-ffffffffffff".parse().unwrap();
    assert!(matches!(
        engine.delete_entry(&missing).await,
        Err(EngineError::KeyNotFound(_))
    ));

    assert_eq!(engine.entries().await.unwrap(), vec![only]);
}

#[tokio::test]
async fn totals_follow_mutations() {
    let (engine, _db) = engine_with_db().await;
    engine.register(registration("1234")).await.unwrap();

    let zero = engine.totals().await.unwrap();
    assert_eq!(zero.income, Money::ZERO);
    assert_eq!(zero.expense, Money::ZERO);
    assert_eq!(zero.net, Money::ZERO);

    engine
        .add_entry(draft(EntryKind::Income, date(2024, 1, 1), "Salary", 1_000_00))
        .await
        .unwrap();
    let rent = engine
        .add_entry(draft(EntryKind::Expense, date(2024, 1, 2), "Rent", 1_500_00))
        .await
        .unwrap();

    let totals = engine.totals().await.unwrap();
    assert_eq!(totals.net, totals.income - totals.expense);
    assert_eq!(totals.net, Money::new(-500_00));

    let dash = engine.dashboard("₹").await.unwrap();
    assert_eq!(dash.net, "-₹500.00");

    engine.delete_entry(&EntryRef::Id(rent.id)).await.unwrap();
    assert_eq!(engine.totals().await.unwrap().net, Money::new(1_000_00));
}

#[tokio::test]
async fn overflowing_totals_are_rejected() {
    let (engine, _db) = engine_with_db().await;
    engine.register(registration("1234")).await.unwrap();

    let huge = Money::parse_non_negative("90000000000000000").unwrap();
    let first = engine
        .add_entry(EntryDraft {
            amount: huge,
            ..draft(EntryKind::Income, date(2024, 1, 1), "Jackpot", 0)
        })
        .await
        .unwrap();

    let err = engine
        .add_entry(EntryDraft {
            amount: huge,
            ..draft(EntryKind::Income, date(2024, 1, 2), "Jackpot", 0)
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let small = engine
        .add_entry(draft(EntryKind::Income, date(2024, 1, 3), "Tip", 1_00))
        .await
        .unwrap();
    let err = engine
        .update_entry(
            &EntryRef::Id(small.id),
            EntryPatch {
                amount: Some(huge),
                ..EntryPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    assert_eq!(engine.entries().await.unwrap(), vec![first, small]);
    assert_eq!(
        engine.totals().await.unwrap().income,
        huge + Money::new(1_00)
    );
}

#[tokio::test]
async fn stored_overflowing_list_fails_instead_of_panicking() {
    let (engine, _db) = engine_with_db().await;
    engine.register(registration("1234")).await.unwrap();

    let huge = Entry {
        id: EntryId::new(),
        kind: EntryKind::Expense,
        date: date(2024, 1, 1),
        description: String::new(),
        category: "General".to_string(),
        amount: Money::new(i64::MAX),
    };
    let twin = Entry {
        id: EntryId::new(),
        ..huge.clone()
    };
    engine
        .storage()
        .save(RecordKey::Entries, &vec![huge, twin])
        .await
        .unwrap();

    assert!(matches!(
        engine.totals().await,
        Err(EngineError::InvalidAmount(_))
    ));
    assert!(matches!(
        engine.dashboard("₹").await,
        Err(EngineError::InvalidAmount(_))
    ));
    assert_eq!(engine.history("₹").await.unwrap().len(), 2);
}

#[tokio::test]
async fn shared_session_file_does_not_unlock_other_store() {
    let dir = tempfile::tempdir().unwrap();
    let session_path = dir.path().join("spendbook.session");
    let file_session = || FileSession::new(&session_path, chrono::Duration::minutes(30));

    let db_a = database().await;
    let db_b = database().await;
    let store_a = Engine::builder()
        .database(db_a)
        .session(file_session())
        .build();
    let store_b = Engine::builder()
        .database(db_b)
        .session(file_session())
        .build();

    store_b.register(registration("1111")).await.unwrap();
    assert_eq!(store_b.state().await.unwrap(), GateState::Active);

    store_a.register(registration("2222")).await.unwrap();
    assert_eq!(store_a.state().await.unwrap(), GateState::Active);
    assert_eq!(store_b.state().await.unwrap(), GateState::LoggedOut);
    assert_eq!(store_b.entries().await, Err(EngineError::NotAuthenticated));

    assert_eq!(store_b.login("2222").await, Err(EngineError::WrongPin));
    store_b.login("1111").await.unwrap();
    assert_eq!(store_b.state().await.unwrap(), GateState::Active);
    assert_eq!(store_a.state().await.unwrap(), GateState::LoggedOut);
}

#[tokio::test]
async fn storage_remove_drops_one_record() {
    let (engine, _db) = engine_with_db().await;
    engine.register(registration("1234")).await.unwrap();
    engine
        .add_entry(draft(EntryKind::Income, date(2024, 1, 1), "Salary", 100))
        .await
        .unwrap();

    engine.storage().remove(RecordKey::Entries).await.unwrap();

    let entries = engine
        .storage()
        .load::<Vec<Entry>>(RecordKey::Entries)
        .await
        .unwrap();
    assert_eq!(entries, Loaded::Absent);
    assert!(matches!(
        engine.storage().load::<serde_json::Value>(RecordKey::User).await,
        Ok(Loaded::Present(_))
    ));
    assert!(engine.entries().await.unwrap().is_empty());

    // Removing an absent record is not an error.
    engine.storage().remove(RecordKey::Entries).await.unwrap();
}

#[tokio::test]
async fn january_income_report() {
    let (engine, _db) = engine_with_db().await;
    engine.register(registration("1234")).await.unwrap();

    engine
        .add_entry(draft(EntryKind::Income, date(2023, 12, 31), "Bonus", 100_00))
        .await
        .unwrap();
    let mid = engine
        .add_entry(draft(EntryKind::Income, date(2024, 1, 15), "Salary", 200_00))
        .await
        .unwrap();
    engine
        .add_entry(draft(EntryKind::Income, date(2024, 2, 1), "Salary", 300_00))
        .await
        .unwrap();
    engine
        .add_entry(draft(EntryKind::Expense, date(2024, 1, 20), "Books", 50_00))
        .await
        .unwrap();

    let filter = ReportFilter {
        range: DateRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap(),
        kind: KindFilter::Only(EntryKind::Income),
    };
    let generated_at = DateTime::parse_from_rfc3339("2024-02-02T09:30:00+05:30").unwrap();
    let doc = engine.report(&filter, "₹", generated_at).await.unwrap();

    assert_eq!(doc.rows.len(), 1);
    assert_eq!(doc.rows[0].date, mid.date);
    assert_eq!(doc.rows[0].description, "Salary");
    assert_eq!(doc.header.name, "Asha Rao");
    assert_eq!(doc.header.report_type, "INCOME");
    assert_eq!(doc.summary.income, "₹200.00");
    assert_eq!(doc.summary.net, "₹200.00");

    let everything = ReportFilter {
        kind: KindFilter::All,
        ..filter
    };
    let doc = engine.report(&everything, "₹", generated_at).await.unwrap();
    assert_eq!(doc.rows.len(), 2);
    assert_eq!(doc.summary.net, "₹150.00");
}

#[tokio::test]
async fn logout_wipes_everything() {
    let (engine, db) = engine_with_db().await;
    engine.register(registration("1234")).await.unwrap();
    engine
        .add_entry(draft(EntryKind::Income, date(2024, 1, 1), "Salary", 100))
        .await
        .unwrap();

    engine.logout().await.unwrap();
    assert_eq!(engine.state().await.unwrap(), GateState::Unregistered);

    let reopened = new_session(&db);
    assert_eq!(reopened.state().await.unwrap(), GateState::Unregistered);
    assert_eq!(reopened.logout().await, Err(EngineError::NotAuthenticated));

    // A new registration starts from an empty ledger.
    reopened.register(registration("9999")).await.unwrap();
    assert!(reopened.entries().await.unwrap().is_empty());
}

#[tokio::test]
async fn corrupt_entries_are_not_empty() {
    let (engine, _db) = engine_with_db().await;
    engine.register(registration("1234")).await.unwrap();

    engine
        .storage()
        .save(RecordKey::Entries, &"not a list")
        .await
        .unwrap();

    let err = engine.entries().await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::CorruptRecord { ref key, .. } if key == "entries"
    ));
    assert!(
        engine
            .add_entry(draft(EntryKind::Income, date(2024, 1, 1), "X", 1))
            .await
            .is_err()
    );
}

#[tokio::test]
async fn corrupt_profile_blocks_until_reset() {
    let (engine, _db) = engine_with_db().await;
    engine.register(registration("1234")).await.unwrap();

    engine
        .storage()
        .save(RecordKey::User, &serde_json::json!({ "name": 42 }))
        .await
        .unwrap();

    assert!(matches!(
        engine.state().await,
        Err(EngineError::CorruptRecord { .. })
    ));
    assert!(matches!(
        engine.login("1234").await,
        Err(EngineError::CorruptRecord { .. })
    ));

    engine.reset().await.unwrap();
    assert_eq!(engine.state().await.unwrap(), GateState::Unregistered);
}

#[tokio::test]
async fn failed_photo_read_persists_nothing() {
    let (engine, _db) = engine_with_db().await;
    let dir = tempfile::tempdir().unwrap();

    let err = engine
        .register(Registration {
            photo: Some(dir.path().join("missing.png")),
            ..registration("1234")
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Photo(_)));
    assert_eq!(engine.state().await.unwrap(), GateState::Unregistered);

    let err = engine
        .register(Registration {
            photo: Some(dir.path().join("notes.txt")),
            ..registration("1234")
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::UnsupportedImage(_)));
    assert_eq!(engine.state().await.unwrap(), GateState::Unregistered);
}

#[tokio::test]
async fn photo_is_embedded_and_replaceable() {
    let (engine, _db) = engine_with_db().await;
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("me.png");
    std::fs::write(&first, [0x89, b'P', b'N', b'G']).unwrap();

    let profile = engine
        .register(Registration {
            photo: Some(first),
            ..registration("1234")
        })
        .await
        .unwrap();
    assert!(profile.photo.starts_with("data:image/png;base64,"));
    assert!(profile.has_custom_photo());

    let second = dir.path().join("new.jpg");
    std::fs::write(&second, b"jpeg").unwrap();
    let updated = engine.update_photo(&second).await.unwrap();
    assert_eq!(updated.photo, "data:image/jpeg;base64,anBlZw==");
    assert_eq!(engine.profile().await.unwrap().photo, updated.photo);
}
