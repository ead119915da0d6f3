//! Integration tests for the store importer against in-memory SurrealDB.

use std::collections::HashSet;

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

use tapster_core::error::TapsterError;
use tapster_core::hooks::CaseFoldSync;
use tapster_core::repository::StoreRepository;
use tapster_db::repository::SurrealStoreRepository;
use tapster_import::{StoreImporter, bundled_dataset};

async fn setup() -> (
    StoreImporter<SurrealStoreRepository<surrealdb::engine::local::Db>>,
    SurrealStoreRepository<surrealdb::engine::local::Db>,
) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    tapster_db::run_migrations(&db).await.unwrap();

    let repo = SurrealStoreRepository::with_hooks(db, vec![Box::new(CaseFoldSync)]);
    (StoreImporter::new(repo.clone()), repo)
}

#[tokio::test]
async fn single_record_import_end_to_end() {
    let (importer, repo) = setup().await;

    let count = importer
        .import_json(
            r#"{ "stores": [
                { "name": "Cafe ABC", "ratings": [5, 4], "totalRatings": 2 }
            ] }"#,
        )
        .await
        .unwrap();
    assert_eq!(count, 1);

    let hits = repo.find_by_name_prefix("cafe").await.unwrap();
    assert_eq!(hits.len(), 1);
    let store = &hits[0];

    assert_eq!(store.name, "Cafe ABC");
    assert_eq!(store.name_lower, "cafe abc");
    assert_eq!(store.ratings.average, 4.5);
    assert_eq!(store.ratings.total, 2);
    assert_eq!(store.ratings.scores, vec![5.0, 4.0]);
    assert!(store.owner_id.is_none());
    assert!(store.category.is_empty());
    assert!(store.managers.is_empty());
    assert!(store.menu_categories.is_empty());
}

#[tokio::test]
async fn bundled_dataset_imports_with_distinct_ids() {
    let (importer, repo) = setup().await;

    let count = importer.import_json(bundled_dataset()).await.unwrap();
    assert_eq!(count, 6);

    let mut ids = HashSet::new();
    for prefix in [
        "hopscotch",
        "gogi",
        "noodle",
        "the night owl",
        "cerveza",
        "dawn",
    ] {
        let hits = repo.find_by_name_prefix(prefix).await.unwrap();
        assert_eq!(hits.len(), 1, "expected exactly one match for {prefix}");
        assert!(ids.insert(hits[0].id.clone()), "duplicate store id");
    }

    // "late_night" is not a recognized category and must be dropped,
    // while the valid tag on the same record survives.
    let gogi = &repo.find_by_name_prefix("gogi").await.unwrap()[0];
    assert_eq!(gogi.category.len(), 1);

    // A string-valued category field normalizes to the empty set.
    let noodle = &repo.find_by_name_prefix("noodle").await.unwrap()[0];
    assert!(noodle.category.is_empty());

    // Missing coordinates default to zero.
    assert_eq!(noodle.location.longitude, 0.0);
    assert!(noodle.location.latitude > 0.0);

    // The all-defaults record gets the full defaulted shape.
    let dawn = &repo.find_by_name_prefix("dawn").await.unwrap()[0];
    assert!(dawn.menus.is_empty());
    assert!(dawn.business_hours.is_empty());
    assert!(!dawn.is_24_hours);
    assert_eq!(dawn.ratings.average, 0.0);
}

#[tokio::test]
async fn malformed_dataset_is_invalid_argument() {
    let (importer, _repo) = setup().await;
    let err = importer.import_json("{ not json").await.unwrap_err();
    assert!(matches!(err, TapsterError::InvalidArgument { .. }));
}
