mod common;

use std::path::Path;

use decant::cutover::{self, CutoverSpec};
use tempfile::tempdir;

#[tokio::test]
async fn rewrites_both_rule_classes_and_counts_rows() {
    let dir = tempdir().expect("tempdir");
    let pool = common::create_catalog(&dir.path().join("catalog.sqlite")).await;
    common::seed_storage(&pool, "object::user:alice").await;
    common::seed_storage(&pool, "object::user:bob").await;
    common::seed_storage(&pool, "object::store:s3bucket").await;
    common::seed_storage(&pool, "home::carol").await;

    let spec = CutoverSpec::new(Path::new("/srv/data"));
    let stats = cutover::apply(&pool, &spec).await.expect("cutover");

    assert_eq!(stats.per_user_rows, 2);
    assert_eq!(stats.shared_rows, 1);
    assert_eq!(
        common::storage_ids(&pool).await,
        vec![
            "home::alice".to_string(),
            "home::bob".to_string(),
            "home::carol".to_string(),
            "local::/srv/data/".to_string(),
        ]
    );
}

#[tokio::test]
async fn second_application_matches_no_rows() {
    let dir = tempdir().expect("tempdir");
    let pool = common::create_catalog(&dir.path().join("catalog.sqlite")).await;
    common::seed_storage(&pool, "object::user:alice").await;
    common::seed_storage(&pool, "object::store:s3bucket").await;

    let spec = CutoverSpec::new(Path::new("/srv/data"));
    cutover::apply(&pool, &spec).await.expect("first");
    let second = cutover::apply(&pool, &spec).await.expect("second");

    assert_eq!(second.per_user_rows, 0);
    assert_eq!(second.shared_rows, 0);
    assert_eq!(
        common::storage_ids(&pool).await,
        vec!["home::alice".to_string(), "local::/srv/data/".to_string()]
    );
}

#[tokio::test]
async fn non_foreign_rows_are_untouched() {
    let dir = tempdir().expect("tempdir");
    let pool = common::create_catalog(&dir.path().join("catalog.sqlite")).await;
    common::seed_storage(&pool, "local::/old/data/").await;
    common::seed_storage(&pool, "home::dave").await;

    let spec = CutoverSpec::new(Path::new("/srv/data"));
    let stats = cutover::apply(&pool, &spec).await.expect("cutover");

    assert_eq!(stats.per_user_rows, 0);
    assert_eq!(stats.shared_rows, 0);
    assert_eq!(
        common::storage_ids(&pool).await,
        vec!["home::dave".to_string(), "local::/old/data/".to_string()]
    );
}
