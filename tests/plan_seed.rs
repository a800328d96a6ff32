//! Seeding writes exactly three plan documents per collection and is
//! idempotent across runs.

use std::path::PathBuf;

use timeai::models::plan::PlanLimits;
use timeai::store::plans::{PlanStore, PLAN_CONFIGS, SUBSCRIPTION_PLANS};

fn temp_root() -> PathBuf {
    std::env::temp_dir().join(format!("timeai-seed-{}", uuid::Uuid::new_v4()))
}

#[tokio::test]
async fn seeding_writes_one_document_per_plan() {
    let root = temp_root();
    let store = PlanStore::new(&root);

    let ids = store.seed_collection(PLAN_CONFIGS).await.unwrap();
    assert_eq!(ids, ["free", "pro", "max"]);

    let mut entries = Vec::new();
    let mut dir = tokio::fs::read_dir(root.join(PLAN_CONFIGS)).await.unwrap();
    while let Some(entry) = dir.next_entry().await.unwrap() {
        entries.push(entry.file_name().into_string().unwrap());
    }
    entries.sort();
    assert_eq!(entries, ["free.json", "max.json", "pro.json"]);

    let pro = store.read(PLAN_CONFIGS, "pro").await.unwrap().unwrap();
    assert_eq!(pro.name, "Pro");
    assert_eq!(pro.limits.daily_requests, 250);

    tokio::fs::remove_dir_all(&root).await.ok();
}

#[tokio::test]
async fn reseeding_overwrites_the_same_ids() {
    let root = temp_root();
    let store = PlanStore::new(&root);

    store.seed_collection(SUBSCRIPTION_PLANS).await.unwrap();
    let first = store
        .read(SUBSCRIPTION_PLANS, "max")
        .await
        .unwrap()
        .unwrap();

    store.seed_collection(SUBSCRIPTION_PLANS).await.unwrap();
    let second = store
        .read(SUBSCRIPTION_PLANS, "max")
        .await
        .unwrap()
        .unwrap();

    // Same ids, same shape; only timestamps move.
    assert_eq!(first.plan_id, second.plan_id);
    assert_eq!(first.name, second.name);
    assert_eq!(first.price, second.price);
    assert_eq!(first.limits, second.limits);
    assert!(PlanLimits::is_unlimited(second.limits.daily_requests));

    let mut count = 0;
    let mut dir = tokio::fs::read_dir(root.join(SUBSCRIPTION_PLANS))
        .await
        .unwrap();
    while dir.next_entry().await.unwrap().is_some() {
        count += 1;
    }
    assert_eq!(count, 3);

    tokio::fs::remove_dir_all(&root).await.ok();
}

#[tokio::test]
async fn seed_all_populates_both_collections() {
    let root = temp_root();
    let store = PlanStore::new(&root);

    store.seed_all().await.unwrap();

    for collection in [PLAN_CONFIGS, SUBSCRIPTION_PLANS] {
        for id in ["free", "pro", "max"] {
            assert!(
                store.read(collection, id).await.unwrap().is_some(),
                "{collection}/{id} missing"
            );
        }
    }

    tokio::fs::remove_dir_all(&root).await.ok();
}
