use chrono::NaiveDate;
use common::{DateRange, LooseNumber, Period};
use migration::{Migrator, MigratorTrait};
use model::entities::entry::EntryKind;
use sea_orm::{Database, DatabaseConnection};

use crate::{entries, plans, EntryPatch, NewEntry, NewPlan, PlanPatch};

async fn setup_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

fn running_plan(balance: LooseNumber) -> NewPlan {
    NewPlan {
        name: "Running Plan".to_string(),
        balance,
        icon: "target".to_string(),
        color: "#60A5FA".to_string(),
    }
}

fn workout(account_id: i64, amount: LooseNumber, category: &str, date: &str) -> NewEntry {
    NewEntry {
        kind: EntryKind::Expense,
        amount,
        category: category.to_string(),
        category_icon: "footprints".to_string(),
        account_id,
        date: date.parse().unwrap(),
        description: String::new(),
    }
}

#[tokio::test]
async fn create_plan_and_summary_round_trip() {
    let db = setup_db().await;

    let plan = plans::create_plan(&db, running_plan(LooseNumber::from(150.0)))
        .await
        .unwrap();

    let all = plans::all_plans(&db).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].balance, 150.0);

    entries::create_entry(&db, workout(plan.id, LooseNumber::from(30.0), "跑步", "2024-01-01"))
        .await
        .unwrap();

    let summary = entries::summary(&db, None).await.unwrap();
    assert_eq!(summary.expense, 30.0);
    assert_eq!(summary.income, 0.0);

    // Logging an entry never moves the plan's target.
    let after = plans::plan_by_id(&db, plan.id).await.unwrap().unwrap();
    assert_eq!(after.balance.to_bits(), 150.0_f64.to_bits());
}

#[tokio::test]
async fn entry_creation_does_not_touch_plan_balance() {
    let db = setup_db().await;
    let plan = plans::create_plan(&db, running_plan(LooseNumber::from(90.5)))
        .await
        .unwrap();
    let before = plans::plan_by_id(&db, plan.id).await.unwrap().unwrap();

    for day in ["2024-03-04", "2024-03-05", "2024-03-06"] {
        entries::create_entry(&db, workout(plan.id, LooseNumber::from(45.0), "游泳", day))
            .await
            .unwrap();
    }

    let after = plans::plan_by_id(&db, plan.id).await.unwrap().unwrap();
    assert_eq!(before.balance.to_bits(), after.balance.to_bits());
}

#[tokio::test]
async fn deleting_plan_cascades_to_entries() {
    let db = setup_db().await;
    let plan = plans::create_plan(&db, running_plan(LooseNumber::from(60.0)))
        .await
        .unwrap();
    let kept = plans::create_plan(&db, running_plan(LooseNumber::from(60.0)))
        .await
        .unwrap();

    entries::create_entry(&db, workout(plan.id, LooseNumber::from(20.0), "跑步", "2024-01-01"))
        .await
        .unwrap();
    entries::create_entry(&db, workout(plan.id, LooseNumber::from(25.0), "瑜伽", "2024-01-02"))
        .await
        .unwrap();
    entries::create_entry(&db, workout(kept.id, LooseNumber::from(15.0), "骑行", "2024-01-03"))
        .await
        .unwrap();

    plans::delete_plan(&db, plan.id).await.unwrap();

    let remaining = entries::entries(&db, None).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].account_id, kept.id);
    assert!(remaining.iter().all(|e| e.account_id != plan.id));
}

#[tokio::test]
async fn numeric_string_and_number_store_identically() {
    let db = setup_db().await;

    let from_text = plans::create_plan(&db, running_plan(LooseNumber::from("42.5")))
        .await
        .unwrap();
    let from_number = plans::create_plan(&db, running_plan(LooseNumber::from(42.5)))
        .await
        .unwrap();

    assert_eq!(from_text.balance.to_bits(), from_number.balance.to_bits());

    entries::create_entry(
        &db,
        workout(from_text.id, LooseNumber::from("42.5"), "跑步", "2024-01-01"),
    )
    .await
    .unwrap();
    entries::create_entry(
        &db,
        workout(from_text.id, LooseNumber::from(42.5), "跑步", "2024-01-01"),
    )
    .await
    .unwrap();

    let summary = entries::summary(&db, None).await.unwrap();
    assert_eq!(summary.expense, 85.0);
}

#[tokio::test]
async fn unparseable_balance_coerces_to_zero_not_nan() {
    let db = setup_db().await;

    plans::create_plan(&db, running_plan(LooseNumber::from("abc")))
        .await
        .unwrap();
    plans::create_plan(&db, running_plan(LooseNumber::from(100.0)))
        .await
        .unwrap();

    let total = plans::total_balance(&db).await.unwrap();
    assert!(total.is_finite());
    assert_eq!(total, 100.0);
}

#[tokio::test]
async fn unparseable_amount_update_stores_zero() {
    let db = setup_db().await;
    let plan = plans::create_plan(&db, running_plan(LooseNumber::from(60.0)))
        .await
        .unwrap();
    let entry = entries::create_entry(
        &db,
        workout(plan.id, LooseNumber::from(30.0), "跑步", "2024-01-01"),
    )
    .await
    .unwrap();

    entries::update_entry(
        &db,
        entry.id,
        EntryPatch {
            amount: Some(LooseNumber::from("not-a-number")),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let updated = entries::entry_by_id(&db, entry.id).await.unwrap().unwrap();
    assert_eq!(updated.amount, 0.0);

    let summary = entries::summary(&db, None).await.unwrap();
    assert!(summary.expense.is_finite());
    assert_eq!(summary.expense, 0.0);
}

#[tokio::test]
async fn category_summary_groups_sums_and_sorts() {
    let db = setup_db().await;
    let plan = plans::create_plan(&db, running_plan(LooseNumber::from(120.0)))
        .await
        .unwrap();

    entries::create_entry(&db, workout(plan.id, LooseNumber::from(20.0), "跑步", "2024-01-01"))
        .await
        .unwrap();
    entries::create_entry(&db, workout(plan.id, LooseNumber::from(35.0), "跑步", "2024-01-02"))
        .await
        .unwrap();
    entries::create_entry(&db, workout(plan.id, LooseNumber::from(10.0), "游泳", "2024-01-03"))
        .await
        .unwrap();

    let summary = entries::category_summary(&db, EntryKind::Expense, None)
        .await
        .unwrap();
    assert_eq!(summary.len(), 2);
    assert_eq!(summary[0].category, "跑步");
    assert_eq!(summary[0].total, 55.0);
    assert_eq!(summary[0].count, 2);
    assert_eq!(summary[1].category, "游泳");
    assert_eq!(summary[1].total, 10.0);
}

#[tokio::test]
async fn category_summary_is_scoped_to_kind() {
    let db = setup_db().await;
    let plan = plans::create_plan(&db, running_plan(LooseNumber::from(60.0)))
        .await
        .unwrap();

    entries::create_entry(&db, workout(plan.id, LooseNumber::from(30.0), "跑步", "2024-01-01"))
        .await
        .unwrap();
    entries::create_entry(
        &db,
        NewEntry {
            kind: EntryKind::Income,
            amount: LooseNumber::from(15.0),
            category: "核心".to_string(),
            category_icon: "target".to_string(),
            account_id: plan.id,
            date: "2024-01-01".parse().unwrap(),
            description: String::new(),
        },
    )
    .await
    .unwrap();

    let workouts = entries::category_summary(&db, EntryKind::Expense, None)
        .await
        .unwrap();
    assert_eq!(workouts.len(), 1);
    assert_eq!(workouts[0].category, "跑步");

    let tags = entries::category_summary(&db, EntryKind::Income, None)
        .await
        .unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].category, "核心");
}

#[tokio::test]
async fn summary_respects_date_range() {
    let db = setup_db().await;
    let plan = plans::create_plan(&db, running_plan(LooseNumber::from(60.0)))
        .await
        .unwrap();

    entries::create_entry(&db, workout(plan.id, LooseNumber::from(30.0), "跑步", "2024-01-01"))
        .await
        .unwrap();
    entries::create_entry(&db, workout(plan.id, LooseNumber::from(40.0), "跑步", "2024-02-01"))
        .await
        .unwrap();

    let january = DateRange::new(
        "2024-01-01".parse().unwrap(),
        "2024-01-31".parse().unwrap(),
    );
    let summary = entries::summary(&db, Some(january)).await.unwrap();
    assert_eq!(summary.expense, 30.0);

    // Inclusive bounds: the boundary day itself counts.
    let exact = DateRange::new(
        "2024-02-01".parse().unwrap(),
        "2024-02-01".parse().unwrap(),
    );
    let summary = entries::summary(&db, Some(exact)).await.unwrap();
    assert_eq!(summary.expense, 40.0);
}

#[tokio::test]
async fn entries_join_plan_name_and_respect_limit() {
    let db = setup_db().await;
    let plan = plans::create_plan(&db, running_plan(LooseNumber::from(60.0)))
        .await
        .unwrap();

    for (day, minutes) in [("2024-01-01", 10.0), ("2024-01-02", 20.0), ("2024-01-03", 30.0)] {
        entries::create_entry(&db, workout(plan.id, LooseNumber::from(minutes), "跑步", day))
            .await
            .unwrap();
    }

    let recent = entries::entries(&db, Some(2)).await.unwrap();
    assert_eq!(recent.len(), 2);
    // Newest activity first.
    assert_eq!(recent[0].date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
    assert_eq!(recent[0].plan_name.as_deref(), Some("Running Plan"));
}

#[tokio::test]
async fn empty_description_defaults_to_category() {
    let db = setup_db().await;
    let plan = plans::create_plan(&db, running_plan(LooseNumber::from(60.0)))
        .await
        .unwrap();

    let entry = entries::create_entry(
        &db,
        workout(plan.id, LooseNumber::from(30.0), "跑步", "2024-01-01"),
    )
    .await
    .unwrap();
    assert_eq!(entry.description, "跑步");

    let mut with_text = workout(plan.id, LooseNumber::from(30.0), "跑步", "2024-01-01");
    with_text.description = "晨跑".to_string();
    let entry = entries::create_entry(&db, with_text).await.unwrap();
    assert_eq!(entry.description, "晨跑");
}

#[tokio::test]
async fn update_entry_requires_existing_row() {
    let db = setup_db().await;

    let err = entries::update_entry(
        &db,
        9999,
        EntryPatch {
            amount: Some(LooseNumber::from(10.0)),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn update_plan_with_missing_row_completes_silently() {
    let db = setup_db().await;

    plans::update_plan(
        &db,
        9999,
        PlanPatch {
            name: Some("Ghost".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn empty_patches_are_no_ops() {
    let db = setup_db().await;
    let plan = plans::create_plan(&db, running_plan(LooseNumber::from(60.0)))
        .await
        .unwrap();
    let entry = entries::create_entry(
        &db,
        workout(plan.id, LooseNumber::from(30.0), "跑步", "2024-01-01"),
    )
    .await
    .unwrap();

    plans::update_plan(&db, plan.id, PlanPatch::default()).await.unwrap();
    entries::update_entry(&db, entry.id, EntryPatch::default())
        .await
        .unwrap();

    let unchanged = entries::entry_by_id(&db, entry.id).await.unwrap().unwrap();
    assert_eq!(unchanged.amount, 30.0);
}

#[tokio::test]
async fn update_plan_applies_partial_fields() {
    let db = setup_db().await;
    let plan = plans::create_plan(&db, running_plan(LooseNumber::from(60.0)))
        .await
        .unwrap();

    plans::update_plan(
        &db,
        plan.id,
        PlanPatch {
            balance: Some(LooseNumber::from("200")),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let updated = plans::plan_by_id(&db, plan.id).await.unwrap().unwrap();
    assert_eq!(updated.balance, 200.0);
    // Untouched fields survive.
    assert_eq!(updated.name, "Running Plan");
    assert_eq!(updated.icon, "target");
}

#[tokio::test]
async fn total_balance_on_empty_store_is_zero() {
    let db = setup_db().await;
    assert_eq!(plans::total_balance(&db).await.unwrap(), 0.0);
    let summary = entries::summary(&db, None).await.unwrap();
    assert_eq!(summary.income, 0.0);
    assert_eq!(summary.expense, 0.0);
}

#[tokio::test]
async fn week_period_filters_entries() {
    let db = setup_db().await;
    let plan = plans::create_plan(&db, running_plan(LooseNumber::from(60.0)))
        .await
        .unwrap();

    // 2024-01-03 is a Wednesday; the Monday week covers 01-01..01-07.
    entries::create_entry(&db, workout(plan.id, LooseNumber::from(30.0), "跑步", "2024-01-03"))
        .await
        .unwrap();
    entries::create_entry(&db, workout(plan.id, LooseNumber::from(45.0), "跑步", "2024-01-09"))
        .await
        .unwrap();

    let week = Period::Week.range("2024-01-03".parse().unwrap());
    let rows = entries::entries_by_date_range(&db, week).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].amount, 30.0);
}
