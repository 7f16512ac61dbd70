//! Client repository against the in-memory backend.

use svara_core::memory::{Call, Operation};
use svara_core::{ClientFields, ClientId, Error as CoreError, ImageUpload};

use crate::common::{TestHarness, jpeg, record};

fn core(err: svara_admin::Error) -> CoreError {
    match err {
        svara_admin::Error::Core(e) => e,
        other => panic!("expected a core error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_refresh_lists_newest_first() {
    let h = TestHarness::with_rows(vec![record(1, "Jonas", None), record(2, "Ona", None)]);
    let mut repo = h.repository();
    let rows = repo.refresh().await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].name, "Ona");
    assert_eq!(rows[1].name, "Jonas");
}

#[tokio::test]
async fn test_refresh_failure_keeps_previous_list() {
    let h = TestHarness::with_rows(vec![record(1, "Jonas", None)]);
    let mut repo = h.loaded_repository().await;
    h.backend.fail(Operation::List);

    assert!(repo.refresh().await.is_err());
    assert_eq!(repo.records().len(), 1);
}

#[tokio::test]
async fn test_missing_name_or_email_sends_nothing() {
    let h = TestHarness::with_rows(vec![record(1, "Jonas", None)]);
    let mut repo = h.loaded_repository().await;

    for fields in [
        ClientFields::new("   ", "ona@example.lt"),
        ClientFields::new("Ona", ""),
    ] {
        let err = repo.create(&fields, Some(&jpeg("car.jpg"))).await.unwrap_err();
        assert!(core(err).is_validation());
    }
    let err = repo
        .update(ClientId::new(1), &ClientFields::new("", " "), None)
        .await
        .unwrap_err();
    assert!(core(err).is_validation());

    assert!(h.backend.calls().is_empty());
    assert_eq!(repo.records(), h.backend.rows().as_slice());
}

#[tokio::test]
async fn test_create_prepends_trimmed_server_record() {
    let h = TestHarness::with_rows(vec![record(1, "Jonas", None)]);
    let mut repo = h.loaded_repository().await;

    let fields = ClientFields::new("  Ona ", " ona@example.lt ")
        .with_phone("   ")
        .with_text(" Ceramic coating ");
    let created = repo.create(&fields, None).await.unwrap().clone();

    assert_eq!(created.id, ClientId::new(2));
    assert_eq!(created.name, "Ona");
    assert_eq!(created.email, "ona@example.lt");
    assert_eq!(created.phone, None);
    assert_eq!(created.text.as_deref(), Some("Ceramic coating"));
    assert_eq!(created.image_url, None);

    assert_eq!(repo.records().len(), 2);
    assert_eq!(repo.records()[0], created);
    assert_eq!(h.backend.call_count(Operation::Insert), 1);
    assert_eq!(h.backend.call_count(Operation::Upload), 0);
}

#[tokio::test]
async fn test_create_uploads_image_before_insert() {
    let h = TestHarness::new();
    let mut repo = h.loaded_repository().await;

    let created = repo
        .create(&ClientFields::new("Ona", "ona@example.lt"), Some(&jpeg("audi.JPG")))
        .await
        .unwrap()
        .clone();

    let key = created.image_url.clone().unwrap();
    assert!(key.starts_with("cars/"));
    assert!(key.ends_with(".JPG"));
    assert!(h.backend.has_object(&key));

    let calls = h.backend.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], Call::Upload(key.clone()));
    assert!(matches!(&calls[1], Call::Insert(p) if p.image_url.as_deref() == Some(key.as_str())));
}

#[tokio::test]
async fn test_create_upload_failure_skips_insert() {
    let h = TestHarness::with_rows(vec![record(1, "Jonas", None)]);
    let mut repo = h.loaded_repository().await;
    h.backend.fail(Operation::Upload);

    let err = repo
        .create(&ClientFields::new("Ona", "ona@example.lt"), Some(&jpeg("a.jpg")))
        .await
        .unwrap_err();
    assert!(matches!(core(err), CoreError::Remote { .. }));
    assert_eq!(h.backend.call_count(Operation::Insert), 0);
    assert_eq!(repo.records().len(), 1);
}

#[tokio::test]
async fn test_create_insert_failure_removes_uploaded_image() {
    let h = TestHarness::new();
    let mut repo = h.loaded_repository().await;
    h.backend.fail(Operation::Insert);

    assert!(
        repo.create(&ClientFields::new("Ona", "ona@example.lt"), Some(&jpeg("a.jpg")))
            .await
            .is_err()
    );

    let calls = h.backend.calls();
    let Call::Upload(key) = &calls[0] else {
        panic!("expected upload first, got {calls:?}");
    };
    assert_eq!(calls[2], Call::Remove(vec![key.clone()]));
    assert!(h.backend.object_keys().is_empty());
    assert!(repo.records().is_empty());
}

#[tokio::test]
async fn test_rejected_image_never_uploads() {
    let h = TestHarness::new();
    let mut repo = h.loaded_repository().await;

    let pdf = ImageUpload::new("offer.pdf", "application/pdf", vec![1, 2, 3]);
    let err = repo
        .create(&ClientFields::new("Ona", "ona@example.lt"), Some(&pdf))
        .await
        .unwrap_err();
    assert!(matches!(core(err), CoreError::ImageRejected(_)));

    let huge = ImageUpload::new("big.png", "image/png", vec![0; 5 * 1024 * 1024 + 1]);
    let err = repo
        .create(&ClientFields::new("Ona", "ona@example.lt"), Some(&huge))
        .await
        .unwrap_err();
    assert!(matches!(core(err), CoreError::ImageRejected(_)));

    assert!(h.backend.calls().is_empty());
}

#[tokio::test]
async fn test_update_replaces_only_matching_entry() {
    let h = TestHarness::with_rows(vec![
        record(1, "Jonas", Some("cars/1-a.jpg")),
        record(2, "Ona", None),
    ]);
    let mut repo = h.loaded_repository().await;
    let before = repo.get(ClientId::new(1)).unwrap().clone();
    let other = repo.get(ClientId::new(2)).unwrap().clone();

    let mut fields = before.fields();
    fields.phone = " +37061111111 ".to_string();
    let updated = repo
        .update(ClientId::new(1), &fields, None)
        .await
        .unwrap()
        .clone();

    assert_eq!(updated.id, before.id);
    assert_eq!(updated.created_at, before.created_at);
    assert_eq!(updated.name, before.name);
    assert_eq!(updated.text, before.text);
    assert_eq!(updated.phone.as_deref(), Some("+37061111111"));
    assert_eq!(updated.image_url.as_deref(), Some("cars/1-a.jpg"));

    assert_eq!(repo.records().len(), 2);
    assert_eq!(repo.get(ClientId::new(2)), Some(&other));
    assert_eq!(h.backend.calls().len(), 1);
}

#[tokio::test]
async fn test_update_with_image_replaces_old_after_row_write() {
    let h = TestHarness::with_rows(vec![record(1, "Jonas", Some("cars/old.jpg"))]);
    h.backend.put_object("cars/old.jpg", vec![1], "image/jpeg");
    let mut repo = h.loaded_repository().await;

    let fields = repo.get(ClientId::new(1)).unwrap().fields();
    let updated = repo
        .update(ClientId::new(1), &fields, Some(&jpeg("new.jpg")))
        .await
        .unwrap()
        .clone();
    let new_key = updated.image_url.clone().unwrap();
    assert_ne!(new_key, "cars/old.jpg");

    let ops: Vec<Operation> = h.backend.calls().iter().map(Call::operation).collect();
    assert_eq!(ops, vec![Operation::Upload, Operation::Update, Operation::Remove]);
    assert_eq!(
        h.backend.calls()[2],
        Call::Remove(vec!["cars/old.jpg".to_string()])
    );
    assert_eq!(h.backend.object_keys(), vec![new_key.clone()]);
    assert_eq!(h.backend.rows()[0].image_url.as_deref(), Some(new_key.as_str()));
}

#[tokio::test]
async fn test_update_upload_failure_leaves_record_intact() {
    let h = TestHarness::with_rows(vec![record(1, "Jonas", Some("cars/old.jpg"))]);
    h.backend.put_object("cars/old.jpg", vec![1], "image/jpeg");
    let mut repo = h.loaded_repository().await;
    h.backend.fail(Operation::Upload);

    let fields = ClientFields::new("Jonas Jonaitis", "jonas@example.lt");
    assert!(
        repo.update(ClientId::new(1), &fields, Some(&jpeg("new.jpg")))
            .await
            .is_err()
    );

    assert_eq!(h.backend.call_count(Operation::Update), 0);
    assert_eq!(h.backend.call_count(Operation::Remove), 0);
    assert!(h.backend.has_object("cars/old.jpg"));
    let local = repo.get(ClientId::new(1)).unwrap();
    assert_eq!(local.name, "Jonas");
    assert_eq!(local.image_url.as_deref(), Some("cars/old.jpg"));
    assert_eq!(h.backend.rows()[0].name, "Jonas");
}

#[tokio::test]
async fn test_update_row_failure_removes_new_image_only() {
    let h = TestHarness::with_rows(vec![record(1, "Jonas", Some("cars/old.jpg"))]);
    h.backend.put_object("cars/old.jpg", vec![1], "image/jpeg");
    let mut repo = h.loaded_repository().await;
    h.backend.fail(Operation::Update);

    let fields = repo.get(ClientId::new(1)).unwrap().fields();
    assert!(
        repo.update(ClientId::new(1), &fields, Some(&jpeg("new.jpg")))
            .await
            .is_err()
    );

    assert_eq!(h.backend.object_keys(), vec!["cars/old.jpg".to_string()]);
    assert_eq!(
        repo.get(ClientId::new(1)).unwrap().image_url.as_deref(),
        Some("cars/old.jpg")
    );
}

#[tokio::test]
async fn test_old_image_removal_failure_is_not_surfaced() {
    let h = TestHarness::with_rows(vec![record(1, "Jonas", Some("cars/old.jpg"))]);
    h.backend.put_object("cars/old.jpg", vec![1], "image/jpeg");
    let mut repo = h.loaded_repository().await;
    h.backend.fail(Operation::Remove);

    let fields = repo.get(ClientId::new(1)).unwrap().fields();
    let updated = repo
        .update(ClientId::new(1), &fields, Some(&jpeg("new.jpg")))
        .await
        .unwrap();
    assert_ne!(updated.image_url.as_deref(), Some("cars/old.jpg"));
    assert_eq!(h.backend.call_count(Operation::Remove), 1);
}

#[tokio::test]
async fn test_legacy_url_old_image_is_removed_by_key() {
    let legacy = "https://abc.supabase.co/storage/v1/object/public/cars/old.jpg";
    let h = TestHarness::with_rows(vec![record(1, "Jonas", Some(legacy))]);
    let mut repo = h.loaded_repository().await;

    let fields = repo.get(ClientId::new(1)).unwrap().fields();
    repo.update(ClientId::new(1), &fields, Some(&jpeg("new.jpg")))
        .await
        .unwrap();
    assert_eq!(
        h.backend.calls().last(),
        Some(&Call::Remove(vec!["cars/old.jpg".to_string()]))
    );
}

#[tokio::test]
async fn test_update_unknown_client_sends_nothing() {
    let h = TestHarness::new();
    let mut repo = h.loaded_repository().await;
    let err = repo
        .update(ClientId::new(99), &ClientFields::new("Ona", "ona@example.lt"), None)
        .await
        .unwrap_err();
    assert!(core(err).is_not_found());
    assert!(h.backend.calls().is_empty());
}
