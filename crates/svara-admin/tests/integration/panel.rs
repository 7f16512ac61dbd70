//! Admin panel flows: banners, form lifecycle, sign-out.

use std::time::Duration;

use svara_admin::{BannerKind, FormMode};
use svara_auth::{AuthProvider, Credentials};
use svara_core::memory::Operation;
use svara_core::{ClientId, ImageUpload};

use crate::common::{ADMIN_EMAIL, ADMIN_PASSWORD, TestHarness, jpeg, record};

fn banner(panel: &svara_admin::AdminPanel) -> Option<(BannerKind, String)> {
    panel.banner().map(|b| (b.kind, b.message.clone()))
}

#[tokio::test]
async fn test_submit_without_required_fields() {
    let h = TestHarness::new();
    let mut panel = h.loaded_panel().await;

    panel.open_create();
    panel.form_mut().fields_mut().email = "ona@example.lt".into();
    assert!(panel.submit().await.is_err());

    let (kind, message) = banner(&panel).unwrap();
    assert_eq!(kind, BannerKind::Error);
    assert!(message.contains("name and email are required"));
    assert_eq!(panel.form().mode(), FormMode::Creating);
    assert_eq!(panel.form().fields().email, "ona@example.lt");
    assert!(h.backend.calls().is_empty());
}

#[tokio::test]
async fn test_create_flow() {
    let h = TestHarness::with_rows(vec![record(1, "Jonas", None)]);
    let mut panel = h.loaded_panel().await;

    panel.open_create();
    {
        let fields = panel.form_mut().fields_mut();
        fields.name = "Ona".into();
        fields.email = "ona@example.lt".into();
    }
    panel.attach_image(jpeg("bmw.jpg")).unwrap();
    let created = panel.submit().await.unwrap();

    assert_eq!(
        banner(&panel),
        Some((BannerKind::Success, "Client added successfully".to_string()))
    );
    assert!(!panel.form().is_open());
    assert!(panel.form().fields().is_empty());
    assert_eq!(panel.clients()[0], created);
    assert_eq!(panel.clients().len(), 2);
}

#[tokio::test]
async fn test_remote_failure_keeps_form_open() {
    let h = TestHarness::new();
    let mut panel = h.loaded_panel().await;
    h.backend.fail(Operation::Insert);

    panel.open_create();
    {
        let fields = panel.form_mut().fields_mut();
        fields.name = "Ona".into();
        fields.email = "ona@example.lt".into();
    }
    assert!(panel.submit().await.is_err());

    let (kind, message) = banner(&panel).unwrap();
    assert_eq!(kind, BannerKind::Error);
    assert!(message.starts_with("Error saving client"));
    assert!(panel.form().is_open());
    assert_eq!(panel.form().fields().name, "Ona");
    assert!(panel.clients().is_empty());

    // Retrying by hand works once the service is back.
    h.backend.recover(Operation::Insert);
    assert!(panel.submit().await.is_ok());
}

#[tokio::test]
async fn test_edit_flow() {
    let h = TestHarness::with_rows(vec![record(1, "Jonas", Some("cars/1-a.jpg"))]);
    let mut panel = h.loaded_panel().await;

    panel.open_edit(ClientId::new(1)).unwrap();
    assert_eq!(panel.form().mode(), FormMode::Editing(ClientId::new(1)));
    assert_eq!(panel.form().fields().name, "Jonas");

    panel.form_mut().fields_mut().text = "Interior only".into();
    let updated = panel.submit().await.unwrap();
    assert_eq!(updated.text.as_deref(), Some("Interior only"));
    assert_eq!(updated.image_url.as_deref(), Some("cars/1-a.jpg"));
    assert_eq!(
        banner(&panel).map(|(_, m)| m),
        Some("Client updated successfully".to_string())
    );
}

#[tokio::test]
async fn test_open_edit_unknown_client() {
    let h = TestHarness::new();
    let mut panel = h.loaded_panel().await;
    assert!(panel.open_edit(ClientId::new(5)).is_err());
    assert!(!panel.form().is_open());
}

#[tokio::test]
async fn test_cancel_and_outside_click_discard() {
    let h = TestHarness::with_rows(vec![record(1, "Jonas", None)]);
    let mut panel = h.loaded_panel().await;
    let before = panel.clients().to_vec();

    panel.open_edit(ClientId::new(1)).unwrap();
    panel.form_mut().fields_mut().name = "Changed".into();
    panel.cancel();
    assert!(!panel.form().is_open());
    assert!(panel.form().fields().is_empty());

    panel.open_create();
    panel.form_mut().fields_mut().name = "Draft".into();
    panel.attach_image(jpeg("a.jpg")).unwrap();
    panel.dismiss_outside();
    assert!(!panel.form().is_open());
    assert!(panel.form().fields().is_empty());
    assert!(panel.form().image().is_none());

    assert_eq!(panel.clients(), before.as_slice());
    assert!(h.backend.calls().is_empty());
}

#[tokio::test]
async fn test_rejected_image_shows_error() {
    let h = TestHarness::new();
    let mut panel = h.loaded_panel().await;
    panel.open_create();
    panel.attach_image(jpeg("ok.jpg")).unwrap();

    let gif_too_big = ImageUpload::new("huge.gif", "image/gif", vec![0; 6 * 1024 * 1024]);
    assert!(panel.attach_image(gif_too_big).is_err());

    let (kind, message) = banner(&panel).unwrap();
    assert_eq!(kind, BannerKind::Error);
    assert!(message.contains("too large"));
    assert_eq!(panel.form().image().unwrap().file_name, "ok.jpg");
}

#[tokio::test]
async fn test_load_failure_shows_error() {
    let h = TestHarness::new();
    h.backend.fail(Operation::List);
    let mut panel = h.panel();
    assert!(panel.load().await.is_err());
    assert_eq!(
        banner(&panel),
        Some((BannerKind::Error, "Error loading the client list".to_string()))
    );
}

#[tokio::test]
async fn test_submit_with_closed_form() {
    let h = TestHarness::new();
    let mut panel = h.loaded_panel().await;
    assert!(matches!(
        panel.submit().await,
        Err(svara_admin::Error::FormClosed)
    ));
}

#[tokio::test]
async fn test_sign_out() {
    let h = TestHarness::new();
    h.auth
        .sign_in(&Credentials::new(ADMIN_EMAIL, ADMIN_PASSWORD))
        .await
        .unwrap();
    let mut panel = h.panel();

    panel.sign_out().await.unwrap();
    assert_eq!(
        banner(&panel),
        Some((BannerKind::Success, "Signed out successfully".to_string()))
    );
    assert!(h.auth.current_session().await.unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_banner_disappears_after_five_seconds() {
    let h = TestHarness::new();
    h.backend.fail(Operation::List);
    let mut panel = h.panel();
    let _ = panel.load().await;
    assert!(panel.banner().is_some());

    tokio::time::advance(Duration::from_secs(5)).await;
    assert!(panel.banner().is_none());
}
