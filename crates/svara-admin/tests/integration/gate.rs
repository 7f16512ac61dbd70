//! Session gate following the in-memory auth provider.

use std::time::Duration;

use svara_admin::{GateState, GateView, SessionGate};
use svara_auth::{AuthProvider, Credentials};

use crate::common::{ADMIN_EMAIL, ADMIN_PASSWORD, TestHarness};

const WAIT: Duration = Duration::from_secs(2);

fn admin() -> Credentials {
    Credentials::new(ADMIN_EMAIL, ADMIN_PASSWORD)
}

async fn wait_for(gate: &SessionGate, want: impl Fn(&GateState) -> bool) -> GateState {
    let mut rx = gate.subscribe();
    tokio::time::timeout(WAIT, rx.wait_for(|s| want(s)))
        .await
        .expect("gate state did not change in time")
        .expect("gate stopped")
        .clone()
}

#[tokio::test]
async fn test_starts_resolving_then_anonymous() {
    let h = TestHarness::new();
    let gate = SessionGate::spawn(h.auth.clone());
    assert_eq!(gate.view(), GateView::Loading);

    let state = gate.wait_resolved(WAIT).await.unwrap();
    assert_eq!(state, GateState::Anonymous);
    assert_eq!(gate.view(), GateView::SignIn);
    assert!(gate.user().is_none());
}

#[tokio::test]
async fn test_existing_session_opens_panel() {
    let h = TestHarness::new();
    h.auth.sign_in(&admin()).await.unwrap();

    let gate = SessionGate::spawn(h.auth.clone());
    let state = gate.wait_resolved(WAIT).await.unwrap();
    assert_eq!(state.user().unwrap().email, ADMIN_EMAIL);
    assert_eq!(gate.view(), GateView::AdminPanel);
}

#[tokio::test]
async fn test_follows_sign_in_and_sign_out() {
    let h = TestHarness::new();
    let gate = SessionGate::spawn(h.auth.clone());
    gate.wait_resolved(WAIT).await.unwrap();

    h.auth.sign_in(&admin()).await.unwrap();
    let state = wait_for(&gate, |s| s.user().is_some()).await;
    assert_eq!(state.user().unwrap().email, ADMIN_EMAIL);

    h.auth.sign_out().await.unwrap();
    wait_for(&gate, |s| *s == GateState::Anonymous).await;
    assert_eq!(gate.view(), GateView::SignIn);
}

#[tokio::test]
async fn test_token_refresh_keeps_panel_open() {
    let h = TestHarness::new();
    h.auth.sign_in(&admin()).await.unwrap();
    let gate = SessionGate::spawn(h.auth.clone());
    gate.wait_resolved(WAIT).await.unwrap();

    let mut rx = gate.subscribe();
    rx.borrow_and_update();
    h.auth.expire_session();
    h.auth.current_session().await.unwrap();

    tokio::time::timeout(WAIT, rx.changed())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(gate.view(), GateView::AdminPanel);
}

#[tokio::test]
async fn test_failed_lookup_counts_as_signed_out() {
    let h = TestHarness::new();
    h.auth.fail_session_lookup(true);
    let gate = SessionGate::spawn(h.auth.clone());
    assert_eq!(gate.wait_resolved(WAIT).await.unwrap(), GateState::Anonymous);
}

#[tokio::test]
async fn test_wait_resolved_times_out() {
    let h = TestHarness::new();
    let gate = SessionGate::spawn(h.auth.clone());
    // Nothing has polled the gate task yet on this runtime.
    gate.shutdown();
    let err = gate.wait_resolved(Duration::from_millis(20)).await.unwrap_err();
    assert!(matches!(err, svara_admin::Error::GateTimeout(_)));
}

#[tokio::test]
async fn test_shutdown_stops_following() {
    let h = TestHarness::new();
    let gate = SessionGate::spawn(h.auth.clone());
    gate.wait_resolved(WAIT).await.unwrap();
    gate.shutdown();
    tokio::time::sleep(Duration::from_millis(10)).await;

    h.auth.sign_in(&admin()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(gate.state(), GateState::Anonymous);
}
