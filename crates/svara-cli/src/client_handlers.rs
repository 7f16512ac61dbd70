//! Handlers for `svara clients`.
//!
//! Every action first waits for the session gate and refuses to run unless
//! an admin is signed in.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use svara_admin::{
    AdminPanel, ClientRepository, GateView, ImageState, SessionGate, SignedImageResolver,
};
use svara_auth::{AuthProvider, AuthUser};
use svara_core::{
    ClientFields, ClientId, ClientRecord, ClientTable, Error as CoreError, ImageUpload,
    ObjectStore, SvaraConfig,
};

use crate::cli::ClientsAction;
use crate::error::{Error, Result};

/// How long to wait for the initial session lookup.
pub const GATE_TIMEOUT: Duration = Duration::from_secs(15);

/// Remote services used by the client commands.
#[derive(Clone)]
pub struct Backends {
    /// Row store.
    pub table: Arc<dyn ClientTable>,
    /// Photo bucket.
    pub objects: Arc<dyn ObjectStore>,
    /// Auth service.
    pub auth: Arc<dyn AuthProvider>,
}

/// Field overrides given to `clients edit`.
#[derive(Debug, Default)]
pub struct FieldEdits {
    /// New name.
    pub name: Option<String>,
    /// New email.
    pub email: Option<String>,
    /// New phone; empty clears it.
    pub phone: Option<String>,
    /// New note; empty clears it.
    pub text: Option<String>,
}

impl FieldEdits {
    /// Lays the given values over `fields`.
    pub fn apply(self, fields: &mut ClientFields) {
        if let Some(name) = self.name {
            fields.name = name;
        }
        if let Some(email) = self.email {
            fields.email = email;
        }
        if let Some(phone) = self.phone {
            fields.phone = phone;
        }
        if let Some(text) = self.text {
            fields.text = text;
        }
    }
}

/// Waits for the session gate and returns the signed-in admin.
pub async fn require_admin(auth: Arc<dyn AuthProvider>) -> Result<AuthUser> {
    let gate = SessionGate::spawn(auth);
    let state = gate.wait_resolved(GATE_TIMEOUT).await?;
    gate.shutdown();
    match (GateView::from(&state), state.user()) {
        (GateView::AdminPanel, Some(user)) => {
            tracing::debug!(email = %user.email, "Admin session");
            Ok(user.clone())
        }
        _ => Err(Error::NotSignedIn),
    }
}

/// Dispatches a `svara clients` action.
pub async fn handle_clients_command(
    backends: &Backends,
    config: &SvaraConfig,
    action: ClientsAction,
    out: &mut dyn Write,
) -> Result<()> {
    require_admin(Arc::clone(&backends.auth)).await?;
    let repository = ClientRepository::from_config(
        Arc::clone(&backends.table),
        Arc::clone(&backends.objects),
        config,
    );

    match action {
        ClientsAction::List { json } => {
            let mut repository = repository;
            let records = repository.refresh().await?;
            if json {
                writeln!(
                    out,
                    "{}",
                    serde_json::to_string_pretty(records).map_err(CoreError::from)?
                )?;
            } else {
                write!(out, "{}", render_table(records))?;
            }
        }
        ClientsAction::Add {
            name,
            email,
            phone,
            text,
            image,
            content_type,
        } => {
            let mut panel = panel(repository, backends, config);
            panel.open_create();
            FieldEdits {
                name: Some(name),
                email: Some(email),
                phone,
                text,
            }
            .apply(panel.form_mut().fields_mut());
            if let Some(path) = image {
                panel.attach_image(ImageUpload::from_path(&path, content_type.as_deref())?)?;
            }
            let record = panel.submit().await?;
            writeln!(out, "Added client {} ({})", record.id, record.name)?;
        }
        ClientsAction::Edit {
            id,
            name,
            email,
            phone,
            text,
            image,
            content_type,
        } => {
            let mut panel = panel(repository, backends, config);
            panel.load().await?;
            panel.open_edit(ClientId::new(id))?;
            FieldEdits {
                name,
                email,
                phone,
                text,
            }
            .apply(panel.form_mut().fields_mut());
            if let Some(path) = image {
                panel.attach_image(ImageUpload::from_path(&path, content_type.as_deref())?)?;
            }
            let record = panel.submit().await?;
            writeln!(out, "Updated client {} ({})", record.id, record.name)?;
        }
        ClientsAction::ImageUrl { id } => {
            let mut repository = repository;
            repository.refresh().await?;
            let id = ClientId::new(id);
            let record = repository
                .get(id)
                .ok_or_else(|| CoreError::not_found(format!("client {id}")))?;
            let resolver =
                SignedImageResolver::from_settings(Arc::clone(&backends.objects), &config.media);
            let mut handle = resolver.mount(record.image_url.clone().unwrap_or_default());
            match handle.load(&resolver).await {
                ImageState::Ready(signed) => writeln!(out, "{}", signed.url)?,
                ImageState::Unavailable(reason) => {
                    tracing::info!(%id, %reason, "Image unavailable");
                    writeln!(out, "Image unavailable")?;
                }
                ImageState::Loading => {}
            }
        }
    }
    Ok(())
}

fn panel(repository: ClientRepository, backends: &Backends, config: &SvaraConfig) -> AdminPanel {
    AdminPanel::new(repository, Arc::clone(&backends.auth))
        .with_banner_ttl(config.admin.banner_ttl())
}

/// Formats records as a plain-text table.
pub fn render_table(records: &[ClientRecord]) -> String {
    if records.is_empty() {
        return "No clients yet\n".to_string();
    }
    let mut table = format!(
        "{:<6} {:<16} {:<24} {:<28} {:<16} {}\n",
        "ID", "CREATED", "NAME", "EMAIL", "PHONE", "PHOTO"
    );
    for r in records {
        table.push_str(&format!(
            "{:<6} {:<16} {:<24} {:<28} {:<16} {}\n",
            r.id,
            r.created_at.format("%Y-%m-%d %H:%M"),
            r.name,
            r.email,
            r.phone.as_deref().unwrap_or("-"),
            if r.image_url.as_deref().is_some_and(|u| !u.is_empty()) {
                "yes"
            } else {
                "-"
            },
        ));
    }
    table
}
