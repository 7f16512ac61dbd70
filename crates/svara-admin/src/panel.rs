//! The admin panel: client list, add/edit form and status banner.

use std::sync::Arc;
use std::time::Duration;

use svara_auth::AuthProvider;
use svara_core::{ClientId, ClientRecord, Error as CoreError, ImageUpload};

use crate::banner::{Banner, BannerSlot};
use crate::error::{Error, Result};
use crate::form::{ClientForm, FormMode};
use crate::repository::ClientRepository;

/// Admin-facing operations over the client list.
///
/// Every outcome is also reported through the banner.
pub struct AdminPanel {
    repository: ClientRepository,
    form: ClientForm,
    banner: BannerSlot,
    auth: Arc<dyn AuthProvider>,
}

impl AdminPanel {
    /// Creates a panel with an empty list and a closed form.
    pub fn new(repository: ClientRepository, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            repository,
            form: ClientForm::new(),
            banner: BannerSlot::default(),
            auth,
        }
    }

    /// Sets how long banners stay up.
    pub fn with_banner_ttl(mut self, ttl: Duration) -> Self {
        self.banner = BannerSlot::new(ttl);
        self
    }

    /// Underlying repository.
    pub fn repository(&self) -> &ClientRepository {
        &self.repository
    }

    /// Current client list, newest first.
    pub fn clients(&self) -> &[ClientRecord] {
        self.repository.records()
    }

    /// The add/edit form.
    pub fn form(&self) -> &ClientForm {
        &self.form
    }

    /// The add/edit form, for typing into.
    pub fn form_mut(&mut self) -> &mut ClientForm {
        &mut self.form
    }

    /// The visible banner, if any.
    pub fn banner(&self) -> Option<&Banner> {
        self.banner.current()
    }

    /// Loads the client list.
    pub async fn load(&mut self) -> Result<()> {
        if let Err(e) = self.repository.refresh().await {
            tracing::error!(error = %e, "Failed to load clients");
            self.banner.error("Error loading the client list");
            return Err(e);
        }
        Ok(())
    }

    /// Opens an empty form.
    pub fn open_create(&mut self) {
        self.form.open_create();
    }

    /// Opens the form for a listed client.
    pub fn open_edit(&mut self, id: ClientId) -> Result<()> {
        let record = self
            .repository
            .get(id)
            .ok_or_else(|| CoreError::not_found(format!("client {id}")))?;
        self.form.open_edit(record);
        Ok(())
    }

    /// Discards the form.
    pub fn cancel(&mut self) {
        self.form.reset();
    }

    /// Discards the form after a click outside it.
    pub fn dismiss_outside(&mut self) {
        self.form.reset();
    }

    /// Selects a photo for the open form.
    pub fn attach_image(&mut self, upload: ImageUpload) -> Result<()> {
        let rules = *self.repository.rules();
        if let Err(rejection) = self.form.attach_image(upload, &rules) {
            self.banner.error(rejection.to_string());
            return Err(CoreError::from(rejection).into());
        }
        Ok(())
    }

    /// Saves the open form.
    ///
    /// On success the form is closed. On failure it stays open with its
    /// values so the admin can try again.
    pub async fn submit(&mut self) -> Result<ClientRecord> {
        let fields = self.form.fields().clone();
        let image = self.form.image().cloned();

        let outcome = match self.form.mode() {
            FormMode::Closed => return Err(Error::FormClosed),
            FormMode::Creating => self
                .repository
                .create(&fields, image.as_ref())
                .await
                .cloned()
                .map(|record| (record, "Client added successfully")),
            FormMode::Editing(id) => self
                .repository
                .update(id, &fields, image.as_ref())
                .await
                .cloned()
                .map(|record| (record, "Client updated successfully")),
        };

        match outcome {
            Ok((record, message)) => {
                self.banner.success(message);
                self.form.reset();
                Ok(record)
            }
            Err(e) => {
                let message = if e.is_local() {
                    e.to_string()
                } else {
                    format!("Error saving client: {e}")
                };
                self.banner.error(message);
                Err(e)
            }
        }
    }

    /// Signs the admin out.
    pub async fn sign_out(&mut self) -> Result<()> {
        match self.auth.sign_out().await {
            Ok(()) => {
                self.banner.success("Signed out successfully");
                Ok(())
            }
            Err(e) => {
                self.banner.error("Error signing out");
                Err(e.into())
            }
        }
    }
}

impl std::fmt::Debug for AdminPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminPanel")
            .field("repository", &self.repository)
            .field("form", &self.form.mode())
            .finish_non_exhaustive()
    }
}
