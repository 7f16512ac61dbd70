//! The client add/edit form.

use svara_core::{ClientFields, ClientId, ClientRecord, ImageRejection, ImageUpload, MediaRules};

/// What the form is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormMode {
    /// No form shown.
    #[default]
    Closed,
    /// Adding a new client.
    Creating,
    /// Editing the client with this id.
    Editing(ClientId),
}

/// In-progress form values. Purely local: nothing here touches the network.
#[derive(Debug, Clone, Default)]
pub struct ClientForm {
    mode: FormMode,
    fields: ClientFields,
    image: Option<ImageUpload>,
}

impl ClientForm {
    /// Creates a closed, empty form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mode.
    pub fn mode(&self) -> FormMode {
        self.mode
    }

    /// Returns `true` unless the form is closed.
    pub fn is_open(&self) -> bool {
        self.mode != FormMode::Closed
    }

    /// Current field values.
    pub fn fields(&self) -> &ClientFields {
        &self.fields
    }

    /// Field values for editing.
    pub fn fields_mut(&mut self) -> &mut ClientFields {
        &mut self.fields
    }

    /// Selected image, if any.
    pub fn image(&self) -> Option<&ImageUpload> {
        self.image.as_ref()
    }

    /// Opens an empty form for a new client.
    pub fn open_create(&mut self) {
        self.reset();
        self.mode = FormMode::Creating;
    }

    /// Opens the form prefilled from `record`.
    pub fn open_edit(&mut self, record: &ClientRecord) {
        self.fields = record.fields();
        self.image = None;
        self.mode = FormMode::Editing(record.id);
    }

    /// Selects an image after checking it against `rules`.
    ///
    /// A rejected image leaves the previous selection in place.
    pub fn attach_image(
        &mut self,
        upload: ImageUpload,
        rules: &MediaRules,
    ) -> Result<(), ImageRejection> {
        rules.check(&upload)?;
        self.image = Some(upload);
        Ok(())
    }

    /// Closes the form and clears every value.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
