use super::FormService;
use crate::error::Result;
use crate::types::{Form, NewForm};
use crate::validation::{validate_description, validate_form_name, validate_schema};

impl FormService {
    /// Creates a draft form. A name already taken under case-insensitive
    /// comparison fails with `Conflict`.
    pub fn create_form(&self, new_form: NewForm) -> Result<Form> {
        validate_form_name(&new_form.name)?;
        validate_description(new_form.description.as_deref())?;
        validate_schema(&new_form.schema)?;

        let form = self.store.create_form(
            &new_form,
            &self.clock.now(),
            self.public_base_url.as_deref(),
        )?;

        tracing::info!(form_id = form.id, "Created form '{}'", form.name);
        Ok(form)
    }

    /// Moves a draft form to active. Returns false without distinguishing a
    /// missing form from one that is already active.
    pub fn activate_form(&self, form_id: i64) -> Result<bool> {
        let activated = self.store.activate_form(form_id)?;
        if activated {
            tracing::info!(form_id, "Activated form");
        } else {
            tracing::debug!(form_id, "Form not eligible for activation");
        }
        Ok(activated)
    }

    pub fn get_form(&self, form_id: i64) -> Result<Option<Form>> {
        self.store.get_form(form_id)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::error::Error;
    use crate::types::FormStatus;
    use crate::workflow::testing::{Harness, harness_now, new_form};

    #[test]
    fn test_create_form_starts_as_draft() {
        let h = Harness::new();
        let form = h.service.create_form(new_form("Vendor Intake")).unwrap();

        assert_eq!(form.status, FormStatus::Draft);
        assert_eq!(form.created_at, harness_now());
        assert_eq!(form.created_at.offset().local_minus_utc(), 120 * 60);
        assert_eq!(form.url, None);
    }

    #[test]
    fn test_duplicate_name_conflicts_ignoring_case() {
        let h = Harness::new();
        h.service.create_form(new_form("Vendor Intake")).unwrap();

        let result = h.service.create_form(new_form("VENDOR intake"));
        assert!(matches!(result, Err(Error::Conflict(_))));
    }

    #[test]
    fn test_invalid_schema_rejected() {
        let h = Harness::new();
        let mut form = new_form("Bad");
        form.schema = json!(42);

        assert!(matches!(
            h.service.create_form(form),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(h.service.store().count_forms().unwrap(), 0);
    }

    #[test]
    fn test_activation_is_one_shot() {
        let h = Harness::new();
        let form = h.service.create_form(new_form("Vendor Intake")).unwrap();

        assert!(h.service.activate_form(form.id).unwrap());
        assert!(!h.service.activate_form(form.id).unwrap());
        assert!(!h.service.activate_form(9999).unwrap());

        let form = h.service.get_form(form.id).unwrap().unwrap();
        assert_eq!(form.status, FormStatus::Active);
    }

    #[test]
    fn test_url_derived_from_public_base() {
        let mut h = Harness::new();
        h.service = h
            .service
            .with_public_base_url(Some("https://forms.example.com/".to_string()));
        let service = &h.service;

        let form = service.create_form(new_form("Derived")).unwrap();
        assert_eq!(
            form.url.as_deref(),
            Some(format!("https://forms.example.com/forms/{}", form.id).as_str())
        );

        let mut explicit = new_form("Explicit");
        explicit.url = Some("https://elsewhere.example.com/x".to_string());
        let form = service.create_form(explicit).unwrap();
        assert_eq!(form.url.as_deref(), Some("https://elsewhere.example.com/x"));
    }
}
