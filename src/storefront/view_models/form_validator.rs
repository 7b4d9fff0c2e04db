//! # Form Validator
//!
//! Per-form validation on top of native constraint validation. One validator
//! owns one form; it never reads or writes fields outside it.
//!
//! Extra rules (custom predicates, password confirmation, server-side
//! availability checks) feed into the same pipeline by setting the field's
//! custom validity and re-validating it.

use crate::config::StorefrontConfig;
use crate::storefront::dom::{self, Document, NodeId, SharedDocument, ValidityState};
use crate::storefront::events::{publish, ModelEvent, SharedEventBus};
use crate::storefront::models::field_model::interpolate;
use crate::storefront::models::{FieldStatus, FormView, ValidationMessages};
use crate::storefront::services::{AvailabilityKind, HttpService};
use crate::storefront::timing::Debouncer;
use crate::storefront::views::field_view;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

/// Predicate over a field's current value
pub type Predicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

const FIELD_TAGS: [&str; 3] = ["input", "select", "textarea"];

struct CustomRule {
    field_id: String,
    predicate: Predicate,
    message: String,
}

struct PasswordRule {
    password_id: String,
    confirm_id: String,
    message: String,
}

struct AvailabilityRule {
    field_id: String,
    debouncer: Debouncer<()>,
}

#[derive(Default)]
struct Rules {
    custom: Vec<CustomRule>,
    passwords: Vec<PasswordRule>,
    availability: Vec<AvailabilityRule>,
}

pub struct FormValidator {
    form_id: String,
    form: NodeId,
    document: SharedDocument,
    http: HttpService,
    bus: SharedEventBus,
    messages: ValidationMessages,
    availability_debounce: Duration,
    view: Mutex<FormView>,
    rules: Mutex<Rules>,
    this: Weak<FormValidator>,
}

impl FormValidator {
    /// Attach to the form matching `form_selector`; `None` when the page has no such form
    pub fn attach(
        document: SharedDocument,
        form_selector: &str,
        http: HttpService,
        bus: SharedEventBus,
        config: &StorefrontConfig,
    ) -> Option<Arc<Self>> {
        let form = dom::lock(&document).query_selector(form_selector)?;
        Some(Self::for_form(document, form, http, bus, config))
    }

    /// Attach to an already located form element
    pub fn for_form(
        document: SharedDocument,
        form: NodeId,
        http: HttpService,
        bus: SharedEventBus,
        config: &StorefrontConfig,
    ) -> Arc<Self> {
        let form_id = {
            let doc = dom::lock(&document);
            doc.id(form)
                .map(str::to_string)
                .unwrap_or_else(|| format!("{form:?}"))
        };
        tracing::debug!("form validator attached to '{}'", form_id);

        Arc::new_cyclic(|this| Self {
            form_id,
            form,
            document,
            http,
            bus,
            messages: config.messages.clone(),
            availability_debounce: config.availability_debounce,
            view: Mutex::new(FormView::default()),
            rules: Mutex::new(Rules::default()),
            this: this.clone(),
        })
    }

    pub fn form_id(&self) -> &str {
        &self.form_id
    }

    pub fn form(&self) -> NodeId {
        self.form
    }

    pub fn view(&self) -> FormView {
        self.view
            .lock()
            .map(|view| view.clone())
            .unwrap_or_default()
    }

    pub fn status(&self, field_id: &str) -> FieldStatus {
        self.view
            .lock()
            .map(|view| view.status(field_id))
            .unwrap_or_default()
    }

    /// Whether `node` is one of this form's fields
    pub fn owns(&self, node: NodeId) -> bool {
        let doc = dom::lock(&self.document);
        is_field(&doc, node) && doc.contains(self.form, node)
    }

    fn fields(&self, doc: &Document) -> Vec<NodeId> {
        doc.descendants(self.form)
            .into_iter()
            .filter(|node| is_field(doc, *node))
            .collect()
    }

    fn field_by_id(&self, doc: &Document, field_id: &str) -> Option<NodeId> {
        doc.get_element_by_id_in(self.form, field_id)
    }

    /// Validate every field; returns whether the submission may proceed.
    /// The form is marked `was-validated` either way.
    pub fn handle_submit(&self) -> bool {
        let fields = self.fields(&dom::lock(&self.document));
        let mut accepted = true;
        for field in fields {
            if !self.validate_field(field).is_valid() {
                accepted = false;
            }
        }

        if let Ok(mut view) = self.view.lock() {
            view.was_validated = true;
        }
        field_view::render_form(&mut dom::lock(&self.document), self.form, true);
        tracing::debug!("form '{}' submit accepted={}", self.form_id, accepted);
        publish(
            &self.bus,
            ModelEvent::FormSubmitted {
                form_id: self.form_id.clone(),
                accepted,
            },
        );
        accepted
    }

    /// Blur: validate the field, then run its extra rules
    pub fn handle_blur(&self, field: NodeId) {
        if !self.owns(field) {
            return;
        }
        self.validate_field(field);

        let Some(field_id) = self.field_id_of(field) else {
            return;
        };
        self.run_custom_rules(&field_id);
        self.run_password_rules(&field_id, true);

        if let Ok(rules) = self.rules.lock() {
            for rule in rules.availability.iter().filter(|r| r.field_id == field_id) {
                rule.debouncer.call(());
            }
        }
    }

    /// Input: re-validate only a field already showing an error, then run its extra rules
    pub fn handle_input(&self, field: NodeId) {
        if !self.owns(field) {
            return;
        }
        let field_id = self.field_id_of(field);
        let key = field_key(&dom::lock(&self.document), field);
        if self.status(&key).is_invalid() {
            self.validate_field(field);
        }

        if let Some(field_id) = field_id {
            self.run_custom_rules(&field_id);
            self.run_password_rules(&field_id, false);
        }
    }

    fn field_id_of(&self, field: NodeId) -> Option<String> {
        dom::lock(&self.document).id(field).map(str::to_string)
    }

    /// Validate one field and project the outcome onto the page
    pub fn validate_field(&self, field: NodeId) -> FieldStatus {
        let (key, status) = {
            let doc = dom::lock(&self.document);
            let validity = doc.validity(field);
            let status = if validity.valid() {
                FieldStatus::Valid
            } else {
                FieldStatus::invalid(self.message_for(&doc, field, &validity))
            };
            (field_key(&doc, field), status)
        };
        self.record(field, key, status)
    }

    fn record(&self, field: NodeId, key: String, status: FieldStatus) -> FieldStatus {
        field_view::render_field(&mut dom::lock(&self.document), self.form, field, &status);
        if let Ok(mut view) = self.view.lock() {
            view.fields.insert(key.clone(), status.clone());
        }
        publish(
            &self.bus,
            ModelEvent::FieldValidated {
                form_id: self.form_id.clone(),
                field_id: key,
                status: status.clone(),
            },
        );
        status
    }

    fn message_for(&self, doc: &Document, field: NodeId, validity: &ValidityState) -> String {
        let messages = &self.messages;
        let attr = |name: &str| doc.attr(field, name).unwrap_or_default().to_string();

        if validity.value_missing {
            return doc
                .attr(field, "data-required-message")
                .unwrap_or(messages.required.as_str())
                .to_string();
        }
        if validity.type_mismatch {
            let input_type = doc.attr(field, "type").unwrap_or("text").to_ascii_lowercase();
            return match input_type.as_str() {
                "email" => messages.email.clone(),
                "url" => messages.url.clone(),
                "number" => messages.number.clone(),
                _ => messages.type_mismatch.clone(),
            };
        }
        if validity.pattern_mismatch {
            return doc
                .attr(field, "data-pattern-message")
                .unwrap_or(messages.pattern.as_str())
                .to_string();
        }
        if validity.too_short {
            return interpolate(&messages.too_short, "min", &attr("minlength"));
        }
        if validity.too_long {
            return interpolate(&messages.too_long, "max", &attr("maxlength"));
        }
        if validity.range_underflow {
            return interpolate(&messages.range_underflow, "min", &attr("min"));
        }
        if validity.range_overflow {
            return interpolate(&messages.range_overflow, "max", &attr("max"));
        }
        if validity.step_mismatch {
            return messages.step.clone();
        }
        messages.invalid.clone()
    }

    /// Set or clear a field's custom validity, then re-validate it
    fn set_custom_validity(&self, field: NodeId, message: &str) -> FieldStatus {
        dom::lock(&self.document).set_custom_validity(field, message);
        self.validate_field(field)
    }

    /// Validate `field_id` with `predicate` on blur and on every input
    pub fn add_custom_validation<F>(&self, field_id: &str, predicate: F, message: &str)
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        if self.field_by_id(&dom::lock(&self.document), field_id).is_none() {
            tracing::debug!("custom rule for missing field '{}' ignored", field_id);
            return;
        }
        if let Ok(mut rules) = self.rules.lock() {
            rules.custom.push(CustomRule {
                field_id: field_id.to_string(),
                predicate: Arc::new(predicate),
                message: message.to_string(),
            });
        }
    }

    fn run_custom_rules(&self, field_id: &str) {
        let matching: Vec<(Predicate, String)> = match self.rules.lock() {
            Ok(rules) => rules
                .custom
                .iter()
                .filter(|rule| rule.field_id == field_id)
                .map(|rule| (rule.predicate.clone(), rule.message.clone()))
                .collect(),
            Err(_) => return,
        };
        for (predicate, message) in matching {
            let (field, value) = {
                let doc = dom::lock(&self.document);
                let Some(field) = self.field_by_id(&doc, field_id) else {
                    return;
                };
                (field, doc.value(field))
            };
            if predicate(&value) {
                self.set_custom_validity(field, "");
            } else {
                self.set_custom_validity(field, &message);
            }
        }
    }

    /// Require the confirm field to equal the password field. Checked on input
    /// of either field and on blur of the confirm field.
    pub fn validate_password_match(&self, password_id: &str, confirm_id: &str, message: &str) {
        {
            let doc = dom::lock(&self.document);
            if self.field_by_id(&doc, password_id).is_none()
                || self.field_by_id(&doc, confirm_id).is_none()
            {
                tracing::debug!("password rule for missing fields ignored");
                return;
            }
        }
        if let Ok(mut rules) = self.rules.lock() {
            rules.passwords.push(PasswordRule {
                password_id: password_id.to_string(),
                confirm_id: confirm_id.to_string(),
                message: message.to_string(),
            });
        }
    }

    fn run_password_rules(&self, field_id: &str, blur: bool) {
        let matching: Vec<(String, String, String)> = match self.rules.lock() {
            Ok(rules) => rules
                .passwords
                .iter()
                .filter(|rule| {
                    rule.confirm_id == field_id || (!blur && rule.password_id == field_id)
                })
                .map(|rule| {
                    (
                        rule.password_id.clone(),
                        rule.confirm_id.clone(),
                        rule.message.clone(),
                    )
                })
                .collect(),
            Err(_) => return,
        };
        for (password_id, confirm_id, message) in matching {
            self.check_password_match(&password_id, &confirm_id, &message);
        }
    }

    /// Compare the two fields now; returns whether they match
    pub fn check_password_match(&self, password_id: &str, confirm_id: &str, message: &str) -> bool {
        let found = {
            let doc = dom::lock(&self.document);
            match (
                self.field_by_id(&doc, password_id),
                self.field_by_id(&doc, confirm_id),
            ) {
                (Some(password), Some(confirm)) => {
                    Some((confirm, doc.value(password) == doc.value(confirm)))
                }
                _ => None,
            }
        };
        let Some((confirm, matches)) = found else {
            return false;
        };

        if matches {
            self.set_custom_validity(confirm, "");
        } else {
            dom::lock(&self.document).set_custom_validity(confirm, message);
            let key = field_key(&dom::lock(&self.document), confirm);
            self.record(confirm, key, FieldStatus::invalid(message));
        }
        matches
    }

    /// Check the username with the server on blur, after the availability debounce
    pub fn validate_username_availability(&self, field_id: &str, message: &str) {
        self.add_availability_rule(AvailabilityKind::Username, field_id, message);
    }

    /// Check the email with the server on blur, after the availability debounce
    pub fn validate_email_availability(&self, field_id: &str, message: &str) {
        self.add_availability_rule(AvailabilityKind::Email, field_id, message);
    }

    fn add_availability_rule(&self, kind: AvailabilityKind, field_id: &str, message: &str) {
        if self.field_by_id(&dom::lock(&self.document), field_id).is_none() {
            tracing::debug!("availability rule for missing field '{}' ignored", field_id);
            return;
        }
        let this = self.this.clone();
        let rule_field = field_id.to_string();
        let rule_message = message.to_string();
        let debouncer = Debouncer::new(self.availability_debounce, move |()| {
            let this = this.clone();
            let field_id = rule_field.clone();
            let message = rule_message.clone();
            async move {
                if let Some(validator) = this.upgrade() {
                    validator.check_availability(kind, &field_id, &message).await;
                }
            }
        });
        if let Ok(mut rules) = self.rules.lock() {
            rules.availability.push(AvailabilityRule {
                field_id: field_id.to_string(),
                debouncer,
            });
        }
    }

    /// Ask the server about the field's trimmed value right away. Empty values
    /// are not checked; transport failures leave validity unchanged.
    pub async fn check_availability(&self, kind: AvailabilityKind, field_id: &str, message: &str) {
        let found = {
            let doc = dom::lock(&self.document);
            self.field_by_id(&doc, field_id)
                .map(|field| (field, doc.value(field).trim().to_string()))
        };
        let Some((field, value)) = found else {
            return;
        };
        if value.is_empty() {
            return;
        }

        match self.http.check_availability(kind, &value).await {
            Ok(true) => {
                self.set_custom_validity(field, "");
            }
            Ok(false) => {
                tracing::debug!("{:?} '{}' is taken", kind, value);
                self.set_custom_validity(field, message);
            }
            Err(e) => tracing::error!("availability check for '{}' failed: {:#}", field_id, e),
        }
    }
}

fn is_field(doc: &Document, node: NodeId) -> bool {
    doc.tag_name(node)
        .is_some_and(|tag| FIELD_TAGS.contains(&tag))
}

/// Key a field's status is stored under: its id, else its name
fn field_key(doc: &Document, field: NodeId) -> String {
    doc.id(field)
        .or_else(|| doc.attr(field, "name"))
        .map(str::to_string)
        .unwrap_or_else(|| format!("{field:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storefront::io::{Method, MockReply, MockTransport};
    use crate::storefront::events::SimpleEventBus;
    use serde_json::json;
    use url::Url;

    const PAGE: &str = r#"<html><body>
        <form id="login" method="post">
          <input id="email" type="email" required>
          <div id="email-error" class="invalid-feedback d-none"></div>
          <input id="password" type="password" required minlength="8">
          <div id="password-error" class="invalid-feedback d-none"></div>
          <button type="submit">Sign in</button>
        </form>
        <form id="signup" method="post">
          <input id="username" name="username" required data-required-message="Pick a username">
          <div id="username-error" class="d-none"></div>
          <input id="new_password" type="password">
          <input id="confirm_password" type="password">
          <div id="confirm_password-error" class="d-none"></div>
          <input id="age" type="number" min="18" max="120">
          <div id="age-error" class="d-none"></div>
          <input id="signup_email" type="email">
          <div id="signup_email-error" class="d-none"></div>
        </form>
        </body></html>"#;

    struct Fixture {
        document: SharedDocument,
        transport: MockTransport,
        login: Arc<FormValidator>,
        signup: Arc<FormValidator>,
    }

    fn fixture() -> Fixture {
        let document = Arc::new(Mutex::new(
            Document::parse(PAGE, Url::parse("http://shop.test/auth/register").unwrap()).unwrap(),
        ));
        let transport = MockTransport::new();
        let http = HttpService::new(
            Arc::new(transport.clone()),
            Url::parse("http://shop.test/").unwrap(),
        );
        let bus = SimpleEventBus::shared();
        let config = StorefrontConfig::new(Url::parse("http://shop.test/").unwrap());
        let login =
            FormValidator::attach(document.clone(), "#login", http.clone(), bus.clone(), &config)
                .unwrap();
        let signup =
            FormValidator::attach(document.clone(), "#signup", http, bus, &config).unwrap();
        Fixture {
            document,
            transport,
            login,
            signup,
        }
    }

    fn node(f: &Fixture, id: &str) -> NodeId {
        f.document.lock().unwrap().get_element_by_id(id).unwrap()
    }

    fn set_value(f: &Fixture, id: &str, value: &str) -> NodeId {
        let field = node(f, id);
        f.document.lock().unwrap().set_value(field, value);
        field
    }

    fn error_text(f: &Fixture, id: &str) -> String {
        let doc = f.document.lock().unwrap();
        let error = doc.get_element_by_id(&format!("{id}-error")).unwrap();
        doc.text_content(error)
    }

    #[test]
    fn attach_should_return_none_for_missing_form() {
        let f = fixture();
        let config = StorefrontConfig::new(Url::parse("http://shop.test/").unwrap());
        let http = HttpService::new(
            Arc::new(f.transport.clone()),
            Url::parse("http://shop.test/").unwrap(),
        );
        assert!(
            FormValidator::attach(f.document.clone(), "#checkout", http, SimpleEventBus::shared(), &config)
                .is_none()
        );
    }

    #[test]
    fn submit_with_empty_required_fields_should_be_cancelled() {
        let f = fixture();
        assert!(!f.login.handle_submit());

        assert_eq!(error_text(&f, "email"), "This field is required");
        let doc = f.document.lock().unwrap();
        let form = doc.get_element_by_id("login").unwrap();
        assert!(doc.has_class(form, "was-validated"));
        let email = doc.get_element_by_id("email").unwrap();
        assert!(doc.has_class(email, "is-invalid"));
    }

    #[test]
    fn valid_submit_should_proceed_and_still_mark_form() {
        let f = fixture();
        set_value(&f, "email", "alice@shop.test");
        set_value(&f, "password", "long enough");

        assert!(f.login.handle_submit());
        assert!(f.login.view().was_validated);
        assert_eq!(f.login.status("email"), FieldStatus::Valid);
    }

    #[test]
    fn messages_should_follow_constraint_priority() {
        let f = fixture();
        let email = set_value(&f, "email", "not-an-email");
        assert_eq!(
            f.login.validate_field(email).error_text(),
            "Please enter a valid email address"
        );

        let password = set_value(&f, "password", "short");
        assert_eq!(
            f.login.validate_field(password).error_text(),
            "Please use at least 8 characters"
        );

        let age = set_value(&f, "age", "12");
        assert_eq!(f.signup.validate_field(age).error_text(), "Value must be at least 18");

        let username = node(&f, "username");
        assert_eq!(f.signup.validate_field(username).error_text(), "Pick a username");
    }

    #[test]
    fn blur_should_flag_empty_required_field_then_clear_once_filled() {
        let f = fixture();
        let email = node(&f, "email");

        f.login.handle_blur(email);
        assert_eq!(
            f.login.status("email"),
            FieldStatus::invalid("This field is required")
        );
        assert_eq!(error_text(&f, "email"), "This field is required");

        set_value(&f, "email", "alice@shop.test");
        f.login.handle_blur(email);
        assert_eq!(f.login.status("email"), FieldStatus::Valid);
        assert_eq!(error_text(&f, "email"), "");
        let doc = f.document.lock().unwrap();
        let error = doc.get_element_by_id("email-error").unwrap();
        assert!(doc.has_class(error, "d-none"));
        assert!(doc.has_class(email, "is-valid"));
    }

    #[test]
    fn input_should_only_revalidate_invalid_fields() {
        let f = fixture();
        let email = node(&f, "email");

        f.login.handle_input(email);
        assert_eq!(f.login.status("email"), FieldStatus::Pristine);

        f.login.handle_blur(email);
        assert!(f.login.status("email").is_invalid());

        set_value(&f, "email", "alice@shop.test");
        f.login.handle_input(email);
        assert_eq!(f.login.status("email"), FieldStatus::Valid);
        assert_eq!(error_text(&f, "email"), "");
    }

    #[test]
    fn validators_should_ignore_fields_of_other_forms() {
        let f = fixture();
        let username = node(&f, "username");

        f.login.handle_blur(username);
        assert!(f.login.view().fields.is_empty());
        assert!(!f.login.owns(username));
        assert!(f.signup.owns(username));

        assert!(!f.signup.handle_submit());
        assert!(f.signup.view().fields.get("email").is_none());
        let doc = f.document.lock().unwrap();
        let login = doc.get_element_by_id("login").unwrap();
        assert!(!doc.has_class(login, "was-validated"));
    }

    #[test]
    fn custom_validation_should_run_on_input_and_blur() {
        let f = fixture();
        f.signup.add_custom_validation(
            "username",
            |value| !value.contains(' '),
            "No spaces allowed",
        );
        let username = set_value(&f, "username", "bad name");

        f.signup.handle_input(username);
        assert_eq!(f.signup.status("username").error_text(), "Invalid value");
        assert_eq!(error_text(&f, "username"), "Invalid value");
        assert_eq!(
            f.document.lock().unwrap().custom_validity(username),
            "No spaces allowed"
        );

        set_value(&f, "username", "goodname");
        f.signup.handle_blur(username);
        assert_eq!(f.signup.status("username"), FieldStatus::Valid);
    }

    #[test]
    fn password_mismatch_should_show_message_until_fixed() {
        let f = fixture();
        f.signup
            .validate_password_match("new_password", "confirm_password", "Passwords do not match");

        set_value(&f, "new_password", "secret123");
        let confirm = set_value(&f, "confirm_password", "secret1234");
        f.signup.handle_input(confirm);

        assert_eq!(error_text(&f, "confirm_password"), "Passwords do not match");
        assert!(f.signup.status("confirm_password").is_invalid());

        set_value(&f, "confirm_password", "secret123");
        f.signup.handle_input(confirm);

        assert_eq!(error_text(&f, "confirm_password"), "");
        assert_eq!(f.signup.status("confirm_password"), FieldStatus::Valid);
        let doc = f.document.lock().unwrap();
        assert_eq!(doc.custom_validity(confirm), "");
    }

    #[test]
    fn editing_password_field_should_recheck_confirm() {
        let f = fixture();
        f.signup
            .validate_password_match("new_password", "confirm_password", "Passwords do not match");
        set_value(&f, "confirm_password", "secret123");
        let password = set_value(&f, "new_password", "secret12");

        f.signup.handle_input(password);
        assert!(f.signup.status("confirm_password").is_invalid());

        set_value(&f, "new_password", "secret123");
        f.signup.handle_input(password);
        assert!(f.signup.status("confirm_password").is_valid());
    }

    #[tokio::test(start_paused = true)]
    async fn taken_username_should_fail_after_debounce() {
        let f = fixture();
        f.transport.on(
            Method::Get,
            "/auth/check-username",
            MockReply::json(json!({"available": false})),
        );
        f.signup
            .validate_username_availability("username", "Username already taken");
        let username = set_value(&f, "username", "  alice ");

        f.signup.handle_blur(username);
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(f.transport.requests().is_empty());

        tokio::time::sleep(Duration::from_millis(200)).await;
        let sent = f.transport.requests_to("/auth/check-username");
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].url.query(), Some("username=alice"));
        assert_eq!(f.signup.status("username").error_text(), "Invalid value");
        assert_eq!(
            f.document.lock().unwrap().custom_validity(username),
            "Username already taken"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn available_email_should_clear_previous_failure() {
        let f = fixture();
        f.transport.once(
            Method::Get,
            "/auth/check-email",
            MockReply::json(json!({"available": false})),
        );
        f.transport.once(
            Method::Get,
            "/auth/check-email",
            MockReply::json(json!({"available": true})),
        );
        let email = set_value(&f, "signup_email", "a@shop.test");

        f.signup
            .check_availability(AvailabilityKind::Email, "signup_email", "Email in use")
            .await;
        assert_eq!(f.signup.status("signup_email").error_text(), "Invalid value");
        assert_eq!(f.document.lock().unwrap().custom_validity(email), "Email in use");

        f.signup
            .check_availability(AvailabilityKind::Email, "signup_email", "Email in use")
            .await;
        assert!(f.signup.status("signup_email").is_valid());
        assert_eq!(f.document.lock().unwrap().custom_validity(email), "");
    }

    #[tokio::test(start_paused = true)]
    async fn blank_or_failing_checks_should_leave_field_alone() {
        let f = fixture();
        f.transport
            .on(Method::Get, "/auth/check-email", MockReply::fail());

        set_value(&f, "signup_email", "   ");
        f.signup
            .check_availability(AvailabilityKind::Email, "signup_email", "Email in use")
            .await;
        assert!(f.transport.requests().is_empty());

        set_value(&f, "signup_email", "a@shop.test");
        f.signup
            .check_availability(AvailabilityKind::Email, "signup_email", "Email in use")
            .await;
        assert_eq!(f.transport.requests().len(), 1);
        assert_eq!(f.signup.status("signup_email"), FieldStatus::Pristine);
    }
}
