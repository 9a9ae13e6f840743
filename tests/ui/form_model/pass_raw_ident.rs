use formbag::form::{FieldLens, FormModel};

#[derive(Clone, PartialEq, formbag::form::FormModel)]
struct TicketForm {
    r#type: String,
}

#[derive(Clone, PartialEq, formbag::form::FormModel)]
struct EmptyForm {}

fn main() {
    assert_eq!(TicketForm::fields().r#type().key().as_str(), "type");
    assert!(TicketForm::has_field("type"));
    assert!(EmptyForm::field_keys().is_empty());
}
