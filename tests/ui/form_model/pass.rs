use formbag::form::{FieldLens, FormModel};
use formbag::__private::serde_json::json;

#[derive(Clone, PartialEq, formbag::form::FormModel)]
struct DemoForm {
    email: String,
    remember_me: bool,
}

fn main() {
    let fields = DemoForm::fields();
    let lens = fields.email();
    let mut model = DemoForm {
        email: "a@example.com".to_string(),
        remember_me: false,
    };
    lens.set(&mut model, "b@example.com".to_string());
    assert_eq!(lens.key().as_str(), "email");
    assert_eq!(lens.get(&model), "b@example.com");
    assert_eq!(fields.remember_me().key().as_str(), "remember_me");

    let keys = DemoForm::field_keys()
        .iter()
        .map(|key| key.as_str())
        .collect::<Vec<_>>();
    assert_eq!(keys, ["email", "remember_me"]);

    assert_eq!(
        model.field_value("remember_me").expect("serializes"),
        Some(json!(false))
    );
    assert!(model.set_field_value("remember_me", json!(true)).expect("deserializes"));
    assert!(!model.set_field_value("missing", json!(true)).expect("unknown field"));
    assert!(model.set_field_value("remember_me", json!("yes")).is_err());

    let original = model.clone();
    model.email = "c@example.com".to_string();
    assert!(!model.field_eq(&original, "email"));
    assert!(model.field_eq(&original, "remember_me"));
    assert!(model.copy_field(&original, "email"));
    assert!(model.field_eq(&original, "email"));
}
