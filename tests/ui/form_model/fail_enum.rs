#[allow(dead_code)]
#[derive(formbag::form::FormModel)]
enum ChoiceForm {
    Yes,
    No,
}

fn main() {}
