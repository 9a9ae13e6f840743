#[allow(dead_code)]
#[derive(formbag::form::FormModel)]
struct TupleForm(String);

fn main() {}
