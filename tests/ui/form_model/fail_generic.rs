#[allow(dead_code)]
#[derive(formbag::form::FormModel)]
struct GenericForm<T> {
    value: T,
}

fn main() {}
