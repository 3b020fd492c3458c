use expensesync::form::{FieldLens, FormModel};

#[derive(Clone, expensesync::form::FormModel)]
struct TransferForm {
    payee: String,
    note: String,
    recurring: bool,
}

fn main() {
    let fields = TransferForm::fields();
    let lens = fields.payee();
    let mut model = TransferForm {
        payee: "Landlord".to_string(),
        note: String::new(),
        recurring: true,
    };
    lens.set(&mut model, "Utilities".to_string());
    assert_eq!(lens.key().as_str(), "payee");
    assert_eq!(lens.get(&model), "Utilities");
    assert!(*fields.recurring().get(&model));

    let keys = TransferForm::field_keys()
        .iter()
        .map(|key| key.as_str())
        .collect::<Vec<_>>();
    assert_eq!(keys, ["payee", "note", "recurring"]);

    if let Some(note) = model.text_field_mut("note") {
        note.push_str("october rent");
    }
    assert_eq!(model.note, "october rent");
    assert!(model.text_field_mut("recurring").is_none());
}
