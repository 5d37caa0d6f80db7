use tantivy::schema::{Field, NumericOptions, Schema as TantivySchema, STORED, STRING};

/// Resolved fields of the record-entry schema.
#[derive(Debug, Clone, Copy)]
pub struct EntryFields {
    pub entry_id: Field,
    pub registration_id: Field,
    pub chassis_id: Field,
    pub dataset_ref: Field,
    pub row_no: Field,
}

/// The index holds only the two searchable keys plus provenance; full rows
/// stay in the blob layer. All string fields use the raw tokenizer so
/// regex/term matching operates on whole normalized values.
pub fn entry_schema() -> (TantivySchema, EntryFields) {
    let mut builder = TantivySchema::builder();

    let entry_id = builder.add_text_field("entry_id", STRING | STORED);
    let registration_id = builder.add_text_field("registration_id", STRING | STORED);
    let chassis_id = builder.add_text_field("chassis_id", STRING | STORED);
    let dataset_ref = builder.add_text_field("dataset_ref", STRING | STORED);
    let row_no = builder.add_u64_field("row_no", NumericOptions::default().set_stored());

    let schema = builder.build();
    let fields = EntryFields {
        entry_id,
        registration_id,
        chassis_id,
        dataset_ref,
        row_no,
    };
    (schema, fields)
}
