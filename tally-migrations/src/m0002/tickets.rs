pub mod add_note_column;
