pub mod diff_view;
pub mod dictionary_panel;
pub mod history_table;
pub mod input_field;
pub mod progress_bar;
pub mod study_panel;
pub mod video_list;
pub mod vocabulary_table;
