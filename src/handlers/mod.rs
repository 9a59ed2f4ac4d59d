pub mod health;
pub mod surveys;
pub mod responses;
pub mod notes;
pub mod tags;
pub mod filter;

pub use health::health_handler;
pub use surveys::{person_attributes_handler, put_survey_handler};
pub use responses::{create_handler, delete_handler, get_handler, update_handler};
pub use notes::{add_note_handler, update_note_handler};
pub use tags::{add_tag_handler, remove_tag_handler};
pub use filter::filter_handler;
