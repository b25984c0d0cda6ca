//! Story domain entities.

pub mod collaborators;
pub mod model;

pub use collaborators::{AddCollaboratorOutcome, Collaborator, Collaborators};
pub use model::{CreateStory, ShareSettings, Story};
