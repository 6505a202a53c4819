// Resume persistence and the HTTP surface for editing, rendering and exporting resumes.

pub mod handlers;
pub mod repository;
