pub mod aistudio;
pub mod land;
