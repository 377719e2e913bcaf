pub mod contest;
pub mod feedback;
pub mod login;
pub mod setcompiler;
pub mod setcontest;
pub mod status;
pub mod submit;
