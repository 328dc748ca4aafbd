pub mod answer;
pub mod authentication;
pub mod question;
pub mod vote;
