//! Domain model for quizdesk: quiz access codes, grades and the grading desk.

pub mod domain;
