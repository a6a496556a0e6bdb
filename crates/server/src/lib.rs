//! The quizdesk HTTP service: persistence, services and routes.

pub mod api;
pub mod config;
pub mod db;
pub mod entity;
pub mod repository;
pub mod service;
pub mod storage;
