//! Core library exports for the BuildStock service.
//!
//! This crate exposes the domain model, repositories, the extraction
//! pipeline, routes and service layers used by the BuildStock web
//! application.

pub mod auth;
pub mod db;
pub mod domain;
pub mod dto;
pub mod extraction;
pub mod forms;
pub mod models;
pub mod pagination;
pub mod repository;
pub mod routes;
pub mod schema;
pub mod services;

mod error_conversions;
