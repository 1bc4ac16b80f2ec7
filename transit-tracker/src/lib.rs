//! Novi Sad transit tracker.
//!
//! Finds stations by id, name or proximity, keeps a live departures board
//! for one station up to date while the page is watched, and offers
//! sample trip itineraries between two places.

pub mod api;
pub mod app;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod feed;
pub mod geolocation;
pub mod polling;
pub mod trips;
pub mod web;
