//! Wire types shared by the MyGram API and its store layer.

pub mod api;
pub mod models;
